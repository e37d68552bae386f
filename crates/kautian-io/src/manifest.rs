//! `manifest.json`: content hashes of the last published sources.

use crate::writers::write_atomic;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Local wall-clock time, written without an offset.
    #[serde(default, deserialize_with = "local_timestamp")]
    pub last_updated: Option<NaiveDateTime>,
    #[serde(default)]
    pub latest_version_dir: Option<String>,
    /// Source file name → SHA-256 hex digest.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

impl Manifest {
    /// Load `path`, or an empty manifest when it does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("invalid manifest {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        write_atomic(path, text.as_bytes())
    }

    /// Names in `hashes` that are new or differ from the recorded hash.
    /// Everything counts as changed against an empty manifest.
    pub fn changed_files(&self, hashes: &BTreeMap<String, String>) -> Vec<String> {
        hashes
            .iter()
            .filter(|(name, hash)| self.files.get(*name) != Some(*hash))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Accepts naive ISO-8601 timestamps (`2025-12-01T10:20:30.123456`) and
/// RFC 3339 ones with an offset, which keep their local wall-clock time.
fn local_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(naive) = text.parse::<NaiveDateTime>() {
        return Ok(Some(naive));
    }
    DateTime::parse_from_rfc3339(&text)
        .map(|stamped| Some(stamped.naive_local()))
        .map_err(|err| serde::de::Error::custom(format!("invalid timestamp `{text}`: {err}")))
}

/// SHA-256 of a file's contents, lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file =
        fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashes(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_manifest_reports_everything() {
        let changed = Manifest::default().changed_files(&hashes(&[("a.json", "1"), ("b.zip", "2")]));
        assert_eq!(changed, vec!["a.json", "b.zip"]);
    }

    #[test]
    fn only_differing_hashes_are_reported() {
        let manifest = Manifest {
            files: hashes(&[("a.json", "1"), ("b.zip", "2")]),
            ..Default::default()
        };
        assert!(manifest.changed_files(&hashes(&[("a.json", "1")])).is_empty());
        assert_eq!(
            manifest.changed_files(&hashes(&[("a.json", "1"), ("b.zip", "3")])),
            vec!["b.zip"]
        );
    }

    #[test]
    fn sha256_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.txt");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        assert_eq!(Manifest::load(&path).unwrap(), Manifest::default());

        let manifest = Manifest {
            last_updated: Some(chrono::Local::now().naive_local()),
            latest_version_dir: Some("20260101-0930".to_string()),
            files: hashes(&[("kautian.json", "ff")]),
        };
        manifest.save(&path).unwrap();
        let loaded = Manifest::load(&path).unwrap();
        assert_eq!(loaded.latest_version_dir, manifest.latest_version_dir);
        assert_eq!(loaded.files, manifest.files);
        assert_eq!(loaded.last_updated, manifest.last_updated);
    }

    #[test]
    fn loads_naive_iso_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(
            &path,
            r#"{"last_updated": "2025-12-01T10:20:30.123456", "latest_version_dir": "20251201-1020", "files": {"kautian.ods": "abc"}}"#,
        )
        .unwrap();

        let manifest = Manifest::load(&path).unwrap();
        let expected = NaiveDateTime::parse_from_str("2025-12-01 10:20:30.123456", "%Y-%m-%d %H:%M:%S%.f").unwrap();
        assert_eq!(manifest.last_updated, Some(expected));
        assert_eq!(manifest.latest_version_dir.as_deref(), Some("20251201-1020"));
        assert!(manifest.changed_files(&hashes(&[("kautian.ods", "abc")])).is_empty());
    }

    #[test]
    fn loads_offset_and_null_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, r#"{"last_updated": "2025-12-01T10:20:30+08:00"}"#).unwrap();
        let expected = NaiveDateTime::parse_from_str("2025-12-01 10:20:30", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(Manifest::load(&path).unwrap().last_updated, Some(expected));

        fs::write(&path, r#"{"last_updated": null, "files": {}}"#).unwrap();
        assert_eq!(Manifest::load(&path).unwrap().last_updated, None);

        fs::write(&path, r#"{"last_updated": "yesterday"}"#).unwrap();
        assert!(Manifest::load(&path).is_err());
    }
}
