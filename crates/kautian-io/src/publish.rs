//! Versioned publishing into a `public/` tree.
//!
//! ```text
//! public/
//!   manifest.json
//!   bunji/                 current copies
//!   20261019-2031/bunji/   workbook + kautian.json + kautian.csv
//! ```
//!
//! Nothing is published when the workbook hash matches the manifest.

use crate::convert::convert_workbook;
use crate::manifest::{sha256_file, Manifest};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use kautian_core::Schema;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const DATA_DIR: &str = "bunji";
pub const JSON_OUTPUT: &str = "kautian.json";
pub const CSV_OUTPUT: &str = "kautian.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Unchanged,
    Published {
        version_dir: PathBuf,
        changed: Vec<String>,
    },
}

/// Publish `workbook` into `public_dir` if its content changed.
pub fn publish(
    workbook: &Path,
    public_dir: &Path,
    schema: &Schema,
    now: DateTime<Local>,
) -> Result<PublishOutcome> {
    let file_name = workbook
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("workbook path has no file name: {}", workbook.display()))?
        .to_string();

    let mut hashes = BTreeMap::new();
    hashes.insert(file_name.clone(), sha256_file(workbook)?);

    let manifest_path = public_dir.join(MANIFEST_FILE);
    let manifest = Manifest::load(&manifest_path)?;
    let changed = manifest.changed_files(&hashes);
    if changed.is_empty() {
        info!(workbook = %workbook.display(), "hashes match manifest, nothing to publish");
        return Ok(PublishOutcome::Unchanged);
    }
    for name in &changed {
        info!(file = %name, "change detected");
    }

    let version = now.format("%Y%m%d-%H%M").to_string();
    let version_dir = public_dir.join(&version);
    let staging_dir = public_dir.join(format!(".{version}.staging"));
    if staging_dir.exists() {
        fs::remove_dir_all(&staging_dir)
            .with_context(|| format!("failed to clear {}", staging_dir.display()))?;
    }

    // Built aside and moved into place, so a failure never touches an
    // existing version directory.
    if let Err(err) = build_version(workbook, &staging_dir.join(DATA_DIR), &file_name, schema) {
        if let Err(cleanup) = fs::remove_dir_all(&staging_dir) {
            warn!(dir = %staging_dir.display(), error = %cleanup, "failed to remove staging directory");
        }
        return Err(err);
    }
    if version_dir.exists() {
        warn!(dir = %version_dir.display(), "replacing version published in the same minute");
        fs::remove_dir_all(&version_dir)
            .with_context(|| format!("failed to replace {}", version_dir.display()))?;
    }
    fs::rename(&staging_dir, &version_dir)
        .with_context(|| format!("failed to move {} into place", version_dir.display()))?;
    info!(dir = %version_dir.display(), "created version directory");
    let data_dir = version_dir.join(DATA_DIR);

    let updated = Manifest {
        last_updated: Some(now.naive_local()),
        latest_version_dir: Some(version),
        files: hashes,
    };
    updated.save(&manifest_path)?;
    info!(path = %manifest_path.display(), "updated manifest");

    let current_dir = public_dir.join(DATA_DIR);
    fs::create_dir_all(&current_dir)
        .with_context(|| format!("failed to create {}", current_dir.display()))?;
    for name in [file_name.as_str(), JSON_OUTPUT, CSV_OUTPUT] {
        let src = data_dir.join(name);
        if src.exists() {
            fs::copy(&src, current_dir.join(name))
                .with_context(|| format!("failed to refresh {}", name))?;
        }
    }

    Ok(PublishOutcome::Published {
        version_dir,
        changed,
    })
}

fn build_version(workbook: &Path, data_dir: &Path, file_name: &str, schema: &Schema) -> Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    let copied = data_dir.join(file_name);
    fs::copy(workbook, &copied)
        .with_context(|| format!("failed to copy {} into {}", workbook.display(), data_dir.display()))?;
    convert_workbook(
        &copied,
        &data_dir.join(JSON_OUTPUT),
        &data_dir.join(CSV_OUTPUT),
        schema,
    )?;
    Ok(())
}
