//! End-to-end transform scenarios over in-memory workbooks.

use kautian_core::{transform, Record, Schema, Workbook, ENTRY_RELATIONS};
use serde_json::{json, Value};

fn rows(value: Value) -> Vec<Record> {
    serde_json::from_value(value).expect("rows")
}

/// Kautian vocabulary with ASCII key columns.
fn schema() -> Schema {
    Schema {
        entry_key: "entry_id".to_string(),
        definition_key: "definition_id".to_string(),
        ..Schema::default()
    }
}

#[test]
fn childless_entry_scenario() {
    let workbook = Workbook::new().with_table("詞目", rows(json!([{"entry_id": 1, "text": "a"}])));
    let out = transform(&workbook, &schema()).unwrap();

    let mut expected = json!({"entry_id": 1, "text": "a"});
    for name in ENTRY_RELATIONS {
        expected[name] = json!([]);
    }
    expected["義項"] = json!([]);
    assert_eq!(Value::Object(out.documents[0].clone()), expected);

    assert_eq!(out.rows.len(), 1);
    let row = &out.rows.rows()[0];
    assert_eq!(row["entry_id"], json!(1));
    assert_eq!(row["text"], json!("a"));
    for name in ENTRY_RELATIONS {
        assert_eq!(row[name], Value::Null);
    }
    assert_eq!(row.len(), 2 + ENTRY_RELATIONS.len());
    assert!(!row.contains_key("definition_id"));
    assert!(!row.contains_key("例句"));
}

#[test]
fn sentence_only_on_first_definition_scenario() {
    let workbook = Workbook::new()
        .with_table("詞目", rows(json!([{"entry_id": 2}])))
        .with_table(
            "義項",
            rows(json!([
                {"entry_id": 2, "definition_id": 1},
                {"entry_id": 2, "definition_id": 2},
            ])),
        )
        .with_table(
            "例句",
            rows(json!([{"entry_id": 2, "definition_id": 1, "例句": "伊咧食飯。"}])),
        );
    let out = transform(&workbook, &schema()).unwrap();

    assert_eq!(out.rows.len(), 2);
    let first = &out.rows.rows()[0];
    let second = &out.rows.rows()[1];
    assert_eq!(first["definition_id"], json!(1));
    assert_eq!(first["例句"], json!(r#"[{"例句": "伊咧食飯。"}]"#));
    assert_eq!(second["definition_id"], json!(2));
    assert_eq!(second["例句"], Value::Null);
}

#[test]
fn orphan_definition_never_reaches_output() {
    let workbook = Workbook::new()
        .with_table("詞目", rows(json!([{"entry_id": 1}])))
        .with_table(
            "義項",
            rows(json!([
                {"entry_id": 1, "definition_id": 1, "解說": "kept"},
                {"entry_id": 99, "definition_id": 1, "解說": "orphan"},
            ])),
        );
    let out = transform(&workbook, &schema()).unwrap();

    assert_eq!(out.rows.len(), 1);
    assert!(out.rows.iter().all(|row| row["解說"] != json!("orphan")));
    assert_eq!(out.orphans.definitions, 1);
    assert_eq!(out.definition_count(&schema()), 1);
}

#[test]
fn serialized_relation_parses_back_to_document_list() {
    let workbook = Workbook::new()
        .with_table("詞目", rows(json!([{"entry_id": 7, "漢字": "阿爸"}])))
        .with_table("義項", rows(json!([{"entry_id": 7, "definition_id": 1}])))
        .with_table(
            "詞目tuì詞目近義",
            rows(json!([
                {"entry_id": 7, "對應詞目id": 8, "對應詞目": "老爸"},
                {"entry_id": 7, "對應詞目id": 9, "對應詞目": "爸爸", "備註": null},
            ])),
        )
        .with_table(
            "義項tuì詞目反義",
            rows(json!([{"entry_id": 7, "definition_id": 1, "對應詞目": "阿母"}])),
        );
    let out = transform(&workbook, &schema()).unwrap();
    let doc = &out.documents[0];
    let row = &out.rows.rows()[0];

    for (field, embedded) in [
        ("詞目tuì詞目近義", doc["詞目tuì詞目近義"].clone()),
        ("義項tuì詞目反義", doc["義項"][0]["義項tuì詞目反義"].clone()),
    ] {
        let text = row[field].as_str().expect("serialized cell");
        let parsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, embedded, "{field}");
    }
    assert!(row["詞目tuì詞目近義"].as_str().unwrap().contains("老爸"));
}

#[test]
fn mixed_empty_definition_relations_are_null_per_row() {
    let workbook = Workbook::new()
        .with_table("詞目", rows(json!([{"entry_id": 1}])))
        .with_table(
            "義項",
            rows(json!([
                {"entry_id": 1, "definition_id": 1},
                {"entry_id": 1, "definition_id": 2},
                {"entry_id": 1, "definition_id": 3},
            ])),
        )
        .with_table(
            "義項tuì義項近義",
            rows(json!([{"entry_id": 1, "definition_id": 2, "對應義項id": 1}])),
        );
    let out = transform(&workbook, &schema()).unwrap();
    let cells: Vec<&Value> = out.rows.iter().map(|row| &row["義項tuì義項近義"]).collect();
    assert_eq!(cells[0], &Value::Null);
    assert!(cells[1].is_string());
    assert_eq!(cells[2], &Value::Null);
}

#[test]
fn empty_cells_become_null_in_documents_only() {
    let workbook = Workbook::new()
        .with_table("詞目", rows(json!([{"entry_id": 1, "漢字": ""}])))
        .with_table("異用字", rows(json!([{"entry_id": 1, "異用字": "", "備註": null}])));
    let out = transform(&workbook, &schema()).unwrap();
    let doc = &out.documents[0];
    assert_eq!(doc["漢字"], Value::Null);
    assert_eq!(doc["異用字"], json!([{"異用字": "", "備註": null}]));
}

#[test]
fn float_and_integer_ids_join_across_sheets() {
    let workbook = Workbook::new()
        .with_table("詞目", rows(json!([{"entry_id": 1}])))
        .with_table("義項", rows(json!([{"entry_id": 1.0, "definition_id": 1}])))
        .with_table(
            "例句",
            rows(json!([{"entry_id": 1, "definition_id": 1.0, "例句": "好"}])),
        )
        .with_table("姓", rows(json!([{"entry_id": 1.0, "姓": "林"}])));
    let out = transform(&workbook, &schema()).unwrap();

    let doc = &out.documents[0];
    let defs = doc["義項"].as_array().unwrap();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0]["例句"], json!([{"例句": "好"}]));
    assert_eq!(doc["姓"], json!([{"姓": "林"}]));
    assert!(out.orphans.is_empty());

    // Text ids still never join numeric ones.
    let workbook = Workbook::new()
        .with_table("詞目", rows(json!([{"entry_id": 1}])))
        .with_table("義項", rows(json!([{"entry_id": "1", "definition_id": 1}])));
    let out = transform(&workbook, &schema()).unwrap();
    assert_eq!(out.orphans.definitions, 1);
}
