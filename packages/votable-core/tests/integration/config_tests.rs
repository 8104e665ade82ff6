//! Configuration and schema files on disk.

use tempfile::tempdir;

use votable_core::{Datatype, FieldDescriptor, ParserConfig, Pedantic, Reporter, Schema, TableCodec};

#[test]
fn test_config_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("parser.json");

    let config = ParserConfig {
        pedantic: Pedantic::Ignore,
        max_warnings: 3,
    };
    config.save_to_file(&path).unwrap();
    assert_eq!(ParserConfig::from_file(&path).unwrap(), config);
}

#[test]
fn test_partial_config_uses_defaults() {
    let config = ParserConfig::from_json(r#"{"pedantic": "exception"}"#).unwrap();
    assert_eq!(config.pedantic, Pedantic::Exception);
    assert_eq!(config.max_warnings, 10);
}

#[test]
fn test_schema_file_builds_codec() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("schema.json");
    std::fs::write(
        &path,
        r#"{
            "fields": [
                {"id": "source_id", "datatype": "long"},
                {"id": "pos", "datatype": "double", "arraysize": "2", "precision": "E8"},
                {"id": "comment", "name": "Comment", "datatype": "unicodeChar", "arraysize": "*"}
            ]
        }"#,
    )
    .unwrap();

    let schema = Schema::from_file(&path).unwrap();
    assert_eq!(schema.len(), 3);
    assert_eq!(schema.fields[2].name.as_deref(), Some("Comment"));

    let codec = TableCodec::new(schema, Reporter::default()).unwrap();
    assert_eq!(codec.converters()[1].shape(), &[2]);
    assert!(codec.converters()[2].is_variable());
}

#[test]
fn test_schema_json_round_trip() {
    let schema = Schema::new(vec![
        FieldDescriptor::new("a", Datatype::Short).with_null("-32768"),
        FieldDescriptor::new("b", Datatype::Bit).with_arraysize("3x*"),
    ]);
    let json = schema.to_json().unwrap();
    assert!(!json.contains("precision"));
    assert_eq!(Schema::from_json(&json).unwrap(), schema);
}

#[test]
fn test_missing_schema_file() {
    let dir = tempdir().unwrap();
    assert!(Schema::from_file(dir.path().join("absent.json")).is_err());
}
