//! Whole-table conversion through BINARY, BINARY2, base64 and TABLEDATA.

use votable_core::{
    decode_base64, encode_base64, Cell, Datatype, FieldDescriptor, Reporter, Row, Schema, Scalar,
    TableCodec, VoError,
};

fn catalog_schema() -> Schema {
    Schema::new(vec![
        FieldDescriptor::new("id", Datatype::Long).with_null("-1"),
        FieldDescriptor::new("name", Datatype::Char).with_arraysize("12"),
        FieldDescriptor::new("ra", Datatype::Double).with_precision("F6"),
        FieldDescriptor::new("flags", Datatype::Bit).with_arraysize("4"),
        FieldDescriptor::new("spectrum", Datatype::Float).with_arraysize("*"),
        FieldDescriptor::new("label", Datatype::UnicodeChar).with_arraysize("*"),
        FieldDescriptor::new("good", Datatype::Boolean),
    ])
}

fn catalog_rows(codec: &TableCodec) -> Vec<Row> {
    let text = [
        ["1", "M31", "10.684708", "1010", "1.5 2.5 3.5", "Andromeda", "T"],
        ["2", "M33", "23.462042", "0001", "", "Triangulum", "F"],
        ["-1", "", "83.822083", "1111", "0.25", "Orion", "?"],
    ];
    let rows: Vec<Vec<&str>> = text.iter().map(|row| row.to_vec()).collect();
    codec.parse_rows(&rows).unwrap()
}

#[test]
fn test_binary_round_trip() {
    let codec = TableCodec::new(catalog_schema(), Reporter::default()).unwrap();
    let rows = catalog_rows(&codec);
    let data = codec.encode_binary(&rows).unwrap();
    let decoded = codec.decode_binary(&data).unwrap();
    assert_eq!(decoded, rows);
    assert!(codec.reporter().warnings().is_empty());
}

#[test]
fn test_binary2_round_trip_marks_nulls() {
    let codec = TableCodec::new(catalog_schema(), Reporter::default()).unwrap();
    let rows = catalog_rows(&codec);
    let data = codec.encode_binary2(&rows).unwrap();
    let decoded = codec.decode_binary2(&data).unwrap();
    assert_eq!(decoded, rows);

    // Row 0 has no nulls; its bitmask is the first byte of the stream.
    assert_eq!(data[0], 0);
    assert!(decoded[2][0].is_null());
    assert!(decoded[2][6].is_null());
    assert!(decoded[1][4].is_null());
}

#[test]
fn test_base64_stream() {
    let codec = TableCodec::new(catalog_schema(), Reporter::default()).unwrap();
    let rows = catalog_rows(&codec);
    let data = codec.encode_binary(&rows).unwrap();

    let encoded = encode_base64(&data);
    let wrapped: String = encoded
        .as_bytes()
        .chunks(60)
        .map(|line| format!("{}\n", String::from_utf8_lossy(line)))
        .collect();
    let decoded = decode_base64(&wrapped).unwrap();
    assert_eq!(decoded, data);
    assert_eq!(codec.decode_binary(&decoded).unwrap(), rows);
}

#[test]
fn test_tabledata_output() {
    let codec = TableCodec::new(catalog_schema(), Reporter::default()).unwrap();
    let rows = catalog_rows(&codec);
    let mut out = Vec::new();
    codec.write_tabledata(&rows[2..], &mut out).unwrap();
    let xml = String::from_utf8(out).unwrap();
    assert_eq!(
        xml,
        concat!(
            "<TABLEDATA>\n",
            " <TR>\n",
            "  <TD>-1</TD>\n",
            "  <TD/>\n",
            "  <TD>83.822083</TD>\n",
            "  <TD>1111</TD>\n",
            "  <TD>0.25</TD>\n",
            "  <TD>Orion</TD>\n",
            "  <TD>?</TD>\n",
            " </TR>\n",
            "</TABLEDATA>\n"
        )
    );
}

#[test]
fn test_fixed_char_width_in_stream() {
    let schema = Schema::new(vec![FieldDescriptor::new("name", Datatype::Char).with_arraysize("4")]);
    let codec = TableCodec::new(schema, Reporter::default()).unwrap();
    let rows = vec![vec![Cell::scalar(Scalar::Text("Vega".into()))]; 3];
    let data = codec.encode_binary(&rows).unwrap();
    assert_eq!(data.len(), 12);
    assert_eq!(codec.decode_binary(&data).unwrap(), rows);
}

#[test]
fn test_truncated_stream_errors() {
    let codec = TableCodec::new(catalog_schema(), Reporter::default()).unwrap();
    let rows = catalog_rows(&codec);
    let data = codec.encode_binary(&rows).unwrap();
    let err = codec.decode_binary(&data[..data.len() - 3]).unwrap_err();
    assert!(matches!(err, VoError::UnexpectedEof { .. }));
}

#[test]
fn test_bad_field_fails_codec_construction() {
    let schema = Schema::new(vec![
        FieldDescriptor::new("ok", Datatype::Int),
        FieldDescriptor::new("bad", Datatype::Int).with_arraysize("x"),
    ]);
    let err = TableCodec::new(schema, Reporter::default()).unwrap_err();
    assert_eq!(err.code(), Some("E01"));
}
