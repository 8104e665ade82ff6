//! Shared helpers for the integration suite.

use votable_core::{
    get_converter, Cell, Converter, Datatype, FieldDescriptor, ParserConfig, Position, Reporter,
};
use votable_core::binary::BinaryReader;

/// Builds a converter for `datatype` with an optional arraysize.
pub fn converter(datatype: Datatype, arraysize: Option<&str>) -> Box<dyn Converter> {
    let mut field = FieldDescriptor::new("col", datatype);
    if let Some(size) = arraysize {
        field = field.with_arraysize(size);
    }
    get_converter(&field, &Reporter::default()).unwrap()
}

pub fn lax() -> Reporter {
    Reporter::default()
}

pub fn strict() -> Reporter {
    Reporter::new(ParserConfig::pedantic())
}

/// Encodes a cell and decodes it again, checking the stream is fully consumed.
pub fn binary_round_trip(converter: &dyn Converter, cell: &Cell) -> Cell {
    let mut out = Vec::new();
    converter
        .binoutput(cell, &mut out, &lax(), Position::default())
        .unwrap();
    if let Some(width) = converter.binary_width() {
        assert_eq!(out.len(), width);
    }
    let mut reader = BinaryReader::new(&out);
    let back = converter.binparse(&mut reader).unwrap();
    assert!(reader.is_empty());
    back
}

/// Formats a cell as text and parses it again.
pub fn text_round_trip(converter: &dyn Converter, cell: &Cell) -> Cell {
    let reporter = lax();
    let text = converter.output(cell, &reporter, Position::default()).unwrap();
    converter.parse(&text, &reporter, Position::default()).unwrap()
}
