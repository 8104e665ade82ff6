//! Row-level codec over a table schema.
//!
//! A [`TableCodec`] owns one converter per field and a [`Reporter`] shared
//! by all of them. It converts whole rows between TABLEDATA strings,
//! native cells and the BINARY / BINARY2 streams.

use std::fs;
use std::io::Write;
use std::path::Path;

use base64::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::binary::{pack_bits, packed_len, unpack_bits, BinaryReader};
use crate::converters::{get_converter, Converter};
use crate::error::{Position, Result, VoError};
use crate::field::FieldDescriptor;
use crate::value::{Cell, MaskedArray, Scalar};
use crate::warnings::Reporter;

/// One table row: a cell per field, in schema order.
pub type Row = Vec<Cell>;

/// Ordered list of the fields of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Creates a schema from field descriptors.
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    /// Parses a schema from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| VoError::Config(e.to_string()))
    }

    /// Loads a schema from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serializes the schema as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| VoError::Config(e.to_string()))
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Converts rows of a table with a fixed schema.
#[derive(Debug)]
pub struct TableCodec {
    schema: Schema,
    converters: Vec<Box<dyn Converter>>,
    reporter: Reporter,
}

impl TableCodec {
    /// Builds one converter per field.
    ///
    /// # Arguments
    /// * `schema` - Table fields
    /// * `reporter` - Diagnostics sink used for construction and every conversion
    ///
    /// # Returns
    /// The codec, a `Config` error for a schema without fields, or the first
    /// converter construction error.
    pub fn new(schema: Schema, reporter: Reporter) -> Result<Self> {
        if schema.is_empty() {
            return Err(VoError::Config("schema has no fields".to_string()));
        }

        let converters = schema
            .fields
            .iter()
            .map(|field| get_converter(field, &reporter))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Built table codec with {} fields", converters.len());
        Ok(Self {
            schema,
            converters,
            reporter,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn converters(&self) -> &[Box<dyn Converter>] {
        &self.converters
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    fn check_columns(&self, row: usize, got: usize) -> Result<()> {
        if got != self.converters.len() {
            return Err(VoError::ColumnCount {
                row,
                expected: self.converters.len(),
                got,
            });
        }
        Ok(())
    }

    /// Parses the TABLEDATA strings of one row.
    ///
    /// # Arguments
    /// * `cells` - Cell texts in field order
    /// * `row` - Row index, for diagnostics
    pub fn parse_row<S: AsRef<str>>(&self, cells: &[S], row: usize) -> Result<Row> {
        self.check_columns(row, cells.len())?;
        self.converters
            .iter()
            .zip(cells)
            .enumerate()
            .map(|(field, (converter, text))| {
                converter.parse(text.as_ref(), &self.reporter, Position::new(row, field))
            })
            .collect()
    }

    /// Parses many rows. Rows are independent, so with the `parallel`
    /// feature they are parsed on the rayon thread pool.
    pub fn parse_rows<S: AsRef<str> + Sync>(&self, rows: &[Vec<S>]) -> Result<Vec<Row>> {
        #[cfg(feature = "parallel")]
        let parsed = rows
            .par_iter()
            .enumerate()
            .map(|(idx, cells)| self.parse_row(cells, idx))
            .collect::<Result<Vec<_>>>();

        #[cfg(not(feature = "parallel"))]
        let parsed = rows
            .iter()
            .enumerate()
            .map(|(idx, cells)| self.parse_row(cells, idx))
            .collect::<Result<Vec<_>>>();

        let parsed = parsed?;
        tracing::debug!("Parsed {} TABLEDATA rows", parsed.len());
        Ok(parsed)
    }

    /// Formats one row as TABLEDATA strings (already XML-escaped).
    pub fn output_row(&self, cells: &[Cell], row: usize) -> Result<Vec<String>> {
        self.check_columns(row, cells.len())?;
        self.converters
            .iter()
            .zip(cells)
            .enumerate()
            .map(|(field, (converter, cell))| {
                converter.output(cell, &self.reporter, Position::new(row, field))
            })
            .collect()
    }

    /// Writes rows as a `<TABLEDATA>` XML fragment.
    ///
    /// Empty cells are written as `<TD/>`.
    pub fn write_tabledata<W: Write>(&self, rows: &[Row], writer: &mut W) -> Result<()> {
        writeln!(writer, "<TABLEDATA>")?;
        for (idx, row) in rows.iter().enumerate() {
            writeln!(writer, " <TR>")?;
            for text in self.output_row(row, idx)? {
                if text.is_empty() {
                    writeln!(writer, "  <TD/>")?;
                } else {
                    writeln!(writer, "  <TD>{}</TD>", text)?;
                }
            }
            writeln!(writer, " </TR>")?;
        }
        writeln!(writer, "</TABLEDATA>")?;
        Ok(())
    }

    /// Reads one BINARY row.
    pub fn read_binary_row(&self, reader: &mut BinaryReader<'_>) -> Result<Row> {
        self.converters
            .iter()
            .map(|converter| converter.binparse(reader))
            .collect()
    }

    /// Reads one BINARY2 row: a null bitmask followed by every cell.
    pub fn read_binary2_row(&self, reader: &mut BinaryReader<'_>) -> Result<Row> {
        let bitmask = reader.read(packed_len(self.converters.len()))?;
        let nulls = unpack_bits(bitmask, self.converters.len());
        self.converters
            .iter()
            .zip(nulls)
            .map(|(converter, null)| {
                let cell = converter.binparse(reader)?;
                Ok(if null { mask_cell(cell) } else { cell })
            })
            .collect()
    }

    /// Appends one BINARY row.
    pub fn write_binary_row(&self, cells: &[Cell], row: usize, out: &mut Vec<u8>) -> Result<()> {
        self.check_columns(row, cells.len())?;
        for (field, (converter, cell)) in self.converters.iter().zip(cells).enumerate() {
            converter.binoutput(cell, out, &self.reporter, Position::new(row, field))?;
        }
        Ok(())
    }

    /// Appends one BINARY2 row.
    ///
    /// Null cells set their bit in the row bitmask and are written as the
    /// field's default cell.
    pub fn write_binary2_row(&self, cells: &[Cell], row: usize, out: &mut Vec<u8>) -> Result<()> {
        self.check_columns(row, cells.len())?;
        pack_bits(cells.iter().map(Cell::is_null), out);
        for (field, (converter, cell)) in self.converters.iter().zip(cells).enumerate() {
            let pos = Position::new(row, field);
            if cell.is_null() {
                let placeholder = unmask_cell(converter.default_cell());
                converter.binoutput(&placeholder, out, &self.reporter, pos)?;
            } else {
                converter.binoutput(cell, out, &self.reporter, pos)?;
            }
        }
        Ok(())
    }

    /// Decodes a whole BINARY stream.
    pub fn decode_binary(&self, data: &[u8]) -> Result<Vec<Row>> {
        self.decode_with(data, Self::read_binary_row)
    }

    /// Decodes a whole BINARY2 stream.
    pub fn decode_binary2(&self, data: &[u8]) -> Result<Vec<Row>> {
        self.decode_with(data, Self::read_binary2_row)
    }

    fn decode_with(
        &self,
        data: &[u8],
        read_row: fn(&Self, &mut BinaryReader<'_>) -> Result<Row>,
    ) -> Result<Vec<Row>> {
        let mut reader = BinaryReader::new(data);
        let mut rows = Vec::new();
        while !reader.is_empty() {
            let offset = reader.position();
            tracing::trace!("Reading row {} at offset {}", rows.len(), offset);
            rows.push(read_row(self, &mut reader)?);
            if reader.position() == offset {
                return Err(VoError::ZeroWidthRow {
                    offset,
                    remaining: reader.remaining(),
                });
            }
        }
        tracing::debug!("Decoded {} rows from {} bytes", rows.len(), data.len());
        Ok(rows)
    }

    /// Encodes rows as a BINARY stream.
    pub fn encode_binary(&self, rows: &[Row]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for (idx, row) in rows.iter().enumerate() {
            self.write_binary_row(row, idx, &mut out)?;
        }
        Ok(out)
    }

    /// Encodes rows as a BINARY2 stream.
    pub fn encode_binary2(&self, rows: &[Row]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for (idx, row) in rows.iter().enumerate() {
            self.write_binary2_row(row, idx, &mut out)?;
        }
        Ok(out)
    }
}

fn mask_cell(cell: Cell) -> Cell {
    match cell {
        Cell::Scalar { value, .. } => Cell::null_scalar(value),
        Cell::Array(array) => {
            let (shape, values, mask) = array.into_parts();
            let mask = vec![true; mask.len()];
            Cell::Array(rebuild(shape, values, mask))
        }
    }
}

fn unmask_cell(cell: Cell) -> Cell {
    match cell {
        Cell::Scalar { value, .. } => Cell::scalar(value),
        Cell::Array(array) => {
            let (shape, values, mask) = array.into_parts();
            let mask = vec![false; mask.len()];
            Cell::Array(rebuild(shape, values, mask))
        }
    }
}

fn rebuild(shape: Vec<usize>, values: Vec<Scalar>, mask: Vec<bool>) -> MaskedArray {
    MaskedArray::new(shape, values, mask).unwrap_or_else(MaskedArray::empty)
}

/// Encodes a binary stream for a `<STREAM encoding="base64">` element.
pub fn encode_base64(data: &[u8]) -> String {
    BASE64_STANDARD.encode(data)
}

/// Decodes the content of a `<STREAM encoding="base64">` element.
///
/// Whitespace (including line breaks) is ignored.
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64_STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| VoError::Base64(e.to_string()))
}
