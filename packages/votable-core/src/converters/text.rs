//! String converters for `char` and `unicodeChar` fields.
//!
//! Character fields hold one string per cell; the arraysize bounds the
//! string length rather than describing an array.

use crate::binary::{write_length, BinaryReader};
use crate::error::{Position, Result, VoError};
use crate::field::{Datatype, FieldDescriptor, MAX_ARRAY_ITEMS};
use crate::value::{Cell, Scalar};
use crate::warnings::{Reporter, Warning};
use crate::xml::escape_cdata;

use super::{mismatch, Converter};

/// Reads the string length of a character field.
///
/// `*` means unbounded; `N` and `N*` mean at most `N` characters. A missing
/// arraysize is a single character (W47).
///
/// # Returns
/// `None` for variable length, `Some(n)` for a fixed length, or `E01` if the
/// bound is not an integer or exceeds [`MAX_ARRAY_ITEMS`].
fn string_length(field: &FieldDescriptor, reporter: &Reporter) -> Result<Option<usize>> {
    let Some(attr) = field.arraysize.as_deref() else {
        reporter.warn(Warning::MissingArraySize, Position::default());
        return Ok(Some(1));
    };

    let attr = attr.trim();
    if attr == "*" {
        return Ok(None);
    }
    let bound = attr.strip_suffix('*').unwrap_or(attr);
    bound
        .parse::<usize>()
        .ok()
        .filter(|&len| len <= MAX_ARRAY_ITEMS)
        .map(Some)
        .ok_or_else(|| VoError::InvalidArraySize {
            size: attr.to_string(),
            datatype: field.datatype.clone(),
            field: field.id.clone(),
        })
}

fn require_ascii(text: &str) -> Result<()> {
    if text.is_ascii() {
        Ok(())
    } else {
        Err(VoError::NonAscii {
            value: text.to_string(),
        })
    }
}

fn text_of<'c>(cell: &'c Cell, datatype: Datatype) -> Result<(&'c str, bool)> {
    match cell {
        Cell::Scalar {
            value: Scalar::Text(text),
            masked,
        } => Ok((text, *masked)),
        other => Err(mismatch(format!("{} string", datatype), other)),
    }
}

fn check_length(
    datatype: Datatype,
    length: Option<usize>,
    units: usize,
    reporter: &Reporter,
    pos: Position,
) {
    if let Some(length) = length {
        if units > length {
            reporter.warn(
                Warning::TooLong {
                    datatype: datatype.to_string(),
                    length,
                },
                pos,
            );
        }
    }
}

fn truncate_at_nul(text: String) -> String {
    match text.find('\0') {
        Some(idx) => text[..idx].to_string(),
        None => text,
    }
}

/// Converter for `char` fields: ASCII text, one byte per character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Char {
    length: Option<usize>,
}

impl Char {
    /// Creates the converter from the field's arraysize.
    pub fn new(field: &FieldDescriptor, reporter: &Reporter) -> Result<Self> {
        Ok(Self {
            length: string_length(field, reporter)?,
        })
    }

    /// Returns the fixed length, or `None` for variable length.
    pub fn length(&self) -> Option<usize> {
        self.length
    }

    fn decode(bytes: &[u8]) -> String {
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            // Latin-1
            Err(_) => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

impl Converter for Char {
    fn datatype(&self) -> Datatype {
        Datatype::Char
    }

    fn is_variable(&self) -> bool {
        self.length.is_none()
    }

    fn binary_width(&self) -> Option<usize> {
        self.length
    }

    fn default_cell(&self) -> Cell {
        Cell::scalar(Scalar::Text(String::new()))
    }

    fn parse(&self, text: &str, reporter: &Reporter, pos: Position) -> Result<Cell> {
        require_ascii(text)?;
        check_length(Datatype::Char, self.length, text.len(), reporter, pos);
        Ok(Cell::scalar(Scalar::Text(text.to_string())))
    }

    fn output(&self, cell: &Cell, _reporter: &Reporter, _pos: Position) -> Result<String> {
        let (text, masked) = text_of(cell, Datatype::Char)?;
        if masked {
            return Ok(String::new());
        }
        Ok(escape_cdata(text).into_owned())
    }

    fn binparse(&self, reader: &mut BinaryReader<'_>) -> Result<Cell> {
        let text = match self.length {
            None => {
                let len = reader.read_length()?;
                Self::decode(reader.read(len)?)
            }
            Some(len) => truncate_at_nul(Self::decode(reader.read(len)?)),
        };
        Ok(Cell::scalar(Scalar::Text(text)))
    }

    /// Writes the text as ASCII bytes; longer text is truncated with W46.
    fn binoutput(
        &self,
        cell: &Cell,
        out: &mut Vec<u8>,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<()> {
        let (text, masked) = text_of(cell, Datatype::Char)?;
        if !masked {
            require_ascii(text)?;
        }
        let bytes = if masked { &[][..] } else { text.as_bytes() };
        match self.length {
            None => {
                write_length(out, bytes.len())?;
                out.extend_from_slice(bytes);
            }
            Some(len) => {
                check_length(Datatype::Char, self.length, bytes.len(), reporter, pos);
                let kept = bytes.len().min(len);
                out.extend_from_slice(&bytes[..kept]);
                out.resize(out.len() + (len - kept), 0);
            }
        }
        Ok(())
    }
}

/// Converter for `unicodeChar` fields: UTF-16BE, two bytes per character.
///
/// Lengths count UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnicodeChar {
    length: Option<usize>,
}

impl UnicodeChar {
    /// Creates the converter from the field's arraysize.
    pub fn new(field: &FieldDescriptor, reporter: &Reporter) -> Result<Self> {
        Ok(Self {
            length: string_length(field, reporter)?,
        })
    }

    /// Returns the fixed length in code units, or `None` for variable length.
    pub fn length(&self) -> Option<usize> {
        self.length
    }

    fn decode(bytes: &[u8]) -> Result<String> {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).map_err(|_| VoError::InvalidUtf16)
    }
}

impl Converter for UnicodeChar {
    fn datatype(&self) -> Datatype {
        Datatype::UnicodeChar
    }

    fn is_variable(&self) -> bool {
        self.length.is_none()
    }

    fn binary_width(&self) -> Option<usize> {
        self.length.and_then(|len| len.checked_mul(2))
    }

    fn default_cell(&self) -> Cell {
        Cell::scalar(Scalar::Text(String::new()))
    }

    fn parse(&self, text: &str, reporter: &Reporter, pos: Position) -> Result<Cell> {
        check_length(
            Datatype::UnicodeChar,
            self.length,
            text.encode_utf16().count(),
            reporter,
            pos,
        );
        Ok(Cell::scalar(Scalar::Text(text.to_string())))
    }

    fn output(&self, cell: &Cell, _reporter: &Reporter, _pos: Position) -> Result<String> {
        let (text, masked) = text_of(cell, Datatype::UnicodeChar)?;
        if masked {
            return Ok(String::new());
        }
        Ok(escape_cdata(text).into_owned())
    }

    fn binparse(&self, reader: &mut BinaryReader<'_>) -> Result<Cell> {
        let text = match self.length {
            None => {
                let len = reader.read_length()?;
                Self::decode(reader.read(len.saturating_mul(2))?)?
            }
            Some(len) => truncate_at_nul(Self::decode(reader.read(len.saturating_mul(2))?)?),
        };
        Ok(Cell::scalar(Scalar::Text(text)))
    }

    fn binoutput(
        &self,
        cell: &Cell,
        out: &mut Vec<u8>,
        _reporter: &Reporter,
        _pos: Position,
    ) -> Result<()> {
        let (text, masked) = text_of(cell, Datatype::UnicodeChar)?;
        let mut units: Vec<u16> = if masked {
            Vec::new()
        } else {
            text.encode_utf16().collect()
        };
        match self.length {
            None => {
                write_length(out, units.len())?;
            }
            Some(len) => units.resize(len, 0),
        }
        for unit in units {
            out.extend_from_slice(&unit.to_be_bytes());
        }
        Ok(())
    }
}
