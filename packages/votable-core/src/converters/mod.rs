//! Conversion of VOTable datatypes to and from the TABLEDATA and BINARY
//! representations.
//!
//! Scalar handlers implement [`ElementCodec`]; the wrappers in [`array`]
//! lift an element codec to a whole cell ([`Converter`]) as a scalar, a
//! fixed-size array or a variable-length array. Character types are
//! strings rather than arrays of characters and implement [`Converter`]
//! directly. [`get_converter`] assembles the right chain for a field.

pub mod array;
pub mod complex;
pub mod format;
pub mod logical;
pub mod numeric;
pub mod text;

use std::fmt;

use crate::binary::BinaryReader;
use crate::error::{Position, Result, VoError};
use crate::field::{ArraySize, Datatype, FieldDescriptor};
use crate::value::{Cell, Scalar};
use crate::warnings::{Reporter, Warning};

pub use array::{FixedArray, ScalarConverter, VarArray};
pub use complex::{ComplexNumber, DoubleComplex, FloatComplex};
pub use format::FloatFormat;
pub use logical::{Bit, Boolean};
pub use numeric::{Double, Float, FloatingPoint, Int, Integer, Long, Short, UnsignedByte};
pub use text::{Char, UnicodeChar};

/// Converts whole cells of one field.
///
/// A converter is bound to a single field descriptor and holds only
/// precomputed, read-only state, so one instance can serve many rows and
/// threads.
pub trait Converter: fmt::Debug + Send + Sync {
    /// Datatype of the elements handled by this converter.
    fn datatype(&self) -> Datatype;

    /// Fixed dimensions in storage order.
    ///
    /// Empty for scalars and strings. For variable-length arrays this is
    /// the shape of one item, without the leading variable dimension.
    fn shape(&self) -> &[usize] {
        &[]
    }

    /// Returns `true` if the cell is length-prefixed in BINARY.
    fn is_variable(&self) -> bool {
        false
    }

    /// Number of bytes one cell occupies in BINARY, if it is fixed.
    fn binary_width(&self) -> Option<usize>;

    /// Value used to fill cells that carry no data.
    fn default_cell(&self) -> Cell;

    /// Converts a TABLEDATA string into a native cell.
    ///
    /// # Arguments
    /// * `text` - Cell content, already unescaped
    /// * `reporter` - Diagnostics sink for the current parse
    /// * `pos` - Location of the cell, for diagnostics
    fn parse(&self, text: &str, reporter: &Reporter, pos: Position) -> Result<Cell>;

    /// Converts a native cell into TABLEDATA text.
    ///
    /// Masked scalars produce the datatype's null token. The result is
    /// escaped for inclusion in XML element content.
    fn output(&self, cell: &Cell, reporter: &Reporter, pos: Position) -> Result<String>;

    /// Reads one cell from a BINARY stream.
    fn binparse(&self, reader: &mut BinaryReader<'_>) -> Result<Cell>;

    /// Appends the BINARY encoding of a cell to `out`.
    fn binoutput(
        &self,
        cell: &Cell,
        out: &mut Vec<u8>,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<()>;
}

/// Converts single elements of one scalar datatype.
///
/// Every method works on a `(value, masked)` pair; array wrappers apply
/// them element by element.
pub trait ElementCodec: fmt::Debug + Send + Sync {
    /// Datatype handled by this codec.
    fn datatype(&self) -> Datatype;

    /// Bytes per element in BINARY.
    fn element_width(&self) -> usize {
        self.datatype().size()
    }

    /// Whitespace-separated TABLEDATA tokens per element.
    fn tokens_per_element(&self) -> usize {
        1
    }

    /// Parses one element from its TABLEDATA text.
    fn parse_element(&self, text: &str, reporter: &Reporter, pos: Position)
        -> Result<(Scalar, bool)>;

    /// Parses one element from pre-split tokens.
    ///
    /// `tokens` holds exactly [`tokens_per_element`](Self::tokens_per_element) entries.
    fn parse_tokens(
        &self,
        tokens: &[&str],
        reporter: &Reporter,
        pos: Position,
    ) -> Result<(Scalar, bool)> {
        self.parse_element(tokens.first().copied().unwrap_or(""), reporter, pos)
    }

    /// Formats one element as TABLEDATA text.
    fn output_element(
        &self,
        value: &Scalar,
        masked: bool,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<String>;

    /// Reads one element from a BINARY stream.
    fn binparse_element(&self, reader: &mut BinaryReader<'_>) -> Result<(Scalar, bool)>;

    /// Appends the BINARY encoding of one element.
    fn binoutput_element(
        &self,
        value: &Scalar,
        masked: bool,
        out: &mut Vec<u8>,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<()>;

    /// Value used to pad short arrays and fill empty cells.
    fn default_element(&self) -> Scalar;

    /// Returns `true` if `value` is this field's null value.
    fn is_null(&self, value: &Scalar) -> bool;
}

/// Builds the converter for a field.
///
/// Character fields get a string converter. Other datatypes get a scalar
/// converter, wrapped in a fixed-size array when the arraysize has fixed
/// dimensions and in a variable-length adapter when its last dimension is
/// `*`. Dimensions are reversed into storage order.
///
/// # Arguments
/// * `field` - Field descriptor
/// * `reporter` - Diagnostics sink; receives construction warnings such as W47
///
/// # Returns
/// The converter, or `E06` for an unknown datatype and `E01` for an
/// invalid arraysize.
pub fn get_converter(field: &FieldDescriptor, reporter: &Reporter) -> Result<Box<dyn Converter>> {
    let datatype = field.resolve_datatype()?;

    let converter: Box<dyn Converter> = match datatype {
        Datatype::Char => Box::new(Char::new(field, reporter)?),
        Datatype::UnicodeChar => Box::new(UnicodeChar::new(field, reporter)?),
        _ => {
            let codec = element_codec(datatype, field)?;
            match field.arraysize.as_deref() {
                None => Box::new(ScalarConverter::new(codec)),
                Some(attr) => {
                    let size = ArraySize::parse(attr, field)?;
                    if size.dims().is_empty() {
                        Box::new(VarArray::of_scalars(codec))
                    } else {
                        let array = FixedArray::new(codec, size.storage_shape());
                        if size.is_variable() {
                            Box::new(VarArray::of_arrays(array))
                        } else {
                            Box::new(array)
                        }
                    }
                }
            }
        }
    };

    tracing::debug!(
        "Built converter for field '{}': datatype={}, shape={:?}, variable={}",
        field.id,
        datatype,
        converter.shape(),
        converter.is_variable()
    );
    Ok(converter)
}

/// Builds the element codec for a non-character datatype.
fn element_codec(datatype: Datatype, field: &FieldDescriptor) -> Result<Box<dyn ElementCodec>> {
    let codec: Box<dyn ElementCodec> = match datatype {
        Datatype::Boolean => Box::new(Boolean),
        Datatype::Bit => Box::new(Bit),
        Datatype::UnsignedByte => Box::new(UnsignedByte::new(field)?),
        Datatype::Short => Box::new(Short::new(field)?),
        Datatype::Int => Box::new(Int::new(field)?),
        Datatype::Long => Box::new(Long::new(field)?),
        Datatype::Float => Box::new(Float::new(field)?),
        Datatype::Double => Box::new(Double::new(field)?),
        Datatype::FloatComplex => Box::new(FloatComplex::new(field)?),
        Datatype::DoubleComplex => Box::new(DoubleComplex::new(field)?),
        Datatype::Char | Datatype::UnicodeChar => {
            return Err(VoError::TypeMismatch {
                expected: "non-character datatype".to_string(),
                got: datatype.to_string(),
            })
        }
    };
    Ok(codec)
}

/// Splits array text into element tokens.
///
/// Pedantic parsing accepts only spaces as separators. Otherwise any
/// whitespace or commas separate tokens, and commas raise W01.
pub(crate) fn split_tokens<'t>(text: &'t str, reporter: &Reporter, pos: Position) -> Vec<&'t str> {
    if reporter.is_pedantic() {
        return text.split(' ').filter(|t| !t.is_empty()).collect();
    }
    if text.contains(',') {
        reporter.warn(Warning::CommaSeparator, pos);
    }
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect()
}

/// Splits bit array text into one token per character, ignoring whitespace.
///
/// Commas are also ignored (with W01) outside pedantic mode.
pub(crate) fn split_bits<'t>(text: &'t str, reporter: &Reporter, pos: Position) -> Vec<&'t str> {
    let lax = !reporter.is_pedantic();
    if lax && text.contains(',') {
        reporter.warn(Warning::CommaSeparator, pos);
    }
    text.matches(|c: char| !c.is_whitespace() && !(lax && c == ','))
        .collect()
}

/// Error for a cell whose native value does not fit the converter.
pub(crate) fn mismatch(expected: impl fmt::Display, got: &Cell) -> VoError {
    let got = match got {
        Cell::Scalar { value, .. } => format!("scalar {}", value.kind()),
        Cell::Array(array) => format!("array of shape {:?}", array.shape()),
    };
    VoError::TypeMismatch {
        expected: expected.to_string(),
        got,
    }
}

/// Error for an element whose native value does not fit the codec.
pub(crate) fn element_mismatch(expected: Datatype, got: &Scalar) -> VoError {
    VoError::TypeMismatch {
        expected: expected.to_string(),
        got: got.kind().to_string(),
    }
}
