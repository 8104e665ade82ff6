//! Integer and floating point element codecs.

use std::fmt;
use std::str::FromStr;

use crate::binary::BinaryReader;
use crate::error::{Position, Result, VoError};
use crate::field::{Datatype, FieldDescriptor};
use crate::value::Scalar;
use crate::warnings::{Reporter, Warning};

use super::format::FloatFormat;
use super::{element_mismatch, ElementCodec};

/// Native integer type backing one VOTable integer datatype.
pub trait IntegerElement:
    Copy + PartialEq + fmt::Debug + fmt::Display + Default + Send + Sync + 'static
{
    const DATATYPE: Datatype;

    /// Narrows a parsed literal, or returns `None` if it is out of range.
    fn from_i128(value: i128) -> Option<Self>;
    fn into_scalar(self) -> Scalar;
    fn from_scalar(value: &Scalar) -> Option<Self>;
    fn read_be(reader: &mut BinaryReader<'_>) -> Result<Self>;
    fn write_be(self, out: &mut Vec<u8>);
}

macro_rules! impl_integer_element {
    ($ty:ty, $datatype:ident, $variant:ident, $width:literal) => {
        impl IntegerElement for $ty {
            const DATATYPE: Datatype = Datatype::$datatype;

            fn from_i128(value: i128) -> Option<Self> {
                <$ty>::try_from(value).ok()
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn from_scalar(value: &Scalar) -> Option<Self> {
                match value {
                    Scalar::$variant(v) => Some(*v),
                    _ => None,
                }
            }

            fn read_be(reader: &mut BinaryReader<'_>) -> Result<Self> {
                Ok(<$ty>::from_be_bytes(reader.read_array::<$width>()?))
            }

            fn write_be(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_be_bytes());
            }
        }
    };
}

impl_integer_element!(u8, UnsignedByte, UnsignedByte, 1);
impl_integer_element!(i16, Short, Short, 2);
impl_integer_element!(i32, Int, Int, 4);
impl_integer_element!(i64, Long, Long, 8);

/// Parses a decimal or `0x` hexadecimal integer literal.
fn parse_integer<T: IntegerElement>(text: &str) -> Result<T> {
    let lower = text.trim().to_ascii_lowercase();
    let (negative, digits) = match lower.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, lower.strip_prefix('+').unwrap_or(&lower)),
    };

    let magnitude = match digits.strip_prefix("0x") {
        Some(hex) => i128::from_str_radix(hex, 16),
        None => digits.parse::<i128>(),
    }
    .map_err(|_| VoError::InvalidNumber {
        datatype: T::DATATYPE.to_string(),
        value: text.to_string(),
    })?;

    let value = if negative { -magnitude } else { magnitude };
    T::from_i128(value).ok_or_else(|| VoError::OutOfRange {
        datatype: T::DATATYPE.to_string(),
        value: text.to_string(),
    })
}

/// Codec for the integer datatypes.
///
/// Masked values are written as the field's `null` literal. Without one,
/// TABLEDATA output falls back to `NaN` (W31) and BINARY output fails,
/// since every bit pattern is a valid integer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integer<T: IntegerElement> {
    null: Option<T>,
}

pub type UnsignedByte = Integer<u8>;
pub type Short = Integer<i16>;
pub type Int = Integer<i32>;
pub type Long = Integer<i64>;

impl<T: IntegerElement> Integer<T> {
    /// Creates the codec, parsing the field's `null` attribute if present.
    pub fn new(field: &FieldDescriptor) -> Result<Self> {
        let null = field.null.as_deref().map(parse_integer::<T>).transpose()?;
        Ok(Self { null })
    }

    /// Creates the codec with an explicit null value.
    pub fn with_null(null: Option<T>) -> Self {
        Self { null }
    }

    /// Returns the field's null value.
    pub fn null(&self) -> Option<T> {
        self.null
    }

    fn placeholder(&self) -> Scalar {
        self.null.unwrap_or_default().into_scalar()
    }

    fn native(&self, value: &Scalar) -> Result<T> {
        T::from_scalar(value).ok_or_else(|| element_mismatch(T::DATATYPE, value))
    }
}

impl<T: IntegerElement> ElementCodec for Integer<T> {
    fn datatype(&self) -> Datatype {
        T::DATATYPE
    }

    fn parse_element(
        &self,
        text: &str,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<(Scalar, bool)> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            reporter.warn_or_raise(
                Warning::EmptyCell {
                    datatype: T::DATATYPE.to_string(),
                },
                pos,
            )?;
            return Ok((self.placeholder(), true));
        }

        if trimmed.eq_ignore_ascii_case("nan") {
            if self.null.is_none() {
                reporter.warn_or_raise(Warning::IntegerNan, pos)?;
            }
            return Ok((self.placeholder(), true));
        }

        let value = parse_integer::<T>(trimmed)?;
        Ok((value.into_scalar(), self.null == Some(value)))
    }

    fn output_element(
        &self,
        value: &Scalar,
        masked: bool,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<String> {
        if masked {
            return match self.null {
                Some(null) => Ok(null.to_string()),
                None => {
                    reporter.warn_or_raise(Warning::IntegerNan, pos)?;
                    Ok("NaN".to_string())
                }
            };
        }
        Ok(self.native(value)?.to_string())
    }

    fn binparse_element(&self, reader: &mut BinaryReader<'_>) -> Result<(Scalar, bool)> {
        let value = T::read_be(reader)?;
        Ok((value.into_scalar(), self.null == Some(value)))
    }

    fn binoutput_element(
        &self,
        value: &Scalar,
        masked: bool,
        out: &mut Vec<u8>,
        _reporter: &Reporter,
        pos: Position,
    ) -> Result<()> {
        let value = if masked {
            self.null.ok_or(VoError::Strict {
                warning: Warning::IntegerNan,
                pos,
            })?
        } else {
            self.native(value)?
        };
        value.write_be(out);
        Ok(())
    }

    fn default_element(&self) -> Scalar {
        self.placeholder()
    }

    fn is_null(&self, value: &Scalar) -> bool {
        self.null.is_some() && T::from_scalar(value) == self.null
    }
}

/// Native float type backing `float` and `double`.
pub trait FloatElement:
    Copy + PartialEq + fmt::Debug + FromStr + Send + Sync + 'static
{
    const DATATYPE: Datatype;
    const NAN: Self;
    const ZERO: Self;

    fn is_nan(self) -> bool;
    fn is_finite(self) -> bool;
    fn is_sign_positive(self) -> bool;
    fn into_scalar(self) -> Scalar;
    fn from_scalar(value: &Scalar) -> Option<Self>;
    fn format(self, format: FloatFormat) -> String;
    fn read_be(reader: &mut BinaryReader<'_>) -> Result<Self>;
    fn write_be(self, out: &mut Vec<u8>);
}

macro_rules! impl_float_element {
    ($ty:ty, $datatype:ident, $variant:ident, $width:literal, $format:ident) => {
        impl FloatElement for $ty {
            const DATATYPE: Datatype = Datatype::$datatype;
            const NAN: Self = <$ty>::NAN;
            const ZERO: Self = 0.0;

            fn is_nan(self) -> bool {
                <$ty>::is_nan(self)
            }

            fn is_finite(self) -> bool {
                <$ty>::is_finite(self)
            }

            fn is_sign_positive(self) -> bool {
                <$ty>::is_sign_positive(self)
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn from_scalar(value: &Scalar) -> Option<Self> {
                match value {
                    Scalar::$variant(v) => Some(*v),
                    _ => None,
                }
            }

            fn format(self, format: FloatFormat) -> String {
                format.$format(self)
            }

            fn read_be(reader: &mut BinaryReader<'_>) -> Result<Self> {
                Ok(<$ty>::from_be_bytes(reader.read_array::<$width>()?))
            }

            fn write_be(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_be_bytes());
            }
        }
    };
}

impl_float_element!(f32, Float, Float, 4, format_f32);
impl_float_element!(f64, Double, Double, 8, format_f64);

/// Formats a float, spelling non-finite values as `NaN`, `+InF` and `-InF`.
pub(crate) fn format_float<T: FloatElement>(value: T, format: FloatFormat) -> String {
    if value.is_finite() {
        value.format(format)
    } else if value.is_nan() {
        "NaN".to_string()
    } else if value.is_sign_positive() {
        "+InF".to_string()
    } else {
        "-InF".to_string()
    }
}

/// Parses one float token. Accepts `NaN`, `Inf`, `+InF`, `-Infinity` in any case.
pub(crate) fn parse_float<T: FloatElement>(text: &str) -> Result<T> {
    text.trim().parse::<T>().map_err(|_| VoError::InvalidNumber {
        datatype: T::DATATYPE.to_string(),
        value: text.to_string(),
    })
}

/// Codec for `float` and `double`.
///
/// NaN is always treated as null. An explicit `null` attribute adds a
/// second null value, which is also used when writing masked elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingPoint<T: FloatElement> {
    null: Option<T>,
    format: FloatFormat,
}

pub type Float = FloatingPoint<f32>;
pub type Double = FloatingPoint<f64>;

impl<T: FloatElement> FloatingPoint<T> {
    /// Creates the codec from the field's `null` and `precision` attributes.
    pub fn new(field: &FieldDescriptor) -> Result<Self> {
        let null = field.null.as_deref().map(parse_float::<T>).transpose()?;
        let format = FloatFormat::from_precision(field.precision.as_deref())?;
        Ok(Self { null, format })
    }

    fn null_value(&self) -> T {
        self.null.unwrap_or(T::NAN)
    }

    fn is_null_value(&self, value: T) -> bool {
        value.is_nan() || self.null == Some(value)
    }

    fn native(&self, value: &Scalar) -> Result<T> {
        T::from_scalar(value).ok_or_else(|| element_mismatch(T::DATATYPE, value))
    }
}

impl<T: FloatElement> ElementCodec for FloatingPoint<T> {
    fn datatype(&self) -> Datatype {
        T::DATATYPE
    }

    fn parse_element(
        &self,
        text: &str,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<(Scalar, bool)> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok((self.null_value().into_scalar(), true));
        }

        match parse_float::<T>(trimmed) {
            Ok(value) => Ok((value.into_scalar(), self.is_null_value(value))),
            Err(err) if reporter.is_pedantic() => Err(err),
            Err(_) => {
                reporter.warn(
                    Warning::InvalidFloat {
                        value: trimmed.to_string(),
                    },
                    pos,
                );
                Ok((self.null_value().into_scalar(), true))
            }
        }
    }

    fn output_element(
        &self,
        value: &Scalar,
        masked: bool,
        _reporter: &Reporter,
        _pos: Position,
    ) -> Result<String> {
        let value = if masked {
            self.null_value()
        } else {
            self.native(value)?
        };
        Ok(format_float(value, self.format))
    }

    fn binparse_element(&self, reader: &mut BinaryReader<'_>) -> Result<(Scalar, bool)> {
        let value = T::read_be(reader)?;
        Ok((value.into_scalar(), self.is_null_value(value)))
    }

    fn binoutput_element(
        &self,
        value: &Scalar,
        masked: bool,
        out: &mut Vec<u8>,
        _reporter: &Reporter,
        _pos: Position,
    ) -> Result<()> {
        let value = if masked {
            self.null_value()
        } else {
            self.native(value)?
        };
        value.write_be(out);
        Ok(())
    }

    fn default_element(&self) -> Scalar {
        self.null_value().into_scalar()
    }

    fn is_null(&self, value: &Scalar) -> bool {
        T::from_scalar(value).is_some_and(|v| self.is_null_value(v))
    }
}
