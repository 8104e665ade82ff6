//! Complex number element codecs.

use crate::binary::BinaryReader;
use crate::error::{Position, Result, VoError};
use crate::field::{Datatype, FieldDescriptor};
use crate::value::{Complex, Scalar};
use crate::warnings::Reporter;

use super::format::FloatFormat;
use super::numeric::{format_float, parse_float, FloatElement};
use super::{element_mismatch, split_tokens, ElementCodec};

/// Float type that can form the parts of a complex datatype.
pub trait ComplexPart: FloatElement {
    const COMPLEX: Datatype;

    fn into_complex_scalar(value: Complex<Self>) -> Scalar;
    fn from_complex_scalar(value: &Scalar) -> Option<Complex<Self>>;
}

impl ComplexPart for f32 {
    const COMPLEX: Datatype = Datatype::FloatComplex;

    fn into_complex_scalar(value: Complex<f32>) -> Scalar {
        Scalar::FloatComplex(value)
    }

    fn from_complex_scalar(value: &Scalar) -> Option<Complex<f32>> {
        match value {
            Scalar::FloatComplex(c) => Some(*c),
            _ => None,
        }
    }
}

impl ComplexPart for f64 {
    const COMPLEX: Datatype = Datatype::DoubleComplex;

    fn into_complex_scalar(value: Complex<f64>) -> Scalar {
        Scalar::DoubleComplex(value)
    }

    fn from_complex_scalar(value: &Scalar) -> Option<Complex<f64>> {
        match value {
            Scalar::DoubleComplex(c) => Some(*c),
            _ => None,
        }
    }
}

/// Codec for `floatComplex` and `doubleComplex`.
///
/// TABLEDATA holds the real and imaginary parts as two whitespace
/// separated numbers; BINARY holds them as two consecutive floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexNumber<T: ComplexPart> {
    null: Option<Complex<T>>,
    format: FloatFormat,
}

pub type FloatComplex = ComplexNumber<f32>;
pub type DoubleComplex = ComplexNumber<f64>;

impl<T: ComplexPart> ComplexNumber<T> {
    /// Creates the codec from the field's `null` and `precision` attributes.
    ///
    /// A `null` attribute holding a single number is read as a real value.
    pub fn new(field: &FieldDescriptor) -> Result<Self> {
        let null = match field.null.as_deref() {
            None => None,
            Some(text) => {
                let parts: Vec<&str> = text.split_whitespace().collect();
                match parts.as_slice() {
                    [re] => Some(Complex::new(parse_float::<T>(re)?, T::ZERO)),
                    [re, im] => Some(Complex::new(parse_float::<T>(re)?, parse_float::<T>(im)?)),
                    _ => {
                        return Err(VoError::InvalidComplex {
                            value: text.to_string(),
                        })
                    }
                }
            }
        };
        let format = FloatFormat::from_precision(field.precision.as_deref())?;
        Ok(Self { null, format })
    }

    fn null_value(&self) -> Complex<T> {
        self.null.unwrap_or(Complex::new(T::NAN, T::NAN))
    }

    fn is_null_value(&self, value: Complex<T>) -> bool {
        value.re.is_nan() || value.im.is_nan() || self.null == Some(value)
    }

    fn native(&self, value: &Scalar) -> Result<Complex<T>> {
        T::from_complex_scalar(value).ok_or_else(|| element_mismatch(T::COMPLEX, value))
    }

    fn from_parts(&self, re: &str, im: &str) -> Result<(Scalar, bool)> {
        let value = Complex::new(parse_float::<T>(re)?, parse_float::<T>(im)?);
        Ok((T::into_complex_scalar(value), self.is_null_value(value)))
    }
}

impl<T: ComplexPart> ElementCodec for ComplexNumber<T> {
    fn datatype(&self) -> Datatype {
        T::COMPLEX
    }

    fn tokens_per_element(&self) -> usize {
        2
    }

    fn parse_element(
        &self,
        text: &str,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<(Scalar, bool)> {
        if text.trim().is_empty() {
            return Ok((T::into_complex_scalar(self.null_value()), true));
        }
        let parts = split_tokens(text, reporter, pos);
        match parts.as_slice() {
            [re, im] => self.from_parts(re, im),
            _ => Err(VoError::InvalidComplex {
                value: text.to_string(),
            }),
        }
    }

    fn parse_tokens(
        &self,
        tokens: &[&str],
        _reporter: &Reporter,
        _pos: Position,
    ) -> Result<(Scalar, bool)> {
        match tokens {
            [re, im] => self.from_parts(re, im),
            _ => Err(VoError::InvalidComplex {
                value: tokens.join(" "),
            }),
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
        Ok(format!(
            "{} {}",
            format_float(value.re, self.format),
            format_float(value.im, self.format)
        ))
    }

    fn binparse_element(&self, reader: &mut BinaryReader<'_>) -> Result<(Scalar, bool)> {
        let value = Complex::new(T::read_be(reader)?, T::read_be(reader)?);
        Ok((T::into_complex_scalar(value), self.is_null_value(value)))
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
        value.re.write_be(out);
        value.im.write_be(out);
        Ok(())
    }

    fn default_element(&self) -> Scalar {
        T::into_complex_scalar(self.null_value())
    }

    fn is_null(&self, value: &Scalar) -> bool {
        T::from_complex_scalar(value).is_some_and(|v| self.is_null_value(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> DoubleComplex {
        DoubleComplex::new(&FieldDescriptor::new("z", Datatype::DoubleComplex)).unwrap()
    }

    #[test]
    fn test_parse_pair() {
        let reporter = Reporter::default();
        let (value, masked) = codec()
            .parse_element("1.5 -2", &reporter, Position::default())
            .unwrap();
        assert_eq!(value, Scalar::DoubleComplex(Complex::new(1.5, -2.0)));
        assert!(!masked);
    }

    #[test]
    fn test_wrong_part_count() {
        let reporter = Reporter::default();
        let err = codec()
            .parse_element("1 2 3", &reporter, Position::default())
            .unwrap_err();
        assert_eq!(err.code(), Some("E03"));
        let err = codec()
            .parse_element("1", &reporter, Position::default())
            .unwrap_err();
        assert_eq!(err.code(), Some("E03"));
    }

    #[test]
    fn test_empty_is_masked() {
        let reporter = Reporter::default();
        let (value, masked) = codec()
            .parse_element("", &reporter, Position::default())
            .unwrap();
        assert!(masked);
        assert!(codec().is_null(&value));
    }

    #[test]
    fn test_output_and_binary() {
        let reporter = Reporter::default();
        let value = Scalar::FloatComplex(Complex::new(0.5, 2.0));
        let codec = FloatComplex::new(&FieldDescriptor::new("z", Datatype::FloatComplex)).unwrap();
        assert_eq!(
            codec
                .output_element(&value, false, &reporter, Position::default())
                .unwrap(),
            "0.5 2"
        );

        let mut bytes = Vec::new();
        codec
            .binoutput_element(&value, false, &mut bytes, &reporter, Position::default())
            .unwrap();
        assert_eq!(bytes, vec![0x3F, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00]);
        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(codec.binparse_element(&mut reader).unwrap(), (value, false));
    }

    #[test]
    fn test_null_attribute() {
        let field = FieldDescriptor::new("z", Datatype::DoubleComplex).with_null("-1 0");
        let codec = DoubleComplex::new(&field).unwrap();
        assert!(codec.is_null(&Scalar::DoubleComplex(Complex::new(-1.0, 0.0))));

        let field = FieldDescriptor::new("z", Datatype::DoubleComplex).with_null("1 2 3");
        assert_eq!(DoubleComplex::new(&field).unwrap_err().code(), Some("E03"));
    }
}
