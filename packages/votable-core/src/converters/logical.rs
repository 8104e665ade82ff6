//! `boolean` and `bit` element codecs.

use crate::binary::BinaryReader;
use crate::error::{Position, Result, VoError};
use crate::field::Datatype;
use crate::value::Scalar;
use crate::warnings::{Reporter, Warning};

use super::{element_mismatch, ElementCodec};

/// Codec for `boolean`.
///
/// TABLEDATA accepts `T`/`F`, `1`/`0`, `true`/`false` in any case, and `?`
/// or an empty cell for null. BINARY uses one ASCII byte: `T`, `F` or `?`
/// (a NUL or space byte also reads as null).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Boolean;

impl Boolean {
    fn native(value: &Scalar) -> Result<bool> {
        value
            .as_bool()
            .ok_or_else(|| element_mismatch(Datatype::Boolean, value))
    }
}

impl ElementCodec for Boolean {
    fn datatype(&self) -> Datatype {
        Datatype::Boolean
    }

    fn parse_element(
        &self,
        text: &str,
        _reporter: &Reporter,
        _pos: Position,
    ) -> Result<(Scalar, bool)> {
        let trimmed = text.trim();
        let parsed = match trimmed.to_ascii_lowercase().as_str() {
            "t" | "1" | "true" => (true, false),
            "f" | "0" | "false" => (false, false),
            "" | "?" | "\0" => (false, true),
            _ => {
                return Err(VoError::InvalidBoolean {
                    value: trimmed.to_string(),
                })
            }
        };
        Ok((Scalar::Bool(parsed.0), parsed.1))
    }

    fn output_element(
        &self,
        value: &Scalar,
        masked: bool,
        _reporter: &Reporter,
        _pos: Position,
    ) -> Result<String> {
        if masked {
            return Ok("?".to_string());
        }
        Ok(if Self::native(value)? { "T" } else { "F" }.to_string())
    }

    fn binparse_element(&self, reader: &mut BinaryReader<'_>) -> Result<(Scalar, bool)> {
        let byte = reader.read_u8()?;
        let parsed = match byte {
            b'T' | b't' | b'1' => (true, false),
            b'F' | b'f' | b'0' => (false, false),
            b'?' | b' ' | 0 => (false, true),
            other => {
                return Err(VoError::InvalidBoolean {
                    value: format!("0x{:02x}", other),
                })
            }
        };
        Ok((Scalar::Bool(parsed.0), parsed.1))
    }

    fn binoutput_element(
        &self,
        value: &Scalar,
        masked: bool,
        out: &mut Vec<u8>,
        _reporter: &Reporter,
        _pos: Position,
    ) -> Result<()> {
        let byte = if masked {
            b'?'
        } else if Self::native(value)? {
            b'T'
        } else {
            b'F'
        };
        out.push(byte);
        Ok(())
    }

    fn default_element(&self) -> Scalar {
        Scalar::Bool(false)
    }

    fn is_null(&self, _value: &Scalar) -> bool {
        false
    }
}

/// Codec for `bit`.
///
/// Bits cannot be null: masked values are written as `0` with W39. A
/// scalar bit takes one byte in BINARY, set to `0x08` when true; arrays of
/// bits are packed by the array wrappers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bit;

impl Bit {
    const TRUE_BYTE: u8 = 0x08;

    fn native(value: &Scalar, masked: bool, reporter: &Reporter, pos: Position) -> Result<bool> {
        if masked {
            reporter.warn(Warning::MaskedBit, pos);
            return Ok(false);
        }
        value
            .as_bool()
            .ok_or_else(|| element_mismatch(Datatype::Bit, value))
    }
}

impl ElementCodec for Bit {
    fn datatype(&self) -> Datatype {
        Datatype::Bit
    }

    fn parse_element(
        &self,
        text: &str,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<(Scalar, bool)> {
        match text.trim() {
            "1" => Ok((Scalar::Bool(true), false)),
            "0" => Ok((Scalar::Bool(false), false)),
            "" => {
                reporter.warn_or_raise(
                    Warning::EmptyCell {
                        datatype: Datatype::Bit.to_string(),
                    },
                    pos,
                )?;
                Ok((Scalar::Bool(false), true))
            }
            other => Err(VoError::InvalidBit {
                value: other.to_string(),
            }),
        }
    }

    fn output_element(
        &self,
        value: &Scalar,
        masked: bool,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<String> {
        let bit = Self::native(value, masked, reporter, pos)?;
        Ok(if bit { "1" } else { "0" }.to_string())
    }

    fn binparse_element(&self, reader: &mut BinaryReader<'_>) -> Result<(Scalar, bool)> {
        let byte = reader.read_u8()?;
        Ok((Scalar::Bool(byte & Self::TRUE_BYTE != 0), false))
    }

    fn binoutput_element(
        &self,
        value: &Scalar,
        masked: bool,
        out: &mut Vec<u8>,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<()> {
        let bit = Self::native(value, masked, reporter, pos)?;
        out.push(if bit { Self::TRUE_BYTE } else { 0 });
        Ok(())
    }

    fn default_element(&self) -> Scalar {
        Scalar::Bool(false)
    }

    fn is_null(&self, _value: &Scalar) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;

    #[test]
    fn test_boolean_tokens() {
        let reporter = Reporter::default();
        let parse = |text: &str| Boolean.parse_element(text, &reporter, Position::default());
        assert_eq!(parse("T").unwrap(), (Scalar::Bool(true), false));
        assert_eq!(parse("true").unwrap(), (Scalar::Bool(true), false));
        assert_eq!(parse(" 0 ").unwrap(), (Scalar::Bool(false), false));
        assert_eq!(parse("False").unwrap(), (Scalar::Bool(false), false));
        assert_eq!(parse("?").unwrap(), (Scalar::Bool(false), true));
        assert_eq!(parse("").unwrap(), (Scalar::Bool(false), true));
        assert_eq!(parse("yes").unwrap_err().code(), Some("E05"));
    }

    #[test]
    fn test_boolean_output() {
        let reporter = Reporter::default();
        let out = |value: bool, masked: bool| {
            Boolean
                .output_element(&Scalar::Bool(value), masked, &reporter, Position::default())
                .unwrap()
        };
        assert_eq!(out(true, false), "T");
        assert_eq!(out(false, false), "F");
        assert_eq!(out(true, true), "?");
    }

    #[test]
    fn test_boolean_binary() {
        let reporter = Reporter::default();
        let mut bytes = Vec::new();
        for (value, masked) in [(true, false), (false, false), (false, true)] {
            Boolean
                .binoutput_element(&Scalar::Bool(value), masked, &mut bytes, &reporter, Position::default())
                .unwrap();
        }
        assert_eq!(bytes, b"TF?".to_vec());

        let mut reader = BinaryReader::new(b"t\0X");
        assert_eq!(Boolean.binparse_element(&mut reader).unwrap(), (Scalar::Bool(true), false));
        assert_eq!(Boolean.binparse_element(&mut reader).unwrap(), (Scalar::Bool(false), true));
        assert_eq!(Boolean.binparse_element(&mut reader).unwrap_err().code(), Some("E05"));
    }

    #[test]
    fn test_bit_parse() {
        let reporter = Reporter::default();
        assert_eq!(
            Bit.parse_element("1", &reporter, Position::default()).unwrap(),
            (Scalar::Bool(true), false)
        );
        assert_eq!(
            Bit.parse_element("2", &reporter, Position::default())
                .unwrap_err()
                .code(),
            Some("E04")
        );
        assert_eq!(
            Bit.parse_element("", &reporter, Position::default()).unwrap(),
            (Scalar::Bool(false), true)
        );
        assert_eq!(reporter.count("W49"), 1);

        let strict = Reporter::new(ParserConfig::pedantic());
        assert!(Bit.parse_element("", &strict, Position::default()).is_err());
    }

    #[test]
    fn test_bit_binary_and_masking() {
        let reporter = Reporter::default();
        let mut bytes = Vec::new();
        Bit.binoutput_element(&Scalar::Bool(true), false, &mut bytes, &reporter, Position::default())
            .unwrap();
        Bit.binoutput_element(&Scalar::Bool(true), true, &mut bytes, &reporter, Position::default())
            .unwrap();
        assert_eq!(bytes, vec![0x08, 0x00]);
        assert_eq!(reporter.count("W39"), 1);

        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(Bit.binparse_element(&mut reader).unwrap(), (Scalar::Bool(true), false));
        assert_eq!(Bit.binparse_element(&mut reader).unwrap(), (Scalar::Bool(false), false));
    }
}
