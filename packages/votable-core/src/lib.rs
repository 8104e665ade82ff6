//! VOTable datatype converters.
//!
//! Converts cell values between the TABLEDATA text serialization, the
//! BINARY / BINARY2 byte streams and a native masked representation.
//! Provides per-field converters, a row/table codec and the diagnostics
//! machinery for the VOTable E/W codes.

pub mod binary;
pub mod config;
pub mod converters;
pub mod error;
pub mod field;
pub mod table;
pub mod value;
pub mod warnings;
pub mod xml;

pub use config::{ParserConfig, Pedantic};
pub use converters::{get_converter, Converter, ElementCodec};
pub use error::{Position, Result, VoError};
pub use field::{ArraySize, Datatype, FieldDescriptor, MAX_ARRAY_ITEMS};
pub use table::{decode_base64, encode_base64, Row, Schema, TableCodec};
pub use value::{Cell, Complex, MaskedArray, Scalar};
pub use warnings::{Reporter, VoWarning, Warning};
