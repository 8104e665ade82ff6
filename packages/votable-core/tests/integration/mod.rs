//! Integration test suite for the converter codec.
//!
//! Tests are organized by area:
//! 1. Scalar and array round trips (text and binary)
//! 2. Strictness modes and warning reporting
//! 3. Table streams (BINARY, BINARY2, base64, TABLEDATA)
//! 4. Configuration and schema files

pub mod config_tests;
pub mod helpers;
pub mod round_trip_tests;
pub mod strictness_tests;
pub mod table_stream_tests;
