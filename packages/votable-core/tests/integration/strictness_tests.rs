//! Pedantic, warn and ignore modes, and warning bookkeeping.

use votable_core::{
    get_converter, Cell, Datatype, FieldDescriptor, ParserConfig, Pedantic, Position, Reporter,
    Scalar, VoError,
};

use super::helpers::{converter, lax, strict};

#[test]
fn test_comma_separated_arrays() {
    let conv = converter(Datatype::Int, Some("3"));

    let reporter = lax();
    let cell = conv.parse("1,2,3", &reporter, Position::new(5, 2)).unwrap();
    assert_eq!(cell.as_array().unwrap().len(), 3);
    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].warning.code(), "W01");
    assert_eq!(warnings[0].pos, Position::new(5, 2));

    let err = conv.parse("1,2,3", &strict(), Position::default()).unwrap_err();
    assert!(matches!(err, VoError::ArrayLength { .. } | VoError::InvalidNumber { .. }));
}

#[test]
fn test_invalid_float_modes() {
    let conv = converter(Datatype::Double, None);

    let reporter = lax();
    let cell = conv.parse("1.2.3", &reporter, Position::default()).unwrap();
    assert!(cell.is_null());
    assert_eq!(reporter.count("W30"), 1);

    assert!(conv.parse("1.2.3", &strict(), Position::default()).is_err());
}

#[test]
fn test_ignore_mode_is_silent() {
    let reporter = Reporter::new(ParserConfig {
        pedantic: Pedantic::Ignore,
        ..Default::default()
    });
    let conv = converter(Datatype::Float, Some("2"));
    let cell = conv.parse("1,2,3", &reporter, Position::default()).unwrap();
    assert_eq!(cell.as_array().unwrap().len(), 2);
    assert!(reporter.warnings().is_empty());
}

#[test]
fn test_missing_char_arraysize() {
    let reporter = lax();
    let field = FieldDescriptor::new("flag", Datatype::Char);
    let conv = get_converter(&field, &reporter).unwrap();
    assert_eq!(conv.binary_width(), Some(1));
    assert_eq!(reporter.count("W47"), 1);
}

#[test]
fn test_fatal_codes() {
    let reporter = lax();

    let field = FieldDescriptor::new("x", Datatype::Short).with_arraysize("3xfoo");
    assert_eq!(get_converter(&field, &reporter).unwrap_err().code(), Some("E01"));

    let conv = converter(Datatype::Bit, None);
    assert_eq!(
        conv.parse("x", &reporter, Position::default()).unwrap_err().code(),
        Some("E04")
    );

    let conv = converter(Datatype::Boolean, None);
    assert_eq!(
        conv.parse("maybe", &reporter, Position::default()).unwrap_err().code(),
        Some("E05")
    );

    let conv = converter(Datatype::FloatComplex, None);
    assert_eq!(
        conv.parse("1 2 3", &reporter, Position::default()).unwrap_err().code(),
        Some("E03")
    );

    let mut field = FieldDescriptor::new("x", Datatype::Int);
    field.datatype = "quaternion".to_string();
    let err = get_converter(&field, &reporter).unwrap_err();
    assert_eq!(err.code(), Some("E06"));
    assert!(err.to_string().contains("quaternion"));
}

#[test]
fn test_masked_integer_without_null() {
    let conv = converter(Datatype::Int, None);
    let cell = Cell::null_scalar(Scalar::Int(0));

    let reporter = lax();
    assert_eq!(conv.output(&cell, &reporter, Position::default()).unwrap(), "NaN");
    assert_eq!(reporter.count("W31"), 1);
    assert!(conv.output(&cell, &strict(), Position::default()).is_err());

    let mut out = Vec::new();
    let err = conv
        .binoutput(&cell, &mut out, &reporter, Position::default())
        .unwrap_err();
    assert_eq!(err.code(), Some("W31"));
}

#[test]
fn test_warning_limit_keeps_counting() {
    let reporter = Reporter::new(ParserConfig {
        pedantic: Pedantic::Warn,
        max_warnings: 3,
    });
    let conv = converter(Datatype::Double, Some("*"));
    for row in 0..20 {
        conv.parse("1,2", &reporter, Position::new(row, 0)).unwrap();
    }
    assert_eq!(reporter.count("W01"), 20);
    assert_eq!(reporter.warnings().len(), 3);
    assert_eq!(reporter.total(), 20);
}

#[test]
fn test_reporter_shared_across_threads() {
    let reporter = lax();
    let conv = converter(Datatype::Long, Some("*"));
    std::thread::scope(|scope| {
        for row in 0..4 {
            let reporter = &reporter;
            let conv = conv.as_ref();
            scope.spawn(move || {
                conv.parse("1,2", reporter, Position::new(row, 0)).unwrap();
            });
        }
    });
    assert_eq!(reporter.count("W01"), 4);
}
