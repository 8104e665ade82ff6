//! Round trips through TABLEDATA text and BINARY for every datatype.

use votable_core::{Cell, Complex, Datatype, MaskedArray, Position, Scalar};

use super::helpers::{binary_round_trip, converter, lax, text_round_trip};

fn scalar_samples() -> Vec<(Datatype, Scalar)> {
    vec![
        (Datatype::Boolean, Scalar::Bool(true)),
        (Datatype::Bit, Scalar::Bool(true)),
        (Datatype::UnsignedByte, Scalar::UnsignedByte(200)),
        (Datatype::Short, Scalar::Short(-1234)),
        (Datatype::Int, Scalar::Int(i32::MIN)),
        (Datatype::Long, Scalar::Long(i64::MAX)),
        (Datatype::Float, Scalar::Float(0.1)),
        (Datatype::Double, Scalar::Double(1.0 / 3.0)),
        (
            Datatype::FloatComplex,
            Scalar::FloatComplex(Complex::new(1.25, -0.5)),
        ),
        (
            Datatype::DoubleComplex,
            Scalar::DoubleComplex(Complex::new(6.02e23, 1e-300)),
        ),
    ]
}

#[test]
fn test_scalar_round_trips() {
    for (datatype, value) in scalar_samples() {
        let conv = converter(datatype, None);
        let cell = Cell::scalar(value);
        assert_eq!(text_round_trip(conv.as_ref(), &cell), cell, "{}", datatype);
        assert_eq!(binary_round_trip(conv.as_ref(), &cell), cell, "{}", datatype);
    }
}

#[test]
fn test_scalar_binary_widths() {
    let expected = [
        (Datatype::Boolean, 1),
        (Datatype::Bit, 1),
        (Datatype::UnsignedByte, 1),
        (Datatype::Short, 2),
        (Datatype::Int, 4),
        (Datatype::Long, 8),
        (Datatype::Float, 4),
        (Datatype::Double, 8),
        (Datatype::FloatComplex, 8),
        (Datatype::DoubleComplex, 16),
    ];
    for (datatype, width) in expected {
        assert_eq!(converter(datatype, None).binary_width(), Some(width), "{}", datatype);
    }
}

#[test]
fn test_string_round_trips() {
    let cell = Cell::scalar(Scalar::Text("NGC 1068 <Seyfert>".to_string()));
    for datatype in [Datatype::Char, Datatype::UnicodeChar] {
        let conv = converter(datatype, Some("*"));
        assert_eq!(binary_round_trip(conv.as_ref(), &cell), cell);
        let text = conv.output(&cell, &lax(), Position::default()).unwrap();
        assert_eq!(text, "NGC 1068 &lt;Seyfert&gt;");
    }
}

#[test]
fn test_null_tokens() {
    let reporter = lax();
    let null_text = |datatype: Datatype, placeholder: Scalar| {
        converter(datatype, None)
            .output(&Cell::null_scalar(placeholder), &reporter, Position::default())
            .unwrap()
    };
    assert_eq!(null_text(Datatype::Boolean, Scalar::Bool(true)), "?");
    assert_eq!(null_text(Datatype::Double, Scalar::Double(1.0)), "NaN");
    assert_eq!(null_text(Datatype::Float, Scalar::Float(1.0)), "NaN");
    assert_eq!(
        null_text(
            Datatype::DoubleComplex,
            Scalar::DoubleComplex(Complex::new(1.0, 1.0))
        ),
        "NaN NaN"
    );
    assert_eq!(
        converter(Datatype::Char, Some("*"))
            .output(
                &Cell::null_scalar(Scalar::Text("x".into())),
                &reporter,
                Position::default()
            )
            .unwrap(),
        ""
    );
}

#[test]
fn test_binparse_shape_is_reversed_arraysize() {
    let conv = converter(Datatype::Int, Some("2x3x4"));
    assert_eq!(conv.shape(), &[4, 3, 2]);
    assert_eq!(conv.binary_width(), Some(24 * 4));

    let data = vec![0u8; 24 * 4];
    let mut reader = votable_core::binary::BinaryReader::new(&data);
    let cell = conv.binparse(&mut reader).unwrap();
    assert_eq!(cell.shape(), &[4, 3, 2]);
}

#[test]
fn test_fixed_array_round_trips() {
    let conv = converter(Datatype::Double, Some("3x2"));
    let values = (0..6).map(|i| Scalar::Double(i as f64 * 0.5)).collect();
    let cell = Cell::Array(MaskedArray::new(vec![2, 3], values, vec![false; 6]).unwrap());
    assert_eq!(text_round_trip(conv.as_ref(), &cell), cell);
    assert_eq!(binary_round_trip(conv.as_ref(), &cell), cell);
}

#[test]
fn test_bit_array_widths() {
    for (items, width) in [(1, 1), (8, 1), (9, 2), (16, 2), (17, 3)] {
        let conv = converter(Datatype::Bit, Some(&items.to_string()));
        assert_eq!(conv.binary_width(), Some(width));

        let values = (0..items).map(|i| Scalar::Bool(i % 3 == 0)).collect();
        let cell = Cell::Array(MaskedArray::from_values(values));
        assert_eq!(binary_round_trip(conv.as_ref(), &cell), cell);
        assert_eq!(text_round_trip(conv.as_ref(), &cell), cell);
    }
}

#[test]
fn test_variable_array_round_trips() {
    let conv = converter(Datatype::Short, Some("*"));
    let cell = Cell::Array(MaskedArray::from_values(vec![
        Scalar::Short(1),
        Scalar::Short(-2),
        Scalar::Short(300),
    ]));
    assert_eq!(text_round_trip(conv.as_ref(), &cell), cell);
    assert_eq!(binary_round_trip(conv.as_ref(), &cell), cell);

    let conv = converter(Datatype::Long, Some("2x*"));
    let values = (0..4).map(Scalar::Long).collect();
    let cell = Cell::Array(MaskedArray::new(vec![2, 2], values, vec![false; 4]).unwrap());
    assert_eq!(text_round_trip(conv.as_ref(), &cell), cell);
    assert_eq!(binary_round_trip(conv.as_ref(), &cell), cell);
}

#[test]
fn test_bounded_variable_array_is_variable() {
    let conv = converter(Datatype::Int, Some("10*"));
    assert!(conv.is_variable());
    let cell = conv.parse("1 2 3", &lax(), Position::default()).unwrap();
    assert_eq!(cell.shape(), &[3]);
}

#[test]
fn test_precision_controls_text() {
    let field = votable_core::FieldDescriptor::new("ra", Datatype::Double).with_precision("E3");
    let conv = votable_core::get_converter(&field, &lax()).unwrap();
    let text = conv
        .output(&Cell::scalar(Scalar::Double(12345.678)), &lax(), Position::default())
        .unwrap();
    assert_eq!(text, "1.235E+04");
}
