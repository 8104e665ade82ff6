//! Native in-memory representation of cell values.

use std::fmt;

use crate::field::Datatype;

/// Complex number stored as a real/imaginary pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T> Complex<T> {
    /// Creates a complex number from its parts.
    pub fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

impl Complex<f32> {
    /// Returns `true` if either part is NaN.
    pub fn is_nan(&self) -> bool {
        self.re.is_nan() || self.im.is_nan()
    }
}

impl Complex<f64> {
    /// Returns `true` if either part is NaN.
    pub fn is_nan(&self) -> bool {
        self.re.is_nan() || self.im.is_nan()
    }
}

/// One element of a VOTable column in its native representation.
///
/// Each variant holds the value of the matching [`Datatype`]; `Text` is
/// shared by `char` and `unicodeChar` fields, which hold whole strings
/// rather than single characters.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// boolean or bit
    Bool(bool),
    /// unsignedByte
    UnsignedByte(u8),
    /// short
    Short(i16),
    /// int
    Int(i32),
    /// long
    Long(i64),
    /// float
    Float(f32),
    /// double
    Double(f64),
    /// floatComplex
    FloatComplex(Complex<f32>),
    /// doubleComplex
    DoubleComplex(Complex<f64>),
    /// char or unicodeChar string
    Text(String),
}

impl Scalar {
    /// Returns the datatype of this value.
    ///
    /// `Bool` reports `boolean` and `Text` reports `char`.
    pub fn datatype(&self) -> Datatype {
        match self {
            Scalar::Bool(_) => Datatype::Boolean,
            Scalar::UnsignedByte(_) => Datatype::UnsignedByte,
            Scalar::Short(_) => Datatype::Short,
            Scalar::Int(_) => Datatype::Int,
            Scalar::Long(_) => Datatype::Long,
            Scalar::Float(_) => Datatype::Float,
            Scalar::Double(_) => Datatype::Double,
            Scalar::FloatComplex(_) => Datatype::FloatComplex,
            Scalar::DoubleComplex(_) => Datatype::DoubleComplex,
            Scalar::Text(_) => Datatype::Char,
        }
    }

    /// Returns a short name for the variant, used in type mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "bool",
            Scalar::Text(_) => "text",
            other => other.datatype().name(),
        }
    }

    /// Returns the value as `f64` for the real numeric variants.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Scalar::UnsignedByte(v) => Some(v as f64),
            Scalar::Short(v) => Some(v as f64),
            Scalar::Int(v) => Some(v as f64),
            Scalar::Long(v) => Some(v as f64),
            Scalar::Float(v) => Some(v as f64),
            Scalar::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the string for `Text` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the flag for `Bool` values.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::UnsignedByte(v) => write!(f, "{}", v),
            Scalar::Short(v) => write!(f, "{}", v),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Long(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Double(v) => write!(f, "{}", v),
            Scalar::FloatComplex(c) => write!(f, "({}, {})", c.re, c.im),
            Scalar::DoubleComplex(c) => write!(f, "({}, {})", c.re, c.im),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// N-dimensional array with a per-element null mask.
///
/// # Invariants
///
/// - `values.len() == mask.len() == shape.iter().product()`
/// - elements are stored in BINARY stream order; `shape` lists the
///   dimensions in storage order (the declared arraysize reversed)
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray {
    shape: Vec<usize>,
    values: Vec<Scalar>,
    mask: Vec<bool>,
}

impl MaskedArray {
    /// Creates an array from flat values and mask.
    ///
    /// # Returns
    /// `None` if the lengths disagree with `shape`.
    pub fn new(shape: Vec<usize>, values: Vec<Scalar>, mask: Vec<bool>) -> Option<Self> {
        let items = shape.iter().try_fold(1usize, |items, &dim| items.checked_mul(dim))?;
        if values.len() != items || mask.len() != items {
            return None;
        }
        Some(Self {
            shape,
            values,
            mask,
        })
    }

    /// Creates a one-dimensional array with no masked elements.
    pub fn from_values(values: Vec<Scalar>) -> Self {
        let len = values.len();
        Self {
            shape: vec![len],
            mask: vec![false; len],
            values,
        }
    }

    /// Creates an empty one-dimensional array.
    pub fn empty() -> Self {
        Self::from_values(Vec::new())
    }

    /// Returns the dimensions in storage order.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the flat element values.
    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    /// Returns the flat element mask.
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(value, masked)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Scalar, bool)> {
        self.values.iter().zip(self.mask.iter().copied())
    }

    /// Splits the array into its parts.
    pub fn into_parts(self) -> (Vec<usize>, Vec<Scalar>, Vec<bool>) {
        (self.shape, self.values, self.mask)
    }
}

/// One table cell: a native value paired with its null mask.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Scalar value and whether it is null
    Scalar { value: Scalar, masked: bool },
    /// Array value with element-wise mask
    Array(MaskedArray),
}

impl Cell {
    /// Creates an unmasked scalar cell.
    pub fn scalar(value: Scalar) -> Self {
        Cell::Scalar {
            value,
            masked: false,
        }
    }

    /// Creates a masked scalar cell holding `placeholder`.
    pub fn null_scalar(placeholder: Scalar) -> Self {
        Cell::Scalar {
            value: placeholder,
            masked: true,
        }
    }

    /// Returns `true` if the cell carries no data.
    ///
    /// A cell is null when it is a masked scalar, an empty array, or an
    /// array whose every element is masked.
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Scalar { masked, .. } => *masked,
            Cell::Array(array) => array.mask().iter().all(|m| *m),
        }
    }

    /// Returns the scalar value, if this is a scalar cell.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Cell::Scalar { value, .. } => Some(value),
            Cell::Array(_) => None,
        }
    }

    /// Returns the array, if this is an array cell.
    pub fn as_array(&self) -> Option<&MaskedArray> {
        match self {
            Cell::Array(array) => Some(array),
            Cell::Scalar { .. } => None,
        }
    }

    /// Returns the cell shape: empty for scalars.
    pub fn shape(&self) -> &[usize] {
        match self {
            Cell::Scalar { .. } => &[],
            Cell::Array(array) => array.shape(),
        }
    }
}

impl From<Scalar> for Cell {
    fn from(value: Scalar) -> Self {
        Cell::scalar(value)
    }
}

impl From<MaskedArray> for Cell {
    fn from(array: MaskedArray) -> Self {
        Cell::Array(array)
    }
}
