//! Field descriptors and the VOTable datatype enumeration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoError};

/// VOTable primitive datatypes.
///
/// Each variant corresponds to one value of the `datatype` attribute of a
/// `FIELD` or `PARAM` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datatype {
    /// Logical value stored as one ASCII byte
    Boolean,
    /// Single bit
    Bit,
    /// Unsigned 8-bit integer
    UnsignedByte,
    /// Signed 16-bit integer
    Short,
    /// Signed 32-bit integer
    Int,
    /// Signed 64-bit integer
    Long,
    /// 7-bit ASCII character
    Char,
    /// UCS-2 character
    UnicodeChar,
    /// Single-precision IEEE float
    Float,
    /// Double-precision IEEE float
    Double,
    /// Pair of single-precision floats
    FloatComplex,
    /// Pair of double-precision floats
    DoubleComplex,
}

impl Datatype {
    /// All datatypes, in VOTable declaration order.
    pub const ALL: [Datatype; 12] = [
        Datatype::Boolean,
        Datatype::Bit,
        Datatype::UnsignedByte,
        Datatype::Short,
        Datatype::Int,
        Datatype::Long,
        Datatype::Char,
        Datatype::UnicodeChar,
        Datatype::Float,
        Datatype::Double,
        Datatype::FloatComplex,
        Datatype::DoubleComplex,
    ];

    /// Looks up a datatype by its attribute spelling.
    pub fn from_name(name: &str) -> Option<Datatype> {
        Self::ALL.iter().copied().find(|ty| ty.name() == name)
    }

    /// Returns the attribute spelling of this datatype.
    pub fn name(&self) -> &'static str {
        match self {
            Datatype::Boolean => "boolean",
            Datatype::Bit => "bit",
            Datatype::UnsignedByte => "unsignedByte",
            Datatype::Short => "short",
            Datatype::Int => "int",
            Datatype::Long => "long",
            Datatype::Char => "char",
            Datatype::UnicodeChar => "unicodeChar",
            Datatype::Float => "float",
            Datatype::Double => "double",
            Datatype::FloatComplex => "floatComplex",
            Datatype::DoubleComplex => "doubleComplex",
        }
    }

    /// Returns the size in bytes of one element in the BINARY encoding.
    ///
    /// `bit` reports 1 because a lone bit occupies a whole byte; bit arrays
    /// are packed and sized separately.
    pub fn size(&self) -> usize {
        match self {
            Datatype::Boolean | Datatype::Bit | Datatype::UnsignedByte | Datatype::Char => 1,
            Datatype::Short | Datatype::UnicodeChar => 2,
            Datatype::Int | Datatype::Float => 4,
            Datatype::Long | Datatype::Double | Datatype::FloatComplex => 8,
            Datatype::DoubleComplex => 16,
        }
    }

    /// Returns `true` for the character datatypes.
    pub fn is_text(&self) -> bool {
        matches!(self, Datatype::Char | Datatype::UnicodeChar)
    }

    /// Returns `true` for the integral datatypes.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Datatype::UnsignedByte | Datatype::Short | Datatype::Int | Datatype::Long
        )
    }

    /// Returns `true` for `float` and `double`.
    pub fn is_float(&self) -> bool {
        matches!(self, Datatype::Float | Datatype::Double)
    }

    /// Returns `true` for the complex datatypes.
    pub fn is_complex(&self) -> bool {
        matches!(self, Datatype::FloatComplex | Datatype::DoubleComplex)
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Largest element count a fixed dimension product or string length may
/// declare; BINARY length prefixes are 32-bit.
pub const MAX_ARRAY_ITEMS: usize = u32::MAX as usize;

/// Parsed `arraysize` attribute of a non-character field.
///
/// # Invariants
///
/// - `dims` lists the fixed dimensions in declaration order (first varies fastest)
/// - `variable` is set when the last declared dimension is `*`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArraySize {
    dims: Vec<usize>,
    variable: bool,
}

impl ArraySize {
    /// Parses an arraysize specifier such as `"3"`, `"2x3"`, `"*"` or `"4x*"`.
    ///
    /// # Arguments
    /// * `attr` - The attribute value
    /// * `field` - Descriptor the attribute belongs to (for error messages)
    ///
    /// # Returns
    /// The parsed size, or `E01` if any dimension is not an integer or the
    /// fixed dimensions cover more than [`MAX_ARRAY_ITEMS`] elements.
    pub fn parse(attr: &str, field: &FieldDescriptor) -> Result<Self> {
        let invalid = || VoError::InvalidArraySize {
            size: attr.to_string(),
            datatype: field.datatype.clone(),
            field: field.id.clone(),
        };

        let trimmed = attr.trim();
        let (fixed, variable) = match trimmed.strip_suffix('*') {
            // The bound of "N*" or "AxN*" is advisory; the dimension is read as unbounded.
            Some(rest) => match rest.rfind('x') {
                Some(last_x) => (&rest[..last_x], true),
                None => ("", true),
            },
            None => (trimmed, false),
        };

        let dims = if fixed.is_empty() {
            Vec::new()
        } else {
            fixed
                .split('x')
                .map(|dim| dim.trim().parse::<usize>().map_err(|_| invalid()))
                .collect::<Result<Vec<_>>>()?
        };

        if dims.is_empty() && !variable {
            return Err(invalid());
        }

        dims.iter()
            .try_fold(1usize, |items, &dim| items.checked_mul(dim))
            .filter(|&items| items <= MAX_ARRAY_ITEMS)
            .ok_or_else(invalid)?;

        Ok(Self { dims, variable })
    }

    /// Returns the fixed dimensions in declaration order.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns `true` if the outermost dimension is unbounded.
    pub fn is_variable(&self) -> bool {
        self.variable
    }

    /// Returns the fixed dimensions reversed into storage order.
    pub fn storage_shape(&self) -> Vec<usize> {
        self.dims.iter().rev().copied().collect()
    }

    /// Returns the number of elements covered by the fixed dimensions.
    pub fn items(&self) -> usize {
        self.dims.iter().product()
    }
}

/// Schema entry describing one table column.
///
/// Descriptors are immutable once built; the datatype is kept as the raw
/// attribute string so an unknown name can be reported against the field
/// that declared it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field identifier (`ID` attribute)
    pub id: String,
    /// Human readable name (`name` attribute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Datatype attribute value
    pub datatype: String,
    /// Arraysize attribute value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arraysize: Option<String>,
    /// Precision attribute value (`E<n>`, `F<n>` or `<n>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<String>,
    /// Null literal from the `VALUES` element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null: Option<String>,
}

impl FieldDescriptor {
    /// Creates a scalar field descriptor.
    #[must_use]
    pub fn new(id: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            id: id.into(),
            name: None,
            datatype: datatype.name().to_string(),
            arraysize: None,
            precision: None,
            null: None,
        }
    }

    /// Sets the arraysize attribute.
    #[must_use]
    pub fn with_arraysize(mut self, arraysize: impl Into<String>) -> Self {
        self.arraysize = Some(arraysize.into());
        self
    }

    /// Sets the precision attribute.
    #[must_use]
    pub fn with_precision(mut self, precision: impl Into<String>) -> Self {
        self.precision = Some(precision.into());
        self
    }

    /// Sets the null literal.
    #[must_use]
    pub fn with_null(mut self, null: impl Into<String>) -> Self {
        self.null = Some(null.into());
        self
    }

    /// Sets the human readable name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Resolves the datatype attribute.
    ///
    /// # Returns
    /// The datatype, or `E06` if the attribute names no VOTable datatype.
    pub fn resolve_datatype(&self) -> Result<Datatype> {
        Datatype::from_name(&self.datatype).ok_or_else(|| VoError::UnknownDatatype {
            datatype: self.datatype.clone(),
            field: self.id.clone(),
        })
    }
}
