//! Cell converters built from element codecs.
//!
//! - [`ScalarConverter`]: one element per cell
//! - [`FixedArray`]: a fixed number of elements, for numeric, boolean,
//!   complex and bit arrays (bits are packed MSB-first in BINARY)
//! - [`VarArray`]: a length-prefixed sequence of elements or of fixed arrays

use crate::binary::{pack_bits, packed_len, unpack_bits, write_length, BinaryReader};
use crate::error::{Position, Result, VoError};
use crate::field::Datatype;
use crate::value::{Cell, MaskedArray, Scalar};
use crate::warnings::{Reporter, Warning};

use super::{element_mismatch, mismatch, split_bits, split_tokens, Converter, ElementCodec};

fn build_array(shape: Vec<usize>, values: Vec<Scalar>, mask: Vec<bool>) -> Result<MaskedArray> {
    let got = values.len();
    MaskedArray::new(shape, values, mask).ok_or_else(|| VoError::TypeMismatch {
        expected: "values matching the array shape".to_string(),
        got: format!("{} values", got),
    })
}

fn bools(values: &[Scalar], datatype: Datatype) -> Result<Vec<bool>> {
    values
        .iter()
        .map(|v| v.as_bool().ok_or_else(|| element_mismatch(datatype, v)))
        .collect()
}

/// Converts a single element per cell.
#[derive(Debug)]
pub struct ScalarConverter {
    codec: Box<dyn ElementCodec>,
}

impl ScalarConverter {
    pub fn new(codec: Box<dyn ElementCodec>) -> Self {
        Self { codec }
    }
}

impl Converter for ScalarConverter {
    fn datatype(&self) -> Datatype {
        self.codec.datatype()
    }

    fn binary_width(&self) -> Option<usize> {
        Some(self.codec.element_width())
    }

    fn default_cell(&self) -> Cell {
        let value = self.codec.default_element();
        let masked = self.codec.is_null(&value);
        Cell::Scalar { value, masked }
    }

    fn parse(&self, text: &str, reporter: &Reporter, pos: Position) -> Result<Cell> {
        let (value, masked) = self.codec.parse_element(text, reporter, pos)?;
        Ok(Cell::Scalar { value, masked })
    }

    fn output(&self, cell: &Cell, reporter: &Reporter, pos: Position) -> Result<String> {
        match cell {
            Cell::Scalar { value, masked } => {
                self.codec.output_element(value, *masked, reporter, pos)
            }
            other => Err(mismatch(format!("scalar {}", self.datatype()), other)),
        }
    }

    fn binparse(&self, reader: &mut BinaryReader<'_>) -> Result<Cell> {
        let (value, masked) = self.codec.binparse_element(reader)?;
        Ok(Cell::Scalar { value, masked })
    }

    fn binoutput(
        &self,
        cell: &Cell,
        out: &mut Vec<u8>,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<()> {
        match cell {
            Cell::Scalar { value, masked } => {
                self.codec
                    .binoutput_element(value, *masked, out, reporter, pos)
            }
            other => Err(mismatch(format!("scalar {}", self.datatype()), other)),
        }
    }
}

/// Converts arrays with a fixed number of elements.
///
/// # Invariants
///
/// - `items == shape.iter().product()`
/// - `shape` is in storage order (the declared arraysize reversed)
#[derive(Debug)]
pub struct FixedArray {
    codec: Box<dyn ElementCodec>,
    shape: Vec<usize>,
    items: usize,
}

impl FixedArray {
    /// Creates a fixed array converter.
    ///
    /// # Arguments
    /// * `codec` - Element codec
    /// * `shape` - Dimensions in storage order
    pub fn new(codec: Box<dyn ElementCodec>, shape: Vec<usize>) -> Self {
        let items = shape.iter().fold(1usize, |items, &dim| items.saturating_mul(dim));
        Self {
            codec,
            shape,
            items,
        }
    }

    /// Returns the number of elements per array.
    pub fn items(&self) -> usize {
        self.items
    }

    fn is_bit(&self) -> bool {
        self.codec.datatype() == Datatype::Bit
    }

    fn is_complex(&self) -> bool {
        self.codec.datatype().is_complex()
    }

    /// Number of text tokens making up one array.
    pub(crate) fn token_count(&self) -> usize {
        self.items.saturating_mul(self.codec.tokens_per_element())
    }

    pub(crate) fn split<'t>(&self, text: &'t str, reporter: &Reporter, pos: Position) -> Vec<&'t str> {
        if self.is_bit() {
            split_bits(text, reporter, pos)
        } else {
            split_tokens(text, reporter, pos)
        }
    }

    /// Parses tokens into elements, grouping them per element.
    pub(crate) fn parse_tokens(
        &self,
        tokens: &[&str],
        reporter: &Reporter,
        pos: Position,
    ) -> Result<(Vec<Scalar>, Vec<bool>)> {
        let per_element = self.codec.tokens_per_element().max(1);
        let mut values = Vec::with_capacity(tokens.len() / per_element);
        let mut mask = Vec::with_capacity(tokens.len() / per_element);
        for chunk in tokens.chunks(per_element) {
            let (value, masked) = self.codec.parse_tokens(chunk, reporter, pos)?;
            values.push(value);
            mask.push(masked);
        }
        Ok((values, mask))
    }

    pub(crate) fn output_elements(
        &self,
        values: &[Scalar],
        mask: &[bool],
        reporter: &Reporter,
        pos: Position,
    ) -> Result<String> {
        let separator = if self.is_bit() { "" } else { " " };
        let parts = values
            .iter()
            .zip(mask)
            .map(|(value, masked)| self.codec.output_element(value, *masked, reporter, pos))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(separator))
    }

    /// Reads one array's worth of elements.
    pub(crate) fn read_elements(
        &self,
        reader: &mut BinaryReader<'_>,
    ) -> Result<(Vec<Scalar>, Vec<bool>)> {
        if self.is_bit() {
            let bytes = reader.read(packed_len(self.items))?;
            let values = unpack_bits(bytes, self.items)
                .into_iter()
                .map(Scalar::Bool)
                .collect();
            return Ok((values, vec![false; self.items]));
        }

        let mut values = Vec::with_capacity(self.items);
        let mut mask = Vec::with_capacity(self.items);
        for _ in 0..self.items {
            let (value, masked) = self.codec.binparse_element(reader)?;
            values.push(value);
            mask.push(masked);
        }
        Ok((values, mask))
    }

    /// Writes one array's worth of elements.
    pub(crate) fn write_elements(
        &self,
        values: &[Scalar],
        mask: &[bool],
        out: &mut Vec<u8>,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<()> {
        if self.is_bit() {
            if mask.iter().any(|m| *m) {
                reporter.warn(Warning::MaskedBit, pos);
            }
            let bits = bools(values, Datatype::Bit)?;
            let bits = bits.iter().zip(mask).map(|(bit, masked)| *bit && !*masked);
            pack_bits(bits, out);
            return Ok(());
        }

        for (value, masked) in values.iter().zip(mask) {
            self.codec
                .binoutput_element(value, *masked, out, reporter, pos)?;
        }
        Ok(())
    }

    fn default_parts(&self, count: usize) -> (Vec<Scalar>, Vec<bool>) {
        let value = self.codec.default_element();
        let masked = self.codec.is_null(&value);
        (vec![value; count], vec![masked; count])
    }

    fn array_of<'c>(&self, cell: &'c Cell) -> Result<&'c MaskedArray> {
        match cell {
            Cell::Array(array) if array.len() == self.items => Ok(array),
            other => Err(mismatch(
                format!("{} array of shape {:?}", self.datatype(), self.shape),
                other,
            )),
        }
    }
}

impl Converter for FixedArray {
    fn datatype(&self) -> Datatype {
        self.codec.datatype()
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn binary_width(&self) -> Option<usize> {
        if self.is_bit() {
            Some(packed_len(self.items))
        } else {
            self.items.checked_mul(self.codec.element_width())
        }
    }

    fn default_cell(&self) -> Cell {
        let (values, mask) = self.default_parts(self.items);
        Cell::Array(MaskedArray::new(self.shape.clone(), values, mask).unwrap_or_else(MaskedArray::empty))
    }

    /// Parses the array, padding or truncating to the declared size
    /// outside pedantic mode. Complex arrays must always match exactly.
    fn parse(&self, text: &str, reporter: &Reporter, pos: Position) -> Result<Cell> {
        let mut tokens = self.split(text, reporter, pos);
        let expected = self.token_count();

        if tokens.len() != expected {
            let got = tokens.len();
            if reporter.is_pedantic() || self.is_complex() {
                return Err(VoError::ArrayLength { expected, got });
            }
            reporter.warn(Warning::ArrayLength { expected, got }, pos);
            tokens.truncate(expected);
        }

        let (mut values, mut mask) = self.parse_tokens(&tokens, reporter, pos)?;
        if values.len() < self.items {
            let (pad_values, pad_mask) = self.default_parts(self.items - values.len());
            values.extend(pad_values);
            mask.extend(pad_mask);
        }
        Ok(Cell::Array(build_array(self.shape.clone(), values, mask)?))
    }

    fn output(&self, cell: &Cell, reporter: &Reporter, pos: Position) -> Result<String> {
        let array = self.array_of(cell)?;
        self.output_elements(array.values(), array.mask(), reporter, pos)
    }

    fn binparse(&self, reader: &mut BinaryReader<'_>) -> Result<Cell> {
        let (values, mask) = self.read_elements(reader)?;
        Ok(Cell::Array(build_array(self.shape.clone(), values, mask)?))
    }

    fn binoutput(
        &self,
        cell: &Cell,
        out: &mut Vec<u8>,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<()> {
        let array = self.array_of(cell)?;
        self.write_elements(array.values(), array.mask(), out, reporter, pos)
    }
}

/// Item type of a variable-length array.
#[derive(Debug)]
enum VarItem {
    Scalar(Box<dyn ElementCodec>),
    Array(FixedArray),
}

/// Converts variable-length arrays.
///
/// BINARY cells start with a 4-byte item count. Items are either single
/// elements or fixed arrays; bit items are packed into `ceil(count / 8)`
/// bytes after the count.
#[derive(Debug)]
pub struct VarArray {
    item: VarItem,
}

impl VarArray {
    /// Creates a variable-length array of single elements.
    pub fn of_scalars(codec: Box<dyn ElementCodec>) -> Self {
        Self {
            item: VarItem::Scalar(codec),
        }
    }

    /// Creates a variable-length array whose items are fixed arrays.
    pub fn of_arrays(array: FixedArray) -> Self {
        Self {
            item: VarItem::Array(array),
        }
    }

    fn codec(&self) -> &dyn ElementCodec {
        match &self.item {
            VarItem::Scalar(codec) => codec.as_ref(),
            VarItem::Array(array) => array.codec.as_ref(),
        }
    }

    fn item_len(&self) -> usize {
        match &self.item {
            VarItem::Scalar(_) => 1,
            VarItem::Array(array) => array.items(),
        }
    }

    fn cell_shape(&self, count: usize) -> Vec<usize> {
        let mut shape = vec![count];
        shape.extend_from_slice(self.shape());
        shape
    }

    fn array_of<'c>(&self, cell: &'c Cell) -> Result<&'c MaskedArray> {
        let item_len = self.item_len();
        match cell {
            Cell::Array(array) if item_len == 0 || array.len() % item_len == 0 => Ok(array),
            other => Err(mismatch(
                format!("{} array with items of shape {:?}", self.datatype(), self.shape()),
                other,
            )),
        }
    }

    fn parse_scalars(
        &self,
        codec: &dyn ElementCodec,
        text: &str,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<(Vec<Scalar>, Vec<bool>)> {
        let tokens = if codec.datatype() == Datatype::Bit {
            split_bits(text, reporter, pos)
        } else {
            split_tokens(text, reporter, pos)
        };

        let per_element = codec.tokens_per_element().max(1);
        if tokens.len() % per_element != 0 {
            return Err(VoError::ArrayLength {
                expected: per_element,
                got: tokens.len(),
            });
        }

        let mut values = Vec::with_capacity(tokens.len() / per_element);
        let mut mask = Vec::with_capacity(tokens.len() / per_element);
        for chunk in tokens.chunks(per_element) {
            let (value, masked) = codec.parse_tokens(chunk, reporter, pos)?;
            values.push(value);
            mask.push(masked);
        }
        Ok((values, mask))
    }

    fn parse_arrays(
        &self,
        array: &FixedArray,
        text: &str,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<(Vec<Scalar>, Vec<bool>)> {
        let tokens = array.split(text, reporter, pos);
        let per_item = array.token_count();
        if per_item == 0 || tokens.len() % per_item != 0 {
            return Err(VoError::ArrayLength {
                expected: per_item,
                got: tokens.len(),
            });
        }
        array.parse_tokens(&tokens, reporter, pos)
    }
}

impl Converter for VarArray {
    fn datatype(&self) -> Datatype {
        self.codec().datatype()
    }

    fn shape(&self) -> &[usize] {
        match &self.item {
            VarItem::Scalar(_) => &[],
            VarItem::Array(array) => array.shape(),
        }
    }

    fn is_variable(&self) -> bool {
        true
    }

    fn binary_width(&self) -> Option<usize> {
        None
    }

    fn default_cell(&self) -> Cell {
        Cell::Array(
            MaskedArray::new(self.cell_shape(0), Vec::new(), Vec::new())
                .unwrap_or_else(MaskedArray::empty),
        )
    }

    /// Parses the array; an empty cell is an empty (and therefore null) array.
    fn parse(&self, text: &str, reporter: &Reporter, pos: Position) -> Result<Cell> {
        if text.trim().is_empty() {
            return Ok(self.default_cell());
        }

        let (values, mask) = match &self.item {
            VarItem::Scalar(codec) => self.parse_scalars(codec.as_ref(), text, reporter, pos)?,
            VarItem::Array(array) => self.parse_arrays(array, text, reporter, pos)?,
        };
        let count = values.len() / self.item_len().max(1);
        Ok(Cell::Array(build_array(self.cell_shape(count), values, mask)?))
    }

    fn output(&self, cell: &Cell, reporter: &Reporter, pos: Position) -> Result<String> {
        let array = self.array_of(cell)?;
        match &self.item {
            VarItem::Scalar(codec) => {
                let separator = if codec.datatype() == Datatype::Bit { "" } else { " " };
                let parts = array
                    .iter()
                    .map(|(value, masked)| codec.output_element(value, masked, reporter, pos))
                    .collect::<Result<Vec<_>>>()?;
                Ok(parts.join(separator))
            }
            VarItem::Array(inner) => {
                let item_len = inner.items().max(1);
                let parts = array
                    .values()
                    .chunks(item_len)
                    .zip(array.mask().chunks(item_len))
                    .map(|(values, mask)| inner.output_elements(values, mask, reporter, pos))
                    .collect::<Result<Vec<_>>>()?;
                Ok(parts.join(" "))
            }
        }
    }

    fn binparse(&self, reader: &mut BinaryReader<'_>) -> Result<Cell> {
        let count = reader.read_length()?;
        let (values, mask) = match &self.item {
            VarItem::Scalar(codec) if codec.datatype() == Datatype::Bit => {
                let bytes = reader.read(packed_len(count))?;
                let values = unpack_bits(bytes, count)
                    .into_iter()
                    .map(Scalar::Bool)
                    .collect();
                (values, vec![false; count])
            }
            VarItem::Scalar(codec) => {
                let mut values = Vec::with_capacity(count.min(reader.remaining()));
                let mut mask = Vec::with_capacity(count.min(reader.remaining()));
                for _ in 0..count {
                    let (value, masked) = codec.binparse_element(reader)?;
                    values.push(value);
                    mask.push(masked);
                }
                (values, mask)
            }
            VarItem::Array(array) if array.items() == 0 => (Vec::new(), Vec::new()),
            VarItem::Array(array) => {
                let mut values = Vec::new();
                let mut mask = Vec::new();
                for _ in 0..count {
                    let (item_values, item_mask) = array.read_elements(reader)?;
                    values.extend(item_values);
                    mask.extend(item_mask);
                }
                (values, mask)
            }
        };
        Ok(Cell::Array(build_array(self.cell_shape(count), values, mask)?))
    }

    fn binoutput(
        &self,
        cell: &Cell,
        out: &mut Vec<u8>,
        reporter: &Reporter,
        pos: Position,
    ) -> Result<()> {
        let array = self.array_of(cell)?;
        match &self.item {
            VarItem::Scalar(codec) if codec.datatype() == Datatype::Bit => {
                write_length(out, array.len())?;
                if array.mask().iter().any(|m| *m) {
                    reporter.warn(Warning::MaskedBit, pos);
                }
                let bits = bools(array.values(), Datatype::Bit)?;
                pack_bits(
                    bits.iter().zip(array.mask()).map(|(bit, masked)| *bit && !*masked),
                    out,
                );
            }
            VarItem::Scalar(codec) => {
                write_length(out, array.len())?;
                for (value, masked) in array.iter() {
                    codec.binoutput_element(value, masked, out, reporter, pos)?;
                }
            }
            VarItem::Array(inner) => {
                let item_len = inner.items();
                let count = if item_len == 0 { 0 } else { array.len() / item_len };
                write_length(out, count)?;
                if item_len > 0 {
                    for (values, mask) in array
                        .values()
                        .chunks(item_len)
                        .zip(array.mask().chunks(item_len))
                    {
                        inner.write_elements(values, mask, out, reporter, pos)?;
                    }
                }
            }
        }
        Ok(())
    }
}
