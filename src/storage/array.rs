// Storage Layer: Typed Index Arrays
//
// Index arrays hold positions, coordinates and dense sizes. Each array
// keeps its values in a Vec of its lane type, so a uint8 array really
// uses one byte per entry. Writes are range checked against the lane.

use crate::core::error::{IrError, Result};
use crate::types::{DataType, IndexValue, Kind};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Lanes {
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
}

// Apply the same expression to whichever Vec backs the lanes
macro_rules! with_lanes {
    ($lanes:expr, $v:ident => $body:expr) => {
        match $lanes {
            Lanes::UInt8($v) => $body,
            Lanes::UInt16($v) => $body,
            Lanes::UInt32($v) => $body,
            Lanes::UInt64($v) => $body,
            Lanes::Int8($v) => $body,
            Lanes::Int16($v) => $body,
            Lanes::Int32($v) => $body,
            Lanes::Int64($v) => $body,
        }
    };
}

/// A typed array of integer lanes, at most 64 bits wide
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexArray {
    lanes: Lanes,
}

impl IndexArray {
    /// Empty array of the given lane type
    ///
    /// # Panics
    /// If `data_type` is not an integer type of at most 64 bits.
    pub fn new(data_type: DataType) -> Self {
        Self::try_new(data_type).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_new(data_type: DataType) -> Result<Self> {
        let lanes = match data_type.kind() {
            Kind::UInt8 => Lanes::UInt8(Vec::new()),
            Kind::UInt16 => Lanes::UInt16(Vec::new()),
            Kind::UInt32 => Lanes::UInt32(Vec::new()),
            Kind::UInt64 => Lanes::UInt64(Vec::new()),
            Kind::Int8 => Lanes::Int8(Vec::new()),
            Kind::Int16 => Lanes::Int16(Vec::new()),
            Kind::Int32 => Lanes::Int32(Vec::new()),
            Kind::Int64 => Lanes::Int64(Vec::new()),
            _ => return Err(IrError::InvalidIndexArrayType(data_type)),
        };
        Ok(Self { lanes })
    }

    /// Array of the given lane type holding `values`
    ///
    /// # Panics
    /// If the lane type is invalid or a value does not fit.
    pub fn from_values<I>(data_type: DataType, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<i128>,
    {
        Self::try_from_values(data_type, values).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_from_values<I>(data_type: DataType, values: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<i128>,
    {
        let mut array = Self::try_new(data_type)?;
        for value in values {
            array.try_push(value.into())?;
        }
        Ok(array)
    }

    pub fn data_type(&self) -> DataType {
        match self.lanes {
            Lanes::UInt8(_) => DataType::UINT8,
            Lanes::UInt16(_) => DataType::UINT16,
            Lanes::UInt32(_) => DataType::UINT32,
            Lanes::UInt64(_) => DataType::UINT64,
            Lanes::Int8(_) => DataType::INT8,
            Lanes::Int16(_) => DataType::INT16,
            Lanes::Int32(_) => DataType::INT32,
            Lanes::Int64(_) => DataType::INT64,
        }
    }

    pub fn len(&self) -> usize {
        with_lanes!(&self.lanes, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `i`, widened to i128
    ///
    /// # Panics
    /// If `i` is out of bounds.
    pub fn get(&self, i: usize) -> i128 {
        with_lanes!(&self.lanes, v => v[i] as i128)
    }

    /// Value at `i` as a typed lane
    pub fn value(&self, i: usize) -> IndexValue {
        match &self.lanes {
            Lanes::UInt8(v) => IndexValue::UInt8(v[i]),
            Lanes::UInt16(v) => IndexValue::UInt16(v[i]),
            Lanes::UInt32(v) => IndexValue::UInt32(v[i]),
            Lanes::UInt64(v) => IndexValue::UInt64(v[i]),
            Lanes::Int8(v) => IndexValue::Int8(v[i]),
            Lanes::Int16(v) => IndexValue::Int16(v[i]),
            Lanes::Int32(v) => IndexValue::Int32(v[i]),
            Lanes::Int64(v) => IndexValue::Int64(v[i]),
        }
    }

    pub fn last(&self) -> Option<i128> {
        if self.is_empty() {
            None
        } else {
            Some(self.get(self.len() - 1))
        }
    }

    /// Append a value
    ///
    /// # Panics
    /// If `value` does not fit the lane.
    pub fn push(&mut self, value: i128) {
        self.try_push(value).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_push(&mut self, value: i128) -> Result<()> {
        let lane = IndexValue::new(self.data_type(), value)?;
        self.store(lane);
        Ok(())
    }

    // `lane` always matches the array type since it was narrowed from it
    fn store(&mut self, lane: IndexValue) {
        match (&mut self.lanes, lane) {
            (Lanes::UInt8(v), IndexValue::UInt8(x)) => v.push(x),
            (Lanes::UInt16(v), IndexValue::UInt16(x)) => v.push(x),
            (Lanes::UInt32(v), IndexValue::UInt32(x)) => v.push(x),
            (Lanes::UInt64(v), IndexValue::UInt64(x)) => v.push(x),
            (Lanes::Int8(v), IndexValue::Int8(x)) => v.push(x),
            (Lanes::Int16(v), IndexValue::Int16(x)) => v.push(x),
            (Lanes::Int32(v), IndexValue::Int32(x)) => v.push(x),
            (Lanes::Int64(v), IndexValue::Int64(x)) => v.push(x),
            (_, lane) => unreachable!("lane {:?} does not match array type", lane),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = i128> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    pub fn to_vec(&self) -> Vec<i128> {
        self.iter().collect()
    }
}

impl fmt::Display for IndexArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}
