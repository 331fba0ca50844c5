// Component and Index Values
//
// ComponentValue holds any tensor component, up to 128-bit integers and
// complex doubles. IndexValue is the narrower lane used by index arrays:
// 64 bits at most, so positions and coordinates stay compact. Narrowing a
// wider value into an index lane is range checked and never truncates.

use crate::core::error::{IrError, Result};
use crate::types::{DataType, Kind};
use num_complex::Complex;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A scalar tensor component of any supported data type
#[derive(Debug, Clone, Copy)]
pub enum ComponentValue {
    Bool(bool),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    UInt128(u128),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Int128(i128),
    Float32(f32),
    Float64(f64),
    Complex64(Complex<f32>),
    Complex128(Complex<f64>),
}

impl ComponentValue {
    pub fn data_type(&self) -> DataType {
        let kind = match self {
            Self::Bool(_) => Kind::Bool,
            Self::UInt8(_) => Kind::UInt8,
            Self::UInt16(_) => Kind::UInt16,
            Self::UInt32(_) => Kind::UInt32,
            Self::UInt64(_) => Kind::UInt64,
            Self::UInt128(_) => Kind::UInt128,
            Self::Int8(_) => Kind::Int8,
            Self::Int16(_) => Kind::Int16,
            Self::Int32(_) => Kind::Int32,
            Self::Int64(_) => Kind::Int64,
            Self::Int128(_) => Kind::Int128,
            Self::Float32(_) => Kind::Float32,
            Self::Float64(_) => Kind::Float64,
            Self::Complex64(_) => Kind::Complex64,
            Self::Complex128(_) => Kind::Complex128,
        };
        DataType::new(kind)
    }

    /// The zero of the given data type
    ///
    /// # Panics
    /// If `data_type` is undefined.
    pub fn zero(data_type: DataType) -> Self {
        match data_type.kind() {
            Kind::Bool => Self::Bool(false),
            Kind::UInt8 => Self::UInt8(0),
            Kind::UInt16 => Self::UInt16(0),
            Kind::UInt32 => Self::UInt32(0),
            Kind::UInt64 => Self::UInt64(0),
            Kind::UInt128 => Self::UInt128(0),
            Kind::Int8 => Self::Int8(0),
            Kind::Int16 => Self::Int16(0),
            Kind::Int32 => Self::Int32(0),
            Kind::Int64 => Self::Int64(0),
            Kind::Int128 => Self::Int128(0),
            Kind::Float32 => Self::Float32(0.0),
            Kind::Float64 => Self::Float64(0.0),
            Kind::Complex64 => Self::Complex64(Complex::new(0.0, 0.0)),
            Kind::Complex128 => Self::Complex128(Complex::new(0.0, 0.0)),
            Kind::Undefined => panic!("Undefined data type has no zero value"),
        }
    }

    /// Numeric zero test; negative zero counts as zero
    pub fn is_zero(&self) -> bool {
        match *self {
            Self::Float32(v) => v == 0.0,
            Self::Float64(v) => v == 0.0,
            Self::Complex64(v) => v.re == 0.0 && v.im == 0.0,
            Self::Complex128(v) => v.re == 0.0 && v.im == 0.0,
            _ => *self == Self::zero(self.data_type()),
        }
    }

    /// Integer payload, if this is an integer or bool component
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Self::Bool(v) => Some(v as i128),
            Self::UInt8(v) => Some(v as i128),
            Self::UInt16(v) => Some(v as i128),
            Self::UInt32(v) => Some(v as i128),
            Self::UInt64(v) => Some(v as i128),
            Self::UInt128(v) => i128::try_from(v).ok(),
            Self::Int8(v) => Some(v as i128),
            Self::Int16(v) => Some(v as i128),
            Self::Int32(v) => Some(v as i128),
            Self::Int64(v) => Some(v as i128),
            Self::Int128(v) => Some(v),
            _ => None,
        }
    }

    // Bit-level identity used for Eq and Hash, so literals with NaN payloads
    // still compare reflexively.
    fn bits(&self) -> (u8, u128, u128) {
        let tag = self.data_type().kind() as u8;
        match *self {
            Self::Bool(v) => (tag, v as u128, 0),
            Self::UInt8(v) => (tag, v as u128, 0),
            Self::UInt16(v) => (tag, v as u128, 0),
            Self::UInt32(v) => (tag, v as u128, 0),
            Self::UInt64(v) => (tag, v as u128, 0),
            Self::UInt128(v) => (tag, v, 0),
            Self::Int8(v) => (tag, v as u128, 0),
            Self::Int16(v) => (tag, v as u128, 0),
            Self::Int32(v) => (tag, v as u128, 0),
            Self::Int64(v) => (tag, v as u128, 0),
            Self::Int128(v) => (tag, v as u128, 0),
            Self::Float32(v) => (tag, v.to_bits() as u128, 0),
            Self::Float64(v) => (tag, v.to_bits() as u128, 0),
            Self::Complex64(v) => (tag, v.re.to_bits() as u128, v.im.to_bits() as u128),
            Self::Complex128(v) => (tag, v.re.to_bits() as u128, v.im.to_bits() as u128),
        }
    }
}

impl PartialEq for ComponentValue {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for ComponentValue {}

impl Hash for ComponentValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl fmt::Display for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::UInt8(v) => write!(f, "{}", v),
            Self::UInt16(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::UInt64(v) => write!(f, "{}", v),
            Self::UInt128(v) => write!(f, "{}", v),
            Self::Int8(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::Int128(v) => write!(f, "{}", v),
            Self::Float32(v) => write!(f, "{}", v),
            Self::Float64(v) => write!(f, "{}", v),
            Self::Complex64(v) => write!(f, "{}", v),
            Self::Complex128(v) => write!(f, "{}", v),
        }
    }
}

/// A single index array lane (at most 64 bits wide)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexValue {
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
}

impl IndexValue {
    /// Narrow `value` into a lane of `data_type`
    ///
    /// Fails with `ValueOutOfRange` when the value does not fit, and with
    /// `InvalidIndexArrayType` when `data_type` is not an index lane type.
    pub fn new(data_type: DataType, value: i128) -> Result<Self> {
        let out_of_range = || IrError::ValueOutOfRange { value, data_type };
        let lane = match data_type.kind() {
            Kind::UInt8 => Self::UInt8(u8::try_from(value).map_err(|_| out_of_range())?),
            Kind::UInt16 => Self::UInt16(u16::try_from(value).map_err(|_| out_of_range())?),
            Kind::UInt32 => Self::UInt32(u32::try_from(value).map_err(|_| out_of_range())?),
            Kind::UInt64 => Self::UInt64(u64::try_from(value).map_err(|_| out_of_range())?),
            Kind::Int8 => Self::Int8(i8::try_from(value).map_err(|_| out_of_range())?),
            Kind::Int16 => Self::Int16(i16::try_from(value).map_err(|_| out_of_range())?),
            Kind::Int32 => Self::Int32(i32::try_from(value).map_err(|_| out_of_range())?),
            Kind::Int64 => Self::Int64(i64::try_from(value).map_err(|_| out_of_range())?),
            _ => return Err(IrError::InvalidIndexArrayType(data_type)),
        };
        Ok(lane)
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::UInt8(_) => DataType::UINT8,
            Self::UInt16(_) => DataType::UINT16,
            Self::UInt32(_) => DataType::UINT32,
            Self::UInt64(_) => DataType::UINT64,
            Self::Int8(_) => DataType::INT8,
            Self::Int16(_) => DataType::INT16,
            Self::Int32(_) => DataType::INT32,
            Self::Int64(_) => DataType::INT64,
        }
    }

    pub fn get(&self) -> i128 {
        match *self {
            Self::UInt8(v) => v as i128,
            Self::UInt16(v) => v as i128,
            Self::UInt32(v) => v as i128,
            Self::UInt64(v) => v as i128,
            Self::Int8(v) => v as i128,
            Self::Int16(v) => v as i128,
            Self::Int32(v) => v as i128,
            Self::Int64(v) => v as i128,
        }
    }

    /// Whether `data_type` can be used for index array lanes
    pub fn is_lane_type(data_type: DataType) -> bool {
        (data_type.is_int() || data_type.is_uint()) && data_type.num_bits() <= 64
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}
