// Type System: component data types, dimensions, shapes and tensor types
//
// DataType is a closed set of scalar kinds with fixed storage widths and a
// total promotion order. The TensorElement trait bridges Rust host types to
// DataType at compile time, so asking for the type of an unsupported host
// value is rejected by the compiler instead of at runtime.

pub mod shape;
pub mod tensor_type;
pub mod value;

pub use shape::{Dimension, Shape};
pub use tensor_type::Type;
pub use value::{ComponentValue, IndexValue};

use crate::core::error::{IrError, Result};
use num_complex::Complex;
use std::fmt;

/// Scalar kind of a DataType
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Bool,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    Float32,
    Float64,
    Complex64,
    Complex128,
    /// No concrete kind
    Undefined,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Kind::Bool => "Bool",
            Kind::UInt8 => "UInt8",
            Kind::UInt16 => "UInt16",
            Kind::UInt32 => "UInt32",
            Kind::UInt64 => "UInt64",
            Kind::UInt128 => "UInt128",
            Kind::Int8 => "Int8",
            Kind::Int16 => "Int16",
            Kind::Int32 => "Int32",
            Kind::Int64 => "Int64",
            Kind::Int128 => "Int128",
            Kind::Float32 => "Float32",
            Kind::Float64 => "Float64",
            Kind::Complex64 => "Complex64",
            Kind::Complex128 => "Complex128",
            Kind::Undefined => "Undefined",
        };
        write!(f, "{}", name)
    }
}

/// Component type of a tensor
///
/// A DataType either names a concrete [`Kind`] or is explicitly
/// `Undefined`; `DataType::default()` is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataType {
    kind: Kind,
}

impl DataType {
    pub const BOOL: Self = Self::new(Kind::Bool);
    pub const UINT8: Self = Self::new(Kind::UInt8);
    pub const UINT16: Self = Self::new(Kind::UInt16);
    pub const UINT32: Self = Self::new(Kind::UInt32);
    pub const UINT64: Self = Self::new(Kind::UInt64);
    pub const UINT128: Self = Self::new(Kind::UInt128);
    pub const INT8: Self = Self::new(Kind::Int8);
    pub const INT16: Self = Self::new(Kind::Int16);
    pub const INT32: Self = Self::new(Kind::Int32);
    pub const INT64: Self = Self::new(Kind::Int64);
    pub const INT128: Self = Self::new(Kind::Int128);
    pub const FLOAT32: Self = Self::new(Kind::Float32);
    pub const FLOAT64: Self = Self::new(Kind::Float64);
    pub const COMPLEX64: Self = Self::new(Kind::Complex64);
    pub const COMPLEX128: Self = Self::new(Kind::Complex128);
    pub const UNDEFINED: Self = Self::new(Kind::Undefined);

    /// Create a data type of the given kind
    pub const fn new(kind: Kind) -> Self {
        Self { kind }
    }

    /// Unsigned integer type with the given bit width
    ///
    /// # Panics
    /// If `bits` is not one of 8, 16, 32, 64 or 128.
    pub fn uint(bits: usize) -> Self {
        Self::try_uint(bits).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_uint(bits: usize) -> Result<Self> {
        let kind = match bits {
            8 => Kind::UInt8,
            16 => Kind::UInt16,
            32 => Kind::UInt32,
            64 => Kind::UInt64,
            128 => Kind::UInt128,
            _ => return Err(IrError::UnsupportedBitWidth { kind: "uint", bits }),
        };
        Ok(Self::new(kind))
    }

    /// Signed integer type with the given bit width
    ///
    /// # Panics
    /// If `bits` is not one of 8, 16, 32, 64 or 128.
    pub fn int(bits: usize) -> Self {
        Self::try_int(bits).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_int(bits: usize) -> Result<Self> {
        let kind = match bits {
            8 => Kind::Int8,
            16 => Kind::Int16,
            32 => Kind::Int32,
            64 => Kind::Int64,
            128 => Kind::Int128,
            _ => return Err(IrError::UnsupportedBitWidth { kind: "int", bits }),
        };
        Ok(Self::new(kind))
    }

    /// Floating point type with the given bit width (32 or 64)
    ///
    /// # Panics
    /// On any other width.
    pub fn float(bits: usize) -> Self {
        Self::try_float(bits).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_float(bits: usize) -> Result<Self> {
        match bits {
            32 => Ok(Self::FLOAT32),
            64 => Ok(Self::FLOAT64),
            _ => Err(IrError::UnsupportedBitWidth { kind: "float", bits }),
        }
    }

    /// Complex type with the given total bit width (64 or 128)
    ///
    /// # Panics
    /// On any other width.
    pub fn complex(bits: usize) -> Self {
        Self::try_complex(bits).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_complex(bits: usize) -> Result<Self> {
        match bits {
            64 => Ok(Self::COMPLEX64),
            128 => Ok(Self::COMPLEX128),
            _ => Err(IrError::UnsupportedBitWidth {
                kind: "complex",
                bits,
            }),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_bool(&self) -> bool {
        self.kind == Kind::Bool
    }

    pub fn is_uint(&self) -> bool {
        matches!(
            self.kind,
            Kind::UInt8 | Kind::UInt16 | Kind::UInt32 | Kind::UInt64 | Kind::UInt128
        )
    }

    pub fn is_int(&self) -> bool {
        matches!(
            self.kind,
            Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64 | Kind::Int128
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self.kind, Kind::Float32 | Kind::Float64)
    }

    pub fn is_complex(&self) -> bool {
        matches!(self.kind, Kind::Complex64 | Kind::Complex128)
    }

    pub fn is_undefined(&self) -> bool {
        self.kind == Kind::Undefined
    }

    /// Number of bytes needed to store one element of this type
    pub fn num_bytes(&self) -> usize {
        match self.kind {
            Kind::Bool => std::mem::size_of::<bool>(),
            Kind::UInt8 => std::mem::size_of::<u8>(),
            Kind::UInt16 => std::mem::size_of::<u16>(),
            Kind::UInt32 => std::mem::size_of::<u32>(),
            Kind::UInt64 => std::mem::size_of::<u64>(),
            Kind::UInt128 => std::mem::size_of::<u128>(),
            Kind::Int8 => std::mem::size_of::<i8>(),
            Kind::Int16 => std::mem::size_of::<i16>(),
            Kind::Int32 => std::mem::size_of::<i32>(),
            Kind::Int64 => std::mem::size_of::<i64>(),
            Kind::Int128 => std::mem::size_of::<i128>(),
            Kind::Float32 => std::mem::size_of::<f32>(),
            Kind::Float64 => std::mem::size_of::<f64>(),
            Kind::Complex64 => std::mem::size_of::<Complex<f32>>(),
            Kind::Complex128 => std::mem::size_of::<Complex<f64>>(),
            Kind::Undefined => 0,
        }
    }

    /// Number of bits needed to store one element of this type
    pub fn num_bits(&self) -> usize {
        self.num_bytes() * 8
    }
}

impl Default for DataType {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

impl From<Kind> for DataType {
    fn from(kind: Kind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self.kind {
            Kind::Bool => "bool",
            Kind::UInt8 => "uint8",
            Kind::UInt16 => "uint16",
            Kind::UInt32 => "uint32",
            Kind::UInt64 => "uint64",
            Kind::UInt128 => "uint128",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Int128 => "int128",
            Kind::Float32 => "float",
            Kind::Float64 => "double",
            Kind::Complex64 => "complex64",
            Kind::Complex128 => "complex128",
            Kind::Undefined => "undefined",
        };
        write!(f, "{}", name)
    }
}

/// Promote two data types to the most general of the pair
///
/// The order is complex > float > integer > bool. Mixing signed and
/// unsigned integers yields a signed type wide enough for both (capped at
/// 128 bits). The result is symmetric in its arguments and never
/// `Undefined` unless both inputs are.
pub fn max_type(a: DataType, b: DataType) -> DataType {
    if a == b {
        return a;
    }
    if a.is_undefined() {
        return b;
    }
    if b.is_undefined() {
        return a;
    }

    // Integers of 64 bits or more only fit losslessly into double precision
    let needs_double = |t: DataType| {
        t == DataType::FLOAT64
            || t == DataType::COMPLEX128
            || ((t.is_int() || t.is_uint()) && t.num_bits() > 32)
    };

    if a.is_complex() || b.is_complex() {
        return if needs_double(a) || needs_double(b) {
            DataType::COMPLEX128
        } else {
            DataType::COMPLEX64
        };
    }
    if a.is_float() || b.is_float() {
        return if needs_double(a) || needs_double(b) {
            DataType::FLOAT64
        } else {
            DataType::FLOAT32
        };
    }
    if a.is_bool() {
        return b;
    }
    if b.is_bool() {
        return a;
    }

    let (a_bits, b_bits) = (a.num_bits(), b.num_bits());
    match (a.is_int(), b.is_int()) {
        (true, true) => DataType::int(a_bits.max(b_bits)),
        (false, false) => DataType::uint(a_bits.max(b_bits)),
        (true, false) => DataType::int((2 * b_bits).max(a_bits).min(128)),
        (false, true) => DataType::int((2 * a_bits).max(b_bits).min(128)),
    }
}

/// Host types that can be stored as tensor components
///
/// Implemented for the Rust primitives and complex numbers that have a
/// matching [`DataType`].
pub trait TensorElement: Copy + Into<ComponentValue> + 'static {
    /// The data type of this host type
    const DATA_TYPE: DataType;
}

/// Look up the data type of a host type at compile time
pub fn type_of<T: TensorElement>() -> DataType {
    T::DATA_TYPE
}

macro_rules! impl_tensor_element {
    ($($t:ty => $konst:ident, $variant:ident;)*) => {
        $(
            impl TensorElement for $t {
                const DATA_TYPE: DataType = DataType::$konst;
            }

            impl From<$t> for ComponentValue {
                fn from(value: $t) -> Self {
                    ComponentValue::$variant(value)
                }
            }
        )*
    };
}

impl_tensor_element! {
    bool => BOOL, Bool;
    u8 => UINT8, UInt8;
    u16 => UINT16, UInt16;
    u32 => UINT32, UInt32;
    u64 => UINT64, UInt64;
    u128 => UINT128, UInt128;
    i8 => INT8, Int8;
    i16 => INT16, Int16;
    i32 => INT32, Int32;
    i64 => INT64, Int64;
    i128 => INT128, Int128;
    f32 => FLOAT32, Float32;
    f64 => FLOAT64, Float64;
    Complex<f32> => COMPLEX64, Complex64;
    Complex<f64> => COMPLEX128, Complex128;
}
