// Core Layer: Rust Error Types
//
// A single error enum for every validated operation in the crate.
// Precondition violations panic in the plain API; the `try_*` constructors
// and the packing/verification entry points report them through `IrError`.

use crate::ir::BinaryOp;
use crate::storage::ModeType;
use crate::types::DataType;
use std::fmt;

/// Errors raised while building or checking tensor IR and storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    /// A type factory was asked for a width it does not support
    UnsupportedBitWidth { kind: &'static str, bits: usize },
    /// Number of modes/variables does not match the tensor order
    OrderMismatch { expected: usize, found: usize },
    /// Mode ordering is not a permutation of `0..order`
    InvalidModeOrdering(Vec<usize>),
    /// Index arrays must use integer lanes of at most 64 bits
    InvalidIndexArrayType(DataType),
    /// A mode index holds the wrong number of index arrays
    IndexArrayCount {
        mode_type: ModeType,
        expected: usize,
        found: usize,
    },
    /// A dense mode's size array is malformed
    DenseSizeArray { mode: usize, len: usize },
    /// A sparse position array has the wrong length
    PositionArrayLength {
        mode: usize,
        expected: usize,
        found: usize,
    },
    /// A sparse coordinate array disagrees with its position array
    CoordinateArrayLength {
        mode: usize,
        expected: usize,
        found: usize,
    },
    /// Positions must start at 0 and never decrease
    InvalidPositionArray { mode: usize, position: usize },
    /// Coordinates must be non-negative
    NegativeCoordinate { mode: usize, coordinate: i128 },
    /// The levels describe more entries than fit in memory
    IndexSizeOverflow { mode: usize },
    /// An index was built for a different format than its storage
    FormatMismatch,
    /// Value array length differs from the number of stored entries
    ValueCountMismatch { expected: usize, found: usize },
    /// A value does not fit into an index array lane
    ValueOutOfRange { value: i128, data_type: DataType },
    /// Component type mismatch between operands
    DomainMismatch { expected: DataType, found: DataType },
    /// A coordinate lies outside its dimension
    CoordinateOutOfBounds {
        mode: usize,
        coordinate: usize,
        size: usize,
    },
    /// Packing requires every dimension to be fixed
    VariableDimension { mode: usize },
    /// The same coordinate was inserted twice
    DuplicateCoordinate(Vec<usize>),
    /// An index variable is referenced outside any binder
    UnboundIndexVar(String),
    /// A reduction variable does not occur in its operand
    UnusedReductionVar(String),
    /// Reductions need an associative operator
    NonAssociativeReduction(BinaryOp),
    /// Assignment targets must be tensor accesses
    InvalidAssignmentTarget,
    /// A where-producer writes a tensor its consumer never reads
    UnusedTemporary(String),
    /// An undefined expression or statement handle was used
    UndefinedNode,
}

impl fmt::Display for IrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedBitWidth { kind, bits } => {
                write!(f, "Unsupported bit width for {} type: {}", kind, bits)
            }
            Self::OrderMismatch { expected, found } => write!(
                f,
                "Order mismatch: expected {} modes, found {}",
                expected, found
            ),
            Self::InvalidModeOrdering(ordering) => {
                write!(f, "Mode ordering {:?} is not a permutation", ordering)
            }
            Self::InvalidIndexArrayType(dtype) => {
                write!(f, "Index arrays cannot hold {} values", dtype)
            }
            Self::IndexArrayCount {
                mode_type,
                expected,
                found,
            } => write!(
                f,
                "A {} mode has {} index arrays, found {}",
                mode_type, expected, found
            ),
            Self::DenseSizeArray { mode, len } => write!(
                f,
                "Dense mode {} must store its size in a 1-element array, found {} elements",
                mode, len
            ),
            Self::PositionArrayLength {
                mode,
                expected,
                found,
            } => write!(
                f,
                "Position array of mode {} must have {} entries, found {}",
                mode, expected, found
            ),
            Self::CoordinateArrayLength {
                mode,
                expected,
                found,
            } => write!(
                f,
                "Coordinate array of mode {} must have {} entries, found {}",
                mode, expected, found
            ),
            Self::InvalidPositionArray { mode, position } => write!(
                f,
                "Position array of mode {} must start at 0 and never decrease, violated at entry {}",
                mode, position
            ),
            Self::NegativeCoordinate { mode, coordinate } => {
                write!(f, "Negative coordinate {} in mode {}", coordinate, mode)
            }
            Self::IndexSizeOverflow { mode } => {
                write!(f, "Index size overflows at mode {}", mode)
            }
            Self::FormatMismatch => write!(f, "Index does not realize the storage format"),
            Self::ValueCountMismatch { expected, found } => write!(
                f,
                "Storage holds {} entries but {} values were given",
                expected, found
            ),
            Self::ValueOutOfRange { value, data_type } => {
                write!(f, "Value {} is out of range for {}", value, data_type)
            }
            Self::DomainMismatch { expected, found } => write!(
                f,
                "Type mismatch: expected {}, found {}",
                expected, found
            ),
            Self::CoordinateOutOfBounds {
                mode,
                coordinate,
                size,
            } => write!(
                f,
                "Coordinate {} is out of bounds for mode {} of size {}",
                coordinate, mode, size
            ),
            Self::VariableDimension { mode } => {
                write!(f, "Mode {} has a variable dimension", mode)
            }
            Self::DuplicateCoordinate(coord) => {
                write!(f, "Duplicate coordinate {:?}", coord)
            }
            Self::UnboundIndexVar(name) => {
                write!(f, "Index variable {} is not bound by a forall", name)
            }
            Self::UnusedReductionVar(name) => write!(
                f,
                "Reduction variable {} does not occur in the reduced expression",
                name
            ),
            Self::NonAssociativeReduction(op) => {
                write!(f, "Cannot reduce with non-associative operator {}", op)
            }
            Self::InvalidAssignmentTarget => {
                write!(f, "Assignment target must be a tensor access")
            }
            Self::UnusedTemporary(name) => write!(
                f,
                "Temporary {} produced by a where statement is never read",
                name
            ),
            Self::UndefinedNode => write!(f, "Undefined index notation node"),
        }
    }
}

impl std::error::Error for IrError {}

/// Result type for IR operations
pub type Result<T> = std::result::Result<T, IrError>;
