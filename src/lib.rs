// RustTensor: IR substrate for a sparse tensor algebra compiler
//
// This library provides the pieces a tensor algebra compiler is built on:
// an index notation IR for tensor computations, a rewriting engine for
// transforming it, and a storage model in which every tensor mode is
// independently dense or sparse.
//
// Architecture:
// - Layer 1 (types): component data types, shapes and tensor types
// - Layer 2 (storage): formats, index arrays, packed tensor storage
// - Layer 3 (ir): index notation expressions and statements
// - Layer 4 (rewriter): strict and default rewriters, substitution, passes

// Public modules
pub mod core;
pub mod types;
pub mod storage;

// Index notation infrastructure
pub mod ir;
pub mod rewriter;

// Re-export commonly used items for convenience
pub use core::{IrError, Result};
pub use ir::{BinaryOp, IndexExpr, IndexStmt, IndexVar, TensorVar};
pub use storage::{Format, Index, ModeIndex, ModeType, Storage, TensorBuilder};
pub use types::{max_type, type_of, DataType, Dimension, Kind, Shape, Type};
