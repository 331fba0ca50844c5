// IR Module: Index Notation
//
// Expressions and statements over tensor accesses, built from shared
// immutable nodes. Rewriting lives in the rewriter module.

pub mod display;
pub mod expr;
pub mod notation;
pub mod stmt;
pub mod var;
pub mod verify;

// Re-exports
pub use expr::{
    Access, Add, BinaryOp, Div, ExprNode, IndexExpr, Literal, Mul, Neg, Reduction, Sqrt, Sub,
};
pub use notation::make_reduction_notation;
pub use stmt::{Assignment, Forall, IndexStmt, Multi, Sequence, StmtNode, Where};
pub use var::{IndexVar, TensorVar};
pub use verify::verify_concrete;
