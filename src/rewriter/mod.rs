// Rewriter Module: Index Notation Transformations
//
// Strict rewriters handle every node kind explicitly. Default rewriters
// override only what they need. Substitution helpers and the pass manager
// are built on the default layer.

pub mod default;
pub mod pass;
pub mod replace;
pub mod strict;

// Re-exports
pub use default::{
    walk_access, walk_add, walk_assignment, walk_div, walk_forall, walk_literal, walk_mul,
    walk_multi, walk_neg, walk_reduction, walk_sequence, walk_sqrt, walk_sub, walk_where,
    IndexNotationRewriter,
};
pub use pass::{PassManager, ReductionNotationPass, RewritePass};
pub use replace::{replace, replace_stmt, replace_vars, replace_vars_in_stmt};
pub use strict::{dispatch_expr, dispatch_stmt, ExprRewriterStrict, IndexNotationRewriterStrict};
