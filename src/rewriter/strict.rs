// Strict Rewriters
//
// A strict rewriter must handle every node kind itself; the compiler
// rejects an implementation that leaves one out. Each handler gets the
// typed node and the handle it came from, and returns the replacement
// handle (the original handle to keep the node).
//
// rewrite_expr and rewrite_stmt dispatch on the node kind. Statement
// handlers reach their child expressions through rewrite_expr, so one
// rewriter covers both grammars.

use crate::core::error::IrError;
use crate::ir::{
    Access, Add, Assignment, Div, ExprNode, Forall, IndexExpr, IndexStmt, Literal, Mul, Multi,
    Neg, Reduction, Sequence, Sqrt, StmtNode, Sub, Where,
};

/// Rewrites expressions, one required handler per node kind
pub trait ExprRewriterStrict {
    fn rewrite_access(&mut self, op: &Access, expr: &IndexExpr) -> IndexExpr;
    fn rewrite_literal(&mut self, op: &Literal, expr: &IndexExpr) -> IndexExpr;
    fn rewrite_neg(&mut self, op: &Neg, expr: &IndexExpr) -> IndexExpr;
    fn rewrite_sqrt(&mut self, op: &Sqrt, expr: &IndexExpr) -> IndexExpr;
    fn rewrite_add(&mut self, op: &Add, expr: &IndexExpr) -> IndexExpr;
    fn rewrite_sub(&mut self, op: &Sub, expr: &IndexExpr) -> IndexExpr;
    fn rewrite_mul(&mut self, op: &Mul, expr: &IndexExpr) -> IndexExpr;
    fn rewrite_div(&mut self, op: &Div, expr: &IndexExpr) -> IndexExpr;
    fn rewrite_reduction(&mut self, op: &Reduction, expr: &IndexExpr) -> IndexExpr;

    /// Rewrite `expr` by dispatching to the handler of its node kind
    ///
    /// # Panics
    /// If `expr` is undefined.
    fn rewrite_expr(&mut self, expr: &IndexExpr) -> IndexExpr {
        dispatch_expr(self, expr)
    }
}

/// Rewrites statements and the expressions inside them
pub trait IndexNotationRewriterStrict: ExprRewriterStrict {
    fn rewrite_assignment(&mut self, op: &Assignment, stmt: &IndexStmt) -> IndexStmt;
    fn rewrite_forall(&mut self, op: &Forall, stmt: &IndexStmt) -> IndexStmt;
    fn rewrite_where(&mut self, op: &Where, stmt: &IndexStmt) -> IndexStmt;
    fn rewrite_multi(&mut self, op: &Multi, stmt: &IndexStmt) -> IndexStmt;
    fn rewrite_sequence(&mut self, op: &Sequence, stmt: &IndexStmt) -> IndexStmt;

    /// Rewrite `stmt` by dispatching to the handler of its node kind
    ///
    /// # Panics
    /// If `stmt` is undefined.
    fn rewrite_stmt(&mut self, stmt: &IndexStmt) -> IndexStmt {
        dispatch_stmt(self, stmt)
    }
}

/// Call the handler matching the node kind of `expr`
pub fn dispatch_expr<R: ExprRewriterStrict + ?Sized>(rewriter: &mut R, expr: &IndexExpr) -> IndexExpr {
    let node = match expr.node() {
        Some(node) => node,
        None => panic!("{}", IrError::UndefinedNode),
    };
    match node {
        ExprNode::Access(op) => rewriter.rewrite_access(op, expr),
        ExprNode::Literal(op) => rewriter.rewrite_literal(op, expr),
        ExprNode::Neg(op) => rewriter.rewrite_neg(op, expr),
        ExprNode::Sqrt(op) => rewriter.rewrite_sqrt(op, expr),
        ExprNode::Add(op) => rewriter.rewrite_add(op, expr),
        ExprNode::Sub(op) => rewriter.rewrite_sub(op, expr),
        ExprNode::Mul(op) => rewriter.rewrite_mul(op, expr),
        ExprNode::Div(op) => rewriter.rewrite_div(op, expr),
        ExprNode::Reduction(op) => rewriter.rewrite_reduction(op, expr),
    }
}

/// Call the handler matching the node kind of `stmt`
pub fn dispatch_stmt<R: IndexNotationRewriterStrict + ?Sized>(
    rewriter: &mut R,
    stmt: &IndexStmt,
) -> IndexStmt {
    let node = match stmt.node() {
        Some(node) => node,
        None => panic!("{}", IrError::UndefinedNode),
    };
    match node {
        StmtNode::Assignment(op) => rewriter.rewrite_assignment(op, stmt),
        StmtNode::Forall(op) => rewriter.rewrite_forall(op, stmt),
        StmtNode::Where(op) => rewriter.rewrite_where(op, stmt),
        StmtNode::Multi(op) => rewriter.rewrite_multi(op, stmt),
        StmtNode::Sequence(op) => rewriter.rewrite_sequence(op, stmt),
    }
}
