// Default Rewriters
//
// IndexNotationRewriter gives every handler a default that rewrites the
// node's children and rebuilds the node only if a child changed. A pass
// overrides the few node kinds it cares about and every other kind is
// traversed and rebuilt faithfully.
//
// The defaults are the walk_* functions, so an override can do its own
// work and then fall back to the default traversal.

use crate::core::error::IrError;
use crate::ir::{
    Access, Add, Assignment, Div, Forall, IndexExpr, IndexStmt, Literal, Mul, Multi, Neg,
    Reduction, Sequence, Sqrt, Sub, Where,
};
use crate::rewriter::strict::{
    dispatch_expr, dispatch_stmt, ExprRewriterStrict, IndexNotationRewriterStrict,
};

/// Rewriter with structure-preserving defaults for every node kind
///
/// Every implementor is also an [`IndexNotationRewriterStrict`], so
/// `rewrite_expr` and `rewrite_stmt` are the entry points.
pub trait IndexNotationRewriter {
    /// Replace `expr` outright, skipping its handler and its children
    fn substitute_expr(&mut self, _expr: &IndexExpr) -> Option<IndexExpr> {
        None
    }

    /// Replace `stmt` outright, skipping its handler and its children
    fn substitute_stmt(&mut self, _stmt: &IndexStmt) -> Option<IndexStmt> {
        None
    }

    fn rewrite_access(&mut self, op: &Access, expr: &IndexExpr) -> IndexExpr {
        walk_access(self, op, expr)
    }

    fn rewrite_literal(&mut self, op: &Literal, expr: &IndexExpr) -> IndexExpr {
        walk_literal(self, op, expr)
    }

    fn rewrite_neg(&mut self, op: &Neg, expr: &IndexExpr) -> IndexExpr {
        walk_neg(self, op, expr)
    }

    fn rewrite_sqrt(&mut self, op: &Sqrt, expr: &IndexExpr) -> IndexExpr {
        walk_sqrt(self, op, expr)
    }

    fn rewrite_add(&mut self, op: &Add, expr: &IndexExpr) -> IndexExpr {
        walk_add(self, op, expr)
    }

    fn rewrite_sub(&mut self, op: &Sub, expr: &IndexExpr) -> IndexExpr {
        walk_sub(self, op, expr)
    }

    fn rewrite_mul(&mut self, op: &Mul, expr: &IndexExpr) -> IndexExpr {
        walk_mul(self, op, expr)
    }

    fn rewrite_div(&mut self, op: &Div, expr: &IndexExpr) -> IndexExpr {
        walk_div(self, op, expr)
    }

    fn rewrite_reduction(&mut self, op: &Reduction, expr: &IndexExpr) -> IndexExpr {
        walk_reduction(self, op, expr)
    }

    fn rewrite_assignment(&mut self, op: &Assignment, stmt: &IndexStmt) -> IndexStmt {
        walk_assignment(self, op, stmt)
    }

    fn rewrite_forall(&mut self, op: &Forall, stmt: &IndexStmt) -> IndexStmt {
        walk_forall(self, op, stmt)
    }

    fn rewrite_where(&mut self, op: &Where, stmt: &IndexStmt) -> IndexStmt {
        walk_where(self, op, stmt)
    }

    fn rewrite_multi(&mut self, op: &Multi, stmt: &IndexStmt) -> IndexStmt {
        walk_multi(self, op, stmt)
    }

    fn rewrite_sequence(&mut self, op: &Sequence, stmt: &IndexStmt) -> IndexStmt {
        walk_sequence(self, op, stmt)
    }
}

impl<T: IndexNotationRewriter + ?Sized> ExprRewriterStrict for T {
    fn rewrite_access(&mut self, op: &Access, expr: &IndexExpr) -> IndexExpr {
        IndexNotationRewriter::rewrite_access(self, op, expr)
    }

    fn rewrite_literal(&mut self, op: &Literal, expr: &IndexExpr) -> IndexExpr {
        IndexNotationRewriter::rewrite_literal(self, op, expr)
    }

    fn rewrite_neg(&mut self, op: &Neg, expr: &IndexExpr) -> IndexExpr {
        IndexNotationRewriter::rewrite_neg(self, op, expr)
    }

    fn rewrite_sqrt(&mut self, op: &Sqrt, expr: &IndexExpr) -> IndexExpr {
        IndexNotationRewriter::rewrite_sqrt(self, op, expr)
    }

    fn rewrite_add(&mut self, op: &Add, expr: &IndexExpr) -> IndexExpr {
        IndexNotationRewriter::rewrite_add(self, op, expr)
    }

    fn rewrite_sub(&mut self, op: &Sub, expr: &IndexExpr) -> IndexExpr {
        IndexNotationRewriter::rewrite_sub(self, op, expr)
    }

    fn rewrite_mul(&mut self, op: &Mul, expr: &IndexExpr) -> IndexExpr {
        IndexNotationRewriter::rewrite_mul(self, op, expr)
    }

    fn rewrite_div(&mut self, op: &Div, expr: &IndexExpr) -> IndexExpr {
        IndexNotationRewriter::rewrite_div(self, op, expr)
    }

    fn rewrite_reduction(&mut self, op: &Reduction, expr: &IndexExpr) -> IndexExpr {
        IndexNotationRewriter::rewrite_reduction(self, op, expr)
    }

    fn rewrite_expr(&mut self, expr: &IndexExpr) -> IndexExpr {
        if !expr.defined() {
            panic!("{}", IrError::UndefinedNode);
        }
        match self.substitute_expr(expr) {
            Some(replacement) => replacement,
            None => dispatch_expr(self, expr),
        }
    }
}

impl<T: IndexNotationRewriter + ?Sized> IndexNotationRewriterStrict for T {
    fn rewrite_assignment(&mut self, op: &Assignment, stmt: &IndexStmt) -> IndexStmt {
        IndexNotationRewriter::rewrite_assignment(self, op, stmt)
    }

    fn rewrite_forall(&mut self, op: &Forall, stmt: &IndexStmt) -> IndexStmt {
        IndexNotationRewriter::rewrite_forall(self, op, stmt)
    }

    fn rewrite_where(&mut self, op: &Where, stmt: &IndexStmt) -> IndexStmt {
        IndexNotationRewriter::rewrite_where(self, op, stmt)
    }

    fn rewrite_multi(&mut self, op: &Multi, stmt: &IndexStmt) -> IndexStmt {
        IndexNotationRewriter::rewrite_multi(self, op, stmt)
    }

    fn rewrite_sequence(&mut self, op: &Sequence, stmt: &IndexStmt) -> IndexStmt {
        IndexNotationRewriter::rewrite_sequence(self, op, stmt)
    }

    fn rewrite_stmt(&mut self, stmt: &IndexStmt) -> IndexStmt {
        if !stmt.defined() {
            panic!("{}", IrError::UndefinedNode);
        }
        match self.substitute_stmt(stmt) {
            Some(replacement) => replacement,
            None => dispatch_stmt(self, stmt),
        }
    }
}

pub fn walk_access<R: ExprRewriterStrict + ?Sized>(
    _rewriter: &mut R,
    _op: &Access,
    expr: &IndexExpr,
) -> IndexExpr {
    expr.clone()
}

pub fn walk_literal<R: ExprRewriterStrict + ?Sized>(
    _rewriter: &mut R,
    _op: &Literal,
    expr: &IndexExpr,
) -> IndexExpr {
    expr.clone()
}

pub fn walk_neg<R: ExprRewriterStrict + ?Sized>(
    rewriter: &mut R,
    op: &Neg,
    expr: &IndexExpr,
) -> IndexExpr {
    let a = rewriter.rewrite_expr(&op.a);
    if a.ptr_eq(&op.a) {
        expr.clone()
    } else {
        IndexExpr::neg(a)
    }
}

pub fn walk_sqrt<R: ExprRewriterStrict + ?Sized>(
    rewriter: &mut R,
    op: &Sqrt,
    expr: &IndexExpr,
) -> IndexExpr {
    let a = rewriter.rewrite_expr(&op.a);
    if a.ptr_eq(&op.a) {
        expr.clone()
    } else {
        IndexExpr::sqrt(a)
    }
}

// Rewrite both operands; None when neither changed
fn walk_operands<R: ExprRewriterStrict + ?Sized>(
    rewriter: &mut R,
    a: &IndexExpr,
    b: &IndexExpr,
) -> Option<(IndexExpr, IndexExpr)> {
    let new_a = rewriter.rewrite_expr(a);
    let new_b = rewriter.rewrite_expr(b);
    if new_a.ptr_eq(a) && new_b.ptr_eq(b) {
        None
    } else {
        Some((new_a, new_b))
    }
}

pub fn walk_add<R: ExprRewriterStrict + ?Sized>(
    rewriter: &mut R,
    op: &Add,
    expr: &IndexExpr,
) -> IndexExpr {
    match walk_operands(rewriter, &op.a, &op.b) {
        Some((a, b)) => IndexExpr::add(a, b),
        None => expr.clone(),
    }
}

pub fn walk_sub<R: ExprRewriterStrict + ?Sized>(
    rewriter: &mut R,
    op: &Sub,
    expr: &IndexExpr,
) -> IndexExpr {
    match walk_operands(rewriter, &op.a, &op.b) {
        Some((a, b)) => IndexExpr::sub(a, b),
        None => expr.clone(),
    }
}

pub fn walk_mul<R: ExprRewriterStrict + ?Sized>(
    rewriter: &mut R,
    op: &Mul,
    expr: &IndexExpr,
) -> IndexExpr {
    match walk_operands(rewriter, &op.a, &op.b) {
        Some((a, b)) => IndexExpr::mul(a, b),
        None => expr.clone(),
    }
}

pub fn walk_div<R: ExprRewriterStrict + ?Sized>(
    rewriter: &mut R,
    op: &Div,
    expr: &IndexExpr,
) -> IndexExpr {
    match walk_operands(rewriter, &op.a, &op.b) {
        Some((a, b)) => IndexExpr::div(a, b),
        None => expr.clone(),
    }
}

pub fn walk_reduction<R: ExprRewriterStrict + ?Sized>(
    rewriter: &mut R,
    op: &Reduction,
    expr: &IndexExpr,
) -> IndexExpr {
    let a = rewriter.rewrite_expr(&op.a);
    if a.ptr_eq(&op.a) {
        expr.clone()
    } else {
        IndexExpr::reduction(op.op, op.var.clone(), a)
    }
}

/// Default assignment handler
///
/// # Panics
/// If the left-hand side is rewritten into something other than an access.
pub fn walk_assignment<R: IndexNotationRewriterStrict + ?Sized>(
    rewriter: &mut R,
    op: &Assignment,
    stmt: &IndexStmt,
) -> IndexStmt {
    let lhs = rewriter.rewrite_expr(op.lhs());
    let rhs = rewriter.rewrite_expr(op.rhs());
    if lhs.ptr_eq(op.lhs()) && rhs.ptr_eq(op.rhs()) {
        stmt.clone()
    } else {
        IndexStmt::assignment(lhs, rhs, op.op())
    }
}

pub fn walk_forall<R: IndexNotationRewriterStrict + ?Sized>(
    rewriter: &mut R,
    op: &Forall,
    stmt: &IndexStmt,
) -> IndexStmt {
    let body = rewriter.rewrite_stmt(&op.body);
    if body.ptr_eq(&op.body) {
        stmt.clone()
    } else {
        IndexStmt::forall(op.var.clone(), body)
    }
}

pub fn walk_where<R: IndexNotationRewriterStrict + ?Sized>(
    rewriter: &mut R,
    op: &Where,
    stmt: &IndexStmt,
) -> IndexStmt {
    let consumer = rewriter.rewrite_stmt(&op.consumer);
    let producer = rewriter.rewrite_stmt(&op.producer);
    if consumer.ptr_eq(&op.consumer) && producer.ptr_eq(&op.producer) {
        stmt.clone()
    } else {
        IndexStmt::where_(consumer, producer)
    }
}

// Rewrite a statement list; None when no statement changed
fn walk_list<R: IndexNotationRewriterStrict + ?Sized>(
    rewriter: &mut R,
    stmts: &[IndexStmt],
) -> Option<Vec<IndexStmt>> {
    let rewritten: Vec<IndexStmt> = stmts.iter().map(|s| rewriter.rewrite_stmt(s)).collect();
    if rewritten.iter().zip(stmts).all(|(new, old)| new.ptr_eq(old)) {
        None
    } else {
        Some(rewritten)
    }
}

pub fn walk_multi<R: IndexNotationRewriterStrict + ?Sized>(
    rewriter: &mut R,
    op: &Multi,
    stmt: &IndexStmt,
) -> IndexStmt {
    match walk_list(rewriter, &op.stmts) {
        Some(stmts) => IndexStmt::multi(stmts),
        None => stmt.clone(),
    }
}

pub fn walk_sequence<R: IndexNotationRewriterStrict + ?Sized>(
    rewriter: &mut R,
    op: &Sequence,
    stmt: &IndexStmt,
) -> IndexStmt {
    match walk_list(rewriter, &op.stmts) {
        Some(stmts) => IndexStmt::sequence(stmts),
        None => stmt.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BinaryOp, IndexVar, TensorVar};
    use crate::storage::Format;
    use crate::types::{DataType, Shape, Type};

    struct Identity;

    impl IndexNotationRewriter for Identity {}

    // Turns every addition into a subtraction
    struct AddToSub {
        seen: usize,
    }

    impl IndexNotationRewriter for AddToSub {
        fn rewrite_add(&mut self, op: &Add, _expr: &IndexExpr) -> IndexExpr {
            self.seen += 1;
            let a = self.rewrite_expr(&op.a);
            let b = self.rewrite_expr(&op.b);
            IndexExpr::sub(a, b)
        }
    }

    fn vector(name: &str) -> TensorVar {
        TensorVar::new(
            name,
            Type::new(DataType::FLOAT64, Shape::fixed(&[4])),
            Format::dense(1),
        )
    }

    fn sample() -> (IndexStmt, IndexExpr) {
        let a = vector("a");
        let b = vector("b");
        let c = vector("c");
        let i = IndexVar::new("i");
        let bi = IndexExpr::access(&b, vec![i.clone()]);
        let ci = IndexExpr::access(&c, vec![i.clone()]);
        let rhs = (bi.clone() + ci) * IndexExpr::sqrt(bi);
        let stmt = IndexStmt::forall(
            i.clone(),
            IndexStmt::assignment(IndexExpr::access(&a, vec![i]), rhs.clone(), Some(BinaryOp::Add)),
        );
        (stmt, rhs)
    }

    #[test]
    fn test_identity_returns_same_handles() {
        let (stmt, rhs) = sample();
        let mut identity = Identity;
        assert!(identity.rewrite_stmt(&stmt).ptr_eq(&stmt));
        assert!(identity.rewrite_expr(&rhs).ptr_eq(&rhs));
    }

    #[test]
    fn test_partial_override() {
        let (stmt, _) = sample();
        let mut pass = AddToSub { seen: 0 };
        let result = pass.rewrite_stmt(&stmt);
        assert_eq!(pass.seen, 1);
        assert_eq!(result.to_string(), "forall(i, a(i) += (b(i) - c(i)) * sqrt(b(i)))");
        // Untouched subtrees are shared with the input
        assert_eq!(stmt.to_string(), "forall(i, a(i) += (b(i) + c(i)) * sqrt(b(i)))");
    }

    #[test]
    fn test_walk_fallback_after_override() {
        // Counts foralls, then falls back to the default traversal
        struct ForallCounter(usize);

        impl IndexNotationRewriter for ForallCounter {
            fn rewrite_forall(&mut self, op: &Forall, stmt: &IndexStmt) -> IndexStmt {
                self.0 += 1;
                walk_forall(self, op, stmt)
            }
        }

        let (stmt, _) = sample();
        let nested = IndexStmt::sequence(vec![stmt.clone(), stmt]);
        let mut counter = ForallCounter(0);
        let result = counter.rewrite_stmt(&nested);
        assert_eq!(counter.0, 2);
        assert!(result.ptr_eq(&nested));
    }

    #[test]
    #[should_panic(expected = "Undefined index notation node")]
    fn test_undefined_stmt_panics() {
        Identity.rewrite_stmt(&IndexStmt::undefined());
    }
}
