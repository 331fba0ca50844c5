// Substitution
//
// replace swaps whole subtrees that equal a key of the substitution map.
// A replaced subtree is not visited again, so a replacement that contains
// its own key does not loop. Unmatched subtrees keep their handles.
// Assignment targets are writes, not reads: they are only swapped for a
// replacement that is itself an access.
//
// replace_vars renames index variables everywhere they occur: access
// lists, reduction binders and forall binders.

use crate::ir::{Access, Assignment, Forall, IndexExpr, IndexStmt, IndexVar, Reduction};
use crate::rewriter::default::{walk_forall, walk_reduction, IndexNotationRewriter};
use crate::rewriter::strict::{ExprRewriterStrict, IndexNotationRewriterStrict};
use std::collections::HashMap;

struct Substitution<'a> {
    exprs: &'a HashMap<IndexExpr, IndexExpr>,
    stmts: &'a HashMap<IndexStmt, IndexStmt>,
}

impl IndexNotationRewriter for Substitution<'_> {
    fn substitute_expr(&mut self, expr: &IndexExpr) -> Option<IndexExpr> {
        let replacement = self.exprs.get(expr).cloned();
        if replacement.is_some() {
            log::trace!("Substituting expression {}", expr);
        }
        replacement
    }

    fn substitute_stmt(&mut self, stmt: &IndexStmt) -> Option<IndexStmt> {
        let replacement = self.stmts.get(stmt).cloned();
        if replacement.is_some() {
            log::trace!("Substituting statement {}", stmt);
        }
        replacement
    }

    fn rewrite_assignment(&mut self, op: &Assignment, stmt: &IndexStmt) -> IndexStmt {
        let lhs = match self.exprs.get(op.lhs()) {
            Some(target) if target.as_access().is_some() => {
                log::trace!("Substituting assignment target {}", op.lhs());
                target.clone()
            }
            _ => op.lhs().clone(),
        };
        let rhs = self.rewrite_expr(op.rhs());
        if lhs.ptr_eq(op.lhs()) && rhs.ptr_eq(op.rhs()) {
            stmt.clone()
        } else {
            IndexStmt::assignment(lhs, rhs, op.op())
        }
    }
}

/// Replace every subtree of `expr` that equals a key of `substitutions`
///
/// # Panics
/// If `expr` is undefined.
pub fn replace(expr: &IndexExpr, substitutions: &HashMap<IndexExpr, IndexExpr>) -> IndexExpr {
    if substitutions.is_empty() {
        return expr.clone();
    }
    let stmts = HashMap::new();
    Substitution {
        exprs: substitutions,
        stmts: &stmts,
    }
    .rewrite_expr(expr)
}

/// Replace matching expressions and statements throughout `stmt`
///
/// At each node the statement map is consulted first; expressions are
/// looked up in the expression map.
///
/// # Panics
/// If `stmt` is undefined.
pub fn replace_stmt(
    stmt: &IndexStmt,
    expr_substitutions: &HashMap<IndexExpr, IndexExpr>,
    stmt_substitutions: &HashMap<IndexStmt, IndexStmt>,
) -> IndexStmt {
    if expr_substitutions.is_empty() && stmt_substitutions.is_empty() {
        return stmt.clone();
    }
    Substitution {
        exprs: expr_substitutions,
        stmts: stmt_substitutions,
    }
    .rewrite_stmt(stmt)
}

struct VarSubstitution<'a> {
    vars: &'a HashMap<IndexVar, IndexVar>,
}

impl VarSubstitution<'_> {
    fn rename(&self, var: &IndexVar) -> IndexVar {
        self.vars.get(var).cloned().unwrap_or_else(|| var.clone())
    }
}

impl IndexNotationRewriter for VarSubstitution<'_> {
    fn rewrite_access(&mut self, op: &Access, expr: &IndexExpr) -> IndexExpr {
        if !op.indices().iter().any(|var| self.vars.contains_key(var)) {
            return expr.clone();
        }
        let indices = op.indices().iter().map(|var| self.rename(var)).collect();
        IndexExpr::access(op.tensor(), indices)
    }

    fn rewrite_reduction(&mut self, op: &Reduction, expr: &IndexExpr) -> IndexExpr {
        match self.vars.get(&op.var) {
            Some(var) => {
                let a = self.rewrite_expr(&op.a);
                IndexExpr::reduction(op.op, var.clone(), a)
            }
            None => walk_reduction(self, op, expr),
        }
    }

    fn rewrite_forall(&mut self, op: &Forall, stmt: &IndexStmt) -> IndexStmt {
        match self.vars.get(&op.var) {
            Some(var) => {
                let body = self.rewrite_stmt(&op.body);
                IndexStmt::forall(var.clone(), body)
            }
            None => walk_forall(self, op, stmt),
        }
    }
}

/// Rename index variables throughout `expr`
///
/// # Panics
/// If `expr` is undefined.
pub fn replace_vars(expr: &IndexExpr, substitutions: &HashMap<IndexVar, IndexVar>) -> IndexExpr {
    if substitutions.is_empty() {
        return expr.clone();
    }
    VarSubstitution {
        vars: substitutions,
    }
    .rewrite_expr(expr)
}

/// Rename index variables throughout `stmt`, binders included
///
/// # Panics
/// If `stmt` is undefined.
pub fn replace_vars_in_stmt(
    stmt: &IndexStmt,
    substitutions: &HashMap<IndexVar, IndexVar>,
) -> IndexStmt {
    if substitutions.is_empty() {
        return stmt.clone();
    }
    VarSubstitution {
        vars: substitutions,
    }
    .rewrite_stmt(stmt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TensorVar;
    use crate::storage::Format;
    use crate::types::{DataType, Shape, Type};

    fn vector(name: &str) -> TensorVar {
        TensorVar::new(
            name,
            Type::new(DataType::FLOAT64, Shape::fixed(&[4])),
            Format::dense(1),
        )
    }

    #[test]
    fn test_single_shot_substitution() {
        let a = vector("A");
        let b = vector("B");
        let i = IndexVar::new("i");
        let ai = IndexExpr::access(&a, vec![i.clone()]);
        let bi = IndexExpr::access(&b, vec![i]);
        let expr = ai.clone() + bi.clone();

        let zero = IndexExpr::literal(0.0f64);
        let mut map = HashMap::new();
        map.insert(ai, zero.clone());

        let result = replace(&expr, &map);
        assert_eq!(result, zero + bi.clone());

        // Untouched operand is shared, not copied
        match result.node() {
            Some(crate::ir::ExprNode::Add(add)) => assert!(add.b.ptr_eq(&bi)),
            _ => panic!("expected an addition"),
        }
    }

    #[test]
    fn test_replacement_not_revisited() {
        let a = vector("A");
        let i = IndexVar::new("i");
        let ai = IndexExpr::access(&a, vec![i]);
        let mut map = HashMap::new();
        map.insert(ai.clone(), -ai.clone());

        let result = replace(&ai, &map);
        assert_eq!(result, -ai);
    }

    #[test]
    fn test_deep_chain_substitution() {
        let a = vector("A");
        let b = vector("B");
        let i = IndexVar::new("i");
        let leaf = IndexExpr::access(&a, vec![i.clone()]);
        let mut expr = leaf.clone();
        for _ in 0..200 {
            expr = expr + IndexExpr::access(&b, vec![i.clone()]);
        }
        let mut map = HashMap::new();
        map.insert(leaf, IndexExpr::literal(0.0f64));
        let result = replace(&expr, &map);
        assert_ne!(result, expr);
        assert_eq!(result.index_vars(), vec![i]);
    }

    #[test]
    fn test_empty_map_is_identity() {
        let a = vector("A");
        let i = IndexVar::new("i");
        let expr = IndexExpr::sqrt(IndexExpr::access(&a, vec![i]));
        assert!(replace(&expr, &HashMap::new()).ptr_eq(&expr));
    }

    #[test]
    fn test_replace_vars_renames_binders() {
        let a = vector("a");
        let b = vector("b");
        let i = IndexVar::new("i");
        let k = IndexVar::new("k");
        let stmt = IndexStmt::forall(
            i.clone(),
            IndexStmt::assign(
                IndexExpr::access(&a, vec![i.clone()]),
                IndexExpr::access(&b, vec![i.clone()]),
            ),
        );
        let mut map = HashMap::new();
        map.insert(i, k.clone());

        let expected = IndexStmt::forall(
            k.clone(),
            IndexStmt::assign(
                IndexExpr::access(&a, vec![k.clone()]),
                IndexExpr::access(&b, vec![k]),
            ),
        );
        assert_eq!(replace_vars_in_stmt(&stmt, &map), expected);
    }

    #[test]
    fn test_replace_vars_in_reduction() {
        let b = vector("b");
        let j = IndexVar::new("j");
        let l = IndexVar::new("l");
        let expr = IndexExpr::sum(j.clone(), IndexExpr::access(&b, vec![j.clone()]));
        let mut map = HashMap::new();
        map.insert(j, l.clone());
        assert_eq!(
            replace_vars(&expr, &map),
            IndexExpr::sum(l.clone(), IndexExpr::access(&b, vec![l]))
        );
    }

    #[test]
    fn test_replace_stmt() {
        let a = vector("a");
        let b = vector("b");
        let i = IndexVar::new("i");
        let inner = IndexStmt::assign(
            IndexExpr::access(&a, vec![i.clone()]),
            IndexExpr::access(&b, vec![i.clone()]),
        );
        let stmt = IndexStmt::forall(i.clone(), inner.clone());

        let zero = IndexStmt::assign(IndexExpr::access(&a, vec![i.clone()]), IndexExpr::literal(0.0f64));
        let mut stmts = HashMap::new();
        stmts.insert(inner, zero.clone());
        let result = replace_stmt(&stmt, &HashMap::new(), &stmts);
        assert_eq!(result, IndexStmt::forall(i.clone(), zero));

        let mut exprs = HashMap::new();
        exprs.insert(IndexExpr::access(&b, vec![i.clone()]), IndexExpr::literal(1.0f64));
        let result = replace_stmt(&stmt, &exprs, &HashMap::new());
        assert_eq!(result.to_string(), "forall(i, a(i) = 1)");
    }

    #[test]
    fn test_replace_stmt_keeps_assignment_target() {
        let a = vector("a");
        let b = vector("b");
        let i = IndexVar::new("i");
        let ai = IndexExpr::access(&a, vec![i.clone()]);
        let bi = IndexExpr::access(&b, vec![i.clone()]);
        let stmt = IndexStmt::forall(
            i.clone(),
            IndexStmt::assign(ai.clone(), ai.clone() + bi.clone()),
        );

        // Only the read of a(i) is replaced
        let mut exprs = HashMap::new();
        exprs.insert(ai.clone(), IndexExpr::literal(0.0f64));
        let result = replace_stmt(&stmt, &exprs, &HashMap::new());
        assert_eq!(result.to_string(), "forall(i, a(i) = 0 + b(i))");

        // An access replacement retargets the write
        let c = vector("c");
        let mut exprs = HashMap::new();
        exprs.insert(ai, IndexExpr::access(&c, vec![i]));
        let result = replace_stmt(&stmt, &exprs, &HashMap::new());
        assert_eq!(result.to_string(), "forall(i, c(i) = c(i) + b(i))");
    }
}
