// Reduction Notation
//
// Einstein-style assignments leave summation implicit: `a(i) = B(i,j) * c(j)`
// sums over j because j does not appear on the left. This module makes
// those sums explicit as Reduction nodes.

use crate::ir::expr::{ExprNode, IndexExpr};
use crate::ir::stmt::IndexStmt;
use crate::ir::var::IndexVar;

/// Introduce explicit summations into a plain assignment
///
/// Every index variable used on the right-hand side but not on the
/// left-hand side is summed over. The sum is placed as deep as it can go
/// without changing the result: it moves into the one operand of an
/// addition, subtraction or negation that uses the variable, and stops at
/// any other node. Variables used first end up outermost.
///
/// Statements that are not plain assignments are returned unchanged.
pub fn make_reduction_notation(stmt: &IndexStmt) -> IndexStmt {
    let assignment = match stmt.as_assignment() {
        Some(assignment) if !assignment.is_compound() => assignment,
        _ => return stmt.clone(),
    };
    let lhs_vars = assignment.lhs().free_vars();
    let reduced: Vec<IndexVar> = assignment
        .rhs()
        .free_vars()
        .into_iter()
        .filter(|var| !lhs_vars.contains(var))
        .collect();
    if reduced.is_empty() {
        return stmt.clone();
    }

    let mut rhs = assignment.rhs().clone();
    for var in reduced.iter().rev() {
        rhs = place_sum(&rhs, var);
    }
    IndexStmt::assign(assignment.lhs().clone(), rhs)
}

fn place_sum(expr: &IndexExpr, var: &IndexVar) -> IndexExpr {
    if !expr.uses_var(var) {
        return expr.clone();
    }
    match expr.node() {
        Some(ExprNode::Add(op)) => match (op.a.uses_var(var), op.b.uses_var(var)) {
            (true, false) => IndexExpr::add(place_sum(&op.a, var), op.b.clone()),
            (false, true) => IndexExpr::add(op.a.clone(), place_sum(&op.b, var)),
            _ => IndexExpr::sum(var.clone(), expr.clone()),
        },
        Some(ExprNode::Sub(op)) => match (op.a.uses_var(var), op.b.uses_var(var)) {
            (true, false) => IndexExpr::sub(place_sum(&op.a, var), op.b.clone()),
            (false, true) => IndexExpr::sub(op.a.clone(), place_sum(&op.b, var)),
            _ => IndexExpr::sum(var.clone(), expr.clone()),
        },
        Some(ExprNode::Neg(op)) => IndexExpr::neg(place_sum(&op.a, var)),
        _ => IndexExpr::sum(var.clone(), expr.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BinaryOp, TensorVar};
    use crate::storage::Format;
    use crate::types::{DataType, Shape, Type};

    fn tensor(name: &str, dims: &[usize]) -> TensorVar {
        TensorVar::new(
            name,
            Type::new(DataType::FLOAT64, Shape::fixed(dims)),
            Format::dense(dims.len()),
        )
    }

    #[test]
    fn test_matrix_vector() {
        let a = tensor("a", &[3]);
        let b = tensor("B", &[3, 3]);
        let c = tensor("c", &[3]);
        let i = IndexVar::new("i");
        let j = IndexVar::new("j");
        let s = IndexStmt::assign(
            IndexExpr::access(&a, vec![i.clone()]),
            IndexExpr::access(&b, vec![i, j.clone()]) * IndexExpr::access(&c, vec![j]),
        );
        assert_eq!(
            make_reduction_notation(&s).to_string(),
            "a(i) = sum(j, B(i,j) * c(j))"
        );
    }

    #[test]
    fn test_sum_pushed_into_addend() {
        let a = tensor("a", &[3]);
        let b = tensor("B", &[3, 3]);
        let i = IndexVar::new("i");
        let j = IndexVar::new("j");
        let s = IndexStmt::assign(
            IndexExpr::access(&a, vec![i.clone()]),
            IndexExpr::access(&a, vec![i.clone()]) - IndexExpr::access(&b, vec![i, j]),
        );
        assert_eq!(
            make_reduction_notation(&s).to_string(),
            "a(i) = a(i) - sum(j, B(i,j))"
        );
    }

    #[test]
    fn test_first_used_var_outermost() {
        let x = TensorVar::scalar("x", DataType::FLOAT64);
        let b = tensor("B", &[3, 3]);
        let i = IndexVar::new("i");
        let j = IndexVar::new("j");
        let s = IndexStmt::assign(
            IndexExpr::access(&x, vec![]),
            IndexExpr::access(&b, vec![i, j]),
        );
        assert_eq!(
            make_reduction_notation(&s).to_string(),
            "x = sum(i, sum(j, B(i,j)))"
        );
    }

    #[test]
    fn test_compound_and_complete_assignments_unchanged() {
        let a = tensor("a", &[3]);
        let b = tensor("B", &[3, 3]);
        let i = IndexVar::new("i");
        let j = IndexVar::new("j");
        let compound = IndexStmt::assignment(
            IndexExpr::access(&a, vec![i.clone()]),
            IndexExpr::access(&b, vec![i.clone(), j]),
            Some(BinaryOp::Add),
        );
        assert!(make_reduction_notation(&compound).ptr_eq(&compound));

        let complete = IndexStmt::assign(
            IndexExpr::access(&a, vec![i.clone()]),
            IndexExpr::access(&a, vec![i]),
        );
        assert!(make_reduction_notation(&complete).ptr_eq(&complete));
    }
}
