// Well-formedness Checks
//
// A concrete statement binds every index variable it uses, reduces only
// over variables its operands use, and reads every temporary a Where
// producer writes for it.

use crate::core::error::{IrError, Result};
use crate::ir::expr::{ExprNode, IndexExpr};
use crate::ir::stmt::{IndexStmt, StmtNode};
use crate::ir::var::IndexVar;

/// Check that `stmt` is concrete index notation
pub fn verify_concrete(stmt: &IndexStmt) -> Result<()> {
    verify_stmt(stmt, &mut Vec::new())
}

fn verify_stmt(stmt: &IndexStmt, bound: &mut Vec<IndexVar>) -> Result<()> {
    let node = stmt.node().ok_or(IrError::UndefinedNode)?;
    match node {
        StmtNode::Assignment(op) => {
            verify_expr(op.lhs(), bound)?;
            verify_expr(op.rhs(), bound)
        }
        StmtNode::Forall(op) => {
            bound.push(op.var.clone());
            let result = verify_stmt(&op.body, bound);
            bound.pop();
            result
        }
        StmtNode::Where(op) => {
            verify_stmt(&op.consumer, bound)?;
            verify_stmt(&op.producer, bound)?;
            let inputs = op.consumer.input_tensors();
            for temporary in op.producer.result_tensors() {
                if !inputs.contains(&temporary) {
                    return Err(IrError::UnusedTemporary(temporary.name().to_string()));
                }
            }
            Ok(())
        }
        StmtNode::Multi(op) => op.stmts.iter().try_for_each(|s| verify_stmt(s, bound)),
        StmtNode::Sequence(op) => op.stmts.iter().try_for_each(|s| verify_stmt(s, bound)),
    }
}

fn verify_expr(expr: &IndexExpr, bound: &mut Vec<IndexVar>) -> Result<()> {
    let node = expr.node().ok_or(IrError::UndefinedNode)?;
    match node {
        ExprNode::Access(op) => {
            match op.indices().iter().find(|var| !bound.contains(var)) {
                Some(var) => Err(IrError::UnboundIndexVar(var.name().to_string())),
                None => Ok(()),
            }
        }
        ExprNode::Literal(_) => Ok(()),
        ExprNode::Neg(op) => verify_expr(&op.a, bound),
        ExprNode::Sqrt(op) => verify_expr(&op.a, bound),
        ExprNode::Add(op) => {
            verify_expr(&op.a, bound)?;
            verify_expr(&op.b, bound)
        }
        ExprNode::Sub(op) => {
            verify_expr(&op.a, bound)?;
            verify_expr(&op.b, bound)
        }
        ExprNode::Mul(op) => {
            verify_expr(&op.a, bound)?;
            verify_expr(&op.b, bound)
        }
        ExprNode::Div(op) => {
            verify_expr(&op.a, bound)?;
            verify_expr(&op.b, bound)
        }
        ExprNode::Reduction(op) => {
            if !op.op.is_associative() {
                return Err(IrError::NonAssociativeReduction(op.op));
            }
            if !op.a.uses_var(&op.var) {
                return Err(IrError::UnusedReductionVar(op.var.name().to_string()));
            }
            bound.push(op.var.clone());
            let result = verify_expr(&op.a, bound);
            bound.pop();
            result
        }
    }
}
