// Index Statements
//
// Statements assign expressions to tensor accesses and arrange those
// assignments under loops (Forall), producer/consumer pairs (Where), and
// fusable or strictly ordered groups (Multi, Sequence).

use crate::core::error::{IrError, Result};
use crate::ir::expr::{Access, BinaryOp, Hashed, IndexExpr};
use crate::ir::var::{IndexVar, TensorVar};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// `lhs = rhs`, or `lhs op= rhs` when `op` is set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    lhs: IndexExpr,
    rhs: IndexExpr,
    op: Option<BinaryOp>,
}

impl Assignment {
    /// The target access, always an Access node
    pub fn lhs(&self) -> &IndexExpr {
        &self.lhs
    }

    pub fn rhs(&self) -> &IndexExpr {
        &self.rhs
    }

    /// Compound operator, if the assignment accumulates into its target
    pub fn op(&self) -> Option<BinaryOp> {
        self.op
    }

    pub fn access(&self) -> &Access {
        match self.lhs.as_access() {
            Some(access) => access,
            None => unreachable!("assignment target is always an access"),
        }
    }

    pub fn tensor(&self) -> &TensorVar {
        self.access().tensor()
    }

    pub fn is_compound(&self) -> bool {
        self.op.is_some()
    }
}

/// Run `body` once for every value of `var`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Forall {
    pub var: IndexVar,
    pub body: IndexStmt,
}

/// Compute `producer`, then run `consumer` which reads its result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Where {
    pub consumer: IndexStmt,
    pub producer: IndexStmt,
}

/// Sibling statements that later passes may fuse
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Multi {
    pub stmts: Vec<IndexStmt>,
}

/// Statements that run strictly one after another
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence {
    pub stmts: Vec<IndexStmt>,
}

/// The closed set of statement node kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StmtNode {
    Assignment(Assignment),
    Forall(Forall),
    Where(Where),
    Multi(Multi),
    Sequence(Sequence),
}

/// Handle to a statement node, possibly undefined
#[derive(Clone, Default)]
pub struct IndexStmt(Option<Rc<Hashed<StmtNode>>>);

impl IndexStmt {
    fn from_node(node: StmtNode) -> Self {
        Self(Some(Rc::new(Hashed::new(node))))
    }

    pub fn undefined() -> Self {
        Self(None)
    }

    pub fn defined(&self) -> bool {
        self.0.is_some()
    }

    pub fn node(&self) -> Option<&StmtNode> {
        self.0.as_deref().map(|shared| &shared.node)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// # Panics
    /// If `lhs` is not an access.
    pub fn assignment(lhs: IndexExpr, rhs: IndexExpr, op: Option<BinaryOp>) -> Self {
        Self::try_assignment(lhs, rhs, op).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_assignment(lhs: IndexExpr, rhs: IndexExpr, op: Option<BinaryOp>) -> Result<Self> {
        if lhs.as_access().is_none() {
            return Err(IrError::InvalidAssignmentTarget);
        }
        Ok(Self::from_node(StmtNode::Assignment(Assignment { lhs, rhs, op })))
    }

    /// Plain assignment `lhs = rhs`
    pub fn assign(lhs: IndexExpr, rhs: IndexExpr) -> Self {
        Self::assignment(lhs, rhs, None)
    }

    pub fn forall(var: IndexVar, body: IndexStmt) -> Self {
        Self::from_node(StmtNode::Forall(Forall { var, body }))
    }

    pub fn where_(consumer: IndexStmt, producer: IndexStmt) -> Self {
        Self::from_node(StmtNode::Where(Where { consumer, producer }))
    }

    pub fn multi(stmts: Vec<IndexStmt>) -> Self {
        Self::from_node(StmtNode::Multi(Multi { stmts }))
    }

    pub fn sequence(stmts: Vec<IndexStmt>) -> Self {
        Self::from_node(StmtNode::Sequence(Sequence { stmts }))
    }

    pub fn as_assignment(&self) -> Option<&Assignment> {
        match self.node() {
            Some(StmtNode::Assignment(assignment)) => Some(assignment),
            _ => None,
        }
    }

    /// Index variables used but not bound by an enclosing forall
    pub fn free_vars(&self) -> Vec<IndexVar> {
        let mut vars = Vec::new();
        self.collect_free_vars(&mut Vec::new(), &mut vars);
        vars
    }

    fn collect_free_vars(&self, bound: &mut Vec<IndexVar>, out: &mut Vec<IndexVar>) {
        let node = match self.node() {
            Some(node) => node,
            None => return,
        };
        match node {
            StmtNode::Assignment(op) => {
                let mut used = Vec::new();
                op.lhs.collect_vars(&mut Vec::new(), true, &mut used);
                op.rhs.collect_vars(&mut Vec::new(), true, &mut used);
                for var in used {
                    if !bound.contains(&var) && !out.contains(&var) {
                        out.push(var);
                    }
                }
            }
            StmtNode::Forall(op) => {
                bound.push(op.var.clone());
                op.body.collect_free_vars(bound, out);
                bound.pop();
            }
            StmtNode::Where(op) => {
                op.consumer.collect_free_vars(bound, out);
                op.producer.collect_free_vars(bound, out);
            }
            StmtNode::Multi(op) => {
                for stmt in &op.stmts {
                    stmt.collect_free_vars(bound, out);
                }
            }
            StmtNode::Sequence(op) => {
                for stmt in &op.stmts {
                    stmt.collect_free_vars(bound, out);
                }
            }
        }
    }

    /// Tensors written by the statement and visible to its caller
    ///
    /// The temporaries a Where producer writes for its consumer are not
    /// results of the Where.
    pub fn result_tensors(&self) -> Vec<TensorVar> {
        let mut results = Vec::new();
        self.collect_results(&mut results);
        results
    }

    fn collect_results(&self, out: &mut Vec<TensorVar>) {
        let node = match self.node() {
            Some(node) => node,
            None => return,
        };
        match node {
            StmtNode::Assignment(op) => {
                let tensor = op.tensor();
                if !out.contains(tensor) {
                    out.push(tensor.clone());
                }
            }
            StmtNode::Forall(op) => op.body.collect_results(out),
            StmtNode::Where(op) => op.consumer.collect_results(out),
            StmtNode::Multi(op) => {
                for stmt in &op.stmts {
                    stmt.collect_results(out);
                }
            }
            StmtNode::Sequence(op) => {
                for stmt in &op.stmts {
                    stmt.collect_results(out);
                }
            }
        }
    }

    /// Tensors read by any expression in the statement
    pub fn input_tensors(&self) -> Vec<TensorVar> {
        let mut inputs = Vec::new();
        self.collect_inputs(&mut inputs);
        inputs
    }

    fn collect_inputs(&self, out: &mut Vec<TensorVar>) {
        let node = match self.node() {
            Some(node) => node,
            None => return,
        };
        match node {
            StmtNode::Assignment(op) => collect_accessed(&op.rhs, out),
            StmtNode::Forall(op) => op.body.collect_inputs(out),
            StmtNode::Where(op) => {
                op.consumer.collect_inputs(out);
                op.producer.collect_inputs(out);
            }
            StmtNode::Multi(op) => {
                for stmt in &op.stmts {
                    stmt.collect_inputs(out);
                }
            }
            StmtNode::Sequence(op) => {
                for stmt in &op.stmts {
                    stmt.collect_inputs(out);
                }
            }
        }
    }
}

fn collect_accessed(expr: &IndexExpr, out: &mut Vec<TensorVar>) {
    use crate::ir::expr::ExprNode;

    let node = match expr.node() {
        Some(node) => node,
        None => return,
    };
    match node {
        ExprNode::Access(op) => {
            if !out.contains(op.tensor()) {
                out.push(op.tensor().clone());
            }
        }
        ExprNode::Literal(_) => {}
        ExprNode::Neg(op) => collect_accessed(&op.a, out),
        ExprNode::Sqrt(op) => collect_accessed(&op.a, out),
        ExprNode::Add(op) => {
            collect_accessed(&op.a, out);
            collect_accessed(&op.b, out);
        }
        ExprNode::Sub(op) => {
            collect_accessed(&op.a, out);
            collect_accessed(&op.b, out);
        }
        ExprNode::Mul(op) => {
            collect_accessed(&op.a, out);
            collect_accessed(&op.b, out);
        }
        ExprNode::Div(op) => {
            collect_accessed(&op.a, out);
            collect_accessed(&op.b, out);
        }
        ExprNode::Reduction(op) => collect_accessed(&op.a, out),
    }
}

impl PartialEq for IndexStmt {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b) || **a == **b,
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for IndexStmt {}

impl Hash for IndexStmt {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_ref().map(|shared| shared.hash).hash(state);
    }
}

impl fmt::Debug for IndexStmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.node() {
            Some(node) => fmt::Debug::fmt(node, f),
            None => write!(f, "Undefined"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_assignment_target_checked() {
        let a = vector("a");
        let i = IndexVar::new("i");
        let rhs = IndexExpr::literal(1.0f64);
        assert_eq!(
            IndexStmt::try_assignment(rhs.clone(), rhs.clone(), None),
            Err(IrError::InvalidAssignmentTarget)
        );
        let s = IndexStmt::assignment(IndexExpr::access(&a, vec![i]), rhs, Some(BinaryOp::Add));
        let assignment = s.as_assignment().unwrap();
        assert!(assignment.is_compound());
        assert_eq!(assignment.tensor(), &a);
    }

    #[test]
    fn test_free_vars() {
        let a = vector("a");
        let b = vector("b");
        let i = IndexVar::new("i");
        let j = IndexVar::new("j");
        let body = IndexStmt::assign(
            IndexExpr::access(&a, vec![i.clone()]),
            IndexExpr::access(&b, vec![j.clone()]),
        );
        let s = IndexStmt::forall(i.clone(), body.clone());
        assert_eq!(body.free_vars(), vec![i, j.clone()]);
        assert_eq!(s.free_vars(), vec![j]);
    }

    #[test]
    fn test_result_and_input_tensors() {
        let a = vector("a");
        let t = vector("t");
        let b = vector("b");
        let i = IndexVar::new("i");
        let consumer = IndexStmt::assign(
            IndexExpr::access(&a, vec![i.clone()]),
            IndexExpr::access(&t, vec![i.clone()]),
        );
        let producer = IndexStmt::assign(
            IndexExpr::access(&t, vec![i.clone()]),
            IndexExpr::access(&b, vec![i.clone()]),
        );
        let s = IndexStmt::forall(i, IndexStmt::where_(consumer, producer));
        assert_eq!(s.result_tensors(), vec![a]);
        assert_eq!(s.input_tensors(), vec![t, b]);
    }
}
