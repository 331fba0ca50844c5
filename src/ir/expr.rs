// Index Expressions
//
// An IndexExpr is a shared handle to an immutable expression node, or an
// undefined handle. Each node kind has its own struct so rewriters get a
// typed view of the node they handle. Handles compare and hash
// structurally; the variables inside compare by identity.

use crate::core::error::{IrError, Result};
use crate::ir::var::{IndexVar, TensorVar};
use crate::types::{max_type, ComponentValue, DataType};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Binary operators of the expression grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// Whether the operator can combine the terms of a reduction
    pub fn is_associative(&self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Mul)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Read of a tensor at the given index variables
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Access {
    tensor: TensorVar,
    indices: Vec<IndexVar>,
}

impl Access {
    pub fn tensor(&self) -> &TensorVar {
        &self.tensor
    }

    pub fn indices(&self) -> &[IndexVar] {
        &self.indices
    }
}

/// Typed scalar constant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub value: ComponentValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Neg {
    pub a: IndexExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sqrt {
    pub a: IndexExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Add {
    pub a: IndexExpr,
    pub b: IndexExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sub {
    pub a: IndexExpr,
    pub b: IndexExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mul {
    pub a: IndexExpr,
    pub b: IndexExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Div {
    pub a: IndexExpr,
    pub b: IndexExpr,
}

/// Combines `a` over every value of `var` with an associative operator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reduction {
    pub op: BinaryOp,
    pub var: IndexVar,
    pub a: IndexExpr,
}

/// The closed set of expression node kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprNode {
    Access(Access),
    Literal(Literal),
    Neg(Neg),
    Sqrt(Sqrt),
    Add(Add),
    Sub(Sub),
    Mul(Mul),
    Div(Div),
    Reduction(Reduction),
}

// A node and its structural hash, computed once when the node is built.
// Children hash through their cached value, so hashing a handle is O(1).
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Hashed<N> {
    pub(crate) hash: u64,
    pub(crate) node: N,
}

impl<N: Hash> Hashed<N> {
    pub(crate) fn new(node: N) -> Self {
        let mut hasher = DefaultHasher::new();
        node.hash(&mut hasher);
        Self {
            hash: hasher.finish(),
            node,
        }
    }
}

/// Handle to an expression node, possibly undefined
#[derive(Clone, Default)]
pub struct IndexExpr(Option<Rc<Hashed<ExprNode>>>);

impl IndexExpr {
    fn from_node(node: ExprNode) -> Self {
        Self(Some(Rc::new(Hashed::new(node))))
    }

    /// The empty handle
    pub fn undefined() -> Self {
        Self(None)
    }

    pub fn defined(&self) -> bool {
        self.0.is_some()
    }

    pub fn node(&self) -> Option<&ExprNode> {
        self.0.as_deref().map(|shared| &shared.node)
    }

    /// Whether both handles point at the same node (or are both undefined)
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Access `tensor` at `indices`
    ///
    /// # Panics
    /// If the number of indices differs from the tensor order.
    pub fn access(tensor: &TensorVar, indices: Vec<IndexVar>) -> Self {
        Self::try_access(tensor, indices).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_access(tensor: &TensorVar, indices: Vec<IndexVar>) -> Result<Self> {
        if indices.len() != tensor.order() {
            return Err(IrError::OrderMismatch {
                expected: tensor.order(),
                found: indices.len(),
            });
        }
        Ok(Self::from_node(ExprNode::Access(Access {
            tensor: tensor.clone(),
            indices,
        })))
    }

    pub fn literal(value: impl Into<ComponentValue>) -> Self {
        Self::from_node(ExprNode::Literal(Literal {
            value: value.into(),
        }))
    }

    pub fn neg(a: IndexExpr) -> Self {
        Self::from_node(ExprNode::Neg(Neg { a }))
    }

    pub fn sqrt(a: IndexExpr) -> Self {
        Self::from_node(ExprNode::Sqrt(Sqrt { a }))
    }

    pub fn add(a: IndexExpr, b: IndexExpr) -> Self {
        Self::from_node(ExprNode::Add(Add { a, b }))
    }

    pub fn sub(a: IndexExpr, b: IndexExpr) -> Self {
        Self::from_node(ExprNode::Sub(Sub { a, b }))
    }

    pub fn mul(a: IndexExpr, b: IndexExpr) -> Self {
        Self::from_node(ExprNode::Mul(Mul { a, b }))
    }

    pub fn div(a: IndexExpr, b: IndexExpr) -> Self {
        Self::from_node(ExprNode::Div(Div { a, b }))
    }

    /// Binary node of the given operator
    pub fn binary(op: BinaryOp, a: IndexExpr, b: IndexExpr) -> Self {
        match op {
            BinaryOp::Add => Self::add(a, b),
            BinaryOp::Sub => Self::sub(a, b),
            BinaryOp::Mul => Self::mul(a, b),
            BinaryOp::Div => Self::div(a, b),
        }
    }

    /// Reduce `a` over `var` with `op`
    ///
    /// # Panics
    /// If `op` is not associative.
    pub fn reduction(op: BinaryOp, var: IndexVar, a: IndexExpr) -> Self {
        Self::try_reduction(op, var, a).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_reduction(op: BinaryOp, var: IndexVar, a: IndexExpr) -> Result<Self> {
        if !op.is_associative() {
            return Err(IrError::NonAssociativeReduction(op));
        }
        Ok(Self::from_node(ExprNode::Reduction(Reduction { op, var, a })))
    }

    /// Summation of `a` over `var`
    pub fn sum(var: IndexVar, a: IndexExpr) -> Self {
        Self::from_node(ExprNode::Reduction(Reduction {
            op: BinaryOp::Add,
            var,
            a,
        }))
    }

    pub fn as_access(&self) -> Option<&Access> {
        match self.node() {
            Some(ExprNode::Access(access)) => Some(access),
            _ => None,
        }
    }

    /// Component type of the expression's value
    pub fn data_type(&self) -> DataType {
        let node = match self.node() {
            Some(node) => node,
            None => return DataType::UNDEFINED,
        };
        match node {
            ExprNode::Access(op) => op.tensor.tensor_type().data_type(),
            ExprNode::Literal(op) => op.value.data_type(),
            ExprNode::Neg(op) => op.a.data_type(),
            ExprNode::Sqrt(op) => {
                let t = op.a.data_type();
                if t.is_float() || t.is_complex() {
                    t
                } else {
                    DataType::FLOAT64
                }
            }
            ExprNode::Add(op) => max_type(op.a.data_type(), op.b.data_type()),
            ExprNode::Sub(op) => max_type(op.a.data_type(), op.b.data_type()),
            ExprNode::Mul(op) => max_type(op.a.data_type(), op.b.data_type()),
            ExprNode::Div(op) => max_type(op.a.data_type(), op.b.data_type()),
            ExprNode::Reduction(op) => op.a.data_type(),
        }
    }

    /// Every index variable in the expression, in order of first use
    pub fn index_vars(&self) -> Vec<IndexVar> {
        let mut vars = Vec::new();
        self.collect_vars(&mut Vec::new(), false, &mut vars);
        vars
    }

    /// Index variables not bound by a reduction, in order of first use
    pub fn free_vars(&self) -> Vec<IndexVar> {
        let mut vars = Vec::new();
        self.collect_vars(&mut Vec::new(), true, &mut vars);
        vars
    }

    /// Whether `var` occurs in the expression outside any reduction over it
    pub fn uses_var(&self, var: &IndexVar) -> bool {
        self.free_vars().contains(var)
    }

    pub(crate) fn collect_vars(
        &self,
        bound: &mut Vec<IndexVar>,
        free_only: bool,
        out: &mut Vec<IndexVar>,
    ) {
        let node = match self.node() {
            Some(node) => node,
            None => return,
        };
        match node {
            ExprNode::Access(op) => {
                for var in &op.indices {
                    let hidden = free_only && bound.contains(var);
                    if !hidden && !out.contains(var) {
                        out.push(var.clone());
                    }
                }
            }
            ExprNode::Literal(_) => {}
            ExprNode::Neg(op) => op.a.collect_vars(bound, free_only, out),
            ExprNode::Sqrt(op) => op.a.collect_vars(bound, free_only, out),
            ExprNode::Add(op) => {
                op.a.collect_vars(bound, free_only, out);
                op.b.collect_vars(bound, free_only, out);
            }
            ExprNode::Sub(op) => {
                op.a.collect_vars(bound, free_only, out);
                op.b.collect_vars(bound, free_only, out);
            }
            ExprNode::Mul(op) => {
                op.a.collect_vars(bound, free_only, out);
                op.b.collect_vars(bound, free_only, out);
            }
            ExprNode::Div(op) => {
                op.a.collect_vars(bound, free_only, out);
                op.b.collect_vars(bound, free_only, out);
            }
            ExprNode::Reduction(op) => {
                if !free_only && !out.contains(&op.var) {
                    out.push(op.var.clone());
                }
                bound.push(op.var.clone());
                op.a.collect_vars(bound, free_only, out);
                bound.pop();
            }
        }
    }
}

impl std::ops::Add for IndexExpr {
    type Output = IndexExpr;

    fn add(self, rhs: IndexExpr) -> IndexExpr {
        IndexExpr::add(self, rhs)
    }
}

impl std::ops::Sub for IndexExpr {
    type Output = IndexExpr;

    fn sub(self, rhs: IndexExpr) -> IndexExpr {
        IndexExpr::sub(self, rhs)
    }
}

impl std::ops::Mul for IndexExpr {
    type Output = IndexExpr;

    fn mul(self, rhs: IndexExpr) -> IndexExpr {
        IndexExpr::mul(self, rhs)
    }
}

impl std::ops::Div for IndexExpr {
    type Output = IndexExpr;

    fn div(self, rhs: IndexExpr) -> IndexExpr {
        IndexExpr::div(self, rhs)
    }
}

impl std::ops::Neg for IndexExpr {
    type Output = IndexExpr;

    fn neg(self) -> IndexExpr {
        IndexExpr::neg(self)
    }
}

impl PartialEq for IndexExpr {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b) || **a == **b,
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for IndexExpr {}

impl Hash for IndexExpr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_ref().map(|shared| shared.hash).hash(state);
    }
}

impl fmt::Debug for IndexExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.node() {
            Some(node) => fmt::Debug::fmt(node, f),
            None => write!(f, "Undefined"),
        }
    }
}
