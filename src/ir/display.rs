// Printing Index Notation
//
// Expressions print as infix arithmetic with the minimum parentheses
// needed to read back the same tree. Statements print in functional form:
// `forall(i, A(i) = B(i))`.

use crate::ir::expr::{Access, BinaryOp, ExprNode, IndexExpr};
use crate::ir::stmt::{IndexStmt, StmtNode};
use std::fmt;

// Binding strength; higher binds tighter
const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_NEG: u8 = 3;
const PREC_ATOM: u8 = 4;

fn precedence(expr: &IndexExpr) -> u8 {
    match expr.node() {
        Some(ExprNode::Add(_)) | Some(ExprNode::Sub(_)) => PREC_ADD,
        Some(ExprNode::Mul(_)) | Some(ExprNode::Div(_)) => PREC_MUL,
        Some(ExprNode::Neg(_)) => PREC_NEG,
        _ => PREC_ATOM,
    }
}

fn write_operand(f: &mut fmt::Formatter, expr: &IndexExpr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

fn write_binary(
    f: &mut fmt::Formatter,
    op: BinaryOp,
    a: &IndexExpr,
    b: &IndexExpr,
) -> fmt::Result {
    let prec = match op {
        BinaryOp::Add | BinaryOp::Sub => PREC_ADD,
        BinaryOp::Mul | BinaryOp::Div => PREC_MUL,
    };
    // a - (b - c) and a / (b * c) keep their parentheses
    let right_assoc_matters = matches!(op, BinaryOp::Sub | BinaryOp::Div);
    write_operand(f, a, precedence(a) < prec)?;
    write!(f, " {} ", op)?;
    let b_prec = precedence(b);
    write_operand(f, b, b_prec < prec || (right_assoc_matters && b_prec == prec))
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tensor())?;
        if self.indices().is_empty() {
            return Ok(());
        }
        write!(f, "(")?;
        for (i, var) in self.indices().iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", var)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for IndexExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let node = match self.node() {
            Some(node) => node,
            None => return write!(f, "undefined"),
        };
        match node {
            ExprNode::Access(op) => write!(f, "{}", op),
            ExprNode::Literal(op) => write!(f, "{}", op.value),
            ExprNode::Neg(op) => {
                write!(f, "-")?;
                write_operand(f, &op.a, precedence(&op.a) < PREC_NEG)
            }
            ExprNode::Sqrt(op) => write!(f, "sqrt({})", op.a),
            ExprNode::Add(op) => write_binary(f, BinaryOp::Add, &op.a, &op.b),
            ExprNode::Sub(op) => write_binary(f, BinaryOp::Sub, &op.a, &op.b),
            ExprNode::Mul(op) => write_binary(f, BinaryOp::Mul, &op.a, &op.b),
            ExprNode::Div(op) => write_binary(f, BinaryOp::Div, &op.a, &op.b),
            ExprNode::Reduction(op) => {
                let name = match op.op {
                    BinaryOp::Mul => "product",
                    _ => "sum",
                };
                write!(f, "{}({}, {})", name, op.var, op.a)
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter, name: &str, stmts: &[IndexStmt]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, stmt) in stmts.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", stmt)?;
    }
    write!(f, ")")
}

impl fmt::Display for IndexStmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let node = match self.node() {
            Some(node) => node,
            None => return write!(f, "undefined"),
        };
        match node {
            StmtNode::Assignment(op) => match op.op() {
                Some(binary) => write!(f, "{} {}= {}", op.lhs(), binary, op.rhs()),
                None => write!(f, "{} = {}", op.lhs(), op.rhs()),
            },
            StmtNode::Forall(op) => write!(f, "forall({}, {})", op.var, op.body),
            StmtNode::Where(op) => write!(f, "where({}, {})", op.consumer, op.producer),
            StmtNode::Multi(op) => write_list(f, "multi", &op.stmts),
            StmtNode::Sequence(op) => write_list(f, "sequence", &op.stmts),
        }
    }
}
