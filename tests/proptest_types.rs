//! Property tests for type promotion, shapes, packing and rewriting

use proptest::prelude::*;
use rusttensor::ir::{IndexExpr, IndexVar, TensorVar};
use rusttensor::rewriter::{ExprRewriterStrict, IndexNotationRewriter};
use rusttensor::storage::{Format, TensorBuilder};
use rusttensor::types::{max_type, ComponentValue, DataType, Dimension, Shape, Type};

const ALL_TYPES: [DataType; 15] = [
    DataType::BOOL,
    DataType::UINT8,
    DataType::UINT16,
    DataType::UINT32,
    DataType::UINT64,
    DataType::UINT128,
    DataType::INT8,
    DataType::INT16,
    DataType::INT32,
    DataType::INT64,
    DataType::INT128,
    DataType::FLOAT32,
    DataType::FLOAT64,
    DataType::COMPLEX64,
    DataType::COMPLEX128,
];

fn data_type() -> impl Strategy<Value = DataType> {
    proptest::sample::select(ALL_TYPES.to_vec())
}

struct Identity;

impl IndexNotationRewriter for Identity {}

// Folds a list of opcodes into an expression over two vectors
fn build_expr(ops: &[u8]) -> IndexExpr {
    let dtype = Type::new(DataType::FLOAT64, Shape::fixed(&[4]));
    let b = TensorVar::new("b", dtype.clone(), Format::dense(1));
    let c = TensorVar::new("c", dtype, Format::sparse(1));
    let i = IndexVar::new("i");
    let j = IndexVar::new("j");
    let mut expr = IndexExpr::access(&b, vec![i.clone()]);
    for op in ops {
        let leaf = IndexExpr::access(&c, vec![i.clone()]);
        expr = match op % 7 {
            0 => expr + leaf,
            1 => expr - leaf,
            2 => expr * leaf,
            3 => expr / IndexExpr::literal(2.0f64),
            4 => -expr,
            5 => IndexExpr::sqrt(expr),
            _ => IndexExpr::sum(j.clone(), expr * IndexExpr::access(&c, vec![j.clone()])),
        };
    }
    expr
}

proptest! {
    /// Promotion does not depend on operand order
    #[test]
    fn max_type_commutes(a in data_type(), b in data_type()) {
        prop_assert_eq!(max_type(a, b), max_type(b, a));
    }

    /// Promotion of a type with itself is the type
    #[test]
    fn max_type_idempotent(a in data_type()) {
        prop_assert_eq!(max_type(a, a), a);
    }

    /// Promotion never narrows below either operand
    #[test]
    fn max_type_not_narrower(a in data_type(), b in data_type()) {
        let m = max_type(a, b);
        prop_assert!(m.num_bits() >= a.num_bits().min(b.num_bits()));
        if a.is_complex() || b.is_complex() {
            prop_assert!(m.is_complex());
        } else if a.is_float() || b.is_float() {
            prop_assert!(m.is_float());
        }
    }

    /// A dimension is exactly one of fixed or variable
    #[test]
    fn dimension_exclusive(size in 0usize..64) {
        let dim = if size == 0 { Dimension::variable() } else { Dimension::fixed(size) };
        prop_assert!(dim.is_fixed() != dim.is_variable());
    }

    /// The identity rewriter returns the same handle
    #[test]
    fn identity_rewrite_shares(ops in proptest::collection::vec(any::<u8>(), 0..12)) {
        let expr = build_expr(&ops);
        prop_assert!(Identity.rewrite_expr(&expr).ptr_eq(&expr));
    }

    /// Every format stores the same nonzero entries
    #[test]
    fn pack_preserves_entries(
        entries in proptest::collection::btree_map((0usize..5, 0usize..6), 1i64..100, 0..20),
    ) {
        let formats = [Format::csr(), Format::csc(), Format::dcsr(), Format::dense(2)];
        let expected: Vec<(Vec<usize>, ComponentValue)> = entries
            .iter()
            .map(|(&(r, c), &v)| (vec![r, c], ComponentValue::from(v)))
            .collect();
        for format in formats {
            let t = Type::new(DataType::INT64, Shape::fixed(&[5, 6]));
            let mut builder = TensorBuilder::new(t, format);
            for (&(r, c), &v) in &entries {
                builder.insert(&[r, c], v).unwrap();
            }
            let storage = builder.pack().unwrap();
            prop_assert_eq!(&storage.nonzeros(), &expected);
        }
    }
}
