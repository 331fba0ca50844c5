// Tensor Types
//
// A tensor type pairs a component data type with a shape. Scalars are
// 0-order tensors, vectors 1-order and matrices 2-order; there is no
// separate type per order.

use crate::types::{DataType, Shape};
use std::fmt;

/// Component type and shape of a tensor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    data_type: DataType,
    shape: Shape,
}

impl Type {
    pub fn new(data_type: DataType, shape: Shape) -> Self {
        Self { data_type, shape }
    }

    /// A 0-order tensor of the given component type
    pub fn scalar(data_type: DataType) -> Self {
        Self::new(data_type, Shape::scalar())
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn order(&self) -> usize {
        self.shape.order()
    }
}

impl Default for Type {
    fn default() -> Self {
        Self::scalar(DataType::FLOAT64)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.shape.is_scalar() {
            write!(f, "{}", self.data_type)
        } else {
            write!(f, "{}{}", self.data_type, self.shape)
        }
    }
}
