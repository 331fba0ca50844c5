// Index and Tensor Variables
//
// Variables are named handles that compare by identity: two variables
// created separately are different even when they share a name. Clones of
// one variable are the same variable.

use crate::core::error::Result;
use crate::storage::Format;
use crate::types::{DataType, Type};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Debug)]
struct IndexVarContent {
    name: String,
}

/// A named iteration dimension
#[derive(Debug, Clone)]
pub struct IndexVar(Rc<IndexVarContent>);

impl IndexVar {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Rc::new(IndexVarContent { name: name.into() }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }
}

impl PartialEq for IndexVar {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for IndexVar {}

impl Hash for IndexVar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Display for IndexVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

#[derive(Debug)]
struct TensorVarContent {
    name: String,
    tensor_type: Type,
    format: Format,
}

/// A named tensor operand with a type and a storage format
#[derive(Debug, Clone)]
pub struct TensorVar(Rc<TensorVarContent>);

impl TensorVar {
    /// # Panics
    /// If the format order differs from the type order.
    pub fn new(name: impl Into<String>, tensor_type: Type, format: Format) -> Self {
        Self::try_new(name, tensor_type, format).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_new(name: impl Into<String>, tensor_type: Type, format: Format) -> Result<Self> {
        format.check_shape(tensor_type.shape())?;
        Ok(Self(Rc::new(TensorVarContent {
            name: name.into(),
            tensor_type,
            format,
        })))
    }

    /// A scalar tensor variable of the given component type
    pub fn scalar(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, Type::scalar(data_type), Format::dense(0))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn tensor_type(&self) -> &Type {
        &self.0.tensor_type
    }

    pub fn format(&self) -> &Format {
        &self.0.format
    }

    pub fn order(&self) -> usize {
        self.0.tensor_type.order()
    }
}

impl PartialEq for TensorVar {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TensorVar {}

impl Hash for TensorVar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Display for TensorVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}
