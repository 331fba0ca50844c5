// Storage Layer: Tensor Formats
//
// A format says, per tensor mode, whether the mode is stored densely or
// sparsely, in which order the modes are laid out, and which integer lane
// types the mode's index arrays use. CSR, CSC and DCSR are just particular
// formats of an order-2 tensor.

use crate::core::error::{IrError, Result};
use crate::types::{DataType, IndexValue, Shape};
use std::fmt;

/// Storage kind of a single tensor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeType {
    /// Every coordinate in `0..size` is stored
    Dense,
    /// Only present coordinates are stored, as a position/coordinate pair
    Sparse,
}

impl ModeType {
    /// Number of index arrays a mode of this type carries
    pub fn num_index_arrays(&self) -> usize {
        match self {
            ModeType::Dense => 1,
            ModeType::Sparse => 2,
        }
    }
}

impl fmt::Display for ModeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModeType::Dense => write!(f, "dense"),
            ModeType::Sparse => write!(f, "sparse"),
        }
    }
}

/// Physical layout of a tensor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Format {
    /// Mode types in storage order
    mode_types: Vec<ModeType>,
    /// `mode_ordering[level]` is the tensor dimension stored at that level
    mode_ordering: Vec<usize>,
    /// Lane type of each index array, per level
    level_array_types: Vec<Vec<DataType>>,
}

impl Format {
    /// Format with the identity mode ordering
    pub fn new(mode_types: Vec<ModeType>) -> Self {
        let ordering = (0..mode_types.len()).collect();
        Self::build(mode_types, ordering)
    }

    /// Format with an explicit mode ordering
    ///
    /// # Panics
    /// If `mode_ordering` is not a permutation of `0..mode_types.len()`.
    pub fn with_ordering(mode_types: Vec<ModeType>, mode_ordering: Vec<usize>) -> Self {
        Self::try_with_ordering(mode_types, mode_ordering)
            .unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_with_ordering(
        mode_types: Vec<ModeType>,
        mode_ordering: Vec<usize>,
    ) -> Result<Self> {
        if !is_permutation(&mode_ordering, mode_types.len()) {
            return Err(IrError::InvalidModeOrdering(mode_ordering));
        }
        Ok(Self::build(mode_types, mode_ordering))
    }

    fn build(mode_types: Vec<ModeType>, mode_ordering: Vec<usize>) -> Self {
        let level_array_types = mode_types
            .iter()
            .map(|mt| vec![DataType::INT32; mt.num_index_arrays()])
            .collect();
        Self {
            mode_types,
            mode_ordering,
            level_array_types,
        }
    }

    /// All-dense format of the given order
    pub fn dense(order: usize) -> Self {
        Self::new(vec![ModeType::Dense; order])
    }

    /// All-sparse format of the given order
    pub fn sparse(order: usize) -> Self {
        Self::new(vec![ModeType::Sparse; order])
    }

    /// Compressed sparse row
    pub fn csr() -> Self {
        Self::new(vec![ModeType::Dense, ModeType::Sparse])
    }

    /// Compressed sparse column
    pub fn csc() -> Self {
        Self::with_ordering(vec![ModeType::Dense, ModeType::Sparse], vec![1, 0])
    }

    /// Doubly compressed sparse row
    pub fn dcsr() -> Self {
        Self::sparse(2)
    }

    /// Replace the lane types of every index array
    ///
    /// `types[level]` must hold one entry per index array of that level,
    /// and every entry must be an integer type of at most 64 bits.
    pub fn with_level_array_types(mut self, types: Vec<Vec<DataType>>) -> Result<Self> {
        if types.len() != self.order() {
            return Err(IrError::OrderMismatch {
                expected: self.order(),
                found: types.len(),
            });
        }
        for (mode_type, lanes) in self.mode_types.iter().zip(&types) {
            if lanes.len() != mode_type.num_index_arrays() {
                return Err(IrError::IndexArrayCount {
                    mode_type: *mode_type,
                    expected: mode_type.num_index_arrays(),
                    found: lanes.len(),
                });
            }
            if let Some(bad) = lanes.iter().find(|t| !IndexValue::is_lane_type(**t)) {
                return Err(IrError::InvalidIndexArrayType(*bad));
            }
        }
        self.level_array_types = types;
        Ok(self)
    }

    pub fn order(&self) -> usize {
        self.mode_types.len()
    }

    pub fn mode_types(&self) -> &[ModeType] {
        &self.mode_types
    }

    pub fn mode_ordering(&self) -> &[usize] {
        &self.mode_ordering
    }

    /// Lane types of the index arrays stored at `level`
    pub fn level_array_types(&self, level: usize) -> &[DataType] {
        &self.level_array_types[level]
    }

    /// Check that this format can lay out a tensor of the given shape
    pub fn check_shape(&self, shape: &Shape) -> Result<()> {
        if self.order() != shape.order() {
            return Err(IrError::OrderMismatch {
                expected: self.order(),
                found: shape.order(),
            });
        }
        Ok(())
    }
}

fn is_permutation(ordering: &[usize], order: usize) -> bool {
    if ordering.len() != order {
        return false;
    }
    let mut seen = vec![false; order];
    for &mode in ordering {
        if mode >= order || seen[mode] {
            return false;
        }
        seen[mode] = true;
    }
    true
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;
        for (i, mt) in self.mode_types.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", mt)?;
        }
        write!(f, "; ")?;
        for (i, mode) in self.mode_ordering.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", mode)?;
        }
        write!(f, ")")
    }
}
