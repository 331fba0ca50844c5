// Storage Layer: Mode Indices and Tensor Indices
//
// A ModeIndex holds the physical index arrays of one level. Dense levels
// store their size in a single 1-element array. Sparse levels store a
// position array and a coordinate array: the children of parent position
// p are crd[pos[p]..pos[p+1]].
//
// An Index stacks one ModeIndex per level and knows how many entries the
// levels describe in total.

use crate::core::error::{IrError, Result};
use crate::storage::array::IndexArray;
use crate::storage::format::{Format, ModeType};
use crate::types::DataType;

/// Physical index arrays of a single level
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModeIndex {
    mode_type: ModeType,
    arrays: Vec<IndexArray>,
}

impl ModeIndex {
    /// # Panics
    /// If `arrays.len()` differs from `mode_type.num_index_arrays()`.
    pub fn new(mode_type: ModeType, arrays: Vec<IndexArray>) -> Self {
        Self::try_new(mode_type, arrays).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_new(mode_type: ModeType, arrays: Vec<IndexArray>) -> Result<Self> {
        if arrays.len() != mode_type.num_index_arrays() {
            return Err(IrError::IndexArrayCount {
                mode_type,
                expected: mode_type.num_index_arrays(),
                found: arrays.len(),
            });
        }
        Ok(Self { mode_type, arrays })
    }

    /// Dense level of the given size, stored in an int32 lane
    pub fn dense(size: usize) -> Self {
        Self::dense_with_type(DataType::INT32, size)
    }

    /// # Panics
    /// If `size` does not fit `data_type`.
    pub fn dense_with_type(data_type: DataType, size: usize) -> Self {
        let mut array = IndexArray::new(data_type);
        array.push(size as i128);
        Self::new(ModeType::Dense, vec![array])
    }

    /// Sparse level from its position and coordinate arrays
    pub fn sparse(pos: IndexArray, crd: IndexArray) -> Self {
        Self::new(ModeType::Sparse, vec![pos, crd])
    }

    pub fn mode_type(&self) -> ModeType {
        self.mode_type
    }

    pub fn num_index_arrays(&self) -> usize {
        self.arrays.len()
    }

    /// # Panics
    /// If `i` is not below `num_index_arrays()`.
    pub fn index_array(&self, i: usize) -> &IndexArray {
        &self.arrays[i]
    }

    /// Size recorded by a dense level
    pub fn dense_size(&self) -> Option<usize> {
        match self.mode_type {
            ModeType::Dense if self.arrays[0].len() == 1 => to_usize(self.arrays[0].get(0)),
            _ => None,
        }
    }

    /// Position array of a sparse level
    pub fn pos(&self) -> Option<&IndexArray> {
        match self.mode_type {
            ModeType::Sparse => Some(&self.arrays[0]),
            ModeType::Dense => None,
        }
    }

    /// Coordinate array of a sparse level
    pub fn crd(&self) -> Option<&IndexArray> {
        match self.mode_type {
            ModeType::Sparse => Some(&self.arrays[1]),
            ModeType::Dense => None,
        }
    }
}

fn to_usize(value: i128) -> Option<usize> {
    usize::try_from(value).ok()
}

/// Index arrays of every level of a tensor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Index {
    format: Format,
    mode_indices: Vec<ModeIndex>,
    size: usize,
}

impl Index {
    /// # Panics
    /// If the mode indices do not realize `format`.
    pub fn new(format: Format, mode_indices: Vec<ModeIndex>) -> Self {
        Self::try_new(format, mode_indices).unwrap_or_else(|err| panic!("{}", err))
    }

    /// Build an index, checking it level by level against `format`
    pub fn try_new(format: Format, mode_indices: Vec<ModeIndex>) -> Result<Self> {
        if mode_indices.len() != format.order() {
            return Err(IrError::OrderMismatch {
                expected: format.order(),
                found: mode_indices.len(),
            });
        }

        let mut size = 1usize;
        for (level, (mode_type, mode_index)) in
            format.mode_types().iter().zip(&mode_indices).enumerate()
        {
            if mode_index.mode_type() != *mode_type {
                return Err(IrError::IndexArrayCount {
                    mode_type: *mode_type,
                    expected: mode_type.num_index_arrays(),
                    found: mode_index.num_index_arrays(),
                });
            }
            size = match mode_type {
                ModeType::Dense => {
                    let n = mode_index.dense_size().ok_or(IrError::DenseSizeArray {
                        mode: level,
                        len: mode_index.index_array(0).len(),
                    })?;
                    size
                        .checked_mul(n)
                        .ok_or(IrError::IndexSizeOverflow { mode: level })?
                }
                ModeType::Sparse => check_sparse_level(level, mode_index, size)?,
            };
        }

        Ok(Self {
            format,
            mode_indices,
            size,
        })
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn order(&self) -> usize {
        self.mode_indices.len()
    }

    pub fn mode_index(&self, level: usize) -> &ModeIndex {
        &self.mode_indices[level]
    }

    pub fn mode_indices(&self) -> &[ModeIndex] {
        &self.mode_indices
    }

    /// Number of entries stored by the index
    pub fn size(&self) -> usize {
        self.size
    }
}

// Returns the number of positions the sparse level provides to its children
fn check_sparse_level(level: usize, mode_index: &ModeIndex, parent_size: usize) -> Result<usize> {
    let (pos, crd) = match (mode_index.pos(), mode_index.crd()) {
        (Some(pos), Some(crd)) => (pos, crd),
        _ => {
            return Err(IrError::IndexArrayCount {
                mode_type: ModeType::Sparse,
                expected: 2,
                found: mode_index.num_index_arrays(),
            })
        }
    };
    let expected = parent_size
        .checked_add(1)
        .ok_or(IrError::IndexSizeOverflow { mode: level })?;
    if pos.len() != expected {
        return Err(IrError::PositionArrayLength {
            mode: level,
            expected,
            found: pos.len(),
        });
    }
    if pos.get(0) != 0 {
        return Err(IrError::InvalidPositionArray {
            mode: level,
            position: 0,
        });
    }
    for k in 1..pos.len() {
        if pos.get(k) < pos.get(k - 1) {
            return Err(IrError::InvalidPositionArray {
                mode: level,
                position: k,
            });
        }
    }
    let last = pos.last().unwrap_or(0);
    let nnz = to_usize(last).ok_or(IrError::IndexSizeOverflow { mode: level })?;
    if crd.len() != nnz {
        return Err(IrError::CoordinateArrayLength {
            mode: level,
            expected: nnz,
            found: crd.len(),
        });
    }
    if let Some(coordinate) = crd.iter().find(|&c| c < 0) {
        return Err(IrError::NegativeCoordinate {
            mode: level,
            coordinate,
        });
    }
    Ok(nnz)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int32(values: &[i32]) -> IndexArray {
        IndexArray::from_values(DataType::INT32, values.iter().copied())
    }

    #[test]
    fn test_mode_index_counts() {
        assert_eq!(ModeIndex::dense(4).num_index_arrays(), 1);
        assert_eq!(ModeIndex::dense(4).dense_size(), Some(4));

        let sparse = ModeIndex::sparse(int32(&[0, 1]), int32(&[3]));
        assert_eq!(sparse.num_index_arrays(), 2);
        assert_eq!(sparse.crd().map(|c| c.get(0)), Some(3));

        assert_eq!(
            ModeIndex::try_new(ModeType::Sparse, vec![int32(&[0])]),
            Err(IrError::IndexArrayCount {
                mode_type: ModeType::Sparse,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    #[should_panic(expected = "index arrays")]
    fn test_mode_index_count_panics() {
        ModeIndex::new(ModeType::Dense, vec![]);
    }

    #[test]
    fn test_csr_index_size() {
        // [[1, 0, 2], [0, 0, 3]]
        let index = Index::new(
            Format::csr(),
            vec![
                ModeIndex::dense(2),
                ModeIndex::sparse(int32(&[0, 2, 3]), int32(&[0, 2, 2])),
            ],
        );
        assert_eq!(index.size(), 3);
        assert_eq!(index.order(), 2);
    }

    #[test]
    fn test_dense_index_size() {
        let index = Index::new(
            Format::dense(2),
            vec![ModeIndex::dense(3), ModeIndex::dense(4)],
        );
        assert_eq!(index.size(), 12);
    }

    #[test]
    fn test_scalar_index_size() {
        assert_eq!(Index::new(Format::dense(0), vec![]).size(), 1);
    }

    #[test]
    fn test_sparse_length_invariants() {
        let bad_pos = Index::try_new(
            Format::csr(),
            vec![
                ModeIndex::dense(2),
                ModeIndex::sparse(int32(&[0, 3]), int32(&[0, 1, 2])),
            ],
        );
        assert_eq!(
            bad_pos,
            Err(IrError::PositionArrayLength {
                mode: 1,
                expected: 3,
                found: 2
            })
        );

        let bad_crd = Index::try_new(
            Format::dcsr(),
            vec![
                ModeIndex::sparse(int32(&[0, 1]), int32(&[1])),
                ModeIndex::sparse(int32(&[0, 2]), int32(&[0])),
            ],
        );
        assert_eq!(
            bad_crd,
            Err(IrError::CoordinateArrayLength {
                mode: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_malformed_position_arrays() {
        let negative = Index::try_new(
            Format::sparse(1),
            vec![ModeIndex::sparse(int32(&[0, -1]), int32(&[]))],
        );
        assert_eq!(
            negative,
            Err(IrError::InvalidPositionArray {
                mode: 0,
                position: 1
            })
        );

        let decreasing = Index::try_new(
            Format::csr(),
            vec![
                ModeIndex::dense(3),
                ModeIndex::sparse(int32(&[0, 2, 1, 2]), int32(&[0, 1])),
            ],
        );
        assert_eq!(
            decreasing,
            Err(IrError::InvalidPositionArray {
                mode: 1,
                position: 2
            })
        );

        let offset = Index::try_new(
            Format::sparse(1),
            vec![ModeIndex::sparse(int32(&[1, 2]), int32(&[0, 1]))],
        );
        assert_eq!(
            offset,
            Err(IrError::InvalidPositionArray {
                mode: 0,
                position: 0
            })
        );
    }

    #[test]
    fn test_negative_coordinate() {
        let result = Index::try_new(
            Format::sparse(1),
            vec![ModeIndex::sparse(int32(&[0, 2]), int32(&[0, -3]))],
        );
        assert_eq!(
            result,
            Err(IrError::NegativeCoordinate {
                mode: 0,
                coordinate: -3
            })
        );
    }

    #[test]
    fn test_size_overflow() {
        let max = i32::MAX as usize;
        let result = Index::try_new(
            Format::dense(3),
            vec![
                ModeIndex::dense(max),
                ModeIndex::dense(max),
                ModeIndex::dense(max),
            ],
        );
        assert!(matches!(result, Err(IrError::IndexSizeOverflow { .. })));
    }

    #[test]
    fn test_mode_type_mismatch() {
        let result = Index::try_new(
            Format::csr(),
            vec![ModeIndex::dense(2), ModeIndex::dense(3)],
        );
        assert!(matches!(result, Err(IrError::IndexArrayCount { .. })));

        let result = Index::try_new(Format::csr(), vec![ModeIndex::dense(2)]);
        assert!(matches!(result, Err(IrError::OrderMismatch { .. })));
    }
}
