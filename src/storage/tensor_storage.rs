// Storage Layer: Tensor Storage
//
// A Storage bundles a format, an index realizing it and the flat value
// array. Values are laid out in the order the index enumerates positions,
// so the value of a leaf position p is `values[p]`.

use crate::core::error::{IrError, Result};
use crate::storage::format::{Format, ModeType};
use crate::storage::index::Index;
use crate::types::{ComponentValue, DataType};

/// Physical storage of a tensor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    data_type: DataType,
    format: Format,
    index: Index,
    values: Vec<ComponentValue>,
}

impl Storage {
    /// # Panics
    /// If the index, format and values are inconsistent.
    pub fn new(
        data_type: DataType,
        format: Format,
        index: Index,
        values: Vec<ComponentValue>,
    ) -> Self {
        Self::try_new(data_type, format, index, values).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_new(
        data_type: DataType,
        format: Format,
        index: Index,
        values: Vec<ComponentValue>,
    ) -> Result<Self> {
        if index.format() != &format {
            return Err(IrError::FormatMismatch);
        }
        if values.len() != index.size() {
            return Err(IrError::ValueCountMismatch {
                expected: index.size(),
                found: values.len(),
            });
        }
        if let Some(value) = values.iter().find(|v| v.data_type() != data_type) {
            return Err(IrError::DomainMismatch {
                expected: data_type,
                found: value.data_type(),
            });
        }
        Ok(Self {
            data_type,
            format,
            index,
            values,
        })
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn values(&self) -> &[ComponentValue] {
        &self.values
    }

    /// Every stored position as (coordinates in dimension order, value)
    ///
    /// Entries come out in storage order. Dense levels yield every
    /// coordinate, including explicitly stored zeros.
    pub fn entries(&self) -> Vec<(Vec<usize>, ComponentValue)> {
        let order = self.format.order();
        let mut entries = Vec::with_capacity(self.values.len());
        let mut coords = vec![0usize; order];
        self.collect_entries(0, 0, &mut coords, &mut entries);
        entries
    }

    /// Nonzero entries sorted by coordinate
    pub fn nonzeros(&self) -> Vec<(Vec<usize>, ComponentValue)> {
        let mut entries: Vec<_> = self
            .entries()
            .into_iter()
            .filter(|(_, value)| !value.is_zero())
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Whether both storages hold the same tensor, whatever their formats
    pub fn equals(&self, other: &Storage) -> bool {
        self.data_type == other.data_type
            && self.format.order() == other.format.order()
            && self.nonzeros() == other.nonzeros()
    }

    fn collect_entries(
        &self,
        level: usize,
        position: usize,
        coords: &mut Vec<usize>,
        out: &mut Vec<(Vec<usize>, ComponentValue)>,
    ) {
        if level == self.format.order() {
            out.push((coords.clone(), self.values[position]));
            return;
        }
        let dimension = self.format.mode_ordering()[level];
        let mode_index = self.index.mode_index(level);
        match self.format.mode_types()[level] {
            ModeType::Dense => {
                let size = mode_index.dense_size().unwrap_or(0);
                for c in 0..size {
                    coords[dimension] = c;
                    self.collect_entries(level + 1, position * size + c, coords, out);
                }
            }
            ModeType::Sparse => {
                let (pos, crd) = match (mode_index.pos(), mode_index.crd()) {
                    (Some(pos), Some(crd)) => (pos, crd),
                    _ => return,
                };
                let begin = pos.get(position) as usize;
                let end = pos.get(position + 1) as usize;
                for k in begin..end {
                    coords[dimension] = crd.get(k) as usize;
                    self.collect_entries(level + 1, k, coords, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::array::IndexArray;
    use crate::storage::index::ModeIndex;

    fn int32(values: &[i32]) -> IndexArray {
        IndexArray::from_values(DataType::INT32, values.iter().copied())
    }

    fn doubles(values: &[f64]) -> Vec<ComponentValue> {
        values.iter().map(|&v| ComponentValue::from(v)).collect()
    }

    fn csr_example() -> Storage {
        // [[1, 0, 2], [0, 0, 3]]
        let index = Index::new(
            Format::csr(),
            vec![
                ModeIndex::dense(2),
                ModeIndex::sparse(int32(&[0, 2, 3]), int32(&[0, 2, 2])),
            ],
        );
        Storage::new(
            DataType::FLOAT64,
            Format::csr(),
            index,
            doubles(&[1.0, 2.0, 3.0]),
        )
    }

    #[test]
    fn test_value_count() {
        let index = Index::new(Format::dense(1), vec![ModeIndex::dense(3)]);
        let result = Storage::try_new(
            DataType::FLOAT64,
            Format::dense(1),
            index,
            doubles(&[1.0, 2.0]),
        );
        assert_eq!(
            result,
            Err(IrError::ValueCountMismatch {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn test_value_type_checked() {
        let index = Index::new(Format::dense(1), vec![ModeIndex::dense(1)]);
        let result = Storage::try_new(
            DataType::FLOAT64,
            Format::dense(1),
            index,
            vec![ComponentValue::from(1i32)],
        );
        assert!(matches!(result, Err(IrError::DomainMismatch { .. })));
    }

    #[test]
    fn test_format_mismatch() {
        let index = Index::new(Format::dense(1), vec![ModeIndex::dense(1)]);
        let result = Storage::try_new(
            DataType::FLOAT64,
            Format::sparse(1),
            index,
            doubles(&[1.0]),
        );
        assert_eq!(result, Err(IrError::FormatMismatch));
    }

    #[test]
    fn test_csr_entries() {
        let storage = csr_example();
        let entries = storage.entries();
        assert_eq!(
            entries,
            vec![
                (vec![0, 0], ComponentValue::from(1.0f64)),
                (vec![0, 2], ComponentValue::from(2.0f64)),
                (vec![1, 2], ComponentValue::from(3.0f64)),
            ]
        );
    }

    #[test]
    fn test_csc_entries_in_dimension_order() {
        // Column-major storage of [[1, 0], [2, 3]]
        let format = Format::csc();
        let index = Index::new(
            format.clone(),
            vec![
                ModeIndex::dense(2),
                ModeIndex::sparse(int32(&[0, 2, 3]), int32(&[0, 1, 1])),
            ],
        );
        let storage = Storage::new(DataType::FLOAT64, format, index, doubles(&[1.0, 2.0, 3.0]));
        let coords: Vec<Vec<usize>> = storage.entries().into_iter().map(|(c, _)| c).collect();
        assert_eq!(coords, vec![vec![0, 0], vec![1, 0], vec![1, 1]]);
    }

    #[test]
    fn test_equals_across_formats() {
        // [[1, 0], [2, 3]] as CSR and column-major CSC
        let csr = Storage::new(
            DataType::FLOAT64,
            Format::csr(),
            Index::new(
                Format::csr(),
                vec![
                    ModeIndex::dense(2),
                    ModeIndex::sparse(int32(&[0, 1, 3]), int32(&[0, 0, 1])),
                ],
            ),
            doubles(&[1.0, 2.0, 3.0]),
        );
        let csc = Storage::new(
            DataType::FLOAT64,
            Format::csc(),
            Index::new(
                Format::csc(),
                vec![
                    ModeIndex::dense(2),
                    ModeIndex::sparse(int32(&[0, 2, 3]), int32(&[0, 1, 1])),
                ],
            ),
            doubles(&[1.0, 2.0, 3.0]),
        );
        assert!(csr.equals(&csc));
        assert_eq!(csr.nonzeros(), csc.nonzeros());
        assert_ne!(csr, csc);

        // Explicit zeros of a dense layout do not count
        let dense = Storage::new(
            DataType::FLOAT64,
            Format::dense(2),
            Index::new(Format::dense(2), vec![ModeIndex::dense(2), ModeIndex::dense(2)]),
            doubles(&[1.0, 0.0, 2.0, 3.0]),
        );
        assert!(dense.equals(&csr));
        assert!(!dense.equals(&csr_example()));
    }

    #[test]
    fn test_scalar_entries() {
        let index = Index::new(Format::dense(0), vec![]);
        let storage = Storage::new(DataType::INT64, Format::dense(0), index, vec![7i64.into()]);
        assert_eq!(storage.entries(), vec![(vec![], ComponentValue::from(7i64))]);
    }
}
