// Storage Layer: Packing Coordinates into Storage
//
// TensorBuilder collects (coordinate, value) insertions in any order and
// packs them into a Storage for a given format:
// 1. Permute each coordinate from dimension order into level order
// 2. Sort lexicographically (stable, so earlier insertions stay first)
// 3. Drop or reject duplicate coordinates, per the PackDescriptor
// 4. Build the levels top-down: dense levels enumerate their full extent,
//    sparse levels record only the coordinates that are present
//
// Dense positions with no inserted value hold the zero of the component
// type. The coordinates of every sparse segment come out sorted.

use crate::core::error::{IrError, Result};
use crate::storage::array::IndexArray;
use crate::storage::format::{Format, ModeType};
use crate::storage::index::{Index, ModeIndex};
use crate::storage::tensor_storage::Storage;
use crate::types::{ComponentValue, Type};

/// What to do when the same coordinate is inserted more than once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep the first inserted value and log a warning
    KeepFirst,
    /// Fail packing with `IrError::DuplicateCoordinate`
    Error,
}

/// Options controlling how a TensorBuilder packs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackDescriptor {
    pub duplicates: DuplicatePolicy,
}

impl PackDescriptor {
    pub fn new() -> Self {
        Self {
            duplicates: DuplicatePolicy::KeepFirst,
        }
    }

    /// Descriptor that rejects duplicate coordinates
    pub fn with_duplicate_error() -> Self {
        Self {
            duplicates: DuplicatePolicy::Error,
        }
    }

    pub fn set_duplicates(&mut self, policy: DuplicatePolicy) -> &mut Self {
        self.duplicates = policy;
        self
    }
}

impl Default for PackDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects coordinates and values, then packs them into a Storage
#[derive(Debug, Clone)]
pub struct TensorBuilder {
    tensor_type: Type,
    format: Format,
    descriptor: PackDescriptor,
    coords: Vec<Vec<usize>>,
    values: Vec<ComponentValue>,
}

// A half-open range of sorted entries below one storage position
type Segment = (usize, usize);

impl TensorBuilder {
    /// # Panics
    /// If `format` and `tensor_type` disagree on the order.
    pub fn new(tensor_type: Type, format: Format) -> Self {
        Self::try_new(tensor_type, format).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_new(tensor_type: Type, format: Format) -> Result<Self> {
        format.check_shape(tensor_type.shape())?;
        Ok(Self {
            tensor_type,
            format,
            descriptor: PackDescriptor::new(),
            coords: Vec::new(),
            values: Vec::new(),
        })
    }

    pub fn with_descriptor(mut self, descriptor: PackDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    pub fn tensor_type(&self) -> &Type {
        &self.tensor_type
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    /// Number of insertions so far, duplicates included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Record a value at a coordinate given in dimension order
    pub fn insert(&mut self, coords: &[usize], value: impl Into<ComponentValue>) -> Result<()> {
        let value = value.into();
        let shape = self.tensor_type.shape();
        if coords.len() != shape.order() {
            return Err(IrError::OrderMismatch {
                expected: shape.order(),
                found: coords.len(),
            });
        }
        for (mode, (&c, dim)) in coords.iter().zip(shape.iter()).enumerate() {
            if dim.is_fixed() && c >= dim.size() {
                return Err(IrError::CoordinateOutOfBounds {
                    mode,
                    coordinate: c,
                    size: dim.size(),
                });
            }
        }
        if value.data_type() != self.tensor_type.data_type() {
            return Err(IrError::DomainMismatch {
                expected: self.tensor_type.data_type(),
                found: value.data_type(),
            });
        }
        self.coords.push(coords.to_vec());
        self.values.push(value);
        Ok(())
    }

    /// Pack the inserted entries into a complete Storage
    pub fn pack(&self) -> Result<Storage> {
        let shape = self.tensor_type.shape();
        if let Some(mode) = shape.iter().position(|d| d.is_variable()) {
            return Err(IrError::VariableDimension { mode });
        }
        let data_type = self.tensor_type.data_type();
        if data_type.is_undefined() {
            return Err(IrError::DomainMismatch {
                expected: data_type,
                found: data_type,
            });
        }

        let entries = self.sorted_entries()?;
        let ordering = self.format.mode_ordering();

        let mut mode_indices = Vec::with_capacity(self.format.order());
        let mut segments: Vec<Segment> = vec![(0, entries.len())];
        for (level, mode_type) in self.format.mode_types().iter().enumerate() {
            let size = shape.dimension(ordering[level]).size();
            let lane_types = self.format.level_array_types(level);
            let (mode_index, next) = match mode_type {
                ModeType::Dense => {
                    let mut sizes = IndexArray::try_new(lane_types[0])?;
                    sizes.try_push(size as i128)?;
                    let next = dense_segments(&entries, &segments, level, size);
                    (ModeIndex::try_new(ModeType::Dense, vec![sizes])?, next)
                }
                ModeType::Sparse => {
                    let mut pos = IndexArray::try_new(lane_types[0])?;
                    let mut crd = IndexArray::try_new(lane_types[1])?;
                    let next = sparse_segments(&entries, &segments, level, &mut pos, &mut crd)?;
                    (ModeIndex::try_new(ModeType::Sparse, vec![pos, crd])?, next)
                }
            };
            mode_indices.push(mode_index);
            segments = next;
        }

        let zero = ComponentValue::zero(data_type);
        let values: Vec<ComponentValue> = segments
            .iter()
            .map(|&(lo, hi)| if lo < hi { entries[lo].1 } else { zero })
            .collect();

        let index = Index::try_new(self.format.clone(), mode_indices)?;
        log::debug!(
            "Packed {} entries into {} positions with format {}",
            entries.len(),
            values.len(),
            self.format
        );
        Storage::try_new(
            data_type,
            self.format.clone(),
            index,
            values,
        )
    }

    // Entries with level-ordered coordinates, sorted and deduplicated
    fn sorted_entries(&self) -> Result<Vec<(Vec<usize>, ComponentValue)>> {
        let ordering = self.format.mode_ordering();
        let mut entries: Vec<(Vec<usize>, ComponentValue)> = self
            .coords
            .iter()
            .zip(&self.values)
            .map(|(coord, &value)| (ordering.iter().map(|&d| coord[d]).collect(), value))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut unique: Vec<(Vec<usize>, ComponentValue)> = Vec::with_capacity(entries.len());
        for entry in entries {
            if unique.last().map_or(false, |last| last.0 == entry.0) {
                let mut coord = vec![0; ordering.len()];
                for (level, &dim) in ordering.iter().enumerate() {
                    coord[dim] = entry.0[level];
                }
                match self.descriptor.duplicates {
                    DuplicatePolicy::KeepFirst => {
                        log::warn!("Ignoring duplicate value at coordinate {:?}", coord);
                        continue;
                    }
                    DuplicatePolicy::Error => return Err(IrError::DuplicateCoordinate(coord)),
                }
            }
            unique.push(entry);
        }
        Ok(unique)
    }
}

// Split each parent segment into one child segment per coordinate in 0..size
fn dense_segments(
    entries: &[(Vec<usize>, ComponentValue)],
    segments: &[Segment],
    level: usize,
    size: usize,
) -> Vec<Segment> {
    let mut next = Vec::with_capacity(segments.len() * size);
    for &(lo, hi) in segments {
        let mut start = lo;
        for c in 0..size {
            let end = start + entries[start..hi].iter().take_while(|e| e.0[level] == c).count();
            next.push((start, end));
            start = end;
        }
    }
    next
}

// One child segment per distinct coordinate, recorded in pos/crd
fn sparse_segments(
    entries: &[(Vec<usize>, ComponentValue)],
    segments: &[Segment],
    level: usize,
    pos: &mut IndexArray,
    crd: &mut IndexArray,
) -> Result<Vec<Segment>> {
    let mut next = Vec::new();
    pos.try_push(0)?;
    for &(lo, hi) in segments {
        let mut start = lo;
        while start < hi {
            let c = entries[start].0[level];
            let end = start + entries[start..hi].iter().take_while(|e| e.0[level] == c).count();
            crd.try_push(c as i128)?;
            next.push((start, end));
            start = end;
        }
        pos.try_push(next.len() as i128)?;
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Dimension, Shape};

    fn matrix_type(rows: usize, cols: usize) -> Type {
        Type::new(DataType::FLOAT64, Shape::fixed(&[rows, cols]))
    }

    #[test]
    fn test_pack_csr() {
        let mut builder = TensorBuilder::new(matrix_type(2, 3), Format::csr());
        builder.insert(&[1, 2], 3.0f64).unwrap();
        builder.insert(&[0, 2], 2.0f64).unwrap();
        builder.insert(&[0, 0], 1.0f64).unwrap();
        let storage = builder.pack().unwrap();

        let level = storage.index().mode_index(1);
        assert_eq!(level.pos().unwrap().to_vec(), vec![0, 2, 3]);
        assert_eq!(level.crd().unwrap().to_vec(), vec![0, 2, 2]);
        assert_eq!(storage.index().mode_index(0).dense_size(), Some(2));
        assert_eq!(
            storage.values(),
            &[
                ComponentValue::from(1.0f64),
                ComponentValue::from(2.0f64),
                ComponentValue::from(3.0f64)
            ]
        );
    }

    #[test]
    fn test_pack_dense_fills_zeros() {
        let mut builder = TensorBuilder::new(
            Type::new(DataType::INT32, Shape::fixed(&[3])),
            Format::dense(1),
        );
        builder.insert(&[1], 5i32).unwrap();
        let storage = builder.pack().unwrap();
        assert_eq!(
            storage.values(),
            &[
                ComponentValue::from(0i32),
                ComponentValue::from(5i32),
                ComponentValue::from(0i32)
            ]
        );
    }

    #[test]
    fn test_pack_csc_orders_by_column() {
        let mut builder = TensorBuilder::new(matrix_type(2, 2), Format::csc());
        builder.insert(&[1, 0], 2.0f64).unwrap();
        builder.insert(&[0, 0], 1.0f64).unwrap();
        builder.insert(&[1, 1], 3.0f64).unwrap();
        let storage = builder.pack().unwrap();

        let level = storage.index().mode_index(1);
        assert_eq!(level.pos().unwrap().to_vec(), vec![0, 2, 3]);
        assert_eq!(level.crd().unwrap().to_vec(), vec![0, 1, 1]);
    }

    #[test]
    fn test_pack_scalar() {
        let mut builder = TensorBuilder::new(Type::scalar(DataType::FLOAT32), Format::dense(0));
        let empty = builder.pack().unwrap();
        assert_eq!(empty.values(), &[ComponentValue::from(0.0f32)]);

        builder.insert(&[], 2.5f32).unwrap();
        assert_eq!(builder.pack().unwrap().values(), &[ComponentValue::from(2.5f32)]);
    }

    #[test]
    fn test_duplicates_keep_first() {
        let mut builder = TensorBuilder::new(matrix_type(2, 2), Format::dcsr());
        builder.insert(&[0, 1], 1.0f64).unwrap();
        builder.insert(&[0, 1], 9.0f64).unwrap();
        let storage = builder.pack().unwrap();
        assert_eq!(storage.values(), &[ComponentValue::from(1.0f64)]);
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut builder = TensorBuilder::new(matrix_type(2, 2), Format::csc())
            .with_descriptor(PackDescriptor::with_duplicate_error());
        builder.insert(&[1, 0], 1.0f64).unwrap();
        builder.insert(&[1, 0], 2.0f64).unwrap();
        assert_eq!(
            builder.pack().unwrap_err(),
            IrError::DuplicateCoordinate(vec![1, 0])
        );
    }

    #[test]
    fn test_insert_validation() {
        let mut builder = TensorBuilder::new(matrix_type(2, 2), Format::csr());
        assert!(matches!(
            builder.insert(&[0], 1.0f64),
            Err(IrError::OrderMismatch { .. })
        ));
        assert_eq!(
            builder.insert(&[0, 2], 1.0f64),
            Err(IrError::CoordinateOutOfBounds {
                mode: 1,
                coordinate: 2,
                size: 2
            })
        );
        assert!(matches!(
            builder.insert(&[0, 0], 1i64),
            Err(IrError::DomainMismatch { .. })
        ));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_variable_dimension_rejected_at_pack() {
        let t = Type::new(
            DataType::FLOAT64,
            Shape::new(vec![Dimension::fixed(2), Dimension::variable()]),
        );
        let mut builder = TensorBuilder::new(t, Format::csr());
        builder.insert(&[0, 40], 1.0f64).unwrap();
        assert_eq!(
            builder.pack().unwrap_err(),
            IrError::VariableDimension { mode: 1 }
        );
    }

    #[test]
    fn test_lane_overflow_reported() {
        let format = Format::sparse(1)
            .with_level_array_types(vec![vec![DataType::INT32, DataType::UINT8]])
            .unwrap();
        let mut builder = TensorBuilder::new(
            Type::new(DataType::FLOAT64, Shape::fixed(&[1000])),
            format,
        );
        builder.insert(&[300], 1.0f64).unwrap();
        assert!(matches!(
            builder.pack(),
            Err(IrError::ValueOutOfRange { value: 300, .. })
        ));
    }

    #[test]
    fn test_descriptor_setters() {
        let mut desc = PackDescriptor::new();
        assert_eq!(desc.duplicates, DuplicatePolicy::KeepFirst);
        desc.set_duplicates(DuplicatePolicy::Error);
        assert_eq!(desc, PackDescriptor::with_duplicate_error());
    }
}
