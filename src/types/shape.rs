// Tensor Shapes
//
// A shape is an ordered list of dimensions, one per tensor mode. A
// dimension is either fixed to a positive size or left variable until the
// tensor is packed. An empty shape describes a scalar.

use std::fmt;
use std::slice;

/// Size of one tensor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension {
    // 0 marks a variable dimension
    size: usize,
}

impl Dimension {
    /// A dimension whose size is not yet known
    pub fn variable() -> Self {
        Self { size: 0 }
    }

    /// A dimension of fixed, positive size
    ///
    /// # Panics
    /// If `size` is zero.
    pub fn fixed(size: usize) -> Self {
        assert!(size > 0, "Fixed dimensions must have a positive size");
        Self { size }
    }

    pub fn is_variable(&self) -> bool {
        self.size == 0
    }

    pub fn is_fixed(&self) -> bool {
        self.size > 0
    }

    /// Size of a fixed dimension, 0 for a variable one
    pub fn size(&self) -> usize {
        self.size
    }
}

impl From<usize> for Dimension {
    fn from(size: usize) -> Self {
        Self::fixed(size)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_variable() {
            write!(f, "?")
        } else {
            write!(f, "{}", self.size)
        }
    }
}

/// Ordered dimensions of a tensor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape {
    dimensions: Vec<Dimension>,
}

impl Shape {
    pub fn new(dimensions: Vec<Dimension>) -> Self {
        Self { dimensions }
    }

    /// Shape of a 0-order tensor
    pub fn scalar() -> Self {
        Self::default()
    }

    /// Shape with every dimension fixed to the given sizes
    pub fn fixed(sizes: &[usize]) -> Self {
        Self::new(sizes.iter().map(|&n| Dimension::fixed(n)).collect())
    }

    /// Number of modes
    pub fn order(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Dimension of mode `i`
    ///
    /// # Panics
    /// If `i` is not below `order()`.
    pub fn dimension(&self, i: usize) -> Dimension {
        self.dimensions[i]
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn iter(&self) -> slice::Iter<'_, Dimension> {
        self.dimensions.iter()
    }

    /// Whether every dimension has a known size
    pub fn is_fixed(&self) -> bool {
        self.dimensions.iter().all(Dimension::is_fixed)
    }
}

impl<'a> IntoIterator for &'a Shape {
    type Item = &'a Dimension;
    type IntoIter = slice::Iter<'a, Dimension>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Dimension> for Shape {
    fn from_iter<I: IntoIterator<Item = Dimension>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, dim) in self.dimensions.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", dim)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_kinds() {
        let v = Dimension::variable();
        assert!(v.is_variable());
        assert!(!v.is_fixed());
        assert_eq!(v.size(), 0);

        let f = Dimension::fixed(5);
        assert!(f.is_fixed());
        assert!(!f.is_variable());
        assert_eq!(f.size(), 5);
    }

    #[test]
    #[should_panic(expected = "positive size")]
    fn test_zero_dimension_rejected() {
        Dimension::fixed(0);
    }

    #[test]
    fn test_shape_order() {
        let s = Shape::scalar();
        assert_eq!(s.order(), 0);
        assert!(s.is_scalar());

        let m = Shape::new(vec![Dimension::fixed(3), Dimension::variable()]);
        assert_eq!(m.order(), 2);
        assert_eq!(m.dimension(1), Dimension::variable());
        assert!(!m.is_fixed());
        assert_eq!(m.iter().filter(|d| d.is_fixed()).count(), 1);
    }

    #[test]
    fn test_shape_equality() {
        assert_eq!(Shape::fixed(&[3, 4]), Shape::fixed(&[3, 4]));
        assert_ne!(Shape::fixed(&[3, 4]), Shape::fixed(&[4, 3]));
        assert_ne!(Shape::fixed(&[3]), Shape::fixed(&[3, 1]));
    }

    #[test]
    fn test_display() {
        let s = Shape::new(vec![Dimension::fixed(3), Dimension::variable()]);
        assert_eq!(s.to_string(), "[3,?]");
        assert_eq!(Shape::scalar().to_string(), "[]");
    }
}
