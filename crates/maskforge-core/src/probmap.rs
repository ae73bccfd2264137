//! Probability plane
//!
//! Per-pixel model confidence in [0,1], produced by inference
//! post-processing. Read-only to consumers: the selection algorithms take
//! shared references and never mutate the plane.

use crate::error::{CoreError, CoreResult};

/// A width×height plane of probabilities in [0,1].
#[derive(Debug, Clone, PartialEq)]
pub struct ProbMap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl ProbMap {
    /// Wrap an existing buffer. Fails with `ShapeMismatch` when the buffer
    /// length does not equal width×height.
    pub fn from_vec(width: u32, height: u32, data: Vec<f32>) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimension { width, height });
        }
        if data.len() != width as usize * height as usize {
            return Err(CoreError::ShapeMismatch {
                expected: (width, height),
                actual_len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Constant-valued plane, mainly useful in tests.
    pub fn filled(width: u32, height: u32, value: f32) -> CoreResult<Self> {
        Self::from_vec(
            width,
            height,
            vec![value; width as usize * height as usize],
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Flat index for (x, y). No bounds check.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[self.index(x, y)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_shape_mismatch() {
        let result = ProbMap::from_vec(3, 3, vec![0.0; 8]);
        assert!(matches!(result, Err(CoreError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_filled_and_get() {
        let map = ProbMap::filled(4, 2, 0.5).unwrap();
        assert_eq!(map.len(), 8);
        assert_eq!(map.get(3, 1), 0.5);
    }
}
