//! Axis-aligned sub-regions of a lattice.

use serde::{Deserialize, Serialize};
use crate::spatial::{cell_count, Dims, GridIndex};

/// Box of lattice cells `[offset, offset + dims)`.
///
/// Block optimizers address the field one region at a time instead of
/// recomputing whole-volume costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub offset: GridIndex,
    pub dims: Dims,
}

impl Region {
    pub fn new(offset: GridIndex, dims: Dims) -> Self {
        Self { offset, dims }
    }

    /// Region covering a whole lattice.
    pub fn whole(dims: Dims) -> Self {
        Self::new([0, 0, 0], dims)
    }

    /// Exclusive upper corner.
    pub fn end(&self) -> GridIndex {
        [
            self.offset[0] + self.dims[0],
            self.offset[1] + self.dims[1],
            self.offset[2] + self.dims[2],
        ]
    }

    /// Number of cells in the region.
    pub fn len(&self) -> usize {
        cell_count(self.dims)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `index` lies inside the region.
    pub fn contains(&self, index: GridIndex) -> bool {
        let end = self.end();
        (0..3).all(|i| index[i] >= self.offset[i] && index[i] < end[i])
    }

    /// Intersection with a lattice of size `bounds`.
    ///
    /// Returns `None` when nothing of the region lies inside the lattice.
    pub fn clip_to(&self, bounds: Dims) -> Option<Self> {
        let end = self.end();
        let mut dims = [0; 3];
        for i in 0..3 {
            let hi = end[i].min(bounds[i]);
            if hi <= self.offset[i] {
                return None;
            }
            dims[i] = hi - self.offset[i];
        }
        Some(Self::new(self.offset, dims))
    }

    /// Cells of the region in storage order (x fastest, then y, then z).
    pub fn indices(&self) -> impl Iterator<Item = GridIndex> + '_ {
        let [x0, y0, z0] = self.offset;
        let [x1, y1, z1] = self.end();
        (z0..z1).flat_map(move |z| (y0..y1).flat_map(move |y| (x0..x1).map(move |x| [x, y, z])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_extent() {
        let region = Region::new([1, 2, 3], [2, 2, 2]);
        assert_eq!(region.end(), [3, 4, 5]);
        assert_eq!(region.len(), 8);
        assert!(region.contains([1, 2, 3]));
        assert!(region.contains([2, 3, 4]));
        assert!(!region.contains([3, 3, 4]));
        assert!(!region.contains([0, 2, 3]));
    }

    #[test]
    fn test_clip_to_bounds() {
        let region = Region::new([2, 0, 0], [4, 2, 2]);
        assert_eq!(region.clip_to([4, 4, 4]), Some(Region::new([2, 0, 0], [2, 2, 2])));
        assert_eq!(region.clip_to([2, 4, 4]), None);
        assert_eq!(Region::new([0, 0, 0], [0, 1, 1]).clip_to([4, 4, 4]), None);
    }

    #[test]
    fn test_indices_x_fastest() {
        let region = Region::new([1, 0, 0], [2, 2, 1]);
        let cells: Vec<_> = region.indices().collect();
        assert_eq!(cells, vec![[1, 0, 0], [2, 0, 0], [1, 1, 0], [2, 1, 0]]);
    }
}
