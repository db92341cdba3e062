//! Mesh entity types shared by the triangulation and the DoF layer

use serde::{Deserialize, Serialize};

/// Boundary indicator attached to boundary faces
pub type BoundaryId = u32;

/// A point in 2D or 3D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    /// Create a 2D point (z = 0)
    pub fn new_2d(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Create a 3D point
    pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Coordinate along `axis` (0, 1 or 2)
    pub fn coord(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Squared distance from the origin
    pub fn norm_sqr(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Arithmetic mean of a set of points
    pub fn average(points: &[Point]) -> Point {
        let n = points.len().max(1) as f64;
        let (x, y, z) = points
            .iter()
            .fold((0.0, 0.0, 0.0), |(x, y, z), p| (x + p.x, y + p.y, z + p.z));
        Point::new_3d(x / n, y / n, z / n)
    }
}

impl From<(f64, f64)> for Point {
    fn from(p: (f64, f64)) -> Self {
        Point::new_2d(p.0, p.1)
    }
}

impl From<(f64, f64, f64)> for Point {
    fn from(p: (f64, f64, f64)) -> Self {
        Point::new_3d(p.0, p.1, p.2)
    }
}

/// A quadrilateral or hexahedral cell of the refinement tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Global vertex indices in lexicographic reference order
    pub vertices: Vec<usize>,
    /// Refinement level (0 = coarse mesh)
    pub level: usize,
    /// Parent cell, `None` on level 0
    pub parent: Option<usize>,
    /// Children in reference child order, `None` for active cells
    pub children: Option<Vec<usize>>,
    /// Boundary id per face; `None` for interior faces
    pub boundary_ids: Vec<Option<BoundaryId>>,
}

impl Cell {
    /// An active cell has not been refined
    pub fn is_active(&self) -> bool {
        self.children.is_none()
    }

    /// Whether `face` lies on the domain boundary
    pub fn at_boundary(&self, face: usize) -> bool {
        self.boundary_ids[face].is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_operations() {
        let p1 = Point::new_2d(0.0, 0.0);
        let p2 = Point::new_2d(3.0, 4.0);

        assert_relative_eq!(p1.distance(&p2), 5.0);
        assert_relative_eq!(p2.norm_sqr(), 25.0);
        assert_relative_eq!(p2.coord(1), 4.0);

        let avg = Point::average(&[p1, p2, Point::new_2d(0.0, 2.0)]);
        assert_relative_eq!(avg.x, 1.0);
        assert_relative_eq!(avg.y, 2.0);
    }

    #[test]
    fn test_cell_flags() {
        let cell = Cell {
            vertices: vec![0, 1, 2, 3],
            level: 0,
            parent: None,
            children: None,
            boundary_ids: vec![Some(0), None, None, Some(2)],
        };
        assert!(cell.is_active());
        assert!(cell.at_boundary(0));
        assert!(!cell.at_boundary(1));
    }
}
