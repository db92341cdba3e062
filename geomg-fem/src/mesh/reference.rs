//! Reference cell tables for quadrilaterals and hexahedra
//!
//! Vertices are numbered lexicographically: bit `a` of a vertex index is its
//! coordinate along axis `a` on the unit cell. Face `f` is the face normal to
//! axis `f / 2` on side `f % 2`. Children of an isotropic refinement use the
//! same bit convention, so child `c` occupies the half-cell selected by the
//! bits of `c`.

use crate::error::MeshError;

/// Dimension-indexed topology table
#[derive(Debug, PartialEq, Eq)]
pub struct ReferenceCell {
    pub dim: usize,
    pub vertices_per_cell: usize,
    pub faces_per_cell: usize,
    pub children_per_cell: usize,
    face_vertices: &'static [&'static [usize]],
    lines: &'static [[usize; 2]],
}

pub static QUADRILATERAL: ReferenceCell = ReferenceCell {
    dim: 2,
    vertices_per_cell: 4,
    faces_per_cell: 4,
    children_per_cell: 4,
    face_vertices: &[&[0, 2], &[1, 3], &[0, 1], &[2, 3]],
    lines: &[[0, 2], [1, 3], [0, 1], [2, 3]],
};

pub static HEXAHEDRON: ReferenceCell = ReferenceCell {
    dim: 3,
    vertices_per_cell: 8,
    faces_per_cell: 6,
    children_per_cell: 8,
    face_vertices: &[
        &[0, 2, 4, 6],
        &[1, 3, 5, 7],
        &[0, 1, 4, 5],
        &[2, 3, 6, 7],
        &[0, 1, 2, 3],
        &[4, 5, 6, 7],
    ],
    lines: &[
        [0, 1],
        [2, 3],
        [4, 5],
        [6, 7],
        [0, 2],
        [1, 3],
        [4, 6],
        [5, 7],
        [0, 4],
        [1, 5],
        [2, 6],
        [3, 7],
    ],
};

impl ReferenceCell {
    /// Table for the given spatial dimension
    pub fn for_dimension(dim: usize) -> Result<&'static ReferenceCell, MeshError> {
        match dim {
            2 => Ok(&QUADRILATERAL),
            3 => Ok(&HEXAHEDRON),
            _ => Err(MeshError::UnsupportedDimension(dim)),
        }
    }

    /// Reference coordinate bit of `vertex` along `axis`
    #[inline]
    pub fn vertex_bit(vertex: usize, axis: usize) -> usize {
        (vertex >> axis) & 1
    }

    /// Local vertices of `face`
    pub fn face_vertices(&self, face: usize) -> &'static [usize] {
        self.face_vertices[face]
    }

    /// Axis normal to `face`
    pub fn face_axis(face: usize) -> usize {
        face / 2
    }

    /// 0 for the lower face along the axis, 1 for the upper one
    pub fn face_side(face: usize) -> usize {
        face % 2
    }

    pub fn lines(&self) -> &'static [[usize; 2]] {
        self.lines
    }

    /// Sub-entities whose refinement creates a midpoint vertex shared with a
    /// neighbour: lines, plus faces in 3D
    pub fn hanging_entities(&self) -> Vec<&'static [usize]> {
        let mut entities: Vec<&'static [usize]> =
            self.lines.iter().map(|line| line.as_slice()).collect();
        if self.dim == 3 {
            entities.extend(self.face_vertices.iter().copied());
        }
        entities
    }

    /// Reference coordinates of a vertex on the unit cell
    pub fn vertex_coordinates(&self, vertex: usize) -> [f64; 3] {
        let mut xi = [0.0; 3];
        for (axis, value) in xi.iter_mut().enumerate().take(self.dim) {
            *value = Self::vertex_bit(vertex, axis) as f64;
        }
        xi
    }

    /// Parent vertices whose average is vertex `vertex` of child `child`
    ///
    /// On each axis the child vertex sits at half-grid position
    /// `bit(child) + bit(vertex)` in {0, 1, 2}; position 1 is shared by both
    /// parent vertices along that axis.
    pub fn child_vertex_support(&self, child: usize, vertex: usize) -> Vec<usize> {
        (0..self.vertices_per_cell)
            .filter(|&parent_vertex| {
                (0..self.dim).all(|axis| {
                    let position =
                        Self::vertex_bit(child, axis) + Self::vertex_bit(vertex, axis);
                    match position {
                        0 => Self::vertex_bit(parent_vertex, axis) == 0,
                        2 => Self::vertex_bit(parent_vertex, axis) == 1,
                        _ => true,
                    }
                })
            })
            .collect()
    }

    /// Whether face `face` of child `child` lies on the same face of the parent
    pub fn child_face_on_parent_face(child: usize, face: usize) -> bool {
        Self::vertex_bit(child, Self::face_axis(face)) == Self::face_side(face)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_vertices_match_bit_convention() {
        for reference in [&QUADRILATERAL, &HEXAHEDRON] {
            for face in 0..reference.faces_per_cell {
                let axis = ReferenceCell::face_axis(face);
                let side = ReferenceCell::face_side(face);
                let vertices = reference.face_vertices(face);
                assert_eq!(vertices.len(), reference.vertices_per_cell / 2);
                for &v in vertices {
                    assert_eq!(ReferenceCell::vertex_bit(v, axis), side);
                }
            }
        }
    }

    #[test]
    fn test_child_vertex_support_2d() {
        let quad = &QUADRILATERAL;
        // child 0, vertex 0: parent corner
        assert_eq!(quad.child_vertex_support(0, 0), vec![0]);
        // child 0, vertex 1: midpoint of the bottom edge
        assert_eq!(quad.child_vertex_support(0, 1), vec![0, 1]);
        // child 0, vertex 3: cell center
        assert_eq!(quad.child_vertex_support(0, 3), vec![0, 1, 2, 3]);
        // child 3, vertex 3: parent corner 3
        assert_eq!(quad.child_vertex_support(3, 3), vec![3]);
        // child 3, vertex 1: midpoint of the right edge
        assert_eq!(quad.child_vertex_support(3, 1), vec![1, 3]);
    }

    #[test]
    fn test_child_vertex_support_3d_face_center() {
        // child 0, vertex 3 sits at (1/2, 1/2, 0): center of the bottom face
        assert_eq!(HEXAHEDRON.child_vertex_support(0, 3), vec![0, 1, 2, 3]);
        assert_eq!(HEXAHEDRON.child_vertex_support(0, 7).len(), 8);
    }

    #[test]
    fn test_hanging_entities() {
        assert_eq!(QUADRILATERAL.hanging_entities().len(), 4);
        assert_eq!(HEXAHEDRON.hanging_entities().len(), 18);
    }

    #[test]
    fn test_unsupported_dimension() {
        assert_eq!(
            ReferenceCell::for_dimension(1),
            Err(MeshError::UnsupportedDimension(1))
        );
    }
}
