//! Per-level refinement-edge and boundary DoFs
//!
//! A level DoF lies on the refinement edge when it sits on a face between a
//! level cell and a coarser active cell. Boundary DoFs are the level DoFs on
//! faces with a homogeneous Dirichlet boundary id. The two sets are computed
//! independently and may overlap.

use crate::constraints::AffineConstraints;
use crate::dofs::{DofHandler, IndexSet};
use crate::error::MultigridError;
use crate::mesh::{BoundaryId, Triangulation};
use std::collections::{BTreeSet, HashMap};

/// Constrained level DoFs for one mesh epoch
#[derive(Debug, Clone)]
pub struct MgConstrainedDofs {
    refinement_edge: Vec<IndexSet>,
    boundary: Vec<IndexSet>,
}

impl MgConstrainedDofs {
    /// Compute the refinement-edge DoFs of every level
    pub fn initialize(tria: &Triangulation, dofs: &DofHandler) -> Result<Self, MultigridError> {
        if dofs.epoch() != tria.epoch() {
            return Err(MultigridError::StaleDofs {
                dofs: dofs.epoch(),
                mesh: tria.epoch(),
            });
        }
        if dofs.n_levels() != tria.n_levels() {
            return Err(MultigridError::LevelCountMismatch {
                dofs: dofs.n_levels(),
                mesh: tria.n_levels(),
            });
        }

        let reference = tria.reference_cell();
        let mut refinement_edge = Vec::with_capacity(tria.n_levels());
        for level in 0..tria.n_levels() {
            // face key -> (cell, face, number of level cells sharing it)
            let mut faces: HashMap<Vec<usize>, (usize, usize, usize)> = HashMap::new();
            for &cell in tria.level_cells(level) {
                for face in 0..reference.faces_per_cell {
                    if tria.cell(cell).at_boundary(face) {
                        continue;
                    }
                    faces
                        .entry(tria.face_key(cell, face))
                        .or_insert((cell, face, 0))
                        .2 += 1;
                }
            }

            let mut edge = Vec::new();
            for &(cell, face, count) in faces.values() {
                if count == 1 {
                    let level_dofs = dofs.cell_level_dof_indices(cell);
                    edge.extend(reference.face_vertices(face).iter().map(|&v| level_dofs[v]));
                }
            }
            let set = IndexSet::from_indices(dofs.n_level_dofs(level), edge);
            log::debug!("level {}: {} refinement-edge DoFs", level, set.n_elements());
            refinement_edge.push(set);
        }

        let boundary = (0..tria.n_levels())
            .map(|level| IndexSet::new(dofs.n_level_dofs(level)))
            .collect();
        Ok(Self {
            refinement_edge,
            boundary,
        })
    }

    /// Record the level DoFs on faces with one of `ids` as homogeneous Dirichlet
    ///
    /// Every id must occur on the mesh.
    pub fn make_zero_boundary_constraints(
        &mut self,
        tria: &Triangulation,
        dofs: &DofHandler,
        ids: &BTreeSet<BoundaryId>,
    ) -> Result<(), MultigridError> {
        let present = tria.boundary_ids();
        if let Some(&missing) = ids.iter().find(|id| !present.contains(id)) {
            return Err(MultigridError::UnknownBoundaryId(missing));
        }

        let reference = tria.reference_cell();
        for (level, boundary) in self.boundary.iter_mut().enumerate() {
            let mut found = Vec::new();
            for &cell in tria.level_cells(level) {
                let c = tria.cell(cell);
                let level_dofs = dofs.cell_level_dof_indices(cell);
                for face in 0..reference.faces_per_cell {
                    if c.boundary_ids[face].is_some_and(|id| ids.contains(&id)) {
                        found.extend(reference.face_vertices(face).iter().map(|&v| level_dofs[v]));
                    }
                }
            }
            *boundary = boundary.union(&IndexSet::from_indices(boundary.size(), found));
        }
        Ok(())
    }

    pub fn n_levels(&self) -> usize {
        self.refinement_edge.len()
    }

    pub fn refinement_edge_indices(&self, level: usize) -> &IndexSet {
        &self.refinement_edge[level]
    }

    pub fn boundary_indices(&self, level: usize) -> &IndexSet {
        &self.boundary[level]
    }

    pub fn at_refinement_edge(&self, level: usize, dof: usize) -> bool {
        self.refinement_edge[level].is_element(dof)
    }

    pub fn is_boundary_index(&self, level: usize, dof: usize) -> bool {
        self.boundary[level].is_element(dof)
    }

    /// Zero constraints on the boundary and refinement-edge DoFs of `level`
    pub fn level_constraints(&self, level: usize) -> AffineConstraints {
        let mut constraints = AffineConstraints::new();
        constraints.add_lines(&self.boundary[level].union(&self.refinement_edge[level]));
        constraints.close();
        constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mesh::hyper_cube;

    fn corner_refined_square() -> (Triangulation, DofHandler) {
        let mut tria = hyper_cube(2, 0.0, 1.0).expect("valid mesh");
        tria.refine_global(1);
        let first_child = tria.cell(0).children.clone().expect("refined")[0];
        tria.execute_refinement(&[first_child]).expect("active cell");
        let dofs = DofHandler::distribute(&tria);
        (tria, dofs)
    }

    #[test]
    fn test_uniform_mesh_has_no_refinement_edge() {
        let mut tria = hyper_cube(2, 0.0, 1.0).expect("valid mesh");
        tria.refine_global(2);
        let dofs = DofHandler::distribute(&tria);
        let mg = MgConstrainedDofs::initialize(&tria, &dofs).expect("consistent");
        for level in 0..mg.n_levels() {
            assert!(mg.refinement_edge_indices(level).is_empty());
        }
    }

    #[test]
    fn test_refinement_edge_of_refined_corner() {
        let (tria, dofs) = corner_refined_square();
        let mut mg = MgConstrainedDofs::initialize(&tria, &dofs).expect("consistent");
        mg.make_zero_boundary_constraints(&tria, &dofs, &BTreeSet::from([0]))
            .expect("known id");

        // level 2 covers [0, 1/2]^2; its interior faces x = 1/2 and y = 1/2
        // carry 5 vertices
        let edge = mg.refinement_edge_indices(2);
        assert_eq!(edge.n_elements(), 5);
        for dof in edge.iter() {
            let p = tria.vertex(dofs.level_dof_vertex(2, dof));
            assert!((p.x - 0.5).abs() < 1e-12 || (p.y - 0.5).abs() < 1e-12);
        }

        // (1/2, 0) is both on the boundary and on the refinement edge
        let both = edge.intersection(mg.boundary_indices(2));
        assert_eq!(both.n_elements(), 2);
        assert_eq!(mg.boundary_indices(2).n_elements(), 5);

        let constraints = mg.level_constraints(2);
        assert_eq!(constraints.n_constraints(), 8);
    }

    #[test]
    fn test_unknown_boundary_id() {
        let (tria, dofs) = corner_refined_square();
        let mut mg = MgConstrainedDofs::initialize(&tria, &dofs).expect("consistent");
        let err = mg
            .make_zero_boundary_constraints(&tria, &dofs, &BTreeSet::from([3]))
            .unwrap_err();
        assert!(matches!(err, MultigridError::UnknownBoundaryId(3)));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_stale_numbering_is_structural() {
        let (mut tria, dofs) = corner_refined_square();
        tria.refine_global(1);
        let err = MgConstrainedDofs::initialize(&tria, &dofs).unwrap_err();
        assert!(matches!(err, MultigridError::StaleDofs { .. }));
        assert_eq!(err.kind(), ErrorKind::Structural);
    }
}
