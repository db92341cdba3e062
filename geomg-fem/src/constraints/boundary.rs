//! Dirichlet boundary values and boundary DoF extraction

use super::affine::AffineConstraints;
use crate::dofs::{DofHandler, IndexSet};
use crate::mesh::{BoundaryId, Point, Triangulation};
use std::collections::BTreeSet;

/// Global DoFs on active boundary faces carrying one of `ids`
pub fn extract_boundary_dofs(
    tria: &Triangulation,
    dofs: &DofHandler,
    ids: &BTreeSet<BoundaryId>,
) -> IndexSet {
    let reference = tria.reference_cell();
    let mut found = Vec::new();
    for cell in tria.active_cells() {
        let c = tria.cell(cell);
        for face in 0..reference.faces_per_cell {
            if c.boundary_ids[face].is_some_and(|id| ids.contains(&id)) {
                found.extend(
                    reference
                        .face_vertices(face)
                        .iter()
                        .filter_map(|&v| dofs.vertex_dof(c.vertices[v])),
                );
            }
        }
    }
    IndexSet::from_indices(dofs.n_dofs(), found)
}

/// Constrain the DoFs on boundary `id` to `f` evaluated at their vertices
///
/// DoFs that are already constrained (hanging nodes on the boundary) keep
/// their existing constraint. Returns the number of new lines.
pub fn interpolate_boundary_values<F>(
    tria: &Triangulation,
    dofs: &DofHandler,
    id: BoundaryId,
    f: F,
    constraints: &mut AffineConstraints,
) -> usize
where
    F: Fn(&Point) -> f64,
{
    let boundary = extract_boundary_dofs(tria, dofs, &BTreeSet::from([id]));
    let mut added = 0;
    for dof in boundary.iter() {
        if constraints.add_line(dof) {
            constraints.set_inhomogeneity(dof, f(tria.vertex(dofs.dof_vertex(dof))));
            added += 1;
        }
    }
    added
}
