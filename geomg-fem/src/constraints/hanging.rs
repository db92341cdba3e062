//! Hanging-node constraints for Q1 on locally refined meshes

use super::affine::AffineConstraints;
use crate::dofs::DofHandler;
use crate::mesh::Triangulation;

/// Constrain every hanging vertex to the average of the vertices of the coarse
/// edge (or 3D face) it bisects
///
/// A vertex hangs when it is the midpoint of a line or face of an active cell
/// and carries a global DoF. Returns the number of new constraint lines.
pub fn make_hanging_node_constraints(
    tria: &Triangulation,
    dofs: &DofHandler,
    constraints: &mut AffineConstraints,
) -> usize {
    let entities = tria.reference_cell().hanging_entities();
    let mut added = 0;

    for cell in tria.active_cells() {
        let cell_vertices = &tria.cell(cell).vertices;
        for entity in &entities {
            let mut key: Vec<usize> = entity.iter().map(|&v| cell_vertices[v]).collect();
            key.sort_unstable();
            let Some(hanging) = tria.midpoint_vertex(&key).and_then(|m| dofs.vertex_dof(m)) else {
                continue;
            };
            if !constraints.add_line(hanging) {
                continue;
            }
            let weight = 1.0 / key.len() as f64;
            for &v in &key {
                if let Some(master) = dofs.vertex_dof(v) {
                    constraints.add_entry(hanging, master, weight);
                }
            }
            added += 1;
        }
    }

    log::debug!("{} hanging node constraints", added);
    added
}
