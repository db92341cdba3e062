//! Q1 degree-of-freedom numbering on the active mesh and on every level

use super::index_set::IndexSet;
use crate::mesh::Triangulation;

/// Global and per-level DoF numbering for one mesh epoch
///
/// Q1 has one DoF per vertex. Global DoFs are numbered over the active cells;
/// level DoFs are numbered over all cells of a level, active or not, so a
/// vertex can carry a DoF on several levels.
#[derive(Debug, Clone)]
pub struct DofHandler {
    epoch: u64,
    dofs_per_cell: usize,
    n_dofs: usize,
    cell_dofs: Vec<Option<Vec<usize>>>,
    cell_level_dofs: Vec<Vec<usize>>,
    vertex_dofs: Vec<Option<usize>>,
    dof_vertices: Vec<usize>,
    /// `level_vertex_dofs[level][vertex]`
    level_vertex_dofs: Vec<Vec<Option<usize>>>,
    /// `level_dof_vertices[level][dof]`
    level_dof_vertices: Vec<Vec<usize>>,
    owned: IndexSet,
    level_owned: Vec<IndexSet>,
}

impl DofHandler {
    /// Number all DoFs of `tria` in order of first appearance
    pub fn distribute(tria: &Triangulation) -> Self {
        let n_vertices = tria.n_vertices();
        let dofs_per_cell = tria.reference_cell().vertices_per_cell;

        let mut vertex_dofs: Vec<Option<usize>> = vec![None; n_vertices];
        let mut dof_vertices = Vec::new();
        let mut cell_dofs: Vec<Option<Vec<usize>>> = vec![None; tria.n_cells()];
        for cell in tria.active_cells() {
            let dofs: Vec<usize> = tria
                .cell(cell)
                .vertices
                .iter()
                .map(|&v| {
                    *vertex_dofs[v].get_or_insert_with(|| {
                        dof_vertices.push(v);
                        dof_vertices.len() - 1
                    })
                })
                .collect();
            cell_dofs[cell] = Some(dofs);
        }
        let n_dofs = dof_vertices.len();

        let mut cell_level_dofs: Vec<Vec<usize>> = vec![Vec::new(); tria.n_cells()];
        let mut level_vertex_dofs = Vec::with_capacity(tria.n_levels());
        let mut level_dof_vertices = Vec::with_capacity(tria.n_levels());
        for level in 0..tria.n_levels() {
            let mut vertex_to_dof: Vec<Option<usize>> = vec![None; n_vertices];
            let mut dof_to_vertex = Vec::new();
            for &cell in tria.level_cells(level) {
                cell_level_dofs[cell] = tria
                    .cell(cell)
                    .vertices
                    .iter()
                    .map(|&v| {
                        *vertex_to_dof[v].get_or_insert_with(|| {
                            dof_to_vertex.push(v);
                            dof_to_vertex.len() - 1
                        })
                    })
                    .collect();
            }
            level_vertex_dofs.push(vertex_to_dof);
            level_dof_vertices.push(dof_to_vertex);
        }

        let level_owned: Vec<IndexSet> = level_dof_vertices
            .iter()
            .map(|dofs| IndexSet::complete(dofs.len()))
            .collect();

        log::debug!(
            "distributed {} global DoFs; level DoFs {:?}",
            n_dofs,
            level_dof_vertices.iter().map(Vec::len).collect::<Vec<_>>()
        );

        Self {
            epoch: tria.epoch(),
            dofs_per_cell,
            n_dofs,
            cell_dofs,
            cell_level_dofs,
            vertex_dofs,
            dof_vertices,
            level_vertex_dofs,
            level_dof_vertices,
            owned: IndexSet::complete(n_dofs),
            level_owned,
        }
    }

    /// Mesh epoch this numbering was built for
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn n_dofs(&self) -> usize {
        self.n_dofs
    }

    /// DoFs on `level`; 0 beyond the finest level
    pub fn n_level_dofs(&self, level: usize) -> usize {
        self.level_dof_vertices.get(level).map_or(0, Vec::len)
    }

    pub fn n_levels(&self) -> usize {
        self.level_dof_vertices.len()
    }

    pub fn dofs_per_cell(&self) -> usize {
        self.dofs_per_cell
    }

    /// Global DoFs of an active cell; `None` for refined cells
    pub fn cell_dof_indices(&self, cell: usize) -> Option<&[usize]> {
        self.cell_dofs.get(cell)?.as_deref()
    }

    /// Level DoFs of any cell on its own level
    pub fn cell_level_dof_indices(&self, cell: usize) -> &[usize] {
        &self.cell_level_dofs[cell]
    }

    pub fn vertex_dof(&self, vertex: usize) -> Option<usize> {
        self.vertex_dofs.get(vertex).copied().flatten()
    }

    pub fn dof_vertex(&self, dof: usize) -> usize {
        self.dof_vertices[dof]
    }

    pub fn level_vertex_dof(&self, level: usize, vertex: usize) -> Option<usize> {
        self.level_vertex_dofs
            .get(level)
            .and_then(|dofs| dofs.get(vertex).copied().flatten())
    }

    pub fn level_dof_vertex(&self, level: usize, dof: usize) -> usize {
        self.level_dof_vertices[level][dof]
    }

    /// Locally owned global DoFs; the complete range in a single address space
    pub fn locally_owned_dofs(&self) -> &IndexSet {
        &self.owned
    }

    /// Locally owned DoFs on `level`
    pub fn locally_owned_mg_dofs(&self, level: usize) -> &IndexSet {
        &self.level_owned[level]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::hyper_cube;

    #[test]
    fn test_uniform_mesh_numbering() {
        let mut tria = hyper_cube(2, 0.0, 1.0).expect("valid mesh");
        tria.refine_global(2);
        let dofs = DofHandler::distribute(&tria);

        assert_eq!(dofs.n_dofs(), 25);
        assert_eq!(dofs.n_levels(), 3);
        assert_eq!(dofs.n_level_dofs(0), 4);
        assert_eq!(dofs.n_level_dofs(1), 9);
        assert_eq!(dofs.n_level_dofs(2), 25);
        assert_eq!(dofs.n_level_dofs(3), 0);
        assert_eq!(dofs.locally_owned_mg_dofs(1).n_elements(), 9);
        assert_eq!(dofs.locally_owned_dofs().n_elements(), 25);
        assert!(dofs.locally_owned_dofs().is_element(24));
        assert_eq!(dofs.epoch(), tria.epoch());

        // refined cells have level DoFs but no global ones
        assert!(dofs.cell_dof_indices(0).is_none());
        assert_eq!(dofs.cell_level_dof_indices(0), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_vertex_maps_are_inverse() {
        let mut tria = hyper_cube(3, 0.0, 1.0).expect("valid mesh");
        tria.refine_global(1);
        let dofs = DofHandler::distribute(&tria);
        assert_eq!(dofs.n_dofs(), 27);
        for dof in 0..dofs.n_dofs() {
            assert_eq!(dofs.vertex_dof(dofs.dof_vertex(dof)), Some(dof));
        }
        for level in 0..dofs.n_levels() {
            for dof in 0..dofs.n_level_dofs(level) {
                let v = dofs.level_dof_vertex(level, dof);
                assert_eq!(dofs.level_vertex_dof(level, v), Some(dof));
            }
        }
    }

    #[test]
    fn test_adaptive_levels_cover_only_level_cells() {
        let mut tria = hyper_cube(2, 0.0, 1.0).expect("valid mesh");
        tria.refine_global(1);
        let first_child = tria.cell(0).children.clone().expect("refined")[0];
        tria.execute_refinement(&[first_child]).expect("active cell");
        let dofs = DofHandler::distribute(&tria);

        // level 2 holds only the four children of one level-1 cell
        assert_eq!(dofs.n_level_dofs(2), 9);
        assert_eq!(dofs.n_dofs(), 9 + 5);
    }
}
