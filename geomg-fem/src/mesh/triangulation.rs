//! Hierarchical quadrilateral / hexahedral triangulation
//!
//! Cells are stored in an arena and never removed: refining a cell appends its
//! children and keeps the parent, so every level of the hierarchy stays
//! available to multigrid. Vertices created by refinement are shared through
//! a map keyed on the sorted vertex ids of the parent entity (edge, face or
//! cell) they bisect.

use super::reference::ReferenceCell;
use super::types::{BoundaryId, Cell, Point};
use crate::basis::{FeQ1, Jacobian};
use crate::error::MeshError;
use std::collections::{BTreeSet, HashMap};

/// Cells touched by one refinement step
#[derive(Debug, Clone, Default)]
pub struct RefinementResult {
    /// Cells that were refined, including those added to keep the mesh balanced
    pub refined_cells: Vec<usize>,
    /// Newly created children
    pub new_cells: Vec<usize>,
}

/// Refinement tree of quadrilaterals (2D) or hexahedra (3D)
#[derive(Debug, Clone)]
pub struct Triangulation {
    reference: &'static ReferenceCell,
    vertices: Vec<Point>,
    cells: Vec<Cell>,
    levels: Vec<Vec<usize>>,
    midpoints: HashMap<Vec<usize>, usize>,
    epoch: u64,
}

fn sorted_key(cell_vertices: &[usize], local: &[usize]) -> Vec<usize> {
    let mut key: Vec<usize> = local.iter().map(|&v| cell_vertices[v]).collect();
    key.sort_unstable();
    key
}

impl Triangulation {
    /// Build a level-0 mesh from vertices and cells given in lexicographic
    /// vertex order
    ///
    /// Faces used by only one cell are boundary faces and get boundary id 0.
    pub fn from_coarse(
        dim: usize,
        vertices: Vec<Point>,
        cells: Vec<Vec<usize>>,
    ) -> Result<Self, MeshError> {
        let reference = ReferenceCell::for_dimension(dim)?;
        if cells.is_empty() {
            return Err(MeshError::EmptyMesh);
        }
        for (idx, cell) in cells.iter().enumerate() {
            if cell.len() != reference.vertices_per_cell {
                return Err(MeshError::WrongVertexCount {
                    cell: idx,
                    found: cell.len(),
                    expected: reference.vertices_per_cell,
                });
            }
            if let Some(&vertex) = cell.iter().find(|&&v| v >= vertices.len()) {
                return Err(MeshError::VertexOutOfRange {
                    cell: idx,
                    vertex,
                    n_vertices: vertices.len(),
                });
            }
        }

        let mut face_count: HashMap<Vec<usize>, usize> = HashMap::new();
        for cell in &cells {
            for face in 0..reference.faces_per_cell {
                *face_count
                    .entry(sorted_key(cell, reference.face_vertices(face)))
                    .or_insert(0) += 1;
            }
        }

        let coarse: Vec<Cell> = cells
            .into_iter()
            .map(|cell_vertices| {
                let boundary_ids = (0..reference.faces_per_cell)
                    .map(|face| {
                        let key = sorted_key(&cell_vertices, reference.face_vertices(face));
                        (face_count.get(&key) == Some(&1)).then_some(0)
                    })
                    .collect();
                Cell {
                    vertices: cell_vertices,
                    level: 0,
                    parent: None,
                    children: None,
                    boundary_ids,
                }
            })
            .collect();

        let tria = Self {
            reference,
            vertices,
            levels: vec![(0..coarse.len()).collect()],
            cells: coarse,
            midpoints: HashMap::new(),
            epoch: 0,
        };

        let fe = FeQ1::new(dim);
        let center = [0.5; 3];
        for idx in 0..tria.cells.len() {
            let jacobian = Jacobian::at(&fe, &tria.cell_points(idx), &center);
            if jacobian.det.is_nan() || jacobian.det <= 0.0 {
                return Err(MeshError::InvertedCell(idx));
            }
        }

        log::debug!(
            "coarse mesh: {} cells, {} vertices, dimension {}",
            tria.cells.len(),
            tria.vertices.len(),
            dim
        );
        Ok(tria)
    }

    pub fn dimension(&self) -> usize {
        self.reference.dim
    }

    pub fn reference_cell(&self) -> &'static ReferenceCell {
        self.reference
    }

    /// Number of levels; level `n_levels() - 1` is the finest
    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    /// Total number of cells on all levels
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn n_active_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_active()).count()
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Incremented by every refinement; derived structures record the epoch
    /// they were built for
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn cell(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    pub fn vertex(&self, idx: usize) -> &Point {
        &self.vertices[idx]
    }

    /// All cells on `level`, active or not; empty beyond the finest level
    pub fn level_cells(&self, level: usize) -> &[usize] {
        self.levels.get(level).map_or(&[], |cells| cells.as_slice())
    }

    pub fn active_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_active())
            .map(|(idx, _)| idx)
    }

    pub fn cell_points(&self, idx: usize) -> Vec<Point> {
        self.cells[idx]
            .vertices
            .iter()
            .map(|&v| self.vertices[v])
            .collect()
    }

    pub fn cell_center(&self, idx: usize) -> Point {
        Point::average(&self.cell_points(idx))
    }

    /// Largest distance between two vertices of the cell
    pub fn cell_diameter(&self, idx: usize) -> f64 {
        let points = self.cell_points(idx);
        let mut diameter: f64 = 0.0;
        for (i, p) in points.iter().enumerate() {
            for q in &points[i + 1..] {
                diameter = diameter.max(p.distance(q));
            }
        }
        diameter
    }

    /// Sorted global vertex ids of a face; equal for both cells sharing it
    pub fn face_key(&self, idx: usize, face: usize) -> Vec<usize> {
        sorted_key(
            &self.cells[idx].vertices,
            self.reference.face_vertices(face),
        )
    }

    pub fn face_center(&self, idx: usize, face: usize) -> Point {
        let points: Vec<Point> = self
            .reference
            .face_vertices(face)
            .iter()
            .map(|&v| self.vertices[self.cells[idx].vertices[v]])
            .collect();
        Point::average(&points)
    }

    /// Vertex created by bisecting the entity with the given sorted vertex ids
    pub fn midpoint_vertex(&self, key: &[usize]) -> Option<usize> {
        self.midpoints.get(key).copied()
    }

    /// Boundary ids present on any face of the mesh
    pub fn boundary_ids(&self) -> BTreeSet<BoundaryId> {
        self.cells
            .iter()
            .flat_map(|c| c.boundary_ids.iter().flatten().copied())
            .collect()
    }

    /// Re-tag every boundary face from the position of its center
    pub fn set_boundary_ids<F: Fn(&Point) -> BoundaryId>(&mut self, f: F) {
        for idx in 0..self.cells.len() {
            for face in 0..self.reference.faces_per_cell {
                if self.cells[idx].at_boundary(face) {
                    let id = f(&self.face_center(idx, face));
                    self.cells[idx].boundary_ids[face] = Some(id);
                }
            }
        }
    }

    /// Refine every active cell `times` times
    pub fn refine_global(&mut self, times: usize) {
        for _ in 0..times {
            let active: Vec<usize> = self.active_cells().collect();
            for idx in active {
                self.refine_cell(idx);
            }
            self.epoch += 1;
        }
        log::debug!(
            "global refinement x{}: {} active cells on {} levels",
            times,
            self.n_active_cells(),
            self.n_levels()
        );
    }

    /// Refine the flagged active cells
    ///
    /// Additional cells are refined so that active cells sharing a vertex
    /// differ by at most one level afterwards.
    pub fn execute_refinement(&mut self, flagged: &[usize]) -> Result<RefinementResult, MeshError> {
        if let Some(&bad) = flagged
            .iter()
            .find(|&&c| c >= self.cells.len() || !self.cells[c].is_active())
        {
            return Err(MeshError::NotActive(bad));
        }

        let mut marked: BTreeSet<usize> = flagged.iter().copied().collect();
        let requested = marked.len();
        self.close_vertex_level_difference(&mut marked);

        let mut new_cells = Vec::new();
        for &idx in &marked {
            new_cells.extend(self.refine_cell(idx));
        }
        if !marked.is_empty() {
            self.epoch += 1;
        }

        log::debug!(
            "refined {} cells ({} flagged, {} for level balance)",
            marked.len(),
            requested,
            marked.len() - requested
        );
        Ok(RefinementResult {
            refined_cells: marked.into_iter().collect(),
            new_cells,
        })
    }

    /// Grow `marked` until no vertex would see active cells more than one
    /// level apart
    fn close_vertex_level_difference(&self, marked: &mut BTreeSet<usize>) {
        let active: Vec<usize> = self.active_cells().collect();
        loop {
            let mut max_level = vec![0usize; self.vertices.len()];
            for &idx in &active {
                let cell = &self.cells[idx];
                let new_level = cell.level + usize::from(marked.contains(&idx));
                for &v in &cell.vertices {
                    max_level[v] = max_level[v].max(new_level);
                }
            }

            let mut changed = false;
            for &idx in &active {
                if marked.contains(&idx) {
                    continue;
                }
                let cell = &self.cells[idx];
                if cell.vertices.iter().any(|&v| max_level[v] > cell.level + 1) {
                    marked.insert(idx);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn refine_cell(&mut self, idx: usize) -> Vec<usize> {
        let reference = self.reference;
        let parent_vertices = self.cells[idx].vertices.clone();
        let parent_boundary = self.cells[idx].boundary_ids.clone();
        let level = self.cells[idx].level + 1;
        if self.levels.len() <= level {
            self.levels.push(Vec::new());
        }

        let first_child = self.cells.len();
        for child in 0..reference.children_per_cell {
            let vertices: Vec<usize> = (0..reference.vertices_per_cell)
                .map(|vertex| {
                    let support: Vec<usize> = reference
                        .child_vertex_support(child, vertex)
                        .into_iter()
                        .map(|p| parent_vertices[p])
                        .collect();
                    self.vertex_for_support(support)
                })
                .collect();
            let boundary_ids = (0..reference.faces_per_cell)
                .map(|face| {
                    if ReferenceCell::child_face_on_parent_face(child, face) {
                        parent_boundary[face]
                    } else {
                        None
                    }
                })
                .collect();
            self.cells.push(Cell {
                vertices,
                level,
                parent: Some(idx),
                children: None,
                boundary_ids,
            });
            self.levels[level].push(first_child + child);
        }

        let children: Vec<usize> = (first_child..self.cells.len()).collect();
        self.cells[idx].children = Some(children.clone());
        children
    }

    fn vertex_for_support(&mut self, mut support: Vec<usize>) -> usize {
        if support.len() == 1 {
            return support[0];
        }
        support.sort_unstable();
        if let Some(&vertex) = self.midpoints.get(&support) {
            return vertex;
        }
        let points: Vec<Point> = support.iter().map(|&v| self.vertices[v]).collect();
        let vertex = self.vertices.len();
        self.vertices.push(Point::average(&points));
        self.midpoints.insert(support, vertex);
        vertex
    }
}
