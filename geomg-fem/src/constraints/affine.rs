//! Affine constraints `x_i = Σ_j w_ij x_j + g_i`
//!
//! Used for hanging nodes and Dirichlet values on the active mesh and for the
//! homogeneous boundary / refinement-edge constraints on each multigrid level.

use crate::dofs::IndexSet;
use ndarray::{Array1, Array2};
use solvers::TripletMatrix;
use std::collections::BTreeMap;

/// One constrained DoF
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintLine {
    pub index: usize,
    /// `(column, weight)` pairs
    pub entries: Vec<(usize, f64)>,
    pub inhomogeneity: f64,
}

/// Collection of constraint lines
#[derive(Debug, Clone, Default)]
pub struct AffineConstraints {
    lines: BTreeMap<usize, ConstraintLine>,
    closed: bool,
}

impl AffineConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a constraint on `index`
    ///
    /// Returns `false` and leaves the existing line untouched if `index` is
    /// already constrained.
    pub fn add_line(&mut self, index: usize) -> bool {
        if self.lines.contains_key(&index) {
            return false;
        }
        self.lines.insert(
            index,
            ConstraintLine {
                index,
                entries: Vec::new(),
                inhomogeneity: 0.0,
            },
        );
        self.closed = false;
        true
    }

    /// Constrain every index of `set` to zero
    pub fn add_lines(&mut self, set: &IndexSet) {
        for index in set.iter() {
            self.add_line(index);
        }
    }

    pub fn add_entry(&mut self, line: usize, column: usize, weight: f64) {
        if let Some(l) = self.lines.get_mut(&line) {
            l.entries.push((column, weight));
            self.closed = false;
        }
    }

    pub fn set_inhomogeneity(&mut self, line: usize, value: f64) {
        if let Some(l) = self.lines.get_mut(&line) {
            l.inhomogeneity = value;
        }
    }

    /// Resolve chains so that every entry refers to an unconstrained DoF
    ///
    /// Inhomogeneities of the substituted lines are folded in. Cyclic
    /// constraints cannot be resolved; they are reported and left as is.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        let max_passes = self.lines.len() + 1;
        let mut passes = 0;
        loop {
            let mut changed = false;
            let indices: Vec<usize> = self.lines.keys().copied().collect();
            for index in indices {
                let resolved = {
                    let line = &self.lines[&index];
                    let chained = line
                        .entries
                        .iter()
                        .any(|(k, _)| *k != index && self.lines.contains_key(k));
                    if !chained {
                        continue;
                    }
                    let mut entries: BTreeMap<usize, f64> = BTreeMap::new();
                    let mut inhomogeneity = line.inhomogeneity;
                    for &(k, w) in &line.entries {
                        match self.lines.get(&k) {
                            Some(target) if k != index => {
                                for &(m, v) in &target.entries {
                                    *entries.entry(m).or_insert(0.0) += w * v;
                                }
                                inhomogeneity += w * target.inhomogeneity;
                            }
                            _ => *entries.entry(k).or_insert(0.0) += w,
                        }
                    }
                    (entries, inhomogeneity)
                };
                if let Some(line) = self.lines.get_mut(&index) {
                    line.entries = resolved.0.into_iter().filter(|&(_, w)| w != 0.0).collect();
                    line.inhomogeneity = resolved.1;
                }
                changed = true;
            }

            passes += 1;
            if !changed {
                break;
            }
            if passes >= max_passes {
                log::warn!(
                    "constraint chains not resolved after {} passes; cyclic constraints remain",
                    passes
                );
                break;
            }
        }
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_constrained(&self, index: usize) -> bool {
        self.lines.contains_key(&index)
    }

    pub fn line(&self, index: usize) -> Option<&ConstraintLine> {
        self.lines.get(&index)
    }

    pub fn n_constraints(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Constrained indices in increasing order
    pub fn constrained_dofs(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.keys().copied()
    }

    /// Unconstrained DoFs that `index` stands for, with weights
    fn expand(&self, index: usize) -> Vec<(usize, f64)> {
        match self.lines.get(&index) {
            Some(line) => line.entries.clone(),
            None => vec![(index, 1.0)],
        }
    }

    fn inhomogeneity(&self, index: usize) -> f64 {
        self.lines.get(&index).map_or(0.0, |l| l.inhomogeneity)
    }

    /// Condense a cell contribution into the global accumulators
    ///
    /// Computes `Cᵀ A C` and `Cᵀ (b - A g)` for the constraint map `x = C y + g`.
    /// Rows and columns of constrained DoFs receive nothing; call
    /// [`add_unit_diagonal`](Self::add_unit_diagonal) once after assembly.
    pub fn distribute_local_to_global(
        &self,
        local_matrix: &Array2<f64>,
        local_rhs: Option<&Array1<f64>>,
        dofs: &[usize],
        matrix: &mut TripletMatrix<f64>,
        rhs: Option<&mut Array1<f64>>,
    ) {
        let expanded: Vec<Vec<(usize, f64)>> = dofs.iter().map(|&d| self.expand(d)).collect();

        for (i, row_targets) in expanded.iter().enumerate() {
            for (j, col_targets) in expanded.iter().enumerate() {
                let a = local_matrix[[i, j]];
                if a == 0.0 {
                    continue;
                }
                for &(r, wr) in row_targets {
                    for &(c, wc) in col_targets {
                        matrix.add(r, c, wr * wc * a);
                    }
                }
            }
        }

        if let Some(rhs) = rhs {
            let g: Vec<f64> = dofs.iter().map(|&d| self.inhomogeneity(d)).collect();
            for (i, row_targets) in expanded.iter().enumerate() {
                let mut value = local_rhs.map_or(0.0, |b| b[i]);
                for (j, gj) in g.iter().enumerate() {
                    if *gj != 0.0 {
                        value -= local_matrix[[i, j]] * gj;
                    }
                }
                for &(r, wr) in row_targets {
                    rhs[r] += wr * value;
                }
            }
        }
    }

    /// Put 1 on the diagonal of every constrained row within the matrix
    pub fn add_unit_diagonal(&self, matrix: &mut TripletMatrix<f64>) {
        let n = matrix.num_rows().min(matrix.num_cols());
        for index in self.lines.keys().copied().take_while(|&i| i < n) {
            matrix.add(index, index, 1.0);
        }
    }

    /// Overwrite constrained entries of `x` from the unconstrained ones
    pub fn distribute(&self, x: &mut Array1<f64>) {
        for line in self.lines.values() {
            let value: f64 = line
                .entries
                .iter()
                .map(|&(k, w)| w * x[k])
                .sum::<f64>()
                + line.inhomogeneity;
            x[line.index] = value;
        }
    }

    /// Zero the constrained entries of `x`
    pub fn set_zero(&self, x: &mut Array1<f64>) {
        for &index in self.lines.keys() {
            if index < x.len() {
                x[index] = 0.0;
            }
        }
    }
}
