//! Bilinear and linear forms evaluated cell by cell

use crate::basis::CellValues;
use crate::mesh::Point;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Scalar field evaluated at quadrature points
pub trait Coefficient: Send + Sync {
    fn value(&self, p: &Point) -> f64;
}

impl<F> Coefficient for F
where
    F: Fn(&Point) -> f64 + Send + Sync,
{
    fn value(&self, p: &Point) -> f64 {
        self(p)
    }
}

/// Spatially constant coefficient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantCoefficient(pub f64);

impl Coefficient for ConstantCoefficient {
    fn value(&self, _p: &Point) -> f64 {
        self.0
    }
}

/// Piecewise constant coefficient with a jump on a sphere around the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpCoefficient {
    pub radius: f64,
    /// Value for `|p| < radius`
    pub inside: f64,
    pub outside: f64,
}

impl Default for JumpCoefficient {
    fn default() -> Self {
        Self {
            radius: 0.5,
            inside: 5.0,
            outside: 1.0,
        }
    }
}

impl Coefficient for JumpCoefficient {
    fn value(&self, p: &Point) -> f64 {
        if p.norm_sqr() < self.radius * self.radius {
            self.inside
        } else {
            self.outside
        }
    }
}

/// Cell matrix of a bilinear form
pub trait BilinearForm: Sync {
    fn cell_matrix(&self, values: &CellValues) -> Array2<f64>;
}

/// Cell vector of a linear form
pub trait LinearForm: Sync {
    fn cell_vector(&self, values: &CellValues) -> Array1<f64>;
}

/// `∫ a ∇φ_i · ∇φ_j`
#[derive(Debug, Clone)]
pub struct LaplaceForm<C> {
    pub coefficient: C,
}

impl<C: Coefficient> LaplaceForm<C> {
    pub fn new(coefficient: C) -> Self {
        Self { coefficient }
    }
}

impl<C: Coefficient> BilinearForm for LaplaceForm<C> {
    fn cell_matrix(&self, values: &CellValues) -> Array2<f64> {
        let n = values.dofs_per_cell();
        let dim = values.dimension();
        let mut local = Array2::zeros((n, n));
        for q in 0..values.n_quadrature_points() {
            let weight = self.coefficient.value(values.quadrature_point(q)) * values.jxw(q);
            for i in 0..n {
                let gi = values.shape_grad(i, q);
                for j in i..n {
                    let gj = values.shape_grad(j, q);
                    let dot: f64 = (0..dim).map(|a| gi[a] * gj[a]).sum();
                    local[[i, j]] += dot * weight;
                }
            }
        }
        // symmetric: fill the lower triangle
        for i in 0..n {
            for j in 0..i {
                local[[i, j]] = local[[j, i]];
            }
        }
        local
    }
}

/// `∫ f φ_i`
#[derive(Debug, Clone)]
pub struct SourceForm<C> {
    pub source: C,
}

impl<C: Coefficient> SourceForm<C> {
    pub fn new(source: C) -> Self {
        Self { source }
    }
}

impl<C: Coefficient> LinearForm for SourceForm<C> {
    fn cell_vector(&self, values: &CellValues) -> Array1<f64> {
        let n = values.dofs_per_cell();
        let mut local = Array1::zeros(n);
        for q in 0..values.n_quadrature_points() {
            let weight = self.source.value(values.quadrature_point(q)) * values.jxw(q);
            for i in 0..n {
                local[i] += values.shape_value(i, q) * weight;
            }
        }
        local
    }
}
