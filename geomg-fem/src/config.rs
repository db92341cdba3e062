//! Configuration of the Laplace driver
//!
//! Every field has a default, so a JSON file only needs the values it
//! changes. The defaults reproduce the classic coefficient-jump benchmark:
//! unit square, four global refinements, coefficient 5 inside radius 0.5 and 1
//! outside, source 10, Dirichlet value 1.

use crate::assembly::JumpCoefficient;
use crate::error::ConfigError;
use crate::mesh::BoundaryId;
use crate::multigrid::{MultigridConfig, SmootherConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Outer CG iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OuterSolverConfig {
    pub max_iterations: usize,
    /// Relative residual target (relative to the right-hand side norm)
    pub tolerance: f64,
}

impl Default for OuterSolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-8,
        }
    }
}

/// Complete driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaplaceConfig {
    /// Spatial dimension (2 or 3)
    pub dimension: usize,
    /// Coordinates `[left, right]` of the hypercube domain
    pub domain: [f64; 2],
    pub initial_refinements: usize,
    /// Number of solve/refine cycles run by [`crate::LaplaceProblem::run`]
    pub cycles: usize,
    pub coefficient: JumpCoefficient,
    /// Constant right-hand side
    pub source: f64,
    /// Dirichlet value on every id in `dirichlet_ids`
    pub boundary_value: f64,
    pub dirichlet_ids: Vec<BoundaryId>,
    /// Fraction of cells, by error, refined per cycle
    pub refine_fraction: f64,
    /// Gauss points per direction
    pub quadrature_points: usize,
    pub multigrid: MultigridConfig,
    pub outer: OuterSolverConfig,
}

impl Default for LaplaceConfig {
    fn default() -> Self {
        Self {
            dimension: 2,
            domain: [0.0, 1.0],
            initial_refinements: 4,
            cycles: 8,
            coefficient: JumpCoefficient::default(),
            source: 10.0,
            boundary_value: 1.0,
            dirichlet_ids: vec![0],
            refine_fraction: 0.3,
            quadrature_points: 2,
            multigrid: MultigridConfig::default(),
            outer: OuterSolverConfig::default(),
        }
    }
}

impl LaplaceConfig {
    /// Load and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: LaplaceConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=3).contains(&self.dimension) {
            return Err(invalid("dimension", format!("{} is not 2 or 3", self.dimension)));
        }
        let [left, right] = self.domain;
        if !(left < right) {
            return Err(invalid("domain", format!("[{left}, {right}] is empty")));
        }
        if self.dirichlet_ids.is_empty() {
            return Err(invalid(
                "dirichlet_ids",
                "at least one Dirichlet boundary is required".to_string(),
            ));
        }
        if !(self.refine_fraction > 0.0 && self.refine_fraction <= 1.0) {
            return Err(invalid(
                "refine_fraction",
                format!("{} is outside (0, 1]", self.refine_fraction),
            ));
        }
        if !(1..=5).contains(&self.quadrature_points) {
            return Err(invalid(
                "quadrature_points",
                format!("{} is outside 1..=5", self.quadrature_points),
            ));
        }
        let c = &self.coefficient;
        if !(c.inside > 0.0 && c.outside > 0.0) {
            return Err(invalid(
                "coefficient",
                format!("values {} and {} must be positive", c.inside, c.outside),
            ));
        }
        if !self.source.is_finite() || !self.boundary_value.is_finite() {
            return Err(invalid("source", "data must be finite".to_string()));
        }
        validate_smoother("multigrid.pre_smoother", &self.multigrid.pre_smoother)?;
        validate_smoother("multigrid.post_smoother", &self.multigrid.post_smoother)?;
        if self.multigrid.coarse.max_iterations == 0 || !(self.multigrid.coarse.tolerance > 0.0) {
            return Err(invalid(
                "multigrid.coarse",
                "iteration budget and tolerance must be positive".to_string(),
            ));
        }
        if self.outer.max_iterations == 0 || !(self.outer.tolerance > 0.0) {
            return Err(invalid(
                "outer",
                "iteration budget and tolerance must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_smoother(field: &'static str, smoother: &SmootherConfig) -> Result<(), ConfigError> {
    if smoother.steps == 0 {
        return Err(invalid(field, "at least one smoothing step".to_string()));
    }
    if !(smoother.relaxation > 0.0 && smoother.relaxation < 2.0) {
        return Err(invalid(
            field,
            format!("relaxation {} is outside (0, 2)", smoother.relaxation),
        ));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multigrid::{CoarseSolverType, SmootherType};

    #[test]
    fn test_defaults_are_valid() {
        let config = LaplaceConfig::default();
        config.validate().expect("defaults");
        assert_eq!(config.initial_refinements, 4);
        assert_eq!(config.outer.max_iterations, 500);
        assert_eq!(config.multigrid.pre_smoother.steps, 2);
        assert_eq!(config.multigrid.coarse.max_iterations, 1000);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = LaplaceConfig::from_json_str(
            r#"{
                "dimension": 3,
                "multigrid": {
                    "pre_smoother": { "smoother_type": "gauss_seidel" },
                    "coarse": { "solver_type": "direct" }
                }
            }"#,
        )
        .expect("valid json");
        assert_eq!(config.dimension, 3);
        assert_eq!(config.multigrid.pre_smoother.smoother_type, SmootherType::GaussSeidel);
        assert_eq!(config.multigrid.pre_smoother.steps, 2);
        assert_eq!(config.multigrid.post_smoother.smoother_type, SmootherType::Jacobi);
        assert_eq!(config.multigrid.coarse.solver_type, CoarseSolverType::Direct);
        assert_eq!(config.source, 10.0);
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = LaplaceConfig {
            cycles: 3,
            refine_fraction: 0.5,
            ..LaplaceConfig::default()
        };
        let json = config.to_json_string().expect("serializable");
        assert_eq!(LaplaceConfig::from_json_str(&json).expect("valid"), config);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = LaplaceConfig::from_json_str(r#"{ "dimension": 4 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "dimension", .. }));

        let err = LaplaceConfig::from_json_str(r#"{ "dirichlet_ids": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "dirichlet_ids", .. }));

        let err = LaplaceConfig::from_json_str(
            r#"{ "multigrid": { "post_smoother": { "relaxation": 2.5 } } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("multigrid.post_smoother"));

        let err = LaplaceConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = LaplaceConfig::from_json_file("/nonexistent/geomg.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
