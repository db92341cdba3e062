//! Gauss-Legendre quadrature points and weights
//!
//! The 1D rules are tabulated on [-1, 1] and mapped to [0, 1], the reference
//! interval of the tensor-product cells.

/// A single quadrature point with weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraturePoint {
    /// Reference coordinates (xi, eta, zeta)
    pub coords: [f64; 3],
    /// Integration weight
    pub weight: f64,
}

impl QuadraturePoint {
    pub fn new_1d(xi: f64, weight: f64) -> Self {
        Self {
            coords: [xi, 0.0, 0.0],
            weight,
        }
    }
}

/// 1D Gauss-Legendre quadrature on [-1, 1]
pub fn gauss_legendre_1d(order: usize) -> Vec<QuadraturePoint> {
    match order {
        0 | 1 => vec![QuadraturePoint::new_1d(0.0, 2.0)],
        2 => {
            let x = 1.0 / 3.0_f64.sqrt();
            vec![
                QuadraturePoint::new_1d(-x, 1.0),
                QuadraturePoint::new_1d(x, 1.0),
            ]
        }
        3 => {
            let x = (3.0 / 5.0_f64).sqrt();
            vec![
                QuadraturePoint::new_1d(-x, 5.0 / 9.0),
                QuadraturePoint::new_1d(0.0, 8.0 / 9.0),
                QuadraturePoint::new_1d(x, 5.0 / 9.0),
            ]
        }
        4 => {
            let a = (3.0 / 7.0 - 2.0 / 7.0 * (6.0 / 5.0_f64).sqrt()).sqrt();
            let b = (3.0 / 7.0 + 2.0 / 7.0 * (6.0 / 5.0_f64).sqrt()).sqrt();
            let wa = (18.0 + 30.0_f64.sqrt()) / 36.0;
            let wb = (18.0 - 30.0_f64.sqrt()) / 36.0;
            vec![
                QuadraturePoint::new_1d(-b, wb),
                QuadraturePoint::new_1d(-a, wa),
                QuadraturePoint::new_1d(a, wa),
                QuadraturePoint::new_1d(b, wb),
            ]
        }
        5 => {
            let a = (5.0 - 2.0 * (10.0 / 7.0_f64).sqrt()).sqrt() / 3.0;
            let b = (5.0 + 2.0 * (10.0 / 7.0_f64).sqrt()).sqrt() / 3.0;
            let wa = (322.0 + 13.0 * 70.0_f64.sqrt()) / 900.0;
            let wb = (322.0 - 13.0 * 70.0_f64.sqrt()) / 900.0;
            vec![
                QuadraturePoint::new_1d(-b, wb),
                QuadraturePoint::new_1d(-a, wa),
                QuadraturePoint::new_1d(0.0, 128.0 / 225.0),
                QuadraturePoint::new_1d(a, wa),
                QuadraturePoint::new_1d(b, wb),
            ]
        }
        _ => {
            log::warn!("Gauss-Legendre order {} not tabulated, using 5", order);
            gauss_legendre_1d(5)
        }
    }
}

/// 1D Gauss-Legendre quadrature on [0, 1]
pub fn gauss_legendre_unit(order: usize) -> Vec<QuadraturePoint> {
    gauss_legendre_1d(order)
        .into_iter()
        .map(|q| QuadraturePoint::new_1d(0.5 * (q.coords[0] + 1.0), 0.5 * q.weight))
        .collect()
}

/// Tensor-product Gauss rule on the unit cell `[0, 1]^dim`
///
/// `n_points` per direction integrates polynomials of degree `2 n - 1`
/// exactly in each variable.
#[derive(Debug, Clone, PartialEq)]
pub struct QGauss {
    dim: usize,
    points: Vec<QuadraturePoint>,
}

impl QGauss {
    pub fn new(dim: usize, n_points: usize) -> Self {
        let rule = gauss_legendre_unit(n_points);
        let mut points = vec![QuadraturePoint {
            coords: [0.0; 3],
            weight: 1.0,
        }];
        for axis in 0..dim {
            points = points
                .iter()
                .flat_map(|p| {
                    rule.iter().map(move |q| {
                        let mut coords = p.coords;
                        coords[axis] = q.coords[0];
                        QuadraturePoint {
                            coords,
                            weight: p.weight * q.weight,
                        }
                    })
                })
                .collect();
        }
        Self { dim, points }
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[QuadraturePoint] {
        &self.points
    }
}
