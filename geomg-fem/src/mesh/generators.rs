//! Coarse mesh generators for common domains
//!
//! All generators return a level-0 [`Triangulation`]; refine it afterwards.

use super::reference::ReferenceCell;
use super::triangulation::Triangulation;
use super::types::Point;
use crate::error::MeshError;

/// Structured mesh of the box spanned by `p1` and `p2`
///
/// `subdivisions[a]` cells along axis `a`. With `colorize`, the face normal to
/// axis `a` at the lower end gets boundary id `2a` and the upper one `2a + 1`;
/// otherwise all boundary faces keep id 0.
pub fn hyper_rectangle(
    dim: usize,
    p1: Point,
    p2: Point,
    subdivisions: &[usize],
    colorize: bool,
) -> Result<Triangulation, MeshError> {
    ReferenceCell::for_dimension(dim)?;
    if subdivisions.len() != dim || subdivisions.contains(&0) {
        return Err(MeshError::InvalidSubdivisions(subdivisions.to_vec()));
    }
    let lower: Vec<f64> = (0..dim).map(|a| p1.coord(a).min(p2.coord(a))).collect();
    let upper: Vec<f64> = (0..dim).map(|a| p1.coord(a).max(p2.coord(a))).collect();

    // Vertex (i, j, k) -> i + (nx + 1) * (j + (ny + 1) * k)
    let n_points: Vec<usize> = subdivisions.iter().map(|n| n + 1).collect();
    let stride: Vec<usize> = (0..dim)
        .map(|a| n_points[..a].iter().product())
        .collect();
    let n_vertices: usize = n_points.iter().product();

    let vertices: Vec<Point> = (0..n_vertices)
        .map(|idx| {
            let mut coords = [0.0; 3];
            for (a, c) in coords.iter_mut().enumerate().take(dim) {
                let i = (idx / stride[a]) % n_points[a];
                let h = (upper[a] - lower[a]) / subdivisions[a] as f64;
                *c = lower[a] + i as f64 * h;
            }
            Point::new_3d(coords[0], coords[1], coords[2])
        })
        .collect();

    let n_cells: usize = subdivisions.iter().product();
    let vertices_per_cell = 1 << dim;
    let cells: Vec<Vec<usize>> = (0..n_cells)
        .map(|cell| {
            let mut rest = cell;
            let mut base = 0;
            for a in 0..dim {
                base += (rest % subdivisions[a]) * stride[a];
                rest /= subdivisions[a];
            }
            (0..vertices_per_cell)
                .map(|v| {
                    base + (0..dim)
                        .map(|a| ((v >> a) & 1) * stride[a])
                        .sum::<usize>()
                })
                .collect()
        })
        .collect();

    let mut tria = Triangulation::from_coarse(dim, vertices, cells)?;

    if colorize {
        let tol = 1e-10
            * (0..dim)
                .map(|a| upper[a] - lower[a])
                .fold(0.0_f64, f64::max);
        tria.set_boundary_ids(|p| {
            for a in 0..dim {
                if (p.coord(a) - lower[a]).abs() < tol {
                    return 2 * a as u32;
                }
                if (p.coord(a) - upper[a]).abs() < tol {
                    return 2 * a as u32 + 1;
                }
            }
            0
        });
    }
    Ok(tria)
}

/// Single cell `[left, right]^dim`
pub fn hyper_cube(dim: usize, left: f64, right: f64) -> Result<Triangulation, MeshError> {
    let p1 = Point::new_3d(left, left, if dim == 3 { left } else { 0.0 });
    let p2 = Point::new_3d(right, right, if dim == 3 { right } else { 0.0 });
    hyper_rectangle(dim, p1, p2, &[1, 1, 1][..dim.min(3)], false)
}

/// Five-cell disk: a center square surrounded by four trapezoids
///
/// Straight-sided; the outer vertices lie on the circle. All outer faces have
/// boundary id 0.
pub fn hyper_ball(center: Point, radius: f64) -> Result<Triangulation, MeshError> {
    let outer = radius / 2.0_f64.sqrt();
    let inner = outer / (1.0 + 2.0_f64.sqrt());
    let at = |s: f64, dx: f64, dy: f64| Point::new_2d(center.x + s * dx, center.y + s * dy);

    let vertices = vec![
        at(outer, -1.0, -1.0),
        at(outer, 1.0, -1.0),
        at(outer, -1.0, 1.0),
        at(outer, 1.0, 1.0),
        at(inner, -1.0, -1.0),
        at(inner, 1.0, -1.0),
        at(inner, -1.0, 1.0),
        at(inner, 1.0, 1.0),
    ];
    let (o0, o1, o2, o3) = (0, 1, 2, 3);
    let (i0, i1, i2, i3) = (4, 5, 6, 7);
    let cells = vec![
        vec![i0, i1, i2, i3],
        vec![o0, o1, i0, i1],
        vec![i2, i3, o2, o3],
        vec![o0, i0, o2, i2],
        vec![i1, o1, i3, o3],
    ];
    Triangulation::from_coarse(2, vertices, cells)
}
