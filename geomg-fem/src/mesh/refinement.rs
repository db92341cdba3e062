//! Cell marking strategies for adaptive refinement
//!
//! Both strategies take one error indicator per active cell (in the order
//! produced by [`Triangulation::active_cells`](super::Triangulation::active_cells))
//! and return positions into that slice.

fn sorted_descending(errors: &[f64]) -> Vec<(usize, f64)> {
    let mut indexed: Vec<(usize, f64)> = errors.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
    indexed
}

/// Mark elements for refinement based on Dörfler marking strategy
///
/// Mark enough elements to capture a fraction θ of the total squared error
pub fn doerfler_marking(errors: &[f64], theta: f64) -> Vec<usize> {
    let total_error_sq: f64 = errors.iter().map(|e| e * e).sum();
    let target = theta * total_error_sq;

    let mut marked = Vec::new();
    let mut accumulated = 0.0;
    for (idx, error) in sorted_descending(errors) {
        if accumulated >= target {
            break;
        }
        marked.push(idx);
        accumulated += error * error;
    }
    marked
}

/// Mark the cells with the largest indicators until they account for
/// `fraction` of the summed indicators
pub fn fixed_fraction_marking(errors: &[f64], fraction: f64) -> Vec<usize> {
    let total: f64 = errors.iter().sum();
    let target = fraction.clamp(0.0, 1.0) * total;

    let mut marked = Vec::new();
    let mut accumulated = 0.0;
    for (idx, error) in sorted_descending(errors) {
        if accumulated >= target || error <= 0.0 {
            break;
        }
        marked.push(idx);
        accumulated += error;
    }
    marked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doerfler_marking() {
        let errors = vec![0.1, 0.5, 0.2, 0.8, 0.3];
        let marked = doerfler_marking(&errors, 0.5);

        // 0.8² alone is 0.64 of 1.03 total
        assert_eq!(marked, vec![3]);
        assert_eq!(doerfler_marking(&errors, 1.0).len(), 5);
    }

    #[test]
    fn test_fixed_fraction_marking() {
        let errors = vec![1.0, 4.0, 2.0, 3.0];
        // total 10; 4 + 3 reaches 0.3 * 10 after two cells
        assert_eq!(fixed_fraction_marking(&errors, 0.3), vec![1]);
        assert_eq!(fixed_fraction_marking(&errors, 0.5), vec![1, 3]);
        assert!(fixed_fraction_marking(&[0.0, 0.0], 0.3).is_empty());
    }
}
