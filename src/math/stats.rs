//! Descriptive statistics over repeated runs.

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Mean ± spread summary of repeated λ estimates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub n: usize,
    pub mean: f64,
    pub std: f64,
}

impl Summary {
    pub fn of(values: &[f64]) -> Option<Self> {
        Some(Self {
            n: values.len(),
            mean: mean(values)?,
            std: std_dev(values)?,
        })
    }

    /// Relative spread in percent, `0` when the mean is not positive.
    pub fn relative_error_pct(&self) -> f64 {
        if self.mean > 0.0 {
            self.std / self.mean * 100.0
        } else {
            0.0
        }
    }
}

/// `n` evenly spaced points over `[start, end]` (inclusive).
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n as f64 - 1.0);
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// `n` log-spaced points between `10^start_exp` and `10^end_exp`.
pub fn logspace(start_exp: f64, end_exp: f64, n: usize) -> Vec<f64> {
    linspace(start_exp, end_exp, n)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_std_matches_numpy() {
        // np.std([1, 2, 3, 4]) == 1.118033988749895
        let s = std_dev(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((s - 1.118_033_988_749_895).abs() < 1e-12);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn summary_relative_error() {
        let s = Summary::of(&[0.9, 1.1]).unwrap();
        assert!((s.mean - 1.0).abs() < 1e-12);
        assert!((s.relative_error_pct() - 10.0).abs() < 1e-9);
        assert_eq!(Summary::of(&[0.0, 0.0]).unwrap().relative_error_pct(), 0.0);
    }

    #[test]
    fn linspace_includes_endpoints() {
        let v = linspace(0.0, 5.0, 20);
        assert_eq!(v.len(), 20);
        assert_eq!(v[0], 0.0);
        assert!((v[19] - 5.0).abs() < 1e-12);
        let l = logspace(0.0, 7.0, 50);
        assert!((l[0] - 1.0).abs() < 1e-12);
        assert!((l[49] - 1e7).abs() < 1e-3);
    }
}
