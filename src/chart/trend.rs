use statrs::statistics::Statistics;

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares of `ys` on `xs`.
///
/// Returns `None` when the fit is undefined: fewer than two points,
/// mismatched lengths, or no spread in `xs`.
pub fn fit_linear(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let var_x = xs.iter().variance();
    if !var_x.is_finite() || var_x == 0.0 {
        return None;
    }
    let slope = xs.iter().covariance(ys.iter()) / var_x;
    let intercept = ys.iter().mean() - slope * xs.iter().mean();
    (slope.is_finite() && intercept.is_finite()).then_some(LinearFit { slope, intercept })
}
