use crate::Array1;
use anyhow::{anyhow, Error, Result};
use average::Variance;

/// Compute the arithmetic mean of an array.
///
/// Infinite entries propagate, so a mean over ratios with a zero denominator
/// is infinite rather than an error.
pub fn mean(arr: &[f64]) -> Result<f64, Error> {
    if arr.is_empty() {
        return Err(anyhow!("Can't take mean of empty array"));
    }
    let sum = arr.iter().sum::<f64>();
    let count = arr.len() as f64;
    Ok(sum / count)
}

/// Mean and population standard deviation (no Bessel's correction) of an array.
pub fn mean_and_std(arr: &[f64]) -> Result<(f64, f64), Error> {
    let xbar = mean(arr)?;
    if !xbar.is_finite() {
        return Ok((xbar, f64::NAN));
    }
    let var: Variance = arr.iter().copied().collect();
    Ok((xbar, var.population_variance().sqrt()))
}

/// `num` evenly spaced points from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, num: usize) -> Array1 {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut points: Array1 = (0..num).map(|i| start + step * i as f64).collect();
            // pin the endpoint so it can't drift outside the interpolation range
            points[num - 1] = stop;
            points
        }
    }
}

/// Piecewise linear interpolation of `(x, y)` evaluated at `x_new`.
///
/// `x` must be strictly ascending and every point of `x_new` must lie in
/// `[x[0], x[n - 1]]`; extrapolation is refused.
pub fn interp_linear(x: &[f64], y: &[f64], x_new: &[f64]) -> Result<Array1, Error> {
    if x.len() != y.len() {
        return Err(anyhow!(
            "x and y must have the same length ({} != {})",
            x.len(),
            y.len()
        ));
    }
    if x.is_empty() {
        return Err(anyhow!("Can't interpolate from an empty array"));
    }
    if x.windows(2).any(|w| w[1] <= w[0]) {
        return Err(anyhow!("x must be strictly ascending to interpolate"));
    }
    let (lo, hi) = (x[0], x[x.len() - 1]);
    let mut result = Vec::with_capacity(x_new.len());
    for &xi in x_new {
        if xi < lo || xi > hi {
            return Err(anyhow!(
                "Value {} is outside the interpolation range [{}, {}]",
                xi,
                lo,
                hi
            ));
        }
        if x.len() == 1 {
            result.push(y[0]);
            continue;
        }
        // index of the first knot strictly greater than xi, clamped to the last segment
        let upper = x.partition_point(|&k| k <= xi).clamp(1, x.len() - 1);
        let (x0, x1) = (x[upper - 1], x[upper]);
        let (y0, y1) = (y[upper - 1], y[upper]);
        let slope = (y1 - y0) / (x1 - x0);
        result.push(y0 + slope * (xi - x0));
    }
    Ok(result)
}

/// Integrate `y` against `x` with the trapezoidal rule.
///
/// `x` need not be evenly spaced.
pub fn trapezoid(y: &[f64], x: &[f64]) -> Result<f64, Error> {
    if x.len() != y.len() {
        return Err(anyhow!(
            "x and y must have the same length ({} != {})",
            x.len(),
            y.len()
        ));
    }
    Ok(x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (ys[0] + ys[1]) * (xs[1] - xs[0]))
        .sum())
}
