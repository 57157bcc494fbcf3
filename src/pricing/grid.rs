//! Markup grid construction.
//!
//! Produces the evenly spaced, inclusive set of markups the sweep walks.

use crate::types::PricingError;

/// Evenly spaced markups from `min_markup` to `max_markup` inclusive.
///
/// With one step the grid is `[min_markup]`. The last value is pinned to
/// `max_markup` so accumulated rounding never overshoots or undershoots it.
pub fn markup_grid(min_markup: f64, max_markup: f64, steps: usize) -> Result<Vec<f64>, PricingError> {
    if steps < 1 {
        return Err(PricingError::InvalidConfiguration(
            "steps must be at least 1".into(),
        ));
    }
    if !min_markup.is_finite() || !max_markup.is_finite() {
        return Err(PricingError::InvalidConfiguration(format!(
            "markup bounds must be finite, got [{min_markup}, {max_markup}]"
        )));
    }
    if max_markup < min_markup {
        return Err(PricingError::InvalidConfiguration(format!(
            "max markup {max_markup} is below min markup {min_markup}"
        )));
    }
    if min_markup <= -1.0 {
        return Err(PricingError::InvalidConfiguration(format!(
            "min markup {min_markup} would make the bid price non-positive"
        )));
    }

    if steps == 1 {
        return Ok(vec![min_markup]);
    }

    let spacing = (max_markup - min_markup) / (steps - 1) as f64;
    let mut grid: Vec<f64> = (0..steps)
        .map(|i| min_markup + i as f64 * spacing)
        .collect();
    grid[steps - 1] = max_markup;
    Ok(grid)
}
