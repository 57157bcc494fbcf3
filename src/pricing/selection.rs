//! Reductions over an evaluated sweep.
//!
//! Both reductions scan in sweep order and only replace the running best on
//! a strictly greater revenue, so exact ties keep the lower-markup candidate.

use crate::types::PriceCandidate;

/// Index of the candidate with the highest expected revenue.
pub fn select_optimal(candidates: &[PriceCandidate]) -> Option<usize> {
    argmax_revenue(candidates.iter().enumerate())
}

/// Index of the highest-revenue candidate whose probability is at least
/// `floor`. `None` when no candidate qualifies.
pub fn select_safe(candidates: &[PriceCandidate], floor: f64) -> Option<usize> {
    argmax_revenue(
        candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.probability >= floor),
    )
}

fn argmax_revenue<'a, I>(candidates: I) -> Option<usize>
where
    I: Iterator<Item = (usize, &'a PriceCandidate)>,
{
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates {
        match best {
            Some((_, revenue)) if candidate.expected_revenue <= revenue => {}
            _ => best = Some((idx, candidate.expected_revenue)),
        }
    }
    best.map(|(idx, _)| idx)
}
