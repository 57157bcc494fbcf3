//! Classifier evaluation.
//!
//! Scores held-out predictions against observed acceptance: threshold
//! metrics, ranking quality (ROC-AUC) and probability quality (Brier).
//! Threshold counts are kept per class here so both rows of the report
//! share one confusion table.

use std::fmt;

use linfa::dataset::Pr;
use linfa::metrics::BinaryClassification;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Precision / recall / F1 for one class.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true examples of this class.
    pub support: usize,
}

/// Evaluation of a probability model on labelled data.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub samples: usize,
    pub threshold: f64,
    pub accuracy: f64,
    /// Precision of the "accepted" class.
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Undefined when only one class is present.
    pub roc_auc: Option<f64>,
    /// Mean squared error of the probabilities (lower is better).
    pub brier: f64,
    pub rejected: ClassMetrics,
    pub accepted: ClassMetrics,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Samples:   {}", self.samples)?;
        writeln!(f, "Accuracy:  {:.3}", self.accuracy)?;
        writeln!(f, "Precision: {:.3}", self.precision)?;
        writeln!(f, "Recall:    {:.3}", self.recall)?;
        writeln!(f, "F1:        {:.3}", self.f1)?;
        match self.roc_auc {
            Some(auc) => writeln!(f, "ROC-AUC:   {auc:.3}")?,
            None => writeln!(f, "ROC-AUC:   n/a (single class)")?,
        }
        writeln!(f, "Brier:     {:.4}", self.brier)?;
        writeln!(f)?;
        writeln!(f, "{:<10} {:>9} {:>9} {:>9} {:>8}", "class", "precision", "recall", "f1", "support")?;
        for (name, m) in [("Rejected", &self.rejected), ("Accepted", &self.accepted)] {
            writeln!(
                f,
                "{:<10} {:>9.3} {:>9.3} {:>9.3} {:>8}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate `probabilities` (of acceptance) against `labels`.
///
/// A probability at or above `threshold` counts as a predicted acceptance.
/// Lengths must match; extra entries on either side are ignored.
pub fn evaluate(probabilities: &[f64], labels: &[bool], threshold: f64) -> EvaluationReport {
    let n = probabilities.len().min(labels.len());
    let probabilities = &probabilities[..n];
    let labels = &labels[..n];

    let (mut tp, mut fp, mut tn, mut fn_) = (0usize, 0usize, 0usize, 0usize);
    for (&p, &y) in probabilities.iter().zip(labels) {
        match (p >= threshold, y) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, false) => tn += 1,
            (false, true) => fn_ += 1,
        }
    }

    let accepted = class_metrics(tp, fp, fn_);
    let rejected = class_metrics(tn, fn_, fp);

    let brier = if n == 0 {
        0.0
    } else {
        probabilities
            .iter()
            .zip(labels)
            .map(|(p, &y)| (p - if y { 1.0 } else { 0.0 }).powi(2))
            .sum::<f64>()
            / n as f64
    };

    EvaluationReport {
        samples: n,
        threshold,
        accuracy: ratio(tp + tn, n),
        precision: accepted.precision,
        recall: accepted.recall,
        f1: accepted.f1,
        roc_auc: roc_auc(probabilities, labels),
        brier,
        rejected,
        accepted,
    }
}

/// linfa only starts the ROC curve at the origin when the lowest score is
/// clearly above zero.
const MIN_SCORE: f32 = 1e-6;

/// Area under the ROC curve, from linfa's trapezoidal ROC. Tied scores
/// get half credit.
///
/// `None` when either class is absent or a score is not finite. Scores are
/// compared in `f32` precision, with
/// anything below `MIN_SCORE` tied at the bottom.
pub fn roc_auc(scores: &[f64], labels: &[bool]) -> Option<f64> {
    let n = scores.len().min(labels.len());
    let labels = &labels[..n];
    let positives = labels.iter().filter(|&&y| y).count();
    if positives == 0 || positives == n || scores[..n].iter().any(|s| !s.is_finite()) {
        return None;
    }

    let probabilities: Vec<Pr> = scores[..n]
        .iter()
        .map(|&s| Pr::new_unchecked((s.clamp(0.0, 1.0) as f32).max(MIN_SCORE)))
        .collect();
    probabilities
        .as_slice()
        .roc(labels)
        .ok()
        .map(|roc| f64::from(roc.area_under_curve()))
}

fn class_metrics(true_pos: usize, false_pos: usize, false_neg: usize) -> ClassMetrics {
    let precision = ratio(true_pos, true_pos + false_pos);
    let recall = ratio(true_pos, true_pos + false_neg);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    ClassMetrics {
        precision,
        recall,
        f1,
        support: true_pos + false_neg,
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
