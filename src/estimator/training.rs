//! Model training.
//!
//! Steps:
//! 1. Stratified train/test split (seeded)
//! 2. Fit a standard linear scaler on the training rows
//! 3. Fit an L2-regularised logistic regression
//! 4. Orient the weights so the model outputs P(accepted)
//! 5. Evaluate on the held-out rows

use anyhow::{anyhow, bail, Context, Result};
use linfa::traits::{Fit, Predict, Transformer};
use linfa::Dataset;
use linfa_logistic::LogisticRegression;
use linfa_preprocessing::linear_scaling::LinearScaler;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use super::metrics::{evaluate, EvaluationReport};
use super::model::{AcceptanceModel, FeatureScaler};
use crate::config::TrainingConfig;
use crate::data::cleaning::TrainingRow;
use crate::types::{FEATURE_COUNT, FEATURE_NAMES};

/// Training parameters.
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub test_fraction: f64,
    pub seed: u64,
    pub max_iterations: u64,
    pub alpha: f64,
    /// Probability at or above which a prediction counts as "accepted".
    pub threshold: f64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self::from(&TrainingConfig::default())
    }
}

impl From<&TrainingConfig> for TrainingOptions {
    fn from(cfg: &TrainingConfig) -> Self {
        Self {
            test_fraction: cfg.test_fraction,
            seed: cfg.seed,
            max_iterations: cfg.max_iterations,
            alpha: cfg.alpha,
            threshold: 0.5,
        }
    }
}

/// Everything a training run produces.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: AcceptanceModel,
    /// Evaluation on the held-out rows (training rows if none were held out).
    pub metrics: EvaluationReport,
    pub train_rows: usize,
    pub test_rows: usize,
    pub train_acceptance_rate: f64,
    pub feature_importance: Vec<(String, f64)>,
}

/// Split row indices into (train, test), keeping the class balance of
/// `labels` in both halves. Each class keeps at least one training row.
pub fn stratified_split(labels: &[bool], test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [false, true] {
        let mut idx: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &y)| y == class)
            .map(|(i, _)| i)
            .collect();
        idx.shuffle(&mut rng);

        let n_test = ((idx.len() as f64 * test_fraction).round() as usize).min(idx.len().saturating_sub(1));
        test.extend_from_slice(&idx[..n_test]);
        train.extend_from_slice(&idx[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Train an acceptance model on cleaned rows.
pub fn train(rows: &[TrainingRow], options: &TrainingOptions) -> Result<TrainingOutcome> {
    if !(0.0..1.0).contains(&options.test_fraction) {
        bail!("test_fraction must be in [0, 1), got {}", options.test_fraction);
    }
    let accepted = rows.iter().filter(|r| r.accepted).count();
    if accepted == 0 || accepted == rows.len() {
        bail!(
            "training needs both accepted and rejected orders ({} rows, {} accepted)",
            rows.len(),
            accepted
        );
    }

    let labels: Vec<bool> = rows.iter().map(|r| r.accepted).collect();
    let (train_idx, test_idx) = stratified_split(&labels, options.test_fraction, options.seed);
    debug!(train = train_idx.len(), test = test_idx.len(), "Dataset split");

    let flat: Vec<f64> = train_idx
        .iter()
        .flat_map(|&i| rows[i].features.to_array())
        .collect();
    let records = Array2::from_shape_vec((train_idx.len(), FEATURE_COUNT), flat)
        .context("Failed to shape training matrix")?;
    let targets = Array1::from_iter(train_idx.iter().map(|&i| labels[i]));
    let dataset = Dataset::new(records, targets).with_feature_names(FEATURE_NAMES.to_vec());

    let linear = LinearScaler::standard()
        .fit(&dataset)
        .map_err(|e| anyhow!("Feature scaling failed: {e}"))?;
    let dataset = linear.transform(dataset);
    let scaler = FeatureScaler::from_linear(&linear);

    let fitted = LogisticRegression::default()
        .alpha(options.alpha)
        .max_iterations(options.max_iterations)
        .fit(&dataset)
        .map_err(|e| anyhow!("Logistic regression failed: {e}"))?;

    // linfa scores its positive class, which is the more frequent label in
    // the training targets. A zero threshold predicts that class for any row.
    let positive: Array1<bool> = fitted
        .clone()
        .set_threshold(0.0)
        .predict(&Array2::<f64>::zeros((1, FEATURE_COUNT)));
    let sign = if positive.iter().all(|&c| c) { 1.0 } else { -1.0 };
    let intercept = sign * fitted.intercept();
    let coefficients: Vec<f64> = fitted.params().iter().map(|w| sign * w).collect();
    debug!(accepted_is_positive = sign > 0.0, "Logistic weights oriented");

    let model = AcceptanceModel::new(scaler, intercept, coefficients, train_idx.len());

    let eval_idx = if test_idx.is_empty() { &train_idx } else { &test_idx };
    let mut probabilities = Vec::with_capacity(eval_idx.len());
    for &i in eval_idx {
        probabilities.push(model.score(&rows[i].features.to_array())?);
    }
    let eval_labels: Vec<bool> = eval_idx.iter().map(|&i| labels[i]).collect();
    let metrics = evaluate(&probabilities, &eval_labels, options.threshold);

    let train_accepted = train_idx.iter().filter(|&&i| labels[i]).count();
    let train_acceptance_rate = train_accepted as f64 / train_idx.len() as f64;
    let feature_importance = model.feature_importance();

    info!(
        train_rows = train_idx.len(),
        test_rows = test_idx.len(),
        accuracy = format!("{:.3}", metrics.accuracy),
        roc_auc = metrics.roc_auc.map(|a| format!("{a:.3}")).unwrap_or_else(|| "n/a".into()),
        "Model trained"
    );

    Ok(TrainingOutcome {
        model,
        metrics,
        train_rows: train_idx.len(),
        test_rows: test_idx.len(),
        train_acceptance_rate,
        feature_importance,
    })
}
