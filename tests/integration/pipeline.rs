//! End-to-end pipeline: synthetic data → CSV → cleaning → training →
//! artifact → model-backed price search → report.

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use ridebid::data::cleaning::prepare_training_rows;
    use ridebid::data::synthetic::{generate_orders, SyntheticConfig};
    use ridebid::data::{read_csv, write_csv};
    use ridebid::estimator::adapter::ModelEstimator;
    use ridebid::estimator::training::{train, TrainingOptions};
    use ridebid::estimator::AcceptanceEstimator;
    use ridebid::pricing::{PriceSearch, SearchConfig};
    use ridebid::storage::{load_report, save_report, RecommendationReport};
    use ridebid::types::{FeatureDefaults, OrderContext, PricingError};

    fn temp_dir() -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("ridebid_pipeline_{}", uuid::Uuid::new_v4()));
        p
    }

    fn path_in(dir: &PathBuf, name: &str) -> String {
        dir.join(name).to_string_lossy().to_string()
    }

    #[test]
    fn test_full_pipeline() {
        let dir = temp_dir();
        let data_path = path_in(&dir, "data/train.csv");
        let model_path = path_in(&dir, "models/acceptance_model.json");
        let report_path = path_in(&dir, "output/report.json");

        let records = generate_orders(&SyntheticConfig { rows: 1500, ..Default::default() });
        write_csv(&data_path, &records).unwrap();
        let loaded = read_csv(&data_path).unwrap();
        assert_eq!(loaded.len(), 1500);

        let (rows, cleaning) = prepare_training_rows(&loaded, 0.01);
        assert_eq!(cleaning.dropped_incomplete, 0);
        assert!(rows.len() > 1400);

        let outcome = train(&rows, &TrainingOptions::default()).unwrap();
        outcome.model.save(&model_path).unwrap();

        let estimator = ModelEstimator::from_artifact(&model_path, FeatureDefaults::default()).unwrap();
        assert_eq!(estimator.model_name(), "logistic-acceptance");

        let search = PriceSearch::new(estimator, SearchConfig::default());
        let order = OrderContext::new(300.0)
            .with_driver_rating(4.7)
            .with_distance_km(5.2)
            .with_order_hour(18);
        let rec = search.find_optimal_price(&order).unwrap();

        assert_eq!(rec.candidates.len(), 50);
        assert_eq!(rec.degraded_candidates, 0);
        assert!(rec.optimal.price >= 300.0 && rec.optimal.price <= 450.0 + 1e-9);
        assert!(rec
            .candidates
            .iter()
            .all(|c| (0.0..=1.0).contains(&c.probability)));
        // a trained model accepts cheaper bids more readily
        assert!(rec.candidates[0].probability > rec.candidates[49].probability);

        let report = RecommendationReport::from_recommendation(&order, search.estimator().model_name(), &rec);
        save_report(&report, Some(&report_path)).unwrap();
        let reloaded = load_report(Some(&report_path)).unwrap().unwrap();
        assert_eq!(reloaded.recommendation.optimal_price, rec.optimal.price);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_artifact_is_unavailable() {
        let dir = temp_dir();
        let result = ModelEstimator::from_artifact(&path_in(&dir, "missing.json"), FeatureDefaults::default());
        assert!(matches!(result, Err(PricingError::EstimatorUnavailable(_))));
    }

    #[test]
    fn test_corrupt_artifact_is_unavailable() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = path_in(&dir, "model.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = ModelEstimator::from_artifact(&path, FeatureDefaults::default());
        assert!(matches!(result, Err(PricingError::EstimatorUnavailable(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
