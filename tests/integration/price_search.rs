//! Price search properties with stub estimators.

#[cfg(test)]
mod tests {
    use ridebid::pricing::grid::markup_grid;
    use ridebid::pricing::{PriceSearch, SearchConfig};
    use ridebid::types::{OrderContext, PricingError};

    use crate::stub_estimator::{ConstantStub, CountingStub, LinearStub, TableStub};

    fn scenario_order() -> OrderContext {
        OrderContext::new(300.0)
            .with_driver_rating(4.7)
            .with_distance_km(5.2)
            .with_order_hour(18)
    }

    fn sweep(min_markup: f64, max_markup: f64, steps: usize, floor: f64) -> SearchConfig {
        SearchConfig {
            min_markup,
            max_markup,
            steps,
            safe_probability_floor: floor,
            deadline: None,
        }
    }

    #[test]
    fn test_candidates_follow_grid() {
        let config = sweep(0.0, 0.5, 50, 0.7);
        let search = PriceSearch::new(LinearStub { slope: 0.5 }, config);
        let rec = search.find_optimal_price(&scenario_order()).unwrap();

        let grid = markup_grid(0.0, 0.5, 50).unwrap();
        assert_eq!(rec.candidates.len(), grid.len());
        for (c, m) in rec.candidates.iter().zip(&grid) {
            assert_eq!(c.markup, *m);
            assert_eq!(c.price, 300.0 * (1.0 + m));
            assert_eq!(c.expected_revenue, c.price * c.probability);
        }
        assert!(rec.candidates.windows(2).all(|w| w[0].markup < w[1].markup));
    }

    #[test]
    fn test_optimal_is_argmax_and_safe_meets_floor() {
        for (slope, floor) in [(0.5, 0.7), (0.8, 0.9), (1.5, 0.6), (2.0, 0.99)] {
            let search = PriceSearch::new(LinearStub { slope }, sweep(0.0, 0.5, 50, floor));
            let rec = search.find_optimal_price(&scenario_order()).unwrap();

            assert!(rec
                .candidates
                .iter()
                .all(|c| rec.optimal.expected_revenue >= c.expected_revenue));
            assert!(rec.safe.probability >= floor || rec.safe == rec.optimal);
            if rec.safe_meets_floor {
                assert!(rec
                    .candidates
                    .iter()
                    .filter(|c| c.probability >= floor)
                    .all(|c| rec.safe.expected_revenue >= c.expected_revenue));
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let search = PriceSearch::new(LinearStub { slope: 0.8 }, sweep(0.0, 0.5, 50, 0.7));
        let a = search.find_optimal_price(&scenario_order()).unwrap();
        let b = search.find_optimal_price(&scenario_order()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tie_prefers_lower_price() {
        // 100 * 0.5 == 200 * 0.25
        let stub = TableStub {
            table: vec![(100.0, 0.5), (200.0, 0.25)],
        };
        let search = PriceSearch::new(stub, sweep(0.0, 1.0, 2, 0.1));
        let rec = search.find_optimal_price(&OrderContext::new(100.0)).unwrap();
        assert_eq!(rec.candidates[0].expected_revenue, rec.candidates[1].expected_revenue);
        assert_eq!(rec.optimal.price, 100.0);
        assert_eq!(rec.safe.price, 100.0);
    }

    #[test]
    fn test_identical_probability_zero_revenue_tie() {
        let search = PriceSearch::new(ConstantStub::scored(0.0), sweep(0.0, 0.5, 10, 0.7));
        let rec = search.find_optimal_price(&scenario_order()).unwrap();
        assert_eq!(rec.optimal.markup, 0.0);
        assert!(!rec.safe_meets_floor);
        assert_eq!(rec.safe, rec.optimal);
    }

    #[test]
    fn test_single_point_sweep() {
        let search = PriceSearch::new(LinearStub { slope: 0.5 }, sweep(0.0, 0.0, 1, 0.7));
        let rec = search.find_optimal_price(&scenario_order()).unwrap();
        assert_eq!(rec.candidates.len(), 1);
        assert_eq!(rec.optimal.price, 300.0);
        assert_eq!(rec.optimal, rec.safe);
        assert!(rec.safe_meets_floor);
    }

    #[test]
    fn test_equal_bounds_repeat_first_candidate() {
        let search = PriceSearch::new(LinearStub { slope: 0.5 }, sweep(0.2, 0.2, 5, 0.7));
        let rec = search.find_optimal_price(&scenario_order()).unwrap();

        assert_eq!(rec.candidates.len(), 5);
        let first = rec.candidates[0];
        assert!(rec.candidates.iter().all(|c| *c == first));
        assert_eq!(first.markup, 0.2);
        assert_eq!(first.price, 300.0 * (1.0 + 0.2));
        // first wins every tie
        assert_eq!(rec.optimal, first);
        assert_eq!(rec.safe, rec.optimal);
        assert!(rec.safe_meets_floor);
    }

    #[test]
    fn test_scenario_matches_closed_form() {
        // revenue 300 (1 + m)(1 - m/2) peaks at m = 0.5
        let search = PriceSearch::new(LinearStub { slope: 0.5 }, sweep(0.0, 0.5, 50, 0.7));
        let rec = search.find_optimal_price(&scenario_order()).unwrap();
        let step = 0.5 / 49.0;
        assert!((rec.optimal.markup - 0.5).abs() <= step + 1e-12);
        assert!(rec.safe.probability >= 0.7);
    }

    #[test]
    fn test_scenario_interior_maximum() {
        // Same curve on a wider sweep puts the peak strictly inside.
        let search = PriceSearch::new(LinearStub { slope: 0.5 }, sweep(0.0, 1.0, 50, 0.7));
        let rec = search.find_optimal_price(&scenario_order()).unwrap();
        let step = 1.0 / 49.0;
        assert!(rec.optimal.markup > 0.0 && rec.optimal.markup < 1.0);
        assert!((rec.optimal.markup - 0.5).abs() <= step);
        // p >= 0.7 needs m <= 0.6
        assert!(rec.safe.markup <= 0.6 + 1e-12);
    }

    #[test]
    fn test_invalid_inputs_make_no_queries() {
        let cases = [
            (OrderContext::new(300.0), sweep(0.0, 0.5, 0, 0.7)),
            (OrderContext::new(300.0), sweep(0.5, 0.1, 50, 0.7)),
            (OrderContext::new(0.0), sweep(0.0, 0.5, 50, 0.7)),
            (OrderContext::new(-10.0), sweep(0.0, 0.5, 50, 0.7)),
            (scenario_order().with_driver_rating(f64::NAN), sweep(0.0, 0.5, 50, 0.7)),
            (scenario_order().with_distance_km(-3.0), sweep(0.0, 0.5, 50, 0.7)),
            (scenario_order().with_distance_km(f64::INFINITY), sweep(0.0, 0.5, 50, 0.7)),
        ];
        for (order, config) in cases {
            let search = PriceSearch::new(CountingStub::new(LinearStub { slope: 0.5 }), config);
            let err = search.find_optimal_price(&order).unwrap_err();
            assert!(matches!(err, PricingError::InvalidConfiguration(_)), "got {err:?}");
            assert_eq!(search.estimator().calls.get(), 0);
        }
    }

    #[test]
    fn test_degraded_estimator_still_recommends() {
        let search = PriceSearch::new(ConstantStub::neutral(), sweep(0.0, 0.5, 50, 0.7));
        let rec = search.find_optimal_price(&scenario_order()).unwrap();

        assert_eq!(rec.degraded_candidates, 50);
        assert!(rec.is_degraded());
        assert_eq!(rec.optimal.markup, 0.5);
        assert_eq!(rec.safe, rec.optimal);
        assert!(!rec.safe_meets_floor);
    }

    #[test]
    fn test_missing_features_still_search() {
        let search = PriceSearch::new(LinearStub { slope: 0.8 }, SearchConfig::default());
        let rec = search.find_optimal_price(&OrderContext::new(250.0)).unwrap();
        assert_eq!(rec.base_price, 250.0);
        assert_eq!(rec.candidates.len(), 50);
    }
}
