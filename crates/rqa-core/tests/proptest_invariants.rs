use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use rqa_core::{RescaleMode, RqaParams, RqaStatistics, analyze};

const MIN_PROPTEST_CASES: u32 = 64;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn series_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-10.0f64..10.0, 20..80)
}

fn rescale_strategy() -> impl Strategy<Value = RescaleMode> {
    prop_oneof![
        Just(RescaleMode::None),
        Just(RescaleMode::Max),
        Just(RescaleMode::Mean),
    ]
}

fn params_strategy() -> impl Strategy<Value = RqaParams> {
    (1usize..4, 1usize..4, rescale_strategy(), 0.0f64..1.5, 0usize..4, 1usize..5).prop_map(
        |(dimension, lag, rescale, radius, theiler, min_line)| {
            RqaParams::default()
                .with_embedding(dimension, lag)
                .unwrap()
                .with_rescale(rescale)
                .with_radius(radius)
                .with_theiler_window(theiler)
                .with_min_line_length(min_line)
                .unwrap()
        },
    )
}

fn in_unit_interval(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        .. ProptestConfig::default()
    })]

    #[test]
    fn ratios_are_bounded_and_entropy_non_negative(
        x in series_strategy(),
        params in params_strategy(),
    ) {
        let out = analyze(&x, None, &params);
        let s = &out.stats;
        if !out.is_ok() {
            prop_assert_eq!(s, &RqaStatistics::default());
            return Ok(());
        }
        prop_assert!(in_unit_interval(s.recurrence_rate));
        prop_assert!(in_unit_interval(s.determinism));
        prop_assert!(in_unit_interval(s.laminarity));
        prop_assert!(s.entropy >= 0.0);
        prop_assert!(s.entropy_remaining >= 0.0);
        prop_assert!(s.max_diag_line <= s.max_line_possible);
        prop_assert!(s.recurrent_points <= s.eligible_points);
        prop_assert!(s.count_diag_line * params.min_line_length.get() <= s.recurrent_points);
    }

    #[test]
    fn auto_matrix_is_symmetric_and_band_is_clear(
        x in series_strategy(),
        params in params_strategy(),
    ) {
        let out = analyze(&x, None, &params);
        let r = &out.matrix;
        prop_assert!(r.is_symmetric());
        for i in 0..r.rows() {
            for j in 0..r.cols() {
                if i.abs_diff(j) <= params.theiler_window {
                    prop_assert!(!r.is_recurrent(i, j));
                }
            }
        }
    }

    #[test]
    fn recurrence_rate_grows_with_radius(
        x in series_strategy(),
        params in params_strategy(),
        extra in 0.0f64..1.0,
    ) {
        let small = analyze(&x, None, &params);
        let large = analyze(&x, None, &params.clone().with_radius(params.radius + extra));
        prop_assert!(small.stats.recurrence_rate <= large.stats.recurrence_rate);
        prop_assert!(small.matrix.recurrence_count() <= large.matrix.recurrence_count());
    }

    #[test]
    fn analysis_is_deterministic(
        x in series_strategy(),
        params in params_strategy(),
    ) {
        prop_assert_eq!(analyze(&x, None, &params), analyze(&x, None, &params));
    }
}
