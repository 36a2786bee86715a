//! Property-based tests for the solver, the least-squares fitter and the interpolator.

use proptest::prelude::*;

use core_temps::domain::{CoreId, CoreSeries, PivotRule, TemperatureSeries};
use core_temps::error::FitError;
use core_temps::fit::{FitOptions, fit_all, interpolate_core};

const EXACT: FitOptions = FitOptions {
    pivot: PivotRule::Greater,
    digits: 0,
};

/// Strictly increasing offsets: a start plus positive integer steps.
fn time_axis(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (0u32..600, prop::collection::vec(1u32..=60, 1..max_len)).prop_map(|(start, steps)| {
        let mut t = start as f64;
        let mut out = vec![t];
        for s in steps {
            t += s as f64;
            out.push(t);
        }
        out
    })
}

fn axis_and_temps(max_len: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    time_axis(max_len).prop_flat_map(|times| {
        let n = times.len();
        (Just(times), prop::collection::vec(20.0f64..100.0, n))
    })
}

fn single_core(times: Vec<f64>, temps: Vec<f64>) -> TemperatureSeries {
    TemperatureSeries::from_columns(times, vec![temps])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_solution_satisfies_normal_equations((times, temps) in axis_and_temps(30)) {
        // Property: Xᵗ(Xβ − y) ≈ 0 relative to the size of Xᵗy.
        let sum_y: f64 = temps.iter().sum();
        let sum_ty: f64 = times.iter().zip(&temps).map(|(t, y)| t * y).sum();
        let scale = sum_y.hypot(sum_ty);

        let results = fit_all(&single_core(times, temps), &EXACT);
        let rec = results[0].as_ref().unwrap();
        prop_assert!(
            rec.quality.gradient_norm <= 1e-7 * scale,
            "gradient {} too large for scale {}", rec.quality.gradient_norm, scale
        );
    }

    #[test]
    fn prop_exact_line_is_recovered(
        times in time_axis(30),
        a in 20.0f64..80.0,
        b in -0.5f64..0.5,
    ) {
        let temps: Vec<f64> = times.iter().map(|t| a + b * t).collect();
        let series = single_core(times, temps);

        let exact = fit_all(&series, &EXACT);
        let rec = exact[0].as_ref().unwrap();
        prop_assert!((rec.intercept - a).abs() <= 1e-6 * (1.0 + a.abs()));
        prop_assert!((rec.slope - b).abs() <= 1e-8 + 1e-6 * b.abs());

        // Four significant digits: relative error at most half a unit in the 4th digit.
        let rounded = fit_all(&series, &FitOptions::default());
        let rec = rounded[0].as_ref().unwrap();
        prop_assert!((rec.intercept - a).abs() <= 5e-4 * a.abs() + 1e-6);
        prop_assert!((rec.slope - b).abs() <= 5e-4 * b.abs() + 1e-8);
    }

    #[test]
    fn prop_fitting_is_deterministic((times, temps) in axis_and_temps(20)) {
        let series = single_core(times, temps);
        let first = fit_all(&series, &FitOptions::default());
        let second = fit_all(&series, &FitOptions::default());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_pivot_rules_agree_on_non_negative_times((times, temps) in axis_and_temps(20)) {
        // XᵗX has only positive entries here, so both rules pick the same rows.
        let series = single_core(times, temps);
        let greater = fit_all(&series, &FitOptions { pivot: PivotRule::Greater, digits: 4 });
        let magnitude = fit_all(&series, &FitOptions { pivot: PivotRule::Magnitude, digits: 4 });
        prop_assert_eq!(greater, magnitude);
    }

    #[test]
    fn prop_segments_reproduce_endpoints((times, temps) in axis_and_temps(40)) {
        let core = CoreSeries { core: CoreId(0), temps: temps.clone() };
        let out = interpolate_core(&times, &core).unwrap();

        prop_assert_eq!(out.segments.len(), times.len() - 1);
        prop_assert!(out.skipped.is_empty());
        for seg in &out.segments {
            let i = seg.segment;
            prop_assert_eq!((seg.start, seg.end), (times[i], times[i + 1]));
            prop_assert!((seg.eval(times[i]) - temps[i]).abs() <= 1e-8);
            prop_assert!((seg.eval(times[i + 1]) - temps[i + 1]).abs() <= 1e-8);
        }
    }

    #[test]
    fn prop_repeated_offset_is_a_degenerate_segment(
        (times, temps) in axis_and_temps(20),
        pick in any::<prop::sample::Index>(),
    ) {
        // Duplicate one offset: that pair becomes a zero-width segment.
        let dup = pick.index(times.len());
        let mut times = times;
        let mut temps = temps;
        times.insert(dup + 1, times[dup]);
        temps.insert(dup + 1, temps[dup] + 1.0);

        let core = CoreSeries { core: CoreId(1), temps };
        let out = interpolate_core(&times, &core).unwrap();
        prop_assert_eq!(out.segments.len(), times.len() - 2);
        prop_assert_eq!(
            out.skipped,
            vec![FitError::DegenerateSegment { core: CoreId(1), segment: dup, x: times[dup] }]
        );
    }
}

#[test]
fn two_samples_least_squares_matches_the_segment() {
    let series = TemperatureSeries::from_columns(vec![0.0, 30.0], vec![vec![50.0, 56.0]]);
    let fits = fit_all(&series, &FitOptions::default());
    let rec = fits[0].as_ref().unwrap();
    let seg = &interpolate_core(&series.times, &series.cores[0]).unwrap().segments[0];

    assert_eq!((rec.intercept, rec.slope), (50.0, 0.2));
    assert!((seg.intercept - rec.intercept).abs() < 1e-12);
    assert!((seg.slope - rec.slope).abs() < 1e-12);
}
