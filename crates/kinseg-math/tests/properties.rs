//! Property-based tests for kinseg-math numerical functions.
//!
//! Uses proptest to verify mathematical properties hold across many random inputs.

use kinseg_math::{
    argmax, guarded_ln, legendre_eval, log_sum_exp, normalize_or_uniform, symmetric_eigen,
    trapezoid, MAX_LEGENDRE_DEGREE,
};
use proptest::prelude::*;

/// Tolerance for floating point comparisons.
const TOL: f64 = 1e-9;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    if a.is_infinite() && b.is_infinite() {
        return a.signum() == b.signum();
    }
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// log_sum_exp is invariant under reordering.
    #[test]
    fn log_sum_exp_commutative(a in -100.0..100.0f64, b in -100.0..100.0f64) {
        let ab = log_sum_exp(&[a, b]);
        let ba = log_sum_exp(&[b, a]);
        prop_assert!(approx_eq(ab, ba, TOL));
    }

    /// Shifting every input by c shifts the output by c.
    #[test]
    fn log_sum_exp_shift(a in -50.0..50.0f64, b in -50.0..50.0f64, c in -50.0..50.0f64) {
        let base = log_sum_exp(&[a, b]);
        let shifted = log_sum_exp(&[a + c, b + c]);
        prop_assert!(approx_eq(shifted, base + c, TOL));
    }

    /// guarded_ln agrees with ln on the positive axis.
    #[test]
    fn guarded_ln_matches_ln(x in 1e-300..1e300f64) {
        prop_assert!(approx_eq(guarded_ln(x), x.ln(), TOL));
    }

    /// Normalized rows sum to 1 regardless of input mass.
    #[test]
    fn normalize_sums_to_one(mut row in prop::collection::vec(0.0..1e6f64, 1..16)) {
        normalize_or_uniform(&mut row);
        let sum: f64 = row.iter().sum();
        prop_assert!(approx_eq(sum, 1.0, 1e-9));
    }

    /// argmax returns an index whose value no other element exceeds.
    #[test]
    fn argmax_is_maximal(values in prop::collection::vec(-1e6..1e6f64, 1..32)) {
        let idx = argmax(&values).unwrap();
        for &v in &values {
            prop_assert!(values[idx] >= v);
        }
    }

    /// Legendre polynomials are bounded by 1 on [-1, 1].
    #[test]
    fn legendre_bounded_on_interval(degree in 0usize..=MAX_LEGENDRE_DEGREE, x in -1.0..1.0f64) {
        let value = legendre_eval(degree, x);
        prop_assert!(value.abs() <= 1.0 + 1e-12);
    }

    /// Parity: P_n(-x) = (-1)^n P_n(x).
    #[test]
    fn legendre_parity(degree in 0usize..=MAX_LEGENDRE_DEGREE, x in -1.0..1.0f64) {
        let sign = if degree % 2 == 0 { 1.0 } else { -1.0 };
        prop_assert!(approx_eq(legendre_eval(degree, -x), sign * legendre_eval(degree, x), 1e-10));
    }

    /// Trapezoidal integration is exact for affine integrands.
    #[test]
    fn trapezoid_exact_for_affine(
        a in -10.0..10.0f64,
        b in -10.0..10.0f64,
        span in 0.1..10.0f64,
    ) {
        let xs: Vec<f64> = (0..20).map(|i| span * i as f64 / 19.0).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| a * x + b).collect();
        let expected = a * span * span / 2.0 + b * span;
        prop_assert!(approx_eq(trapezoid(&xs, &ys), expected, 1e-8));
    }

    /// Eigendecomposition of A reproduces A's trace and keeps vectors unit.
    #[test]
    fn eigen_preserves_trace(
        d in prop::collection::vec(-10.0..10.0f64, 3),
        off in prop::collection::vec(-5.0..5.0f64, 3),
    ) {
        let m = vec![
            vec![d[0], off[0], off[1]],
            vec![off[0], d[1], off[2]],
            vec![off[1], off[2], d[2]],
        ];
        let eig = symmetric_eigen(&m).unwrap();
        let trace = d[0] + d[1] + d[2];
        let value_sum: f64 = eig.values.iter().sum();
        prop_assert!(approx_eq(trace, value_sum, 1e-7));
        for vector in &eig.vectors {
            let norm: f64 = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
            prop_assert!(approx_eq(norm, 1.0, 1e-7));
        }
    }

    /// Eigenvalues come back sorted in descending order.
    #[test]
    fn eigen_sorted_descending(
        d in prop::collection::vec(-10.0..10.0f64, 4),
        off in -5.0..5.0f64,
    ) {
        let n = d.len();
        let mut m = vec![vec![0.0; n]; n];
        for i in 0..n {
            m[i][i] = d[i];
            if i + 1 < n {
                m[i][i + 1] = off;
                m[i + 1][i] = off;
            }
        }
        let eig = symmetric_eigen(&m).unwrap();
        for w in eig.values.windows(2) {
            prop_assert!(w[0] >= w[1] - 1e-9);
        }
    }
}
