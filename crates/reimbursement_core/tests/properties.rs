//! Property tests for feature derivation, rounding and caching

use proptest::prelude::*;
use reimbursement_core::features::{derive, derive_residual, quarter_bucket};
use reimbursement_core::{round_currency, FeatureVector, ScoreCache};

proptest! {
    #[test]
    fn quarter_is_floor_division(index in -100_000i64..100_000) {
        let q = quarter_bucket(index);
        prop_assert!(q * 250 <= index);
        prop_assert!(index < (q + 1) * 250);
    }

    #[test]
    fn residual_shares_primary_columns(
        days in 0.0f64..30.0,
        miles in -100.0f64..2000.0,
        receipts in -100.0f64..3000.0,
        index in -1000i64..1000,
    ) {
        let primary = derive(days, miles, receipts, index);
        let residual = derive_residual(days, miles, receipts, index);
        let p = primary.as_slice();
        let r = residual.as_slice();
        prop_assert_eq!(&p[..5], &r[..5]);
        prop_assert_eq!(p[9], r[5]);
        prop_assert!(p[0] >= 1.0);
    }

    #[test]
    fn rounding_is_within_half_a_cent(value in -10_000.0f64..10_000.0) {
        let rounded = round_currency(value);
        prop_assert!((rounded - value).abs() <= 0.005 + 1e-9);
        prop_assert_eq!(round_currency(rounded), rounded);
    }

    #[test]
    fn cache_never_exceeds_capacity(
        capacity in 0usize..16,
        keys in proptest::collection::vec(0u8..32, 0..200),
    ) {
        let mut cache = ScoreCache::new(capacity);
        for key in keys {
            let fv = FeatureVector::new(vec![key as f64]);
            if cache.get(&fv).is_none() {
                cache.insert(fv.clone(), key as f64);
            }
            prop_assert!(cache.len() <= capacity);
            if capacity > 0 {
                prop_assert!(cache.contains(&fv));
            }
        }
    }
}
