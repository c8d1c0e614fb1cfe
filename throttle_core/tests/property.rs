use proptest::prelude::*;
use throttle_core::{SensorRange, Zone};

prop_compose! {
    /// Any valid range: max >= 3, dead zone in [2, max), pwm max >= 1.
    fn range_strategy()(
        max_value in 3u16..4096,
        dz_frac in 0.0f64..1.0,
        pwm_max in 1u16..1024,
    ) -> SensorRange {
        let span = (max_value - 2) as f64;
        let dead_zone_size = 2 + (dz_frac * span) as u16;
        let dead_zone_size = dead_zone_size.min(max_value - 1);
        SensorRange::new(max_value, dead_zone_size, pwm_max).unwrap()
    }
}

proptest! {
    // The same-zone assumption in magnitude_grows_with_distance_from_center
    // rejects ~5/6 of inputs, which overruns the default budget of 1024.
    #![proptest_config(ProptestConfig {
        max_global_rejects: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn zones_partition_the_domain(range in range_strategy(), frac in 0.0f64..=1.0) {
        let raw = (frac * range.max_value() as f64) as u16;
        let zone = range.classify(raw);
        // Every in-range sample lands in exactly one real zone, determined
        // by the bounds.
        prop_assert_ne!(zone, Zone::Unknown);
        let expected = if raw < range.dead_zone_lower() {
            Zone::Negative
        } else if raw > range.dead_zone_upper() {
            Zone::Positive
        } else {
            Zone::DeadZone
        };
        prop_assert_eq!(zone, expected);
    }

    #[test]
    fn bounds_invariant_holds(range in range_strategy()) {
        prop_assert!(range.dead_zone_lower() >= 1);
        prop_assert!(range.dead_zone_lower() <= range.mid_value());
        prop_assert!(range.mid_value() <= range.dead_zone_upper());
        prop_assert!(range.dead_zone_upper() < range.max_value());
    }

    #[test]
    fn magnitude_stays_in_pwm_range(range in range_strategy(), raw in 0u16..8192) {
        let cmd = range.command_for(range.classify(raw), raw, false);
        prop_assert!(cmd.magnitude() <= range.pwm_max());
    }

    #[test]
    fn magnitude_grows_with_distance_from_center(range in range_strategy(), fa in 0.0f64..=1.0, fb in 0.0f64..=1.0) {
        // Within one side, whichever sample is further from the dead zone
        // never drives weaker.
        let a = (fa * range.max_value() as f64) as u16;
        let b = (fb * range.max_value() as f64) as u16;
        let (za, zb) = (range.classify(a), range.classify(b));
        prop_assume!(za == zb && za != Zone::DeadZone);
        let ma = range.command_for(za, a, false).magnitude();
        let mb = range.command_for(zb, b, false).magnitude();
        match za {
            Zone::Positive => {
                if a <= b { prop_assert!(ma <= mb); } else { prop_assert!(mb <= ma); }
            }
            Zone::Negative => {
                if a <= b { prop_assert!(ma >= mb); } else { prop_assert!(mb >= ma); }
            }
            _ => unreachable!(),
        }
    }
}
