use ctxconf::{ConfigValue, Context, IntervalConfig, Key};
use proptest::prelude::*;

fn window() -> impl Strategy<Value = (i64, i64)> {
    (-50i64..50, 1i64..30).prop_map(|(begin, len)| (begin, begin + len))
}

fn paints() -> impl Strategy<Value = Vec<(i64, i64, i64)>> {
    proptest::collection::vec(
        window().prop_flat_map(|(b, e)| (Just(b), Just(e), 0i64..5)),
        0..12,
    )
}

fn build(ops: &[(i64, i64, i64)]) -> IntervalConfig {
    let mut config = IntervalConfig::new();
    for &(begin, end, value) in ops {
        config.paint(begin, end, ConfigValue::Integer(value)).unwrap();
    }
    config
}

proptest! {
    #[test]
    fn disjoint_paints_commute((a0, a1) in window(), (b0, b1) in window()) {
        prop_assume!(a1 <= b0 || b1 <= a0);

        let mut ab = IntervalConfig::new();
        ab.paint(a0, a1, "a".into()).unwrap();
        ab.paint(b0, b1, "b".into()).unwrap();

        let mut ba = IntervalConfig::new();
        ba.paint(b0, b1, "b".into()).unwrap();
        ba.paint(a0, a1, "a".into()).unwrap();

        for p in (a0..a1).chain(b0..b1) {
            prop_assert_eq!(ab.value_at(p).unwrap(), ba.value_at(p).unwrap());
        }
    }

    #[test]
    fn last_paint_wins_inside_its_window(ops in paints(), (s, e) in window(), v in 10i64..20) {
        let mut config = build(&ops);
        config.paint(s, e, ConfigValue::Integer(v)).unwrap();
        for p in s..e {
            prop_assert_eq!(config.value_at(p).unwrap(), ConfigValue::Integer(v));
        }
    }

    #[test]
    fn painted_intervals_never_overlap(ops in paints()) {
        let config = build(&ops);
        let intervals = config.intervals();
        for pair in intervals.windows(2) {
            prop_assert!(pair[0].end <= pair[1].begin, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn snapshot_restore_preserves_every_point(ops in paints()) {
        let config = build(&ops);
        let restored = IntervalConfig::from_snapshot(config.snapshot()).unwrap();
        for p in -60..90 {
            prop_assert_eq!(config.value_at(p).ok(), restored.value_at(p).ok());
        }
    }

    #[test]
    fn delete_leaves_outside_untouched(ops in paints(), (s, e) in window()) {
        let before = build(&ops);
        let mut after = before.clone();
        after.remove(&Key::Range(s, e)).unwrap();

        for p in -60..90 {
            if s <= p && p < e {
                prop_assert!(after.value_at(p).is_err());
            } else {
                prop_assert_eq!(after.value_at(p).ok(), before.value_at(p).ok());
            }
        }
    }
}
