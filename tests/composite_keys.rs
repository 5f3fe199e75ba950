use ctxconf::{shared, subcontext, ConfigError, ConfigValue, Context, DictConfig, IntervalConfig, Key};

fn ranges() -> IntervalConfig {
    IntervalConfig::from_label_map([("0-10", "low"), ("10-20", "high")]).unwrap()
}

fn scope_with_ranges() -> DictConfig {
    let mut scope = DictConfig::new();
    scope.insert("name", "detector");
    scope.insert("ranges", ranges());
    scope
}

#[test]
fn test_composite_read_matches_nested_lookup() {
    let scope = scope_with_ranges();
    let nested = ranges();

    assert_eq!(
        scope.get(&["ranges".into(), Key::Point(5)]).unwrap(),
        nested.lookup(&Key::Point(5)).unwrap()
    );
    assert_eq!(
        scope.get(&["ranges".into(), Key::name("5-15")]).unwrap(),
        ConfigValue::List(vec!["low".into(), "high".into()])
    );
}

#[test]
fn test_composite_write_mutates_nested_in_place() {
    let mut scope = scope_with_ranges();
    scope
        .set(&["ranges".into(), Key::Range(0, 10)], "painted".into())
        .unwrap();

    assert_eq!(
        scope.get(&["ranges".into(), Key::Point(5)]).unwrap(),
        ConfigValue::from("painted")
    );
    assert_eq!(
        scope.get(&["ranges".into(), Key::Point(15)]).unwrap(),
        ConfigValue::from("high")
    );
    assert_eq!(
        scope.lookup(&"name".into()).unwrap(),
        ConfigValue::from("detector")
    );
}

#[test]
fn test_composite_write_delegates_to_owning_parent() {
    let base = shared(scope_with_ranges());
    let mut child = subcontext(&base);
    child.configure(&"name".into(), "override".into()).unwrap();

    child
        .set(&["ranges".into(), Key::Range(20, 30)], "extra".into())
        .unwrap();

    // The write landed in the base scope, which owns "ranges"
    assert_eq!(
        base.borrow().get(&["ranges".into(), Key::Point(25)]).unwrap(),
        ConfigValue::from("extra")
    );
    assert!(!child.has_local(&"ranges".into()));
    assert_eq!(
        base.borrow().lookup(&"name".into()).unwrap(),
        ConfigValue::from("detector")
    );
}

#[test]
fn test_composite_write_without_owner_fails() {
    let mut scope = DictConfig::new();
    let err = scope
        .set(&["missing".into(), Key::Point(1)], 1i64.into())
        .unwrap_err();
    assert!(matches!(err, ConfigError::KeyNotDefined(ref path) if path == "(missing, 1)"));
}

#[test]
fn test_composite_read_through_scalar_is_type_mismatch() {
    let scope = scope_with_ranges();
    let err = scope.get(&["name".into(), Key::Point(1)]).unwrap_err();
    assert!(matches!(err, ConfigError::TypeMismatch { .. }));
}

#[test]
fn test_composite_delete_creates_gap() {
    let mut scope = scope_with_ranges();
    scope
        .delete(&["ranges".into(), Key::name("3-7")])
        .unwrap();

    assert!(matches!(
        scope.get(&["ranges".into(), Key::Point(5)]),
        Err(ConfigError::NotFound(_))
    ));
    assert!(scope.contains(&["ranges".into(), Key::Point(2)]).unwrap());
    assert!(!scope.contains(&["ranges".into(), Key::Point(5)]).unwrap());
}

#[test]
fn test_containment_through_scalar_is_type_mismatch() {
    let scope = scope_with_ranges();
    assert!(matches!(
        scope.contains(&["name".into(), Key::Point(1)]),
        Err(ConfigError::TypeMismatch { .. })
    ));
}

#[test]
fn test_three_level_path() {
    let mut inner = DictConfig::new();
    inner.insert("bands", ranges());
    let mut outer = DictConfig::new();
    outer.insert("sensor", inner);

    let path = ["sensor".into(), "bands".into(), Key::Point(12)];
    assert_eq!(outer.get(&path).unwrap(), ConfigValue::from("high"));

    outer.set(&path[..2], IntervalConfig::new().into()).unwrap();
    assert!(!outer.contains(&path).unwrap());
}

#[test]
fn test_keys_mix_local_and_inherited() {
    let base = shared(scope_with_ranges());
    let mut child = subcontext(&base);
    child.configure(&"mode".into(), "fast".into()).unwrap();

    let keys: Vec<Key> = child.keys().into_iter().collect();
    assert_eq!(
        keys,
        vec![Key::name("mode"), Key::name("name"), Key::name("ranges")]
    );
}
