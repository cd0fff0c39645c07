// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn int(v: i64) -> ConfigValue {
    ConfigValue::Integer(v)
}

fn map(pairs: &[(&str, ConfigValue)]) -> ConfigValue {
    let mut m = IndexMap::new();
    for (k, v) in pairs {
        m.insert(k.to_string(), v.clone());
    }
    ConfigValue::Mapping(m)
}

#[test]
fn equal_mappings_compare_equal_regardless_of_key_order() {
    let a = map(&[("a", int(1)), ("b", int(2))]);
    let b = map(&[("b", int(2)), ("a", int(1))]);
    assert_eq!(a, b);
}

#[test]
fn differing_scalar_is_unequal() {
    let a = map(&[("a", int(1))]);
    let b = map(&[("a", int(2))]);
    assert_ne!(a, b);
}

#[test]
fn added_key_is_unequal() {
    let a = map(&[("a", int(1))]);
    let b = map(&[("a", int(1)), ("b", int(2))]);
    assert_ne!(a, b);
}

#[test]
fn removed_key_is_unequal() {
    let a = map(&[("a", int(1)), ("b", int(2))]);
    let b = map(&[("a", int(1))]);
    assert_ne!(a, b);
}

#[test]
fn sequence_length_change_is_unequal() {
    let a = ConfigValue::Sequence(vec![int(1), int(2)]);
    let b = ConfigValue::Sequence(vec![int(1), int(2), int(3)]);
    assert_ne!(a, b);
}

#[test]
fn nested_mapping_recurses() {
    let a = map(&[("c", map(&[("c1", int(-1)), ("c2", int(3))]))]);
    let b = map(&[("c", map(&[("c1", int(-1)), ("c2", int(3))]))]);
    assert_eq!(a, b);

    let c = map(&[("c", map(&[("c1", int(-1)), ("c2", int(4))]))]);
    assert_ne!(a, c);
}

#[test]
fn bound_callables_compare_by_target_and_bound_args() {
    let p1 = ConfigValue::BoundCallable {
        target: "f1".into(),
        bound_args: vec![ConfigValue::String("p11".into())],
    };
    let p1_bis = ConfigValue::BoundCallable {
        target: "f1".into(),
        bound_args: vec![ConfigValue::String("p11".into())],
    };
    let p2 = ConfigValue::BoundCallable {
        target: "f1".into(),
        bound_args: vec![ConfigValue::String("p12".into())],
    };
    assert_eq!(p1, p1_bis);
    assert_ne!(p1, p2);
}

#[test]
fn bound_callable_equal_inside_nested_structures() {
    // Mirrors tests/test_compare.py: partials embedded in nested mappings
    // and sequences compare equal by target + bound prefix.
    let p11 = ConfigValue::BoundCallable {
        target: "f1".into(),
        bound_args: vec![ConfigValue::String("p11".into())],
    };
    let p11_bis = ConfigValue::BoundCallable {
        target: "f1".into(),
        bound_args: vec![ConfigValue::String("p11".into())],
    };

    let a11 = map(&[(
        "2",
        map(&[
            ("f", p11.clone()),
            ("3", ConfigValue::Sequence(vec![int(1), int(2), p11])),
        ]),
    )]);
    let a12 = map(&[(
        "2",
        map(&[
            ("f", p11_bis.clone()),
            ("3", ConfigValue::Sequence(vec![int(1), int(2), p11_bis])),
        ]),
    )]);
    assert_eq!(a11, a12);
}

#[test]
fn override_merge_recurses_and_override_wins() {
    let base = map(&[
        ("a", int(1)),
        ("b", int(10)),
        ("c", map(&[("c1", int(-1)), ("c2", int(3))])),
    ]);
    let over = map(&[("a", int(2)), ("c", map(&[("c1", int(4))]))]);

    let merged = base.merged_with(&over);
    let expected = map(&[
        ("a", int(2)),
        ("b", int(10)),
        ("c", map(&[("c1", int(4)), ("c2", int(3))])),
    ]);
    assert_eq!(merged, expected);
}

proptest::proptest! {
    #[test]
    fn structural_equality_is_reflexive(values in proptest::collection::vec(0i64..100, 0..10)) {
        let seq = ConfigValue::Sequence(values.into_iter().map(ConfigValue::Integer).collect());
        assert_eq!(seq, seq.clone());
    }
}
