use chrono::{FixedOffset, TimeZone, Utc};
use proptest::prelude::*;

use expecto::format::{format, format_one, format_pair, Presentation};
use expecto::{Record, Value};

fn rendered(value: impl Into<Value>) -> (String, Presentation) {
    format_one(&value.into())
}

#[test]
fn primitives_are_compact() {
    assert_eq!(rendered("foo"), ("'foo'".to_string(), Presentation::Compact));
    assert_eq!(rendered(7), ("7".to_string(), Presentation::Compact));
    assert_eq!(rendered(7_u32), ("7".to_string(), Presentation::Compact));
    assert_eq!(rendered(12.1), ("12.1".to_string(), Presentation::Compact));
    assert_eq!(rendered(true), ("true".to_string(), Presentation::Compact));
    assert_eq!(rendered(()), ("nil".to_string(), Presentation::Compact));
}

#[test]
fn timestamps_keep_their_offset() {
    let utc = Utc.with_ymd_and_hms(2020, 3, 4, 8, 32, 34).unwrap();
    assert_eq!(rendered(utc).0, "2020-03-04T08:32:34Z");

    let plus_one = FixedOffset::east_opt(3600).unwrap();
    let local = plus_one.with_ymd_and_hms(2020, 3, 4, 8, 32, 34).unwrap();
    assert_eq!(rendered(local).0, "2020-03-04T08:32:34+01:00");
}

#[test]
fn errors_are_quoted_messages() {
    let err = std::io::Error::new(std::io::ErrorKind::Other, "xyz");
    assert_eq!(rendered(Value::error(&err)).0, "'xyz'");
    assert_eq!(rendered(Value::nil_error()).0, "nil");
}

#[test]
fn references_render_their_referent() {
    assert_eq!(rendered(None::<i32>).0, "<nil>");
    assert_eq!(rendered(Some("foo")).0, "'foo'");
}

#[test]
fn containers_are_yaml_blocks() {
    assert_eq!(
        rendered(vec!["a", "b"]),
        ("- a\n- b".to_string(), Presentation::Block)
    );

    let map = std::collections::HashMap::from([("b", 15), ("a", 2)]);
    assert_eq!(rendered(map), ("a: 2\nb: 15".to_string(), Presentation::Block));

    let record = Record::new("Struct").field("Foo", "Bar").field("Count", 0);
    assert_eq!(
        rendered(record.clone()),
        ("Count: 0\nFoo: Bar".to_string(), Presentation::Block)
    );
    assert_eq!(rendered(Some(record)).0, "Count: 0\nFoo: Bar");
}

#[test]
fn record_with_function_falls_back_to_plain_text() {
    let record = Record::new("unm")
        .field("F", Value::function("callback"))
        .field("X", "Foo");
    assert_eq!(
        rendered(record),
        ("{<func callback> Foo}".to_string(), Presentation::Compact)
    );
}

#[test]
fn one_block_side_promotes_the_pair() {
    let (e, a, p) = format_pair(&Value::from(vec![1]), &Value::from("x"));
    assert_eq!(p, Presentation::Block);
    assert_eq!(e, "- 1");
    assert_eq!(a, "x");
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::Uint),
        any::<bool>().prop_map(Value::Bool),
        "[a-z \\n]{0,12}".prop_map(Value::Text),
        Just(Value::Null),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|v| Value::Sequence(Some(v))),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4).prop_map(Value::from),
        ]
    })
}

proptest! {
    #[test]
    fn formatting_is_idempotent(v in value()) {
        prop_assert_eq!(format(&v), format(&v.clone()));
    }

    #[test]
    fn count_matches_code_points(s in "\\PC{0,24}") {
        let expected = s.chars().count();
        prop_assert_eq!(Value::from(s).len(), Some(expected));
    }

    #[test]
    fn count_matches_sequence_length(items in prop::collection::vec(any::<i32>(), 0..16)) {
        let expected = items.len();
        prop_assert_eq!(Value::from(items).len(), Some(expected));
    }
}
