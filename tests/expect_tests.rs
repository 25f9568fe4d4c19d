use std::collections::HashMap;
use std::io;

use expecto::{expect, expect_error, Config, RecordingReporter, Record, Value};
use predicates::prelude::*;
use predicates::str::{contains, starts_with};

// ============================================================================
// TO_BE
// ============================================================================

#[test]
fn equal_strings_pass() {
    let t = RecordingReporter::new();
    expect(&t, "foo", "xxx").to_be("xxx");
    assert!(t.is_clean());
}

#[test]
fn string_mismatch_is_quoted_and_compact() {
    let t = RecordingReporter::new();
    expect(&t, "foo", "xxx").to_be("yyy");
    assert_eq!(t.errors(), ["expected foo to be 'yyy' but it is 'xxx'"]);
    assert!(t.fatals().is_empty());
}

#[test]
fn multiline_strings_are_shown_as_blocks() {
    let t = RecordingReporter::new();
    expect(&t, "foo", "A\nB\nC").to_be("a\nb\nc");
    assert_eq!(
        t.errors(),
        ["expected foo to be\n    a\n    b\n    c\nbut it is\n    A\n    B\n    C"]
    );
}

#[test]
fn float_mismatch() {
    let t = RecordingReporter::new();
    expect(&t, "liters", 3.45).to_be(3.45);
    expect(&t, "liters", 3.45).to_be(3.45002);
    assert_eq!(t.errors(), ["expected liters to be 3.45002 but it is 3.45"]);
}

#[test]
fn float_widths_are_distinct_types() {
    let t = RecordingReporter::new();
    expect(&t, "liters", 3.45).to_be(3.45_f32);
    assert_eq!(
        t.errors(),
        ["expected liters to be of type float32 but it is of type float64"]
    );
}

#[test]
fn type_mismatch_short_circuits_value_comparison() {
    let t = RecordingReporter::new();
    let inventory: HashMap<String, Vec<String>> = HashMap::new();
    expect(&t, "inventory", inventory).to_be(Vec::<i32>::new());
    assert_eq!(
        t.errors(),
        ["expected inventory to be of type sequence but it is of type mapping"]
    );
}

#[test]
fn reference_is_not_its_referent_type() {
    let t = RecordingReporter::new();
    expect(&t, "ref", Some(vec![1, 2])).to_be(vec![1, 2]);
    assert_eq!(
        t.errors(),
        ["expected ref to be of type sequence but it is of type reference"]
    );
}

#[test]
fn maps_render_sorted_blocks() {
    let t = RecordingReporter::new();
    let actual = HashMap::from([("peter", 3), ("johan", 2)]);
    let expected = HashMap::from([("peter", 3), ("johan", 1)]);
    expect(&t, "names", actual).to_be(expected);
    assert_eq!(
        t.errors(),
        ["expected names to be\n    johan: 1\n    peter: 3\nbut it is\n    johan: 2\n    peter: 3"]
    );
}

#[test]
fn arrays_compare_element_wise() {
    let t = RecordingReporter::new();
    expect(&t, "array", ["a", "b", "c"]).to_be(["a", "b", "c"]);
    assert!(t.is_clean());

    expect(&t, "array", ["a", "b", "c"]).to_be(["a", "b", "s"]);
    assert_eq!(
        t.errors(),
        ["expected array to be\n    - a\n    - b\n    - s\nbut it is\n    - a\n    - b\n    - c"]
    );
}

#[test]
fn records_compare_field_by_field() {
    let t = RecordingReporter::new();
    let actual = Record::new("Struct").field("Foo", "Bar").field("Count", 0);
    let expected = Record::new("Struct").field("Foo", "Baz").field("Count", 0);
    expect(&t, "struct", actual).to_be(expected);
    assert_eq!(
        t.errors(),
        ["expected struct to be\n    Count: 0\n    Foo: Baz\nbut it is\n    Count: 0\n    Foo: Bar"]
    );
}

#[test]
fn records_ignore_field_order() {
    let t = RecordingReporter::new();
    let actual = Record::new("P").field("x", 1).field("y", 2);
    expect(&t, "p", actual.clone()).to_be(Record::new("P").field("y", 2).field("x", 1));
    expect(&t, "p", actual).not_to_be(Record::new("P").field("y", 2).field("x", 2));
    assert!(t.is_clean(), "unexpected failures: {:?}", t.messages());
}

#[test]
fn absent_values_are_interchangeable() {
    let t = RecordingReporter::new();
    expect(&t, "vsv", None::<i32>).to_be(());
    expect(&t, "nil", ()).to_be(());
    expect(&t, "err", Value::nil_error()).to_be(Value::Sequence(None));
    expect(&t, "map", Value::Mapping(None)).to_be(None::<String>);
    expect(&t, "nested", Some(None::<i32>)).to_be(());
    assert!(t.is_clean(), "unexpected failures: {:?}", t.messages());
}

#[test]
fn absent_and_empty_containers_differ() {
    let t = RecordingReporter::new();
    expect(&t, "list", Value::Sequence(None)).to_be(Vec::<i32>::new());
    let message = t.errors().remove(0);
    let shape = starts_with("expected list to be").and(contains("but it is")).and(contains("nil"));
    assert!(shape.eval(message.as_str()), "got {:?}", message);
}

#[test]
fn colored_diff_makes_whitespace_visible() {
    let t = RecordingReporter::new();
    let dashes = "-".repeat(40);
    expect(&t, "spaces", format!(" \t\n{}", dashes))
        .with_config(Config::colored_diff())
        .to_be(dashes.as_str());
    assert_eq!(
        t.errors(),
        [format!("expected spaces to be\n\x1b[31m․↦↵\n\x1b[0m{}", dashes)]
    );
}

#[test]
fn colored_diff_marks_both_sides() {
    let t = RecordingReporter::new();
    expect(&t, "story", "the quick brown fox jumps over the lazy cat")
        .with_config(Config::colored_diff())
        .to_be("the quick brown fox jumps over the lazy dog");
    let message = t.errors().remove(0);
    let shape = starts_with("expected story to be\n")
        .and(contains("\x1b[31m"))
        .and(contains("\x1b[32m"))
        .and(contains("the quick brown fox"));
    assert!(shape.eval(message.as_str()), "got {:?}", message);
}

#[test]
fn short_values_skip_the_diff() {
    let t = RecordingReporter::new();
    expect(&t, "foo", "xxx")
        .with_config(Config::colored_diff())
        .to_be("yyy");
    assert_eq!(t.errors(), ["expected foo to be 'yyy' but it is 'xxx'"]);
}

// ============================================================================
// NOT_TO_BE
// ============================================================================

#[test]
fn not_to_be_reports_equal_values() {
    let t = RecordingReporter::new();
    expect(&t, "foo", "xxx").not_to_be("yyy");
    assert!(t.is_clean());

    expect(&t, "foo", "xxx").not_to_be("xxx");
    expect(&t, "list", vec![1, 2]).not_to_be(vec![1, 2]);
    assert_eq!(
        t.errors(),
        [
            "expected foo to NOT be 'xxx'",
            "expected list to NOT be\n    - 1\n    - 2",
        ]
    );
}

// ============================================================================
// PREDICATES
// ============================================================================

#[test]
fn count_uses_code_points() {
    let t = RecordingReporter::new();
    expect(&t, "potato", "日本のジャガイモ").to_count(8);
    expect(&t, "array", ["a", "b", "c"]).to_count(3);
    expect(&t, "bytes", Value::bytes(vec![1_u8, 2])).to_count(2);
    assert!(t.is_clean());

    expect(&t, "foo", "xxx").to_count(1);
    assert_eq!(
        t.errors(),
        ["expected foo to have 1 elements but it has 3 elements"]
    );
}

#[test]
fn count_on_scalar_is_fatal_and_stops_the_chain() {
    let t = RecordingReporter::new();
    let e = expect(&t, "foo", 2).to_count(2).to_be(3);
    assert!(e.is_aborted());
    assert_eq!(
        t.fatals(),
        ["foo is not a datatype with a length (sequence, mapping, queue, bytes, string)"]
    );
    assert!(t.errors().is_empty());
}

#[test]
fn about_compares_within_delta() {
    let t = RecordingReporter::new();
    expect(&t, "liters", 1.92).to_be_about(2.0, 0.1);
    expect(&t, "count", 7).to_be_about(7.2, 0.5);
    expect(&t, "small", 1.5_f32).to_be_about(1.5, 0.0);
    assert!(t.is_clean());

    expect(&t, "liters", 1.92).to_be_about(2.0, 0.01);
    assert_eq!(t.errors(), ["expected liters to be 2±0.01 but it is 1.92"]);
}

#[test]
fn about_on_text_is_fatal() {
    let t = RecordingReporter::new();
    expect(&t, "liters", "two").to_be_about(2.0, 0.1);
    assert_eq!(t.fatals().len(), 1);
}

#[test]
fn prefix_and_suffix() {
    let t = RecordingReporter::new();
    expect(&t, "greeting", "hello world")
        .to_have_prefix("hello")
        .to_have_suffix("world");
    assert!(t.is_clean());

    expect(&t, "greeting", "hello world")
        .to_have_prefix("world")
        .to_have_suffix("hello");
    assert_eq!(
        t.errors(),
        [
            "expected greeting to have prefix 'world' but it is 'hello world'",
            "expected greeting to have suffix 'hello' but it is 'hello world'",
        ]
    );
}

#[test]
fn prefix_on_number_is_fatal() {
    let t = RecordingReporter::new();
    expect(&t, "n", 12).to_have_prefix("1");
    assert_eq!(t.fatals(), ["to_have_prefix must only be called on a string value"]);
}

// ============================================================================
// ACCESSORS
// ============================================================================

#[test]
fn error_message_is_extracted() {
    let t = RecordingReporter::new();
    let err = io::Error::new(io::ErrorKind::Other, "I am the error message");
    let dyn_err: &dyn std::error::Error = &err;
    expect_error(&t, Some(dyn_err))
        .message()
        .to_be("I am the error message");
    expect(&t, "error", Value::error(&err))
        .message()
        .to_be("I am the error message");
    expect_error(&t, None).message().to_be("");
    assert!(t.is_clean());
}

#[test]
fn derived_names_appear_in_messages() {
    let t = RecordingReporter::new();
    expect(&t, "int slice", vec![1, 2, 3]).first().to_be(2);
    expect(&t, "int slice", vec![1, 2, 3]).last().to_be(2);
    expect(&t, "int slice", vec![1, 2, 3]).at(-2).to_be(5);
    assert_eq!(
        t.errors(),
        [
            "expected first element of int slice to be 2 but it is 1",
            "expected last element of int slice to be 2 but it is 3",
            "expected int slice[-2] to be 5 but it is 2",
        ]
    );
}

#[test]
fn nil_has_the_empty_message() {
    let t = RecordingReporter::new();
    expect(&t, "nothing", ()).message().to_be("");
    assert!(t.is_clean(), "unexpected failures: {:?}", t.messages());
}

#[test]
fn first_of_empty_sequence_is_fatal() {
    let t = RecordingReporter::new();
    let e = expect(&t, "list", Vec::<i32>::new()).first().to_be(1);
    assert!(e.is_aborted());
    assert_eq!(t.fatals(), ["list is empty, it has no first element"]);
}

#[test]
fn message_on_int_is_fatal() {
    let t = RecordingReporter::new();
    expect(&t, "int", 0).message().to_be("0");
    assert_eq!(t.fatals(), ["message must only be called on an error value"]);
    assert!(t.errors().is_empty());
}

#[test]
fn string_elements_are_characters() {
    let t = RecordingReporter::new();
    expect(&t, "string", "Alabama").first().to_be("A");
    expect(&t, "potato", "日本のジャガイモ").last().to_be("モ");
    expect(&t, "bytes", Value::bytes(vec![65_u8, 66])).at(1).to_be(66_u8);
    assert!(t.is_clean(), "unexpected failures: {:?}", t.messages());
}

#[test]
fn empty_and_out_of_bounds_access_is_fatal() {
    let t = RecordingReporter::new();
    expect(&t, "empty", Vec::<i32>::new()).first().to_be(1);
    expect(&t, "list", vec![1, 2]).at(2).to_be(1);
    expect(&t, "list", vec![1, 2]).at(-3).to_be(1);
    expect(&t, "n", 5).last();
    assert_eq!(t.fatals().len(), 4);
    assert!(t.errors().is_empty());
}

#[test]
fn serializable_host_values_are_accepted() {
    let t = RecordingReporter::new();
    let host = serde_json::json!({ "b": [1, 2], "a": "x" });
    let value = Value::from_serialize(&host).expect("json converts");
    expect(&t, "host", value).to_be(Value::from_serialize(&host).expect("json converts"));
    assert!(t.is_clean());
}
