// tests/encoder_tests.rs

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sift_lang::ast::{CmpOp, SearchItem};
use sift_lang::encoder::{QueryPrinter, encode, write_items};
use sift_lang::parser::parse;
use sift_lang::temporal::{PartialDate, PartialDateTime, PartialTime};
use sift_lang::value::Value;

// ============================================================================
// Round Trip
// ============================================================================

#[test]
fn test_round_trip_corpus() {
    let corpus = vec![
        "hello",
        "hello world",
        "\"hello world\"",
        r#""say \"hi\"""#,
        r#""v1\.2""#,
        r#""two\nlines""#,
        r#""back\\slash""#,
        "name:jo",
        "name:\"Jo Smith\"",
        "\"full name\":jo",
        "age:>21",
        "age:>=21",
        "age:<65",
        "age:<=65",
        "name:=jo",
        "status:!closed",
        "title:~rust",
        "title:!~draft",
        ">=(A,B)",
        "status:!(closed,archived)",
        "a:..",
        "a:x..",
        "a:..y",
        "a:x..y",
        "1..10",
        "created:2020..2021-06",
        "tag:a,b,c",
        "tag:\"x y\",z",
        "name:jo*",
        "name:*jo?",
        "code:A?-1",
        "\"van \"*",
        "*",
        "?",
        "email:NULL",
        "email:*",
        "a:b:c",
        "updated:>^created",
        "^\"other field\"",
        "a AND b",
        "a AND b c",
        "a OR b AND c",
        "NOT a",
        "NOT a AND b",
        "(a OR b) c",
        "x:(a OR (b AND c))",
        "((a))",
        "@3-days-ago",
    ];

    for input in corpus {
        let items = parse(input).unwrap_or_else(|e| panic!("{} failed to parse: {}", input, e));
        assert_eq!(encode(&items), input, "Failed for input: {}", input);
    }
}

#[test]
fn test_canonical_normalization() {
    let test_cases = vec![
        ("null", "NULL"),
        ("a   b", "a b"),
        ("  a\n\tb  ", "a b"),
        ("a and b", "a AND b"),
        ("a or not b", "a OR NOT b"),
        (r#""a.b""#, r#""a\.b""#),
        (r#""\u00e9t\u00e9""#, "\"été\""),
        (r#""line\u2028break""#, r#""line\u2028break""#),
        ("tag:a,", "tag:a"),
    ];

    for (input, expected) in test_cases {
        let items = parse(input).unwrap();
        assert_eq!(encode(&items), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_encoding_is_idempotent() {
    for input in ["a  and   (b OR null)", "x:\"a.b\"..", "NOT   NOT a"] {
        let once = encode(&parse(input).unwrap());
        let twice = encode(&parse(&once).unwrap());
        assert_eq!(once, twice, "Failed for input: {}", input);
    }
}

// ============================================================================
// Built Trees
// ============================================================================

#[test]
fn test_encode_built_items() {
    let test_cases = vec![
        (SearchItem::range(SearchItem::infinity(), SearchItem::infinity()), ".."),
        (SearchItem::cmp(CmpOp::NFuzz, SearchItem::word("x")), "!~x"),
        (SearchItem::list(vec![SearchItem::word("a"), SearchItem::quote("b c")]), "a,\"b c\""),
        (SearchItem::group(vec![]), "()"),
        (SearchItem::quote("AND"), "\"AND\""),
        (
            SearchItem::pair(SearchItem::word("k"), SearchItem::pin(SearchItem::word("other"))),
            "k:^other",
        ),
    ];

    for (item, expected) in test_cases {
        assert_eq!(encode(std::slice::from_ref(&item)), expected, "Failed for item: {:?}", item);
    }
}

#[test]
fn test_encode_values() {
    let at = Utc.with_ymd_and_hms(2020, 3, 4, 18, 26, 12).unwrap();
    let test_cases = vec![
        (Value::Boolean(true), "true"),
        (Value::Boolean(false), "false"),
        (Value::Integer(-4), "-4"),
        (Value::Float(2.5), "2.5"),
        (Value::Decimal(Decimal::new(150, 2)), "1.5"),
        (Value::String("hello world".to_string()), "\"hello world\""),
        (Value::Atom("active".to_string()), "active"),
        (Value::Date(NaiveDate::from_ymd_opt(2020, 3, 4).unwrap()), "2020-03-04"),
        (Value::Time(NaiveTime::from_hms_opt(18, 26, 12).unwrap()), "\"18:26:12\""),
        (Value::UtcDateTime(at), "\"2020-03-04T18:26:12Z\""),
        (Value::NaiveDateTime(at.naive_utc()), "\"2020-03-04T18:26:12\""),
        (Value::PartialDate(PartialDate::new(2020, None).unwrap()), "2020"),
        (Value::PartialDate(PartialDate::new(2020, Some(3)).unwrap()), "2020-03"),
        (Value::PartialTime(PartialTime::new(9, None).unwrap()), "09"),
        (Value::PartialTime(PartialTime::new(9, Some(5)).unwrap()), "\"09:05\""),
        (
            Value::PartialDateTime(PartialDateTime::new(2020, Some(3), Some(4), None, None).unwrap()),
            "2020-03-04",
        ),
    ];

    for (value, expected) in test_cases {
        let item = SearchItem::value(value.clone());
        assert_eq!(encode(&[item]), expected, "Failed for value: {:?}", value);
    }
}

#[test]
fn test_quoted_values_decode_back() {
    let at = Utc.with_ymd_and_hms(2020, 3, 4, 18, 26, 12).unwrap();
    let item = SearchItem::pair(
        SearchItem::word("at"),
        SearchItem::cmp(CmpOp::Lte, SearchItem::value(Value::UtcDateTime(at))),
    );
    let text = encode(&[item]);
    assert_eq!(text, "at:<=\"2020-03-04T18:26:12Z\"");
    assert!(parse(&text).is_ok());
}

// ============================================================================
// Writers
// ============================================================================

#[test]
fn test_write_items_into_sink() {
    let items = parse("a:1 b").unwrap();
    let mut out = String::from("> ");
    write_items(&items, &mut out).unwrap();
    assert_eq!(out, "> a:1 b");

    let mut out = String::new();
    QueryPrinter::new(&mut out).print(&items[0]).unwrap();
    assert_eq!(out, "a:1");
}
