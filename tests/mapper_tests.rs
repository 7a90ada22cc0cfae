// tests/mapper_tests.rs

use chrono::NaiveDate;
use serde_json::json;
use sift_lang::ast::SearchItem;
use sift_lang::mapper::{
    MapError, QueryItem, QueryValue, query_list_from_json, query_list_to_search_list,
    search_list_to_query_list,
};
use sift_lang::value::Value;
use sift_lang::{encode, parse};

fn round_trip(input: &str) -> String {
    let items = parse(input).unwrap();
    let list = search_list_to_query_list(&items).unwrap();
    let json = serde_json::to_string(&list).unwrap();
    let list = query_list_from_json(&json).unwrap();
    encode(&query_list_to_search_list(&list).unwrap())
}

// ============================================================================
// Round Trip
// ============================================================================

#[test]
fn test_round_trip_through_json() {
    let corpus = vec![
        "hello",
        "\"hello world\"",
        "\"plain\"",
        "\"AND\"",
        "name:jo",
        "name:\"Jo Smith\"",
        "\"full name\":jo",
        "\"abc\":x",
        "\"abc\":\"x\"",
        "age:>21",
        "age:>=21",
        "title:!~draft",
        ">=(A,B)",
        "status:!(closed,archived)",
        "a:..",
        "a:x..",
        "a:..y",
        "a:x..y",
        "tag:a,b,c",
        "name:jo*",
        "code:A?-1",
        "\"van \"*",
        "*",
        "email:NULL",
        "updated:>^created",
        "^\"other field\"",
        "x:(a b)",
        "@3-days-ago",
        "hello name:jo age:<65",
    ];

    for input in corpus {
        assert_eq!(round_trip(input), input, "Failed for input: {}", input);
    }
}

#[test]
fn test_quoted_keys_stay_quoted() {
    for input in ["\"abc\":x", "\"abc\":>=1", "\"full name\":jo"] {
        let items = parse(input).unwrap();
        let list = search_list_to_query_list(&items).unwrap();
        let json = serde_json::to_string(&list).unwrap();
        let back = query_list_to_search_list(&query_list_from_json(&json).unwrap()).unwrap();
        assert_eq!(back, items, "Failed for input: {}", input);
    }

    let list = search_list_to_query_list(&parse("\"abc\":x abc:x").unwrap()).unwrap();
    assert_eq!(
        serde_json::to_value(&list).unwrap(),
        json!([
            {"key": {"$quote": "abc"}, "value": "x"},
            {"key": "abc", "value": "x"}
        ])
    );
}

#[test]
fn test_single_item_list_survives() {
    assert_eq!(round_trip("tag:a,"), "tag:a");
    let list = search_list_to_query_list(&parse("tag:a,").unwrap()).unwrap();
    assert_eq!(
        serde_json::to_value(&list).unwrap(),
        json!([{"key": "tag", "op": "in", "value": ["a"]}])
    );
}

// ============================================================================
// JSON Shape
// ============================================================================

#[test]
fn test_query_list_json_shape() {
    let items = parse("name:jo* age:>=21 tags:a,b \"free text\" \"plain\" d:1..").unwrap();
    let list = search_list_to_query_list(&items).unwrap();
    assert_eq!(
        serde_json::to_value(&list).unwrap(),
        json!([
            {"key": "name", "value": {"$partial": ["jo", {"$wildcard": true}]}},
            {"key": "age", "op": "gte", "value": "21"},
            {"key": "tags", "op": "in", "value": ["a", "b"]},
            {"value": "free text"},
            {"value": {"$quote": "plain"}},
            {"key": "d", "value": {"$range": ["1", {"$infinity": true}]}}
        ])
    );
}

#[test]
fn test_typed_values_map_to_json() {
    let items = vec![
        SearchItem::pair(SearchItem::word("active"), SearchItem::value(Value::Boolean(true))),
        SearchItem::pair(SearchItem::word("age"), SearchItem::value(Value::Integer(30))),
        SearchItem::pair(SearchItem::word("score"), SearchItem::value(Value::Float(0.5))),
        SearchItem::pair(
            SearchItem::word("born"),
            SearchItem::value(Value::Date(NaiveDate::from_ymd_opt(2020, 3, 4).unwrap())),
        ),
    ];
    let list = search_list_to_query_list(&items).unwrap();
    assert_eq!(
        serde_json::to_value(&list).unwrap(),
        json!([
            {"key": "active", "value": true},
            {"key": "age", "value": 30},
            {"key": "score", "value": 0.5},
            {"key": "born", "value": "2020-03-04"}
        ])
    );
}

#[test]
fn test_query_list_from_json() {
    let list = query_list_from_json(
        r#"[
            {"key": "age", "op": "gte", "value": 21},
            {"value": "free text"},
            {"key": "name", "value": {"$partial": ["jo", {"$wildcard": true}]}},
            {"key": "gone", "value": null},
            {"key": "tags", "op": "in", "value": ["a", "b c"]}
        ]"#,
    )
    .unwrap();
    assert_eq!(list[0].value, QueryValue::Integer(21));

    let items = query_list_to_search_list(&list).unwrap();
    assert_eq!(
        encode(&items),
        "age:>=21 \"free text\" name:jo* gone:NULL tags:a,\"b c\""
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_logical_items_unsupported() {
    let test_cases = vec![
        ("a AND b", "and"),
        ("a OR b", "or"),
        ("NOT a", "not"),
        ("a:b:c", "pair"),
    ];

    for (input, expected) in test_cases {
        match search_list_to_query_list(&parse(input).unwrap()) {
            Err(MapError::Unsupported { term }) => assert_eq!(term, expected, "Failed for input: {}", input),
            other => panic!("expected unsupported for {}, got {:?}", input, other),
        }
    }
}

#[test]
fn test_in_requires_list() {
    let list: Vec<QueryItem> = serde_json::from_value(json!([{"key": "a", "op": "in", "value": "x"}])).unwrap();
    assert!(matches!(query_list_to_search_list(&list), Err(MapError::Invalid(_))));
}

#[test]
fn test_invalid_json() {
    assert!(matches!(query_list_from_json("[{\"key\": 1}]"), Err(MapError::Json(_))));
    assert!(matches!(query_list_from_json("not json"), Err(MapError::Json(_))));
}
