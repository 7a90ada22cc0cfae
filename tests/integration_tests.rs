use serde_json::{Value as Json, json};
use sift_lang::{PredicateBuilder, SearchItem, compile, encode, parse};

fn people() -> Json {
    json!([
        {
            "name": "Ada Lovelace",
            "age": 36,
            "status": "active",
            "tags": ["math", "poetry"],
            "email": "ada@example.com",
            "created": "2020-03-04",
            "updated": "2021-01-01",
            "address": {"city": "London"}
        },
        {
            "name": "Alan Turing",
            "age": 41,
            "status": "archived",
            "tags": ["math", "crypto"],
            "email": null,
            "created": "2019-06-01",
            "updated": "2019-01-01",
            "address": {"city": "Wilmslow"}
        },
        {
            "name": "Grace Hopper",
            "age": 85,
            "status": "active",
            "tags": ["navy"],
            "created": "2021-12-31",
            "updated": "2022-01-01",
            "address": {"city": "Arlington"}
        }
    ])
}

fn names(docs: &[&Json]) -> Vec<String> {
    docs.iter()
        .filter_map(|doc| doc["name"].as_str())
        .map(|name| name.split(' ').next().unwrap_or(name).to_string())
        .collect()
}

fn matching(query: &str) -> Vec<String> {
    let items = parse(query).unwrap_or_else(|e| panic!("{} failed to parse: {}", query, e));
    let matcher = compile(&items).unwrap();
    let docs = people();
    let docs = docs.as_array().unwrap();
    names(&matcher.filter(docs))
}

// ============================================================================
// Matching Documents
// ============================================================================

#[test]
fn test_pair_matching() {
    let test_cases = vec![
        ("status:active", vec!["Ada", "Grace"]),
        ("status:!archived", vec!["Ada", "Grace"]),
        ("name:\"Ada Lovelace\"", vec!["Ada"]),
        ("name:a*", vec!["Ada", "Alan"]),
        ("name:?lan*", vec!["Alan"]),
        ("name:~hop", vec!["Grace"]),
        ("name:!~turing", vec!["Ada", "Grace"]),
        ("address.city:London", vec!["Ada"]),
        ("missing:x", vec![]),
    ];

    for (input, expected) in test_cases {
        assert_eq!(matching(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_comparisons_and_ranges() {
    let test_cases = vec![
        ("age:>40", vec!["Alan", "Grace"]),
        ("age:>=41", vec!["Alan", "Grace"]),
        ("age:<=36", vec!["Ada"]),
        ("age:18..40", vec!["Ada"]),
        ("age:..40", vec!["Ada"]),
        ("age:41..", vec!["Alan", "Grace"]),
        ("age:..", vec!["Ada", "Alan", "Grace"]),
        ("created:2020-01-01..2020-12-31", vec!["Ada"]),
    ];

    for (input, expected) in test_cases {
        assert_eq!(matching(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_lists_arrays_and_presence() {
    let test_cases = vec![
        ("tags:math", vec!["Ada", "Alan"]),
        ("tags:navy,poetry", vec!["Ada", "Grace"]),
        ("status:archived,gone", vec!["Alan"]),
        ("email:NULL", vec!["Alan", "Grace"]),
        ("email:*", vec!["Ada"]),
    ];

    for (input, expected) in test_cases {
        assert_eq!(matching(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_pinned_fields() {
    assert_eq!(matching("updated:>^created"), vec!["Ada", "Grace"]);
    assert_eq!(matching("updated:<^created"), vec!["Alan"]);
}

#[test]
fn test_logic() {
    let test_cases = vec![
        ("status:active AND age:>50", vec!["Grace"]),
        ("status:archived OR age:>50", vec!["Alan", "Grace"]),
        ("NOT status:active", vec!["Alan"]),
        ("status:(active OR archived) age:<40", vec!["Ada"]),
        ("(tags:navy OR tags:crypto) NOT age:>80", vec!["Alan"]),
        ("", vec!["Ada", "Alan", "Grace"]),
    ];

    for (input, expected) in test_cases {
        assert_eq!(matching(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_free_text() {
    let test_cases = vec![
        ("lovelace", vec!["Ada"]),
        ("math NOT crypto", vec!["Ada"]),
        ("\"grace hopper\"", vec!["Grace"]),
        ("wilms*", vec!["Alan"]),
    ];

    for (input, expected) in test_cases {
        assert_eq!(matching(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_nested_pair_does_not_compile() {
    let items = parse("a:b:c").unwrap();
    let err = compile(&items).unwrap_err();
    assert_eq!(err.to_string(), "cannot match pair terms against field `a`");
}

// ============================================================================
// Custom Backends
// ============================================================================

/// Renders a query as a SQL-ish WHERE clause.
struct WhereClause;

impl PredicateBuilder for WhereClause {
    type Predicate = String;
    type Error = String;

    fn pair(&mut self, field: &str, value: &SearchItem) -> Result<String, String> {
        match value.text() {
            Some(text) => Ok(format!("{} = '{}'", field, text)),
            None => Err(format!("unsupported {} for {}", value.term_name(), field)),
        }
    }

    fn term(&mut self, item: &SearchItem) -> Result<String, String> {
        Ok(format!("body LIKE '%{}%'", encode(std::slice::from_ref(item))))
    }

    fn all(&mut self, predicates: Vec<String>) -> String {
        match predicates.len() {
            1 => predicates.concat(),
            _ => format!("({})", predicates.join(" AND ")),
        }
    }

    fn any(&mut self, predicates: Vec<String>) -> String {
        format!("({})", predicates.join(" OR "))
    }

    fn negate(&mut self, predicate: String) -> String {
        format!("NOT {}", predicate)
    }
}

#[test]
fn test_custom_predicate_builder() {
    let test_cases = vec![
        ("a:1", "a = '1'"),
        ("a:1 b:2", "(a = '1' AND b = '2')"),
        ("a:1 OR b:2", "(a = '1' OR b = '2')"),
        ("NOT a:1 rust", "(NOT a = '1' AND body LIKE '%rust%')"),
    ];

    for (input, expected) in test_cases {
        let items = parse(input).unwrap();
        assert_eq!(
            sift_lang::filter::build(&items, &mut WhereClause),
            Ok(expected.to_string()),
            "Failed for input: {}",
            input
        );
    }

    let items = parse("a:1..2").unwrap();
    assert_eq!(
        sift_lang::filter::build(&items, &mut WhereClause),
        Err("unsupported range for a".to_string())
    );
}

// ============================================================================
// CLI Commands
// ============================================================================

#[cfg(feature = "cli")]
mod cli {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sift_lang::cli::{
        CheckOptions, CheckResult, CliError, execute_check, format_query, get_doc_category, parse_now,
        query_list_to_text, query_to_query_list,
    };
    use sift_lang::{DecodeOptions, EnumDef, Kind, Schema, TransformError};

    fn schema() -> Schema {
        Schema::new()
            .field("name", Kind::String)
            .field("age", Kind::Integer)
            .aliased("joined", "created", Kind::Date)
            .field("updated", Kind::Date)
            .enumeration("status", EnumDef::new("Status", ["active", "archived"]))
    }

    fn options(query: &str, schema: Option<Schema>) -> CheckOptions {
        CheckOptions {
            query: query.to_string(),
            input: Some(people().to_string()),
            schema,
            now: Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0).unwrap(),
            decode: DecodeOptions::default(),
            syntax_only: false,
        }
    }

    fn check(query: &str) -> Vec<String> {
        match execute_check(&options(query, Some(schema()))) {
            Ok(CheckResult::Matches(Json::Array(docs))) => names(&docs.iter().collect::<Vec<_>>()),
            other => panic!("{} did not produce matches: {:?}", query, other),
        }
    }

    #[test]
    fn test_check_with_schema() {
        let test_cases = vec![
            ("joined:2020", vec!["Ada"]),
            ("joined:>=2021", vec!["Grace"]),
            ("joined:<2020-01", vec!["Alan"]),
            ("joined:>@3-years-ago", vec!["Grace"]),
            ("age:>=41", vec!["Alan", "Grace"]),
            ("status:ACTIVE", vec!["Ada", "Grace"]),
            ("name:gr*", vec!["Grace"]),
            ("updated:>^joined", vec!["Ada", "Grace"]),
        ];

        for (input, expected) in test_cases {
            assert_eq!(check(input), expected, "Failed for input: {}", input);
        }
    }

    #[test]
    fn test_check_reports_cast_errors() {
        match execute_check(&options("agee:3", Some(schema()))) {
            Err(CliError::Transform(TransformError::KeyNotFound { suggestions, .. })) => {
                assert_eq!(suggestions, vec!["age"]);
            }
            other => panic!("expected unknown key, got {:?}", other),
        }
        assert!(matches!(
            execute_check(&options("age:4*", Some(schema()))),
            Err(CliError::Transform(TransformError::UnsupportedSearchTerm { .. }))
        ));
    }

    #[test]
    fn test_check_single_document() {
        let mut opts = options("status:active", None);
        opts.input = Some(json!({"status": "active"}).to_string());
        assert!(matches!(
            execute_check(&opts),
            Ok(CheckResult::Matches(Json::Object(_)))
        ));

        opts.input = Some(json!({"status": "archived"}).to_string());
        assert!(matches!(execute_check(&opts), Ok(CheckResult::Matches(Json::Null))));
    }

    #[test]
    fn test_check_syntax_only_and_missing_input() {
        let mut opts = options("a:1 OR b", None);
        opts.syntax_only = true;
        opts.input = None;
        assert!(matches!(execute_check(&opts), Ok(CheckResult::SyntaxValid)));

        opts.syntax_only = false;
        assert!(matches!(execute_check(&opts), Err(CliError::NoInput)));

        opts.input = Some("{not json".to_string());
        assert!(matches!(execute_check(&opts), Err(CliError::Json(_))));

        let opts = options("a AND", None);
        assert!(matches!(execute_check(&opts), Err(CliError::Parse(_))));
    }

    #[test]
    fn test_convert_commands() {
        assert_eq!(
            query_to_query_list("age:>=21 hello", DecodeOptions::default()).unwrap(),
            json!([{"key": "age", "op": "gte", "value": "21"}, {"value": "hello"}])
        );
        assert_eq!(
            query_list_to_text(r#"[{"key": "age", "op": "gte", "value": 21}]"#).unwrap(),
            "age:>=21"
        );
        assert!(matches!(
            query_to_query_list("a OR b", DecodeOptions::default()),
            Err(CliError::Map(_))
        ));
    }

    #[test]
    fn test_format_query() {
        assert_eq!(format_query("a  and   b", DecodeOptions::default()).unwrap(), "a AND b");
        assert!(matches!(
            format_query("((a))", DecodeOptions::default().with_max_depth(1)),
            Err(CliError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_now() {
        assert_eq!(
            parse_now("2024-05-17T14:00:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0).unwrap()
        );
        assert!(matches!(parse_now("yesterday"), Err(CliError::InvalidNow(_))));
    }

    #[test]
    fn test_doc_categories() {
        assert!(get_doc_category("dates").unwrap().contains("@"));
        assert!(matches!(get_doc_category("nope"), Err(CliError::UnknownCategory(_))));
    }
}
