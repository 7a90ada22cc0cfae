//! Matching decoded queries against JSON documents.
//!
//! [`JsonEvaluator`] is a [`PredicateBuilder`] that compiles a query into a
//! [`Matcher`], which can then be run against any number of
//! `serde_json::Value` documents.
//!
//! | query            | matches when                                     |
//! |------------------|--------------------------------------------------|
//! | `name:jo`        | `name` equals `jo`                               |
//! | `name:~jo`       | `name` contains `jo`, ignoring case              |
//! | `name:jo*`       | `name` matches the glob, ignoring case           |
//! | `age:18..65`     | `age` lies in the inclusive range                |
//! | `tag:a,b`        | `tag` equals either value                        |
//! | `email:*`        | `email` is present and not null                  |
//! | `email:NULL`     | `email` is absent or null                        |
//! | `updated:>^created` | `updated` is after the `created` field        |
//! | `jo`             | any string anywhere in the document contains it  |
//!
//! When the document field holds an array, a positive test passes if any
//! element passes.

use std::cmp::Ordering;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Number, Value as Json};
use thiserror::Error;

use crate::ast::{CmpOp, ItemKind, SearchItem};
use crate::filter::{PredicateBuilder, build};
use crate::temporal::{self, Bound};
use crate::value::Value;

/// Errors raised while compiling a query into a matcher.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    /// The value shape has no meaning for a document field
    #[error("cannot match {term} terms against field `{field}`")]
    Unsupported { field: String, term: &'static str },

    /// A glob could not be compiled
    #[error("invalid pattern: {0}")]
    Pattern(String),
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone)]
pub enum Operand {
    Literal(Json),
    /// Another field of the same document
    Field(String),
}

/// A test applied to the value found in one slot of a document.
#[derive(Debug, Clone)]
pub enum Test {
    Present,
    Missing,
    Compare(CmpOp, Operand),
    /// Inclusive range; `None` is an open side
    Between(Option<Operand>, Option<Operand>),
    Glob(Regex),
    All(Vec<Test>),
    Any(Vec<Test>),
    Not(Box<Test>),
}

#[derive(Debug, Clone)]
pub enum Matcher {
    All(Vec<Matcher>),
    Any(Vec<Matcher>),
    Not(Box<Matcher>),
    /// Test the value at a field path (dots descend into objects)
    Field { path: String, test: Test },
    /// Pass when any scalar anywhere in the document passes
    AnyField(Test),
}

impl Matcher {
    pub fn matches(&self, doc: &Json) -> bool {
        match self {
            Matcher::All(matchers) => matchers.iter().all(|m| m.matches(doc)),
            Matcher::Any(matchers) => matchers.iter().any(|m| m.matches(doc)),
            Matcher::Not(inner) => !inner.matches(doc),
            Matcher::Field { path, test } => test.check(lookup(doc, path), doc),
            Matcher::AnyField(test) => {
                let mut leaves = Vec::new();
                collect_leaves(doc, &mut leaves);
                leaves.into_iter().any(|leaf| test.check(Some(leaf), doc))
            }
        }
    }

    /// Documents from `docs` that match, in order.
    pub fn filter<'a>(&self, docs: &'a [Json]) -> Vec<&'a Json> {
        docs.iter().filter(|doc| self.matches(doc)).collect()
    }
}

/// Compile a decoded query into a matcher.
pub fn compile(items: &[SearchItem]) -> Result<Matcher, EvalError> {
    build(items, &mut JsonEvaluator)
}

#[derive(Debug, Default)]
pub struct JsonEvaluator;

impl PredicateBuilder for JsonEvaluator {
    type Predicate = Matcher;
    type Error = EvalError;

    fn pair(&mut self, field: &str, value: &SearchItem) -> Result<Matcher, EvalError> {
        Ok(Matcher::Field {
            path: field.to_string(),
            test: compile_test(field, CmpOp::Eq, value)?,
        })
    }

    fn term(&mut self, item: &SearchItem) -> Result<Matcher, EvalError> {
        let test = match &item.kind {
            ItemKind::Word(_) | ItemKind::Quote(_) | ItemKind::Value(_) => compile_test("", CmpOp::Fuzz, item)?,
            _ => compile_test("", CmpOp::Eq, item)?,
        };
        Ok(Matcher::AnyField(test))
    }

    fn all(&mut self, predicates: Vec<Matcher>) -> Matcher {
        match <[Matcher; 1]>::try_from(predicates) {
            Ok([only]) => only,
            Err(predicates) => Matcher::All(predicates),
        }
    }

    fn any(&mut self, predicates: Vec<Matcher>) -> Matcher {
        Matcher::Any(predicates)
    }

    fn negate(&mut self, predicate: Matcher) -> Matcher {
        Matcher::Not(Box::new(predicate))
    }
}

fn is_negative(op: CmpOp) -> bool {
    matches!(op, CmpOp::Neq | CmpOp::NFuzz)
}

fn positive(op: CmpOp) -> CmpOp {
    match op {
        CmpOp::Neq => CmpOp::Eq,
        CmpOp::NFuzz => CmpOp::Fuzz,
        other => other,
    }
}

/// Compile `value` as the right-hand side of `op`.
fn compile_test(field: &str, op: CmpOp, value: &SearchItem) -> Result<Test, EvalError> {
    if is_negative(op) {
        let inner = compile_test(field, positive(op), value)?;
        return Ok(Test::Not(Box::new(inner)));
    }

    let unsupported = |term| EvalError::Unsupported {
        field: field.to_string(),
        term,
    };

    let test = match &value.kind {
        ItemKind::Null => Test::Missing,
        ItemKind::Wildcard => Test::Present,
        ItemKind::Infinity => Test::Present,
        ItemKind::AnyChar | ItemKind::Partial(_) => glob(std::slice::from_ref(value))?,
        ItemKind::Word(s) | ItemKind::Quote(s) => Test::Compare(op, Operand::Literal(Json::String(s.clone()))),
        ItemKind::Value(v) if v.is_partial() => partial_test(op, v),
        ItemKind::Value(v) => Test::Compare(op, Operand::Literal(to_json(v))),
        ItemKind::Pin(inner) => Test::Compare(op, Operand::Field(pin_name(inner))),
        ItemKind::Cmp { op: inner_op, value } => {
            if op != CmpOp::Eq {
                return Err(unsupported("nested comparison"));
            }
            compile_test(field, *inner_op, value)?
        }
        ItemKind::Range { start, end } => Test::Between(bound(start, Bound::Start), bound(end, Bound::End)),
        ItemKind::List(items) => Test::Any(compile_all(field, op, items)?),
        ItemKind::Group(items) => match items.as_slice() {
            [only] => compile_test(field, op, only)?,
            _ => Test::All(compile_all(field, op, items)?),
        },
        ItemKind::And(left, right) => Test::All(vec![
            compile_test(field, op, left)?,
            Test::All(compile_all(field, op, right)?),
        ]),
        ItemKind::Or(left, right) => Test::Any(vec![
            compile_test(field, op, left)?,
            Test::All(compile_all(field, op, right)?),
        ]),
        ItemKind::Not(inner) => Test::Not(Box::new(compile_test(field, op, inner)?)),
        ItemKind::Pair { .. } => return Err(unsupported("pair")),
    };
    Ok(test)
}

fn compile_all(field: &str, op: CmpOp, items: &[SearchItem]) -> Result<Vec<Test>, EvalError> {
    items.iter().map(|item| compile_test(field, op, item)).collect()
}

/// A partial date or time left unmaterialized: compare against the span
/// it covers.
fn partial_test(op: CmpOp, value: &Value) -> Test {
    let at = |bound| temporal::materialize(value, bound).map(|v| Operand::Literal(to_json(&v)));
    match op {
        CmpOp::Gt | CmpOp::Lte => at(Bound::End).map_or(Test::Missing, |end| Test::Compare(op, end)),
        CmpOp::Gte | CmpOp::Lt => at(Bound::Start).map_or(Test::Missing, |start| Test::Compare(op, start)),
        _ => Test::Between(at(Bound::Start), at(Bound::End)),
    }
}

fn bound(side: &SearchItem, bound: Bound) -> Option<Operand> {
    match &side.kind {
        ItemKind::Infinity => None,
        ItemKind::Word(s) | ItemKind::Quote(s) => Some(Operand::Literal(Json::String(s.clone()))),
        ItemKind::Value(v) => temporal::materialize(v, bound).map(|v| Operand::Literal(to_json(&v))),
        ItemKind::Pin(inner) => Some(Operand::Field(pin_name(inner))),
        _ => None,
    }
}

fn pin_name(inner: &SearchItem) -> String {
    match &inner.kind {
        ItemKind::Word(s) | ItemKind::Quote(s) => s.clone(),
        ItemKind::Value(v) => v.to_text(),
        _ => String::new(),
    }
}

/// Case-insensitive anchored regex for a run of text and `*`/`?` markers.
fn glob(items: &[SearchItem]) -> Result<Test, EvalError> {
    let mut pattern = String::from("(?is)^");
    push_glob(items, &mut pattern);
    pattern.push('$');
    Regex::new(&pattern)
        .map(Test::Glob)
        .map_err(|e| EvalError::Pattern(e.to_string()))
}

fn push_glob(items: &[SearchItem], pattern: &mut String) {
    for item in items {
        match &item.kind {
            ItemKind::Wildcard => pattern.push_str(".*"),
            ItemKind::AnyChar => pattern.push('.'),
            ItemKind::Word(s) | ItemKind::Quote(s) => pattern.push_str(&regex::escape(s)),
            ItemKind::Value(v) => pattern.push_str(&regex::escape(&v.to_text())),
            ItemKind::Partial(inner) => push_glob(inner, pattern),
            _ => {}
        }
    }
}

/// JSON form of a cast value, used for comparisons.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Boolean(b) => Json::Bool(*b),
        Value::Integer(n) => Json::Number((*n).into()),
        Value::Float(n) => Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::Decimal(d) => d
            .to_f64()
            .and_then(Number::from_f64)
            .map_or_else(|| Json::String(d.to_string()), Json::Number),
        other => Json::String(other.to_text()),
    }
}

impl Test {
    fn check(&self, slot: Option<&Json>, doc: &Json) -> bool {
        match self {
            Test::Present => slot.is_some_and(|v| !v.is_null()),
            Test::Missing => slot.is_none_or(Json::is_null),
            Test::All(tests) => tests.iter().all(|t| t.check(slot, doc)),
            Test::Any(tests) => tests.iter().any(|t| t.check(slot, doc)),
            Test::Not(inner) => !inner.check(slot, doc),
            _ => match slot {
                Some(Json::Array(elements)) => elements.iter().any(|e| self.check_scalar(e, doc)),
                Some(value) => self.check_scalar(value, doc),
                None => false,
            },
        }
    }

    fn check_scalar(&self, value: &Json, doc: &Json) -> bool {
        match self {
            Test::Compare(op, operand) => {
                let Some(rhs) = operand.resolve(doc) else {
                    return false;
                };
                compare_with(*op, value, rhs)
            }
            Test::Between(start, end) => {
                let after_start = match start {
                    None => true,
                    Some(operand) => operand
                        .resolve(doc)
                        .and_then(|rhs| compare(value, rhs))
                        .is_some_and(Ordering::is_ge),
                };
                let before_end = match end {
                    None => true,
                    Some(operand) => operand
                        .resolve(doc)
                        .and_then(|rhs| compare(value, rhs))
                        .is_some_and(Ordering::is_le),
                };
                after_start && before_end
            }
            Test::Glob(regex) => text_of(value).is_some_and(|text| regex.is_match(&text)),
            other => other.check(Some(value), doc),
        }
    }
}

impl Operand {
    fn resolve<'a>(&'a self, doc: &'a Json) -> Option<&'a Json> {
        match self {
            Operand::Literal(value) => Some(value),
            Operand::Field(path) => lookup(doc, path).filter(|v| !v.is_null()),
        }
    }
}

fn compare_with(op: CmpOp, lhs: &Json, rhs: &Json) -> bool {
    match op {
        CmpOp::Fuzz | CmpOp::NFuzz => {
            let found = match (text_of(lhs), text_of(rhs)) {
                (Some(haystack), Some(needle)) => haystack.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            };
            found == (op == CmpOp::Fuzz)
        }
        _ => {
            let Some(ordering) = compare(lhs, rhs) else {
                return op == CmpOp::Neq;
            };
            match op {
                CmpOp::Gt => ordering.is_gt(),
                CmpOp::Gte => ordering.is_ge(),
                CmpOp::Lt => ordering.is_lt(),
                CmpOp::Lte => ordering.is_le(),
                CmpOp::Eq => ordering.is_eq(),
                _ => ordering.is_ne(),
            }
        }
    }
}

/// Order a document value against a query value. Strings that hold numbers
/// or booleans compare with their parsed form.
fn compare(lhs: &Json, rhs: &Json) -> Option<Ordering> {
    match (lhs, rhs) {
        (Json::Number(a), Json::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Json::Number(a), Json::String(b)) => a.as_f64()?.partial_cmp(&b.parse::<f64>().ok()?),
        (Json::String(a), Json::Number(b)) => a.parse::<f64>().ok()?.partial_cmp(&b.as_f64()?),
        (Json::String(a), Json::String(b)) => Some(a.cmp(b)),
        (Json::Bool(a), Json::Bool(b)) => Some(a.cmp(b)),
        (Json::Bool(a), Json::String(b)) => Some(a.cmp(&b.to_ascii_lowercase().parse::<bool>().ok()?)),
        (Json::String(a), Json::Bool(b)) => Some(a.to_ascii_lowercase().parse::<bool>().ok()?.cmp(b)),
        (Json::Null, Json::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn text_of(value: &Json) -> Option<String> {
    match value {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Value at `path`: an exact key first, then dot-separated object keys.
pub fn lookup<'a>(doc: &'a Json, path: &str) -> Option<&'a Json> {
    if let Some(value) = doc.get(path) {
        return Some(value);
    }
    path.split('.').try_fold(doc, |current, segment| current.get(segment))
}

fn collect_leaves<'a>(value: &'a Json, leaves: &mut Vec<&'a Json>) {
    match value {
        Json::Object(map) => map.values().for_each(|v| collect_leaves(v, leaves)),
        Json::Array(items) => items.iter().for_each(|v| collect_leaves(v, leaves)),
        Json::Null => {}
        scalar => leaves.push(scalar),
    }
}
