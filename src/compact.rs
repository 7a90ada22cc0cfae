//! Logical compaction.
//!
//! The decoder produces a flat run of items and `AND`/`OR`/`NOT` markers.
//! Compaction folds it from the right:
//!
//! ```text
//! [a, AND, b, c]        => [And(a, [b, c])]
//! [a, AND, b, OR, c]    => [And(a, [Or(b, [c])])]
//! [NOT, a, b]           => [Not(a), b]
//! [NOT, a, OR, b]       => [Or(Not(a), [b])]
//! ```
//!
//! `AND`/`OR` take everything to their right as the right operand; `NOT`
//! binds the single following term. Groups are compacted when they are
//! decoded, so an operand that is a group is already compacted here.

use std::iter::Peekable;
use std::vec::IntoIter;

use crate::ast::{Position, SearchItem};
use crate::parser::ParseError;

#[derive(Debug, Clone)]
pub(crate) enum Part {
    Item(SearchItem),
    And(Position),
    Or(Position),
    Not(Position),
}

pub(crate) fn compact(parts: Vec<Part>) -> Result<Vec<SearchItem>, ParseError> {
    compact_rest(&mut parts.into_iter().peekable())
}

fn compact_rest(parts: &mut Peekable<IntoIter<Part>>) -> Result<Vec<SearchItem>, ParseError> {
    let mut items = Vec::new();

    while parts.peek().is_some() {
        let left = take_operand(parts)?;

        match parts.peek() {
            Some(Part::And(position)) | Some(Part::Or(position)) => {
                let position = *position;
                let is_and = matches!(parts.next(), Some(Part::And(_)));
                if parts.peek().is_none() {
                    return Err(missing_operand(if is_and { "AND" } else { "OR" }, position));
                }
                let right = compact_rest(parts)?;
                let combined = if is_and {
                    SearchItem::and(left, right)
                } else {
                    SearchItem::or(left, right)
                };
                items.push(combined.at(position));
            }
            _ => items.push(left),
        }
    }

    Ok(items)
}

/// One term, with any `NOT` prefixes applied.
fn take_operand(parts: &mut Peekable<IntoIter<Part>>) -> Result<SearchItem, ParseError> {
    match parts.next() {
        Some(Part::Item(item)) => Ok(item),
        Some(Part::Not(position)) => {
            if parts.peek().is_none() {
                return Err(missing_operand("NOT", position));
            }
            let inner = take_operand(parts)?;
            Ok(SearchItem::not(inner).at(position))
        }
        Some(Part::And(position)) => Err(missing_operand("AND", position)),
        Some(Part::Or(position)) => Err(missing_operand("OR", position)),
        None => Err(missing_operand("NOT", Position::default())),
    }
}

fn missing_operand(operator: &'static str, position: Position) -> ParseError {
    ParseError::MissingOperand { operator, position }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Part {
        Part::Item(SearchItem::word(s))
    }

    fn and() -> Part {
        Part::And(Position::default())
    }

    fn or() -> Part {
        Part::Or(Position::default())
    }

    fn not() -> Part {
        Part::Not(Position::default())
    }

    #[test]
    fn test_chain_folds_right() {
        let items = compact(vec![word("a"), and(), word("b"), and(), word("c")]).unwrap();
        assert_eq!(
            items,
            vec![SearchItem::and(
                SearchItem::word("a"),
                vec![SearchItem::and(SearchItem::word("b"), vec![SearchItem::word("c")])]
            )]
        );
    }

    #[test]
    fn test_not_binds_single_term() {
        let items = compact(vec![not(), word("a"), or(), word("b")]).unwrap();
        assert_eq!(
            items,
            vec![SearchItem::or(
                SearchItem::not(SearchItem::word("a")),
                vec![SearchItem::word("b")]
            )]
        );
    }

    #[test]
    fn test_dangling_operators() {
        for parts in [vec![word("a"), and()], vec![or(), word("a")], vec![not()]] {
            assert!(matches!(
                compact(parts),
                Err(ParseError::MissingOperand { .. })
            ));
        }
    }
}
