//! Turning a decoded query into a backend predicate.
//!
//! A backend implements [`PredicateBuilder`] for its own predicate type (a
//! SQL fragment, a closure, a compiled matcher). [`build`] walks the tree and
//! combines the pieces:
//!
//! ```text
//! top level, Group(items)   => all(items)
//! And(left, right)          => all([left, all(right)])
//! Or(left, right)           => any([left, all(right)])
//! Not(inner)                => negate(inner)
//! Pair(key, value)          => pair(key, value)
//! anything else             => term(item)
//! ```

use crate::ast::{ItemKind, SearchItem};

pub trait PredicateBuilder {
    type Predicate;
    type Error;

    /// A `field:value` term. `value` is handed over whole, with any
    /// comparison, range or list structure intact.
    fn pair(&mut self, field: &str, value: &SearchItem) -> Result<Self::Predicate, Self::Error>;

    /// A free-standing term outside any pair.
    fn term(&mut self, item: &SearchItem) -> Result<Self::Predicate, Self::Error>;

    fn all(&mut self, predicates: Vec<Self::Predicate>) -> Self::Predicate;

    fn any(&mut self, predicates: Vec<Self::Predicate>) -> Self::Predicate;

    fn negate(&mut self, predicate: Self::Predicate) -> Self::Predicate;
}

/// Build one predicate from a whole query. An empty query builds `all([])`.
pub fn build<B: PredicateBuilder>(items: &[SearchItem], builder: &mut B) -> Result<B::Predicate, B::Error> {
    let parts = build_each(items, builder)?;
    Ok(builder.all(parts))
}

fn build_each<B: PredicateBuilder>(items: &[SearchItem], builder: &mut B) -> Result<Vec<B::Predicate>, B::Error> {
    items.iter().map(|item| build_item(item, builder)).collect()
}

fn build_item<B: PredicateBuilder>(item: &SearchItem, builder: &mut B) -> Result<B::Predicate, B::Error> {
    match &item.kind {
        ItemKind::Group(items) => build(items, builder),
        ItemKind::And(left, right) => {
            let left = build_item(left, builder)?;
            let right = build(right, builder)?;
            Ok(builder.all(vec![left, right]))
        }
        ItemKind::Or(left, right) => {
            let left = build_item(left, builder)?;
            let right = build(right, builder)?;
            Ok(builder.any(vec![left, right]))
        }
        ItemKind::Not(inner) => {
            let inner = build_item(inner, builder)?;
            Ok(builder.negate(inner))
        }
        ItemKind::Pair { key, value } => match &key.kind {
            ItemKind::Word(name) | ItemKind::Quote(name) => builder.pair(name, value),
            ItemKind::Value(v) => builder.pair(&v.to_text(), value),
            _ => builder.term(item),
        },
        _ => builder.term(item),
    }
}
