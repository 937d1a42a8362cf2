//! # Result Sets
//!
//! A [`ResultSet`] gathers the documents built for every discovered
//! instance of one kind of record: one per disk, per interface, per log
//! specification. Children keep the order their instances were found in and
//! each carries its own provenance.
//!
//! When two producers cover the same fact (say, two variants of one
//! command), [`ResultSet::first_non_empty`] picks the first one that found
//! anything. The other candidates are dropped, never merged.

use std::any::Any;
use std::sync::Arc;

use serde::Serialize;

use crate::document::{Document, DocumentError};
use crate::provenance::Provenance;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultSet {
    children: Vec<Document>,
}

impl ResultSet {
    pub fn new(children: Vec<Document>) -> Self {
        Self { children }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Converts each instance to a document linked back to that instance.
    ///
    /// The first conversion failure aborts the whole set.
    pub fn collect<T, F>(instances: &[Arc<T>], convert: F) -> Result<Self, DocumentError>
    where
        T: Any + Send + Sync,
        F: Fn(&T) -> Result<Document, DocumentError>,
    {
        let children = instances
            .iter()
            .map(|instance| Ok(convert(instance.as_ref())?.with_source(Provenance::of(instance))))
            .collect::<Result<Vec<_>, DocumentError>>()?;
        tracing::debug!(
            target: "result_set",
            children = children.len(),
            source = std::any::type_name::<T>(),
            "collected result set"
        );
        Ok(Self { children })
    }

    pub fn children(&self) -> &[Document] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.children.iter()
    }

    pub fn into_children(self) -> Vec<Document> {
        self.children
    }

    /// The first candidate with at least one child, or an empty set.
    pub fn first_non_empty<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = ResultSet>,
    {
        Self::first_non_empty_with(candidates.into_iter().map(|set| move || set))
    }

    /// Like [`first_non_empty`](Self::first_non_empty), but producers after
    /// the chosen one are never run.
    pub fn first_non_empty_with<I, P>(producers: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: FnOnce() -> ResultSet,
    {
        for (index, producer) in producers.into_iter().enumerate() {
            let set = producer();
            if !set.is_empty() {
                tracing::debug!(target: "result_set", index, "fallback chose producer");
                return set;
            }
        }
        tracing::debug!(target: "result_set", "no producer yielded children");
        Self::empty()
    }
}

impl FromIterator<Document> for ResultSet {
    fn from_iter<T: IntoIterator<Item = Document>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Node, Scalar};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::Cell;

    #[derive(Serialize)]
    struct Interface {
        name: String,
        speed: u32,
    }

    fn interfaces() -> Vec<Arc<Interface>> {
        vec![
            Arc::new(Interface {
                name: "eth0".to_string(),
                speed: 1000,
            }),
            Arc::new(Interface {
                name: "eth1".to_string(),
                speed: 100,
            }),
        ]
    }

    #[test]
    fn test_collect_keeps_order_and_provenance() {
        let instances = interfaces();
        let set = ResultSet::collect(&instances, Document::from_serialize).unwrap();
        assert_eq!(set.len(), 2);
        let names: Vec<&str> = set
            .iter()
            .filter_map(|doc| doc.get("name").and_then(Node::as_scalar).and_then(Scalar::as_str))
            .collect();
        assert_eq!(names, vec!["eth0", "eth1"]);
        for (doc, instance) in set.iter().zip(&instances) {
            assert!(doc.source().unwrap().points_to(instance));
        }
    }

    #[test]
    fn test_collect_nothing() {
        let set = ResultSet::collect::<Interface, _>(&[], Document::from_serialize).unwrap();
        assert!(set.is_empty());
        assert_eq!(set, ResultSet::empty());
    }

    #[test]
    fn test_collect_failure() {
        let instances = interfaces();
        let result = ResultSet::collect(&instances, |_| {
            Err(DocumentError::Unsupported {
                type_name: "Interface",
                reason: "test".to_string(),
            })
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_first_non_empty_takes_second_exactly() {
        let first = ResultSet::empty();
        let second = ResultSet::new(vec![
            Document::from_value(json!({"mount": "/"})),
            Document::from_value(json!({"mount": "/boot"})),
        ]);
        let third = ResultSet::new(vec![Document::from_value(json!({"mount": "/srv"}))]);
        let chosen = ResultSet::first_non_empty(vec![first, second.clone(), third]);
        assert_eq!(chosen, second);
    }

    #[test]
    fn test_first_non_empty_of_nothing() {
        let all_empty = vec![ResultSet::empty(), ResultSet::empty()];
        assert!(ResultSet::first_non_empty(all_empty).is_empty());
        assert!(ResultSet::first_non_empty(Vec::new()).is_empty());
    }

    #[test]
    fn test_first_non_empty_with_is_lazy() {
        let calls = Cell::new(0);
        let producers: Vec<Box<dyn FnOnce() -> ResultSet + '_>> = vec![
            Box::new(|| {
                calls.set(calls.get() + 1);
                ResultSet::empty()
            }),
            Box::new(|| {
                calls.set(calls.get() + 1);
                ResultSet::new(vec![Document::from_value(json!(1))])
            }),
            Box::new(|| {
                calls.set(calls.get() + 1);
                ResultSet::new(vec![Document::from_value(json!(2))])
            }),
        ];
        let chosen = ResultSet::first_non_empty_with(producers);
        assert_eq!(chosen.children(), &[Document::from_value(json!(1))]);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_serialize_omits_provenance() {
        let instances = interfaces();
        let set = ResultSet::collect(&instances, Document::from_serialize).unwrap();
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({"children": [
                {"name": "eth0", "speed": 1000},
                {"name": "eth1", "speed": 100},
            ]})
        );
    }
}
