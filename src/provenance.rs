//! Non-owning back-references from documents to the records they came from.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::{Arc, Weak};

/// Weak link to the value a document was built from.
///
/// Holding a `Provenance` never keeps its source alive. Once the source is
/// dropped, [`resolve`](Provenance::resolve) returns `None` and everything
/// else about the document stays valid.
#[derive(Clone)]
pub struct Provenance {
    source: Weak<dyn Any + Send + Sync>,
    type_name: &'static str,
    label: Option<String>,
}

impl Provenance {
    pub fn of<T: Any + Send + Sync>(source: &Arc<T>) -> Self {
        let weak: Weak<T> = Arc::downgrade(source);
        let weak: Weak<dyn Any + Send + Sync> = weak;
        Self {
            source: weak,
            type_name: type_name::<T>(),
            label: None,
        }
    }

    /// Adds a human-readable tag such as the instance or device name.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is_alive(&self) -> bool {
        self.source.strong_count() > 0
    }

    /// The source, if it is still alive and is a `T`.
    pub fn resolve<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.source.upgrade()?.downcast::<T>().ok()
    }

    pub fn points_to<T: Any + Send + Sync>(&self, source: &Arc<T>) -> bool {
        let weak: Weak<T> = Arc::downgrade(source);
        let weak: Weak<dyn Any + Send + Sync> = weak;
        Weak::ptr_eq(&self.source, &weak)
    }
}

impl PartialEq for Provenance {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.source, &other.source) && self.label == other.label
    }
}

impl fmt::Debug for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provenance")
            .field("type_name", &self.type_name)
            .field("label", &self.label)
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Record {
        device: String,
    }

    #[test]
    fn test_resolve_while_alive() {
        let record = Arc::new(Record {
            device: "eth0".to_string(),
        });
        let provenance = Provenance::of(&record).with_label("eth0");
        assert!(provenance.is_alive());
        assert_eq!(provenance.label(), Some("eth0"));
        assert!(provenance.type_name().ends_with("Record"));
        assert_eq!(provenance.resolve::<Record>(), Some(Arc::clone(&record)));
        assert!(provenance.points_to(&record));
    }

    #[test]
    fn test_resolve_wrong_type() {
        let record = Arc::new(Record {
            device: "sda".to_string(),
        });
        let provenance = Provenance::of(&record);
        assert!(provenance.resolve::<String>().is_none());
    }

    #[test]
    fn test_does_not_keep_source_alive() {
        let record = Arc::new(Record {
            device: "sda".to_string(),
        });
        let provenance = Provenance::of(&record);
        assert_eq!(Arc::strong_count(&record), 1);
        drop(record);
        assert!(!provenance.is_alive());
        assert!(provenance.resolve::<Record>().is_none());
    }

    #[test]
    fn test_equality_is_identity() {
        let a = Arc::new(Record {
            device: "sda".to_string(),
        });
        let b = Arc::new(Record {
            device: "sda".to_string(),
        });
        assert_eq!(Provenance::of(&a), Provenance::of(&a));
        assert_ne!(Provenance::of(&a), Provenance::of(&b));
        assert_ne!(Provenance::of(&a), Provenance::of(&a).with_label("x"));
    }
}
