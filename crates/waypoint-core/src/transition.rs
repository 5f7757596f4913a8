//! Matched-geometry transition metadata
//!
//! A destination may carry a [`Transition`] describing which on-screen
//! element it animates from. The metadata is only meaningful while the
//! process runs: it is never persisted, always decodes to
//! [`Transition::none`], and is ignored by equality so that persisted trees
//! compare equal after a round trip.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

static NEXT_NAMESPACE: AtomicU64 = AtomicU64::new(1);

/// Process-local namespace grouping matched transition sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransitionNamespace(u64);

impl TransitionNamespace {
    /// Allocate a fresh namespace
    pub fn new() -> Self {
        Self(NEXT_NAMESPACE.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw namespace id
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for TransitionNamespace {
    fn default() -> Self {
        Self::new()
    }
}

/// The element a destination's appearance animates from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MatchedTransition {
    /// Identifier of the source element within its namespace
    pub source_id: String,
    /// Namespace the source id belongs to
    pub namespace: TransitionNamespace,
}

/// Optional transition metadata attached to a destination.
#[derive(Clone, Default)]
pub struct Transition(Option<MatchedTransition>);

impl Transition {
    /// No transition
    pub const fn none() -> Self {
        Self(None)
    }

    /// Animate from `source_id` in `namespace`
    pub fn matched(source_id: impl Into<String>, namespace: TransitionNamespace) -> Self {
        Self(Some(MatchedTransition {
            source_id: source_id.into(),
            namespace,
        }))
    }

    /// The transition, if any
    pub fn get(&self) -> Option<&MatchedTransition> {
        self.0.as_ref()
    }

    /// Whether no transition is attached
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(matched) => f
                .debug_tuple("Transition")
                .field(&matched.source_id)
                .finish(),
            None => f.write_str("Transition(none)"),
        }
    }
}

impl PartialEq for Transition {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Transition {}

impl Hash for Transition {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

impl Serialize for Transition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_none()
    }
}

impl<'de> Deserialize<'de> for Transition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(Self::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces_are_distinct() {
        assert_ne!(TransitionNamespace::new(), TransitionNamespace::new());
    }

    #[test]
    fn test_serializes_as_null() {
        let t = Transition::matched("avatar", TransitionNamespace::new());
        assert_eq!(serde_json::to_string(&t).unwrap(), "null");
    }

    #[test]
    fn test_always_decodes_to_none() {
        let t: Transition = serde_json::from_str(r#"{"sourceId":"avatar"}"#).unwrap();
        assert!(t.is_none());
        let t: Transition = serde_json::from_str("null").unwrap();
        assert!(t.is_none());
    }

    #[test]
    fn test_equality_ignores_metadata() {
        let a = Transition::matched("avatar", TransitionNamespace::new());
        assert_eq!(a, Transition::none());
        assert_eq!(a.get().map(|m| m.source_id.as_str()), Some("avatar"));
    }
}
