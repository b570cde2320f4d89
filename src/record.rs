//! Core data units that flow through the synchronizer.
//!
//! A [`MemoryRecord`] is the write payload: opaque JSON content plus a set of
//! capability tags that drive store routing. A [`QueryHit`] is the read
//! result unit: one match from one pillar with a relevance score.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record submitted for storage across the memory surface.
///
/// The engine never interprets `content`; routing is driven entirely by
/// `tags`, which are matched against pillar capability sets.
///
/// # Example
///
/// ```
/// use memory_sync::MemoryRecord;
/// use serde_json::json;
///
/// let record = MemoryRecord::new(json!({"note": "rotate the vault keys"}))
///     .with_tag("secure");
///
/// assert!(record.tags.contains("secure"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Capability tags used for routing (e.g. `vector`, `secure`, `relational`)
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// The actual payload, opaque to the engine
    pub content: Value,
}

impl MemoryRecord {
    /// Create an untagged record. Without tags it only routes to the
    /// configured default pillar.
    #[must_use]
    pub fn new(content: Value) -> Self {
        Self {
            tags: BTreeSet::new(),
            content,
        }
    }

    /// Add a routing tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add several routing tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// A single query match from one pillar.
///
/// Ordering is a derived property: the synchronizer sorts merged hits by
/// descending relevance and breaks ties by registry order. Nothing about
/// ordering is stored on the hit itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryHit {
    /// Name of the pillar that produced this hit. Stamped by the engine
    /// during merge; pillar implementations may leave it empty.
    #[serde(default)]
    pub pillar: String,
    /// Relevance score, clamped to 0.0–1.0
    pub relevance: f64,
    /// Matched content
    pub content: Value,
}

impl QueryHit {
    /// Create a hit with the relevance clamped into 0.0–1.0.
    #[must_use]
    pub fn new(relevance: f64, content: Value) -> Self {
        Self {
            pillar: String::new(),
            relevance: relevance.clamp(0.0, 1.0),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_tags_deduplicate() {
        let record = MemoryRecord::new(json!({"a": 1}))
            .with_tag("secure")
            .with_tag("secure")
            .with_tags(["vector", "secure"]);
        assert_eq!(record.tags.len(), 2);
    }

    #[test]
    fn test_untagged_record() {
        let record = MemoryRecord::new(json!("payload"));
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_hit_relevance_clamped() {
        assert_eq!(QueryHit::new(1.7, json!(null)).relevance, 1.0);
        assert_eq!(QueryHit::new(-0.2, json!(null)).relevance, 0.0);
        assert_eq!(QueryHit::new(0.42, json!(null)).relevance, 0.42);
    }

    #[test]
    fn test_record_roundtrips_json() {
        let record = MemoryRecord::new(json!({"k": "v"})).with_tag("cache");
        let encoded = serde_json::to_string(&record).unwrap();
        let decoded: MemoryRecord = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.tags, record.tags);
        assert_eq!(decoded.content, record.content);
    }
}
