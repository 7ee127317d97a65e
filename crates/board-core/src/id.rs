use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for node and edge IDs — fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Counter behind `NodeId::with_prefix`. Shared across prefixes so two
/// generated IDs never differ only by prefix.
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A lightweight, interned identifier for nodes and edges on the board.
/// Internally a `Spur` index — 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a new string as a NodeId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a unique ID with a type prefix (e.g. `node_1`, `edge_2`).
    ///
    /// Unique within this process only. IDs loaded from outside may
    /// already use the same spelling, so callers placing the ID into a
    /// store must still check it against the store's existing IDs.
    pub fn with_prefix(prefix: &str) -> Self {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }

    /// Generate an ID with `prefix` that `taken` reports as free.
    pub fn fresh(prefix: &str, taken: impl Fn(NodeId) -> bool) -> Self {
        loop {
            let id = Self::with_prefix(prefix);
            if !taken(id) {
                return id;
            }
        }
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::intern(s)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("n-1");
        let b = NodeId::intern("n-1");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "n-1");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = NodeId::with_prefix("node");
        let b = NodeId::with_prefix("node");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("node_"));
    }

    #[test]
    fn fresh_skips_taken_ids() {
        let first = NodeId::with_prefix("scratch");
        // Reserve the next few spellings so `fresh` has to keep drawing.
        let n: u64 = first.as_str()["scratch_".len()..].parse().unwrap();
        let reserved: Vec<NodeId> = (n + 1..n + 4)
            .map(|k| NodeId::intern(&format!("scratch_{k}")))
            .collect();
        let id = NodeId::fresh("scratch", |candidate| reserved.contains(&candidate));
        assert!(!reserved.contains(&id));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = NodeId::intern("edge_7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"edge_7\"");
        let back: NodeId = serde_json::from_str("\"edge_7\"").unwrap();
        assert_eq!(back, id);
    }
}
