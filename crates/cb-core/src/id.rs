use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for card and link IDs: fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Monotonic counter shared by every generated ID.
static COUNTER: AtomicU64 = AtomicU64::new(0);

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an ID, or return the existing one if already interned.
            pub fn intern(s: &str) -> Self {
                Self(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }

            /// Generate an ID that `is_taken` rejects for no existing entity.
            ///
            /// IDs loaded from an earlier session may already use the
            /// `prefix_N` shape, so the counter alone cannot guarantee
            /// uniqueness within a document.
            pub fn fresh(is_taken: impl Fn(Self) -> bool) -> Self {
                loop {
                    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
                    let id = Self::intern(&format!("{}_{n}", $prefix));
                    if !is_taken(id) {
                        return id;
                    }
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Opaque identifier of a card, referenced by links.
    NodeId,
    "node"
);

interned_id!(
    /// Opaque identifier of a link between two cards.
    EdgeId,
    "edge"
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("card-1700000000000");
        let b = NodeId::intern("card-1700000000000");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "card-1700000000000");
    }

    #[test]
    fn fresh_ids_are_unique() {
        let a = NodeId::fresh(|_| false);
        let b = NodeId::fresh(|_| false);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("node_"));
    }

    #[test]
    fn fresh_skips_taken_ids() {
        let calls = Cell::new(0);
        let id = EdgeId::fresh(|_| {
            calls.set(calls.get() + 1);
            calls.get() == 1
        });
        assert_eq!(calls.get(), 2, "first candidate was taken, second accepted");
        assert!(id.as_str().starts_with("edge_"));
    }
}
