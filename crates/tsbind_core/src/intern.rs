//! String interning for identifiers and symbol names.
//!
//! Identifier text, literal text and symbol-table keys are interned so that
//! name comparison during binding is an integer comparison.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// An interned string identifier. This is a lightweight handle (u32)
/// that can be used to look up the actual string content.
///
/// Comparing two `InternedString` values is an O(1) integer comparison.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternedString(Spur);

impl InternedString {
    /// Create from a raw lasso key.
    #[inline]
    pub fn from_spur(spur: Spur) -> Self {
        Self(spur)
    }

    /// Get the raw lasso key.
    #[inline]
    pub fn as_spur(self) -> Spur {
        self.0
    }
}

impl fmt::Debug for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InternedString({:?})", self.0)
    }
}

/// Thread-safe string interner.
///
/// One interner is owned by each node arena; clones share storage, so the
/// binder can intern synthetic names into the same table the parser used.
#[derive(Clone)]
pub struct StringInterner {
    rodeo: Arc<ThreadedRodeo>,
}

impl StringInterner {
    /// Create a new string interner.
    pub fn new() -> Self {
        Self {
            rodeo: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern a string, returning a handle to the interned value.
    /// If the string was already interned, returns the existing handle.
    #[inline]
    pub fn intern(&self, s: &str) -> InternedString {
        InternedString::from_spur(self.rodeo.get_or_intern(s))
    }

    /// Intern a static string. More efficient than `intern` for string literals.
    #[inline]
    pub fn intern_static(&self, s: &'static str) -> InternedString {
        InternedString::from_spur(self.rodeo.get_or_intern_static(s))
    }

    /// Look up an already-interned string without interning it if absent.
    #[inline]
    pub fn get(&self, s: &str) -> Option<InternedString> {
        self.rodeo.get(s).map(InternedString::from_spur)
    }

    /// Resolve an interned string handle back to its string content.
    #[inline]
    pub fn resolve(&self, key: InternedString) -> &str {
        self.rodeo.resolve(&key.as_spur())
    }

    /// Returns the number of interned strings.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns true if no strings have been interned.
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

// Keys are assigned in insertion order, so serializing the strings in key
// order and re-interning them on load reproduces every handle.
impl Serialize for StringInterner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rodeo.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StringInterner {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rodeo = ThreadedRodeo::deserialize(deserializer)?;
        Ok(Self {
            rodeo: Arc::new(rodeo),
        })
    }
}

/// Display an `InternedString` requires access to the interner.
/// This wrapper provides a Display impl.
pub struct DisplayInterned<'a> {
    pub key: InternedString,
    pub interner: &'a StringInterner,
}

impl<'a> fmt::Display for DisplayInterned<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.interner.resolve(self.key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let interner = StringInterner::new();
        let a = interner.intern("hello");
        let b = interner.intern("hello");
        let c = interner.intern("world");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "hello");
        assert_eq!(interner.resolve(c), "world");
    }

    #[test]
    fn test_clones_share_storage() {
        let interner = StringInterner::new();
        let shared = interner.clone();
        let a = shared.intern("__constructor");
        assert_eq!(interner.get("__constructor"), Some(a));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_serde_preserves_keys() {
        let interner = StringInterner::new();
        let x = interner.intern("x");
        let y = interner.intern("y");
        let json = serde_json::to_string(&interner).unwrap();
        let restored: StringInterner = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.resolve(x), "x");
        assert_eq!(restored.resolve(y), "y");
        assert_eq!(restored.get("y"), Some(y));
    }

    #[test]
    fn test_display_interned() {
        let interner = StringInterner::new();
        let key = interner.intern_static("prototype");
        let shown = DisplayInterned { key, interner: &interner }.to_string();
        assert_eq!(shown, "prototype");
    }
}
