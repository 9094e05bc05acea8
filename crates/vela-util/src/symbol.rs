//! String interning.
//!
//! Identifiers, keywords, and string-literal bodies all flow through a
//! global interner so that [`Symbol`] comparison is an `O(1)` integer
//! comparison instead of a string comparison, and so that a `Symbol` is a
//! 4-byte `Copy` handle rather than an owned `String` everywhere a name is
//! threaded through the lexer, AST, and semantic tree.

use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::{OnceLock, RwLock};

/// An interned string.
///
/// Two symbols compare equal iff the strings they were interned from are
/// equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Intern `text`, returning a handle usable for `O(1)` comparison.
    pub fn intern(text: &str) -> Self {
        table().intern(text)
    }

    /// Look up the string this symbol was interned from.
    ///
    /// Always succeeds for a `Symbol` obtained from [`Symbol::intern`]: the
    /// table never evicts entries.
    pub fn as_str(self) -> &'static str {
        table().get(self)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn table() -> &'static StringTable {
    static TABLE: OnceLock<StringTable> = OnceLock::new();
    TABLE.get_or_init(StringTable::new)
}

/// The global string table backing [`Symbol`].
///
/// Strings are leaked to obtain `'static` references: the table never
/// shrinks, and a compiler process interns a bounded number of distinct
/// identifiers over its lifetime, so leaking is simpler than reference
/// counting each entry.
struct StringTable {
    inner: RwLock<StringTableInner>,
}

struct StringTableInner {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
    // Reserved for arena-backed interning; entries are currently leaked via
    // `Box::leak` instead (simpler, and the table never shrinks regardless).
    arena: bumpalo::Bump,
}

impl StringTable {
    fn new() -> Self {
        Self {
            inner: RwLock::new(StringTableInner {
                map: FxHashMap::default(),
                strings: Vec::new(),
                arena: bumpalo::Bump::new(),
            }),
        }
    }

    fn intern(&self, text: &str) -> Symbol {
        if let Some(&index) = self.inner.read().unwrap().map.get(text) {
            return Symbol(index);
        }

        let mut inner = self.inner.write().unwrap();
        // Re-check: another writer may have interned `text` between the
        // read-lock release above and this write-lock acquisition.
        if let Some(&index) = inner.map.get(text) {
            return Symbol(index);
        }

        let leaked: &'static str = Box::leak(text.to_string().into_boxed_str());
        let index = inner.strings.len() as u32;
        inner.strings.push(leaked);
        inner.map.insert(leaked, index);
        Symbol(index)
    }

    fn get(&self, symbol: Symbol) -> &'static str {
        self.inner.read().unwrap().strings[symbol.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn same_text_interns_to_same_symbol() {
        assert_eq!(Symbol::intern("hello"), Symbol::intern("hello"));
    }

    #[test]
    fn different_text_interns_to_different_symbols() {
        assert_ne!(Symbol::intern("hello"), Symbol::intern("world"));
    }

    #[test]
    fn round_trips_through_as_str() {
        let s = Symbol::intern("round_trip_example");
        assert_eq!(s.as_str(), "round_trip_example");
    }

    proptest! {
        #[test]
        fn interning_any_text_round_trips_through_as_str(text in "[a-zA-Z0-9_]{1,32}") {
            let symbol = Symbol::intern(&text);
            prop_assert_eq!(symbol.as_str(), text.as_str());
        }

        #[test]
        fn interning_twice_is_idempotent(text in "[a-zA-Z0-9_]{1,32}") {
            prop_assert_eq!(Symbol::intern(&text), Symbol::intern(&text));
        }
    }
}
