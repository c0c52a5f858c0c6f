//! String interner for identifiers and literal text.
//!
//! Interned strings are leaked to obtain a `'static` lifetime; a unit's
//! vocabulary is small and lives as long as the compiler process.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

struct InternState {
    map: FxHashMap<&'static str, Name>,
    strings: Vec<&'static str>,
}

/// Maps text to compact [`Name`] handles and back.
///
/// Interior locking lets one interner be shared by the node arena, the
/// type table and the context without threading `&mut` through every call.
pub struct StringInterner {
    state: RwLock<InternState>,
}

/// Interner handle shared between the components of a unit.
pub type SharedInterner = Arc<StringInterner>;

impl StringInterner {
    pub fn new() -> Self {
        let mut map = FxHashMap::default();
        map.insert("", Name::EMPTY);
        StringInterner {
            state: RwLock::new(InternState {
                map,
                strings: vec![""],
            }),
        }
    }

    /// Create an interner wrapped for sharing.
    pub fn shared() -> SharedInterner {
        Arc::new(Self::new())
    }

    /// Intern `s`, returning the existing handle if it was seen before.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&name) = self.state.read().map.get(s) {
            return name;
        }

        let mut state = self.state.write();
        if let Some(&name) = state.map.get(s) {
            return name;
        }

        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let raw = u32::try_from(state.strings.len()).unwrap_or(u32::MAX);
        let name = Name::from_raw(raw);
        state.strings.push(leaked);
        state.map.insert(leaked, name);
        name
    }

    /// Text of an interned name.
    ///
    /// Names from a different interner resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.state
            .read()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    /// Number of distinct strings, including the pre-interned empty string.
    pub fn len(&self) -> usize {
        self.state.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
