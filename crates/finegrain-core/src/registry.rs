#![forbid(unsafe_code)]

//! Identity registry: raw object → its instrumented view.
//!
//! One instrumented view exists per raw object per universe. The registry
//! records the association weakly in both directions: the entry holds a weak
//! reference to the view, and the view itself owns its target, so the
//! registry never extends the lifetime of user data or wrappers. Entries
//! whose view has been dropped are pruned on the next lookup of the same
//! object.

use std::collections::HashMap;
use std::rc::Weak;

use crate::obj::{Obj, ObjId, ObjWeak};
use crate::reactive::{ReactiveInner, ReactiveObject};

struct RegistryEntry {
    /// Pins the raw object's allocation so the key cannot be reused by a
    /// later allocation while this entry exists.
    _target: ObjWeak,
    wrapper: Weak<ReactiveInner>,
}

pub(crate) struct IdentityRegistry {
    entries: HashMap<ObjId, RegistryEntry>,
}

impl IdentityRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Record `wrapped` as the instrumented view of `raw`.
    pub(crate) fn register(&mut self, raw: &Obj, wrapped: &ReactiveObject) {
        self.entries.insert(
            raw.id(),
            RegistryEntry {
                _target: raw.downgrade(),
                wrapper: wrapped.downgrade(),
            },
        );
    }

    /// The recorded instrumented view of `raw`, if it is still alive.
    /// A dead entry is removed and reported as absent.
    pub(crate) fn instrumented_for(&mut self, raw: &Obj) -> Option<ReactiveObject> {
        let id = raw.id();
        match self.entries.get(&id) {
            Some(entry) => match entry.wrapper.upgrade() {
                Some(inner) => Some(ReactiveObject::from_inner(inner)),
                None => {
                    self.entries.remove(&id);
                    None
                }
            },
            None => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
