#![forbid(unsafe_code)]

//! Plain data objects: mutable named properties behind a shared handle.
//!
//! # Design
//!
//! [`Obj`] is a cheaply-cloneable handle (`Rc<RefCell<..>>`) over an
//! insertion-ordered map of `String` property names to [`Value`]s. Handle
//! clones share the same storage; object identity is handle-allocation
//! identity, never structural equality.
//!
//! Mutating through an `Obj` is the untracked escape hatch: no dependency is
//! recorded and no dependent re-runs. Tracked access goes through the
//! instrumented view produced by wrapping.
//!
//! # Invariants
//!
//! 1. Property iteration order is insertion order; overwriting a key keeps
//!    its position, deleting shifts later keys down.
//! 2. A frozen object rejects every write and delete, through the raw handle
//!    and through instrumented views alike. Freezing is irreversible.
//!
//! # Failure Modes
//!
//! - **Cyclic object graphs**: objects are reference-counted; a cycle of
//!   object-valued properties is never reclaimed. Callers who build cycles
//!   must break them manually before dropping the last handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::error::{ReactiveError, Result};
use crate::value::Value;

pub(crate) struct ObjInner {
    props: IndexMap<String, Value>,
    frozen: bool,
}

/// Identity key for an object, stable for as long as some handle or
/// registry entry pins the allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ObjId(usize);

/// Non-owning reference to an object's storage.
///
/// Holding one keeps the allocation (not the contents) alive, so an
/// [`ObjId`] derived from it cannot be reused by a later allocation while
/// the `ObjWeak` exists.
#[derive(Clone)]
pub(crate) struct ObjWeak {
    _weak: Weak<RefCell<ObjInner>>,
}

/// A plain, untracked object with mutable named properties.
///
/// Cloning an `Obj` creates a new handle to the **same** storage.
pub struct Obj {
    inner: Rc<RefCell<ObjInner>>,
}

impl Clone for Obj {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Obj")
            .field("props", &inner.props)
            .field("frozen", &inner.frozen)
            .finish()
    }
}

impl Default for Obj {
    fn default() -> Self {
        Self::new()
    }
}

impl Obj {
    /// Create an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObjInner {
                props: IndexMap::new(),
                frozen: false,
            })),
        }
    }

    /// Builder-style insert for constructing literals.
    ///
    /// Has no effect on a frozen object.
    #[must_use]
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let _ = self.insert(key, value);
        self
    }

    /// Get a clone of the value stored under `key`, untracked.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.borrow().props.get(key).cloned()
    }

    /// Insert or overwrite `key`, untracked. Returns the previous value.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::FrozenWrite`] if the object is frozen.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<Option<Value>> {
        let key = key.into();
        let mut inner = self.inner.borrow_mut();
        if inner.frozen {
            return Err(ReactiveError::FrozenWrite { key });
        }
        Ok(inner.props.insert(key, value.into()))
    }

    /// Remove `key`, untracked, preserving the order of the remaining
    /// properties. Returns the removed value, `None` if the key was absent.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::FrozenDelete`] if the object is frozen.
    pub fn remove(&self, key: &str) -> Result<Option<Value>> {
        let mut inner = self.inner.borrow_mut();
        if inner.frozen {
            return Err(ReactiveError::FrozenDelete { key: key.to_owned() });
        }
        Ok(inner.props.shift_remove(key))
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.borrow().props.contains_key(key)
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().props.len()
    }

    /// Whether the object has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().props.is_empty()
    }

    /// Property names in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.borrow().props.keys().cloned().collect()
    }

    /// Reject all further writes and deletes. Irreversible.
    pub fn freeze(&self) {
        self.inner.borrow_mut().frozen = true;
    }

    /// Whether the object is frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.inner.borrow().frozen
    }

    /// Whether two handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Obj) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn id(&self) -> ObjId {
        ObjId(Rc::as_ptr(&self.inner) as usize)
    }

    pub(crate) fn downgrade(&self) -> ObjWeak {
        ObjWeak {
            _weak: Rc::downgrade(&self.inner),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
