#![forbid(unsafe_code)]

//! Instrumented object views: reads track, writes diff and notify.
//!
//! # Design
//!
//! [`ReactiveObject`] is the interception layer over a plain [`Obj`],
//! expressed as typed accessor methods in place of transparent property
//! syntax. Three operations are intercepted:
//!
//! - [`get`](ReactiveObject::get) records a dependency on the exact
//!   `(object, property)` pair for the computation currently reading, then
//!   returns the stored value, wrapping object-valued results on the way
//!   out. Nested objects therefore become reactive lazily, on first
//!   observation, never eagerly at wrap time.
//! - [`set`](ReactiveObject::set) diffs against the old value and notifies
//!   dependents only for a real change, distinguishing newly-created
//!   properties from overwritten ones.
//! - [`delete`](ReactiveObject::delete) removes the property and notifies
//!   dependents of the removal.
//!
//! # Invariants
//!
//! 1. One view exists per object per universe; wrapping is idempotent (see
//!    [`crate::registry`]).
//! 2. `get` tracks before it inspects presence, so a computation that read
//!    an absent key re-runs when the key is later added.
//! 3. A failed mutation (frozen target) surfaces its error unmodified and
//!    fires no notification.
//! 4. Writing a strictly-equal value is a no-op for dependents.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::Result;
use crate::graph::ChangeKind;
use crate::obj::Obj;
use crate::runtime::RuntimeInner;
use crate::value::Value;

pub(crate) struct ReactiveInner {
    target: Obj,
    rt: Rc<RuntimeInner>,
}

/// An instrumented view over an [`Obj`].
///
/// Cloning a `ReactiveObject` creates a new handle to the **same** view.
pub struct ReactiveObject {
    inner: Rc<ReactiveInner>,
}

impl Clone for ReactiveObject {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveObject")
            .field("target", &self.inner.target)
            .finish()
    }
}

impl ReactiveObject {
    pub(crate) fn new(rt: Rc<RuntimeInner>, target: Obj) -> Self {
        Self {
            inner: Rc::new(ReactiveInner { target, rt }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<ReactiveInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ReactiveInner> {
        Rc::downgrade(&self.inner)
    }

    /// Read a property, recording a dependency for the computation currently
    /// running. Returns `None` when the property is absent; the read is
    /// tracked either way, so a later creation of the key re-runs the
    /// reader. Object-valued results come back instrumented.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let inner = &self.inner;
        inner.rt.track(&inner.target, key);
        let fetched = inner.target.get(key)?;
        Some(match fetched {
            Value::Object(obj) => Value::Reactive(RuntimeInner::wrap(&inner.rt, obj)),
            other => other,
        })
    }

    /// Write a property. Creating a previously-absent key notifies with
    /// [`ChangeKind::Add`]; overwriting with a strictly-unequal value
    /// notifies with [`ChangeKind::Set`]; overwriting with an equal value
    /// notifies nobody.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::ReactiveError::FrozenWrite`] from a frozen
    /// target, in which case nothing is notified.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let inner = &self.inner;
        let old = inner.target.get(key);
        inner.target.insert(key, value.clone())?;
        match old {
            None => inner.rt.trigger(&inner.target, ChangeKind::Add, key),
            Some(ref prev) if *prev != value => {
                inner.rt.trigger(&inner.target, ChangeKind::Set, key);
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Remove a property. Returns whether the key existed. Removing a
    /// present key notifies with [`ChangeKind::Delete`]; removing an absent
    /// key notifies nobody.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::ReactiveError::FrozenDelete`] from a frozen
    /// target, in which case nothing is notified.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let inner = &self.inner;
        let removed = inner.target.remove(key)?;
        let existed = removed.is_some();
        if existed {
            inner.rt.trigger(&inner.target, ChangeKind::Delete, key);
        }
        Ok(existed)
    }

    /// The plain object this view instruments.
    ///
    /// Mutations through the returned handle bypass tracking and
    /// notification entirely.
    #[must_use]
    pub fn target(&self) -> &Obj {
        &self.inner.target
    }

    /// Whether two handles refer to the same view.
    #[must_use]
    pub fn ptr_eq(&self, other: &ReactiveObject) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;
    use std::cell::Cell;

    fn wrap(rt: &Runtime, obj: Obj) -> ReactiveObject {
        match rt.make_reactive(obj) {
            Value::Reactive(r) => r,
            other => panic!("expected an instrumented view, got {other:?}"),
        }
    }

    #[test]
    fn get_reads_underlying_values() {
        let rt = Runtime::new();
        let state = wrap(&rt, Obj::new().with("n", 4).with("s", "hi"));
        assert_eq!(state.get("n"), Some(Value::Int(4)));
        assert_eq!(state.get("s").unwrap().as_str(), Some("hi"));
        assert_eq!(state.get("missing"), None);
    }

    #[test]
    fn set_creates_and_overwrites() {
        let rt = Runtime::new();
        let state = wrap(&rt, Obj::new());
        state.set("x", 1).unwrap();
        assert_eq!(state.get("x"), Some(Value::Int(1)));
        state.set("x", 2).unwrap();
        assert_eq!(state.get("x"), Some(Value::Int(2)));
    }

    #[test]
    fn delete_reports_presence() {
        let rt = Runtime::new();
        let state = wrap(&rt, Obj::new().with("x", 1));
        assert!(state.delete("x").unwrap());
        assert!(!state.delete("x").unwrap());
        assert_eq!(state.get("x"), None);
    }

    #[test]
    fn nested_objects_come_back_instrumented() {
        let rt = Runtime::new();
        let child = Obj::new().with("inner", 1);
        let state = wrap(&rt, Obj::new().with("child", child.clone()));

        let fetched = state.get("child").unwrap();
        let view = fetched.as_reactive().expect("nested object is wrapped");
        assert!(view.target().ptr_eq(&child));
        assert_eq!(view.get("inner"), Some(Value::Int(1)));
    }

    #[test]
    fn nested_view_identity_is_stable() {
        let rt = Runtime::new();
        let state = wrap(&rt, Obj::new().with("child", Obj::new()));

        let a = state.get("child").unwrap();
        let b = state.get("child").unwrap();
        assert!(a.as_reactive().unwrap().ptr_eq(b.as_reactive().unwrap()));
    }

    #[test]
    fn equal_write_does_not_rerun_dependents() {
        let rt = Runtime::new();
        let state = wrap(&rt, Obj::new().with("x", 1));
        let runs = Rc::new(Cell::new(0u32));
        let _effect = {
            let state = state.clone();
            let runs = Rc::clone(&runs);
            rt.run_reactively(move || {
                let _ = state.get("x");
                runs.set(runs.get() + 1);
            })
        };
        assert_eq!(runs.get(), 1);

        state.set("x", 1).unwrap();
        assert_eq!(runs.get(), 1);

        state.set("x", 2).unwrap();
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn frozen_target_rejects_through_view() {
        let rt = Runtime::new();
        let obj = Obj::new().with("x", 1);
        let state = wrap(&rt, obj.clone());
        obj.freeze();

        assert!(state.set("x", 2).is_err());
        assert!(state.set("new", 1).is_err());
        assert!(state.delete("x").is_err());
        assert_eq!(state.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn target_exposes_backing_object() {
        let rt = Runtime::new();
        let obj = Obj::new().with("x", 1);
        let state = wrap(&rt, obj.clone());
        assert!(state.target().ptr_eq(&obj));
    }
}
