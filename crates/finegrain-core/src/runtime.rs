#![forbid(unsafe_code)]

//! The reactive universe: one registry, one dependency graph, one stack.
//!
//! # Design
//!
//! [`Runtime`] is a cheaply-cloneable handle over the shared state of one
//! reactive universe. Every wrap, every tracked read, and every notification
//! within a universe goes through the same three structures; independent
//! universes share nothing and never observe each other's mutations.
//!
//! Notification is synchronous and depth-first: a write re-runs every
//! dependent of the written `(object, property)` pair, in the order the
//! dependencies were first recorded, to completion, on the same call stack,
//! before the write returns. A dependent's own writes fan out the same way,
//! nested inside the outer write.
//!
//! No interior borrow is held while user code runs (computation bodies,
//! mutation observers), which is what makes the nested fan-out re-entrant.
//!
//! # Invariants
//!
//! 1. Reads outside any computation are not tracked.
//! 2. Dependents run in recording order; nested triggers resolve depth-first.
//! 3. The execution stack is empty whenever no public entry point is on the
//!    call stack, even after a panicking computation body.
//!
//! # Failure Modes
//!
//! - **Panicking dependent**: the panic unwinds through the fan-out; later
//!   dependents of the same write do not run. Fail-fast per branch.
//! - **Self-triggering computation**: unbounded recursion, caller
//!   responsibility (see [`crate::effect`]).

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::effect::Effect;
use crate::graph::{ChangeKind, DependencyGraph};
use crate::obj::Obj;
use crate::reactive::ReactiveObject;
use crate::registry::IdentityRegistry;
use crate::stack::ExecutionStack;
use crate::value::Value;

/// One mutation, as reported to mutation observers.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// The object that was mutated.
    pub target: Obj,
    /// What happened to the property.
    pub kind: ChangeKind,
    /// The property name.
    pub key: String,
}

type ObserverRc = Rc<dyn Fn(&ChangeEvent)>;
type ObserverWeak = Weak<dyn Fn(&ChangeEvent)>;

pub(crate) struct RuntimeInner {
    pub(crate) registry: RefCell<IdentityRegistry>,
    pub(crate) graph: RefCell<DependencyGraph>,
    pub(crate) stack: RefCell<ExecutionStack>,
    observers: RefCell<Vec<ObserverWeak>>,
}

/// Handle to a reactive universe.
///
/// Cloning a `Runtime` creates a new handle to the **same** universe.
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Clone for Runtime {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("tracking_depth", &self.tracking_depth())
            .finish_non_exhaustive()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Create a fresh universe with empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                registry: RefCell::new(IdentityRegistry::new()),
                graph: RefCell::new(DependencyGraph::new()),
                stack: RefCell::new(ExecutionStack::new()),
                observers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Obtain a tracked view of `value`.
    ///
    /// Non-object values pass through unchanged (they cannot be tracked),
    /// as does a value that is already an instrumented view. An object is
    /// wrapped at most once per universe: wrapping the same object again
    /// returns the same view.
    pub fn make_reactive(&self, value: impl Into<Value>) -> Value {
        match value.into() {
            Value::Object(obj) => Value::Reactive(RuntimeInner::wrap(&self.inner, obj)),
            other => other,
        }
    }

    /// Register a computation and run it once immediately.
    ///
    /// Every tracked property the body reads becomes a dependency; writing
    /// any of them re-runs the body synchronously. The returned handle owns
    /// the computation: dropping it retires the computation and no further
    /// re-runs happen.
    #[must_use = "dropping the handle retires the computation"]
    pub fn run_reactively(&self, body: impl Fn() + 'static) -> Effect {
        let effect = Effect::new(Rc::clone(&self.inner), body);
        effect.run();
        effect
    }

    /// Observe every notification in this universe.
    ///
    /// The callback receives a [`ChangeEvent`] for each add, set, and delete
    /// before the corresponding dependents re-run. Dropping the returned
    /// [`Subscription`] unsubscribes the callback.
    #[must_use = "dropping the subscription unsubscribes the observer"]
    pub fn watch_mutations(&self, callback: impl Fn(&ChangeEvent) + 'static) -> Subscription {
        let strong: ObserverRc = Rc::new(callback);
        self.inner.observers.borrow_mut().push(Rc::downgrade(&strong));
        Subscription { _guard: strong }
    }

    /// Current computation re-entrancy level. Zero outside any computation.
    #[must_use]
    pub fn tracking_depth(&self) -> usize {
        self.inner.stack.borrow().depth()
    }
}

impl RuntimeInner {
    /// Wrap `target`, reusing the registered view when one is alive.
    pub(crate) fn wrap(rt: &Rc<RuntimeInner>, target: Obj) -> ReactiveObject {
        if let Some(existing) = rt.registry.borrow_mut().instrumented_for(&target) {
            return existing;
        }
        let wrapped = ReactiveObject::new(Rc::clone(rt), target.clone());
        rt.registry.borrow_mut().register(&target, &wrapped);
        trace!(props = target.len(), "instrumented object");
        wrapped
    }

    /// Record a dependency edge for the computation currently reading.
    /// A read outside any computation records nothing.
    pub(crate) fn track(&self, target: &Obj, key: &str) {
        let current = self.stack.borrow().current();
        let Some(current) = current else {
            return;
        };
        self.graph.borrow_mut().record(target, key, &current);
        trace!(effect_id = current.id(), key, "tracked read");
    }

    /// Notify observers, then re-run every dependent of `target[key]`,
    /// depth-first and in recording order.
    pub(crate) fn trigger(&self, target: &Obj, kind: ChangeKind, key: &str) {
        self.notify_observers(target, kind, key);
        let dependents = self.graph.borrow_mut().dependents(target, key);
        if dependents.is_empty() {
            return;
        }
        trace!(
            kind = kind.as_str(),
            key,
            dependents = dependents.len(),
            "triggering dependents"
        );
        for effect in dependents {
            effect.run();
        }
    }

    fn notify_observers(&self, target: &Obj, kind: ChangeKind, key: &str) {
        let live: Vec<ObserverRc> = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|w| w.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        if live.is_empty() {
            return;
        }
        let event = ChangeEvent {
            target: target.clone(),
            kind,
            key: key.to_owned(),
        };
        for callback in &live {
            callback(&event);
        }
    }
}

/// RAII guard for a mutation observer.
///
/// Dropping the `Subscription` drops the strong reference to the callback;
/// the weak entry in the observer list fails to upgrade from then on and is
/// pruned at the next notification.
pub struct Subscription {
    _guard: ObserverRc,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
