#![forbid(unsafe_code)]

//! Computations: re-runnable units of work with tracked reads.
//!
//! # Design
//!
//! An [`Effect`] is a cheaply-cloneable handle over a boxed no-argument body
//! plus the universe it belongs to. Running it pushes the handle onto the
//! universe's execution stack, executes the body, and pops. The push/pop
//! pairing is carried by an RAII scope guard, so a panicking body unwinds
//! through the pop before the panic propagates to the caller.
//!
//! The dependency graph holds only weak references to computations. The
//! handle returned by [`Runtime::run_reactively`](crate::Runtime::run_reactively)
//! is the owning reference: dropping it retires the computation, and its
//! dependency edges are pruned lazily on the next notification.
//!
//! # Failure Modes
//!
//! - **Self-triggering body**: a computation that writes a property it also
//!   reads re-enters itself synchronously and recurses without bound. The
//!   engine does not detect this; it is a caller responsibility.

use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::runtime::RuntimeInner;

static NEXT_EFFECT_ID: AtomicU64 = AtomicU64::new(1);

fn next_effect_id() -> u64 {
    NEXT_EFFECT_ID.fetch_add(1, Ordering::Relaxed)
}

pub(crate) struct EffectInner {
    id: u64,
    body: Box<dyn Fn()>,
    rt: Rc<RuntimeInner>,
}

/// A registered computation.
///
/// Cloning an `Effect` creates a new handle to the **same** computation.
/// The computation stays eligible for re-runs for as long as at least one
/// handle is alive.
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.inner.id)
            .finish_non_exhaustive()
    }
}

impl Effect {
    pub(crate) fn new(rt: Rc<RuntimeInner>, body: impl Fn() + 'static) -> Self {
        Self {
            inner: Rc::new(EffectInner {
                id: next_effect_id(),
                body: Box::new(body),
                rt,
            }),
        }
    }

    /// Run the body now, with reads tracked against this computation.
    ///
    /// Re-entrant: a body may trigger other computations (or itself, see the
    /// module docs) while this one is still on the stack. A panic in the
    /// body propagates to the caller after the stack entry is popped.
    pub fn run(&self) {
        let _scope = ActiveScope::enter(&self.inner.rt, self.clone());
        trace!(effect_id = self.inner.id, "running computation");
        (self.inner.body)();
    }

    /// Diagnostic identifier, unique within the process.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Whether two handles refer to the same computation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Effect) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> Weak<EffectInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn matches(&self, weak: &Weak<EffectInner>) -> bool {
        std::ptr::eq(weak.as_ptr(), Rc::as_ptr(&self.inner))
    }

    pub(crate) fn from_weak(weak: &Weak<EffectInner>) -> Option<Effect> {
        weak.upgrade().map(|inner| Effect { inner })
    }
}

/// Scope guard pairing every stack push with exactly one pop.
struct ActiveScope {
    rt: Rc<RuntimeInner>,
}

impl ActiveScope {
    fn enter(rt: &Rc<RuntimeInner>, effect: Effect) -> Self {
        rt.stack.borrow_mut().push(effect);
        Self { rt: Rc::clone(rt) }
    }
}

impl Drop for ActiveScope {
    fn drop(&mut self) {
        self.rt.stack.borrow_mut().pop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
