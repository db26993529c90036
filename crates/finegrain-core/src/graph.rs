#![forbid(unsafe_code)]

//! Dependency graph: object identity → property name → interested computations.
//!
//! # Design
//!
//! Two-level map. The outer level is keyed by object identity, the inner by
//! property name. Each property holds its dependents as an insertion-ordered
//! list of weak computation references, so the graph never owns a
//! computation: dropping the last [`Effect`] handle retires it, and dead
//! entries are pruned lazily the next time the property is notified.
//!
//! # Invariants
//!
//! 1. Recording is idempotent: a computation reading the same property twice
//!    appears once in its list.
//! 2. Notification order is recording order (order of first observation).
//! 3. [`DependencyGraph::dependents`] returns a snapshot upgraded at the
//!    moment notification begins; a re-run that records new edges into the
//!    same list never affects an in-flight fan-out.
//!
//! Edges recorded by a previous run are kept even when a later run no longer
//! performs that read. Only edges whose computation has been dropped are
//! removed.

use std::collections::HashMap;
use std::rc::Weak;

use crate::effect::{Effect, EffectInner};
use crate::obj::{Obj, ObjId, ObjWeak};

/// What a notification reports about the underlying mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A previously-absent property was created.
    Add,
    /// An existing property was set to a strictly-unequal value.
    Set,
    /// An existing property was removed.
    Delete,
}

impl ChangeKind {
    /// Lowercase name, used for log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Set => "set",
            Self::Delete => "delete",
        }
    }
}

struct TargetDeps {
    /// Pins the object's allocation so the outer key cannot be reused by a
    /// later allocation while this entry exists.
    _target: ObjWeak,
    props: HashMap<String, Vec<Weak<EffectInner>>>,
}

pub(crate) struct DependencyGraph {
    targets: HashMap<ObjId, TargetDeps>,
}

impl DependencyGraph {
    pub(crate) fn new() -> Self {
        Self {
            targets: HashMap::new(),
        }
    }

    /// Record that `effect` read `target[key]`. Idempotent.
    pub(crate) fn record(&mut self, target: &Obj, key: &str, effect: &Effect) {
        let entry = self
            .targets
            .entry(target.id())
            .or_insert_with(|| TargetDeps {
                _target: target.downgrade(),
                props: HashMap::new(),
            });
        let deps = entry.props.entry(key.to_owned()).or_default();
        if !deps.iter().any(|w| effect.matches(w)) {
            deps.push(effect.downgrade());
        }
    }

    /// Live dependents of `target[key]` in recording order, as a stable
    /// snapshot. Dead entries are pruned. Missing levels yield an empty
    /// snapshot.
    pub(crate) fn dependents(&mut self, target: &Obj, key: &str) -> Vec<Effect> {
        let Some(entry) = self.targets.get_mut(&target.id()) else {
            return Vec::new();
        };
        let Some(deps) = entry.props.get_mut(key) else {
            return Vec::new();
        };
        deps.retain(|w| w.strong_count() > 0);
        deps.iter().filter_map(Effect::from_weak).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
