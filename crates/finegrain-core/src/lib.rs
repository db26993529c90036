#![forbid(unsafe_code)]

//! Fine-grained reactive state engine.
//!
//! Wrap a plain object to get an instrumented view; reads performed inside a
//! registered computation record dependencies on the exact properties read,
//! and later writes to those properties re-run the dependent computations
//! synchronously, in the same call, before the write returns.
//!
//! # Architecture
//!
//! - [`Obj`] / [`Value`]: plain objects and the dynamic values they store.
//! - [`ReactiveObject`]: the instrumented view; reads track, writes diff and
//!   notify, deletes notify.
//! - [`Effect`]: a registered computation, re-run when its tracked reads
//!   change.
//! - [`Runtime`]: one reactive universe holding the identity registry, the
//!   dependency graph, and the execution stack. Universes are independent.
//!
//! Everything is single-threaded and synchronous: a write fans out to its
//! dependents depth-first on the current call stack. There is no scheduler,
//! no batching, and no async boundary.
//!
//! # Example
//!
//! ```
//! use finegrain_core::{Obj, Runtime};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let rt = Runtime::new();
//! let state = rt.make_reactive(Obj::new().with("name", "a"));
//! let state = state.as_reactive().unwrap().clone();
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let effect = {
//!     let state = state.clone();
//!     let log = Rc::clone(&log);
//!     rt.run_reactively(move || {
//!         let name = state.get("name").and_then(|v| v.as_str().map(String::from));
//!         log.borrow_mut().push(name.unwrap_or_default());
//!     })
//! };
//! assert_eq!(*log.borrow(), ["a"]);
//!
//! state.set("name", "b").unwrap();
//! assert_eq!(*log.borrow(), ["a", "b"]);
//!
//! // Writing the same value again is a no-op for dependents.
//! state.set("name", "b").unwrap();
//! assert_eq!(*log.borrow(), ["a", "b"]);
//!
//! drop(effect);
//! ```

pub mod effect;
pub mod error;
pub mod obj;
pub mod reactive;
pub mod runtime;
pub mod value;

mod graph;
mod registry;
mod stack;

pub use effect::Effect;
pub use error::{ReactiveError, Result};
pub use graph::ChangeKind;
pub use obj::Obj;
pub use reactive::ReactiveObject;
pub use runtime::{ChangeEvent, Runtime, Subscription};
pub use value::Value;
