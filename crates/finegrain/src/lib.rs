#![forbid(unsafe_code)]

//! Finegrain public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub use finegrain_core::{
    ChangeEvent, ChangeKind, Effect, Obj, ReactiveError, ReactiveObject, Result, Runtime,
    Subscription, Value,
};

pub mod prelude {
    pub use finegrain_core::{ChangeKind, Obj, Runtime, Value};
}
