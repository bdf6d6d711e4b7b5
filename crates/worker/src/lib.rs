//! Worker primitives shared by the suggestion engine.
//!
//! - [`spawn`] / [`spawn_blocking`] route work onto the ambient tokio runtime
//!   (or a lazily built global one) and tag it with a [`TaskClass`].
//! - [`spawn_isolated`] additionally watches the task so a panic is logged
//!   instead of surfacing anywhere else.
//! - [`GenerationToken`] pairs a [`Generation`] with a cancellation token; one
//!   token exists per search session.
//! - [`LabelledJoinSet`] joins a group of tasks and attributes each failure to
//!   the label it was spawned with.

mod class;
mod join_set;
mod panic;
mod spawn;
mod token;

pub use class::TaskClass;
pub use join_set::LabelledJoinSet;
pub use panic::{TaskFailure, join_error_panic_message};
pub use spawn::{spawn, spawn_blocking, spawn_isolated};
pub use token::{Generation, GenerationToken};
