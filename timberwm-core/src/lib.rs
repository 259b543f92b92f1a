//! Backend-agnostic layout tree model for TimberWM.
//!
//! The tree produced by the layout logic is consumed by a display server
//! backend, which reconciles it against the live server state. Nothing in
//! this crate names a concrete display server; backends plug in their own
//! window handle type through the [`models::Handle`] trait.

pub mod errors;
pub mod models;
pub mod tree;

pub use errors::TreeError;
pub use models::{BorderStyle, Container, ContainerKind, Handle, MockHandle, Rect, WindowHandle};
pub use tree::{ContainerId, Tree};
