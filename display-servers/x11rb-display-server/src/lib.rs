//! X11 backend built on [x11rb](https://github.com/psychon/x11rb).
//!
//! The backend mirrors the layout tree onto the X server: every container
//! owns one decoration window ("frame") with the client window reparented
//! inside, and a push cycle diffs the desired tree state against what was
//! last sent, emitting only the requests that changed. See
//! [`XSession::push_changes`].

use serde::{Deserialize, Serialize};
use x11rb::protocol::xproto;

pub mod decoration;
mod error;
#[cfg(test)]
mod mock_conn;
mod push;
mod session;
mod theme;
mod xatom;
mod xstate;
mod xwrap;

pub use error::{Error, Result};
pub use session::XSession;
pub use theme::{ColorTriple, Theme};
pub use xatom::{Atoms, WmWindowState};
pub use xwrap::{XConn, XWrap};

/// Handle to an X11 client window.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct X11rbWindowHandle(pub xproto::Window);

impl timberwm_core::Handle for X11rbWindowHandle {}

/// Session type over a live server connection.
pub type X11rbSession = XSession<XWrap>;
