//! Error handling and reporting for this backend.

use thiserror::Error;
use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::protocol::xproto;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The server no longer knows the addressed window. Expected when an
    /// application destroys its window while we still hold the handle.
    #[error("Window {0} no longer exists.")]
    WindowGone(xproto::Window),

    #[error("Unable to connect to the X server: {0}")]
    Connect(#[from] ConnectError),

    #[error("Connection error occured: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Unable to parse reply: {0}")]
    Reply(ReplyError),

    #[error("Unable to allocate a resource id: {0}")]
    Id(#[from] ReplyOrIdError),
}

impl Error {
    /// Whether the error means the connection itself is unusable. Fatal
    /// errors abort the push cycle; everything else is contained to the
    /// container that produced it.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::WindowGone(_) => false,
            Self::Connect(_) | Self::Connection(_) | Self::Id(_) => true,
            Self::Reply(e) => matches!(e, ReplyError::ConnectionError(_)),
        }
    }
}

/// Maps a checked reply for `window` into our error space. An X11 `Window`
/// or `Drawable` error on a query means the window raced away, which
/// callers treat as a no-op cleanup trigger rather than a failure.
pub(crate) fn check_reply<T>(
    window: xproto::Window,
    res: std::result::Result<T, ReplyError>,
) -> Result<T> {
    use x11rb::protocol::ErrorKind;
    match res {
        Ok(t) => Ok(t),
        Err(ReplyError::X11Error(e))
            if matches!(e.error_kind, ErrorKind::Window | ErrorKind::Drawable) =>
        {
            Err(Error::WindowGone(window))
        }
        Err(ReplyError::ConnectionError(e)) => Err(Error::Connection(e)),
        Err(e) => Err(Error::Reply(e)),
    }
}
