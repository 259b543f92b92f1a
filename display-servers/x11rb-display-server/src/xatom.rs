use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, Atom};

use crate::error::{check_reply, Result};

/// Symbolic atoms used by this backend, resolved once at connection setup
/// and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Atoms {
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
    pub wm_state: Atom,
    pub net_wm_name: Atom,
    pub utf8_string: Atom,
    /// Control socket path, exposed on the root window for external tooling.
    pub timberwm_socket_path: Atom,
    /// Active configuration path, exposed next to the socket path.
    pub timberwm_config_path: Atom,
}

impl Atoms {
    pub fn resolve(conn: &impl Connection) -> Result<Self> {
        Ok(Self {
            wm_protocols: intern(conn, "WM_PROTOCOLS")?,
            wm_delete_window: intern(conn, "WM_DELETE_WINDOW")?,
            wm_state: intern(conn, "WM_STATE")?,
            net_wm_name: intern(conn, "_NET_WM_NAME")?,
            utf8_string: intern(conn, "UTF8_STRING")?,
            timberwm_socket_path: intern(conn, "_TIMBERWM_SOCKET_PATH")?,
            timberwm_config_path: intern(conn, "_TIMBERWM_CONFIG_PATH")?,
        })
    }
}

fn intern(conn: &impl Connection, name: &str) -> Result<Atom> {
    let cookie = xproto::intern_atom(conn, false, name.as_bytes())?;
    Ok(check_reply(x11rb::NONE, cookie.reply())?.atom)
}

/// Possible values of the `state` field of `WM_STATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmWindowState {
    Withdrawn,
    Normal,
    Iconic,
}

impl From<WmWindowState> for u32 {
    fn from(value: WmWindowState) -> Self {
        match value {
            WmWindowState::Withdrawn => 0,
            WmWindowState::Normal => 1,
            WmWindowState::Iconic => 3,
        }
    }
}
