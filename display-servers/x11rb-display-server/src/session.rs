//! Session surface the layout layer drives.
//!
//! Everything here either mutates bookkeeping that the next push cycle
//! flushes, or performs the few operations that talk to the server
//! directly (capability query, termination, debug naming).

use timberwm_core::{Container, ContainerId};
use x11rb::protocol::xproto::{self, Atom};

use crate::decoration;
use crate::error::{Error, Result};
use crate::theme::Theme;
use crate::xatom::Atoms;
use crate::xstate::XState;
use crate::xwrap::XConn;
use crate::X11rbWindowHandle;

/// Reconciliation session against one X server connection. Owns the atom
/// registry, the decoration theme and the container X-state store.
pub struct XSession<C: XConn> {
    pub(crate) conn: C,
    pub(crate) atoms: Atoms,
    pub(crate) theme: Theme,
    pub(crate) state: XState,
}

impl<C: XConn> XSession<C> {
    pub fn new(conn: C, atoms: Atoms, theme: Theme) -> Self {
        Self {
            conn,
            atoms,
            theme,
            state: XState::default(),
        }
    }

    pub fn atoms(&self) -> &Atoms {
        &self.atoms
    }

    /// The decoration window of a container, once the first push created it.
    pub fn frame_window(&self, id: ContainerId) -> Option<xproto::Window> {
        self.state.get(id).and_then(|s| s.frame)
    }

    /// Registers a newly created container. Called exactly once per node;
    /// no server resources are allocated until the first push.
    pub fn con_init(&mut self, id: ContainerId) {
        debug_assert!(!self.state.contains(id));
        self.state.insert(id);
        tracing::trace!(con = ?id, "initialized container state");
    }

    /// Re-initializes a container that gained a new client association.
    /// The cached snapshot of the previous occupant is discarded so the
    /// next diff re-sends the full desired state.
    pub fn con_reinit(&mut self, id: ContainerId) {
        match self.state.get_mut(id) {
            Some(state) => state.reset(),
            None => self.state.insert(id),
        }
        tracing::trace!(con = ?id, "reset container state for a new client");
    }

    /// Releases the container's server resources and forgets its cache
    /// entry and stack slot in the same step.
    pub fn con_kill(&mut self, id: ContainerId) -> Result<()> {
        if let Some(state) = self.state.remove(id) {
            if let Some(frame) = state.frame {
                self.conn.destroy_window(frame)?;
            }
        }
        Ok(())
    }

    /// Transfers the client window bookkeeping from `src` to `dest`. The
    /// server-side reparent is deferred to the next push, so several moves
    /// within one mutation batch collapse into a single request.
    pub fn move_client(&mut self, src: ContainerId, dest: ContainerId) {
        let Some(src_state) = self.state.get_mut(src) else {
            return;
        };
        let window_rect = src_state.window_rect.take();
        let abs_rect = src_state.abs_rect.take();
        let child_mapped = std::mem::take(&mut src_state.child_mapped);
        src_state.pending_reparent = false;
        src_state.client = None;

        if let Some(dest_state) = self.state.get_mut(dest) {
            dest_state.pending_reparent = true;
            dest_state.window_rect = window_rect;
            dest_state.abs_rect = abs_rect;
            dest_state.child_mapped = child_mapped;
        }
    }

    /// Re-records a container's client as needing a reparent, used for
    /// sticky containers that visually follow a different ancestor than
    /// their logical parent. Applied at the next push.
    pub fn reparent_child(&mut self, id: ContainerId, _old: ContainerId) {
        if let Some(state) = self.state.get_mut(id) {
            state.pending_reparent = true;
        }
    }

    /// Moves the container to the top of the desired window stack. Visible
    /// at the next push.
    pub fn raise(&mut self, id: ContainerId) {
        self.state.raise(id);
    }

    /// Whether the window lists `protocol` in its `WM_PROTOCOLS` property.
    /// A vanished window or a missing property reads as "not supported".
    pub fn supports_protocol(&self, window: xproto::Window, protocol: Atom) -> bool {
        match self.conn.window_protocols(window) {
            Ok(protocols) => protocols.contains(&protocol),
            Err(Error::WindowGone(_)) => false,
            Err(e) => {
                tracing::warn!(window, error = ?e, "could not read WM_PROTOCOLS");
                false
            }
        }
    }

    /// Closes the window gracefully when it advertises `WM_DELETE_WINDOW`,
    /// otherwise kills its client immediately.
    pub fn window_kill(&self, window: xproto::Window) -> Result<()> {
        if self.supports_protocol(window, self.atoms.wm_delete_window) {
            self.conn.send_protocol_message(window, self.atoms.wm_delete_window)
        } else {
            self.conn.kill_client(window)
        }
    }

    /// Best-effort debug label on the container's decoration window, for
    /// spotting our windows in `xwininfo -root -all`. Never fails callers.
    pub fn set_name(&self, id: ContainerId, name: &str) {
        let Some(frame) = self.frame_window(id) else {
            return;
        };
        if let Err(e) = self.conn.set_debug_name(frame, name) {
            tracing::trace!(frame, error = ?e, "could not set debug name");
        }
    }

    /// Publishes the control socket and configuration paths on the root
    /// window, once at startup, for discovery by external tooling.
    pub fn set_manager_atoms(&self, socket_path: &str, config_path: &str) -> Result<()> {
        self.conn
            .set_root_text_property(self.atoms.timberwm_socket_path, socket_path)?;
        self.conn
            .set_root_text_property(self.atoms.timberwm_config_path, config_path)
    }

    /// Paints the container's chrome if its presentation changed since the
    /// last paint. A rendering failure degrades to an unstyled frame and
    /// never aborts the caller.
    pub fn draw_decoration(&mut self, id: ContainerId, con: &Container<X11rbWindowHandle>) {
        let params = decoration::params_for(con, &self.theme);
        let Some(state) = self.state.get_mut(id) else {
            return;
        };
        let Some(frame) = state.frame else {
            return;
        };
        if state.deco == params {
            return;
        }
        if let Some(p) = &params {
            if let Err(e) = self.conn.draw_decoration(frame, p) {
                tracing::warn!(frame, error = ?e, "decoration rendering failed, leaving the frame unstyled");
            }
        }
        state.deco = params;
    }
}
