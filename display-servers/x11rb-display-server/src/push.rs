//! The tree diff and push engine.
//!
//! `push_changes` is the single entry point the event loop drives once per
//! iteration, after the layout layer has settled its tree mutations. It
//! flushes the pending window stack strictly before per-node state, so a
//! newly mapped window appears at its correct depth instead of momentarily
//! on top, then walks the tree top-down and emits exactly the requests
//! needed to bring the server in line with the desired state.

use timberwm_core::{Container, ContainerId, ContainerKind, Tree, WindowHandle};

use crate::decoration;
use crate::error::{Error, Result};
use crate::session::XSession;
use crate::xatom::WmWindowState;
use crate::xwrap::XConn;
use crate::X11rbWindowHandle;

impl<C: XConn> XSession<C> {
    /// Pushes all changes (state of each node, see [`Self::push_node`], and
    /// the window stack) to the server.
    ///
    /// Per-node failures are contained so the walk always covers the whole
    /// tree; only a dead connection aborts the cycle.
    pub fn push_changes(&mut self, tree: &Tree<X11rbWindowHandle>) -> Result<()> {
        self.ensure_frames(tree)?;
        self.flush_stack()?;
        self.push_node(tree, tree.root(), false)?;
        self.conn.flush()
    }

    /// Pushes the properties of each node of the layout tree to the server
    /// if they have changed (map state, position, title, ...), recursively
    /// traversing all children of the given node in tiling order.
    pub fn push_node(
        &mut self,
        tree: &Tree<X11rbWindowHandle>,
        id: ContainerId,
        skip_decoration: bool,
    ) -> Result<()> {
        let Some(con) = tree.get(id) else {
            return Ok(());
        };
        if !matches!(con.kind, ContainerKind::Root) {
            if let Err(e) = self.push_con(id, con, skip_decoration) {
                if e.is_fatal() {
                    return Err(e);
                }
                match e {
                    Error::WindowGone(window) => {
                        tracing::warn!(window, con = ?id, "window vanished during push, dropping its state");
                        self.evict(id);
                    }
                    e => tracing::error!(con = ?id, error = ?e, "failed to push container state"),
                }
            }
        }
        for &child in tree.children(id) {
            self.push_node(tree, child, skip_decoration)?;
        }
        Ok(())
    }

    /// Decoration windows are allocated lazily, before the stack flush, so
    /// a brand-new window can be restacked to its final depth before it is
    /// ever mapped.
    fn ensure_frames(&mut self, tree: &Tree<X11rbWindowHandle>) -> Result<()> {
        for id in tree.preorder(tree.root()) {
            let Some(con) = tree.get(id) else {
                continue;
            };
            if matches!(con.kind, ContainerKind::Root) {
                continue;
            }
            if !self.state.get(id).is_some_and(|s| s.frame.is_none()) {
                continue;
            }
            let frame = self.conn.generate_id()?;
            self.conn.create_frame(frame, con.rect)?;
            if let Some(state) = self.state.get_mut(id) {
                state.frame = Some(frame);
            }
            tracing::debug!(con = ?id, frame, "created decoration window");
        }
        Ok(())
    }

    /// Emits restack requests when the desired stacking order differs from
    /// the order last pushed. The chain is rebuilt top-down with
    /// below-sibling configures, reproducing the whole order regardless of
    /// where the server currently has the windows.
    fn flush_stack(&mut self) -> Result<()> {
        let desired = self.state.stack_frames();
        if desired == self.state.pushed_stack {
            return Ok(());
        }
        for i in (0..desired.len().saturating_sub(1)).rev() {
            self.conn.restack_below(desired[i], desired[i + 1])?;
        }
        self.state.pushed_stack = desired;
        Ok(())
    }

    /// Diffs one container against its cached snapshot and emits the
    /// requests for exactly the dimensions that differ.
    fn push_con(
        &mut self,
        id: ContainerId,
        con: &Container<X11rbWindowHandle>,
        skip_decoration: bool,
    ) -> Result<()> {
        let client = con.window.map(|WindowHandle(X11rbWindowHandle(w))| w);
        let client_rect = decoration::client_rect(con, &self.theme);
        let abs_rect = client_rect.translate(con.rect.x, con.rect.y);

        let Some(state) = self.state.get_mut(id) else {
            // Not initialized; nothing of ours exists server-side.
            return Ok(());
        };
        let Some(frame) = state.frame else {
            return Ok(());
        };

        // A changed client association always needs a reparent into our
        // frame. The old occupant's requests were redirected when the move
        // was recorded.
        if state.client != client {
            state.client = client;
            state.pending_reparent = client.is_some();
        }

        if state.pending_reparent {
            if let Some(c) = client {
                self.conn.reparent(c, frame, client_rect.x, client_rect.y)?;
                // Force a full geometry push after the transfer.
                state.window_rect = None;
                state.abs_rect = None;
            }
            state.pending_reparent = false;
        }

        if state.rect != Some(con.rect) {
            self.conn.configure(frame, con.rect)?;
            state.rect = Some(con.rect);
        }

        if let Some(c) = client {
            if state.window_rect != Some(client_rect) {
                self.conn.configure(c, client_rect)?;
                state.window_rect = Some(client_rect);
            }
            // Clients learn about moves only through synthetic events; the
            // real ConfigureNotify they get is frame-relative.
            if state.abs_rect != Some(abs_rect) {
                self.conn.send_configure_notify(c, abs_rect, con.border_width)?;
                state.abs_rect = Some(abs_rect);
            }
        }

        if state.title.as_deref() != Some(con.title.as_str()) {
            self.conn.set_title(frame, &con.title)?;
            state.title = Some(con.title.clone());
        }

        if con.visible && !state.mapped {
            if let Some(c) = client {
                if !state.child_mapped {
                    self.conn.map(c)?;
                    state.child_mapped = true;
                }
                self.conn.set_wm_state(c, WmWindowState::Normal)?;
            }
            self.conn.map(frame)?;
            state.mapped = true;
        } else if !con.visible && state.mapped {
            self.conn.unmap(frame)?;
            if let Some(c) = client {
                self.conn.set_wm_state(c, WmWindowState::Withdrawn)?;
            }
            state.mapped = false;
        }

        let mapped = state.mapped;
        if !skip_decoration && mapped {
            self.draw_decoration(id, con);
        }
        Ok(())
    }

    /// Drops a container whose window raced away, as if it had been cleanly
    /// removed. The frame is still ours and is released with the entry.
    fn evict(&mut self, id: ContainerId) {
        if let Some(state) = self.state.remove(id) {
            if let Some(frame) = state.frame {
                if let Err(e) = self.conn.destroy_window(frame) {
                    tracing::warn!(frame, error = ?e, "could not release decoration window");
                }
            }
        }
    }
}
