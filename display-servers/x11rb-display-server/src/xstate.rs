//! The container X-state store.
//!
//! For every initialized container this keeps the server-side handles and
//! the state last actually pushed to the server, so the push engine can
//! diff desired state against it and emit only what changed. The store also
//! owns the desired window stack; restack requests mutate it here and are
//! flushed lazily by the next push cycle.

use std::collections::HashMap;

use timberwm_core::{ContainerId, Rect};
use x11rb::protocol::xproto;

use crate::decoration::DecorationParams;

/// Last-known-pushed snapshot of one container.
#[derive(Debug, Default)]
pub(crate) struct ConState {
    /// Decoration window, created lazily at the first push.
    pub frame: Option<xproto::Window>,
    /// Client window the server currently has parented into the frame.
    pub client: Option<xproto::Window>,
    /// The client must be reparented into the frame at the next push.
    pub pending_reparent: bool,
    pub mapped: bool,
    /// The client child has been mapped inside the frame.
    pub child_mapped: bool,
    /// Frame geometry as last pushed.
    pub rect: Option<Rect>,
    /// Frame-relative client geometry as last pushed.
    pub window_rect: Option<Rect>,
    /// Absolute client geometry last announced via synthetic ConfigureNotify.
    pub abs_rect: Option<Rect>,
    pub title: Option<String>,
    pub deco: Option<DecorationParams>,
}

impl ConState {
    /// Forgets everything pushed so far. The next diff runs against a clean
    /// slate and re-sends the container's full state. The frame window is
    /// kept; it still exists server-side.
    pub fn reset(&mut self) {
        let frame = self.frame;
        *self = Self::default();
        self.frame = frame;
    }
}

/// Process-wide store: per-container snapshots plus the desired stacking
/// order. Touched only between push cycles; there is no concurrent writer.
#[derive(Debug, Default)]
pub(crate) struct XState {
    cons: HashMap<ContainerId, ConState>,
    /// Desired stacking order, bottom to top.
    stack: Vec<ContainerId>,
    /// Frame ids in the order last flushed to the server, bottom to top.
    pub pushed_stack: Vec<xproto::Window>,
}

impl XState {
    pub fn insert(&mut self, id: ContainerId) {
        self.cons.insert(id, ConState::default());
        // New containers start on top of everything else.
        self.stack.retain(|c| *c != id);
        self.stack.push(id);
    }

    pub fn get(&self, id: ContainerId) -> Option<&ConState> {
        self.cons.get(&id)
    }

    pub fn get_mut(&mut self, id: ContainerId) -> Option<&mut ConState> {
        self.cons.get_mut(&id)
    }

    pub fn contains(&self, id: ContainerId) -> bool {
        self.cons.contains_key(&id)
    }

    /// Removes a container from the store and the stack in one step, so the
    /// cache never outlives the handles it describes.
    pub fn remove(&mut self, id: ContainerId) -> Option<ConState> {
        self.stack.retain(|c| *c != id);
        self.cons.remove(&id)
    }

    /// Moves the container to the top of the desired stack. Ties between
    /// several raises in one cycle resolve last-writer-wins.
    pub fn raise(&mut self, id: ContainerId) {
        if !self.cons.contains_key(&id) {
            return;
        }
        self.stack.retain(|c| *c != id);
        self.stack.push(id);
    }

    pub fn stack(&self) -> &[ContainerId] {
        &self.stack
    }

    /// The desired stack lowered to frame ids, bottom to top. Containers
    /// whose frame does not exist yet are skipped; they join the flushed
    /// order once created.
    pub fn stack_frames(&self) -> Vec<xproto::Window> {
        self.stack
            .iter()
            .filter_map(|id| self.cons.get(id).and_then(|s| s.frame))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timberwm_core::{MockHandle, Tree};

    fn ids() -> (ContainerId, ContainerId, ContainerId) {
        // Keys must come from a real arena; slotmap keys are not forgeable.
        let mut tree: Tree<MockHandle> = Tree::new(Rect::new(0, 0, 1, 1));
        let root = tree.root();
        let make = |tree: &mut Tree<MockHandle>| {
            tree.add_child(
                root,
                timberwm_core::Container::new(
                    timberwm_core::ContainerKind::Workspace,
                    Rect::default(),
                ),
            )
            .unwrap()
        };
        (make(&mut tree), make(&mut tree), make(&mut tree))
    }

    #[test]
    fn raise_is_last_writer_wins() {
        let (a, b, c) = ids();
        let mut state = XState::default();
        state.insert(a);
        state.insert(b);
        state.insert(c);
        state.raise(a);
        state.raise(b);
        assert_eq!(state.stack(), &[c, a, b]);
        state.raise(a);
        assert_eq!(state.stack(), &[c, b, a]);
    }

    #[test]
    fn remove_clears_cache_and_stack_together() {
        let (a, b, _) = ids();
        let mut state = XState::default();
        state.insert(a);
        state.insert(b);
        assert!(state.remove(a).is_some());
        assert!(!state.contains(a));
        assert_eq!(state.stack(), &[b]);
        assert!(state.remove(a).is_none());
    }

    #[test]
    fn stack_frames_skips_frameless_containers() {
        let (a, b, _) = ids();
        let mut state = XState::default();
        state.insert(a);
        state.insert(b);
        state.get_mut(b).unwrap().frame = Some(42);
        assert_eq!(state.stack_frames(), vec![42]);
    }

    #[test]
    fn reset_keeps_the_frame_only() {
        let mut st = ConState {
            frame: Some(7),
            client: Some(9),
            mapped: true,
            child_mapped: true,
            rect: Some(Rect::new(0, 0, 10, 10)),
            title: Some("old".into()),
            ..Default::default()
        };
        st.reset();
        assert_eq!(st.frame, Some(7));
        assert_eq!(st.client, None);
        assert!(!st.mapped);
        assert_eq!(st.rect, None);
        assert_eq!(st.title, None);
    }
}
