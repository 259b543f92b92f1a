//! Arena-backed layout tree.
//!
//! Containers are addressed by stable [`ContainerId`] keys; parent links are
//! stored as keys, never as owning pointers, so sticky back-references stay
//! cheap and safe. Children are kept in tiling order.

use slotmap::SlotMap;

use crate::errors::{Result, TreeError};
use crate::models::{Container, ContainerKind, Handle, Rect};

slotmap::new_key_type! {
    /// Stable identity of a container in the layout tree.
    pub struct ContainerId;
}

#[derive(Debug)]
struct Node<H: Handle> {
    con: Container<H>,
    parent: Option<ContainerId>,
    children: Vec<ContainerId>,
}

/// The layout tree. Owns every container; the root is created with the tree
/// and lives as long as it.
#[derive(Debug)]
pub struct Tree<H: Handle> {
    arena: SlotMap<ContainerId, Node<H>>,
    root: ContainerId,
}

impl<H: Handle> Tree<H> {
    /// Creates a tree whose root covers the given screen rectangle.
    pub fn new(screen: Rect) -> Self {
        let mut arena = SlotMap::with_key();
        let root = arena.insert(Node {
            con: Container::new(ContainerKind::Root, screen),
            parent: None,
            children: Vec::new(),
        });
        Self { arena, root }
    }

    pub fn root(&self) -> ContainerId {
        self.root
    }

    pub fn contains(&self, id: ContainerId) -> bool {
        self.arena.contains_key(id)
    }

    pub fn get(&self, id: ContainerId) -> Option<&Container<H>> {
        self.arena.get(id).map(|n| &n.con)
    }

    pub fn get_mut(&mut self, id: ContainerId) -> Option<&mut Container<H>> {
        self.arena.get_mut(id).map(|n| &mut n.con)
    }

    pub fn parent(&self, id: ContainerId) -> Option<ContainerId> {
        self.arena.get(id).and_then(|n| n.parent)
    }

    /// The children of a container in tiling order.
    pub fn children(&self, id: ContainerId) -> &[ContainerId] {
        self.arena.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Appends a new container as the last child of `parent`.
    pub fn add_child(&mut self, parent: ContainerId, con: Container<H>) -> Result<ContainerId> {
        if !self.arena.contains_key(parent) {
            return Err(TreeError::NotFound);
        }
        let id = self.arena.insert(Node {
            con,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.arena[parent].children.push(id);
        Ok(id)
    }

    /// Detaches a subtree from its parent without dropping it. The subtree
    /// stays addressable until it is re-attached or removed.
    pub fn detach(&mut self, id: ContainerId) -> Result<()> {
        let node = self.arena.get(id).ok_or(TreeError::NotFound)?;
        let Some(parent) = node.parent else {
            return Err(TreeError::RootMutation);
        };
        self.arena[parent].children.retain(|c| *c != id);
        self.arena[id].parent = None;
        Ok(())
    }

    /// Attaches a previously detached subtree under `parent` at the given
    /// tiling position (clamped to the current child count).
    pub fn attach(&mut self, id: ContainerId, parent: ContainerId, index: usize) -> Result<()> {
        if !self.arena.contains_key(id) || !self.arena.contains_key(parent) {
            return Err(TreeError::NotFound);
        }
        if self.is_in_subtree(parent, id) {
            return Err(TreeError::CycleAttach);
        }
        if self.arena[id].parent.is_some() {
            self.detach(id)?;
        }
        let index = index.min(self.arena[parent].children.len());
        self.arena[parent].children.insert(index, id);
        self.arena[id].parent = Some(parent);
        Ok(())
    }

    /// Moves a subtree to be the last child of `parent`.
    pub fn move_to(&mut self, id: ContainerId, parent: ContainerId) -> Result<()> {
        let index = self.children(parent).len();
        if self.parent(id).is_some() {
            self.detach(id)?;
        }
        self.attach(id, parent, index)
    }

    /// Removes a subtree and every container in it. Returns the removed ids
    /// so callers can release per-container server state.
    pub fn remove(&mut self, id: ContainerId) -> Result<Vec<ContainerId>> {
        if id == self.root {
            return Err(TreeError::RootMutation);
        }
        if self.parent(id).is_some() {
            self.detach(id)?;
        }
        let removed = self.preorder(id);
        for rid in &removed {
            self.arena.remove(*rid);
        }
        tracing::trace!(con = ?id, count = removed.len(), "removed subtree");
        Ok(removed)
    }

    /// All containers of the subtree rooted at `id`, parents before
    /// children, siblings in tiling order.
    pub fn preorder(&self, id: ContainerId) -> Vec<ContainerId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.arena.get(cur) {
                out.push(cur);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    fn is_in_subtree(&self, id: ContainerId, ancestor: ContainerId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }
}
