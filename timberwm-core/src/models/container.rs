//! Container information.

use serde::{Deserialize, Serialize};

use super::{Handle, Rect, WindowHandle};

/// What role a container plays in the layout tree.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// The singular tree root, standing in for the server root window.
    Root,
    Workspace,
    Split,
    Leaf,
}

/// How a container's decoration is drawn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    /// Title bar plus border.
    #[default]
    Normal,
    /// Border only.
    Pixel,
    /// No decoration at all.
    None,
}

/// A unit of the layout tree: a workspace, a split container, or a leaf
/// holding a client window.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Container<H: Handle> {
    pub kind: ContainerKind,
    pub rect: Rect,
    pub border_style: BorderStyle,
    pub border_width: i32,
    pub title: String,
    /// Whether the container should currently be mapped on screen.
    pub visible: bool,
    pub focused: bool,
    pub urgent: bool,
    /// Visually attached to a different ancestor than the logical parent.
    pub sticky: bool,
    /// The managed client window. Only `Leaf` containers carry one.
    #[serde(bound = "")]
    pub window: Option<WindowHandle<H>>,
}

impl<H: Handle> Container<H> {
    pub fn new(kind: ContainerKind, rect: Rect) -> Self {
        Self {
            kind,
            rect,
            border_style: BorderStyle::default(),
            border_width: 2,
            title: String::new(),
            visible: true,
            focused: false,
            urgent: false,
            sticky: false,
            window: None,
        }
    }

    pub fn leaf(rect: Rect, window: WindowHandle<H>) -> Self {
        let mut con = Self::new(ContainerKind::Leaf, rect);
        con.window = Some(window);
        con
    }

    pub const fn is_leaf(&self) -> bool {
        matches!(self.kind, ContainerKind::Leaf)
    }
}
