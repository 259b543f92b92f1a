//! Recording connection used by the reconciler tests.
//!
//! Logs every request, keeps a simulated server-side stacking order and a
//! set of live windows, and reports [`Error::WindowGone`] for operations on
//! windows that were destroyed behind our back.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use timberwm_core::Rect;
use x11rb::protocol::xproto::{self, Atom};

use crate::decoration::DecorationParams;
use crate::error::{Error, Result};
use crate::xatom::{Atoms, WmWindowState};
use crate::xwrap::XConn;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Request {
    CreateFrame {
        frame: xproto::Window,
        rect: Rect,
    },
    DestroyWindow(xproto::Window),
    Configure {
        window: xproto::Window,
        rect: Rect,
    },
    Reparent {
        window: xproto::Window,
        parent: xproto::Window,
        x: i32,
        y: i32,
    },
    Map(xproto::Window),
    Unmap(xproto::Window),
    RestackBelow {
        window: xproto::Window,
        sibling: xproto::Window,
    },
    SetTitle {
        window: xproto::Window,
        title: String,
    },
    SetDebugName {
        window: xproto::Window,
        name: String,
    },
    SetWmState {
        window: xproto::Window,
        state: WmWindowState,
    },
    ConfigureNotify {
        window: xproto::Window,
        rect: Rect,
    },
    ProtocolMessage {
        window: xproto::Window,
        protocol: Atom,
    },
    KillClient(xproto::Window),
    DrawDecoration {
        frame: xproto::Window,
    },
    RootProperty {
        atom: Atom,
        value: String,
    },
}

impl Request {
    /// The window the request addresses, for minimality assertions.
    pub fn target(&self) -> Option<xproto::Window> {
        match *self {
            Self::CreateFrame { frame, .. } | Self::DrawDecoration { frame } => Some(frame),
            Self::DestroyWindow(w)
            | Self::Map(w)
            | Self::Unmap(w)
            | Self::KillClient(w) => Some(w),
            Self::Configure { window, .. }
            | Self::Reparent { window, .. }
            | Self::RestackBelow { window, .. }
            | Self::SetTitle { window, .. }
            | Self::SetDebugName { window, .. }
            | Self::SetWmState { window, .. }
            | Self::ConfigureNotify { window, .. }
            | Self::ProtocolMessage { window, .. } => Some(window),
            Self::RootProperty { .. } => None,
        }
    }
}

pub(crate) struct MockConn {
    next_id: Cell<xproto::Window>,
    pub log: RefCell<Vec<Request>>,
    /// Simulated server stacking order, bottom to top.
    pub stacking: RefCell<Vec<xproto::Window>>,
    live: RefCell<HashSet<xproto::Window>>,
    protocols: RefCell<HashMap<xproto::Window, Vec<Atom>>>,
}

impl MockConn {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0x0060_0000),
            log: RefCell::new(Vec::new()),
            stacking: RefCell::new(Vec::new()),
            live: RefCell::new(HashSet::new()),
            protocols: RefCell::new(HashMap::new()),
        }
    }

    /// Registers an application window that exists server-side.
    pub fn add_client(&self, window: xproto::Window, protocols: &[Atom]) {
        self.live.borrow_mut().insert(window);
        self.protocols.borrow_mut().insert(window, protocols.to_vec());
    }

    /// Simulates the application destroying its window behind our back.
    pub fn destroy_externally(&self, window: xproto::Window) {
        self.live.borrow_mut().remove(&window);
    }

    pub fn take_log(&self) -> Vec<Request> {
        self.log.borrow_mut().drain(..).collect()
    }

    fn record(&self, window: xproto::Window, req: Request) -> Result<()> {
        if !self.live.borrow().contains(&window) {
            return Err(Error::WindowGone(window));
        }
        self.log.borrow_mut().push(req);
        Ok(())
    }
}

pub(crate) fn test_atoms() -> Atoms {
    Atoms {
        wm_protocols: 1,
        wm_delete_window: 2,
        wm_state: 3,
        net_wm_name: 4,
        utf8_string: 5,
        timberwm_socket_path: 6,
        timberwm_config_path: 7,
    }
}

impl XConn for MockConn {
    fn generate_id(&self) -> Result<xproto::Window> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Ok(id)
    }

    fn create_frame(&self, frame: xproto::Window, rect: Rect) -> Result<()> {
        self.live.borrow_mut().insert(frame);
        self.stacking.borrow_mut().push(frame);
        self.log.borrow_mut().push(Request::CreateFrame { frame, rect });
        Ok(())
    }

    fn destroy_window(&self, window: xproto::Window) -> Result<()> {
        self.live.borrow_mut().remove(&window);
        self.stacking.borrow_mut().retain(|w| *w != window);
        self.log.borrow_mut().push(Request::DestroyWindow(window));
        Ok(())
    }

    fn configure(&self, window: xproto::Window, rect: Rect) -> Result<()> {
        self.record(window, Request::Configure { window, rect })
    }

    fn reparent(
        &self,
        window: xproto::Window,
        parent: xproto::Window,
        x: i32,
        y: i32,
    ) -> Result<()> {
        self.record(window, Request::Reparent { window, parent, x, y })
    }

    fn map(&self, window: xproto::Window) -> Result<()> {
        self.record(window, Request::Map(window))
    }

    fn unmap(&self, window: xproto::Window) -> Result<()> {
        self.record(window, Request::Unmap(window))
    }

    fn restack_below(&self, window: xproto::Window, sibling: xproto::Window) -> Result<()> {
        {
            let mut stacking = self.stacking.borrow_mut();
            stacking.retain(|w| *w != window);
            if let Some(pos) = stacking.iter().position(|w| *w == sibling) {
                stacking.insert(pos, window);
            } else {
                stacking.push(window);
            }
        }
        self.record(window, Request::RestackBelow { window, sibling })
    }

    fn set_title(&self, window: xproto::Window, title: &str) -> Result<()> {
        self.record(
            window,
            Request::SetTitle {
                window,
                title: title.to_owned(),
            },
        )
    }

    fn set_debug_name(&self, window: xproto::Window, name: &str) -> Result<()> {
        self.record(
            window,
            Request::SetDebugName {
                window,
                name: name.to_owned(),
            },
        )
    }

    fn set_wm_state(&self, window: xproto::Window, state: WmWindowState) -> Result<()> {
        self.record(window, Request::SetWmState { window, state })
    }

    fn send_configure_notify(&self, window: xproto::Window, abs: Rect, _border: i32) -> Result<()> {
        self.record(window, Request::ConfigureNotify { window, rect: abs })
    }

    fn window_protocols(&self, window: xproto::Window) -> Result<Vec<Atom>> {
        if !self.live.borrow().contains(&window) {
            return Err(Error::WindowGone(window));
        }
        Ok(self.protocols.borrow().get(&window).cloned().unwrap_or_default())
    }

    fn send_protocol_message(&self, window: xproto::Window, protocol: Atom) -> Result<()> {
        self.record(window, Request::ProtocolMessage { window, protocol })
    }

    fn kill_client(&self, window: xproto::Window) -> Result<()> {
        self.log.borrow_mut().push(Request::KillClient(window));
        Ok(())
    }

    fn draw_decoration(&self, frame: xproto::Window, _params: &DecorationParams) -> Result<()> {
        self.record(frame, Request::DrawDecoration { frame })
    }

    fn set_root_text_property(&self, atom: Atom, value: &str) -> Result<()> {
        self.log.borrow_mut().push(Request::RootProperty {
            atom,
            value: value.to_owned(),
        });
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
