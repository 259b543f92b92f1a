//! X server communication.
//!
//! [`XConn`] is the exact set of wire operations the reconciler emits;
//! [`XWrap`] implements it over a live `RustConnection`. Requests are
//! fire-and-forget from this layer's perspective: only property queries
//! read a reply synchronously, and only those can observe that a window
//! raced away ([`Error::WindowGone`]).

use timberwm_core::{BorderStyle, Rect};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, Atom};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use crate::decoration::DecorationParams;
use crate::error::{check_reply, Result};
use crate::xatom::{Atoms, WmWindowState};

const MAX_PROPERTY_VALUE_LEN: u32 = 4096;

/// The wire operations the reconciler needs from a display server
/// connection. Implemented by [`XWrap`] for a real server and by a
/// recording mock in tests.
pub trait XConn {
    fn generate_id(&self) -> Result<xproto::Window>;
    /// Creates an unmapped decoration window as a child of the root.
    fn create_frame(&self, frame: xproto::Window, rect: Rect) -> Result<()>;
    fn destroy_window(&self, window: xproto::Window) -> Result<()>;
    fn configure(&self, window: xproto::Window, rect: Rect) -> Result<()>;
    fn reparent(&self, window: xproto::Window, parent: xproto::Window, x: i32, y: i32)
        -> Result<()>;
    fn map(&self, window: xproto::Window) -> Result<()>;
    fn unmap(&self, window: xproto::Window) -> Result<()>;
    /// Stacks `window` directly below `sibling`.
    fn restack_below(&self, window: xproto::Window, sibling: xproto::Window) -> Result<()>;
    fn set_title(&self, window: xproto::Window, title: &str) -> Result<()>;
    /// Plain-text `WM_NAME` label used only by inspection tooling.
    fn set_debug_name(&self, window: xproto::Window, name: &str) -> Result<()>;
    fn set_wm_state(&self, window: xproto::Window, state: WmWindowState) -> Result<()>;
    /// Synthetic `ConfigureNotify` telling the client its absolute geometry.
    fn send_configure_notify(&self, window: xproto::Window, abs: Rect, border: i32) -> Result<()>;
    /// The atoms listed in the window's `WM_PROTOCOLS` property.
    fn window_protocols(&self, window: xproto::Window) -> Result<Vec<Atom>>;
    /// Sends a `WM_PROTOCOLS` client message carrying `protocol`.
    fn send_protocol_message(&self, window: xproto::Window, protocol: Atom) -> Result<()>;
    fn kill_client(&self, window: xproto::Window) -> Result<()>;
    fn draw_decoration(&self, frame: xproto::Window, params: &DecorationParams) -> Result<()>;
    fn set_root_text_property(&self, atom: Atom, value: &str) -> Result<()>;
    fn flush(&self) -> Result<()>;
}

/// Contains the Xserver connection and the resources the backend paints
/// with.
pub struct XWrap {
    conn: RustConnection,
    root: xproto::Window,
    pub atoms: Atoms,
    gc: xproto::Gcontext,
}

impl XWrap {
    pub fn new() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None)?;
        let root = conn.setup().roots[screen_num].root;
        let atoms = Atoms::resolve(&conn)?;

        let font = conn.generate_id()?;
        xproto::open_font(&conn, font, b"fixed")?;
        let gc = conn.generate_id()?;
        xproto::create_gc(
            &conn,
            gc,
            root,
            &xproto::CreateGCAux::new().font(font).graphics_exposures(0),
        )?;
        xproto::close_font(&conn, font)?;

        Ok(Self {
            conn,
            root,
            atoms,
            gc,
        })
    }

    pub fn root(&self) -> xproto::Window {
        self.root
    }

    /// Send a xevent for a window to X.
    // `XSendEvent`: https://tronche.com/gui/x/xlib/event-handling/XSendEvent.html
    fn send_xevent(
        &self,
        window: xproto::Window,
        mask: xproto::EventMask,
        event: &[u8],
    ) -> Result<()> {
        let mut data = [0u8; 32];
        let len = event.len().min(32);
        data[..len].copy_from_slice(&event[..len]);
        xproto::send_event(&self.conn, false, window, mask, data)?;
        Ok(())
    }
}

impl XConn for XWrap {
    fn generate_id(&self) -> Result<xproto::Window> {
        Ok(self.conn.generate_id()?)
    }

    fn create_frame(&self, frame: xproto::Window, rect: Rect) -> Result<()> {
        let aux = xproto::CreateWindowAux::new()
            .event_mask(xproto::EventMask::SUBSTRUCTURE_NOTIFY | xproto::EventMask::EXPOSURE);
        xproto::create_window(
            &self.conn,
            x11rb::COPY_DEPTH_FROM_PARENT,
            frame,
            self.root,
            pos(rect.x),
            pos(rect.y),
            size(rect.w),
            size(rect.h),
            0,
            xproto::WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &aux,
        )?;
        Ok(())
    }

    fn destroy_window(&self, window: xproto::Window) -> Result<()> {
        xproto::destroy_window(&self.conn, window)?;
        Ok(())
    }

    fn configure(&self, window: xproto::Window, rect: Rect) -> Result<()> {
        let aux = xproto::ConfigureWindowAux {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(u32::from(size(rect.w))),
            height: Some(u32::from(size(rect.h))),
            ..Default::default()
        };
        xproto::configure_window(&self.conn, window, &aux)?;
        Ok(())
    }

    fn reparent(
        &self,
        window: xproto::Window,
        parent: xproto::Window,
        x: i32,
        y: i32,
    ) -> Result<()> {
        xproto::reparent_window(&self.conn, window, parent, pos(x), pos(y))?;
        Ok(())
    }

    fn map(&self, window: xproto::Window) -> Result<()> {
        xproto::map_window(&self.conn, window)?;
        Ok(())
    }

    fn unmap(&self, window: xproto::Window) -> Result<()> {
        xproto::unmap_window(&self.conn, window)?;
        Ok(())
    }

    fn restack_below(&self, window: xproto::Window, sibling: xproto::Window) -> Result<()> {
        let aux = xproto::ConfigureWindowAux {
            stack_mode: Some(xproto::StackMode::BELOW),
            sibling: Some(sibling),
            ..Default::default()
        };
        xproto::configure_window(&self.conn, window, &aux)?;
        Ok(())
    }

    fn set_title(&self, window: xproto::Window, title: &str) -> Result<()> {
        self.conn.change_property8(
            xproto::PropMode::REPLACE,
            window,
            self.atoms.net_wm_name,
            self.atoms.utf8_string,
            title.as_bytes(),
        )?;
        Ok(())
    }

    fn set_debug_name(&self, window: xproto::Window, name: &str) -> Result<()> {
        self.conn.change_property8(
            xproto::PropMode::REPLACE,
            window,
            xproto::AtomEnum::WM_NAME,
            xproto::AtomEnum::STRING,
            name.as_bytes(),
        )?;
        Ok(())
    }

    fn set_wm_state(&self, window: xproto::Window, state: WmWindowState) -> Result<()> {
        self.conn.change_property32(
            xproto::PropMode::REPLACE,
            window,
            self.atoms.wm_state,
            self.atoms.wm_state,
            &[state.into(), x11rb::NONE],
        )?;
        Ok(())
    }

    fn send_configure_notify(&self, window: xproto::Window, abs: Rect, border: i32) -> Result<()> {
        use x11rb::x11_utils::Serialize;
        let event = xproto::ConfigureNotifyEvent {
            response_type: xproto::CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: window,
            window,
            above_sibling: x11rb::NONE,
            x: pos(abs.x),
            y: pos(abs.y),
            width: size(abs.w),
            height: size(abs.h),
            border_width: abs_dim(border),
            override_redirect: false,
        };
        self.send_xevent(window, xproto::EventMask::STRUCTURE_NOTIFY, &event.serialize())
    }

    // `XGetWMProtocols`: https://tronche.com/gui/x/xlib/ICC/client-to-window-manager/XGetWMProtocols.html
    fn window_protocols(&self, window: xproto::Window) -> Result<Vec<Atom>> {
        let cookie = xproto::get_property(
            &self.conn,
            false,
            window,
            self.atoms.wm_protocols,
            xproto::AtomEnum::ATOM,
            0,
            MAX_PROPERTY_VALUE_LEN / 4,
        )?;
        let reply = check_reply(window, cookie.reply())?;
        Ok(reply.value32().map(Iterator::collect).unwrap_or_default())
    }

    fn send_protocol_message(&self, window: xproto::Window, protocol: Atom) -> Result<()> {
        use x11rb::x11_utils::Serialize;
        let event = xproto::ClientMessageEvent {
            response_type: xproto::CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window,
            type_: self.atoms.wm_protocols,
            data: [protocol, x11rb::CURRENT_TIME, 0, 0, 0].into(),
        };
        self.send_xevent(window, xproto::EventMask::NO_EVENT, &event.serialize())
    }

    fn kill_client(&self, window: xproto::Window) -> Result<()> {
        xproto::kill_client(&self.conn, window)?;
        Ok(())
    }

    fn draw_decoration(&self, frame: xproto::Window, params: &DecorationParams) -> Result<()> {
        // Border color covers the whole frame; the title bar is painted over
        // it, and the client window covers the middle.
        xproto::change_gc(
            &self.conn,
            self.gc,
            &xproto::ChangeGCAux::new().foreground(params.colors.border),
        )?;
        let whole = xproto::Rectangle {
            x: 0,
            y: 0,
            width: size(params.width),
            height: size(params.height),
        };
        xproto::poly_fill_rectangle(&self.conn, frame, self.gc, &[whole])?;

        if matches!(params.border_style, BorderStyle::Normal) {
            let bw = params.border_width.max(0);
            xproto::change_gc(
                &self.conn,
                self.gc,
                &xproto::ChangeGCAux::new().foreground(params.colors.background),
            )?;
            let bar = xproto::Rectangle {
                x: pos(bw),
                y: pos(bw),
                width: abs_dim(params.width - 2 * bw),
                height: abs_dim(params.titlebar_height - bw),
            };
            xproto::poly_fill_rectangle(&self.conn, frame, self.gc, &[bar])?;

            if let Some(title) = params.title.as_deref().filter(|t| !t.is_empty()) {
                xproto::change_gc(
                    &self.conn,
                    self.gc,
                    &xproto::ChangeGCAux::new()
                        .foreground(params.colors.text)
                        .background(params.colors.background),
                )?;
                // image_text8 carries at most 255 bytes.
                let text: Vec<u8> = title.bytes().take(255).collect();
                xproto::image_text8(
                    &self.conn,
                    frame,
                    self.gc,
                    pos(bw + 4),
                    pos(params.titlebar_height - 4),
                    &text,
                )?;
            }
        }
        Ok(())
    }

    fn set_root_text_property(&self, atom: Atom, value: &str) -> Result<()> {
        self.conn.change_property8(
            xproto::PropMode::REPLACE,
            self.root,
            atom,
            self.atoms.utf8_string,
            value.as_bytes(),
        )?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }
}

fn pos(v: i32) -> i16 {
    v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Window sizes must stay positive on the wire.
fn size(v: i32) -> u16 {
    v.clamp(1, i32::from(u16::MAX)) as u16
}

fn abs_dim(v: i32) -> u16 {
    v.clamp(0, i32::from(u16::MAX)) as u16
}
