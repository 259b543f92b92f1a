//! Decoration chrome computed from container presentation state.
//!
//! Rendering is split in two: [`params_for`] is a pure function of the
//! container and theme, and the connection paints whatever params it is
//! handed. The push engine caches the last painted params per container and
//! repaints only when they differ.

use timberwm_core::{BorderStyle, Container, Handle, Rect};

use crate::theme::{ColorTriple, Theme};

/// Everything needed to paint one container's chrome. Comparing two values
/// decides whether a repaint is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationParams {
    pub border_style: BorderStyle,
    pub border_width: i32,
    pub colors: ColorTriple,
    /// Outer frame size the chrome is painted into.
    pub width: i32,
    pub height: i32,
    /// Title text, present only when a title bar is drawn.
    pub title: Option<String>,
    pub titlebar_height: i32,
}

/// Computes the chrome for a container, or `None` when it draws none.
pub fn params_for<H: Handle>(con: &Container<H>, theme: &Theme) -> Option<DecorationParams> {
    if !con.is_leaf() || matches!(con.border_style, BorderStyle::None) {
        return None;
    }
    let colors = if con.urgent {
        theme.urgent
    } else if con.focused {
        theme.focused
    } else {
        theme.unfocused
    };
    let title = match con.border_style {
        BorderStyle::Normal => Some(con.title.clone()),
        _ => None,
    };
    Some(DecorationParams {
        border_style: con.border_style,
        border_width: con.border_width,
        colors,
        width: con.rect.w,
        height: con.rect.h,
        title,
        titlebar_height: theme.titlebar_height,
    })
}

/// The frame-relative rectangle the client window occupies, i.e. the frame
/// rect minus whatever chrome the border style reserves.
pub fn client_rect<H: Handle>(con: &Container<H>, theme: &Theme) -> Rect {
    let size = Rect::new(0, 0, con.rect.w, con.rect.h);
    let bw = con.border_width;
    match con.border_style {
        BorderStyle::None => size,
        BorderStyle::Pixel => size.inset(bw, bw, bw, bw),
        BorderStyle::Normal => size.inset(bw, bw, theme.titlebar_height, bw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timberwm_core::{ContainerKind, MockHandle, WindowHandle};

    fn leaf() -> Container<MockHandle> {
        Container::leaf(Rect::new(10, 10, 200, 100), WindowHandle(7))
    }

    #[test]
    fn urgency_wins_over_focus() {
        let theme = Theme::default();
        let mut con = leaf();
        con.focused = true;
        con.urgent = true;
        let params = params_for(&con, &theme).unwrap();
        assert_eq!(params.colors, theme.urgent);
    }

    #[test]
    fn no_params_for_undecorated_or_split() {
        let theme = Theme::default();
        let mut con = leaf();
        con.border_style = BorderStyle::None;
        assert_eq!(params_for(&con, &theme), None);
        let split: Container<MockHandle> =
            Container::new(ContainerKind::Split, Rect::new(0, 0, 10, 10));
        assert_eq!(params_for(&split, &theme), None);
    }

    #[test]
    fn client_rect_follows_border_style() {
        let theme = Theme::default();
        let mut con = leaf();
        con.border_width = 2;

        con.border_style = BorderStyle::None;
        assert_eq!(client_rect(&con, &theme), Rect::new(0, 0, 200, 100));

        con.border_style = BorderStyle::Pixel;
        assert_eq!(client_rect(&con, &theme), Rect::new(2, 2, 196, 96));

        con.border_style = BorderStyle::Normal;
        assert_eq!(
            client_rect(&con, &theme),
            Rect::new(2, theme.titlebar_height, 196, 100 - theme.titlebar_height - 2)
        );
    }

    #[test]
    fn title_only_with_titlebar() {
        let theme = Theme::default();
        let mut con = leaf();
        con.title = "xterm".into();
        con.border_style = BorderStyle::Normal;
        assert_eq!(params_for(&con, &theme).unwrap().title.as_deref(), Some("xterm"));
        con.border_style = BorderStyle::Pixel;
        assert_eq!(params_for(&con, &theme).unwrap().title, None);
    }
}
