mod container;
mod handle;
mod rect;

pub use container::{BorderStyle, Container, ContainerKind};
pub use handle::{Handle, MockHandle, WindowHandle};
pub use rect::Rect;
