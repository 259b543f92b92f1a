use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A trait which backend specific window handles need to implement.
pub trait Handle:
    Serialize + DeserializeOwned + Debug + Clone + Copy + PartialEq + Eq + Default + Send + 'static
{
}

/// A backend-agnostic handle to a server-side window.
///
/// # Serde
///
/// Using generics here with serde derive macros causes some wierd behaviour
/// with the compiler, so as suggested by [this `serde` issue][serde-issue],
/// just adding `#[serde(bound = "")]` everywhere the generic is declared
/// fixes the bug.
///
/// [serde-issue]: https://github.com/serde-rs/serde/issues/1296
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowHandle<H>(#[serde(bound = "")] pub H)
where
    H: Handle;

/// Handle for testing purposes.
pub type MockHandle = u32;
impl Handle for MockHandle {}
