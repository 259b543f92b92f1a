use serde::Deserialize;

/// Border, background and text pixel values for one semantic state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ColorTriple {
    pub border: u32,
    pub background: u32,
    pub text: u32,
}

/// Colors and metrics of the decoration chrome.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub focused: ColorTriple,
    pub unfocused: ColorTriple,
    pub urgent: ColorTriple,
    /// Height of the title bar drawn for `BorderStyle::Normal` containers.
    pub titlebar_height: i32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            focused: ColorTriple {
                border: 0x004c_7899,
                background: 0x0028_5577,
                text: 0x00ff_ffff,
            },
            unfocused: ColorTriple {
                border: 0x0033_3333,
                background: 0x0022_2222,
                text: 0x0088_8888,
            },
            urgent: ColorTriple {
                border: 0x002f_343a,
                background: 0x0090_0000,
                text: 0x00ff_ffff,
            },
            titlebar_height: 18,
        }
    }
}
