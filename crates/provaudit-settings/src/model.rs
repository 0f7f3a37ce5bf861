use serde::{Deserialize, Serialize};

/// User-facing preference model. Intentionally permissive: unknown keys in
/// the file are ignored so older builds can read newer files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Credential for the scanner's content API; absent means metadata-only
    /// mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Last active view filter (`all`, `matched`, or `pending`).
    #[serde(default = "default_view_filter")]
    pub view_filter: String,

    /// Tree pane share of the terminal width, clamped to [0.2, 0.8] by the
    /// shell.
    #[serde(default = "default_pane_width")]
    pub pane_width: f64,

    /// Hide files that already carry a decision.
    #[serde(default)]
    pub hide_decided: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            api_key: None,
            view_filter: default_view_filter(),
            pane_width: default_pane_width(),
            hide_decided: false,
        }
    }
}

fn default_view_filter() -> String {
    "all".to_string()
}

fn default_pane_width() -> f64 {
    0.5
}
