//! Editor configuration.
//!
//! Every field has a default, so partial JSON such as `{"pasteStep": 16}`
//! deserializes with the rest at defaults. The wasm bridge merges partial
//! updates into the current config instead.

use crate::history::HistoryConfig;
use board_core::{RouteConfig, ZOrderConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub history: HistoryConfig,
    /// Per-paste offset, applied to both axes.
    pub paste_step: f64,
    pub route: RouteConfig,
    pub z_order: ZOrderConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history: HistoryConfig::default(),
            paste_step: 24.0,
            route: RouteConfig::default(),
            z_order: ZOrderConfig::default(),
        }
    }
}
