pub mod clipboard;
pub mod commands;
pub mod config;
pub mod engine;
pub mod history;
pub mod shortcuts;

pub use commands::BoardCommand;
pub use config::EditorConfig;
pub use engine::BoardEngine;
pub use history::{DedupPolicy, EditContext, History, HistoryConfig, Snapshot};
pub use shortcuts::{Modifiers, ShortcutAction, ShortcutMap};
