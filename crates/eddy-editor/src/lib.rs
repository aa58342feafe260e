pub mod clipboard;
pub mod commands;
pub mod config;
pub mod document;
pub mod stack;

pub use clipboard::Clipboard;
pub use commands::{Command, Composite, Direction, Reversible, Transition};
pub use config::{ConfigError, EditorConfig};
pub use document::{Document, Notification};
pub use stack::CommandStack;
