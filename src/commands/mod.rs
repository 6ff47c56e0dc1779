pub mod app_command;

pub use app_command::{slug_from, AppCommand, HELP_TEXT};
