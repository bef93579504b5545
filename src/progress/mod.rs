//! Progress reporting for agent runs

mod console;
mod handler;

pub use console::ConsoleProgressHandler;
pub use handler::{NoOpProgressHandler, ProgressEvent, ProgressHandler};
