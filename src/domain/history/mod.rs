//! Price history - bounded series for the live chart

mod history_buffer;

pub use history_buffer::{HistoryBuffer, HistoryEntry};
