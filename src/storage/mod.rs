//! Driver-owned storage for scored records.

mod window;

pub use window::{ScoredWindow, WindowSummary};
