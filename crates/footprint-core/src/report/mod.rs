pub mod console;
pub mod json;
pub mod progress;

pub use console::{format_breakdown, format_size, format_summary, SUMMARY_TITLE};
pub use progress::{default_progress_sink, FetchProgress, ProgressSink};
