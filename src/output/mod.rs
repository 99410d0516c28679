//! Output module for rendered documents and run reports
//!
//! This module handles:
//! - Rendering aggregated documents to markdown and writing them to disk
//! - The run summary and its console report
//! - Progress reporting sinks

mod markdown;
mod progress;
mod summary;

pub use markdown::{render, save_markdown, Renderer, IMAGE_PREFIX};
pub use progress::{ChannelProgress, ProgressEvent, ProgressSink, TracingProgress};
pub use summary::{
    format_elapsed, format_summary, print_summary, FailedImage, FailedPage, Summary,
};
