//! Progress reporting sinks
//!
//! The crawl reports coarse milestones through a [`ProgressSink`]. Sinks are
//! fire-and-forget: reporting must never block or fail the crawl.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Receiver of (message, optional percentage) progress events
pub trait ProgressSink: Send {
    fn report(&self, message: &str, percentage: Option<f32>);
}

/// Logs progress through `tracing` at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, message: &str, percentage: Option<f32>) {
        match percentage {
            Some(p) => tracing::info!("{} ({:.1}%)", message, p),
            None => tracing::info!("{}", message),
        }
    }
}

/// One progress event delivered through a [`ChannelProgress`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub message: String,
    pub percentage: Option<f32>,
}

/// Forwards progress events to an unbounded channel
///
/// A dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    sender: UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    /// Creates a sink together with the receiving end
    pub fn new() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressSink for ChannelProgress {
    fn report(&self, message: &str, percentage: Option<f32>) {
        let _ = self.sender.send(ProgressEvent {
            message: message.to_string(),
            percentage,
        });
    }
}
