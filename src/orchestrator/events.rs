//! Progress and log events for the presentation layer
//!
//! Events flow over an unbounded channel so that workers never wait on the
//! consumer. A sink whose receiver has gone away silently drops events.

use crate::state::TaskState;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Share of the progress bar owned by listing discovery
pub const DISCOVERY_SHARE: f64 = 50.0;

/// An event emitted while a run is in progress
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Human-readable status line
    Log(String),

    /// Overall completion percentage in [0, 100]
    Progress(f64),

    /// A crawl task dequeued a page for fetching
    PageVisited {
        listing: usize,
        url: String,
        count: u32,
        max_pages: u32,
    },

    /// A crawl task reached a terminal state
    TaskFinished {
        listing: usize,
        state: TaskState,
        pages_visited: u32,
    },
}

/// Cloneable sending half of the event channel
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: Option<UnboundedSender<ProgressEvent>>,
}

impl EventSink {
    /// Creates a connected sink and the receiver that drains it
    pub fn channel() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// Creates a sink that discards every event
    pub fn disconnected() -> Self {
        Self { sender: None }
    }

    pub fn send(&self, event: ProgressEvent) {
        if let Some(sender) = &self.sender {
            // Receiver dropped: nobody is listening any more
            let _ = sender.send(event);
        }
    }

    pub fn log(&self, message: impl Into<String>) {
        self.send(ProgressEvent::Log(message.into()));
    }

    /// Reports overall progress, clamped to [0, 100]
    pub fn progress(&self, percent: f64) {
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        self.send(ProgressEvent::Progress(percent));
    }

    /// Reports discovery progress, mapped onto [0, 50]
    pub fn discovery_progress(&self, done: usize, total: usize) {
        self.progress(fraction(done, total) * DISCOVERY_SHARE);
    }

    /// Reports crawl stage progress, mapped onto [50, 100]
    pub fn crawl_progress(&self, done: usize, total: usize) {
        self.progress(DISCOVERY_SHARE + fraction(done, total) * (100.0 - DISCOVERY_SHARE));
    }
}

fn fraction(done: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        done.min(total) as f64 / total as f64
    }
}
