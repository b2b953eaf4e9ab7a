//! Progress reporting.
//!
//! The engine owns only this trait and the call sites that invoke it;
//! rendering a progress bar, pushing it to a UI, or logging it is a
//! presentation concern handed to the caller, exactly like the
//! persistence and ingest boundaries.

use std::sync::mpsc::{Receiver, Sender, channel};

/// Which phase of a run is reporting progress.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProgressPhase {
    FabricConstruction,
    NeighborhoodPrecompute,
    Iterating,
}

/// A single progress update.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProgressEvent {
    pub phase: ProgressPhase,
    /// In `[0.0, 1.0]`.
    pub fraction_complete: f64,
    pub eta_seconds: Option<f64>,
}

/// Receives progress events from a running fabric construction,
/// neighborhood precomputation, or allocator iteration.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: ProgressEvent);
}

/// A sink that discards every event. The default when the caller
/// doesn't care to observe progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_progress(&self, _event: ProgressEvent) {}
}

/// A sink backed by an `mpsc` channel, for callers (such as the CLI)
/// that want to observe progress from a different thread than the one
/// doing the work.
pub struct ChannelProgressSink {
    tx: Sender<ProgressEvent>,
}

impl ChannelProgressSink {
    /// Returns a sink together with the receiving end of its channel.
    pub fn new() -> (Self, Receiver<ProgressEvent>) {
        let (tx, rx) = channel();
        (ChannelProgressSink { tx }, rx)
    }
}

impl ProgressSink for ChannelProgressSink {
    fn on_progress(&self, event: ProgressEvent) {
        // The receiver may have been dropped (caller stopped watching);
        // that's not this sink's problem.
        let _ = self.tx.send(event);
    }
}
