//! Request generations: the last *issued* request wins.
//!
//! A store calls [`RequestGeneration::begin`] before a request and applies
//! the response only while [`RequestGeneration::is_current`] still holds for
//! its ticket. Anything that supersedes the request (a newer load, a reset,
//! closing the modal) moves the generation forward.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RequestGeneration(AtomicU64);

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation and returns its ticket.
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Ticket of the latest generation, without starting a new one.
    ///
    /// For requests that should survive each other but not a reset.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Whether `ticket` is still the latest generation.
    pub fn is_current(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }

    /// Supersedes every outstanding ticket.
    pub fn invalidate(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}
