//! Login throttling ports and application service.
//!
//! Implements a fixed-window failure counter per throttle key. The window
//! opens on the first failure and lasts for the policy decay period; once the
//! failure count reaches the policy maximum every attempt is rejected until
//! the window expires or a successful login clears the counter.
//!
//! The counter store is the only source of truth for lock state. Counts are
//! never cached in-process between calls.

mod ports;
mod service;


pub use ports::{AttemptCounter, AttemptCounterStore, LockoutEvent, LockoutEventSink};
pub use service::LoginThrottleService;
