//! Event fanout for long-poll observers.
//!
//! Unsolicited device events (such as the TV asking for keyboard input) are
//! broadcast to every HTTP client currently parked on `GET /api/events`.
//! Delivery is at-most-once with no buffering: a client that is not waiting
//! when the event fires never sees it.

mod fanout;
mod id;

pub use fanout::{EventFanout, FanoutEvent, DEFAULT_WAIT_TIMEOUT, KEEPALIVE_EVENT};
pub use id::WaiterId;
