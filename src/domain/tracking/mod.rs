//! Tracking window - the fixed period the experiment is measured over

mod countdown;

pub use countdown::{Countdown, TimeRemaining, TrackingWindow};
