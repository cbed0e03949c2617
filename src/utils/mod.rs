//! Various utilities functions and types

mod alive_tracker;
mod geometry;
mod serial;
pub mod user_data;

pub use self::alive_tracker::{AliveTracker, IsAlive};
pub use self::geometry::{Point, Rectangle, Size};
pub use self::serial::{Serial, SerialCounter};

/// This resource has been destroyed and can no longer be used.
#[derive(Debug, thiserror::Error)]
#[error("This resource has been destroyed and can no longer be used.")]
pub struct DeadResource;
