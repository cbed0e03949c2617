//! KDE-specific shell protocols
//!
//! - [`decoration`]: negotiation of client-side or server-side decorations
//! - [`palette`]: color scheme of the server-side decoration of a surface

pub mod decoration;
mod handlers;
pub mod palette;
