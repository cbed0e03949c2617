//! Handler utilities for the shell protocols
//!
//! Here a shell represents the logic associated with displaying windows and arranging them
//! on the screen. The only shell-side protocols of this crate are KDE specific, see the
//! [`kde`] module.

pub mod kde;
