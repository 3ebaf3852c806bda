//! The boundary between the layout core and the platform window system.

pub mod geometry;
pub mod screen;
pub mod window;
