//! HoverIntent Pointer Model
//!
//! Defines the data contracts shared by the tracker and its tools:
//! - **Geometry:** Pixel positions and Manhattan displacement
//! - **Events:** Timestamped pointer enter/move/leave events
//! - **Sessions:** Recorded per-element event streams in JSONL form
//! - **Transitions:** Confirm/leave records emitted by the tracker
//!
//! Coordinates are page pixels, matching the units of the sensitivity
//! threshold.

pub mod event;
pub mod geometry;
pub mod session;
pub mod transition;

pub use event::*;
pub use geometry::*;
pub use session::*;
pub use transition::*;
