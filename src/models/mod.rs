//! Score data model
//!
//! The in-memory tree every format converts to and from, plus the exact
//! pitch and time primitives it is built from.

pub mod core;
pub mod elements;
pub mod integrity;
pub mod pitch;
pub mod time;

pub use self::core::*;
pub use elements::*;
pub use pitch::{Pitch, Step};
pub use time::{Rational, TimeSignature};
