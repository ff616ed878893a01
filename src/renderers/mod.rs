//! Renderers: score tree -> text
//!
//! - **text**: the line-oriented text form exchanged with the model
//! - **helmholtz**: read-only view with Helmholtz pitch names for people

pub mod helmholtz;
pub mod text;

pub use helmholtz::to_helmholtz_text;
pub use text::{to_text, TextFormError};
