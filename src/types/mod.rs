//! Core data types shared across the crate.

pub mod message;
pub mod outcome;
pub mod stream;

pub use message::{Role, Turn};
pub use outcome::ChatOutcome;
pub use stream::ChatStreamEvent;
