//! Tool system: pluggable capabilities the model may request.

pub mod invoker;
pub mod registry;
pub mod storefront;
pub mod tool;

pub use invoker::{ToolFailure, ToolInvoker, ToolOutcome};
pub use registry::ToolRegistry;
pub use tool::{FnTool, Tool};
