//! Shopkeep: a storefront AI assistant core.
//!
//! Maintains per-session conversation state across stateless requests,
//! decides when a user request needs a structured tool versus a plain
//! answer, bounds tool rounds per request, and caps retained history. The
//! underlying language model and the registered tools are both pluggable.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use shopkeep::prelude::*;
//!
//! # async fn example() -> shopkeep::error::Result<()> {
//! let model = Arc::new(GeminiModel::new("gemini-2.5-flash", "api-key"));
//! let store = Arc::new(ConversationStore::new(20));
//! let mut registry = ToolRegistry::new();
//! for tool in shopkeep::tools::storefront::all_tools() {
//!     registry.register(tool)?;
//! }
//!
//! let assistant = Assistant::new(model, store, Arc::new(registry), AssistantConfig::default());
//! let outcome = assistant.process_message("What deals are on today?", None).await?;
//! println!("{}", outcome.response);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod store;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "server")]
pub mod server;
