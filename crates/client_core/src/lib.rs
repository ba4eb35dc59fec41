//! Client core for the product routine advisor: catalog browsing, a
//! persisted product selection, and a chat session against a
//! chat-completion endpoint.

pub mod catalog;
pub mod chat;
pub mod completion;
pub mod error;
pub mod events;
pub mod local_store;
pub mod prompts;
pub mod selection;
pub mod session;
pub mod views;

pub use catalog::{CatalogLoader, CatalogSource};
pub use chat::{ChatOptions, ChatSession, Transcript};
pub use completion::{CompletionBackend, EndpointSettings, HttpCompletionClient};
pub use error::{ClientError, ClientResult};
pub use events::AdvisorEvent;
pub use local_store::{LocalStore, MemoryStore};
pub use selection::{ConfirmPrompt, SelectionStore, ToggleOutcome};
pub use session::{AdvisorSession, SessionViews};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
