//! # Health Assistant Client
//!
//! A conversational client for an explainable health query service. Users
//! submit free-text symptom descriptions; each backend answer is classified
//! into a risk tier (emergency, refusal or standard) and rendered
//! accordingly.
//!
//! ## Architecture
//!
//! ```text
//! caller → QueryOrchestrator ─ append user + pending → ConversationStore
//!                │
//!                └─ POST /query (HTTP) → classify() → replace pending
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use health_assistant_client::{Config, QueryOrchestrator};
//! use health_assistant_client::backend::BackendClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = BackendClient::new(&config.backend, config.request.clone())?;
//!     let mut orchestrator = QueryOrchestrator::new(client);
//!     orchestrator.submit("sore throat and cough").await;
//!     for message in orchestrator.snapshot() {
//!         println!("{:?}", message.role());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Health query backend client and wire types.
pub mod backend;
/// Response tier classification and evidence scoring.
pub mod classify;
/// Configuration management.
pub mod config;
/// Conversation message log.
pub mod conversation;
/// Error types and result aliases for the application.
pub mod error;
/// Query lifecycle state machine.
pub mod orchestrator;
/// Terminal rendering of conversations.
pub mod render;

pub use classify::{classify, ClassifiedResponse, Tier};
pub use config::Config;
pub use conversation::{ConversationStore, Message, MessageId};
pub use error::{AppError, AppResult};
pub use orchestrator::{QueryOrchestrator, SubmitOutcome};
