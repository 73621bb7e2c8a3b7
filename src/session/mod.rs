//! Session and transcript management.
//!
//! Sessions live in memory only. The store keeps them in creation order and
//! tracks which one is active; transcripts are append-only.
//!
//! # Example
//!
//! ```rust
//! use fellowship_chat::session::{Role, SessionStore};
//!
//! let store = SessionStore::new();
//! let id = store.create_session();
//! store.append_message(&id, Role::User, "Hello!").unwrap();
//!
//! let messages = store.active_messages();
//! assert_eq!(messages.len(), 1);
//! ```

mod message;
mod store;

pub use message::{Message, Role};
pub use store::{SessionId, SessionStore, SessionSummary};
