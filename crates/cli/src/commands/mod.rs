//! Command handlers for the Casebook CLI.
//!
//! Each command ingests the documents it is given, builds the index for the
//! session and then answers, searches or chats against it.

pub mod ask;
pub mod chat;
pub mod render;
pub mod search;
pub mod session;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use search::SearchCommand;
