//! Session domain.
//!
//! - [`entities::Message`]: a single goal or answer within a session
//! - [`entities::History`]: the messages of one session, in order
//!
//! Storage lives behind the `SessionStore` port in the application layer.

pub mod entities;

pub use entities::{History, Message, Role};
