//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface for stepwise.

mod repl;

pub use repl::ChatRepl;
