//! Session storage adapters

mod memory;

pub use memory::InMemorySessionStore;
