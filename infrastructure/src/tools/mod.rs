//! Tool implementations shipped with stepwise
//!
//! - `travel`: simulated travel-planning tools and the built-in fallback plan

pub mod travel;

pub use travel::{default_plan, travel_registry, travel_tools};
