// Core daemon logic module

pub mod config;
pub mod listeners;
pub mod resolver;

// Re-export commonly used items
pub use config::ResolverConfig;
pub use listeners::{InputListener, ListenerCounters};
pub use resolver::{Resolver, ResolverHandle};
