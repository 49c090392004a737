pub mod events;
pub mod hub;
pub mod models;
pub mod orders;
pub mod session;
pub mod store;
pub mod transport;

/// Outbound event queue size per subscriber. A session that falls this many
/// events behind is disconnected instead of slowing everyone else down.
pub const EVENT_QUEUE_CAPACITY: usize = 32;
