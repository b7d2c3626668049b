pub mod ids;
pub mod message;

pub use ids::{GroupId, Identity, MessageKey};
pub use message::InboundMessage;
