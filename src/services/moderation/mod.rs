pub mod mute_registry;
pub mod mute_service;
pub mod suppression;
