pub mod encoding;
pub mod expression;
pub mod formatting;
pub mod permissions;
