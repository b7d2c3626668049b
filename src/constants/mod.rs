pub mod replies;
pub mod timeouts;
