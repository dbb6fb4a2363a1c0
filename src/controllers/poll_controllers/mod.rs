pub mod create_poll;
pub mod get_poll;
pub mod models;
pub mod polls;
pub mod publish_poll;
