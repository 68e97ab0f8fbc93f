pub mod events;
pub mod posts;
pub mod replies;
