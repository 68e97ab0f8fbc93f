pub mod reply_feed;
pub mod reply_service;
pub mod reply_tree;
