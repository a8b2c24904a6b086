pub mod client;
pub mod parsing;
pub mod queues;
