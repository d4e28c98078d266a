//! Inbound message pipeline - dedup, media capture, classification, replies.

pub mod admin;
pub mod cache;
pub mod completion;
pub mod engine;
pub mod media;
pub mod message;
pub mod responses;
pub mod rules;
pub mod store;
pub mod transport;


pub use completion::{CompletionProvider, HfClient};
pub use engine::{Dispatcher, PipelineEngine};
pub use message::InboundMessage;
pub use store::MessageStore;
pub use transport::Transport;
