//! nutri-chat — conversational nutrition intake client.

pub mod channels;
pub mod config;
pub mod driver;
pub mod endpoint;
pub mod error;
pub mod intake;
pub mod transcript;
