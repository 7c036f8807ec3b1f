pub mod buffer;
pub mod message;
