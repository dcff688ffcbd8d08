mod common;
mod message;
mod tools;

pub use message::*;
pub use tools::*;
