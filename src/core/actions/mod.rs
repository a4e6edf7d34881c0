// Core actions module - side effects against the chat platform.

pub mod action_executor;

pub use action_executor::*;
