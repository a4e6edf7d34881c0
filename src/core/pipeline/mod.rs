// Core pipeline module - wires detection, relay routing and actions together.

pub mod message_pipeline;
pub mod pipeline_models;

pub use message_pipeline::MessagePipeline;
pub use pipeline_models::*;
