// Core moderation module - contains AI-text detection business logic.

pub mod moderation_models;
pub mod moderation_service;
pub mod text_normalizer;

pub use moderation_models::*;
pub use moderation_service::*;
