// Core relay module - routes DM replies back to the operator who asked the bot
// to send the DM.

pub mod conversation_router;
pub mod relay_models;

pub use conversation_router::ConversationRouter;
pub use relay_models::*;
