// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "actions/mod.rs"]
pub mod actions;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "pipeline/mod.rs"]
pub mod pipeline;

#[path = "relay/mod.rs"]
pub mod relay;
