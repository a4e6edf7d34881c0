// Discord commands module.
// Each feature gets its own command file.

pub mod relay;

// Bot presence management
pub mod presence;
