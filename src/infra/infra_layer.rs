// The infra module contains implementations of core traits.
// Each external system gets its own submodule.

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "alerts/mod.rs"]
pub mod alerts;

#[path = "sheets/mod.rs"]
pub mod sheets;

#[path = "submissions/mod.rs"]
pub mod submissions;

#[path = "votes/mod.rs"]
pub mod votes;

#[path = "sqlite_pool.rs"]
pub mod sqlite_pool;
