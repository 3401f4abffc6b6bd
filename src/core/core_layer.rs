// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "submissions/mod.rs"]
pub mod submissions;

#[path = "votes/vote_service.rs"]
pub mod votes;

#[path = "dashboard/dashboard_service.rs"]
pub mod dashboard;
