// Core moderation module - keyword analysis, merge policy and the provider pipeline.

pub mod keyword_analyzer;
pub mod moderation_models;
pub mod moderation_service;

pub use keyword_analyzer::*;
pub use moderation_models::*;
pub use moderation_service::*;
