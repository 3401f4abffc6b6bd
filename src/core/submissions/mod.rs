// Core submissions module - the moderation gate in front of the row store.

pub mod submission_models;
pub mod submission_service;

pub use submission_models::*;
pub use submission_service::*;
