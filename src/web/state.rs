//! Shared handler state.

use crate::core::dashboard::DashboardService;
use crate::core::moderation::ModerationPipeline;
use crate::core::submissions::{SubmissionService, SubmissionStore};
use crate::core::votes::{VoteService, VoteStore};
use std::sync::Arc;

/// Vote backend picked at startup.
pub type DynVoteStore = Box<dyn VoteStore>;

/// Cloned into every handler; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ModerationPipeline>,
    pub submissions: Arc<SubmissionService>,
    pub votes: Arc<VoteService<DynVoteStore>>,
    pub dashboard: Arc<DashboardService<DynVoteStore>>,
    pub store: Arc<dyn SubmissionStore>,
}

impl AppState {
    /// Wire the services around one pipeline, one submission store and one
    /// vote service.
    pub fn new(
        pipeline: Arc<ModerationPipeline>,
        submissions: SubmissionService,
        store: Arc<dyn SubmissionStore>,
        votes: Arc<VoteService<DynVoteStore>>,
    ) -> Self {
        let dashboard = Arc::new(DashboardService::new(store.clone(), votes.clone()));
        Self {
            pipeline,
            submissions: Arc::new(submissions),
            votes,
            dashboard,
            store,
        }
    }
}
