/// Shared application state
use crate::services::{
    AccountService, AuthService, FeedService, MediaHost, PostService, SocialGraph,
};
use pulse_core::SocialStore;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub accounts: AccountService,
    pub graph: SocialGraph,
    pub posts: PostService,
    pub feed: FeedService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SocialStore>,
        auth_service: Arc<AuthService>,
        media: Arc<dyn MediaHost>,
    ) -> Self {
        Self {
            accounts: AccountService::new(
                Arc::clone(&store),
                Arc::clone(&auth_service),
                Arc::clone(&media),
            ),
            graph: SocialGraph::new(Arc::clone(&store)),
            posts: PostService::new(Arc::clone(&store), media),
            feed: FeedService::new(store),
            auth_service,
        }
    }
}
