// Application state shared across handlers.

use std::sync::Arc;

use crate::{
    app_config::AppConfig,
    db::{DieselPool, RedisPool},
    services::{
        AccountService, EmailService, EngagementService, FollowService, GithubOauthService,
        JwtService, ModerationService, PaymentService, PostService, ProfileService,
        RateLimitService, StorageService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub diesel_pool: DieselPool,
    pub redis_pool: RedisPool,
    pub jwt_service: Arc<JwtService>,
    pub rate_limit_service: Arc<RateLimitService>,
    pub account_service: Arc<AccountService>,
    pub profile_service: Arc<ProfileService>,
    pub follow_service: Arc<FollowService>,
    pub post_service: Arc<PostService>,
    pub engagement_service: Arc<EngagementService>,
    pub moderation_service: Arc<ModerationService>,
    pub payment_service: Arc<PaymentService>,
    pub oauth_service: Arc<GithubOauthService>,
    pub email_service: Arc<EmailService>,
    pub storage_service: Arc<StorageService>,
}
