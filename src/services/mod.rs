// Services module: business logic layer for the Moments backend.

pub mod account;
pub mod background;
pub mod email;
pub mod engagement;
pub mod follow;
pub mod jwt;
pub mod moderation;
pub mod oauth;
pub mod payment;
pub mod post;
pub mod profile;
pub mod rate_limit;
pub mod storage;
pub mod stripe;

// Re-export commonly used services
pub use account::AccountService;
pub use background::{run_post_digest, schedule_otp_deletion, spawn_post_digest_job};
pub use email::{EmailError, EmailService};
pub use engagement::EngagementService;
pub use follow::FollowService;
pub use jwt::{JwtConfig, JwtError, JwtService, TokenPair};
pub use moderation::ModerationService;
pub use oauth::{GithubOauthService, OauthError};
pub use payment::PaymentService;
pub use post::{PostService, PostWithMedia};
pub use profile::{ProfileService, ProfileUpdate};
pub use rate_limit::{RateLimitConfig, RateLimitError, RateLimitResult, RateLimitService};
pub use storage::{StorageError, StorageService};
pub use stripe::{StripeClient, StripeError};
