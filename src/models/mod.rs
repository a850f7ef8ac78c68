pub mod admin;
pub mod auth;
pub mod base_user;
pub mod comment;
pub mod follow;
pub mod like;
pub mod media;
pub mod otp;
pub mod payment;
pub mod post;
pub mod report;
pub mod user;

// Re-export common types
pub use admin::{Admin, NewAdmin};
pub use auth::{AccessTokenClaims, RefreshTokenClaims, ResetTokenClaims};
pub use base_user::{BaseUser, NewBaseUser, Role};
pub use comment::{Comment, NewComment};
pub use follow::{Follow, FollowStatus, NewFollow};
pub use like::{Like, NewLike};
pub use media::{
    extension_for, post_object_key, profile_object_key, Media, NewMedia, VALID_IMAGE_TYPES,
    VALID_POST_MEDIA_TYPES,
};
pub use otp::{generate_otp_code, NewOtp, Otp};
pub use payment::{
    NewSubscription, NewTransaction, Subscription, SubscriptionInterval, Transaction,
    TransactionStatus,
};
pub use post::{CreatedWithin, NewPost, Post, PostFilter};
pub use report::{NewReportedPost, ReportReason, ReportedPost};
pub use user::{NewUser, ProfileType, User, UserUpdate};
