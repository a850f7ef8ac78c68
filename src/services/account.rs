// Account service: registration with automatic profile creation, login,
// token refresh, the otp-based password-reset flow, and OAuth first-login.

use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::AsyncConnection;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::db::DieselPool;
use crate::models::{
    generate_otp_code, Admin, BaseUser, NewAdmin, NewBaseUser, NewOtp, NewUser, Otp, ProfileType,
    Role, User,
};
use crate::services::background::schedule_otp_deletion;
use crate::services::email::EmailService;
use crate::services::jwt::{JwtError, JwtService, TokenPair};
use crate::utils::error_strings;
use crate::utils::{
    hash_password, username_from_email, validate_password_strength, validate_username,
    verify_password, ApiError,
};

/// Delay applied on unknown-email forgot-password requests so response
/// timing does not reveal whether an account exists.
const TIMING_DELAY_MS: u64 = 150;

pub struct AccountService {
    pool: DieselPool,
    jwt: Arc<JwtService>,
    email: Arc<EmailService>,
    otp_ttl: Duration,
}

fn token_error(error: JwtError) -> ApiError {
    match error {
        JwtError::TokenExpired => ApiError::unauthorized(error_strings::ACCESS_TOKEN_EXPIRED),
        JwtError::EncodingError(msg) => ApiError::internal(msg),
        _ => ApiError::unauthorized(error_strings::INVALID_TOKEN),
    }
}

impl AccountService {
    pub fn new(
        pool: DieselPool,
        jwt: Arc<JwtService>,
        email: Arc<EmailService>,
        otp_ttl: Duration,
    ) -> Self {
        Self {
            pool,
            jwt,
            email,
            otp_ttl,
        }
    }

    /// Create a base identity, hashing the password and auto-creating the
    /// matching profile: a user profile for role `user`, an admin marker
    /// for role `admin`. Duplicate email/username surfaces as Conflict.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
        username: Option<String>,
    ) -> Result<BaseUser, ApiError> {
        validate_password_strength(password).map_err(|_| {
            ApiError::validation(
                "password: min 8 chars with upper, lower, digit and special character",
            )
        })?;

        let email = email.trim().to_lowercase();
        let username = match role {
            Role::Admin => None,
            Role::User => {
                let username = username.unwrap_or_else(|| username_from_email(&email));
                validate_username(&username).map_err(|_| {
                    ApiError::validation("username: 3-30 lowercase chars, digits, '.' or '_'")
                })?;
                Some(username)
            },
        };

        let password_hash = hash_password(password).map_err(|e| ApiError::internal(e.to_string()))?;

        let mut conn = self.pool.get().await?;
        let base_user = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let base_user = BaseUser::create(
                        conn,
                        NewBaseUser {
                            email,
                            password_hash: Some(password_hash),
                            role: role.as_str().to_string(),
                        },
                    )
                    .await?;

                    match username {
                        Some(username) => {
                            User::create(
                                conn,
                                NewUser {
                                    base_user_id: base_user.id,
                                    username,
                                    bio: None,
                                    profile_type: ProfileType::Public.as_str().to_string(),
                                },
                            )
                            .await?;
                        },
                        None => {
                            Admin::create(
                                conn,
                                NewAdmin {
                                    base_user_id: base_user.id,
                                },
                            )
                            .await?;
                        },
                    }

                    Ok(base_user)
                }
                .scope_boxed()
            })
            .await?;

        info!("Registered {} account {}", base_user.role, base_user.id);
        Ok(base_user)
    }

    /// Authenticate by email + password and issue a token pair. Unknown
    /// email and wrong password share one message.
    pub async fn login(&self, email: &str, password: &str) -> Result<(BaseUser, TokenPair), ApiError> {
        let email = email.trim().to_lowercase();

        let mut conn = self.pool.get().await?;
        let base_user = BaseUser::find_by_email(&mut conn, &email)
            .await?
            .ok_or_else(|| ApiError::unauthorized(error_strings::INCORRECT_CREDENTIALS))?;

        let hash = base_user
            .password_hash
            .as_deref()
            .ok_or_else(|| ApiError::unauthorized(error_strings::INCORRECT_CREDENTIALS))?;

        let matches =
            verify_password(password, hash).map_err(|e| ApiError::internal(e.to_string()))?;
        if !matches {
            return Err(ApiError::unauthorized(error_strings::INCORRECT_CREDENTIALS));
        }

        if !base_user.is_active {
            return Err(ApiError::forbidden(error_strings::ACCOUNT_INACTIVE));
        }

        let tokens = self
            .jwt
            .generate_token_pair(&base_user.id.to_string(), &base_user.role)
            .map_err(token_error)?;

        Ok((base_user, tokens))
    }

    /// Exchange a valid refresh token for a fresh pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let claims = self.jwt.validate_refresh_token(refresh_token).map_err(|e| match e {
            JwtError::TokenExpired => {
                ApiError::unauthorized(error_strings::REFRESH_TOKEN_EXPIRED)
            },
            other => token_error(other),
        })?;

        let base_user_id: Uuid = claims
            .id
            .parse()
            .map_err(|_| ApiError::unauthorized(error_strings::INVALID_TOKEN))?;

        let mut conn = self.pool.get().await?;
        let base_user = BaseUser::find_by_id(&mut conn, base_user_id)
            .await
            .map_err(|_| ApiError::unauthorized(error_strings::INVALID_TOKEN))?;

        if !base_user.is_active {
            return Err(ApiError::forbidden(error_strings::ACCOUNT_INACTIVE));
        }

        self.jwt
            .generate_token_pair(&base_user.id.to_string(), &base_user.role)
            .map_err(token_error)
    }

    /// Start the password-reset flow. Unknown emails silently no-op so the
    /// endpoint cannot be used for account enumeration.
    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let email = email.trim().to_lowercase();

        let mut conn = self.pool.get().await?;
        let base_user = match BaseUser::find_by_email(&mut conn, &email).await? {
            Some(base_user) => base_user,
            None => {
                info!("Password reset requested for unknown email");
                tokio::time::sleep(Duration::from_millis(TIMING_DELAY_MS)).await;
                return Ok(());
            },
        };

        let code = generate_otp_code();
        Otp::replace(
            &mut conn,
            NewOtp {
                base_user_id: base_user.id,
                code: code.clone(),
            },
        )
        .await?;

        schedule_otp_deletion(self.pool.clone(), base_user.id, self.otp_ttl);

        self.email
            .send_otp_email(&base_user.email, &code, self.otp_ttl.as_secs() / 60)
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?;

        Ok(())
    }

    /// Verify the otp and hand back the short-lived reset token
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<String, ApiError> {
        let email = email.trim().to_lowercase();

        let mut conn = self.pool.get().await?;
        let base_user = BaseUser::find_by_email(&mut conn, &email)
            .await?
            .ok_or_else(|| ApiError::not_found(error_strings::USER_NOT_FOUND))?;

        let otp = Otp::find_by_base_user_id(&mut conn, base_user.id)
            .await?
            .ok_or_else(|| ApiError::not_found(error_strings::EXPIRED_OTP))?;

        if otp.code != code {
            return Err(ApiError::unauthorized(error_strings::INVALID_OTP));
        }

        self.jwt
            .generate_reset_token(&base_user.id.to_string(), code)
            .map_err(token_error)
    }

    /// Consume a reset token and set the new password. Malformed and
    /// expired tokens fail differently from wrong-secret ones.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ApiError> {
        let claims = self.jwt.validate_reset_token(token).map_err(|e| match e {
            JwtError::MalformedToken => ApiError::bad_request("Malformed reset token!"),
            JwtError::TokenExpired => ApiError::bad_request(error_strings::RESET_TOKEN_EXPIRED),
            other => token_error(other),
        })?;

        let base_user_id: Uuid = claims
            .id
            .parse()
            .map_err(|_| ApiError::bad_request("Malformed reset token!"))?;

        let mut conn = self.pool.get().await?;
        let otp = Otp::find_by_base_user_id(&mut conn, base_user_id)
            .await?
            .ok_or_else(|| ApiError::not_found(error_strings::EXPIRED_OTP))?;

        if otp.code != claims.otp {
            return Err(ApiError::unauthorized(error_strings::INVALID_OTP));
        }

        validate_password_strength(new_password).map_err(|_| {
            ApiError::validation(
                "password: min 8 chars with upper, lower, digit and special character",
            )
        })?;

        let password_hash =
            hash_password(new_password).map_err(|e| ApiError::internal(e.to_string()))?;
        BaseUser::update_password(&mut conn, base_user_id, &password_hash).await?;
        Otp::delete_for_base_user(&mut conn, base_user_id).await?;

        info!("Password reset completed for {}", base_user_id);
        Ok(())
    }

    /// OAuth login: create a password-less identity (and profile) on first
    /// login, then issue the usual token pair.
    pub async fn oauth_login(&self, email: &str) -> Result<(BaseUser, TokenPair), ApiError> {
        let email = email.trim().to_lowercase();

        let mut conn = self.pool.get().await?;
        let existing = BaseUser::find_by_email(&mut conn, &email).await?;

        let base_user = match existing {
            Some(base_user) => base_user,
            None => {
                let username = username_from_email(&email);
                conn.transaction::<_, diesel::result::Error, _>(|conn| {
                    async move {
                        let base_user = BaseUser::create(
                            conn,
                            NewBaseUser {
                                email,
                                password_hash: None,
                                role: Role::User.as_str().to_string(),
                            },
                        )
                        .await?;

                        User::create(
                            conn,
                            NewUser {
                                base_user_id: base_user.id,
                                username,
                                bio: None,
                                profile_type: ProfileType::Public.as_str().to_string(),
                            },
                        )
                        .await?;

                        Ok(base_user)
                    }
                    .scope_boxed()
                })
                .await?
            },
        };

        let tokens = self
            .jwt
            .generate_token_pair(&base_user.id.to_string(), &base_user.role)
            .map_err(token_error)?;

        Ok((base_user, tokens))
    }
}
