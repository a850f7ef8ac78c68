// Rate limiting service with Redis-based sliding window counters.
// Used to throttle registration, login and forgot-password per client IP.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::app_config::SecurityConfig;
use crate::db::RedisPool;

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Redis connection error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Invalid rate limit key")]
    InvalidKey,
}

/// Rate limit configuration for one key class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the time window
    pub max_requests: u32,

    /// Time window in seconds
    pub window_seconds: u32,

    /// Block duration in seconds when the limit is exceeded
    pub block_duration: u32,
}

impl RateLimitConfig {
    pub fn registration(security: &SecurityConfig) -> Self {
        Self {
            max_requests: security.register_rate_limit_per_ip,
            window_seconds: security.rate_limit_window_seconds,
            block_duration: security.rate_limit_block_seconds,
        }
    }

    pub fn login(security: &SecurityConfig) -> Self {
        Self {
            max_requests: security.login_rate_limit_per_ip,
            window_seconds: security.rate_limit_window_seconds,
            block_duration: security.rate_limit_block_seconds,
        }
    }

    pub fn forgot_password(security: &SecurityConfig) -> Self {
        Self {
            max_requests: security.forgot_password_rate_limit_per_ip,
            window_seconds: security.rate_limit_window_seconds,
            block_duration: security.rate_limit_block_seconds,
        }
    }
}

/// Rate limit check result
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after: Option<u32>,
    pub current_count: u32,
}

pub struct RateLimitService {
    redis_pool: RedisPool,
}

impl RateLimitService {
    pub fn new(redis_pool: RedisPool) -> Self {
        Self { redis_pool }
    }

    /// Atomic sliding window check via a Lua script. The key is expected to
    /// already encode the endpoint and client identity.
    pub async fn check_rate_limit(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        if key.is_empty() {
            return Err(RateLimitError::InvalidKey);
        }

        let mut conn = self.redis_pool.get_connection();

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let window_start = now.saturating_sub(config.window_seconds as u64 * 1000);
        let window_key = format!("rate_limit:{}", key);

        // Sliding window with a block marker, evaluated atomically
        let script = r#"
            local key = KEYS[1]
            local now = tonumber(ARGV[1])
            local window_start = tonumber(ARGV[2])
            local max_requests = tonumber(ARGV[3])
            local window_seconds = tonumber(ARGV[4])
            local block_duration = tonumber(ARGV[5])

            -- Drop entries outside the sliding window
            redis.call('ZREMRANGEBYSCORE', key, '-inf', window_start)

            local current_count = redis.call('ZCARD', key)

            local block_key = key .. ':blocked'
            if redis.call('EXISTS', block_key) == 1 then
                local block_ttl = redis.call('TTL', block_key)
                return {0, 0, block_ttl > 0 and block_ttl or block_duration, current_count}
            end

            local allowed = current_count < max_requests

            if allowed then
                local request_id = now .. ':' .. math.random(1000000)
                redis.call('ZADD', key, now, request_id)
                current_count = current_count + 1
                redis.call('PEXPIREAT', key, now + (window_seconds * 1000))
            else
                redis.call('SETEX', block_key, block_duration, '1')
            end

            local remaining = math.max(0, max_requests - current_count)
            local retry_after = allowed and 0 or block_duration

            return {allowed and 1 or 0, remaining, retry_after, current_count}
        "#;

        let result: Vec<u64> = redis::Script::new(script)
            .key(&window_key)
            .arg(now)
            .arg(window_start)
            .arg(config.max_requests)
            .arg(config.window_seconds)
            .arg(config.block_duration)
            .invoke_async(&mut conn)
            .await?;

        let allowed = result[0] == 1;
        let retry_after = if result[2] > 0 {
            Some(result[2] as u32)
        } else {
            None
        };

        Ok(RateLimitResult {
            allowed,
            remaining: result[1] as u32,
            retry_after,
            current_count: result[3] as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security_config() -> SecurityConfig {
        SecurityConfig {
            allowed_hosts: vec!["localhost".to_string()],
            enable_rate_limiting: true,
            register_rate_limit_per_ip: 3,
            login_rate_limit_per_ip: 5,
            forgot_password_rate_limit_per_ip: 2,
            rate_limit_window_seconds: 60,
            rate_limit_block_seconds: 300,
        }
    }

    #[test]
    fn test_endpoint_configs_from_security() {
        let security = security_config();

        let register = RateLimitConfig::registration(&security);
        assert_eq!(register.max_requests, 3);
        assert_eq!(register.window_seconds, 60);
        assert_eq!(register.block_duration, 300);

        let login = RateLimitConfig::login(&security);
        assert_eq!(login.max_requests, 5);

        let forgot = RateLimitConfig::forgot_password(&security);
        assert_eq!(forgot.max_requests, 2);
    }
}
