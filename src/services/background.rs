// Fire-and-forget background jobs: delayed otp deletion and the periodic
// unseen-posts digest. Failures are logged, never retried.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::DieselPool;
use crate::models::{BaseUser, Otp, Post, User};
use crate::services::email::EmailService;

/// Schedule deletion of an identity's otp after its TTL elapses
pub fn schedule_otp_deletion(pool: DieselPool, base_user_id: Uuid, ttl: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;

        match pool.get().await {
            Ok(mut conn) => match Otp::delete_for_base_user(&mut conn, base_user_id).await {
                Ok(0) => info!("Otp for {} already consumed", base_user_id),
                Ok(_) => info!("Expired otp deleted for {}", base_user_id),
                Err(e) => warn!("Failed to delete expired otp for {}: {}", base_user_id, e),
            },
            Err(e) => warn!("Otp cleanup could not get a connection: {}", e),
        }
    });
}

/// Spawn the periodic digest job that emails each user a sample of posts
/// they have not seen yet.
pub fn spawn_post_digest_job(
    pool: DieselPool,
    email: Arc<EmailService>,
    interval: Duration,
    sample: u32,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so the job runs on the
        // configured cadence after startup.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let summary = run_post_digest(&pool, &email, sample).await;
            info!("{}", summary);
        }
    });
}

/// One digest sweep over all users. Per-user failures are swallowed into
/// the returned log-style summary string.
pub async fn run_post_digest(pool: &DieselPool, email: &EmailService, sample: u32) -> String {
    let mut conn = match pool.get().await {
        Ok(conn) => conn,
        Err(e) => return format!("ERROR: digest could not get a connection: {}", e),
    };

    let users = match User::list_all(&mut conn).await {
        Ok(users) => users,
        Err(e) => return format!("ERROR: digest could not list users: {}", e),
    };

    let mut sent = 0usize;
    let mut failed = 0usize;

    for user in users {
        let posts = match Post::unseen_for_viewer(&mut conn, user.id, sample as i64).await {
            Ok(posts) => posts,
            Err(e) => {
                warn!("Digest feed query failed for {}: {}", user.username, e);
                failed += 1;
                continue;
            },
        };

        if posts.is_empty() {
            continue;
        }

        let captions: Vec<String> = posts
            .iter()
            .map(|p| p.caption.clone().unwrap_or_else(|| "A new post".to_string()))
            .collect();

        let base_user = match BaseUser::find_by_id(&mut conn, user.base_user_id).await {
            Ok(base_user) => base_user,
            Err(e) => {
                warn!("Digest identity lookup failed for {}: {}", user.username, e);
                failed += 1;
                continue;
            },
        };

        match email
            .send_post_digest_email(&base_user.email, &user.username, &captions)
            .await
        {
            Ok(()) => sent += 1,
            Err(e) => {
                warn!("Digest email failed for {}: {}", user.username, e);
                failed += 1;
            },
        }
    }

    format!("Notification task completed! sent={} failed={}", sent, failed)
}
