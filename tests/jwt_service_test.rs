// JWT service tests without database dependencies: token pairs, claim
// round-trips, and the distinct reset-token failure modes.

use moments_backend::{JwtConfig, JwtError, JwtService};

fn service() -> JwtService {
    JwtService::new(JwtConfig::for_test())
}

#[test]
fn test_token_pair_round_trip() {
    let service = service();

    let pair = service
        .generate_token_pair("8a9a102a-38fe-4d16-8be6-74d6e0f6e78b", "user")
        .expect("Failed to generate token pair");

    assert_eq!(pair.expires_in, 3600);

    let access = service
        .validate_access_token(&pair.access_token)
        .expect("Failed to validate access token");
    assert_eq!(access.id, "8a9a102a-38fe-4d16-8be6-74d6e0f6e78b");
    assert_eq!(access.role, "user");
    assert!(access.exp > access.iat);

    let refresh = service
        .validate_refresh_token(&pair.refresh_token)
        .expect("Failed to validate refresh token");
    assert_eq!(refresh.id, access.id);
    assert_eq!(refresh.token_type, "refresh");
}

#[test]
fn test_admin_role_claim_is_preserved() {
    let service = service();

    let token = service
        .generate_access_token("admin-id", "admin")
        .expect("Failed to generate");
    let claims = service.validate_access_token(&token).expect("validate");
    assert_eq!(claims.role, "admin");
}

#[test]
fn test_refresh_token_rejected_as_access() {
    let service = service();

    let refresh = service
        .generate_refresh_token("user-id", "user")
        .expect("Failed to generate");

    // Different signing key, so never a valid access token
    let result = service.validate_access_token(&refresh);
    assert!(matches!(
        result,
        Err(JwtError::InvalidToken) | Err(JwtError::MalformedToken)
    ));
}

#[test]
fn test_reset_token_embeds_otp() {
    let service = service();

    let token = service
        .generate_reset_token("user-id", "654321")
        .expect("Failed to generate");
    let claims = service.validate_reset_token(&token).expect("validate");

    assert_eq!(claims.id, "user-id");
    assert_eq!(claims.otp, "654321");
}

#[test]
fn test_tampered_token_rejected() {
    let service = service();

    let token = service
        .generate_access_token("user-id", "user")
        .expect("Failed to generate");

    // Flip a character inside the payload segment
    let mut tampered: Vec<char> = token.chars().collect();
    let mid = token.len() / 2;
    tampered[mid] = if tampered[mid] == 'a' { 'b' } else { 'a' };
    let tampered: String = tampered.into_iter().collect();

    assert!(service.validate_access_token(&tampered).is_err());
}
