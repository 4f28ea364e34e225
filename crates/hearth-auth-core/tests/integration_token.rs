//! Nanny token lifecycle tests
//!
//! Verifies the single-use and expiry semantics: a token verifies exactly
//! once, and every failure mode surfaces as the same generic error.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::mock_repos::MockNannyTokenRepository;
use hearth_auth_core::{AuthError, NannyTokenService};
use hearth_types::HouseholdId;

fn service(repo: Arc<MockNannyTokenRepository>) -> NannyTokenService<MockNannyTokenRepository> {
    NannyTokenService::new(repo, Duration::from_secs(3600), 12)
}

fn token_hash(token: &str) -> String {
    hearth_auth_core::crypto::hash_secret(token)
}

#[tokio::test]
async fn generate_then_verify_returns_household() {
    let repo = Arc::new(MockNannyTokenRepository::new());
    let service = service(repo);
    let household = HouseholdId::new();

    let issued = service.generate(household).await.unwrap();
    assert_eq!(issued.token.len(), 12);
    assert!(issued.token.chars().all(|c| c.is_ascii_alphanumeric()));

    let verified = service.verify(&issued.token).await.unwrap();
    assert_eq!(verified, household);
}

#[tokio::test]
async fn second_verify_fails_generically() {
    let repo = Arc::new(MockNannyTokenRepository::new());
    let service = service(repo);

    let issued = service.generate(HouseholdId::new()).await.unwrap();
    service.verify(&issued.token).await.unwrap();

    // Replay fails with the same error an unknown code produces
    let err = service.verify(&issued.token).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCode));
}

#[tokio::test]
async fn expired_token_fails_generically() {
    let repo = Arc::new(MockNannyTokenRepository::new());
    let service = service(repo.clone());

    let issued = service.generate(HouseholdId::new()).await.unwrap();
    repo.expire_token(&token_hash(&issued.token));

    let err = service.verify(&issued.token).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCode));
}

#[tokio::test]
async fn unknown_token_fails_generically() {
    let repo = Arc::new(MockNannyTokenRepository::new());
    let service = service(repo);

    let err = service.verify("doesnotexist").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCode));
}

#[tokio::test]
async fn tokens_are_unique_per_call() {
    let repo = Arc::new(MockNannyTokenRepository::new());
    let service = service(repo);
    let household = HouseholdId::new();

    let a = service.generate(household).await.unwrap();
    let b = service.generate(household).await.unwrap();
    assert_ne!(a.token, b.token);

    // Both verify independently
    assert_eq!(service.verify(&a.token).await.unwrap(), household);
    assert_eq!(service.verify(&b.token).await.unwrap(), household);
}

#[tokio::test]
async fn concurrent_verification_admits_exactly_one() {
    let repo = Arc::new(MockNannyTokenRepository::new());
    let service = service(repo);

    let issued = service.generate(HouseholdId::new()).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        let token = issued.token.clone();
        handles.push(tokio::spawn(async move { service.verify(&token).await }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn purge_removes_expired_tokens() {
    let repo = Arc::new(MockNannyTokenRepository::new());
    let service = service(repo.clone());

    let expired = service.generate(HouseholdId::new()).await.unwrap();
    let live = service.generate(HouseholdId::new()).await.unwrap();
    repo.expire_token(&token_hash(&expired.token));

    let purged = service.purge_expired().await.unwrap();
    assert_eq!(purged, 1);
    assert!(service.verify(&live.token).await.is_ok());
}
