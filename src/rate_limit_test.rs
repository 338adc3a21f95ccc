use super::*;

fn limiter() -> RateLimiter {
    RateLimiter::with_config(RateLimitConfig {
        per_user_limit: 3,
        per_user_window: Duration::from_secs(60),
        global_limit: 5,
        global_window: Duration::from_secs(60),
        token_budget: 1_000,
        token_window: Duration::from_secs(3600),
    })
}

#[test]
fn per_user_allows_up_to_limit() {
    let rl = limiter();
    let user = Uuid::new_v4();
    let now = Instant::now();

    for i in 0..3 {
        assert!(rl.check_and_record_at(user, now).is_ok(), "request {i} should succeed");
    }
    assert!(matches!(
        rl.check_and_record_at(user, now),
        Err(RateLimitError::PerUserExceeded { limit: 3, window_secs: 60 })
    ));
}

#[test]
fn global_allows_up_to_limit() {
    let rl = limiter();
    let now = Instant::now();

    for i in 0..5 {
        assert!(rl.check_and_record_at(Uuid::new_v4(), now).is_ok(), "request {i} should succeed");
    }
    assert!(matches!(
        rl.check_and_record_at(Uuid::new_v4(), now),
        Err(RateLimitError::GlobalExceeded { .. })
    ));
}

#[test]
fn window_expiry_allows_new_requests() {
    let rl = limiter();
    let user = Uuid::new_v4();
    let start = Instant::now();

    for _ in 0..3 {
        rl.check_and_record_at(user, start).unwrap();
    }
    assert!(rl.check_and_record_at(user, start).is_err());

    let later = start + Duration::from_secs(60) + Duration::from_millis(1);
    assert!(rl.check_and_record_at(user, later).is_ok());
}

#[test]
fn distinct_users_do_not_interfere() {
    let rl = limiter();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let now = Instant::now();

    for _ in 0..3 {
        rl.check_and_record_at(a, now).unwrap();
    }
    assert!(rl.check_and_record_at(a, now).is_err());
    assert!(rl.check_and_record_at(b, now).is_ok());
}

#[test]
fn reservations_count_against_budget() {
    let rl = limiter();
    let user = Uuid::new_v4();
    let now = Instant::now();

    rl.reserve_tokens_at(user, 600, now).unwrap();
    assert!(matches!(
        rl.reserve_tokens_at(user, 600, now),
        Err(RateLimitError::TokenBudgetExceeded { budget: 1_000, .. })
    ));
    assert!(rl.reserve_tokens_at(user, 400, now).is_ok());
}

#[test]
fn settling_replaces_reservation_with_usage() {
    let rl = limiter();
    let user = Uuid::new_v4();
    let now = Instant::now();

    rl.reserve_tokens_at(user, 900, now).unwrap();
    rl.record_tokens_at(user, 100, 900, now);
    assert!(rl.reserve_tokens_at(user, 900, now).is_ok());
}

#[test]
fn spent_budget_blocks_zero_reservation() {
    let rl = limiter();
    let user = Uuid::new_v4();
    let now = Instant::now();

    rl.record_tokens_at(user, 1_000, 0, now);
    assert!(rl.reserve_tokens_at(user, 0, now).is_err());
}

#[test]
fn release_frees_reservation() {
    let rl = limiter();
    let user = Uuid::new_v4();

    rl.reserve_tokens(user, 1_000).unwrap();
    assert!(rl.reserve_tokens(user, 1).is_err());
    rl.release_tokens(user, 1_000);
    assert!(rl.reserve_tokens(user, 1).is_ok());
}

#[test]
fn errors_are_retryable_with_codes() {
    let err = RateLimitError::TokenBudgetExceeded { budget: 1, window_secs: 1 };
    assert_eq!(err.error_code(), "E_TOKEN_BUDGET");
    assert!(err.retryable());
}
