use super::*;
use crate::rate_limit::RateLimitError;
use crate::state::test_helpers::test_app_state;

#[tokio::test]
async fn missing_llm_is_service_unavailable() {
    let Err(err) = llm_or_unavailable(&test_app_state()) else {
        panic!("expected an error without an LLM");
    };
    assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(err.body.code, "E_LLM_NOT_CONFIGURED");
    assert!(!err.body.retryable);
}

#[test]
fn rate_limits_are_too_many_requests_and_retryable() {
    let err = AiError::RateLimited(RateLimitError::PerUserExceeded { limit: 10, window_secs: 60 });
    assert_eq!(ai_status(&err), StatusCode::TOO_MANY_REQUESTS);
    let api = ai_error(&err);
    assert_eq!(api.body.code, "E_RATE_LIMIT_USER");
    assert!(api.body.retryable);
}

#[test]
fn other_assistant_errors_map_to_status() {
    assert_eq!(ai_status(&AiError::InvalidInput("empty".into())), StatusCode::BAD_REQUEST);
    assert_eq!(ai_status(&AiError::Storage("db".into())), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        ai_status(&AiError::Llm(crate::llm::types::LlmError::ApiRequest("timeout".into()))),
        StatusCode::BAD_GATEWAY
    );
}
