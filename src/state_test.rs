use super::*;

#[tokio::test]
async fn test_state_has_no_llm() {
    let state = test_helpers::test_app_state();
    assert!(state.llm.is_none());
}

#[test]
fn email_config_requires_key_and_sender() {
    assert!(EmailConfig::from_parts(Some("re_x".into()), None).is_none());
    assert!(EmailConfig::from_parts(None, Some("a@b.c".into())).is_none());
    let config = EmailConfig::from_parts(Some("re_x".into()), Some("a@b.c".into())).unwrap();
    assert_eq!(config.from, "a@b.c");
}
