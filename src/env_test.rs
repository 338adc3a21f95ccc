use super::*;

// =============================================================================
// env_bool — unique env var names avoid races with parallel tests.
// =============================================================================

#[test]
fn env_bool_true_variants() {
    for (i, val) in ["1", "true", "yes", "on"].iter().enumerate() {
        let key = format!("__FINPRO_EB_TRUE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(true), "expected true for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_false_variants() {
    for (i, val) in ["0", "false", "no", "off"].iter().enumerate() {
        let key = format!("__FINPRO_EB_FALSE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(false), "expected false for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_case_and_whitespace() {
    let key = "__FINPRO_EB_CI_118__";
    unsafe { std::env::set_var(key, "  On ") };
    assert_eq!(env_bool(key), Some(true));
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_invalid_or_unset_is_none() {
    let key = "__FINPRO_EB_INVALID_271__";
    unsafe { std::env::set_var(key, "maybe") };
    assert_eq!(env_bool(key), None);
    unsafe { std::env::remove_var(key) };
    assert_eq!(env_bool("__FINPRO_EB_SURELY_UNSET__"), None);
}

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_uses_default_when_unset() {
    assert_eq!(env_parse("__FINPRO_EP_UNSET_17__", 42_u32), 42);
}

#[test]
fn env_parse_reads_valid_value() {
    let key = "__FINPRO_EP_VALID_55__";
    unsafe { std::env::set_var(key, " 7 ") };
    assert_eq!(env_parse(key, 1_usize), 7);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_invalid_falls_back() {
    let key = "__FINPRO_EP_BAD_903__";
    unsafe { std::env::set_var(key, "lots") };
    assert_eq!(env_parse(key, 9_u64), 9);
    unsafe { std::env::remove_var(key) };
}

// =============================================================================
// env_string
// =============================================================================

#[test]
fn env_string_blank_is_none() {
    let key = "__FINPRO_ES_BLANK_64__";
    unsafe { std::env::set_var(key, "   ") };
    assert_eq!(env_string(key), None);
    unsafe { std::env::set_var(key, " re_123 ") };
    assert_eq!(env_string(key).as_deref(), Some("re_123"));
    unsafe { std::env::remove_var(key) };
}
