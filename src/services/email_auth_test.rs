use super::*;

#[test]
fn normalize_email_lowercases_and_trims() {
    assert_eq!(normalize_email("  ANA@Example.com "), Some("ana@example.com".to_owned()));
}

#[test]
fn normalize_email_rejects_invalid_values() {
    assert_eq!(normalize_email(""), None);
    assert_eq!(normalize_email("ana"), None);
    assert_eq!(normalize_email("@example.com"), None);
    assert_eq!(normalize_email("ana@"), None);
    assert_eq!(normalize_email("a@b@c"), None);
}

#[test]
fn normalize_code_uppercases() {
    let code = generate_access_code();
    assert_eq!(normalize_code(&code), Some(code.clone()));
    assert_eq!(normalize_code(" abc234 "), Some("ABC234".to_owned()));
}

#[test]
fn normalize_code_rejects_bad_shapes() {
    assert_eq!(normalize_code("abc23"), None);
    assert_eq!(normalize_code("abc2345"), None);
    // 0, 1, I and O are excluded from the alphabet.
    assert_eq!(normalize_code("ABC1I0"), None);
    assert_eq!(normalize_code("ABC23!"), None);
}

#[test]
fn generated_codes_use_alphabet() {
    let code = generate_access_code();
    assert_eq!(code.len(), CODE_LEN);
    assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
}

#[test]
fn hash_is_stable_hex_sha256() {
    let a = hash_access_code("ABC234");
    assert_eq!(a, hash_access_code("ABC234"));
    assert_ne!(a, hash_access_code("ABC235"));
    assert_eq!(a.len(), 64);
}

#[test]
fn name_defaults_to_local_part() {
    assert_eq!(name_from_email("maria.silva@example.com"), "maria.silva");
}

#[test]
fn template_injects_email_and_code() {
    let html = render_email_auth_template("ana@example.com", "ABC234");
    assert!(html.contains("ana@example.com"));
    assert!(html.contains("ABC234"));
    assert!(!html.contains("{{EMAIL}}"));
    assert!(!html.contains("{{CODE}}"));
}

#[test]
fn only_delivery_errors_are_retryable() {
    assert!(EmailAuthError::EmailDelivery("down".into()).retryable());
    assert!(!EmailAuthError::VerificationFailed.retryable());
    assert_eq!(EmailAuthError::InvalidEmail.error_code(), "E_INVALID_EMAIL");
}
