use super::*;

#[test]
fn category_errors_map_to_status() {
    assert_eq!(category_error_to_status(CategoryError::NotFound(Uuid::nil())), StatusCode::NOT_FOUND);
    assert_eq!(category_error_to_status(CategoryError::EmptyName), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(category_error_to_status(CategoryError::Protected), StatusCode::CONFLICT);
}

#[test]
fn payment_method_errors_map_to_status() {
    assert_eq!(payment_method_error_to_status(PaymentMethodError::NotFound(Uuid::nil())), StatusCode::NOT_FOUND);
    assert_eq!(payment_method_error_to_status(PaymentMethodError::DuplicateName), StatusCode::CONFLICT);
    assert_eq!(payment_method_error_to_status(PaymentMethodError::Protected), StatusCode::CONFLICT);
    assert_eq!(payment_method_error_to_status(PaymentMethodError::FallbackRenamed), StatusCode::CONFLICT);
    assert_eq!(
        payment_method_error_to_status(PaymentMethodError::Database(sqlx::Error::RowNotFound)),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
