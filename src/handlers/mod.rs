pub mod auth;
pub mod clients;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod users;

use crate::error::ApiError;

/// Unwrap a required request-body field or answer 400 with the field name.
pub(crate) fn require<T>(field: Option<T>, name: &str) -> Result<T, ApiError> {
    field.ok_or_else(|| ApiError::bad_request(format!("Missing '{}' in request body", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_passes_present_values() {
        assert_eq!(require(Some(42), "quantity").unwrap(), 42);
    }

    #[test]
    fn require_names_the_missing_field() {
        let err = require::<i32>(None, "client_id").unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Missing 'client_id' in request body");
    }
}
