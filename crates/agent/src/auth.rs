use serde::Serialize;

const DEMO_VERIFICATION_CODE: &str = "999";
const ATTEMPTS_AFTER_FAILURE: u32 = 2;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthResult {
    pub success: bool,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_remaining: Option<u32>,
    pub message: String,
}

/// Checks a one-time code. No attempt counter is kept between calls, so
/// the remaining-attempts figure is always the same.
pub fn authenticate(code: &str) -> AuthResult {
    if code == DEMO_VERIFICATION_CODE {
        AuthResult {
            success: true,
            verified: true,
            customer_name: Some("Michael Miebach".to_string()),
            account_number: Some("8765309".to_string()),
            attempts_remaining: None,
            message: "Thank you, Michael. You are now verified.".to_string(),
        }
    } else {
        AuthResult {
            success: false,
            verified: false,
            customer_name: None,
            account_number: None,
            attempts_remaining: Some(ATTEMPTS_AFTER_FAILURE),
            message: "The code you entered is incorrect. Please try again.".to_string(),
        }
    }
}
