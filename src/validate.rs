//! Local checks for the sign-in and sign-up forms.
//!
//! Nothing here touches the network: a form that fails validation never
//! produces a request.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::api::{SignInRequest, SignUpRequest};
use crate::constants::MIN_PASSWORD_LEN;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("static email pattern"))
}

fn mobile_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("static mobile pattern"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Every failing field, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: &'static str) {
        self.0.push(FieldError { field, message });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn message_for(&self, field: &str) -> Option<&'static str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(self) -> Result<SignInRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let email = self.email.trim().to_string();

        if email.is_empty() {
            errors.push("email", "Email is required");
        } else if !email_pattern().is_match(&email) {
            errors.push("email", "Enter a valid email");
        }
        if self.password.is_empty() {
            errors.push("password", "Password is required");
        }

        errors.into_result(SignInRequest {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub firstname: String,
    pub lastname: String,
    pub mobile: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(self) -> Result<SignUpRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let firstname = self.firstname.trim().to_string();
        let lastname = self.lastname.trim().to_string();
        let mobile = self.mobile.trim().to_string();
        let email = self.email.trim().to_string();

        if firstname.is_empty() {
            errors.push("firstname", "First Name is required");
        }
        if lastname.is_empty() {
            errors.push("lastname", "Last Name is required");
        }
        if mobile.is_empty() {
            errors.push("mobile", "Mobile number is required");
        } else if !mobile_pattern().is_match(&mobile) {
            errors.push("mobile", "Enter a valid 10-digit number");
        }
        if email.is_empty() {
            errors.push("email", "Email is required");
        } else if !email_pattern().is_match(&email) {
            errors.push("email", "Enter a valid email");
        }
        if self.password.is_empty() {
            errors.push("password", "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push("password", "Password must be at least 6 characters");
        }
        if self.confirm_password.is_empty() {
            errors.push("confirm_password", "Confirm your password");
        } else if self.confirm_password != self.password {
            errors.push("confirm_password", "Passwords do not match");
        }

        errors.into_result(SignUpRequest {
            firstname,
            lastname,
            mobile,
            email,
            password: self.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_signup() -> SignUpForm {
        SignUpForm {
            firstname: "Asha".into(),
            lastname: "Rao".into(),
            mobile: "9876543210".into(),
            email: "asha@example.in".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
        }
    }

    #[test]
    fn sign_in_requires_both_fields() {
        let errors = SignInForm::default().validate().unwrap_err();
        assert_eq!(errors.message_for("email"), Some("Email is required"));
        assert_eq!(errors.message_for("password"), Some("Password is required"));
    }

    #[test]
    fn sign_in_rejects_malformed_email() {
        let form = SignInForm {
            email: "not-an-email".into(),
            password: "x".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.message_for("email"), Some("Enter a valid email"));
        assert_eq!(errors.errors().len(), 1);
    }

    #[test]
    fn sign_in_trims_email() {
        let form = SignInForm {
            email: "  user@nse.in ".into(),
            password: "pw".into(),
        };
        assert_eq!(form.validate().unwrap().email, "user@nse.in");
    }

    #[test]
    fn sign_up_accepts_valid_form() {
        let request = valid_signup().validate().expect("valid form");
        assert_eq!(request.mobile, "9876543210");
    }

    #[test]
    fn sign_up_checks_mobile_and_password_rules() {
        let form = SignUpForm {
            mobile: "12345".into(),
            password: "abc".into(),
            confirm_password: "abd".into(),
            ..valid_signup()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.message_for("mobile"), Some("Enter a valid 10-digit number"));
        assert_eq!(
            errors.message_for("password"),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(
            errors.message_for("confirm_password"),
            Some("Passwords do not match")
        );
    }

    #[test]
    fn errors_keep_form_order() {
        let errors = SignUpForm::default().validate().unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["firstname", "lastname", "mobile", "email", "password", "confirm_password"]
        );
    }
}
