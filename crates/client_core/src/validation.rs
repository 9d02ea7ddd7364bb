//! Sign-in and sign-up form rules, checked before anything leaves the client.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 3;
pub const MIN_FULLNAME_LEN: usize = 2;
pub const MIN_PHONE_LEN: usize = 10;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern compiles")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid form: {}", describe(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|err| format!("{}: {}", err.field, err.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|err| err.field == field)
            .map(|err| err.message.as_str())
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

#[derive(Default)]
struct Collector(Vec<FieldError>);

impl Collector {
    fn email(&mut self, field: &'static str, value: &str) {
        if !email_pattern().is_match(value.trim()) {
            self.push(field, "enter a valid email address");
        }
    }

    fn min_len(&mut self, field: &'static str, value: &str, min: usize, label: &str) {
        if value.chars().count() < min {
            self.push(field, format!("{label} must be at least {min} characters"));
        }
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.0))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Collector::default();
        errors.email("email", &self.email);
        errors.min_len("password", &self.password, MIN_PASSWORD_LEN, "password");
        errors.finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub fullname: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl Validate for RegisterForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Collector::default();
        errors.min_len("fullname", &self.fullname, MIN_FULLNAME_LEN, "name");
        errors.email("email", &self.email);
        errors.min_len("phone", &self.phone, MIN_PHONE_LEN, "phone");
        errors.min_len("password", &self.password, MIN_PASSWORD_LEN, "password");
        errors.finish()
    }
}
