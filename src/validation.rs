//! Form schemas for sign-in, user management and email entries.
//!
//! Each `validate_*` function is pure: it reads raw form fields and returns
//! either the typed data or a map of field name to the first failing message.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{AppError, FieldErrors};

/// Raw form fields as submitted.
pub type FormFields = HashMap<String, String>;

/// Required prefix of every registration number.
pub const REGISTRATION_PREFIX: &str = "RA";

#[derive(Debug)]
pub enum Validated<T> {
    Valid(T),
    Invalid(FieldErrors),
}

impl<T> Validated<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Validated::Valid(data) => Some(data),
            Validated::Invalid(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, AppError> {
        match self {
            Validated::Valid(data) => Ok(data),
            Validated::Invalid(errors) => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignIn {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddUser {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteUser {
    pub email: String,
}

/// A validated email entry, ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddEntry {
    pub email: String,
    pub name: Option<String>,
    pub registration_number: Option<String>,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

enum Rule {
    MinLength(usize, &'static str),
    Email(&'static str),
    StartsWith(&'static str, &'static str),
}

impl Rule {
    fn check(&self, value: &str) -> Result<(), &'static str> {
        let ok = match self {
            Rule::MinLength(min, _) => value.chars().count() >= *min,
            Rule::Email(_) => is_valid_email(value),
            Rule::StartsWith(prefix, _) => value.starts_with(prefix),
        };
        if ok {
            return Ok(());
        }
        Err(match self {
            Rule::MinLength(_, msg) | Rule::Email(msg) | Rule::StartsWith(_, msg) => *msg,
        })
    }
}

/// Collects errors across fields while each field is checked independently.
struct Checker<'a> {
    input: &'a FormFields,
    errors: FieldErrors,
}

impl<'a> Checker<'a> {
    fn new(input: &'a FormFields) -> Self {
        Self {
            input,
            errors: FieldErrors::new(),
        }
    }

    fn required(&mut self, field: &str, missing: &'static str, rules: &[Rule]) -> Option<String> {
        let input = self.input;
        match input.get(field) {
            Some(value) => self.apply(field, normalize(field, value), rules),
            None => {
                self.errors.insert(field.to_string(), missing.to_string());
                None
            }
        }
    }

    /// `Some(None)` when the field is absent, `None` when it is present but invalid.
    fn optional(&mut self, field: &str, rules: &[Rule]) -> Option<Option<String>> {
        let input = self.input;
        match input.get(field) {
            Some(value) => self.apply(field, normalize(field, value), rules).map(Some),
            None => Some(None),
        }
    }

    fn apply(&mut self, field: &str, value: String, rules: &[Rule]) -> Option<String> {
        for rule in rules {
            if let Err(msg) = rule.check(&value) {
                self.errors.insert(field.to_string(), msg.to_string());
                return None;
            }
        }
        Some(value)
    }

    fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Validated<T> {
        if !self.errors.is_empty() {
            return Validated::Invalid(self.errors);
        }
        match build() {
            Some(data) => Validated::Valid(data),
            None => Validated::Invalid(self.errors),
        }
    }
}

fn normalize(field: &str, value: &str) -> String {
    if field == "email" {
        value.trim().to_string()
    } else {
        value.to_string()
    }
}

fn email_rules() -> [Rule; 1] {
    [Rule::Email("Please enter a valid email address")]
}

pub fn validate_sign_in(input: &FormFields) -> Validated<SignIn> {
    let mut c = Checker::new(input);
    let username = c.required(
        "username",
        "Username is required",
        &[Rule::MinLength(3, "Username is required")],
    );
    let password = c.required(
        "password",
        "Password is required",
        &[Rule::MinLength(3, "Password is required")],
    );
    c.finish(|| {
        Some(SignIn {
            username: username?,
            password: password?,
        })
    })
}

pub fn validate_add_user(input: &FormFields) -> Validated<AddUser> {
    let mut c = Checker::new(input);
    let email = c.required("email", "Email is required", &email_rules());
    let username = c.required(
        "username",
        "Username is required",
        &[Rule::MinLength(3, "Username is required")],
    );
    let password = c.required(
        "password",
        "Password is required",
        &[Rule::MinLength(3, "Password is required")],
    );
    c.finish(|| {
        Some(AddUser {
            email: email?,
            username: username?,
            password: password?,
        })
    })
}

pub fn validate_delete_user(input: &FormFields) -> Validated<DeleteUser> {
    let mut c = Checker::new(input);
    let email = c.required("email", "Email is required", &email_rules());
    c.finish(|| Some(DeleteUser { email: email? }))
}

pub fn validate_add_entry(input: &FormFields) -> Validated<AddEntry> {
    let mut c = Checker::new(input);
    let email = c.required("email", "Email is required", &email_rules());
    let name = c.optional("name", &[]);
    let registration_number = c.optional(
        "registrationNumber",
        &[Rule::StartsWith(
            REGISTRATION_PREFIX,
            "Enter a valid registration number",
        )],
    );
    c.finish(|| {
        Some(AddEntry {
            email: email?,
            name: name?,
            registration_number: registration_number?,
        })
    })
}

/// Drops fields whose value is empty, so blank optional inputs count as absent.
pub fn without_empty(input: FormFields) -> FormFields {
    input.into_iter().filter(|(_, v)| !v.is_empty()).collect()
}
