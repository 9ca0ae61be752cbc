use std::collections::BTreeMap;

use serde::Serialize;

pub const USERNAME_MAX_LENGTH: usize = 16;
pub const PASSWORD_MIN_LENGTH: usize = 6;
pub const PASSWORD_MAX_LENGTH: usize = 128;
pub const EMAIL_MAX_LENGTH: usize = 80;
pub const FIRSTNAME_MAX_LENGTH: usize = 30;
pub const LASTNAME_MAX_LENGTH: usize = 70;

pub const MSG_REQUIRED: &str = "Required.";
pub const MSG_USERNAME_FORMAT: &str =
    "A username may contain only letters, numbers and underscores.";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Passwords must be at least 6 characters.";
pub const MSG_NAME_FORMAT: &str =
    "Names may contain only letters, spaces, apostrophes and hyphens.";
pub const MSG_EMAIL_FORMAT: &str = "Invalid email address.";
pub const MSG_USERNAME_TAKEN: &str = "An account with that username already exists.";
pub const MSG_EMAIL_TAKEN: &str = "An account with that email address already exists.";
pub const MSG_PASSWORD_MISMATCH: &str = "The passwords did not match.";
pub const MSG_EMAIL_MISMATCH: &str = "The email addresses did not match.";
pub const MSG_CAPTCHA_INVALID: &str = "The captcha is not valid.";
pub const MSG_CAPTCHA_UNREACHABLE: &str = "Unable to check the captcha from the server.";

/// Raw field values as submitted by the applicant. Request-scoped; the
/// fixed field set means callers can never smuggle in columns the flow
/// owns (user id, validate token, timestamps).
#[derive(Debug, Clone, Default)]
pub struct SubmittedFields {
    pub username: String,
    pub password: String,
    pub password2: String,
    pub email: String,
    pub email2: String,
    pub firstname: String,
    pub lastname: String,
    pub captcha: Option<String>,
}

/// Normalized values of a submission that passed every check. Only the
/// validation pass constructs one, and saving consumes it, so a result
/// cannot be saved twice and unvalidated input cannot be saved at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanFields {
    username: String,
    password: String,
    email: String,
    firstname: String,
    lastname: String,
}

impl CleanFields {
    pub(crate) fn new(
        username: String,
        password: String,
        email: String,
        firstname: String,
        lastname: String,
    ) -> Self {
        Self {
            username,
            password,
            email,
            firstname,
            lastname,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn firstname(&self) -> &str {
        &self.firstname
    }

    pub fn lastname(&self) -> &str {
        &self.lastname
    }
}

/// Per-field and form-wide error messages, collected across the whole
/// submission in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
    global: Vec<String>,
}

impl ValidationErrors {
    pub fn add_field(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn add_global(&mut self, message: impl Into<String>) {
        self.global.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.global.is_empty()
    }

    pub fn field_is_clean(&self, field: &str) -> bool {
        !self.fields.contains_key(field)
    }

    pub fn field_messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn global_messages(&self) -> &[String] {
        &self.global
    }
}

struct FieldRule<'a> {
    name: &'static str,
    value: &'a str,
    max_length: usize,
    format: Option<fn(&str) -> Result<(), &'static str>>,
}

/// Runs the local (non-database) checks for every field and collects all
/// failures; a field that is missing skips its length and format checks
/// but never stops the other fields from being checked.
pub fn check_fields(fields: &SubmittedFields) -> ValidationErrors {
    let rules = [
        FieldRule {
            name: "username",
            value: fields.username.trim(),
            max_length: USERNAME_MAX_LENGTH,
            format: Some(username_format),
        },
        FieldRule {
            name: "password",
            value: &fields.password,
            max_length: PASSWORD_MAX_LENGTH,
            format: Some(password_strength),
        },
        FieldRule {
            name: "password2",
            value: &fields.password2,
            max_length: PASSWORD_MAX_LENGTH,
            format: None,
        },
        FieldRule {
            name: "email",
            value: fields.email.trim(),
            max_length: EMAIL_MAX_LENGTH,
            format: Some(email_format),
        },
        FieldRule {
            name: "email2",
            value: fields.email2.trim(),
            max_length: EMAIL_MAX_LENGTH,
            format: Some(email_format),
        },
        FieldRule {
            name: "firstname",
            value: fields.firstname.trim(),
            max_length: FIRSTNAME_MAX_LENGTH,
            format: Some(name_format),
        },
        FieldRule {
            name: "lastname",
            value: fields.lastname.trim(),
            max_length: LASTNAME_MAX_LENGTH,
            format: Some(name_format),
        },
    ];

    let mut errors = ValidationErrors::default();
    for rule in rules {
        if rule.value.is_empty() {
            errors.add_field(rule.name, MSG_REQUIRED);
            continue;
        }
        if rule.value.chars().count() > rule.max_length {
            errors.add_field(
                rule.name,
                format!("Must be no more than {} characters.", rule.max_length),
            );
        }
        if let Some(format) = rule.format {
            if let Err(message) = format(rule.value) {
                errors.add_field(rule.name, message);
            }
        }
    }
    errors
}

fn username_format(value: &str) -> Result<(), &'static str> {
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        Err(MSG_USERNAME_FORMAT)
    }
}

fn password_strength(value: &str) -> Result<(), &'static str> {
    if value.chars().count() < PASSWORD_MIN_LENGTH {
        Err(MSG_PASSWORD_TOO_SHORT)
    } else {
        Ok(())
    }
}

fn name_format(value: &str) -> Result<(), &'static str> {
    if value
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '\'' || c == '-')
    {
        Ok(())
    } else {
        Err(MSG_NAME_FORMAT)
    }
}

fn email_format(value: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = value.split_once('@') else {
        return Err(MSG_EMAIL_FORMAT);
    };
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || value.contains(char::is_whitespace)
    {
        return Err(MSG_EMAIL_FORMAT);
    }
    Ok(())
}
