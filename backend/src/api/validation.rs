//! Shape checks for the user JSON body accepted by `/register` and
//! `PATCH /users/{id}`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::api::error::ApiError;

pub type JsonObject = Map<String, Value>;

const USERNAME_MIN: usize = 1;
const USERNAME_MAX: usize = 64;
const EMAIL_MIN: usize = 5;
const EMAIL_MAX: usize = 320;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 32;

const USERNAME_PATTERN: &str = "^[a-zA-Z ]*$";

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(USERNAME_PATTERN).expect("compile username regex"));

// Requires at least one dot in the domain, so bare hosts like `ann@localhost`
// are rejected.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)+$")
        .expect("compile email regex")
});

const FIELDS: [&str; 3] = ["username", "email", "password"];

/// Parses a request body that must be a non-empty JSON object.
pub fn parse_object(body: &[u8]) -> Result<JsonObject, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::EmptyBody);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if map.is_empty() => Err(ApiError::EmptyBody),
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::Schema(
            "\"value\" must be of type object".to_string(),
        )),
        Err(_) => Err(ApiError::InvalidJson),
    }
}

/// Parses a body leniently: anything that is not a JSON object counts as `{}`.
pub fn parse_object_lenient(body: &[u8]) -> JsonObject {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => JsonObject::new(),
    }
}

/// Returns the string value of `key`, treating non-strings as absent.
pub fn string_field<'a>(body: &'a JsonObject, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

/// Checks every known field that is present and rejects unknown keys.
///
/// Presence of individual fields is left to the handlers; the first
/// violation found is reported.
pub fn validate_user_body(body: &JsonObject) -> Result<(), ApiError> {
    for key in FIELDS {
        let Some(value) = body.get(key) else {
            continue;
        };
        let Value::String(value) = value else {
            return Err(schema_error(format!("\"{key}\" must be a string")));
        };
        if value.is_empty() {
            return Err(schema_error(format!("\"{key}\" is not allowed to be empty")));
        }

        match key {
            "username" => check_username(value)?,
            "email" => check_email(value)?,
            _ => check_length(key, value, PASSWORD_MIN, PASSWORD_MAX)?,
        }
    }

    if let Some(unknown) = body.keys().find(|key| !FIELDS.contains(&key.as_str())) {
        return Err(schema_error(format!("\"{unknown}\" is not allowed")));
    }

    Ok(())
}

fn check_username(value: &str) -> Result<(), ApiError> {
    check_length("username", value, USERNAME_MIN, USERNAME_MAX)?;
    if !USERNAME_REGEX.is_match(value) {
        return Err(schema_error(format!(
            "\"username\" with value \"{value}\" fails to match the required pattern: /{USERNAME_PATTERN}/"
        )));
    }
    Ok(())
}

fn check_email(value: &str) -> Result<(), ApiError> {
    if !EMAIL_REGEX.is_match(value) {
        return Err(schema_error("\"email\" must be a valid email".to_string()));
    }
    check_length("email", value, EMAIL_MIN, EMAIL_MAX)
}

fn check_length(key: &str, value: &str, min: usize, max: usize) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len < min {
        return Err(schema_error(format!(
            "\"{key}\" length must be at least {min} characters long"
        )));
    }
    if len > max {
        return Err(schema_error(format!(
            "\"{key}\" length must be less than or equal to {max} characters long"
        )));
    }
    Ok(())
}

fn schema_error(message: String) -> ApiError {
    ApiError::Schema(message)
}
