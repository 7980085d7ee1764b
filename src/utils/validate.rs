//! Request validation helpers.
//!
//! Validation failures are reported to clients as readable sentences such
//! as `email is a required field`, one per failed rule.

use jiff::{tz::TimeZone, Timestamp};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::{AppError, AppResult};
use crate::utils::clock::{Clock, SystemClock};

/// Runs the `validator` rules of `value`, classifying failure as a bad request.
pub fn validate_request<T: Validate>(value: &T) -> AppResult<()> {
    value.validate().map_err(AppError::bad_request)
}

/// Translates every failed rule into a sentence, ordered by field path.
pub fn translate_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect(errors, None, &mut messages);
    messages
}

/// Custom rule `gt_today`: the value must fall after the current UTC day began.
pub fn gt_today(value: &Timestamp) -> Result<(), ValidationError> {
    gt_today_at(value, SystemClock.now())
}

/// `gt_today` evaluated against an explicit `now`.
pub fn gt_today_at(value: &Timestamp, now: Timestamp) -> Result<(), ValidationError> {
    let midnight = now
        .to_zoned(TimeZone::UTC)
        .start_of_day()
        .map_err(|_| ValidationError::new("gt_today"))?
        .timestamp();
    if *value > midnight {
        Ok(())
    } else {
        Err(ValidationError::new("gt_today"))
    }
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<String>) {
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in entries {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|error| translate(&path, error)));
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, Some(&format!("{path}[{index}]")), out);
                }
            }
        }
    }
}

fn translate(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let param = |name: &str| error.params.get(name).map(|value| value.to_string());

    match error.code.as_ref() {
        "required" => format!("{field} is a required field"),
        "email" => format!("{field} must be a valid email address"),
        "url" => format!("{field} must be a valid URL"),
        "length" => match (param("equal"), param("min"), param("max")) {
            (Some(equal), _, _) => format!("{field} must be {equal} characters in length"),
            (None, Some(min), Some(max)) => {
                format!("{field} must be between {min} and {max} characters in length")
            }
            (None, Some(min), None) => format!("{field} must be at least {min} characters in length"),
            (None, None, Some(max)) => {
                format!("{field} must be a maximum of {max} characters in length")
            }
            (None, None, None) => format!("{field} has an invalid length"),
        },
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("{field} must be between {min} and {max}"),
            (Some(min), None) => format!("{field} must be {min} or greater"),
            (None, Some(max)) => format!("{field} must be {max} or less"),
            (None, None) => format!("{field} is out of range"),
        },
        "gt_today" => format!("{field} must be a date after today"),
        code => format!("{field} failed on the '{code}' validation"),
    }
}
