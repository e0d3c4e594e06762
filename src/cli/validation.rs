//! Input validation for CLI commands.
//!
//! The stores accept whatever they are given, so every command that creates
//! or edits a record checks its arguments here first and reports all problems
//! at once through [`ValidationErrorBuilder`].

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ValidationErrorBuilder, ValidationErrors};

lazy_static! {
    /// Something@something.tld, no whitespace
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[^\s@]+@[^\s@]+\.[^\s@]+$"
    ).unwrap();
}

/// Validate that a text field is not blank
pub fn validate_required(label: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", label));
    }
    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a project budget in rupees
pub fn validate_budget(budget: Option<i64>) -> Result<(), String> {
    match budget {
        Some(amount) if amount < 0 => Err("Budget cannot be negative".to_string()),
        _ => Ok(()),
    }
}

/// Validate that a deadline does not precede the start date
pub fn validate_date_range(start: NaiveDate, deadline: NaiveDate) -> Result<(), String> {
    if deadline < start {
        return Err(format!(
            "Deadline {} is before start date {}",
            deadline, start
        ));
    }
    Ok(())
}

/// Fields of a project about to be created
pub struct ProjectInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub client_name: &'a str,
    pub budget: Option<i64>,
    pub start_date: NaiveDate,
    pub deadline: NaiveDate,
}

pub fn validate_project(input: &ProjectInput<'_>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("title", validate_required("Title", input.title))
        .check("description", validate_required("Description", input.description))
        .check("client_name", validate_required("Client name", input.client_name))
        .check("budget", validate_budget(input.budget))
        .check(
            "deadline",
            validate_date_range(input.start_date, input.deadline),
        );
    errors.finish()
}

pub fn validate_invite(email: &str, name: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("email", validate_email(email))
        .check("name", validate_required("Name", name));
    errors.finish()
}

pub fn validate_signup(email: &str, password: &str, name: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("email", validate_email(email))
        .check("password", validate_required("Password", password))
        .check("name", validate_required("Name", name));
    errors.finish()
}

/// Title and message are required; a specific recipient must be named
pub fn validate_notification(
    title: &str,
    message: &str,
    recipient: Option<&str>,
    broadcast: bool,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("title", validate_required("Title", title))
        .check("message", validate_required("Message", message));
    if !broadcast && recipient.map_or(true, |r| r.trim().is_empty()) {
        errors.add("recipient", "Please select a recipient");
    }
    errors.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("admin@taskflow.com").is_ok());
        assert!(validate_email("vikram.singh@taskflow.co.in").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two words@taskflow.com").is_err());
        assert!(validate_email("user@localhost").is_err());
    }

    #[test]
    fn test_validate_budget_and_dates() {
        assert!(validate_budget(None).is_ok());
        assert!(validate_budget(Some(0)).is_ok());
        assert!(validate_budget(Some(-1)).is_err());

        assert!(validate_date_range(date(2, 1), date(2, 1)).is_ok());
        assert!(validate_date_range(date(2, 1), date(1, 31)).is_err());
    }

    #[test]
    fn test_validate_project_collects_every_field() {
        let input = ProjectInput {
            title: "  ",
            description: "",
            client_name: "HDFC Bank",
            budget: Some(-5),
            start_date: date(6, 1),
            deadline: date(5, 1),
        };
        let err = validate_project(&input).unwrap_err();
        let fields: Vec<_> = err.fields().keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["budget", "deadline", "description", "title"]);
        assert_eq!(err.message(), "Validation failed for 4 fields");
    }

    #[test]
    fn test_validate_notification_recipient() {
        assert!(validate_notification("Heads up", "Standup moved", None, true).is_ok());
        assert!(validate_notification("Heads up", "Standup moved", Some("5"), false).is_ok());

        let err = validate_notification("Heads up", "Standup moved", None, false).unwrap_err();
        assert_eq!(err.message(), "Please select a recipient");
        assert!(validate_notification("", "", Some("5"), false).is_err());
    }

    #[test]
    fn test_validate_invite_and_signup() {
        assert!(validate_invite("pooja.gupta@taskflow.com", "Pooja Gupta").is_ok());
        assert!(validate_invite("pooja", "").is_err());
        assert!(validate_signup("neha@taskflow.com", "pw", "Neha").is_ok());
        assert_eq!(
            validate_signup("neha@taskflow.com", "pw", " ")
                .unwrap_err()
                .message(),
            "Name is required"
        );
    }
}
