//! Request field validation.
//!
//! Simple field checks collected into an error list; handlers turn a
//! non-empty list into a `ServerError::Validation`.

use chrono::NaiveDate;

/// Validates a username: required, 3–50 characters.
pub fn check_username(username: &str, errors: &mut Vec<String>) {
    if username.trim().is_empty() {
        errors.push("Username is required".to_string());
    } else if username.len() < 3 || username.len() > 50 {
        errors.push("Username must be between 3 and 50 characters".to_string());
    }
}

/// Validates an email address shape.
pub fn check_email(email: &str, errors: &mut Vec<String>) {
    if email.trim().is_empty() {
        errors.push("Email is required".to_string());
        return;
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid {
        errors.push("Invalid email format".to_string());
    }
}

/// Validates a password: required, at least 6 characters.
pub fn check_password(password: &str, errors: &mut Vec<String>) {
    if password.trim().is_empty() {
        errors.push("Password is required".to_string());
    } else if password.len() < 6 {
        errors.push("Password must be at least 6 characters".to_string());
    }
}

/// Validates a project or task title: required, 3–100 characters.
pub fn check_title(title: &str, errors: &mut Vec<String>) {
    if title.trim().is_empty() {
        errors.push("Title is required".to_string());
    } else if title.len() < 3 || title.len() > 100 {
        errors.push("Title must be between 3 and 100 characters".to_string());
    }
}

/// Validates that a date range is ordered.
pub fn check_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>, errors: &mut Vec<String>) {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            errors.push("End date must be after start date".to_string());
        }
    }
}

/// Validates an hours figure: non-negative.
pub fn check_hours(label: &str, hours: Option<f64>, errors: &mut Vec<String>) {
    if let Some(hours) = hours {
        if hours < 0.0 || !hours.is_finite() {
            errors.push(format!("{label} must be a positive number"));
        }
    }
}
