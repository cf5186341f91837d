use std::fmt;

use chrono::NaiveDate;

use crate::domain::{error::RosterError, models::PlayerDraft, positions::PositionCode};

pub const MIN_HEIGHT: f64 = 1.5;
pub const MAX_HEIGHT: f64 = 2.2;
pub const MAX_NAME_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collapses violations into a single validation error, `None` when clean.
pub fn into_error(violations: &[Violation]) -> Option<RosterError> {
    if violations.is_empty() {
        return None;
    }
    let joined = violations
        .iter()
        .map(|violation| violation.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    Some(RosterError::Validation(joined))
}

/// Field-level constraints applied to every candidate before it is stored.
pub trait PlayerValidator: Send + Sync {
    fn validate(&self, draft: &PlayerDraft, today: NaiveDate) -> Vec<Violation>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintValidator;

impl ConstraintValidator {
    fn check_name(field: &'static str, label: &str, value: &str, violations: &mut Vec<Violation>) {
        if value.trim().is_empty() {
            violations.push(Violation::new(field, format!("{} must not be blank", label)));
        } else if value.chars().count() > MAX_NAME_LENGTH {
            violations.push(Violation::new(
                field,
                format!("{} must not exceed {} characters", label, MAX_NAME_LENGTH),
            ));
        }
    }
}

impl PlayerValidator for ConstraintValidator {
    fn validate(&self, draft: &PlayerDraft, today: NaiveDate) -> Vec<Violation> {
        let mut violations = Vec::new();

        Self::check_name("firstName", "First name", &draft.first_name, &mut violations);
        Self::check_name("lastName", "Last name", &draft.last_name, &mut violations);

        if draft.nationalities.is_empty() {
            violations.push(Violation::new(
                "nationalities",
                "At least one nationality must be provided",
            ));
        } else if draft.nationalities.iter().any(|n| n.trim().is_empty()) {
            violations.push(Violation::new("nationalities", "Nationality name must not be blank"));
        }

        if draft.positions.is_empty() {
            violations.push(Violation::new("positions", "At least one position must be provided"));
        }
        for code in &draft.positions {
            if code.trim().is_empty() {
                violations.push(Violation::new("positions", "Position name must not be blank"));
            } else if code.parse::<PositionCode>().is_err() {
                violations.push(Violation::new(
                    "positions",
                    format!("Unknown position code: {}", code),
                ));
            }
        }

        match draft.date_of_birth {
            Some(dob) if dob < today => {}
            _ => violations.push(Violation::new(
                "dateOfBirth",
                "Date of birth must be in the past",
            )),
        }

        match draft.height {
            None => violations.push(Violation::new("height", "Height must be provided")),
            Some(height) if height.is_nan() || height < MIN_HEIGHT => {
                violations.push(Violation::new("height", "The player is too short to play"))
            }
            Some(height) if height > MAX_HEIGHT => {
                violations.push(Violation::new("height", "The player is too tall to play"))
            }
            Some(_) => {}
        }

        violations
    }
}
