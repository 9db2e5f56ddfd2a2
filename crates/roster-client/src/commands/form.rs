//! The editable subset of a user record and its validation rules.
//!
//! The store never validates; the detail screen runs [`EditValues::validate`]
//! before handing the edited record to the save flow.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use roster_shared::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditValues {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub company_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every rule that failed, in form order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_errors(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

fn website_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(https?://)?([\w-]+\.)+[\w]{2,}(/.*)?$").expect("valid website regex")
    })
}

impl EditValues {
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            website: user.website.clone(),
            street: user.address.street.clone(),
            suite: user.address.suite.clone(),
            city: user.address.city.clone(),
            zipcode: user.address.zipcode.clone(),
            company_name: user.company.name.clone(),
        }
    }

    /// Apply the form on top of `user`.
    ///
    /// Fields the form does not cover (`id`, `username`, the company tagline
    /// and `bs`) are carried over unchanged.
    pub fn apply_to(&self, user: &User) -> User {
        let mut updated = user.clone();
        updated.name = self.name.clone();
        updated.email = self.email.clone();
        updated.phone = self.phone.clone();
        updated.website = self.website.clone();
        updated.address.street = self.street.clone();
        updated.address.suite = self.suite.clone();
        updated.address.city = self.city.clone();
        updated.address.zipcode = self.zipcode.clone();
        updated.company.name = self.company_name.clone();
        updated
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        let mut fail = |field, message| errors.push(FieldError { field, message });

        if self.name.trim().is_empty() {
            fail("name", "Name is required");
        } else if self.name.chars().count() < 2 {
            fail("name", "Name must be at least 2 characters");
        }

        if self.email.trim().is_empty() {
            fail("email", "Email is required");
        } else if !email_re().is_match(self.email.trim()) {
            fail("email", "Enter a valid email");
        }

        if self.phone.trim().is_empty() {
            fail("phone", "Phone is required");
        } else if self.phone.chars().count() < 7 {
            fail("phone", "Enter a valid phone number");
        }

        if self.website.trim().is_empty() {
            fail("website", "Website is required");
        } else if !website_re().is_match(&self.website) {
            fail("website", "Enter a valid website URL");
        }

        if self.street.trim().is_empty() {
            fail("street", "Street is required");
        }
        if self.city.trim().is_empty() {
            fail("city", "City is required");
        }
        if self.zipcode.trim().is_empty() {
            fail("zipcode", "Zip code is required");
        }
        if self.company_name.trim().is_empty() {
            fail("companyName", "Company name is required");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}
