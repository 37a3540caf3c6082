/*
 * Responsibility
 * - Customers の request/response DTO
 * - validation (形式チェック) は field 名 → メッセージの map で返す
 */
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::customer_repo::CustomerRow;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;

// A missing name deserializes as empty so it surfaces as a field error.
// Email is optional; only a non-blank one is checked.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl CreateCustomerRequest {
    pub fn validate(&self) -> Result<(), BTreeMap<String, String>> {
        let mut errors = BTreeMap::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.insert("name".into(), "name is required".into());
        } else if name.chars().count() > MAX_NAME_LEN {
            errors.insert(
                "name".into(),
                format!("name must be <= {MAX_NAME_LEN} chars"),
            );
        }

        if self
            .email()
            .is_some_and(|email| email.len() > MAX_EMAIL_LEN || !looks_like_email(email))
        {
            errors.insert("email".into(), "email must be a valid address".into());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Trimmed email, `None` when absent or blank.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct ListCustomersQuery {
    pub size: Option<i64>,
}

impl ListCustomersQuery {
    pub fn limit(&self) -> Result<i64, String> {
        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(format!("size must be between 1 and {MAX_PAGE_SIZE}"));
        }
        Ok(size)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CustomerRow> for CustomerResponse {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(name: &str, email: &str) -> CreateCustomerRequest {
        CreateCustomerRequest {
            name: name.into(),
            email: Some(email.into()),
        }
    }

    #[test]
    fn accepts_well_formed_customer() {
        assert!(req("Ada Lovelace", "ada@example.com").validate().is_ok());
    }

    #[test]
    fn collects_every_field_error() {
        let errors = req(" ", "not-an-email").validate().unwrap_err();
        assert_eq!(errors["name"], "name is required");
        assert_eq!(errors["email"], "email must be a valid address");
    }

    #[test]
    fn rejects_odd_addresses() {
        for email in ["@b.com", "a@", "a@b@c", "a b@c.com", "a@.com"] {
            assert!(req("x", email).validate().is_err(), "{email}");
        }
    }

    #[test]
    fn missing_name_is_the_only_required_field() {
        let parsed: CreateCustomerRequest = serde_json::from_str("{}").unwrap();
        let errors = parsed.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["name"], "name is required");
    }

    #[test]
    fn absent_or_blank_email_is_accepted() {
        let parsed: CreateCustomerRequest =
            serde_json::from_str(r#"{"name": "Ada", "email": null}"#).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.email(), None);

        let blank = req("Ada", "  ");
        assert!(blank.validate().is_ok());
        assert_eq!(blank.email(), None);

        assert_eq!(req("Ada", " ada@example.com ").email(), Some("ada@example.com"));
    }

    #[test]
    fn page_size_defaults_and_bounds() {
        assert_eq!(ListCustomersQuery { size: None }.limit(), Ok(20));
        assert_eq!(ListCustomersQuery { size: Some(5) }.limit(), Ok(5));
        assert!(ListCustomersQuery { size: Some(0) }.limit().is_err());
        assert!(ListCustomersQuery { size: Some(101) }.limit().is_err());
    }
}
