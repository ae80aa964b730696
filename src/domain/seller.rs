//! Seller records and field validation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::DomainError;

const NAME_MIN_LEN: usize = 2;
const NAME_MAX_LEN: usize = 50;
const CONTACT_MIN_LEN: usize = 5;
const CONTACT_MAX_LEN: usize = 50;

/// A registered seller as stored in `sellers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    pub id: i64,
    pub seller_name: String,
    pub contact_info: String,
    pub registration_date: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub is_active: bool,
}

/// Validate a seller display name (2 to 50 characters after trimming).
pub fn validate_seller_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    let len = name.chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        return Err(DomainError::validation(format!(
            "seller_name must contain from {NAME_MIN_LEN} to {NAME_MAX_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Validate seller contact info: an email address of 5 to 50 characters.
pub fn validate_contact_info(contact: &str) -> Result<String, DomainError> {
    let contact = contact.trim();
    let len = contact.chars().count();
    if !(CONTACT_MIN_LEN..=CONTACT_MAX_LEN).contains(&len) {
        return Err(DomainError::validation(format!(
            "contact_info must contain from {CONTACT_MIN_LEN} to {CONTACT_MAX_LEN} characters"
        )));
    }
    if !looks_like_email(contact) {
        return Err(DomainError::validation("contact_info must be an email address"));
    }
    Ok(contact.to_string())
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Validated fields for a new seller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSeller {
    pub seller_name: String,
    pub contact_info: String,
}

impl NewSeller {
    pub fn new(seller_name: &str, contact_info: &str) -> Result<Self, DomainError> {
        Ok(Self {
            seller_name: validate_seller_name(seller_name)?,
            contact_info: validate_contact_info(contact_info)?,
        })
    }
}

/// Validated partial update of a seller. At least one field is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellerChanges {
    pub seller_name: Option<String>,
    pub contact_info: Option<String>,
}

impl SellerChanges {
    pub fn new(seller_name: Option<&str>, contact_info: Option<&str>) -> Result<Self, DomainError> {
        if seller_name.is_none() && contact_info.is_none() {
            return Err(DomainError::EmptyUpdate);
        }
        Ok(Self {
            seller_name: seller_name.map(validate_seller_name).transpose()?,
            contact_info: contact_info.map(validate_contact_info).transpose()?,
        })
    }
}
