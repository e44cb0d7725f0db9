//! Core domain types for the booking flow.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Amount;
use crate::booking::{Cart, ValidationError};
use crate::reference::BookingReference;

const EVENT_START_FORMAT: &str = "%B %d, %Y %I:%M %p";

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Basic `local@domain.tld` shape check shared by the booking and contact forms.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

/// Fare class identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketTypeId {
    EarlyBird,
    General,
    Vip,
    Backstage,
}

impl TicketTypeId {
    pub const ALL: [TicketTypeId; 4] = [
        TicketTypeId::EarlyBird,
        TicketTypeId::General,
        TicketTypeId::Vip,
        TicketTypeId::Backstage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TicketTypeId::EarlyBird => "early-bird",
            TicketTypeId::General => "general",
            TicketTypeId::Vip => "vip",
            TicketTypeId::Backstage => "backstage",
        }
    }
}

impl fmt::Display for TicketTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ticket type '{0}'")]
pub struct UnknownTicketType(pub String);

impl FromStr for TicketTypeId {
    type Err = UnknownTicketType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TicketTypeId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownTicketType(s.to_string()))
    }
}

/// A purchasable fare class with its caps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketType {
    pub id: TicketTypeId,
    pub name: &'static str,
    pub price: Amount,
    /// Per-order maximum quantity.
    pub max_per_order: u32,
    /// Remaining inventory.
    pub available: u32,
}

impl TicketType {
    /// Highest quantity a single order may hold for this type.
    pub fn cap(&self) -> u32 {
        self.max_per_order.min(self.available)
    }
}

/// Raw customer details as entered on the details step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<String>,
    pub newsletter: bool,
    pub whatsapp: bool,
}

impl CustomerForm {
    /// Check required fields and email shape, producing an immutable record.
    pub fn validate(self) -> Result<CustomerRecord, ValidationError> {
        let required = [&self.first_name, &self.last_name, &self.email, &self.phone];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(ValidationError::MissingFields);
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(CustomerRecord {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            date_of_birth: self.date_of_birth.filter(|dob| !dob.trim().is_empty()),
            newsletter: self.newsletter,
            whatsapp: self.whatsapp,
        })
    }
}

/// Validated customer details, created at step-2 submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub newsletter: bool,
    #[serde(default)]
    pub whatsapp: bool,
}

impl CustomerRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The event a booking is made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDescriptor {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    #[serde(default)]
    pub image: String,
}

impl EventDescriptor {
    /// Start of the event from the listed date and time, e.g.
    /// `March 15, 2025` + `6:00 PM`.
    pub fn starts_at(&self) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(&format!("{} {}", self.date, self.time), EVENT_START_FORMAT)
    }
}

/// A completed booking, as persisted for the confirmation view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub reference: BookingReference,
    pub customer: CustomerRecord,
    pub tickets: Cart,
    pub total: Amount,
    pub event: EventDescriptor,
}

impl BookingRecord {
    /// Number of tickets across all fare classes.
    pub fn ticket_count(&self) -> u64 {
        self.tickets.ticket_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> CustomerForm {
        CustomerForm {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "+44 20 7946 0000".into(),
            ..Default::default()
        }
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("@c.de"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn ticket_type_id_parses_kebab_case() {
        assert_eq!("early-bird".parse(), Ok(TicketTypeId::EarlyBird));
        assert_eq!("vip".parse(), Ok(TicketTypeId::Vip));
        assert!("VIP".parse::<TicketTypeId>().is_err());
    }

    #[test]
    fn ticket_type_id_serializes_as_kebab_case() {
        let json = serde_json::to_string(&TicketTypeId::EarlyBird).unwrap();
        assert_eq!(json, "\"early-bird\"");
    }

    #[test]
    fn cap_is_min_of_max_and_available() {
        let t = TicketType {
            id: TicketTypeId::Backstage,
            name: "Backstage Pass",
            price: Amount::from_units(599),
            max_per_order: 4,
            available: 2,
        };
        assert_eq!(t.cap(), 2);
    }

    #[test]
    fn valid_form_produces_record() {
        let record = form().validate().unwrap();
        assert_eq!(record.full_name(), "Ada Lovelace");
        assert_eq!(record.date_of_birth, None);
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut f = form();
        f.phone = "   ".into();
        assert_eq!(f.validate(), Err(ValidationError::MissingFields));
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut f = form();
        f.email = "ada.example.com".into();
        assert_eq!(f.validate(), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn customer_record_uses_camel_case_keys() {
        let mut f = form();
        f.date_of_birth = Some("1815-12-10".into());
        f.newsletter = true;
        let json = serde_json::to_value(f.validate().unwrap()).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["dateOfBirth"], "1815-12-10");
        assert_eq!(json["newsletter"], true);
        assert_eq!(json["whatsapp"], false);
    }
}
