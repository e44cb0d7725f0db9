//! Booking references and support ticket numbers.
//!
//! A booking reference is `EP`, the upper-case base-36 millisecond timestamp,
//! then 5 random upper-case base-36 characters.

use std::fmt;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 5;
const BARCODE_LEN: usize = 12;

/// Upper-case base-36 rendering of a non-negative integer.
pub fn base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

/// Unique token identifying a completed booking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingReference(String);

impl BookingReference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build a reference from a timestamp and a random suffix.
    pub fn from_parts(millis: u64, rng: &mut impl Rng) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(format!("EP{}{suffix}", base36(millis)))
    }

    /// Reference without a random suffix, as used by the demo record.
    pub fn timestamp_only(millis: u64) -> Self {
        Self(format!("EP{}", base36(millis)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric barcode text: letters stripped, right-padded with zeros to 12 characters.
    pub fn barcode_number(&self) -> String {
        let mut digits: String = self.0.chars().filter(|c| !c.is_ascii_uppercase()).collect();
        while digits.chars().count() < BARCODE_LEN {
            digits.push('0');
        }
        digits
    }
}

impl fmt::Display for BookingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues booking references.
///
/// The timestamp part never repeats within one generator: if the clock has
/// not moved since the previous reference, the previous timestamp plus one
/// millisecond is used instead.
#[derive(Debug, Default)]
pub struct ReferenceGenerator {
    last_millis: u64,
}

impl ReferenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_reference(&mut self) -> BookingReference {
        self.next_at(now_millis(), &mut rand::thread_rng())
    }

    fn next_at(&mut self, millis: u64, rng: &mut impl Rng) -> BookingReference {
        let millis = millis.max(self.last_millis + 1);
        self.last_millis = millis;
        BookingReference::from_parts(millis, rng)
    }
}

/// Contact-form support ticket number, `SUP` plus the base-36 timestamp.
pub fn support_ticket_number() -> String {
    format!("SUP{}", base36(now_millis()))
}
