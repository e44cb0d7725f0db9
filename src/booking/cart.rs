use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::booking::CapacityError;
use crate::model::{TicketType, TicketTypeId};

/// Selected quantity per fare class. Zero entries are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart(BTreeMap<TicketTypeId, u32>);

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quantity(&self, id: TicketTypeId) -> u32 {
        self.0.get(&id).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TicketTypeId, u32)> + '_ {
        self.0.iter().map(|(id, qty)| (*id, *qty))
    }

    pub fn ticket_count(&self) -> u64 {
        self.0.values().map(|qty| u64::from(*qty)).sum()
    }

    /// Set a quantity, clamped into `[0, cap]`. Returns the stored quantity.
    pub fn set_quantity(&mut self, ticket: &TicketType, quantity: u32) -> u32 {
        let quantity = quantity.min(ticket.cap());
        if quantity == 0 {
            self.0.remove(&ticket.id);
        } else {
            self.0.insert(ticket.id, quantity);
        }
        quantity
    }

    /// Add one ticket. Going past the per-order maximum leaves the cart unchanged.
    pub fn increment(&mut self, ticket: &TicketType) -> Result<u32, CapacityError> {
        let wanted = self.quantity(ticket.id) + 1;
        if wanted > ticket.max_per_order {
            return Err(CapacityError::PerOrderMaximum {
                ticket: ticket.id,
                max: ticket.max_per_order,
            });
        }
        Ok(self.set_quantity(ticket, wanted))
    }

    pub fn decrement(&mut self, ticket: &TicketType) -> u32 {
        let wanted = self.quantity(ticket.id).saturating_sub(1);
        self.set_quantity(ticket, wanted)
    }
}

impl FromIterator<(TicketTypeId, u32)> for Cart {
    fn from_iter<I: IntoIterator<Item = (TicketTypeId, u32)>>(iter: I) -> Self {
        Cart(iter.into_iter().filter(|(_, qty)| *qty > 0).collect())
    }
}

/// Stored carts go through `FromIterator`, so zero entries are dropped on load.
impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<TicketTypeId, u32>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

/// Read a quantity typed into a field: leading digits only, anything else is 0.
pub fn parse_quantity(input: &str) -> u32 {
    let input = input.trim();
    let input = input.strip_prefix('+').unwrap_or(input);
    let digits: String = input.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(if digits.is_empty() { 0 } else { u32::MAX })
}

const LOW_STOCK: u32 = 10;

/// Availability line shown under each fare class.
#[derive(Debug, Clone, PartialEq)]
pub struct Availability {
    pub remaining: u32,
    pub label: String,
    pub low_stock: bool,
    /// Width of the "booked" bar, in percent.
    pub fill_percent: f64,
}

impl Availability {
    pub fn of(ticket: &TicketType, reserved: u32) -> Self {
        let remaining = ticket.available.saturating_sub(reserved);
        let low_stock = remaining <= LOW_STOCK;
        let label = if low_stock {
            format!("Only {remaining} left!")
        } else {
            format!("{remaining} available")
        };
        let booked = (1000.0 - f64::from(remaining)) / 1000.0 * 100.0;
        Self {
            remaining,
            label,
            low_stock,
            fill_percent: booked.clamp(0.0, 95.0),
        }
    }
}
