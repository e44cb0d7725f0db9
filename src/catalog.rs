//! Built-in ticket and event catalogs.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::Amount;
use crate::model::{EventDescriptor, TicketType, TicketTypeId};

/// Fare classes on sale, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    types: BTreeMap<TicketTypeId, TicketType>,
}

impl Catalog {
    pub fn new(types: impl IntoIterator<Item = TicketType>) -> Self {
        Self {
            types: types.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    /// The festival's fare classes. The confirmation breakdown prices from
    /// this same table.
    pub fn builtin() -> Self {
        Self::new([
            TicketType {
                id: TicketTypeId::EarlyBird,
                name: "Early Bird",
                price: Amount::from_units(99),
                max_per_order: 10,
                available: 25,
            },
            TicketType {
                id: TicketTypeId::General,
                name: "General Admission",
                price: Amount::from_units(125),
                max_per_order: 10,
                available: 1800,
            },
            TicketType {
                id: TicketTypeId::Vip,
                name: "VIP Experience",
                price: Amount::from_units(299),
                max_per_order: 6,
                available: 150,
            },
            TicketType {
                id: TicketTypeId::Backstage,
                name: "Backstage Pass",
                price: Amount::from_units(599),
                max_per_order: 4,
                available: 25,
            },
        ])
    }

    pub fn get(&self, id: TicketTypeId) -> Option<&TicketType> {
        self.types.get(&id)
    }

    pub fn types(&self) -> impl Iterator<Item = &TicketType> + '_ {
        self.types.values()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const DEFAULT_EVENT_ID: &str = "1";

/// Look up an event by id, falling back to the built-in festival.
pub fn event(id: Option<&str>) -> EventDescriptor {
    match id {
        Some(DEFAULT_EVENT_ID) | None => default_event(),
        Some(other) => {
            tracing::debug!(event = other, "unknown event id, using default event");
            default_event()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct EventQuery {
    event: Option<String>,
}

/// Decoded `event` parameter of a query string such as `?event=1&utm=x`.
/// A query that does not decode counts as having none.
pub fn event_id_from_query(query: &str) -> Option<String> {
    let query: EventQuery = match serde_urlencoded::from_str(query.trim_start_matches('?')) {
        Ok(query) => query,
        Err(e) => {
            tracing::debug!(reason = %e, "unreadable query string");
            EventQuery::default()
        }
    };
    query.event.filter(|id| !id.is_empty())
}

/// Pick the event named by the query string's `event` parameter.
pub fn event_from_query(query: &str) -> EventDescriptor {
    event(event_id_from_query(query).as_deref())
}

pub fn default_event() -> EventDescriptor {
    EventDescriptor {
        id: DEFAULT_EVENT_ID.to_string(),
        title: "Neon Nights Festival 2025".to_string(),
        date: "March 15, 2025".to_string(),
        time: "6:00 PM".to_string(),
        location: "Ocean Drive Arena, Miami Beach".to_string(),
        image: "https://images.pexels.com/photos/1763075/pexels-photo-1763075.jpeg?auto=compress&cs=tinysrgb&w=400".to_string(),
    }
}
