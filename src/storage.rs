//! Session-scoped key-value storage for the booking record.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::BookingRecord;

/// Key under which the completed booking is stored.
pub const BOOKING_KEY: &str = "bookingData";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("malformed value under '{key}': {source}")]
    Malformed {
        key: &'static str,
        source: serde_json::Error,
    },

    #[error("could not serialize value for '{key}': {source}")]
    Serialize {
        key: &'static str,
        source: serde_json::Error,
    },
}

/// String key-value store with browser session semantics.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// In-memory store; lives exactly as long as the session that owns it.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

impl<S: SessionStore + ?Sized> SessionStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        (**self).set(key, value);
    }
}

/// Write the booking into its single slot, replacing any previous one.
pub fn save_booking(store: &mut impl SessionStore, record: &BookingRecord) -> Result<(), StorageError> {
    let json = serde_json::to_string(record).map_err(|source| StorageError::Serialize {
        key: BOOKING_KEY,
        source,
    })?;
    store.set(BOOKING_KEY, json);
    Ok(())
}

/// Read the booking back; `None` when nothing was stored this session.
pub fn load_booking(store: &impl SessionStore) -> Result<Option<BookingRecord>, StorageError> {
    store
        .get(BOOKING_KEY)
        .map(|json| {
            serde_json::from_str(&json).map_err(|source| StorageError::Malformed {
                key: BOOKING_KEY,
                source,
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Amount;
    use crate::catalog::default_event;
    use crate::model::{CustomerRecord, TicketTypeId};
    use crate::reference::BookingReference;
    use proptest::prelude::*;

    fn record(first_name: &str, vip: u32, dob: Option<String>) -> BookingRecord {
        BookingRecord {
            reference: BookingReference::new("EPM7Q2K1XZ3ABC"),
            customer: CustomerRecord {
                first_name: first_name.to_string(),
                last_name: "Doe".into(),
                email: "jane@example.com".into(),
                phone: "+1 555 0100".into(),
                date_of_birth: dob,
                newsletter: true,
                whatsapp: false,
            },
            tickets: [(TicketTypeId::Vip, vip)].into_iter().collect(),
            total: Amount::from_units(299).times(vip) + Amount::from_units(299).times(vip).basis_points(500),
            event: default_event(),
        }
    }

    #[test]
    fn empty_store_has_no_booking() {
        assert!(load_booking(&MemoryStore::new()).unwrap().is_none());
    }

    #[test]
    fn stored_shape_matches_confirmation_contract() {
        let mut store = MemoryStore::new();
        save_booking(&mut store, &record("Jane", 1, None)).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&store.get(BOOKING_KEY).unwrap()).unwrap();
        assert_eq!(raw["reference"], "EPM7Q2K1XZ3ABC");
        assert_eq!(raw["customer"]["firstName"], "Jane");
        assert!(raw["customer"].get("dateOfBirth").is_none());
        assert_eq!(raw["tickets"]["vip"], 1);
        assert_eq!(raw["total"], 313.95);
        assert_eq!(raw["event"]["id"], "1");
    }

    #[test]
    fn save_replaces_previous_booking() {
        let mut store = MemoryStore::new();
        save_booking(&mut store, &record("Jane", 1, None)).unwrap();
        save_booking(&mut store, &record("Joan", 2, None)).unwrap();
        let loaded = load_booking(&store).unwrap().unwrap();
        assert_eq!(loaded.customer.first_name, "Joan");
    }

    /// A store offering only the two operations the trait asks for.
    #[derive(Default)]
    struct SingleSlot(Option<(String, String)>);

    impl SessionStore for SingleSlot {
        fn get(&self, key: &str) -> Option<String> {
            self.0.as_ref().filter(|(k, _)| k == key).map(|(_, v)| v.clone())
        }

        fn set(&mut self, key: &str, value: String) {
            self.0 = Some((key.to_string(), value));
        }
    }

    #[test]
    fn get_and_set_are_enough_for_a_store() {
        let mut store = SingleSlot::default();
        save_booking(&mut store, &record("Jane", 1, None)).unwrap();
        assert_eq!(load_booking(&store).unwrap().unwrap().customer.first_name, "Jane");
        assert!(store.get("newsletterShown").is_none());
    }

    #[test]
    fn malformed_booking_is_reported() {
        let mut store = MemoryStore::new();
        store.set(BOOKING_KEY, "{not json".into());
        assert!(matches!(load_booking(&store), Err(StorageError::Malformed { .. })));
    }

    #[test]
    fn accepts_record_without_optional_fields() {
        let mut store = MemoryStore::new();
        store.set(
            BOOKING_KEY,
            r#"{"reference":"EPX","customer":{"firstName":"J","lastName":"D","email":"j@d.io","phone":"1"},
                "tickets":{"general":2},"total":262.5,
                "event":{"title":"T","date":"March 15, 2025","time":"6:00 PM","location":"L"}}"#
                .into(),
        );
        let loaded = load_booking(&store).unwrap().unwrap();
        assert!(!loaded.customer.newsletter);
        assert_eq!(loaded.ticket_count(), 2);
        assert_eq!(loaded.total, Amount::from_cents(26_250));
    }

    proptest! {
        #[test]
        fn booking_round_trips(name in "[A-Za-z]{1,12}", vip in 1u32..7, dob in proptest::option::of("[0-9]{4}-[0-9]{2}-[0-9]{2}")) {
            let original = record(&name, vip, dob);
            let mut store = MemoryStore::new();
            save_booking(&mut store, &original).unwrap();
            let first = store.get(BOOKING_KEY).unwrap();
            let loaded = load_booking(&store).unwrap().unwrap();
            prop_assert_eq!(&loaded, &original);

            save_booking(&mut store, &loaded).unwrap();
            prop_assert_eq!(store.get(BOOKING_KEY).unwrap(), first);
        }
    }
}
