use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::Amount;
use crate::catalog::{Catalog, default_event};
use crate::confirmation::ConfirmationError;
use crate::model::{BookingRecord, CustomerRecord, TicketTypeId};
use crate::pricing::{self, SERVICE_FEE_BPS, Totals};
use crate::reference::BookingReference;
use crate::storage::{self, SessionStore};

const CALENDAR_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const EVENT_LENGTH_HOURS: i64 = 4;

/// One row of the order breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownLine {
    pub name: &'static str,
    pub quantity: u32,
    pub amount: Amount,
}

impl BreakdownLine {
    pub fn label(&self) -> String {
        format!("{} × {}", self.name, self.quantity)
    }
}

/// Order breakdown re-derived from the stored cart and the price catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakdown {
    pub lines: Vec<BreakdownLine>,
    pub totals: Totals,
}

impl Breakdown {
    /// Ticket lines followed by the service fee and the total.
    pub fn rows(&self) -> Vec<(String, Amount)> {
        self.lines
            .iter()
            .map(|line| (line.label(), line.amount))
            .chain([
                ("Service Fee".to_string(), self.totals.fee),
                ("Total".to_string(), self.totals.total),
            ])
            .collect()
    }
}

/// Decoded content of the ticket's QR code.
#[derive(Debug, Serialize)]
struct CodePayload<'a> {
    #[serde(rename = "ref")]
    reference: &'a str,
    event: &'a str,
    date: &'a str,
    holder: String,
    tickets: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    pub facebook: String,
    pub twitter: String,
    pub whatsapp: String,
}

/// What the confirmation page shows for one booking.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationView {
    record: BookingRecord,
    demo: bool,
}

impl ConfirmationView {
    pub fn new(record: BookingRecord) -> Self {
        Self { record, demo: false }
    }

    /// Read the stored booking. Direct visits without one, or with an
    /// unreadable one, get the demo booking instead.
    pub fn load(store: &impl SessionStore) -> Self {
        match storage::load_booking(store) {
            Ok(Some(record)) => {
                info!(reference = %record.reference, "booking loaded");
                Self::new(record)
            }
            Ok(None) => {
                info!("no stored booking, showing demo booking");
                Self::demo()
            }
            Err(e) => {
                warn!(reason = %e, "stored booking unreadable, showing demo booking");
                Self::demo()
            }
        }
    }

    pub fn demo() -> Self {
        let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let record = BookingRecord {
            reference: BookingReference::timestamp_only(millis),
            customer: CustomerRecord {
                first_name: "John".into(),
                last_name: "Doe".into(),
                email: "john@example.com".into(),
                phone: "+1 555 123 4567".into(),
                date_of_birth: None,
                newsletter: false,
                whatsapp: false,
            },
            tickets: [(TicketTypeId::General, 2)].into_iter().collect(),
            total: Amount::from_cents(26_250),
            event: default_event(),
        };
        Self { record, demo: true }
    }

    pub fn record(&self) -> &BookingRecord {
        &self.record
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    pub fn reference(&self) -> &BookingReference {
        &self.record.reference
    }

    pub fn holder(&self) -> String {
        self.record.customer.full_name()
    }

    pub fn barcode_number(&self) -> String {
        self.record.reference.barcode_number()
    }

    /// Booking date line, e.g. `October 19, 2026`.
    pub fn booking_date(today: NaiveDate) -> String {
        today.format("%B %-d, %Y").to_string()
    }

    pub fn breakdown(&self, catalog: &Catalog) -> Breakdown {
        let items = pricing::line_items(self.record.tickets.iter(), catalog);
        let subtotal = items.iter().map(|item| item.line_total).sum();
        let lines = items
            .into_iter()
            .map(|item| BreakdownLine {
                name: item.name,
                quantity: item.quantity,
                amount: item.line_total,
            })
            .collect();
        Breakdown {
            lines,
            totals: Totals::from_subtotal(subtotal, SERVICE_FEE_BPS),
        }
    }

    /// JSON text encoded into the ticket's QR code.
    pub fn code_payload(&self) -> Result<String, serde_json::Error> {
        let event = &self.record.event;
        serde_json::to_string(&CodePayload {
            reference: self.record.reference.as_str(),
            event: &event.title,
            date: &event.date,
            holder: self.holder(),
            tickets: self.record.ticket_count(),
        })
    }

    /// Event start, reading the listed date and time as UTC.
    pub fn event_start(&self) -> Result<NaiveDateTime, ConfirmationError> {
        let event = &self.record.event;
        event.starts_at().map_err(|source| ConfirmationError::EventStart {
            date: event.date.clone(),
            time: event.time.clone(),
            source,
        })
    }

    /// Google Calendar "create event" link for a four-hour slot.
    pub fn calendar_url(&self) -> Result<String, ConfirmationError> {
        let start = self.event_start()?;
        let end = start + Duration::hours(EVENT_LENGTH_HOURS);
        let event = &self.record.event;
        let details = format!(
            "Booking Reference: {}\n\nDon't forget to bring your ID and arrive early!",
            self.record.reference
        );
        Ok(format!(
            "https://calendar.google.com/calendar/render?action=TEMPLATE&text={}&dates={}/{}&details={}&location={}",
            urlencoding::encode(&event.title),
            start.format(CALENDAR_FORMAT),
            end.format(CALENDAR_FORMAT),
            urlencoding::encode(&details),
            urlencoding::encode(&event.location),
        ))
    }

    pub fn share_text(&self) -> String {
        let event = &self.record.event;
        format!(
            "🎉 I'm going to {}! Join me at this amazing event on {}. Get your tickets at EventPulse!",
            event.title, event.date
        )
    }

    /// Text offered for manual copying when no share capability worked.
    pub fn share_modal_text(&self, origin: &str) -> String {
        format!("{} {origin}", self.share_text())
    }

    pub fn share_links(&self, origin: &str) -> ShareLinks {
        let text = self.share_text();
        ShareLinks {
            facebook: format!(
                "https://facebook.com/sharer/sharer.php?u={}",
                urlencoding::encode(origin)
            ),
            twitter: format!(
                "https://twitter.com/intent/tweet?text={}&url={}",
                urlencoding::encode(&text),
                urlencoding::encode(origin)
            ),
            whatsapp: format!(
                "https://wa.me/?text={}",
                urlencoding::encode(&self.share_modal_text(origin))
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventDescriptor;
    use crate::storage::{BOOKING_KEY, MemoryStore, save_booking};

    fn record(tickets: &[(TicketTypeId, u32)]) -> BookingRecord {
        BookingRecord {
            reference: BookingReference::new("EPM1X2Y3ABCDE"),
            customer: CustomerRecord {
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                email: "jane@example.com".into(),
                phone: "+1 555 0100".into(),
                date_of_birth: None,
                newsletter: false,
                whatsapp: true,
            },
            tickets: tickets.iter().copied().collect(),
            total: Amount::from_cents(31_395),
            event: default_event(),
        }
    }

    #[test]
    fn loads_stored_booking() {
        let mut store = MemoryStore::new();
        save_booking(&mut store, &record(&[(TicketTypeId::Vip, 1)])).unwrap();
        let view = ConfirmationView::load(&store);
        assert!(!view.is_demo());
        assert_eq!(view.holder(), "Jane Doe");
    }

    #[test]
    fn falls_back_to_demo_booking() {
        let view = ConfirmationView::load(&MemoryStore::new());
        assert!(view.is_demo());
        assert_eq!(view.holder(), "John Doe");
        assert!(view.reference().as_str().starts_with("EP"));
        let breakdown = view.breakdown(&Catalog::builtin());
        assert_eq!(breakdown.totals.total, view.record().total);
    }

    #[test]
    fn unreadable_booking_falls_back_to_demo() {
        let mut store = MemoryStore::new();
        store.set(BOOKING_KEY, "[]".into());
        assert!(ConfirmationView::load(&store).is_demo());
    }

    #[test]
    fn vip_breakdown_recomputes_total() {
        let view = ConfirmationView::new(record(&[(TicketTypeId::Vip, 1)]));
        let breakdown = view.breakdown(&Catalog::builtin());
        assert_eq!(breakdown.totals.total, Amount::from_cents(31_395));

        let rows: Vec<_> = breakdown
            .rows()
            .into_iter()
            .map(|(label, amount)| format!("{label}: {amount}"))
            .collect();
        assert_eq!(
            rows,
            ["VIP Experience × 1: 299.00", "Service Fee: 14.95", "Total: 313.95"]
        );
    }

    #[test]
    fn code_payload_summarises_booking() {
        let view = ConfirmationView::new(record(&[(TicketTypeId::Vip, 1), (TicketTypeId::General, 3)]));
        let payload: serde_json::Value = serde_json::from_str(&view.code_payload().unwrap()).unwrap();
        assert_eq!(payload["ref"], "EPM1X2Y3ABCDE");
        assert_eq!(payload["event"], "Neon Nights Festival 2025");
        assert_eq!(payload["date"], "March 15, 2025");
        assert_eq!(payload["holder"], "Jane Doe");
        assert_eq!(payload["tickets"], 4);
    }

    #[test]
    fn code_payload_counts_huge_stored_quantities() {
        let mut stored = serde_json::to_value(record(&[])).unwrap();
        stored["tickets"] = serde_json::json!({"general": 4_294_967_295u32, "vip": 1, "backstage": 0});
        let mut store = MemoryStore::new();
        store.set(BOOKING_KEY, stored.to_string());

        let view = ConfirmationView::load(&store);
        assert!(!view.is_demo());
        assert_eq!(view.record().tickets.iter().count(), 2);
        let payload: serde_json::Value = serde_json::from_str(&view.code_payload().unwrap()).unwrap();
        assert_eq!(payload["tickets"], 4_294_967_296u64);
    }

    #[test]
    fn barcode_from_reference() {
        let view = ConfirmationView::new(record(&[]));
        assert_eq!(view.barcode_number(), "123000000000");
    }

    #[test]
    fn calendar_url_has_utc_slot() {
        let view = ConfirmationView::new(record(&[(TicketTypeId::Vip, 1)]));
        let url = view.calendar_url().unwrap();
        assert!(url.starts_with("https://calendar.google.com/calendar/render?action=TEMPLATE"));
        assert!(url.contains("&text=Neon%20Nights%20Festival%202025"));
        assert!(url.contains("&dates=20250315T180000Z/20250315T220000Z"));
        assert!(url.contains("Booking%20Reference%3A%20EPM1X2Y3ABCDE"));
        assert!(url.contains("&location=Ocean%20Drive%20Arena%2C%20Miami%20Beach"));
    }

    #[test]
    fn calendar_url_reports_unreadable_date() {
        let mut booking = record(&[]);
        booking.event = EventDescriptor {
            date: "sometime soon".into(),
            ..default_event()
        };
        let view = ConfirmationView::new(booking);
        assert!(matches!(
            view.calendar_url(),
            Err(ConfirmationError::EventStart { .. })
        ));
    }

    #[test]
    fn share_text_and_links() {
        let view = ConfirmationView::new(record(&[]));
        assert_eq!(
            view.share_text(),
            "🎉 I'm going to Neon Nights Festival 2025! Join me at this amazing event on March 15, 2025. Get your tickets at EventPulse!"
        );
        let links = view.share_links("https://eventpulse.example");
        assert_eq!(
            links.facebook,
            "https://facebook.com/sharer/sharer.php?u=https%3A%2F%2Feventpulse.example"
        );
        assert!(links.twitter.ends_with("&url=https%3A%2F%2Feventpulse.example"));
        assert!(links.whatsapp.starts_with("https://wa.me/?text=%F0%9F%8E%89"));
    }

    #[test]
    fn booking_date_format() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 9).unwrap();
        assert_eq!(ConfirmationView::booking_date(day), "October 9, 2026");
    }
}
