use crate::catalog::Catalog;
use crate::confirmation::ConfirmationView;
use crate::pricing;

const BRAND_PURPLE: (u8, u8, u8) = (139, 92, 246);
const BLACK: (u8, u8, u8) = (0, 0, 0);

const NOTES: [&str; 4] = [
    "• Please bring a valid photo ID matching the ticket holder name",
    "• Arrive 30-60 minutes before the event start time",
    "• Present this ticket (digital or printed) at the entrance",
    "• For support, contact: support@eventpulse.com or +1 (555) 123-4567",
];

/// A single text placement on the printed ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextItem {
    pub x: u32,
    pub y: u32,
    pub font_size: u8,
    pub color: (u8, u8, u8),
    pub text: String,
}

/// Layout of the downloadable ticket, handed to a document exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintDocument {
    pub file_name: String,
    pub items: Vec<TextItem>,
}

impl PrintDocument {
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|item| item.text.as_str())
    }
}

struct Layout {
    items: Vec<TextItem>,
    font_size: u8,
    color: (u8, u8, u8),
}

impl Layout {
    fn text(&mut self, x: u32, y: u32, text: impl Into<String>) {
        self.items.push(TextItem {
            x,
            y,
            font_size: self.font_size,
            color: self.color,
            text: text.into(),
        });
    }
}

impl ConfirmationView {
    /// Printable ticket: header, reference, event, customer, ticket lines,
    /// stored total and the venue notes.
    pub fn print_document(&self, catalog: &Catalog) -> PrintDocument {
        let record = self.record();
        let event = &record.event;
        let customer = &record.customer;
        let mut doc = Layout {
            items: Vec::new(),
            font_size: 20,
            color: BRAND_PURPLE,
        };

        doc.text(20, 30, "EventPulse");
        doc.font_size = 16;
        doc.color = BLACK;
        doc.text(20, 45, "Event Ticket Confirmation");

        doc.font_size = 12;
        doc.text(20, 60, format!("Booking Reference: {}", record.reference));

        doc.font_size = 14;
        doc.text(20, 80, "Event Details:");
        doc.font_size = 12;
        doc.text(25, 95, format!("Event: {}", event.title));
        doc.text(25, 105, format!("Date: {}", event.date));
        doc.text(25, 115, format!("Time: {}", event.time));
        doc.text(25, 125, format!("Venue: {}", event.location));

        doc.font_size = 14;
        doc.text(20, 145, "Customer Details:");
        doc.font_size = 12;
        doc.text(25, 160, format!("Name: {}", customer.full_name()));
        doc.text(25, 170, format!("Email: {}", customer.email));
        doc.text(25, 180, format!("Phone: {}", customer.phone));

        doc.font_size = 14;
        doc.text(20, 200, "Ticket Summary:");
        doc.font_size = 12;
        let mut y = 215;
        for item in pricing::line_items(record.tickets.iter(), catalog) {
            doc.text(25, y, format!("{} x {}: ${}", item.name, item.quantity, item.line_total));
            y += 10;
        }
        doc.text(25, y + 10, format!("Total: ${}", record.total));

        doc.font_size = 14;
        doc.text(20, y + 35, "Important Notes:");
        doc.font_size = 10;
        for (i, note) in NOTES.iter().enumerate() {
            doc.text(25, y + 50 + 10 * i as u32, *note);
        }

        PrintDocument {
            file_name: format!("EventPulse-Ticket-{}.pdf", record.reference),
            items: doc.items,
        }
    }
}
