pub mod amount;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod confirmation;
pub mod contact;
pub mod home;
pub mod listing;
pub mod model;
pub mod notify;
pub mod payment;
pub mod pricing;
pub mod reference;
pub mod script;
pub mod storage;
pub mod timer;

pub use amount::Amount;
pub use booking::{BookingAction, BookingError, BookingFlow, Cart, Navigation, Step};
pub use catalog::Catalog;
pub use config::Config;
pub use confirmation::{ConfirmationPage, ConfirmationView};
pub use model::{BookingRecord, CustomerForm, EventDescriptor, TicketType, TicketTypeId};
pub use reference::BookingReference;
pub use storage::{MemoryStore, SessionStore};
