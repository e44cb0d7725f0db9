//! Booking flow.
//!
//! The flow owns the cart, the current step, the reservation countdown and
//! the page's notifications. It moves through selection, customer details
//! and a simulated payment, and finally stores the booking for the
//! confirmation page. Actions can be applied one at a time or fed as an
//! async stream alongside the one-second reservation tick.

use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::model::{BookingRecord, CustomerForm, CustomerRecord, EventDescriptor, TicketType, TicketTypeId};
use crate::notify::{Level, Notifications};
use crate::payment::SimulatedGateway;
use crate::pricing::{self, OrderSummary, SERVICE_FEE_BPS};
use crate::storage::{self, SessionStore};
use crate::timer::{ReservationTimer, Tick};

mod cart;
pub use cart::{Availability, Cart, parse_quantity};

mod error;
pub use error::{BookingError, CapacityError, ValidationError};

mod step;
pub use step::{Navigation, Step};

/// A user interaction on the booking page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingAction {
    Increment(TicketTypeId),
    Decrement(TicketTypeId),
    SetQuantity(TicketTypeId, u32),
    /// Raw text typed into a quantity field.
    TypeQuantity(TicketTypeId, String),
    ContinueToDetails,
    Back,
    Submit(CustomerForm),
}

impl BookingAction {
    fn name(&self) -> &'static str {
        match self {
            BookingAction::Increment(_) => "increment",
            BookingAction::Decrement(_) => "decrement",
            BookingAction::SetQuantity(..) | BookingAction::TypeQuantity(..) => "set quantity",
            BookingAction::ContinueToDetails => "continue",
            BookingAction::Back => "back",
            BookingAction::Submit(_) => "submit",
        }
    }

    fn ticket(&self) -> Option<TicketTypeId> {
        match self {
            BookingAction::Increment(id)
            | BookingAction::Decrement(id)
            | BookingAction::SetQuantity(id, _)
            | BookingAction::TypeQuantity(id, _) => Some(*id),
            _ => None,
        }
    }
}

/// State of one booking session.
pub struct BookingFlow<S> {
    config: Config,
    catalog: Catalog,
    event: EventDescriptor,
    cart: Cart,
    step: Step,
    customer: Option<CustomerRecord>,
    timer: ReservationTimer,
    notifications: Notifications,
    gateway: SimulatedGateway,
    navigation: Option<Navigation>,
    store: S,
}

/// Public API
impl<S: SessionStore> BookingFlow<S> {
    /// Enter the selection step; the reservation countdown starts now.
    pub fn new(config: Config, event: EventDescriptor, store: S) -> Self {
        info!(event = %event.id, seconds = config.reservation_seconds, "reservation started");
        Self {
            catalog: Catalog::builtin(),
            event,
            cart: Cart::new(),
            step: Step::Selection,
            customer: None,
            timer: ReservationTimer::new(config.reservation_seconds),
            notifications: Notifications::new(config.notification_lifetime),
            gateway: SimulatedGateway::new(config.payment_delay),
            navigation: None,
            store,
            config,
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Drive the flow from a stream of actions until it navigates away or
    /// the stream ends. The reservation countdown ticks every second and
    /// notifications are dropped when their deadline passes.
    pub async fn run(&mut self, mut actions: impl Stream<Item = BookingAction> + Unpin) {
        let period = Duration::from_secs(1);
        let mut ticker = time::interval_at(Instant::now() + period, period);

        while self.navigation.is_none() {
            if self.timer.is_expired() {
                time::sleep(self.config.expiry_redirect_delay).await;
                self.navigate(Navigation::EventListing);
                break;
            }
            let deadline = self.notifications.next_deadline();
            tokio::select! {
                biased;
                action = actions.next() => match action {
                    // a rejected action is already logged and notified
                    Some(action) => { let _ = self.apply(action).await; }
                    None => break,
                },
                _ = ticker.tick() => { self.tick(); },
                _ = sleep_until(deadline) => {
                    self.notifications.expire(Instant::now());
                },
            }
        }
    }

    /// Apply a single action on top of the current state.
    pub async fn apply(&mut self, action: BookingAction) -> Result<(), BookingError> {
        let name = action.name();
        let ticket = action.ticket();
        let result = match action {
            BookingAction::Increment(id) => self.increment(id).map(drop),
            BookingAction::Decrement(id) => self.decrement(id).map(drop),
            BookingAction::SetQuantity(id, n) => self.set_quantity(id, n).map(drop),
            BookingAction::TypeQuantity(id, text) => self.type_quantity(id, &text).map(drop),
            BookingAction::ContinueToDetails => self.continue_to_details(),
            BookingAction::Back => self.back(),
            BookingAction::Submit(form) => self.submit(form).await.map(drop),
        };
        Self::log_result(name, ticket, &result);
        result
    }

    pub fn increment(&mut self, id: TicketTypeId) -> Result<u32, BookingError> {
        let result = self.selecting("increment").and_then(|_| {
            let ticket = ticket(&self.catalog, id)?;
            Ok(self.cart.increment(ticket)?)
        });
        self.surface(result)
    }

    pub fn decrement(&mut self, id: TicketTypeId) -> Result<u32, BookingError> {
        let result = self.selecting("decrement").and_then(|_| {
            let ticket = ticket(&self.catalog, id)?;
            Ok(self.cart.decrement(ticket))
        });
        self.surface(result)
    }

    /// Set a quantity directly; values past the caps are clamped silently.
    pub fn set_quantity(&mut self, id: TicketTypeId, quantity: u32) -> Result<u32, BookingError> {
        let result = self.selecting("set quantity").and_then(|_| {
            let ticket = ticket(&self.catalog, id)?;
            Ok(self.cart.set_quantity(ticket, quantity))
        });
        self.surface(result)
    }

    /// Set a quantity from raw field text; non-numeric input counts as 0.
    pub fn type_quantity(&mut self, id: TicketTypeId, text: &str) -> Result<u32, BookingError> {
        self.set_quantity(id, parse_quantity(text))
    }

    /// `Selection -> Details`, refused while the cart is empty.
    pub fn continue_to_details(&mut self) -> Result<(), BookingError> {
        let result = self.selecting("continue").and_then(|_| {
            if self.cart.is_empty() {
                return Err(ValidationError::EmptyCart.into());
            }
            self.step = Step::Details;
            Ok(())
        });
        self.surface(result)
    }

    /// `Details -> Selection`.
    pub fn back(&mut self) -> Result<(), BookingError> {
        let result = self.in_step(Step::Details, "back").map(|_| {
            self.step = Step::Selection;
        });
        self.surface(result)
    }

    /// `Details -> Confirmed`: validate the customer, take the simulated
    /// payment, store the booking and navigate to the confirmation page.
    ///
    /// The countdown does not tick while the payment is pending. If the
    /// window ran out in the meantime the booking is not stored.
    pub async fn submit(&mut self, form: CustomerForm) -> Result<BookingRecord, BookingError> {
        let customer = self
            .in_step(Step::Details, "submit")
            .and_then(|_| form.validate().map_err(BookingError::from));
        let customer = self.surface(customer)?;
        self.customer = Some(customer.clone());

        let totals = pricing::compute_totals(&self.cart, &self.catalog);
        let started = Instant::now();
        let receipt = self.gateway.charge(totals.total).await;
        if started.elapsed().as_secs() >= u64::from(self.timer.remaining()) {
            warn!(reference = %receipt.reference, "reservation expired during payment");
            if self.timer.expire() == Tick::Expired {
                self.announce_expiry();
            }
            return Err(BookingError::Expired);
        }

        let record = BookingRecord {
            reference: receipt.reference,
            customer,
            tickets: self.cart.clone(),
            total: receipt.amount,
            event: self.event.clone(),
        };
        let saved = storage::save_booking(&mut self.store, &record).map_err(BookingError::from);
        self.surface(saved)?;

        self.step = Step::Confirmed;
        self.navigate(Navigation::Confirmation);
        Ok(record)
    }

    /// Advance the reservation countdown by one second. On expiry the error
    /// notice is shown; the caller performs the delayed redirect.
    pub fn tick(&mut self) -> Tick {
        if self.navigation.is_some() {
            return Tick::Idle;
        }
        let tick = self.timer.tick();
        if tick == Tick::Expired {
            self.announce_expiry();
        }
        tick
    }

    /// Leave the page. Only the first navigation takes effect.
    pub fn navigate(&mut self, to: Navigation) {
        if self.navigation.is_none() {
            info!(path = to.path(), "navigating");
            self.navigation = Some(to);
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn event(&self) -> &EventDescriptor {
        &self.event
    }

    pub fn customer(&self) -> Option<&CustomerRecord> {
        self.customer.as_ref()
    }

    pub fn timer(&self) -> &ReservationTimer {
        &self.timer
    }

    pub fn navigation(&self) -> Option<Navigation> {
        self.navigation
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Lines and totals for the order summary panel.
    pub fn order_summary(&self) -> OrderSummary {
        pricing::order_summary(&self.cart, &self.catalog, SERVICE_FEE_BPS)
    }

    /// Remaining stock per fare class, net of the current cart.
    pub fn availability(&self) -> Vec<(TicketTypeId, Availability)> {
        self.catalog
            .types()
            .map(|t| (t.id, Availability::of(t, self.cart.quantity(t.id))))
            .collect()
    }

    pub fn can_continue(&self) -> bool {
        !self.cart.is_empty()
    }

    pub fn continue_label(&self) -> &'static str {
        if self.can_continue() {
            "Continue to Details"
        } else {
            "Select Tickets First"
        }
    }
}

/// Private API
impl<S: SessionStore> BookingFlow<S> {
    /// Small helper to log `apply` results
    fn log_result(action: &str, ticket: Option<TicketTypeId>, result: &Result<(), BookingError>) {
        match (result, ticket) {
            (Ok(()), Some(ticket)) => info!(ticket = %ticket, "{action} applied"),
            (Ok(()), None) => info!("{action} applied"),
            (Err(e), Some(ticket)) => warn!(ticket = %ticket, reason = %e, "{action} skipped"),
            (Err(e), None) => warn!(reason = %e, "{action} skipped"),
        }
    }

    fn announce_expiry(&mut self) {
        warn!(event = %self.event.id, "reservation expired");
        self.notifications
            .show(Level::Error, BookingError::Expired.to_string());
    }

    fn in_step(&self, expected: Step, action: &'static str) -> Result<(), BookingError> {
        if self.timer.is_expired() {
            return Err(BookingError::Expired);
        }
        if self.step != expected {
            return Err(BookingError::WrongStep {
                action,
                step: self.step,
            });
        }
        Ok(())
    }

    fn selecting(&self, action: &'static str) -> Result<(), BookingError> {
        self.in_step(Step::Selection, action)
    }

    /// Turn a user-facing error into a notification, passing the result through.
    fn surface<T>(&mut self, result: Result<T, BookingError>) -> Result<T, BookingError> {
        if let Err(e) = &result {
            let level = match e {
                BookingError::Capacity(_) | BookingError::Validation(ValidationError::EmptyCart) => {
                    Some(Level::Warning)
                }
                BookingError::Validation(_) | BookingError::Storage(_) => Some(Level::Error),
                // expiry was announced by the countdown; the rest are programming slips
                BookingError::Expired | BookingError::WrongStep { .. } | BookingError::UnknownTicket(_) => {
                    None
                }
            };
            if let Some(level) = level {
                self.notifications.show(level, e.to_string());
            }
        }
        result
    }
}

fn ticket(catalog: &Catalog, id: TicketTypeId) -> Result<&TicketType, BookingError> {
    catalog.get(id).ok_or(BookingError::UnknownTicket(id))
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
