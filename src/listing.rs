//! Events listing: category tabs, location and date selectors, free-text search.

use chrono::{Duration, Months, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::model::EventDescriptor;

/// Selector value meaning "no restriction".
const ANY: &str = "all";

/// An event card on the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEvent {
    pub event: EventDescriptor,
    pub category: String,
    /// Location key used by the location selector, e.g. `new-york`.
    pub location: String,
    pub description: String,
}

/// Date selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateWindow {
    #[default]
    All,
    Today,
    /// From now up to seven days ahead.
    Week,
    /// From now up to midnight on the same day next month.
    Month,
}

impl DateWindow {
    /// Unknown selector values apply no date restriction.
    pub fn parse(value: &str) -> Self {
        match value {
            "today" => DateWindow::Today,
            "week" => DateWindow::Week,
            "month" => DateWindow::Month,
            _ => DateWindow::All,
        }
    }

    fn contains(self, start: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self {
            DateWindow::All => true,
            DateWindow::Today => start.date() == now.date(),
            DateWindow::Week => start >= now && start <= now + Duration::days(7),
            DateWindow::Month => {
                let end = now
                    .date()
                    .checked_add_months(Months::new(1))
                    .map(|day| day.and_time(NaiveTime::MIN));
                start >= now && end.is_some_and(|end| start <= end)
            }
        }
    }
}

/// Every selector of the listing page combined; a card shows only when all agree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    category: Option<String>,
    location: Option<String>,
    window: DateWindow,
    search: String,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Category tab, `all` clears it.
    pub fn category(mut self, value: &str) -> Self {
        self.category = restriction(value);
        self
    }

    /// Location selector, `all` clears it.
    pub fn location(mut self, value: &str) -> Self {
        self.location = restriction(value);
        self
    }

    pub fn window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    /// Search box text, matched case-insensitively against title and description.
    pub fn search(mut self, text: &str) -> Self {
        self.search = text.to_lowercase();
        self
    }

    pub fn matches(&self, listed: &ListedEvent, now: NaiveDateTime) -> bool {
        if self.category.as_ref().is_some_and(|c| *c != listed.category) {
            return false;
        }
        if self.location.as_ref().is_some_and(|l| *l != listed.location) {
            return false;
        }
        if self.window != DateWindow::All {
            match listed.event.starts_at() {
                Ok(start) if self.window.contains(start, now) => {}
                Ok(_) => return false,
                Err(e) => {
                    debug!(event = %listed.event.id, error = %e, "unreadable event date, hidden by date filter");
                    return false;
                }
            }
        }
        self.search.is_empty()
            || listed.event.title.to_lowercase().contains(&self.search)
            || listed.description.to_lowercase().contains(&self.search)
    }

    /// Cards left visible, in listing order.
    pub fn apply<'e>(
        &self,
        events: &'e [ListedEvent],
        now: NaiveDateTime,
    ) -> impl Iterator<Item = &'e ListedEvent> {
        events.iter().filter(move |listed| self.matches(listed, now))
    }
}

fn restriction(value: &str) -> Option<String> {
    (value != ANY).then(|| value.to_string())
}
