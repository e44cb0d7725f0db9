/// Position in the booking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    Selection,
    Details,
    /// Terminal: the booking is stored and the page has moved on.
    Confirmed,
}

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Step::Selection => 1,
            Step::Details => 2,
            Step::Confirmed => 3,
        }
    }

    pub fn progress_label(self) -> String {
        format!("Step {} of 3", self.number())
    }
}

/// Full-page navigations the flow can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Confirmation,
    EventListing,
}

impl Navigation {
    pub fn path(self) -> &'static str {
        match self {
            Navigation::Confirmation => "confirmation.html",
            Navigation::EventListing => "events.html",
        }
    }
}
