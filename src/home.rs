//! Home page widgets: the featured-events slider, the event countdown and
//! the newsletter prompt.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::time::{self, Instant};
use tracing::info;

use crate::model::is_valid_email;
use crate::storage::SessionStore;

pub const SLIDE_ANIMATION: Duration = Duration::from_millis(500);
pub const AUTO_ADVANCE: Duration = Duration::from_secs(8);
pub const SWIPE_THRESHOLD: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Carousel position with the transition lock.
///
/// Moves are refused while a transition is running, except a jump to the
/// slide already showing.
#[derive(Debug, Clone)]
pub struct Slider {
    len: usize,
    current: usize,
    animating_until: Option<Instant>,
}

impl Slider {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            current: 0,
            animating_until: None,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Horizontal offset of the slide strip, in percent of one slide.
    pub fn offset_percent(&self) -> usize {
        self.current * 100
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.animating_until.is_some_and(|until| now < until)
    }

    /// Step one slide, wrapping at both ends. Returns whether the slider moved.
    pub fn change(&mut self, direction: Direction, now: Instant) -> bool {
        if self.is_empty() || self.is_animating(now) {
            return false;
        }
        self.current = match direction {
            Direction::Next => (self.current + 1) % self.len,
            Direction::Previous => (self.current + self.len - 1) % self.len,
        };
        self.animating_until = Some(now + SLIDE_ANIMATION);
        true
    }

    pub fn go_to(&mut self, index: usize, now: Instant) -> bool {
        if index >= self.len || (self.is_animating(now) && index != self.current) {
            return false;
        }
        self.current = index;
        self.animating_until = Some(now + SLIDE_ANIMATION);
        true
    }

    /// Touch gesture from `start_x` to `end_x`. Swiping left shows the next slide.
    pub fn swipe(&mut self, start_x: f32, end_x: f32, now: Instant) -> bool {
        let diff = start_x - end_x;
        if diff.abs() <= SWIPE_THRESHOLD {
            return false;
        }
        let direction = if diff > 0.0 {
            Direction::Next
        } else {
            Direction::Previous
        };
        self.change(direction, now)
    }

    /// Periodic advance; skipped while a transition is running.
    pub fn auto_advance(&mut self, now: Instant) -> bool {
        self.change(Direction::Next, now)
    }
}

/// Time left until an event starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Remaining {
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
    },
    Started,
}

impl Countdown {
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let left = (target - now).num_seconds();
        if left <= 0 {
            return Countdown::Started;
        }
        Countdown::Remaining {
            days: left / 86_400,
            hours: left % 86_400 / 3_600,
            minutes: left % 3_600 / 60,
            seconds: left % 60,
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Remaining {
                days,
                hours,
                minutes,
                seconds,
            } => write!(f, "{days:02}:{hours:02}:{minutes:02}:{seconds:02}"),
            Countdown::Started => f.write_str("Event Started!"),
        }
    }
}

/// Remembers that the visitor has seen the newsletter prompt.
pub const NEWSLETTER_KEY: &str = "newsletterShown";
pub const NEWSLETTER_DELAY: Duration = Duration::from_secs(10);
/// How long the thank-you message stays before the prompt closes.
pub const NEWSLETTER_CLOSE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NewsletterError {
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptState {
    #[default]
    Hidden,
    Showing,
    /// Thank-you message up, closing shortly.
    Subscribed,
}

/// Newsletter prompt, shown once per visitor.
#[derive(Debug, Default)]
pub struct NewsletterPrompt {
    state: PromptState,
}

impl NewsletterPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PromptState {
        self.state
    }

    /// Wait `delay`, then show the prompt unless it was already seen.
    pub async fn show_after(&mut self, store: &impl SessionStore, delay: Duration) -> bool {
        time::sleep(delay).await;
        if store.get(NEWSLETTER_KEY).is_some() {
            return false;
        }
        self.state = PromptState::Showing;
        true
    }

    /// Close button or a click outside the prompt.
    pub fn close(&mut self, store: &mut impl SessionStore) {
        self.state = PromptState::Hidden;
        store.set(NEWSLETTER_KEY, "true".to_string());
    }

    /// Sign up, show the thank-you message and close after `delay`.
    pub async fn subscribe(
        &mut self,
        store: &mut impl SessionStore,
        email: &str,
        delay: Duration,
    ) -> Result<(), NewsletterError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(NewsletterError::InvalidEmail);
        }
        info!(email, "newsletter signup");
        self.state = PromptState::Subscribed;
        time::sleep(delay).await;
        self.close(store);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    #[test]
    fn change_wraps_both_ways() {
        let mut slider = Slider::new(3);
        let t = Instant::now();
        assert!(slider.change(Direction::Previous, t));
        assert_eq!(slider.current(), 2);
        assert!(slider.change(Direction::Next, t + SLIDE_ANIMATION));
        assert_eq!(slider.current(), 0);
        assert_eq!(slider.offset_percent(), 0);
    }

    #[test]
    fn locked_while_animating() {
        let mut slider = Slider::new(3);
        let t = Instant::now();
        assert!(slider.change(Direction::Next, t));
        assert!(!slider.change(Direction::Next, t + Duration::from_millis(499)));
        assert!(!slider.go_to(2, t + Duration::from_millis(100)));
        assert!(slider.go_to(1, t + Duration::from_millis(100)));
        assert_eq!(slider.current(), 1);
    }

    #[test]
    fn go_to_rejects_out_of_range() {
        let mut slider = Slider::new(2);
        assert!(!slider.go_to(2, Instant::now()));
        assert_eq!(slider.current(), 0);
    }

    #[test]
    fn swipe_needs_threshold() {
        let mut slider = Slider::new(4);
        let t = Instant::now();
        assert!(!slider.swipe(200.0, 160.0, t));
        assert!(slider.swipe(200.0, 100.0, t));
        assert_eq!(slider.current(), 1);
        assert!(slider.swipe(100.0, 200.0, t + SLIDE_ANIMATION));
        assert_eq!(slider.current(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_advance_skips_running_transition() {
        let mut slider = Slider::new(3);
        assert!(slider.go_to(2, Instant::now()));
        assert!(!slider.auto_advance(Instant::now()));

        let mut ticker = tokio::time::interval_at(Instant::now() + AUTO_ADVANCE, AUTO_ADVANCE);
        ticker.tick().await;
        assert!(slider.auto_advance(Instant::now()));
        assert_eq!(slider.current(), 0);
    }

    #[test]
    fn empty_slider_never_moves() {
        let mut slider = Slider::new(0);
        assert!(!slider.change(Direction::Next, Instant::now()));
        assert!(!slider.auto_advance(Instant::now()));
    }

    #[test]
    fn countdown_splits_and_pads() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let target = Utc.with_ymd_and_hms(2025, 3, 15, 20, 5, 9).unwrap();
        let countdown = Countdown::until(target, now);
        assert_eq!(
            countdown,
            Countdown::Remaining {
                days: 5,
                hours: 8,
                minutes: 5,
                seconds: 9
            }
        );
        assert_eq!(countdown.to_string(), "05:08:05:09");
    }

    #[test]
    fn countdown_started() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 20, 0, 0).unwrap();
        assert_eq!(Countdown::until(now, now), Countdown::Started);
        assert_eq!(Countdown::until(now, now).to_string(), "Event Started!");
    }

    #[tokio::test(start_paused = true)]
    async fn newsletter_shows_once_per_visitor() {
        let mut store = MemoryStore::new();
        let mut prompt = NewsletterPrompt::new();

        let start = Instant::now();
        assert!(prompt.show_after(&store, NEWSLETTER_DELAY).await);
        assert_eq!(Instant::now() - start, Duration::from_secs(10));
        assert_eq!(prompt.state(), PromptState::Showing);

        prompt.close(&mut store);
        assert_eq!(prompt.state(), PromptState::Hidden);
        assert_eq!(store.get(NEWSLETTER_KEY).as_deref(), Some("true"));

        let mut next_visit = NewsletterPrompt::new();
        assert!(!next_visit.show_after(&store, NEWSLETTER_DELAY).await);
        assert_eq!(next_visit.state(), PromptState::Hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn newsletter_subscribe_thanks_then_closes() {
        let mut store = MemoryStore::new();
        let mut prompt = NewsletterPrompt::new();
        prompt.show_after(&store, Duration::ZERO).await;

        assert_eq!(
            prompt.subscribe(&mut store, "nope", NEWSLETTER_CLOSE_DELAY).await,
            Err(NewsletterError::InvalidEmail)
        );
        assert_eq!(prompt.state(), PromptState::Showing);
        assert!(store.get(NEWSLETTER_KEY).is_none());

        let start = Instant::now();
        prompt
            .subscribe(&mut store, " fan@example.com ", NEWSLETTER_CLOSE_DELAY)
            .await
            .unwrap();
        assert_eq!(Instant::now() - start, Duration::from_secs(2));
        assert_eq!(prompt.state(), PromptState::Hidden);
        assert_eq!(store.get(NEWSLETTER_KEY).as_deref(), Some("true"));
    }
}
