//! Runtime configuration.
//!
//! Every knob has a default matching the live site and can be overridden
//! through an `EVENTPULSE_*` environment variable (a `.env` file is read by
//! the binary before this runs).

use std::env;
use std::time::Duration;

use crate::notify::NOTIFICATION_LIFETIME;
use crate::payment::PAYMENT_DELAY;
use crate::timer::RESERVATION_SECONDS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Reservation window in seconds.
    pub reservation_seconds: u32,
    /// Simulated payment gateway latency.
    pub payment_delay: Duration,
    /// Pause between the expiry notice and the forced redirect.
    pub expiry_redirect_delay: Duration,
    /// How long a notification stays up unless dismissed.
    pub notification_lifetime: Duration,
    /// Delay before the chat bot answers.
    pub chat_reply_delay: Duration,
    /// Delay of the simulated contact form submission.
    pub contact_submit_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reservation_seconds: RESERVATION_SECONDS,
            payment_delay: PAYMENT_DELAY,
            expiry_redirect_delay: Duration::from_secs(3),
            notification_lifetime: NOTIFICATION_LIFETIME,
            chat_reply_delay: Duration::from_secs(1),
            contact_submit_delay: Duration::from_secs(2),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parse = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());
        let millis = |key: &str, default: Duration| parse(key).map(Duration::from_millis).unwrap_or(default);

        Self {
            reservation_seconds: parse("EVENTPULSE_RESERVATION_SECONDS")
                .and_then(|s| u32::try_from(s).ok())
                .filter(|s| *s > 0)
                .unwrap_or(defaults.reservation_seconds),
            payment_delay: millis("EVENTPULSE_PAYMENT_DELAY_MS", defaults.payment_delay),
            expiry_redirect_delay: millis(
                "EVENTPULSE_EXPIRY_REDIRECT_DELAY_MS",
                defaults.expiry_redirect_delay,
            ),
            notification_lifetime: millis(
                "EVENTPULSE_NOTIFICATION_LIFETIME_MS",
                defaults.notification_lifetime,
            ),
            chat_reply_delay: millis("EVENTPULSE_CHAT_REPLY_DELAY_MS", defaults.chat_reply_delay),
            contact_submit_delay: millis(
                "EVENTPULSE_CONTACT_SUBMIT_DELAY_MS",
                defaults.contact_submit_delay,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_site_behaviour() {
        let config = Config::default();
        assert_eq!(config.reservation_seconds, 900);
        assert_eq!(config.payment_delay, Duration::from_secs(3));
        assert_eq!(config.notification_lifetime, Duration::from_secs(5));
        assert_eq!(config.chat_reply_delay, Duration::from_secs(1));
        assert_eq!(config.contact_submit_delay, Duration::from_secs(2));
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("EVENTPULSE_PAYMENT_DELAY_MS", "0"),
            ("EVENTPULSE_RESERVATION_SECONDS", "60"),
            ("EVENTPULSE_CHAT_REPLY_DELAY_MS", "250"),
        ]));
        assert_eq!(config.payment_delay, Duration::ZERO);
        assert_eq!(config.reservation_seconds, 60);
        assert_eq!(config.expiry_redirect_delay, Duration::from_secs(3));
        assert_eq!(config.chat_reply_delay, Duration::from_millis(250));
    }

    #[test]
    fn service_fee_is_not_configurable() {
        let config = Config::from_lookup(lookup(&[("EVENTPULSE_SERVICE_FEE_BPS", "1000")]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn bad_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("EVENTPULSE_PAYMENT_DELAY_MS", "soon"),
            ("EVENTPULSE_RESERVATION_SECONDS", "0"),
        ]));
        assert_eq!(config, Config::default());
    }
}
