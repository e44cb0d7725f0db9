//! Simulated payment gateway.
//!
//! No money moves: the gateway waits for its configured latency and then
//! approves the charge with a fresh booking reference.

use std::time::Duration;

use tokio::time;
use tracing::info;

use crate::Amount;
use crate::reference::{BookingReference, ReferenceGenerator};

/// Latency of the simulated gateway.
pub const PAYMENT_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub reference: BookingReference,
    pub amount: Amount,
}

#[derive(Debug)]
pub struct SimulatedGateway {
    delay: Duration,
    references: ReferenceGenerator,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            references: ReferenceGenerator::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Charge `amount`. Always succeeds once the delay has elapsed; there is
    /// no way to cancel a charge that has started.
    pub async fn charge(&mut self, amount: Amount) -> PaymentReceipt {
        info!(%amount, delay_ms = self.delay.as_millis() as u64, "processing payment");
        time::sleep(self.delay).await;
        let reference = self.references.next_reference();
        info!(%reference, %amount, "payment approved");
        PaymentReceipt { reference, amount }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(PAYMENT_DELAY)
    }
}
