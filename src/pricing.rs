//! Order totals: subtotal, service fee and grand total.

use tracing::warn;

use crate::Amount;
use crate::booking::Cart;
use crate::catalog::Catalog;
use crate::model::TicketTypeId;

/// Service fee rate in basis points (5%).
pub const SERVICE_FEE_BPS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub subtotal: Amount,
    pub fee: Amount,
    pub total: Amount,
}

impl Totals {
    pub fn from_subtotal(subtotal: Amount, fee_bps: u32) -> Self {
        let fee = subtotal.basis_points(fee_bps);
        Self {
            subtotal,
            fee,
            total: subtotal + fee,
        }
    }
}

/// One fare class in an order summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub id: TicketTypeId,
    pub name: &'static str,
    pub quantity: u32,
    pub unit_price: Amount,
    pub line_total: Amount,
}

/// Lines plus totals, as shown next to the ticket selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderSummary {
    pub items: Vec<LineItem>,
    pub totals: Totals,
}

impl OrderSummary {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Price every entry. Entries missing from the catalog are skipped.
pub fn line_items(
    entries: impl IntoIterator<Item = (TicketTypeId, u32)>,
    catalog: &Catalog,
) -> Vec<LineItem> {
    entries
        .into_iter()
        .filter(|(_, quantity)| *quantity > 0)
        .filter_map(|(id, quantity)| {
            let Some(ticket) = catalog.get(id) else {
                warn!(ticket = %id, "ticket type not in catalog, skipped");
                return None;
            };
            Some(LineItem {
                id,
                name: ticket.name,
                quantity,
                unit_price: ticket.price,
                line_total: ticket.price.times(quantity),
            })
        })
        .collect()
}

/// Totals over arbitrary `(ticket, quantity)` entries, in any order.
pub fn totals_for(
    entries: impl IntoIterator<Item = (TicketTypeId, u32)>,
    catalog: &Catalog,
    fee_bps: u32,
) -> Totals {
    let subtotal = line_items(entries, catalog)
        .iter()
        .map(|item| item.line_total)
        .sum();
    Totals::from_subtotal(subtotal, fee_bps)
}

/// Totals for a cart at the standard 5% service fee.
pub fn compute_totals(cart: &Cart, catalog: &Catalog) -> Totals {
    totals_for(cart.iter(), catalog, SERVICE_FEE_BPS)
}

pub fn order_summary(cart: &Cart, catalog: &Catalog, fee_bps: u32) -> OrderSummary {
    let items = line_items(cart.iter(), catalog);
    let subtotal = items.iter().map(|item| item.line_total).sum();
    OrderSummary {
        items,
        totals: Totals::from_subtotal(subtotal, fee_bps),
    }
}
