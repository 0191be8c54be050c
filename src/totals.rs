//! Order totals

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::cart::LineItem;

/// Checkout configuration: free-shipping threshold, flat shipping rate and
/// tax rate.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutRates {
    /// Orders whose items subtotal exceeds this ship free.
    pub free_shipping_over: Decimal,

    /// Flat shipping rate at or below the threshold.
    pub flat_shipping: Decimal,

    /// Sales tax rate applied to the items subtotal.
    pub tax_rate: Percentage,
}

impl Default for CheckoutRates {
    fn default() -> Self {
        CheckoutRates {
            free_shipping_over: Decimal::ONE_HUNDRED,
            flat_shipping: Decimal::TEN,
            tax_rate: Percentage::from(0.15),
        }
    }
}

/// A discount code applied to a whole cart.
#[derive(Debug, Clone, Copy)]
pub enum Coupon {
    /// Percentage off the items subtotal.
    PercentOff(Percentage),

    /// Fixed amount off the items subtotal, clamped so the subtotal never
    /// goes negative.
    AmountOff(Decimal),
}

impl Coupon {
    /// The amount this coupon takes off an items subtotal.
    fn amount_off(self, items_price: Decimal) -> Decimal {
        match self {
            Coupon::PercentOff(rate) => rate * items_price,
            Coupon::AmountOff(amount) => amount.min(items_price),
        }
    }
}

/// The derived monetary fields of an order, all rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    /// Sum of line totals before any coupon.
    pub items_price: Decimal,

    /// Coupon discount taken off the items subtotal.
    pub discount_amount: Decimal,

    /// Shipping cost: zero above the free-shipping threshold, the flat
    /// rate otherwise.
    pub shipping_price: Decimal,

    /// Sales tax on the discounted items subtotal.
    pub tax_price: Decimal,

    /// Grand total: discounted items plus shipping plus tax.
    pub total_price: Decimal,
}

/// Rounds a monetary amount to two decimal places, midpoints away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Recomputes an order's monetary totals from its line items.
///
/// Shipping and tax are computed on the coupon-discounted subtotal; with
/// no coupon, `total_price == items_price + shipping_price + tax_price`.
#[must_use]
pub fn totals(items: &[LineItem], coupon: Option<Coupon>, rates: &CheckoutRates) -> Totals {
    let items_price = round_money(items.iter().map(LineItem::line_total).sum());

    let discount_amount = round_money(
        coupon.map_or(Decimal::ZERO, |coupon| coupon.amount_off(items_price)),
    );
    let discounted = items_price - discount_amount;

    let shipping_price = if discounted > rates.free_shipping_over {
        Decimal::ZERO
    } else {
        rates.flat_shipping
    };

    let tax_price = round_money(rates.tax_rate * discounted);

    Totals {
        items_price,
        discount_amount,
        shipping_price,
        tax_price,
        total_price: round_money(discounted + shipping_price + tax_price),
    }
}
