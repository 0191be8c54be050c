//! Cart

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    pricing::resolve,
    products::Product,
    totals::{CheckoutRates, Coupon, Totals, totals},
};

/// Caller-supplied options merged over line defaults when preparing a line.
#[derive(Debug, Clone, Default)]
pub struct LineOptions {
    /// Units to order; defaults to 1.
    pub qty: Option<u32>,

    /// Chosen size, when the product is sized.
    pub size: Option<String>,

    /// Flat per-line surcharge (alterations and the like).
    pub surcharge: Option<Decimal>,
}

/// A product line inside an order draft.
///
/// The price is resolved once when the line is prepared and frozen: a
/// later refetch of the product never reprices an existing line. Only the
/// quantity may change after preparation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Id of the product this line was prepared from.
    pub product: String,

    /// Display name snapshot.
    pub name: String,

    /// Display image snapshot.
    pub image: String,

    /// Effective price frozen at preparation time.
    #[serde(default)]
    price: Decimal,

    /// Units ordered.
    #[serde(default)]
    qty: u32,

    /// Stock level snapshot bounding the quantity.
    #[serde(default)]
    pub count_in_stock: u32,

    /// Chosen size, when the product is sized.
    #[serde(default)]
    pub size: Option<String>,

    /// Flat per-line surcharge, added once per line rather than per unit.
    #[serde(default)]
    pub surcharge: Decimal,
}

impl LineItem {
    /// Prepares a cart line from a product, freezing its resolved price.
    #[must_use]
    pub fn prepare(product: &Product, options: LineOptions) -> LineItem {
        let mut line = LineItem {
            product: product.id.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            price: resolve(product).current,
            qty: 1,
            count_in_stock: product.count_in_stock,
            size: options.size,
            surcharge: options.surcharge.unwrap_or(Decimal::ZERO),
        };
        line.qty = line.clamp_qty(options.qty.unwrap_or(1));

        line
    }

    /// The frozen effective price for this line.
    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Units ordered.
    #[must_use]
    pub fn qty(&self) -> u32 {
        self.qty
    }

    /// The price of the whole line: frozen price times quantity plus the
    /// flat surcharge.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty) + self.surcharge
    }

    /// Clamps a requested quantity to `1..=count_in_stock`. A zero stock
    /// snapshot leaves the quantity unbounded above.
    fn clamp_qty(&self, qty: u32) -> u32 {
        if self.count_in_stock == 0 {
            qty.max(1)
        } else {
            qty.clamp(1, self.count_in_stock)
        }
    }

    fn keyed_as(&self, product: &str, size: Option<&str>) -> bool {
        self.product == product && self.size.as_deref() == size
    }
}

/// An order draft's owned line collection with cached totals.
///
/// Every mutation recomputes the totals, so they are always consistent
/// with the line sequence.
#[derive(Debug, Clone)]
pub struct Cart {
    items: Vec<LineItem>,
    coupon: Option<Coupon>,
    rates: CheckoutRates,
    totals: Totals,
}

impl Cart {
    /// Creates an empty cart using the given checkout rates.
    #[must_use]
    pub fn new(rates: CheckoutRates) -> Self {
        Cart {
            items: Vec::new(),
            coupon: None,
            rates,
            totals: totals(&[], None, &rates),
        }
    }

    /// Adds a prepared line. A line for the same product and size already
    /// in the cart gains the new quantity instead of being duplicated.
    pub fn add(&mut self, line: LineItem) {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.keyed_as(&line.product, line.size.as_deref()))
        {
            Some(existing) => {
                let merged = existing.qty.saturating_add(line.qty);
                existing.qty = existing.clamp_qty(merged);
            }
            None => self.items.push(line),
        }

        self.recompute();
    }

    /// Sets the quantity of a line; zero removes the line entirely.
    pub fn set_qty(&mut self, product: &str, size: Option<&str>, qty: u32) {
        if qty == 0 {
            self.items.retain(|line| !line.keyed_as(product, size));
        } else if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.keyed_as(product, size))
        {
            line.qty = line.clamp_qty(qty);
        }

        self.recompute();
    }

    /// Removes a line entirely.
    pub fn remove(&mut self, product: &str, size: Option<&str>) {
        self.set_qty(product, size, 0);
    }

    /// Applies or clears the cart-wide coupon.
    pub fn set_coupon(&mut self, coupon: Option<Coupon>) {
        self.coupon = coupon;
        self.recompute();
    }

    /// The current derived totals.
    #[must_use]
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Iterates the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the cart, returning its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    fn recompute(&mut self) {
        self.totals = totals(&self.items, self.coupon, &self.rates);
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new(CheckoutRates::default())
    }
}
