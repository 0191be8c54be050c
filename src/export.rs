//! Export

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{
    orders::{Order, OrderStatus},
    pricing::resolve,
    products::Product,
};

/// One flat row of the order export.
///
/// Fields are raw values; string formatting is the caller's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    /// Order id.
    pub id: String,

    /// Customer name, empty when the account is gone.
    pub customer: String,

    /// Customer email, empty when the account is gone.
    pub email: String,

    /// Creation instant.
    pub created_at: Option<Timestamp>,

    /// Grand total.
    pub total: Decimal,

    /// Whether payment has been received.
    pub paid: bool,

    /// Payment instant.
    pub paid_at: Option<Timestamp>,

    /// Whether the order was delivered.
    pub delivered: bool,

    /// Delivery instant.
    pub delivered_at: Option<Timestamp>,

    /// Classified lifecycle state.
    pub status: OrderStatus,
}

/// Flattens orders into export rows, one per order, collection order kept.
#[must_use]
pub fn order_rows(orders: &[&Order]) -> Vec<OrderRow> {
    orders
        .iter()
        .map(|order| OrderRow {
            id: order.id.clone(),
            customer: order.customer_name().to_owned(),
            email: order
                .user
                .as_ref()
                .map_or_else(String::new, |user| user.email.clone()),
            created_at: order.created_at,
            total: order.total_price,
            paid: order.is_paid,
            paid_at: order.paid_at,
            delivered: order.is_delivered,
            delivered_at: order.delivered_at,
            status: order.status(),
        })
        .collect()
}

/// One flat row of the product export, with resolved pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    /// Product id.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Brand.
    pub brand: String,

    /// Category.
    pub category: String,

    /// Effective selling price.
    pub price: Decimal,

    /// Pre-discount reference price.
    pub original_price: Decimal,

    /// Whether the product is flagged on sale.
    pub on_sale: bool,

    /// Whole-number discount percentage.
    pub discount_percent: u32,

    /// Units in stock.
    pub count_in_stock: u32,
}

/// Flattens products into export rows, collection order kept.
#[must_use]
pub fn product_rows(products: &[&Product]) -> Vec<ProductRow> {
    products
        .iter()
        .map(|product| {
            let resolved = resolve(product);

            ProductRow {
                id: product.id.clone(),
                name: product.name.clone(),
                brand: product.brand.clone(),
                category: product.category.clone(),
                price: resolved.current,
                original_price: resolved.original,
                on_sale: resolved.on_sale,
                discount_percent: resolved.discount_percent,
                count_in_stock: product.count_in_stock,
            }
        })
        .collect()
}
