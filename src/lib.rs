//! Haberdash
//!
//! Haberdash is the pricing and order computation core of a retail
//! storefront: it resolves a product's effective price from competing
//! price fields, freezes that price into cart lines, aggregates order
//! totals, classifies orders through a small lifecycle, and produces
//! deterministic filtered/sorted/paged views of product and order
//! collections.

pub mod cart;
pub mod export;
pub mod listing;
pub mod orders;
pub mod pricing;
pub mod products;
pub mod totals;
