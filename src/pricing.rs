//! Price resolution

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::products::{Pricing, Product};

/// The effective price of a product and its derived discount metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPrice {
    /// What the customer pays now.
    pub current: Decimal,

    /// The pre-discount reference price. Equal to `current` when there is
    /// no discount.
    pub original: Decimal,

    /// Whether the product is flagged as on sale.
    pub on_sale: bool,

    /// Whole-number percentage saved, 0 when nothing is saved.
    pub discount_percent: u32,

    /// Absolute amount saved against the reference price, never negative.
    pub savings: Decimal,
}

/// Resolves the single effective selling price of a product.
///
/// Never fails: absent numeric fields decode as zero and a zero reference
/// price simply yields a zero discount.
#[must_use]
pub fn resolve(product: &Product) -> ResolvedPrice {
    match product.pricing() {
        Pricing::Regular { price } => ResolvedPrice {
            current: price,
            original: price,
            on_sale: false,
            discount_percent: 0,
            savings: Decimal::ZERO,
        },
        Pricing::Sale {
            current, original, ..
        } => ResolvedPrice {
            current,
            original,
            on_sale: true,
            discount_percent: discount_percent(original, current),
            savings: (original - current).max(Decimal::ZERO),
        },
    }
}

/// Whether a product should appear in sale listings at `now`.
///
/// The on-sale flag alone is not trusted: the resolved discount must be
/// strictly positive and `now` must fall inside the sale window.
#[must_use]
pub fn on_active_sale(product: &Product, now: Timestamp) -> bool {
    match product.pricing() {
        Pricing::Regular { .. } => false,
        Pricing::Sale { window, .. } => {
            resolve(product).savings > Decimal::ZERO && window.contains(now)
        }
    }
}

/// Filters a product collection down to the ones actually on sale at `now`,
/// keeping collection order.
#[must_use]
pub fn active_sales(products: &[Product], now: Timestamp) -> Vec<&Product> {
    products
        .iter()
        .filter(|product| on_active_sale(product, now))
        .collect()
}

/// Whole-number percentage saved against `original`, 0 when nothing is
/// saved or when `original` is zero.
///
/// Midpoints round down: a 37.5% saving reads as 37%.
fn discount_percent(original: Decimal, current: Decimal) -> u32 {
    if original <= current || original.is_zero() {
        return 0;
    }

    ((original - current) / original * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointTowardZero)
        .to_u32()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;

    fn sale_product(
        price: Decimal,
        sale_price: Option<Decimal>,
        regular_price: Option<Decimal>,
    ) -> Product {
        Product {
            price,
            sale_price,
            regular_price,
            is_on_sale: true,
            ..Product::default()
        }
    }

    #[test]
    fn regular_product_has_no_discount() {
        let product = Product {
            price: dec!(50),
            ..Product::default()
        };

        let resolved = resolve(&product);

        assert_eq!(resolved.current, dec!(50));
        assert_eq!(resolved.original, dec!(50));
        assert!(!resolved.on_sale);
        assert_eq!(resolved.discount_percent, 0);
        assert_eq!(resolved.savings, Decimal::ZERO);
    }

    #[test]
    fn sale_product_resolves_all_metrics() {
        let product = sale_product(dec!(100), Some(dec!(75)), Some(dec!(120)));

        let resolved = resolve(&product);

        assert_eq!(resolved.current, dec!(75));
        assert_eq!(resolved.original, dec!(120));
        assert!(resolved.on_sale);
        assert_eq!(resolved.discount_percent, 37);
        assert_eq!(resolved.savings, dec!(45));
    }

    #[test]
    fn sale_without_regular_price_collapses_original() {
        let product = sale_product(dec!(80), Some(dec!(60)), None);

        let resolved = resolve(&product);

        assert_eq!(resolved.current, dec!(60));
        assert_eq!(resolved.original, dec!(80));
        assert_eq!(resolved.discount_percent, 25);
        assert_eq!(resolved.savings, dec!(20));
    }

    #[test]
    fn sale_without_sale_price_discounts_against_regular() {
        let product = sale_product(dec!(90), None, Some(dec!(120)));

        let resolved = resolve(&product);

        assert_eq!(resolved.current, dec!(90));
        assert_eq!(resolved.original, dec!(120));
        assert_eq!(resolved.discount_percent, 25);
        assert_eq!(resolved.savings, dec!(30));
    }

    #[test]
    fn inverted_prices_clamp_to_zero_discount() {
        let product = sale_product(dec!(100), Some(dec!(150)), Some(dec!(120)));

        let resolved = resolve(&product);

        assert_eq!(resolved.discount_percent, 0);
        assert_eq!(resolved.savings, Decimal::ZERO);
    }

    #[test]
    fn zero_sale_price_sells_at_quoted_price() {
        let product = sale_product(dec!(100), Some(Decimal::ZERO), None);

        let resolved = resolve(&product);

        assert_eq!(resolved.current, dec!(100));
        assert_eq!(resolved.discount_percent, 0);
        assert_eq!(resolved.savings, Decimal::ZERO);
    }

    #[test]
    fn zero_original_price_yields_zero_discount() {
        let product = sale_product(Decimal::ZERO, None, Some(Decimal::ZERO));

        let resolved = resolve(&product);

        assert_eq!(resolved.discount_percent, 0);
        assert_eq!(resolved.savings, Decimal::ZERO);
    }

    #[test]
    fn active_sale_requires_flag_discount_and_window() -> TestResult {
        let now: Timestamp = "2026-06-15T12:00:00Z".parse()?;

        let mut product = sale_product(dec!(100), Some(dec!(75)), Some(dec!(120)));
        product.sale_start_date = Some("2026-06-01T00:00:00Z".parse()?);
        product.sale_end_date = Some("2026-06-30T00:00:00Z".parse()?);

        assert!(on_active_sale(&product, now));

        let flag_off = Product {
            is_on_sale: false,
            ..product.clone()
        };
        assert!(!on_active_sale(&flag_off, now));

        let no_discount = sale_product(dec!(100), Some(dec!(100)), None);
        assert!(!on_active_sale(&no_discount, now));

        let expired = Product {
            sale_end_date: Some("2026-06-10T00:00:00Z".parse()?),
            ..product.clone()
        };
        assert!(!on_active_sale(&expired, now));

        Ok(())
    }

    #[test]
    fn active_sales_keeps_collection_order() -> TestResult {
        let now: Timestamp = "2026-06-15T12:00:00Z".parse()?;
        let products = vec![
            Product {
                id: "a".to_owned(),
                ..sale_product(dec!(100), Some(dec!(80)), None)
            },
            Product {
                id: "b".to_owned(),
                price: dec!(50),
                ..Product::default()
            },
            Product {
                id: "c".to_owned(),
                ..sale_product(dec!(200), None, Some(dec!(250)))
            },
        ];

        let on_sale: Vec<&str> = active_sales(&products, now)
            .into_iter()
            .map(|product| product.id.as_str())
            .collect();

        assert_eq!(on_sale, vec!["a", "c"]);

        Ok(())
    }
}
