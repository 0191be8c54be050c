//! Products

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::{
    listing::{Listable, SortValue},
    pricing::resolve,
};

/// A size offered for a product.
///
/// The remote service stores sizes either as a bare label or as a label
/// with its own stock quantity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Size {
    /// A plain size label with no per-size stock tracking.
    Label(String),

    /// A size label with a per-size stock quantity.
    Stocked {
        /// Size label.
        size: String,

        /// Units in stock for this size.
        #[serde(default)]
        quantity: u32,
    },
}

impl Size {
    /// Returns the size label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Size::Label(label) => label,
            Size::Stocked { size, .. } => size,
        }
    }

    /// Returns the per-size stock quantity, if tracked.
    #[must_use]
    pub fn quantity(&self) -> Option<u32> {
        match self {
            Size::Label(_) => None,
            Size::Stocked { quantity, .. } => Some(*quantity),
        }
    }
}

/// The validity window of a sale. An absent bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaleWindow {
    /// Instant the sale starts.
    pub start: Option<Timestamp>,

    /// Instant the sale ends.
    pub end: Option<Timestamp>,
}

impl SaleWindow {
    /// Whether `now` falls inside the window (bounds inclusive).
    #[must_use]
    pub fn contains(&self, now: Timestamp) -> bool {
        self.start.is_none_or(|start| start <= now) && self.end.is_none_or(|end| now <= end)
    }
}

/// How a product is currently priced.
///
/// The remote service exposes three overlapping price fields; this
/// projection decides which field wins so callers never interpret the
/// raw record themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pricing {
    /// Not on sale: a single quoted price.
    Regular {
        /// Quoted selling price.
        price: Decimal,
    },

    /// On sale: a discounted price against a pre-sale reference.
    Sale {
        /// Discounted selling price.
        current: Decimal,

        /// Pre-sale reference price. Collapses to the quoted price when
        /// the record carries no explicit regular price.
        original: Decimal,

        /// Validity window of the sale.
        window: SaleWindow,
    },
}

/// A product record as returned by the remote product service.
///
/// All numeric fields default to zero when absent; pricing is interpreted
/// through [`Product::pricing`] rather than read field-by-field.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    /// Service-assigned id.
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name.
    pub name: String,

    /// Primary image path.
    pub image: String,

    /// Brand.
    pub brand: String,

    /// Category.
    pub category: String,

    /// Current quoted price.
    pub price: Decimal,

    /// Pre-discount reference price, when one exists.
    pub regular_price: Option<Decimal>,

    /// Discounted price, set only while on sale.
    pub sale_price: Option<Decimal>,

    /// Authoritative on-sale flag; a missing sale price does not by
    /// itself mean "not on sale".
    pub is_on_sale: bool,

    /// When the sale starts.
    pub sale_start_date: Option<Timestamp>,

    /// When the sale ends.
    pub sale_end_date: Option<Timestamp>,

    /// Units in stock.
    pub count_in_stock: u32,

    /// Sizes offered, in display order.
    pub sizes: Vec<Size>,

    /// When the record was created.
    pub created_at: Option<Timestamp>,
}

impl Product {
    /// Projects the competing price fields into a single [`Pricing`].
    ///
    /// A zero sale or regular price counts as absent and falls back to
    /// the quoted price.
    #[must_use]
    pub fn pricing(&self) -> Pricing {
        if self.is_on_sale {
            Pricing::Sale {
                current: nonzero(self.sale_price).unwrap_or(self.price),
                original: nonzero(self.regular_price).unwrap_or(self.price),
                window: SaleWindow {
                    start: self.sale_start_date,
                    end: self.sale_end_date,
                },
            }
        } else {
            Pricing::Regular { price: self.price }
        }
    }
}

/// Drops a zero price, leaving only usable overrides.
fn nonzero(price: Option<Decimal>) -> Option<Decimal> {
    price.filter(|price| !price.is_zero())
}

/// Facets a product listing can be narrowed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    /// Only products in the given category (case-insensitive).
    Category(String),

    /// Only products of the given brand (case-insensitive).
    Brand(String),
}

/// Sortable columns of a product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortKey {
    /// Display name.
    Name,

    /// Effective selling price.
    Price,

    /// Whole-number discount percentage.
    Discount,

    /// Creation instant.
    CreatedAt,
}

impl Listable for Product {
    type Filter = ProductFilter;
    type SortKey = ProductSortKey;

    fn matches(&self, filter: &ProductFilter) -> bool {
        match filter {
            ProductFilter::Category(category) => self.category.eq_ignore_ascii_case(category),
            ProductFilter::Brand(brand) => self.brand.eq_ignore_ascii_case(brand),
        }
    }

    fn created(&self) -> Option<Timestamp> {
        self.created_at
    }

    fn search_text(&self) -> SmallVec<[String; 3]> {
        smallvec![self.name.clone(), self.brand.clone(), self.category.clone()]
    }

    fn sort_value(&self, key: ProductSortKey) -> SortValue {
        match key {
            ProductSortKey::Name => SortValue::Text(self.name.clone()),
            ProductSortKey::Price => SortValue::Number(resolve(self).current),
            ProductSortKey::Discount => {
                SortValue::Number(Decimal::from(resolve(self).discount_percent))
            }
            ProductSortKey::CreatedAt => SortValue::Instant(self.created_at),
        }
    }
}
