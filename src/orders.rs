//! Orders

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use thiserror::Error;

use crate::{
    cart::{Cart, LineItem},
    listing::{Listable, SortValue},
};

/// The customer an order belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Customer {
    /// Display name.
    pub name: String,

    /// Contact email.
    pub email: String,
}

/// Where an order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddress {
    /// Street address.
    pub address: String,

    /// City.
    pub city: String,

    /// Postal code.
    pub postal_code: String,

    /// Country.
    pub country: String,
}

/// An order record as returned by the remote order service.
///
/// The four money fields are derived from the line items and are never
/// mutated independently; the lifecycle booleans are projected into an
/// [`OrderStatus`] rather than read at call sites.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "mirrors the remote service record"
)]
pub struct Order {
    /// Service-assigned id.
    #[serde(rename = "_id")]
    pub id: String,

    /// Customer the order belongs to; absent when the account is gone.
    pub user: Option<Customer>,

    /// Shipping destination.
    pub shipping_address: ShippingAddress,

    /// Owned line items; items have no identity outside the order.
    pub order_items: Vec<LineItem>,

    /// Items subtotal.
    pub items_price: Decimal,

    /// Shipping cost.
    pub shipping_price: Decimal,

    /// Sales tax.
    pub tax_price: Decimal,

    /// Grand total.
    pub total_price: Decimal,

    /// Whether payment has been received.
    pub is_paid: bool,

    /// Whether the order has been delivered.
    pub is_delivered: bool,

    /// Whether a refund has been processed.
    pub refund_processed: bool,

    /// When payment was received; stamped exactly once.
    pub paid_at: Option<Timestamp>,

    /// When the order was delivered; stamped exactly once.
    pub delivered_at: Option<Timestamp>,

    /// When the order was created.
    pub created_at: Option<Timestamp>,

    /// Soft-removal flag; archived orders are hidden from default views.
    pub archived: bool,
}

impl Order {
    /// Records payment, stamping `paid_at` only on the first call.
    pub fn mark_paid(&mut self, now: Timestamp) {
        self.is_paid = true;
        if self.paid_at.is_none() {
            self.paid_at = Some(now);
        }
    }

    /// Records delivery, stamping `delivered_at` only on the first call.
    pub fn mark_delivered(&mut self, now: Timestamp) {
        self.is_delivered = true;
        if self.delivered_at.is_none() {
            self.delivered_at = Some(now);
        }
    }

    /// Customer name, empty when the account is gone.
    #[must_use]
    pub fn customer_name(&self) -> &str {
        self.user.as_ref().map_or("", |user| user.name.as_str())
    }

    /// The derived lifecycle state of this order.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        OrderStatus::classify(self)
    }
}

/// The derived lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Created, payment outstanding.
    Pending,

    /// Paid, awaiting fulfilment.
    Processing,

    /// Fulfilled.
    Delivered,

    /// Refund processed; terminal.
    Refunded,
}

impl OrderStatus {
    /// Classifies an order's flags into a single state.
    ///
    /// Strict priority, first match wins: refunded, then delivered, then
    /// paid, then pending. Inconsistent flag combinations are classified,
    /// not rejected; an unpaid delivered order still reads as `Delivered`.
    #[must_use]
    pub fn classify(order: &Order) -> Self {
        if order.refund_processed {
            OrderStatus::Refunded
        } else if order.is_delivered {
            OrderStatus::Delivered
        } else if order.is_paid {
            OrderStatus::Processing
        } else {
            OrderStatus::Pending
        }
    }

    /// Display label used for badges and exports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Refunded => "Refunded",
        }
    }

    /// Applies a lifecycle event.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Illegal`] when the event is not valid
    /// from the current state, e.g. a refund before payment.
    pub fn apply(self, event: OrderEvent) -> Result<Self, TransitionError> {
        match (self, event) {
            (OrderStatus::Pending, OrderEvent::PaymentReceived) => Ok(OrderStatus::Processing),
            (OrderStatus::Processing, OrderEvent::Fulfilled) => Ok(OrderStatus::Delivered),
            (OrderStatus::Processing | OrderStatus::Delivered, OrderEvent::RefundIssued) => {
                Ok(OrderStatus::Refunded)
            }
            (from, event) => Err(TransitionError::Illegal { from, event }),
        }
    }
}

/// Lifecycle events an order can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    /// Payment captured.
    PaymentReceived,

    /// Shipment delivered.
    Fulfilled,

    /// Refund processed.
    RefundIssued,
}

/// Errors from the order lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The event is not allowed from the current state.
    #[error("cannot apply {event:?} to an order in the {from:?} state")]
    Illegal {
        /// State the order was in.
        from: OrderStatus,

        /// Event that was rejected.
        event: OrderEvent,
    },
}

/// Bulk actions an admin can apply to a selection of orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    /// Mark every selected order delivered.
    MarkDelivered,

    /// Soft-remove every selected order from default views.
    Archive,
}

/// Errors from bulk order actions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BulkActionError {
    /// The action was invoked with nothing selected.
    #[error("no orders selected")]
    EmptySelection,
}

/// Applies a bulk action to every order whose id is selected, returning
/// how many orders were touched.
///
/// # Errors
///
/// Returns [`BulkActionError::EmptySelection`] when `selected` is empty.
pub fn apply_bulk(
    orders: &mut [Order],
    selected: &[String],
    action: BulkAction,
    now: Timestamp,
) -> Result<usize, BulkActionError> {
    if selected.is_empty() {
        return Err(BulkActionError::EmptySelection);
    }

    let selected: FxHashSet<&str> = selected.iter().map(String::as_str).collect();
    let mut touched = 0;

    for order in orders
        .iter_mut()
        .filter(|order| selected.contains(order.id.as_str()))
    {
        match action {
            BulkAction::MarkDelivered => order.mark_delivered(now),
            BulkAction::Archive => order.archived = true,
        }
        touched += 1;
    }

    Ok(touched)
}

/// An admin-side order under construction.
#[derive(Debug, Default)]
pub struct OrderDraft {
    /// Selected customer.
    pub customer: Option<Customer>,

    /// Shipping destination.
    pub shipping_address: Option<ShippingAddress>,

    /// Lines added so far, with their cached totals.
    pub cart: Cart,
}

/// Validation failures raised before an order is submitted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    /// The draft has no line items.
    #[error("an order needs at least one line item")]
    NoItems,

    /// No customer was selected.
    #[error("select a customer for this order")]
    NoCustomer,

    /// The shipping address is missing its street or city.
    #[error("fill in the shipping address")]
    IncompleteAddress,
}

/// The submission payload for a newly created order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Customer the order is created for.
    pub user: Customer,

    /// Shipping destination.
    pub shipping_address: ShippingAddress,

    /// Line items with frozen prices.
    pub order_items: Vec<LineItem>,

    /// Items subtotal.
    pub items_price: Decimal,

    /// Shipping cost.
    pub shipping_price: Decimal,

    /// Sales tax.
    pub tax_price: Decimal,

    /// Grand total.
    pub total_price: Decimal,
}

impl OrderDraft {
    /// Validates the draft and produces the submission payload. No
    /// submission is attempted here; the caller owns the transport.
    ///
    /// # Errors
    ///
    /// - [`DraftError::NoItems`]: the draft has no line items.
    /// - [`DraftError::NoCustomer`]: no customer was selected.
    /// - [`DraftError::IncompleteAddress`]: the shipping address is
    ///   missing its street or city.
    pub fn build(self) -> Result<NewOrder, DraftError> {
        if self.cart.is_empty() {
            return Err(DraftError::NoItems);
        }

        let customer = self.customer.ok_or(DraftError::NoCustomer)?;

        let shipping_address = self
            .shipping_address
            .filter(|addr| !addr.address.trim().is_empty() && !addr.city.trim().is_empty())
            .ok_or(DraftError::IncompleteAddress)?;

        let totals = *self.cart.totals();

        Ok(NewOrder {
            user: customer,
            shipping_address,
            order_items: self.cart.into_items(),
            items_price: totals.items_price,
            shipping_price: totals.shipping_price,
            tax_price: totals.tax_price,
            total_price: totals.total_price,
        })
    }
}

/// Sortable columns of the admin order listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSortKey {
    /// Order id.
    Id,

    /// Customer name; empty when the account is gone.
    Customer,

    /// Creation instant.
    CreatedAt,

    /// Payment instant.
    PaidAt,

    /// Delivery instant.
    DeliveredAt,

    /// Grand total.
    Total,
}

impl Listable for Order {
    type Filter = OrderStatus;
    type SortKey = OrderSortKey;

    fn matches(&self, filter: &OrderStatus) -> bool {
        self.status() == *filter
    }

    fn visible_by_default(&self) -> bool {
        !self.archived
    }

    fn created(&self) -> Option<Timestamp> {
        self.created_at
    }

    fn search_text(&self) -> SmallVec<[String; 3]> {
        let mut haystacks: SmallVec<[String; 3]> = smallvec![self.id.clone()];

        if let Some(user) = &self.user {
            haystacks.push(user.name.clone());
            haystacks.push(user.email.clone());
        }

        haystacks
    }

    fn sort_value(&self, key: OrderSortKey) -> SortValue {
        match key {
            OrderSortKey::Id => SortValue::Text(self.id.clone()),
            OrderSortKey::Customer => SortValue::Text(self.customer_name().to_owned()),
            OrderSortKey::CreatedAt => SortValue::Instant(self.created_at),
            OrderSortKey::PaidAt => SortValue::Instant(self.paid_at),
            OrderSortKey::DeliveredAt => SortValue::Instant(self.delivered_at),
            OrderSortKey::Total => SortValue::Number(self.total_price),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::cart::LineOptions;
    use crate::products::Product;

    use super::*;

    fn order(id: &str, paid: bool, delivered: bool, refunded: bool) -> Order {
        Order {
            id: id.to_owned(),
            is_paid: paid,
            is_delivered: delivered,
            refund_processed: refunded,
            ..Order::default()
        }
    }

    #[test]
    fn classify_follows_strict_priority() {
        assert_eq!(
            order("o1", false, false, false).status(),
            OrderStatus::Pending
        );
        assert_eq!(
            order("o2", true, false, false).status(),
            OrderStatus::Processing
        );
        assert_eq!(
            order("o3", true, true, false).status(),
            OrderStatus::Delivered
        );
        // Refunded wins even when every other flag is set.
        assert_eq!(
            order("o4", true, true, true).status(),
            OrderStatus::Refunded
        );
        // Inconsistent flags classify rather than fail.
        assert_eq!(
            order("o5", false, true, false).status(),
            OrderStatus::Delivered
        );
    }

    #[test]
    fn transitions_follow_the_lifecycle() -> TestResult {
        let status = OrderStatus::Pending
            .apply(OrderEvent::PaymentReceived)?
            .apply(OrderEvent::Fulfilled)?
            .apply(OrderEvent::RefundIssued)?;

        assert_eq!(status, OrderStatus::Refunded);

        Ok(())
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        assert!(matches!(
            OrderStatus::Pending.apply(OrderEvent::RefundIssued),
            Err(TransitionError::Illegal {
                from: OrderStatus::Pending,
                event: OrderEvent::RefundIssued,
            })
        ));
        assert!(matches!(
            OrderStatus::Pending.apply(OrderEvent::Fulfilled),
            Err(TransitionError::Illegal { .. })
        ));
        assert!(matches!(
            OrderStatus::Refunded.apply(OrderEvent::PaymentReceived),
            Err(TransitionError::Illegal { .. })
        ));
    }

    #[test]
    fn mark_paid_stamps_timestamp_once() -> TestResult {
        let first: Timestamp = "2026-02-01T10:00:00Z".parse()?;
        let later: Timestamp = "2026-02-05T10:00:00Z".parse()?;

        let mut order = order("o1", false, false, false);
        order.mark_paid(first);
        order.mark_paid(later);

        assert!(order.is_paid);
        assert_eq!(order.paid_at, Some(first));

        Ok(())
    }

    #[test]
    fn bulk_mark_delivered_touches_only_selected() -> TestResult {
        let now: Timestamp = "2026-02-01T10:00:00Z".parse()?;
        let mut orders = vec![
            order("o1", true, false, false),
            order("o2", true, false, false),
            order("o3", true, false, false),
        ];

        let touched = apply_bulk(
            &mut orders,
            &["o1".to_owned(), "o3".to_owned()],
            BulkAction::MarkDelivered,
            now,
        )?;

        assert_eq!(touched, 2);
        let delivered: Vec<bool> = orders.iter().map(|o| o.is_delivered).collect();
        assert_eq!(delivered, vec![true, false, true]);
        assert_eq!(orders.first().and_then(|o| o.delivered_at), Some(now));

        Ok(())
    }

    #[test]
    fn bulk_action_with_empty_selection_errors() -> TestResult {
        let now: Timestamp = "2026-02-01T10:00:00Z".parse()?;
        let mut orders = vec![order("o1", true, false, false)];

        let result = apply_bulk(&mut orders, &[], BulkAction::Archive, now);

        assert!(matches!(result, Err(BulkActionError::EmptySelection)));

        Ok(())
    }

    #[test]
    fn archived_orders_drop_out_of_default_views() -> TestResult {
        let now: Timestamp = "2026-02-01T10:00:00Z".parse()?;
        let mut orders = vec![order("o1", false, false, false)];

        apply_bulk(&mut orders, &["o1".to_owned()], BulkAction::Archive, now)?;

        assert!(orders.iter().all(|o| !o.visible_by_default()));

        Ok(())
    }

    fn draft_with_items() -> OrderDraft {
        let product = Product {
            id: "p1".to_owned(),
            name: "Wool Tie".to_owned(),
            price: dec!(40),
            count_in_stock: 9,
            ..Product::default()
        };

        let mut draft = OrderDraft::default();
        draft.cart.add(LineItem::prepare(
            &product,
            LineOptions {
                qty: Some(3),
                ..LineOptions::default()
            },
        ));

        draft
    }

    fn full_address() -> ShippingAddress {
        ShippingAddress {
            address: "1 High Street".to_owned(),
            city: "London".to_owned(),
            postal_code: "N1 1AA".to_owned(),
            country: "UK".to_owned(),
        }
    }

    #[test]
    fn draft_build_produces_payload_with_totals() -> TestResult {
        let mut draft = draft_with_items();
        draft.customer = Some(Customer {
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
        });
        draft.shipping_address = Some(full_address());

        let new_order = draft.build()?;

        assert_eq!(new_order.order_items.len(), 1);
        assert_eq!(new_order.items_price, dec!(120.00));
        assert_eq!(new_order.shipping_price, Decimal::ZERO);
        assert_eq!(new_order.tax_price, dec!(18.00));
        assert_eq!(new_order.total_price, dec!(138.00));

        Ok(())
    }

    #[test]
    fn draft_without_items_is_rejected() {
        let draft = OrderDraft {
            customer: Some(Customer::default()),
            shipping_address: Some(full_address()),
            cart: Cart::default(),
        };

        assert!(matches!(draft.build(), Err(DraftError::NoItems)));
    }

    #[test]
    fn draft_without_customer_is_rejected() {
        let mut draft = draft_with_items();
        draft.shipping_address = Some(full_address());

        assert!(matches!(draft.build(), Err(DraftError::NoCustomer)));
    }

    #[test]
    fn draft_with_blank_address_is_rejected() {
        let mut draft = draft_with_items();
        draft.customer = Some(Customer::default());
        draft.shipping_address = Some(ShippingAddress {
            address: "  ".to_owned(),
            ..full_address()
        });

        assert!(matches!(draft.build(), Err(DraftError::IncompleteAddress)));
    }

    #[test]
    fn order_decodes_from_service_json() -> TestResult {
        let order: Order = serde_json::from_str(
            r#"{
                "_id": "ord-1",
                "user": {"name": "Ada", "email": "ada@example.com"},
                "totalPrice": 138.0,
                "isPaid": true,
                "paidAt": "2026-02-01T10:00:00Z"
            }"#,
        )?;

        assert_eq!(order.id, "ord-1");
        assert_eq!(order.customer_name(), "Ada");
        assert_eq!(order.total_price, dec!(138));
        assert_eq!(order.status(), OrderStatus::Processing);
        assert!(!order.archived);

        Ok(())
    }
}
