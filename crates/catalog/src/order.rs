//! Checkout order input and receipt output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rigshop_core::{DomainError, DomainResult, FieldViolation};

fn one() -> u32 {
    1
}

/// A single order line: a product reference and how many units to take.
///
/// Storefront carts send `id`, `_id` or both; `_id` wins. A line with neither
/// resolves to an empty id and fails [`Order::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireOrderLine")]
pub struct OrderLine {
    pub id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
struct WireOrderLine {
    #[serde(rename = "_id")]
    underscore_id: Option<String>,
    id: Option<String>,
    #[serde(default = "one")]
    quantity: u32,
}

impl From<WireOrderLine> for OrderLine {
    fn from(wire: WireOrderLine) -> Self {
        let id = wire
            .underscore_id
            .filter(|id| !id.trim().is_empty())
            .or(wire.id)
            .unwrap_or_default();
        Self {
            id,
            quantity: wire.quantity,
        }
    }
}

impl OrderLine {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            quantity: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Order {
    pub items: Vec<OrderLine>,
}

impl Order {
    pub fn validate(&self) -> DomainResult<()> {
        let mut violations = Vec::new();
        for (i, line) in self.items.iter().enumerate() {
            if line.id.trim().is_empty() {
                violations.push(FieldViolation::new(
                    format!("items[{i}].id"),
                    "id or _id is required",
                ));
            }
            if line.quantity == 0 {
                violations.push(FieldViolation::new(
                    format!("items[{i}].quantity"),
                    "quantity must be at least 1",
                ));
            }
        }
        DomainError::check(violations)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    Fulfilled,
    OutOfStock,
    NotFound,
}

/// What happened to one order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineOutcome {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub quantity: u32,
    pub status: LineStatus,
}

/// Checkout result. The order as a whole always succeeds; individual lines
/// report their own status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub success: bool,
    pub message: String,
    pub order_id: String,
    /// Names of the fulfilled lines, in order.
    pub items_processed: Vec<String>,
    pub items: Vec<LineOutcome>,
    pub timestamp: DateTime<Utc>,
}

impl OrderReceipt {
    pub fn new(order_id: String, items: Vec<LineOutcome>, timestamp: DateTime<Utc>) -> Self {
        let items_processed = items
            .iter()
            .filter(|l| l.status == LineStatus::Fulfilled)
            .filter_map(|l| l.name.clone())
            .collect();
        Self {
            success: true,
            message: "stock updated".to_string(),
            order_id,
            items_processed,
            items,
            timestamp,
        }
    }

    pub fn fulfilled(&self) -> usize {
        self.items
            .iter()
            .filter(|l| l.status == LineStatus::Fulfilled)
            .count()
    }
}

/// Fresh order identifier (`ORD-<uuidv7>`).
pub fn new_order_id() -> String {
    format!("ORD-{}", Uuid::now_v7())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_accept_id_or_underscore_id_and_default_quantity() {
        let order: Order = serde_json::from_str(
            r#"{"items":[{"id":"a"},{"_id":"b","quantity":2},{"_id":"c","name":"ignored"}]}"#,
        )
        .unwrap();
        assert_eq!(order.items[0], OrderLine::new("a"));
        assert_eq!(order.items[1].id, "b");
        assert_eq!(order.items[1].quantity, 2);
        assert_eq!(order.items[2].quantity, 1);
    }

    fn outcome(id: &str, name: Option<&str>, status: LineStatus) -> LineOutcome {
        LineOutcome {
            id: id.into(),
            name: name.map(Into::into),
            quantity: 1,
            status,
        }
    }

    #[test]
    fn lines_carrying_both_keys_prefer_underscore_id() {
        let order: Order = serde_json::from_str(
            r#"{"items":[{"_id":"a","id":"b","name":"RTX"},{"_id":"","id":"c"}]}"#,
        )
        .unwrap();
        assert_eq!(order.items[0].id, "a");
        assert_eq!(order.items[1].id, "c");
        assert!(order.validate().is_ok());
    }

    #[test]
    fn lines_without_any_id_fail_validation() {
        let order: Order =
            serde_json::from_str(r#"{"items":[{"name":"RTX","quantity":1}]}"#).unwrap();
        match order.validate().unwrap_err() {
            DomainError::Validation(v) => assert_eq!(v[0].field, "items[0].id"),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let order = Order {
            items: vec![
                OrderLine::new("a"),
                OrderLine {
                    id: "b".into(),
                    quantity: 0,
                },
            ],
        };
        match order.validate().unwrap_err() {
            DomainError::Validation(v) => assert_eq!(v[0].field, "items[1].quantity"),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn receipt_lists_only_fulfilled_names() {
        let receipt = OrderReceipt::new(
            new_order_id(),
            vec![
                outcome("1", Some("CPU"), LineStatus::Fulfilled),
                outcome("2", Some("GPU"), LineStatus::OutOfStock),
                outcome("3", None, LineStatus::NotFound),
            ],
            Utc::now(),
        );
        assert!(receipt.success);
        assert_eq!(receipt.items_processed, vec!["CPU"]);
        assert_eq!(receipt.fulfilled(), 1);

        let json = serde_json::to_value(&receipt).unwrap();
        assert!(json["orderId"].as_str().unwrap().starts_with("ORD-"));
        assert_eq!(json["items"][1]["status"], "out_of_stock");
        assert!(json["items"][2].get("name").is_none());
    }

    #[test]
    fn order_ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| new_order_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
