//! Dashboard summary figures, derived from a full catalog snapshot.

use serde::Serialize;

use crate::product::Product;

/// Products with less stock than this show up in the low-stock list.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Share of the inventory value attributed to each weekday bucket.
///
/// This is a synthetic display series for the dashboard chart, not history.
pub const DAILY_RATIOS: [(&str, f64); 7] = [
    ("Mon", 0.05),
    ("Tue", 0.08),
    ("Wed", 0.06),
    ("Thu", 0.12),
    ("Fri", 0.15),
    ("Sat", 0.25),
    ("Sun", 0.20),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub name: &'static str,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_items: usize,
    pub total_value: f64,
    pub out_of_stock: usize,
    pub low_stock: Vec<Product>,
    pub daily_data: Vec<DailyTotal>,
}

impl StatsSnapshot {
    pub fn from_products(products: &[Product]) -> Self {
        let total_value: f64 = products.iter().map(Product::stock_value).sum();

        Self {
            total_items: products.len(),
            total_value,
            out_of_stock: products.iter().filter(|p| p.is_out_of_stock()).count(),
            low_stock: products
                .iter()
                .filter(|p| p.stock < LOW_STOCK_THRESHOLD)
                .cloned()
                .collect(),
            daily_data: DAILY_RATIOS
                .iter()
                .map(|&(name, ratio)| DailyTotal {
                    name,
                    total: total_value * ratio,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductFields;
    use chrono::Utc;
    use rigshop_core::ProductId;

    fn part(name: &str, price: f64, stock: i64) -> Product {
        Product::create(
            ProductId::new(),
            ProductFields {
                name: Some(name.into()),
                price: Some(price),
                stock: Some(stock),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn empty_catalog_is_all_zero() {
        let s = StatsSnapshot::from_products(&[]);
        assert_eq!(s.total_items, 0);
        assert_eq!(s.total_value, 0.0);
        assert_eq!(s.out_of_stock, 0);
        assert!(s.low_stock.is_empty());
        assert_eq!(s.daily_data.len(), 7);
        assert!(s.daily_data.iter().all(|d| d.total == 0.0));
    }

    #[test]
    fn aggregates_value_and_stock_levels() {
        let products = vec![part("A", 100.0, 10), part("B", 50.0, 0), part("C", 20.0, 4)];
        let s = StatsSnapshot::from_products(&products);

        assert_eq!(s.total_items, 3);
        assert_eq!(s.total_value, 100.0 * 10.0 + 20.0 * 4.0);
        assert_eq!(s.out_of_stock, 1);
        let low: Vec<_> = s.low_stock.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(low, vec!["B", "C"]);
    }

    #[test]
    fn daily_buckets_follow_fixed_ratios() {
        let s = StatsSnapshot::from_products(&[part("A", 1000.0, 1)]);
        let labels: Vec<_> = s.daily_data.iter().map(|d| d.name).collect();
        assert_eq!(labels, vec!["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        assert!((s.daily_data[5].total - 250.0).abs() < 1e-9);
        let sum: f64 = s.daily_data.iter().map(|d| d.total).sum();
        assert!((sum - 910.0).abs() < 1e-9);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(StatsSnapshot::from_products(&[])).unwrap();
        assert_eq!(json["totalItems"], 0);
        assert_eq!(json["lowStock"], serde_json::json!([]));
        assert_eq!(json["dailyData"][0]["name"], "Mon");
    }
}
