use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use rigshop_core::{DomainError, DomainResult, FieldViolation, ProductId};

use crate::specs::{Specs, validate_specs};

/// Upper bound accepted for a product price.
pub const MAX_PRICE: f64 = 10_000_000.0;

/// Stock given to new products when the draft does not say otherwise.
pub const DEFAULT_STOCK: u32 = 10;

/// A sellable catalog entry.
///
/// # Invariants
/// - `name` is never blank.
/// - `0 <= price <= MAX_PRICE`.
/// - `stock` and `sold` are non-negative (unsigned); `sold` only grows through
///   [`Product::sell`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub stock: u32,
    pub sold: u32,
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Root-relative path of the cover image (e.g. `products/<uuid>.png`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty: Option<String>,
    #[serde(flatten)]
    pub specs: Specs,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable product fields, as submitted by catalog create/edit requests.
///
/// On create, `name` and `price` are required and the numeric counters fall back
/// to their defaults. On edit, every field is optional and only present fields
/// are applied.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub sold: Option<i64>,
    pub points: Option<i64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub image: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub gallery: Option<Vec<String>>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub colors: Option<Vec<String>>,
    pub warranty: Option<String>,
    #[serde(flatten)]
    pub specs: Specs,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// List fields also accept a lone string, read as a one-element list.
fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }),
    )
}

impl ProductFields {
    /// Validate the submitted values.
    ///
    /// `creating` additionally requires the fields a new product cannot do without.
    pub fn validate(&self, creating: bool) -> DomainResult<()> {
        let mut violations = Vec::new();

        match &self.name {
            Some(name) if name.trim().is_empty() => {
                violations.push(FieldViolation::new("name", "name must not be empty"));
            }
            None if creating => {
                violations.push(FieldViolation::new("name", "name must not be empty"));
            }
            _ => {}
        }

        match self.price {
            Some(price) if !price.is_finite() => {
                violations.push(FieldViolation::new("price", "price must be a number"));
            }
            Some(price) if price < 0.0 => {
                violations.push(FieldViolation::new("price", "price must not be less than 0"));
            }
            Some(price) if price > MAX_PRICE => violations.push(FieldViolation::new(
                "price",
                format!("price must not be greater than {MAX_PRICE}"),
            )),
            None if creating => {
                violations.push(FieldViolation::new("price", "price should not be empty"));
            }
            _ => {}
        }

        for (field, value) in [
            ("stock", self.stock),
            ("sold", self.sold),
            ("points", self.points),
        ] {
            if let Some(v) = value {
                if v < 0 {
                    violations.push(FieldViolation::new(
                        field,
                        format!("{field} must not be less than 0"),
                    ));
                } else if u32::try_from(v).is_err() {
                    violations.push(FieldViolation::new(field, format!("{field} is too large")));
                }
            }
        }

        violations.extend(validate_specs(&self.specs));
        DomainError::check(violations)
    }
}

fn counter(value: Option<i64>, default: u32) -> u32 {
    value
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Product {
    /// Build a new product from validated create fields.
    pub fn create(id: ProductId, fields: ProductFields, now: DateTime<Utc>) -> DomainResult<Self> {
        fields.validate(true)?;

        Ok(Self {
            id,
            name: fields.name.unwrap_or_default().trim().to_string(),
            price: fields.price.unwrap_or_default(),
            stock: counter(fields.stock, DEFAULT_STOCK),
            sold: counter(fields.sold, 0),
            points: counter(fields.points, 0),
            description: fields.description,
            category: non_blank(fields.category),
            brand: non_blank(fields.brand),
            image: non_blank(fields.image),
            gallery: fields.gallery.unwrap_or_default(),
            colors: fields.colors.unwrap_or_default(),
            warranty: fields.warranty,
            specs: fields.specs,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial edit. Absent fields are left untouched; spec attributes
    /// are merged key by key.
    ///
    /// `sold` may be raised but never lowered by an edit.
    pub fn apply_patch(&mut self, patch: ProductFields, now: DateTime<Utc>) -> DomainResult<()> {
        patch.validate(false)?;
        if let Some(sold) = patch.sold {
            if sold < i64::from(self.sold) {
                return Err(DomainError::validation(
                    "sold",
                    format!("sold cannot decrease below {}", self.sold),
                ));
            }
        }

        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if patch.stock.is_some() {
            self.stock = counter(patch.stock, self.stock);
        }
        if patch.sold.is_some() {
            self.sold = counter(patch.sold, self.sold);
        }
        if patch.points.is_some() {
            self.points = counter(patch.points, self.points);
        }
        if let Some(v) = patch.description {
            self.description = Some(v);
        }
        if let Some(v) = patch.category {
            self.category = non_blank(Some(v));
        }
        if let Some(v) = patch.brand {
            self.brand = non_blank(Some(v));
        }
        if let Some(v) = patch.image {
            self.image = non_blank(Some(v));
        }
        if let Some(v) = patch.gallery {
            self.gallery = v;
        }
        if let Some(v) = patch.colors {
            self.colors = v;
        }
        if let Some(v) = patch.warranty {
            self.warranty = Some(v);
        }
        self.specs.extend(patch.specs);
        self.updated_at = now;
        Ok(())
    }

    /// Take `quantity` units out of stock and count them as sold.
    ///
    /// Returns `false` and leaves the product untouched when there is not enough
    /// stock to cover the whole quantity.
    pub fn sell(&mut self, quantity: u32, now: DateTime<Utc>) -> bool {
        if quantity == 0 || self.stock < quantity {
            return false;
        }
        self.stock -= quantity;
        self.sold = self.sold.saturating_add(quantity);
        self.updated_at = now;
        true
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock == 0
    }

    /// Inventory value of the remaining stock.
    pub fn stock_value(&self) -> f64 {
        self.price * f64::from(self.stock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specs::SpecValue;

    fn fields(name: &str, price: f64) -> ProductFields {
        ProductFields {
            name: Some(name.to_string()),
            price: Some(price),
            ..Default::default()
        }
    }

    fn product(stock: i64) -> Product {
        let mut f = fields("Ryzen 7 7800X3D", 14_900.0);
        f.stock = Some(stock);
        Product::create(ProductId::new(), f, Utc::now()).unwrap()
    }

    fn violation_fields(err: DomainError) -> Vec<String> {
        match err {
            DomainError::Validation(v) => v.into_iter().map(|v| v.field).collect(),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_applies_defaults() {
        let p =
            Product::create(ProductId::new(), fields("RTX 4090", 59_000.0), Utc::now()).unwrap();
        assert_eq!(p.stock, DEFAULT_STOCK);
        assert_eq!(p.sold, 0);
        assert_eq!(p.points, 0);
        assert!(p.gallery.is_empty());
        assert_eq!(p.created_at, p.updated_at);
    }

    #[test]
    fn create_requires_name_and_price() {
        let err =
            Product::create(ProductId::new(), ProductFields::default(), Utc::now()).unwrap_err();
        assert_eq!(violation_fields(err), vec!["name", "price"]);
    }

    #[test]
    fn create_rejects_blank_name() {
        let err = Product::create(ProductId::new(), fields("   ", 10.0), Utc::now()).unwrap_err();
        assert_eq!(violation_fields(err), vec!["name"]);
    }

    #[test]
    fn create_rejects_out_of_range_price_and_negative_counters() {
        let mut f = fields("Case", MAX_PRICE + 1.0);
        f.stock = Some(-1);
        f.sold = Some(-3);
        let err = Product::create(ProductId::new(), f, Utc::now()).unwrap_err();
        assert_eq!(violation_fields(err), vec!["price", "stock", "sold"]);

        let err = Product::create(ProductId::new(), fields("Case", -0.01), Utc::now()).unwrap_err();
        assert_eq!(violation_fields(err), vec!["price"]);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        assert!(Product::create(ProductId::new(), fields("Free sticker", 0.0), Utc::now()).is_ok());
        assert!(Product::create(ProductId::new(), fields("Server", MAX_PRICE), Utc::now()).is_ok());
    }

    #[test]
    fn create_rejects_unknown_spec_attribute() {
        let mut f = fields("Mystery box", 99.0);
        f.specs.insert("color".into(), SpecValue::Text("red".into()));
        let err = Product::create(ProductId::new(), f, Utc::now()).unwrap_err();
        assert_eq!(violation_fields(err), vec!["color"]);
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut p = product(3);
        p.specs.insert("socket".into(), SpecValue::Text("AM5".into()));
        let before = p.clone();

        let mut patch = ProductFields {
            price: Some(12_500.0),
            ..Default::default()
        };
        patch.specs.insert("cache".into(), SpecValue::Text("96MB".into()));
        p.apply_patch(patch, Utc::now()).unwrap();

        assert_eq!(p.price, 12_500.0);
        assert_eq!(p.name, before.name);
        assert_eq!(p.stock, 3);
        assert_eq!(p.specs.len(), 2);
    }

    #[test]
    fn list_fields_accept_a_single_string() {
        let f: ProductFields = serde_json::from_str(
            r#"{"name":"Case","price":95,"gallery":"products/a.png","colors":["black","white"]}"#,
        )
        .unwrap();
        assert_eq!(f.gallery, Some(vec!["products/a.png".to_string()]));
        assert_eq!(f.colors.as_deref().map(<[String]>::len), Some(2));
        assert!(f.specs.is_empty());

        let f: ProductFields = serde_json::from_str(r#"{"gallery":null}"#).unwrap();
        assert_eq!(f.gallery, None);
        assert_eq!(f.colors, None);
    }

    #[test]
    fn patch_cannot_lower_the_sold_counter() {
        let mut p = product(5);
        assert!(p.sell(3, Utc::now()));
        let before = p.clone();

        let lower = ProductFields {
            sold: Some(1),
            ..Default::default()
        };
        match p.apply_patch(lower, Utc::now()).unwrap_err() {
            DomainError::Validation(v) => assert_eq!(v[0].field, "sold"),
            other => panic!("Expected Validation error, got {other:?}"),
        }
        assert_eq!(p, before);

        let higher = ProductFields {
            sold: Some(7),
            ..Default::default()
        };
        p.apply_patch(higher, Utc::now()).unwrap();
        assert_eq!(p.sold, 7);
    }

    #[test]
    fn patch_is_validated_and_not_applied_on_error() {
        let mut p = product(3);
        let before = p.clone();
        let patch = ProductFields {
            name: Some("".into()),
            stock: Some(-5),
            ..Default::default()
        };
        assert!(p.apply_patch(patch, Utc::now()).is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn sell_decrements_stock_and_counts_sale() {
        let mut p = product(3);
        assert!(p.sell(1, Utc::now()));
        assert_eq!(p.stock, 2);
        assert_eq!(p.sold, 1);
    }

    #[test]
    fn sell_refuses_when_stock_is_short() {
        let mut p = product(0);
        let before = p.clone();
        assert!(!p.sell(1, Utc::now()));
        assert_eq!(p, before);

        let mut p = product(2);
        assert!(!p.sell(3, Utc::now()));
        assert_eq!(p.stock, 2);
    }

    #[test]
    fn json_flattens_specs_into_the_product_object() {
        let mut p = product(1);
        p.specs.insert("vram".into(), SpecValue::Text("24GB".into()));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["vram"], "24GB");
        assert_eq!(json["stock"], 1);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("description").is_none());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any sequence of sales conserves stock + sold and never
            /// lets sold go down.
            #[test]
            fn sales_conserve_units(
                initial in 0i64..50,
                requests in proptest::collection::vec(0u32..5, 0..40)
            ) {
                let mut p = product(initial);
                let total = p.stock + p.sold;
                let mut last_sold = p.sold;

                for q in requests {
                    let before = p.stock;
                    let applied = p.sell(q, Utc::now());
                    prop_assert_eq!(applied, q > 0 && before >= q);
                    prop_assert!(p.sold >= last_sold);
                    prop_assert_eq!(p.stock + p.sold, total);
                    last_sold = p.sold;
                }
            }

            /// Property: validation accepts exactly the in-range prices.
            #[test]
            fn price_validation_matches_range(price in -1_000.0f64..20_000_000.0) {
                let ok =
                    Product::create(ProductId::new(), fields("Part", price), Utc::now()).is_ok();
                prop_assert_eq!(ok, (0.0..=MAX_PRICE).contains(&price));
            }
        }
    }
}
