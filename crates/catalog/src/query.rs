//! Catalog search: keyword, price range, category/brand sets and ordering.

use serde::Deserialize;

use rigshop_core::{DomainError, DomainResult, FieldViolation};

use crate::product::Product;

/// Raw query-string parameters of the catalog listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogParams {
    pub keyword: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
    pub category: Option<String>,
    pub brands: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    PriceAsc,
    PriceDesc,
    /// Creation time, newest first.
    #[default]
    Newest,
}

impl SortOrder {
    /// `asc` and `desc` sort by price; anything else keeps the default order.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("asc") => SortOrder::PriceAsc,
            Some("desc") => SortOrder::PriceDesc,
            _ => SortOrder::Newest,
        }
    }
}

/// Parsed, validated catalog query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    /// Lower-cased search term.
    pub keyword: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub categories: Option<Vec<String>>,
    pub brands: Option<Vec<String>>,
    pub sort: SortOrder,
}

fn non_blank(raw: Option<&String>) -> Option<&str> {
    raw.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn parse_price(
    field: &str,
    raw: Option<&String>,
    violations: &mut Vec<FieldViolation>,
) -> Option<f64> {
    let raw = non_blank(raw)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            violations.push(FieldViolation::new(field, format!("{field} must be a number")));
            None
        }
    }
}

fn parse_set(raw: Option<&String>) -> Option<Vec<String>> {
    let set: Vec<String> = non_blank(raw)?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if set.is_empty() { None } else { Some(set) }
}

impl TryFrom<CatalogParams> for ProductQuery {
    type Error = DomainError;

    fn try_from(params: CatalogParams) -> DomainResult<Self> {
        let mut violations = Vec::new();
        let min_price = parse_price("minPrice", params.min_price.as_ref(), &mut violations);
        let max_price = parse_price("maxPrice", params.max_price.as_ref(), &mut violations);
        DomainError::check(violations)?;

        // "All" is what the storefront sends when no category is picked.
        let categories = match non_blank(params.category.as_ref()) {
            Some("All") => None,
            _ => parse_set(params.category.as_ref()),
        };

        Ok(Self {
            keyword: non_blank(params.keyword.as_ref()).map(str::to_lowercase),
            min_price,
            max_price,
            categories,
            brands: parse_set(params.brands.as_ref()),
            sort: SortOrder::parse(params.sort.as_deref()),
        })
    }
}

fn contains_ci(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|f| f.to_lowercase().contains(needle))
}

fn in_set(value: Option<&str>, set: &[String]) -> bool {
    value.is_some_and(|v| set.iter().any(|s| s == v))
}

impl ProductQuery {
    pub fn matches(&self, p: &Product) -> bool {
        if let Some(keyword) = &self.keyword {
            let hit = contains_ci(Some(&p.name), keyword)
                || contains_ci(p.description.as_deref(), keyword)
                || contains_ci(p.brand.as_deref(), keyword)
                || contains_ci(p.category.as_deref(), keyword);
            if !hit {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| p.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| p.price > max) {
            return false;
        }
        if let Some(categories) = &self.categories {
            if !in_set(p.category.as_deref(), categories) {
                return false;
            }
        }
        if let Some(brands) = &self.brands {
            if !in_set(p.brand.as_deref(), brands) {
                return false;
            }
        }
        true
    }

    /// Order products in place. Ties fall back to newest first.
    pub fn sort(&self, products: &mut [Product]) {
        let newest = |a: &Product, b: &Product| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        };
        match self.sort {
            SortOrder::PriceAsc => products.sort_by(|a, b| {
                a.price.total_cmp(&b.price).then_with(|| newest(a, b))
            }),
            SortOrder::PriceDesc => products.sort_by(|a, b| {
                b.price.total_cmp(&a.price).then_with(|| newest(a, b))
            }),
            SortOrder::Newest => products.sort_by(newest),
        }
    }

    /// Filter and order an unordered product snapshot.
    pub fn apply(&self, products: impl IntoIterator<Item = Product>) -> Vec<Product> {
        let mut out: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();
        self.sort(&mut out);
        out
    }
}
