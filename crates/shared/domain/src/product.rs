//! Product domain entity, search filter and response projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::DomainEvent;
use crate::user::UserResponse;

/// Mutable business fields of a product, always replaced as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
}

/// Product domain entity
///
/// `id`, `user_id` and `created_at` are fixed for the product's lifetime.
/// `user_id` is a weak reference to the owning user in the user service.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Create a product with a freshly generated identity.
    pub fn create(details: ProductDetails, user_id: Uuid) -> (Self, DomainEvent) {
        let product = Self {
            id: Uuid::new_v4(),
            name: details.name,
            description: details.description,
            price: details.price,
            quantity: details.quantity,
            user_id,
            created_at: Utc::now(),
        };
        let event = DomainEvent::ProductCreated {
            product_id: product.id,
            user_id,
        };
        (product, event)
    }

    /// Replace all mutable fields.
    pub fn update(&mut self, details: ProductDetails) -> DomainEvent {
        self.name = details.name;
        self.description = details.description;
        self.price = details.price;
        self.quantity = details.quantity;
        DomainEvent::ProductUpdated { product_id: self.id }
    }

    /// Event raised when the product is staged for removal.
    pub fn removed(&self) -> DomainEvent {
        DomainEvent::ProductRemoved { product_id: self.id }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Product search criteria. All present criteria are ANDed.
///
/// A `max_price` or `max_quantity` of zero means "no upper bound", not
/// "at most zero". Clients send `0` to leave a cap unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    /// Case-sensitive substring of the product name
    pub name: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound (0 = unset)
    pub max_price: Option<f64>,
    /// Inclusive lower quantity bound
    pub min_quantity: Option<i32>,
    /// Inclusive upper quantity bound (0 = unset)
    pub max_quantity: Option<i32>,
}

impl ProductFilter {
    /// Effective upper price bound after zero-as-unset normalisation.
    pub fn price_cap(&self) -> Option<f64> {
        self.max_price.filter(|max| *max != 0.0)
    }

    /// Effective upper quantity bound after zero-as-unset normalisation.
    pub fn quantity_cap(&self) -> Option<i32> {
        self.max_quantity.filter(|max| *max != 0)
    }

    /// Whether `product` satisfies every present criterion.
    ///
    /// Reference semantics for search. Store-backed searches translate the
    /// filter to SQL and must accept exactly the products this accepts; in
    /// particular `%` and `_` in `name` are literal characters.
    pub fn matches(&self, product: &Product) -> bool {
        self.name
            .as_deref()
            .map_or(true, |name| product.name.contains(name))
            && self.min_price.map_or(true, |min| product.price >= min)
            && self.price_cap().map_or(true, |max| product.price <= max)
            && self.min_quantity.map_or(true, |min| product.quantity >= min)
            && self.quantity_cap().map_or(true, |max| product.quantity <= max)
    }
}

/// Product projection returned by get, list and search queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            quantity: product.quantity,
            user_id: product.user_id,
            created_at: product.created_at,
        }
    }
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            quantity: product.quantity,
            user_id: product.user_id,
            created_at: product.created_at,
        }
    }
}

/// Product projection enriched with its owner, fetched from the user service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProductWithUserResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub user: UserResponse,
}

impl ProductWithUserResponse {
    pub fn compose(product: Product, user: UserResponse) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            quantity: product.quantity,
            created_at: product.created_at,
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(name: &str, price: f64, quantity: i32) -> ProductDetails {
        ProductDetails {
            name: name.to_string(),
            description: "A thing".to_string(),
            price,
            quantity,
        }
    }

    fn product(name: &str, price: f64, quantity: i32) -> Product {
        Product::create(details(name, price, quantity), Uuid::new_v4()).0
    }

    #[test]
    fn test_create_generates_fresh_identity() {
        let owner = Uuid::new_v4();
        let (first, event) = Product::create(details("Widget", 9.99, 3), owner);
        let (second, _) = Product::create(details("Widget", 9.99, 3), owner);

        assert_ne!(first.id, second.id);
        assert_eq!(first.name, "Widget");
        assert_eq!(first.price, 9.99);
        assert_eq!(first.quantity, 3);
        assert_eq!(first.user_id, owner);
        assert_eq!(
            event,
            DomainEvent::ProductCreated {
                product_id: first.id,
                user_id: owner
            }
        );
    }

    #[test]
    fn test_update_replaces_fields_but_keeps_identity() {
        let mut item = product("Widget", 9.99, 3);
        let (id, owner, created_at) = (item.id, item.user_id, item.created_at);

        let event = item.update(details("Gadget", 19.5, 7));

        assert_eq!(item.id, id);
        assert_eq!(item.user_id, owner);
        assert_eq!(item.created_at, created_at);
        assert_eq!(item.name, "Gadget");
        assert_eq!(item.description, "A thing");
        assert_eq!(item.price, 19.5);
        assert_eq!(item.quantity, 7);
        assert_eq!(event, DomainEvent::ProductUpdated { product_id: id });
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = ProductFilter::default();
        assert!(filter.matches(&product("Widget", 0.0, 0)));
        assert!(filter.matches(&product("", 1e9, i32::MAX)));
    }

    #[test]
    fn test_name_filter_treats_like_wildcards_literally() {
        let filter = ProductFilter {
            name: Some("50%_off".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&product("Save 50%_off today", 1.0, 1)));
        assert!(!filter.matches(&product("500 pack off", 1.0, 1)));
    }

    #[test]
    fn test_name_filter_is_case_sensitive_substring() {
        let filter = ProductFilter {
            name: Some("idg".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&product("Widget", 1.0, 1)));
        assert!(!filter.matches(&product("WIDGET", 1.0, 1)));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let filter = ProductFilter {
            min_price: Some(5.0),
            max_price: Some(10.0),
            min_quantity: Some(2),
            max_quantity: Some(4),
            ..Default::default()
        };
        assert!(filter.matches(&product("a", 5.0, 2)));
        assert!(filter.matches(&product("a", 10.0, 4)));
        assert!(!filter.matches(&product("a", 10.01, 4)));
        assert!(!filter.matches(&product("a", 5.0, 1)));
    }

    #[test]
    fn test_zero_max_means_no_upper_bound() {
        let expensive = product("a", 1_000_000.0, 500);
        for min_price in [None, Some(0.0), Some(10.0)] {
            let zero = ProductFilter {
                min_price,
                max_price: Some(0.0),
                max_quantity: Some(0),
                ..Default::default()
            };
            let absent = ProductFilter {
                min_price,
                ..Default::default()
            };
            assert_eq!(zero.matches(&expensive), absent.matches(&expensive));
            assert!(zero.matches(&expensive));
        }
        assert_eq!(ProductFilter::default().price_cap(), None);
    }

    #[test]
    fn test_filter_deserializes_camel_case() {
        let filter: ProductFilter =
            serde_json::from_str(r#"{"name":"W","minPrice":1.5,"maxQuantity":0}"#).unwrap();
        assert_eq!(filter.name.as_deref(), Some("W"));
        assert_eq!(filter.min_price, Some(1.5));
        assert_eq!(filter.max_quantity, Some(0));
        assert_eq!(filter.quantity_cap(), None);
    }
}
