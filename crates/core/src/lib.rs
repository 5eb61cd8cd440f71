//! Shelf core types: the three seed collections and the enrichment join.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use tracing::warn;

pub mod fixtures;

pub use fixtures::FixtureError;

pub type UserId = u32;
pub type CategoryId = u32;
pub type ProductId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub sex: Sex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub icon: String,
    pub owner_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category_id: CategoryId,
}

/// A product with its category and owning user resolved.
///
/// `category` is `None` iff no category carries the product's
/// `category_id`; `user` is `None` iff `category` is `None` or its
/// `owner_id` resolves to no user. Broken links are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedProduct {
    pub id: ProductId,
    pub name: String,
    pub category_id: CategoryId,
    pub category: Option<Category>,
    pub user: Option<User>,
}

/// The three seed collections, loaded once and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub users: Vec<User>,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

impl Catalog {
    /// Left-outer join product -> category -> user, preserving the
    /// products' original order. Pure and total: absent links propagate
    /// as `None`.
    pub fn enrich(&self) -> Vec<EnrichedProduct> {
        self.products
            .iter()
            .map(|product| {
                let category = self
                    .categories
                    .iter()
                    .find(|c| c.id == product.category_id)
                    .cloned();
                let user = category
                    .as_ref()
                    .and_then(|c| self.users.iter().find(|u| u.id == c.owner_id))
                    .cloned();
                match (&category, &user) {
                    (None, _) => warn!(
                        product = %product.name,
                        category_id = product.category_id,
                        "product references unknown category"
                    ),
                    (Some(c), None) => warn!(
                        product = %product.name,
                        category = %c.title,
                        owner_id = c.owner_id,
                        "category references unknown owner"
                    ),
                    _ => {}
                }
                EnrichedProduct {
                    id: product.id,
                    name: product.name.clone(),
                    category_id: product.category_id,
                    category,
                    user,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: UserId, name: &str, sex: Sex) -> User {
        User { id, name: name.to_string(), sex }
    }

    fn cat(id: CategoryId, title: &str, owner_id: UserId) -> Category {
        Category { id, title: title.to_string(), icon: "🍏".to_string(), owner_id }
    }

    fn prod(id: ProductId, name: &str, category_id: CategoryId) -> Product {
        Product { id, name: name.to_string(), category_id }
    }

    #[test]
    fn enrich_resolves_category_and_user() {
        let catalog = Catalog {
            users: vec![user(100, "Max", Sex::Male)],
            categories: vec![cat(10, "Fruits", 100)],
            products: vec![prod(1, "Apple", 10)],
        };
        let enriched = catalog.enrich();
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].category.as_ref().map(|c| c.title.as_str()), Some("Fruits"));
        assert_eq!(enriched[0].user.as_ref().map(|u| u.name.as_str()), Some("Max"));
    }

    #[test]
    fn enrich_preserves_product_order() {
        let catalog = Catalog {
            users: vec![user(1, "Roma", Sex::Male)],
            categories: vec![cat(1, "Grocery", 1)],
            products: vec![prod(3, "Milk", 1), prod(1, "Bread", 1), prod(2, "Garlic", 1)],
        };
        let ids: Vec<_> = catalog.enrich().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn unknown_category_propagates_null_to_user() {
        let catalog = Catalog {
            users: vec![user(100, "Max", Sex::Male)],
            categories: vec![cat(10, "Fruits", 100)],
            products: vec![prod(1, "Apple", 99)],
        };
        let enriched = catalog.enrich();
        assert!(enriched[0].category.is_none());
        assert!(enriched[0].user.is_none());
    }

    #[test]
    fn unknown_owner_leaves_category_resolved() {
        let catalog = Catalog {
            users: vec![user(100, "Max", Sex::Male)],
            categories: vec![cat(10, "Fruits", 999)],
            products: vec![prod(1, "Apple", 10)],
        };
        let enriched = catalog.enrich();
        assert!(enriched[0].category.is_some());
        assert!(enriched[0].user.is_none());
    }

    #[test]
    fn collections_parse_camel_case() {
        let catalog: Catalog = serde_json::from_str(
            r#"{
                "users": [{ "id": 1, "name": "Anna", "sex": "f" }],
                "categories": [{ "id": 2, "title": "Drinks", "icon": "🍷", "ownerId": 1 }],
                "products": [{ "id": 3, "name": "Tea", "categoryId": 2 }]
            }"#,
        )
        .unwrap();
        assert_eq!(catalog.categories[0].owner_id, 1);
        assert_eq!(catalog.products[0].category_id, 2);
        assert_eq!(catalog.users[0].sex, Sex::Female);
    }
}
