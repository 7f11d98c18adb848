//! Product document types for the search index.
//!
//! This module defines the document structure that is indexed in the search
//! engine, and the catalog record it is projected from. The index is an
//! eventually-consistent projection of the catalog store, never the source of
//! truth.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attribute keys that are allowed into the index.
///
/// Catalog records carry open-ended attribute maps; only these keys are
/// projected into the search schema so that arbitrary nested structures can
/// never destabilize the mapping.
pub const INDEXED_ATTRIBUTE_KEYS: &[&str] = &[
    "capacity",
    "color",
    "connectivity",
    "material",
    "size",
    "style",
    "warranty",
    "weight",
];

/// Returns true if the attribute key is on the indexed allow-list.
pub fn is_indexed_attribute(key: &str) -> bool {
    INDEXED_ATTRIBUTE_KEYS.contains(&key)
}

/// A scalar attribute value.
///
/// Attributes are restricted to scalars; nested structures are rejected at the
/// type level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

/// A product record as supplied by the catalog store.
///
/// This is the shape the catalog's create/update hooks hand to the document
/// synchronizer. It includes fields the index does not carry (e.g. image
/// URLs) and an unfiltered attribute map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogProduct {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub num_reviews: u32,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Image URLs; not indexed.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub sales: u64,
}

/// Document representation for the search index.
///
/// At most one document exists per catalog product id; the product id is the
/// document id in the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDocument {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    pub rating: f32,
    pub num_reviews: u32,
    pub stock: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub sales: u64,
}

impl ProductDocument {
    /// Project a catalog record into its index document.
    ///
    /// Drops non-indexed fields and filters the attribute map through the
    /// indexed-key allow-list.
    pub fn project(product: &CatalogProduct) -> Self {
        let attributes = product
            .attributes
            .iter()
            .filter(|(key, _)| is_indexed_attribute(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            price: product.price,
            original_price: product.original_price,
            discount: product.discount,
            rating: product.rating,
            num_reviews: product.num_reviews,
            stock: product.stock,
            tags: product.tags.clone(),
            attributes,
            seller_id: product.seller_id.clone(),
            created_at: product.created_at,
            updated_at: product.updated_at,
            views: product.views,
            sales: product.sales,
        }
    }

    /// Derive the completion inputs for this document: the product name plus
    /// its tags, de-duplicated case-insensitively.
    pub fn suggest_input(&self) -> Vec<String> {
        let mut seen = Vec::new();
        let mut input = Vec::with_capacity(1 + self.tags.len());
        for candidate in std::iter::once(&self.name).chain(self.tags.iter()) {
            let folded = candidate.trim().to_lowercase();
            if folded.is_empty() || seen.contains(&folded) {
                continue;
            }
            seen.push(folded);
            input.push(candidate.trim().to_string());
        }
        input
    }

    /// Validate the document invariants.
    ///
    /// Returns an error message if validation fails. Malformed documents are
    /// rejected before any round trip to the backend.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Product id cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("Product name cannot be empty".to_string());
        }
        if self.price < 0.0 {
            return Err("Price cannot be negative".to_string());
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err("Rating must be between 0 and 5".to_string());
        }
        Ok(())
    }
}

impl From<&CatalogProduct> for ProductDocument {
    fn from(product: &CatalogProduct) -> Self {
        Self::project(product)
    }
}
