//! Core data models used throughout LinkKora.
//!
//! Rows arrive from loaders as loosely-typed [`RawRow`] maps. The ingestor
//! resolves them into [`Product`]s and [`Brand`]s; the search engine joins
//! those into [`MergedRecord`]s for output.

use serde::Serialize;
use std::collections::HashMap;

/// One row of a tabular source: column name → raw cell text.
pub type RawRow = HashMap<String, String>;

/// A brand table entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Brand {
    pub raw_name: String,
    /// `raw_name` with interior whitespace collapsed; what results show.
    pub display_name: String,
    /// Join key; always `normalize(raw_name)`.
    pub clean_key: String,
    pub description: String,
    pub website_link: String,
    pub social_media: String,
}

impl Brand {
    /// Website link, falling back to the social-media link when empty.
    pub fn website(&self) -> &str {
        if self.website_link.trim().is_empty() {
            &self.social_media
        } else {
            &self.website_link
        }
    }
}

/// A product row after column-alias resolution and brand tagging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub name: String,
    pub url: String,
    pub category: String,
    pub image_url: String,
    /// Price exactly as it appeared in the source, e.g. `"1,200 Tk"`.
    pub price_raw: String,
    pub description: String,
    pub brand_key: String,
}

/// A product enriched with its brand's metadata.
///
/// Serialized flat with every field as a string; absent values are `""`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub product_name: String,
    pub product_url: String,
    pub category: String,
    pub brand: String,
    pub price: String,
    pub image_url: String,
    pub description: String,
    pub brand_website: String,
    pub brand_description: String,
}
