//! Source ingestion: column-alias resolution, skip rules, and brand tagging.
//!
//! Every source uses its own vocabulary for the same columns
//! (`product_link` vs `Product URL`, `product_price` vs `Price`). The
//! [`ColumnAliases`] table maps each known spelling to a [`CanonicalField`];
//! rows are resolved into a typed [`SourceRow`] and unknown columns are
//! dropped at that boundary.
//!
//! Ingestion never fails. Its result is a [`SourceOutcome`] that the caller
//! inspects and logs.

use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::CatalogError;
use crate::models::{Brand, Product, RawRow};
use crate::normalize::{display_name, normalize};

/// Canonical product fields that source columns may map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Name,
    Url,
    Category,
    ImageUrl,
    Price,
    Description,
    Brand,
}

impl CanonicalField {
    /// Fields whose absence is reported as a schema mismatch.
    ///
    /// `Brand` is optional by nature (the source name stands in) and
    /// `Description` is missing from most sheets.
    const EXPECTED: [CanonicalField; 5] = [
        CanonicalField::Name,
        CanonicalField::Url,
        CanonicalField::Category,
        CanonicalField::ImageUrl,
        CanonicalField::Price,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Name => "name",
            CanonicalField::Url => "url",
            CanonicalField::Category => "category",
            CanonicalField::ImageUrl => "image_url",
            CanonicalField::Price => "price",
            CanonicalField::Description => "description",
            CanonicalField::Brand => "brand",
        }
    }
}

const DEFAULT_ALIASES: &[(&str, CanonicalField)] = &[
    ("product name", CanonicalField::Name),
    ("product_name", CanonicalField::Name),
    ("name", CanonicalField::Name),
    ("product url", CanonicalField::Url),
    ("product_url", CanonicalField::Url),
    ("product_link", CanonicalField::Url),
    ("url", CanonicalField::Url),
    ("category", CanonicalField::Category),
    ("image url", CanonicalField::ImageUrl),
    ("image_url", CanonicalField::ImageUrl),
    ("product_image", CanonicalField::ImageUrl),
    ("image", CanonicalField::ImageUrl),
    ("price", CanonicalField::Price),
    ("product_price", CanonicalField::Price),
    ("description", CanonicalField::Description),
    ("product_description", CanonicalField::Description),
    ("brand", CanonicalField::Brand),
    ("brand_name", CanonicalField::Brand),
];

/// Column name → canonical field lookup. Keys are matched trimmed and
/// lowercased.
#[derive(Debug, Clone)]
pub struct ColumnAliases {
    map: HashMap<String, CanonicalField>,
}

impl ColumnAliases {
    pub fn new() -> Self {
        let map = DEFAULT_ALIASES
            .iter()
            .map(|(alias, field)| (alias.to_string(), *field))
            .collect();
        Self { map }
    }

    /// Default table plus `extra` entries; extras override defaults.
    pub fn with_extra<'a, I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a CanonicalField)>,
    {
        let mut aliases = Self::new();
        for (column, field) in extra {
            aliases.map.insert(column_key(column), *field);
        }
        aliases
    }

    pub fn resolve(&self, column: &str) -> Option<CanonicalField> {
        self.map.get(&column_key(column)).copied()
    }
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self::new()
    }
}

fn column_key(column: &str) -> String {
    column.trim().to_lowercase()
}

/// Sheets that never hold products (index and legend pages).
pub const DEFAULT_SKIP: &[&str] = &["brand name", "brand name 2", "Sheet7"];

/// Ingestion settings shared by every source in a load.
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub aliases: ColumnAliases,
    /// Source names (trimmed, exact match) that are never ingested.
    pub skip: HashSet<String>,
}

impl IngestSettings {
    pub fn new(aliases: ColumnAliases, skip: impl IntoIterator<Item = String>) -> Self {
        Self {
            aliases,
            skip: skip.into_iter().map(|s| s.trim().to_string()).collect(),
        }
    }

    pub fn is_skipped(&self, source_name: &str) -> bool {
        self.skip.contains(source_name.trim())
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self::new(
            ColumnAliases::new(),
            DEFAULT_SKIP.iter().map(|s| s.to_string()),
        )
    }
}

/// A raw row after alias resolution. Absent fields are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRow {
    pub name: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
}

impl SourceRow {
    pub fn resolve(row: &RawRow, aliases: &ColumnAliases) -> Self {
        let mut out = SourceRow::default();
        // Sorted so that two columns aliasing the same field resolve the
        // same way on every run.
        let mut columns: Vec<(&String, &String)> = row.iter().collect();
        columns.sort_by(|a, b| a.0.cmp(b.0));

        for (column, value) in columns {
            let Some(field) = aliases.resolve(column) else {
                continue;
            };
            let slot = match field {
                CanonicalField::Name => &mut out.name,
                CanonicalField::Url => &mut out.url,
                CanonicalField::Category => &mut out.category,
                CanonicalField::ImageUrl => &mut out.image_url,
                CanonicalField::Price => &mut out.price,
                CanonicalField::Description => &mut out.description,
                CanonicalField::Brand => &mut out.brand,
            };
            if slot.is_none() {
                *slot = Some(value.clone());
            }
        }
        out
    }

    /// Convert into a [`Product`], tagging it with a brand key.
    ///
    /// An explicit, non-empty brand column wins over the source name.
    pub fn into_product(self, source_name: &str) -> Product {
        let brand_key = match self.brand.as_deref().map(str::trim) {
            Some(brand) if !brand.is_empty() => normalize(brand),
            _ => normalize(source_name),
        };
        Product {
            name: self.name.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            image_url: self.image_url.unwrap_or_default(),
            price_raw: self.price.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            brand_key,
        }
    }
}

/// Result of ingesting one source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    /// Listed in the skip-set; rows were not looked at.
    Skipped,
    /// The source had no rows.
    Empty,
    Ingested {
        products: Vec<Product>,
        /// Missing canonical columns, one [`CatalogError::SchemaMismatch`]
        /// each.
        warnings: Vec<CatalogError>,
    },
}

impl SourceOutcome {
    pub fn product_count(&self) -> usize {
        match self {
            SourceOutcome::Ingested { products, .. } => products.len(),
            _ => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceOutcome::Skipped => "skipped",
            SourceOutcome::Empty => "empty",
            SourceOutcome::Ingested { .. } => "ok",
        }
    }
}

/// Ingest one named source.
pub fn ingest_source(source_name: &str, rows: &[RawRow], settings: &IngestSettings) -> SourceOutcome {
    if settings.is_skipped(source_name) {
        return SourceOutcome::Skipped;
    }
    if rows.is_empty() {
        return SourceOutcome::Empty;
    }

    let mut present: HashSet<CanonicalField> = HashSet::new();
    for row in rows {
        present.extend(row.keys().filter_map(|c| settings.aliases.resolve(c)));
    }
    let warnings = CanonicalField::EXPECTED
        .iter()
        .filter(|f| !present.contains(f))
        .map(|f| CatalogError::SchemaMismatch {
            source_name: source_name.to_string(),
            column: f.as_str().to_string(),
        })
        .collect();

    let products = rows
        .iter()
        .map(|row| SourceRow::resolve(row, &settings.aliases).into_product(source_name))
        .collect();

    SourceOutcome::Ingested { products, warnings }
}

// ============ Brand table ============

#[derive(Clone, Copy)]
enum BrandField {
    Name,
    Description,
    Website,
    Social,
}

fn brand_field(column: &str) -> Option<BrandField> {
    match column_key(column).as_str() {
        "brand" | "brand name" | "brand_name" | "name" => Some(BrandField::Name),
        "description" | "brand_description" => Some(BrandField::Description),
        "website link" | "website_link" | "website" => Some(BrandField::Website),
        "social media" | "social_media" | "facebook" => Some(BrandField::Social),
        _ => None,
    }
}

/// Brand table plus the clean keys that appeared more than once.
#[derive(Debug, Clone, Default)]
pub struct BrandTable {
    pub brands: Vec<Brand>,
    /// Keys whose later rows were dropped; the first row wins the join.
    pub duplicates: BTreeSet<String>,
}

/// Build the brand table, normalizing every raw brand name.
///
/// Rows with no brand name are dropped.
pub fn ingest_brands(rows: &[RawRow]) -> BrandTable {
    let mut table = BrandTable::default();
    let mut seen: HashSet<String> = HashSet::new();

    for row in rows {
        let mut columns: Vec<(&String, &String)> = row.iter().collect();
        columns.sort_by(|a, b| a.0.cmp(b.0));

        let (mut name, mut description, mut website, mut social) = (None, None, None, None);
        for (column, value) in columns {
            let slot = match brand_field(column) {
                Some(BrandField::Name) => &mut name,
                Some(BrandField::Description) => &mut description,
                Some(BrandField::Website) => &mut website,
                Some(BrandField::Social) => &mut social,
                None => continue,
            };
            if slot.is_none() {
                *slot = Some(value.trim().to_string());
            }
        }

        let raw_name: String = name.unwrap_or_default();
        let clean_key = normalize(&raw_name);
        if clean_key.is_empty() {
            continue;
        }
        if !seen.insert(clean_key.clone()) {
            table.duplicates.insert(clean_key);
            continue;
        }
        table.brands.push(Brand {
            display_name: display_name(&raw_name),
            raw_name,
            clean_key,
            description: description.unwrap_or_default(),
            website_link: website.unwrap_or_default(),
            social_media: social.unwrap_or_default(),
        });
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_aliases_map_vocabularies() {
        let aliases = ColumnAliases::new();
        assert_eq!(aliases.resolve("product_link"), Some(CanonicalField::Url));
        assert_eq!(aliases.resolve("Product URL"), Some(CanonicalField::Url));
        assert_eq!(aliases.resolve("product_price"), Some(CanonicalField::Price));
        assert_eq!(aliases.resolve(" Price "), Some(CanonicalField::Price));
        assert_eq!(aliases.resolve("stock"), None);
    }

    #[test]
    fn test_extra_aliases_override() {
        let extra: HashMap<String, CanonicalField> =
            [("Item Title".to_string(), CanonicalField::Name)].into();
        let aliases = ColumnAliases::with_extra(&extra);
        assert_eq!(aliases.resolve("item title"), Some(CanonicalField::Name));
        assert_eq!(aliases.resolve("product_name"), Some(CanonicalField::Name));
    }

    #[test]
    fn test_ingest_tags_with_source_name() {
        let rows = vec![row(&[
            ("product_name", "Red Shirt"),
            ("category", "Tops"),
            ("product_price", "1,000 Tk"),
            ("product_link", "https://a.example/red"),
            ("product_image", "https://a.example/red.jpg"),
        ])];
        let outcome = ingest_source("Brand A", &rows, &IngestSettings::default());
        let SourceOutcome::Ingested { products, warnings } = outcome else {
            panic!("expected ingested outcome");
        };
        assert!(warnings.is_empty());
        assert_eq!(products.len(), 1);
        let p = &products[0];
        assert_eq!(p.name, "Red Shirt");
        assert_eq!(p.url, "https://a.example/red");
        assert_eq!(p.image_url, "https://a.example/red.jpg");
        assert_eq!(p.price_raw, "1,000 Tk");
        assert_eq!(p.brand_key, "branda");
    }

    #[test]
    fn test_explicit_brand_column_wins() {
        let rows = vec![
            row(&[("Product Name", "Kurta"), ("brand", "Ecstasy +")]),
            row(&[("Product Name", "Panjabi"), ("brand", "  ")]),
        ];
        let outcome = ingest_source("Mixed Sheet", &rows, &IngestSettings::default());
        let SourceOutcome::Ingested { products, .. } = outcome else {
            panic!("expected ingested outcome");
        };
        assert_eq!(products[0].brand_key, "ecstasyplus");
        assert_eq!(products[1].brand_key, "mixedsheet");
    }

    #[test]
    fn test_skip_set_source_contributes_nothing() {
        let rows = vec![row(&[("Product Name", "Shirt"), ("Category", "Tops")])];
        let outcome = ingest_source(" brand name ", &rows, &IngestSettings::default());
        assert_eq!(outcome, SourceOutcome::Skipped);
        assert_eq!(outcome.product_count(), 0);
    }

    #[test]
    fn test_empty_source() {
        let outcome = ingest_source("Brand B", &[], &IngestSettings::default());
        assert_eq!(outcome, SourceOutcome::Empty);
    }

    #[test]
    fn test_missing_columns_default_and_warn() {
        let rows = vec![row(&[("Product Name", "Socks"), ("colour", "blue")])];
        let outcome = ingest_source("Brand C", &rows, &IngestSettings::default());
        let SourceOutcome::Ingested { products, warnings } = outcome else {
            panic!("expected ingested outcome");
        };
        assert_eq!(products[0].category, "");
        assert_eq!(products[0].price_raw, "");
        let missing: Vec<String> = warnings
            .iter()
            .map(|w| match w {
                CatalogError::SchemaMismatch { column, .. } => column.clone(),
                other => panic!("unexpected warning {:?}", other),
            })
            .collect();
        assert_eq!(missing, vec!["url", "category", "image_url", "price"]);
    }

    #[test]
    fn test_rows_keep_source_order() {
        let rows: Vec<RawRow> = ["a", "b", "c"]
            .iter()
            .map(|n| row(&[("name", n)]))
            .collect();
        let outcome = ingest_source("Order", &rows, &IngestSettings::default());
        let SourceOutcome::Ingested { products, .. } = outcome else {
            panic!("expected ingested outcome");
        };
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_brand_table_normalizes_and_dedups() {
        let rows = vec![
            row(&[("brand", "Brand A"), ("description", "first")]),
            row(&[("brand", "brand  a"), ("description", "second")]),
            row(&[("brand", ""), ("description", "nameless")]),
            row(&[
                ("Brand", "Ecstasy+"),
                ("website link", ""),
                ("social media", "https://fb.example/ecstasy"),
            ]),
        ];
        let table = ingest_brands(&rows);
        assert_eq!(table.brands.len(), 2);
        assert_eq!(table.brands[0].clean_key, "branda");
        assert_eq!(table.brands[0].description, "first");
        assert!(table.duplicates.contains("branda"));
        assert_eq!(table.brands[1].clean_key, "ecstasyplus");
        assert_eq!(table.brands[1].website(), "https://fb.example/ecstasy");
    }
}
