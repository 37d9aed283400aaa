//! Catalog seed configuration.
//!
//! The inventory starts from a fixed set of products. By default that is the
//! built-in pair below; a TOML file can replace it:
//!
//! ```toml
//! [[items]]
//! id = 1
//! name = "Laptop"
//! quantity = 50
//! brand = "Dell"
//! price = 800.00
//!
//! [[items]]
//! id = 3
//! name = "USB Cable"
//! quantity = 200
//! ```
//!
//! An item with both `brand` and `price` is an electronic item; an item with
//! neither is a general item.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::info;

use crate::domain::{
    Catalog, ItemVariant, ProductId, Quantity, StockItem, cents_from_units,
};

#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub items: Vec<SeedItem>,
}

#[derive(Debug, Deserialize)]
pub struct SeedItem {
    pub id: ProductId,
    pub name: String,
    pub quantity: Quantity,
    pub brand: Option<String>,
    pub price: Option<f64>,
}

impl SeedItem {
    fn into_stock_item(self) -> Result<StockItem> {
        let variant = match (self.brand, self.price) {
            (Some(brand), Some(price)) => {
                if !price.is_finite() || price < 0.0 {
                    bail!("Product {} has an invalid price: {}", self.id, price);
                }
                ItemVariant::Electronic {
                    brand,
                    price_cents: cents_from_units(price),
                }
            }
            (None, None) => ItemVariant::General,
            _ => bail!(
                "Product {} must set both brand and price, or neither",
                self.id
            ),
        };

        StockItem::new(self.id, self.name, self.quantity, variant)
            .with_context(|| format!("Invalid seed item {}", self.id))
    }
}

impl CatalogSeed {
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse catalog file")
    }

    pub fn into_catalog(self) -> Result<Catalog> {
        let items = self
            .items
            .into_iter()
            .map(SeedItem::into_stock_item)
            .collect::<Result<Vec<_>>>()?;
        Catalog::from_items(items).context("Invalid catalog")
    }
}

/// The products every inventory session starts with when no file is given.
pub fn default_catalog() -> Result<Catalog> {
    let items = vec![
        StockItem::electronic(1, "Laptop", 50, "Dell", 80_000)?,
        StockItem::electronic(2, "Smartphone", 100, "Samsung", 50_000)?,
    ];
    Ok(Catalog::from_items(items)?)
}

/// Load the catalog from `path`, or fall back to the built-in products.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let Some(path) = path else {
        return default_catalog();
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
    let catalog = CatalogSeed::parse(&contents)?.into_catalog()?;

    info!(path = %path.display(), products = catalog.len(), "loaded catalog");
    Ok(catalog)
}
