use std::fmt;

use serde::Serialize;

use super::{CatalogError, Cents, format_cents};

pub type ProductId = u32;

/// Stock quantities. Signed so that bad input can be reported instead of wrapping.
pub type Quantity = i64;

/// Capability interface of anything with a stock level.
pub trait StockActions {
    /// Increase stock by `quantity`. Fails if `quantity <= 0`.
    fn add_stock(&mut self, quantity: Quantity) -> Result<Quantity, CatalogError>;

    /// Decrease stock by `quantity`. Fails if `quantity <= 0` or more than is on hand.
    fn remove_stock(&mut self, quantity: Quantity) -> Result<Quantity, CatalogError>;

    fn view_stock(&self) -> StockLevel;
}

/// Attributes that only some kinds of products carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemVariant {
    Electronic { brand: String, price_cents: Cents },
    General,
}

impl ItemVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemVariant::Electronic { .. } => "electronic",
            ItemVariant::General => "general",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockItem {
    pub id: ProductId,
    pub name: String,
    quantity: Quantity,
    pub variant: ItemVariant,
}

/// Read-only projection of an item's stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockLevel {
    pub id: ProductId,
    pub name: String,
    pub quantity: Quantity,
}

/// Read-only projection of an item including its variant attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetails {
    pub id: ProductId,
    pub name: String,
    pub quantity: Quantity,
    #[serde(flatten)]
    pub variant: ItemVariant,
}

impl StockItem {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        quantity: Quantity,
        variant: ItemVariant,
    ) -> Result<Self, CatalogError> {
        if quantity < 0 {
            return Err(CatalogError::InvalidQuantity(quantity));
        }
        Ok(Self {
            id,
            name: name.into(),
            quantity,
            variant,
        })
    }

    pub fn electronic(
        id: ProductId,
        name: impl Into<String>,
        quantity: Quantity,
        brand: impl Into<String>,
        price_cents: Cents,
    ) -> Result<Self, CatalogError> {
        Self::new(
            id,
            name,
            quantity,
            ItemVariant::Electronic {
                brand: brand.into(),
                price_cents,
            },
        )
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn details(&self) -> ProductDetails {
        ProductDetails {
            id: self.id,
            name: self.name.clone(),
            quantity: self.quantity,
            variant: self.variant.clone(),
        }
    }
}

impl StockActions for StockItem {
    fn add_stock(&mut self, quantity: Quantity) -> Result<Quantity, CatalogError> {
        if quantity <= 0 {
            return Err(CatalogError::InvalidQuantity(quantity));
        }
        self.quantity = self
            .quantity
            .checked_add(quantity)
            .ok_or(CatalogError::InvalidQuantity(quantity))?;
        Ok(self.quantity)
    }

    fn remove_stock(&mut self, quantity: Quantity) -> Result<Quantity, CatalogError> {
        if quantity <= 0 {
            return Err(CatalogError::InvalidQuantity(quantity));
        }
        if quantity > self.quantity {
            return Err(CatalogError::InsufficientStock {
                id: self.id,
                available: self.quantity,
                requested: quantity,
            });
        }
        self.quantity -= quantity;
        Ok(self.quantity)
    }

    fn view_stock(&self) -> StockLevel {
        StockLevel {
            id: self.id,
            name: self.name.clone(),
            quantity: self.quantity,
        }
    }
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Product: {} (ID: {})", self.name, self.id)?;
        write!(f, "Stock Quantity: {}", self.quantity)
    }
}

impl fmt::Display for ProductDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            ItemVariant::Electronic { brand, price_cents } => {
                writeln!(f, "Electronic Item Details:")?;
                writeln!(f, "Name: {}", self.name)?;
                writeln!(f, "Brand: {}", brand)?;
                writeln!(f, "Price: ${}", format_cents(*price_cents))?;
            }
            ItemVariant::General => {
                writeln!(f, "Item Details:")?;
                writeln!(f, "Name: {}", self.name)?;
            }
        }
        write!(f, "Stock Quantity: {}", self.quantity)
    }
}
