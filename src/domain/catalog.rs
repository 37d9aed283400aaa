use std::collections::BTreeMap;

use thiserror::Error;

use super::{ProductDetails, ProductId, Quantity, StockActions, StockItem, StockLevel};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("product {0} not found")]
    ItemNotFound(ProductId),

    #[error("quantity must be greater than 0, got {0}")]
    InvalidQuantity(Quantity),

    #[error("insufficient stock for product {id}: {available} on hand, {requested} requested")]
    InsufficientStock {
        id: ProductId,
        available: Quantity,
        requested: Quantity,
    },

    #[error("product {0} already exists")]
    DuplicateProduct(ProductId),
}

/// In-memory mapping from product id to item, ordered by id.
/// Items are added at startup and never removed.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: BTreeMap<ProductId, StockItem>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from seed items, rejecting duplicate ids.
    pub fn from_items(items: impl IntoIterator<Item = StockItem>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for item in items {
            catalog.insert(item)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, item: StockItem) -> Result<(), CatalogError> {
        if self.items.contains_key(&item.id) {
            return Err(CatalogError::DuplicateProduct(item.id));
        }
        self.items.insert(item.id, item);
        Ok(())
    }

    pub fn add_stock(&mut self, id: ProductId, quantity: Quantity) -> Result<Quantity, CatalogError> {
        self.item_mut(id)?.add_stock(quantity)
    }

    pub fn remove_stock(
        &mut self,
        id: ProductId,
        quantity: Quantity,
    ) -> Result<Quantity, CatalogError> {
        self.item_mut(id)?.remove_stock(quantity)
    }

    pub fn view_stock(&self, id: ProductId) -> Result<StockLevel, CatalogError> {
        Ok(self.item(id)?.view_stock())
    }

    pub fn view_all(&self) -> Vec<StockLevel> {
        self.items.values().map(StockItem::view_stock).collect()
    }

    pub fn product_details(&self, id: ProductId) -> Result<ProductDetails, CatalogError> {
        Ok(self.item(id)?.details())
    }

    pub fn all_details(&self) -> Vec<ProductDetails> {
        self.items.values().map(StockItem::details).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn item(&self, id: ProductId) -> Result<&StockItem, CatalogError> {
        self.items.get(&id).ok_or(CatalogError::ItemNotFound(id))
    }

    fn item_mut(&mut self, id: ProductId) -> Result<&mut StockItem, CatalogError> {
        self.items.get_mut(&id).ok_or(CatalogError::ItemNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemVariant;

    fn catalog() -> Catalog {
        Catalog::from_items([
            StockItem::electronic(1, "Laptop", 50, "Dell", 80_000).unwrap(),
            StockItem::electronic(2, "Smartphone", 100, "Samsung", 50_000).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Catalog::from_items([
            StockItem::new(1, "A", 1, ItemVariant::General).unwrap(),
            StockItem::new(1, "B", 2, ItemVariant::General).unwrap(),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateProduct(1))));
    }

    #[test]
    fn test_add_and_remove_by_id() {
        let mut catalog = catalog();
        assert_eq!(catalog.add_stock(1, 10), Ok(60));
        assert_eq!(catalog.remove_stock(2, 40), Ok(60));
        assert_eq!(catalog.view_stock(1).unwrap().quantity, 60);
        assert_eq!(catalog.view_stock(2).unwrap().quantity, 60);
    }

    #[test]
    fn test_unknown_id_leaves_catalog_unchanged() {
        let mut catalog = catalog();
        let before = catalog.view_all();

        assert_eq!(catalog.add_stock(99, 5), Err(CatalogError::ItemNotFound(99)));
        assert_eq!(
            catalog.remove_stock(99, 5),
            Err(CatalogError::ItemNotFound(99))
        );
        // Lookup happens before quantity validation
        assert_eq!(catalog.add_stock(99, 0), Err(CatalogError::ItemNotFound(99)));
        assert_eq!(catalog.view_stock(99), Err(CatalogError::ItemNotFound(99)));
        assert_eq!(
            catalog.product_details(99),
            Err(CatalogError::ItemNotFound(99))
        );

        assert_eq!(catalog.view_all(), before);
    }

    #[test]
    fn test_stock_never_goes_negative() {
        let mut catalog = catalog();
        for requested in [51, 100, 1_000] {
            assert!(matches!(
                catalog.remove_stock(1, requested),
                Err(CatalogError::InsufficientStock { .. })
            ));
        }
        assert_eq!(catalog.view_stock(1).unwrap().quantity, 50);
    }

    #[test]
    fn test_view_all_is_ordered_by_id() {
        let mut catalog = Catalog::new();
        catalog
            .insert(StockItem::new(9, "Z", 1, ItemVariant::General).unwrap())
            .unwrap();
        catalog
            .insert(StockItem::new(3, "M", 1, ItemVariant::General).unwrap())
            .unwrap();
        let ids: Vec<ProductId> = catalog.view_all().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 9]);
        assert_eq!(catalog.len(), 2);
    }
}
