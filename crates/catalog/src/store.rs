use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use stockledger_core::{CategoryId, ProductId, SupplierId};

use crate::category::Category;
use crate::product::ProductRecord;
use crate::supplier::Supplier;

/// Read-only view of the catalog, as the ledger sees it.
///
/// The ledger looks entities up by id and never mutates them. Implementations
/// back this with whatever the embedding system uses (a database, a cache, a
/// fixture map in tests).
pub trait CatalogReader: Send + Sync {
    fn product(&self, id: ProductId) -> Option<ProductRecord>;

    /// All products with `is_active = true`, in unspecified order.
    fn active_products(&self) -> Vec<ProductRecord>;

    fn category(&self, id: CategoryId) -> Option<Category>;

    fn supplier(&self, id: SupplierId) -> Option<Supplier>;
}

impl<C> CatalogReader for Arc<C>
where
    C: CatalogReader + ?Sized,
{
    fn product(&self, id: ProductId) -> Option<ProductRecord> {
        (**self).product(id)
    }

    fn active_products(&self) -> Vec<ProductRecord> {
        (**self).active_products()
    }

    fn category(&self, id: CategoryId) -> Option<Category> {
        (**self).category(id)
    }

    fn supplier(&self, id: SupplierId) -> Option<Supplier> {
        (**self).supplier(id)
    }
}

/// In-memory catalog for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<ProductId, ProductRecord>>,
    categories: RwLock<HashMap<CategoryId, Category>>,
    suppliers: RwLock<HashMap<SupplierId, Supplier>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_product(&self, product: ProductRecord) {
        if let Ok(mut products) = self.products.write() {
            products.insert(product.id, product);
        }
    }

    pub fn upsert_category(&self, category: Category) {
        if let Ok(mut categories) = self.categories.write() {
            categories.insert(category.id, category);
        }
    }

    pub fn upsert_supplier(&self, supplier: Supplier) {
        if let Ok(mut suppliers) = self.suppliers.write() {
            suppliers.insert(supplier.id, supplier);
        }
    }
}

impl CatalogReader for InMemoryCatalog {
    fn product(&self, id: ProductId) -> Option<ProductRecord> {
        let products = self.products.read().ok()?;
        products.get(&id).cloned()
    }

    fn active_products(&self) -> Vec<ProductRecord> {
        let products = match self.products.read() {
            Ok(p) => p,
            Err(_) => return vec![],
        };
        products.values().filter(|p| p.is_active).cloned().collect()
    }

    fn category(&self, id: CategoryId) -> Option<Category> {
        let categories = self.categories.read().ok()?;
        categories.get(&id).cloned()
    }

    fn supplier(&self, id: SupplierId) -> Option<Supplier> {
        let suppliers = self.suppliers.read().ok()?;
        suppliers.get(&id).cloned()
    }
}
