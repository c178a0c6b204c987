use serde::{Deserialize, Serialize};

use stockledger_core::{CategoryId, ProductId, SupplierId};

/// Catalog entry for one product.
///
/// The ledger consumes `reorder_point`, `minimum_stock`, `selling_price` and
/// `is_active`; everything else is master data carried for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    /// Stock-keeping unit, unique within the catalog.
    pub sku: String,
    pub name: String,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
    /// Availability at or below this threshold flags the product as low stock.
    pub reorder_point: i64,
    pub minimum_stock: i64,
    /// Standard cost per unit, smallest currency unit (e.g. cents).
    pub unit_cost: Option<u64>,
    /// Selling price per unit, smallest currency unit.
    pub selling_price: Option<u64>,
    pub is_active: bool,
}

impl ProductRecord {
    pub fn new(id: ProductId, sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            sku: sku.into(),
            name: name.into(),
            category_id: None,
            supplier_id: None,
            reorder_point: 0,
            minimum_stock: 0,
            unit_cost: None,
            selling_price: None,
            is_active: true,
        }
    }

    pub fn in_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn from_supplier(mut self, supplier_id: SupplierId) -> Self {
        self.supplier_id = Some(supplier_id);
        self
    }

    pub fn with_reorder_point(mut self, reorder_point: i64) -> Self {
        self.reorder_point = reorder_point;
        self
    }

    pub fn with_minimum_stock(mut self, minimum_stock: i64) -> Self {
        self.minimum_stock = minimum_stock;
        self
    }

    pub fn with_unit_cost(mut self, unit_cost: u64) -> Self {
        self.unit_cost = Some(unit_cost);
        self
    }

    pub fn with_selling_price(mut self, selling_price: u64) -> Self {
        self.selling_price = Some(selling_price);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}
