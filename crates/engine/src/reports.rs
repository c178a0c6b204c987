use std::collections::HashMap;

use serde::Serialize;

use stockledger_catalog::{CatalogReader, ProductRecord, category_path};
use stockledger_core::{LocationId, ProductId};
use stockledger_ledger::StockPosition;

/// One line of the low-stock report: an active product whose availability is
/// at or below its reorder point at some location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockRow {
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub location: LocationId,
    pub quantity_available: i64,
    pub reorder_point: i64,
    pub minimum_stock: i64,
}

/// One line of the inventory summary: current stock for an active product at
/// one location, joined with catalog master data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    /// Full category path, e.g. `"Electronics > Computers"`.
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub location: LocationId,
    pub quantity_on_hand: i64,
    pub quantity_reserved: i64,
    pub quantity_available: i64,
    pub unit_cost: Option<u64>,
    pub selling_price: Option<u64>,
    /// `available × selling_price`, floored at zero stock, 0 when unpriced.
    pub total_value: u64,
}

fn by_product(positions: &[StockPosition]) -> HashMap<ProductId, Vec<&StockPosition>> {
    let mut grouped: HashMap<ProductId, Vec<&StockPosition>> = HashMap::new();
    for position in positions {
        grouped.entry(position.product_id).or_default().push(position);
    }
    grouped
}

/// Build the low-stock report from a positions snapshot.
///
/// A product with no position at all is, by definition, understocked: it
/// shows up with availability 0 at the canonical location.
pub(crate) fn low_stock(
    catalog: &impl CatalogReader,
    positions: &[StockPosition],
) -> Vec<LowStockRow> {
    let grouped = by_product(positions);
    let mut rows = Vec::new();

    for product in catalog.active_products() {
        match grouped.get(&product.id) {
            Some(stocked) => {
                for position in stocked {
                    if position.available() <= product.reorder_point {
                        rows.push(LowStockRow {
                            product_id: product.id,
                            sku: product.sku.clone(),
                            name: product.name.clone(),
                            location: position.location.clone(),
                            quantity_available: position.available(),
                            reorder_point: product.reorder_point,
                            minimum_stock: product.minimum_stock,
                        });
                    }
                }
            }
            None => {
                if 0 <= product.reorder_point {
                    rows.push(LowStockRow {
                        product_id: product.id,
                        sku: product.sku.clone(),
                        name: product.name.clone(),
                        location: LocationId::main(),
                        quantity_available: 0,
                        reorder_point: product.reorder_point,
                        minimum_stock: product.minimum_stock,
                    });
                }
            }
        }
    }

    // Lowest availability first; sku/location only to keep output stable.
    rows.sort_by(|a, b| {
        a.quantity_available
            .cmp(&b.quantity_available)
            .then_with(|| a.sku.cmp(&b.sku))
            .then_with(|| a.location.cmp(&b.location))
    });
    rows
}

fn summary_row(
    catalog: &impl CatalogReader,
    product: &ProductRecord,
    position: &StockPosition,
) -> SummaryRow {
    let available = position.available();
    let sellable = available.max(0) as u64;
    SummaryRow {
        product_id: product.id,
        sku: product.sku.clone(),
        name: product.name.clone(),
        category: product.category_id.and_then(|id| category_path(catalog, id)),
        supplier: product
            .supplier_id
            .and_then(|id| catalog.supplier(id))
            .map(|s| s.name),
        location: position.location.clone(),
        quantity_on_hand: position.quantity_on_hand,
        quantity_reserved: position.quantity_reserved,
        quantity_available: available,
        unit_cost: product.unit_cost,
        selling_price: product.selling_price,
        total_value: sellable.saturating_mul(product.selling_price.unwrap_or(0)),
    }
}

/// Build the inventory summary from a positions snapshot.
pub(crate) fn inventory_summary(
    catalog: &impl CatalogReader,
    positions: &[StockPosition],
) -> Vec<SummaryRow> {
    let grouped = by_product(positions);
    let mut rows = Vec::new();

    for product in catalog.active_products() {
        match grouped.get(&product.id) {
            Some(stocked) => {
                for position in stocked {
                    rows.push(summary_row(catalog, &product, position));
                }
            }
            None => {
                // Never-stocked products still get a zero row rather than
                // disappearing from the summary.
                let zero = StockPosition::zero(product.id, LocationId::main());
                rows.push(summary_row(catalog, &product, &zero));
            }
        }
    }

    rows.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.sku.cmp(&b.sku))
            .then_with(|| a.location.cmp(&b.location))
    });
    rows
}
