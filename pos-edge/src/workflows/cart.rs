//! Sales cart
//!
//! Building the cart is the target-selection phase of checkout. Every change
//! re-reads the live product, so a line can never ask for more than is in
//! stock at the moment it was changed. Rejections never write anything.

use rust_decimal::Decimal;
use shared::models::{Product, line_total, sum_amounts};
use shared::types::Quantity;

use super::error::{ValidationError, WorkflowError, WorkflowResult};
use super::phase::WorkflowPhase;
use crate::db::PosStore;

const PHASE: WorkflowPhase = WorkflowPhase::SelectingTarget;

/// One cart line; `product` is refreshed from the store on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: String,
    pub product: Product,
    pub quantity: Quantity,
    /// Sale price when the line was first added
    pub unit_price: Decimal,
}

impl CartLine {
    /// `None` when the amount does not fit a `Decimal`
    pub fn total(&self) -> Option<Decimal> {
        line_total(self.unit_price, self.quantity)
    }
}

/// Sales cart bound to a store
#[derive(Debug, Clone)]
pub struct Cart {
    store: PosStore,
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(store: PosStore) -> Self {
        Self {
            store,
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// `Σ unit_price × quantity`, `None` on overflow
    pub fn subtotal(&self) -> Option<Decimal> {
        self.lines
            .iter()
            .map(CartLine::total)
            .collect::<Option<Vec<_>>>()
            .and_then(sum_amounts)
    }

    /// Total units across lines
    pub fn item_count(&self) -> Quantity {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    async fn live_product(&self, product_id: &str) -> WorkflowResult<Product> {
        self.store
            .get::<Product>(product_id)
            .await
            .map_err(WorkflowError::store(PHASE))?
            .ok_or_else(|| {
                WorkflowError::rejected(PHASE, ValidationError::ProductNotFound(product_id.into()))
            })
    }

    /// Add `quantity` units, merging with an existing line.
    pub async fn add_product(
        &mut self,
        product_id: &str,
        quantity: Quantity,
    ) -> WorkflowResult<&CartLine> {
        if quantity <= 0 {
            return Err(WorkflowError::rejected(
                PHASE,
                ValidationError::InvalidQuantity(quantity),
            ));
        }
        let product = self.live_product(product_id).await?;
        self.add_live(product, quantity)
    }

    /// Resolve a scanned barcode through the unique index and add one unit.
    pub async fn add_by_barcode(&mut self, barcode: &str) -> WorkflowResult<&CartLine> {
        let product = self
            .store
            .get_by_index::<Product>("barcode", barcode)
            .await
            .map_err(WorkflowError::store(PHASE))?
            .ok_or_else(|| {
                WorkflowError::rejected(PHASE, ValidationError::ProductNotFound(barcode.into()))
            })?;
        self.add_live(product, 1)
    }

    fn add_live(&mut self, product: Product, quantity: Quantity) -> WorkflowResult<&CartLine> {
        if product.is_out_of_stock() {
            return Err(WorkflowError::rejected(
                PHASE,
                ValidationError::ProductOutOfStock(product.id),
            ));
        }

        let index = match self.lines.iter().position(|l| l.product_id == product.id) {
            Some(index) => index,
            None => {
                self.lines.push(CartLine {
                    product_id: product.id.clone(),
                    unit_price: product.sale_price,
                    product: product.clone(),
                    quantity: 0,
                });
                self.lines.len() - 1
            }
        };

        let requested = self.lines[index].quantity.saturating_add(quantity);
        if requested > product.quantity {
            if self.lines[index].quantity == 0 {
                self.lines.remove(index);
            }
            return Err(WorkflowError::rejected(
                PHASE,
                ValidationError::InsufficientStock {
                    product_id: product.id,
                    requested,
                    available: product.quantity,
                },
            ));
        }

        let line = &mut self.lines[index];
        line.quantity = requested;
        line.product = product;
        tracing::debug!(product_id = %line.product_id, quantity = line.quantity, "Cart line updated");
        Ok(&self.lines[index])
    }

    /// Set a line's quantity; `<= 0` removes the line.
    ///
    /// Returns the line, or `None` when it was removed or never existed.
    pub async fn set_quantity(
        &mut self,
        product_id: &str,
        quantity: Quantity,
    ) -> WorkflowResult<Option<&CartLine>> {
        if quantity <= 0 {
            self.remove(product_id);
            return Ok(None);
        }
        let Some(index) = self.lines.iter().position(|l| l.product_id == product_id) else {
            return Ok(None);
        };

        let product = self.live_product(product_id).await?;
        if quantity > product.quantity {
            return Err(WorkflowError::rejected(
                PHASE,
                ValidationError::InsufficientStock {
                    product_id: product.id,
                    requested: quantity,
                    available: product.quantity,
                },
            ));
        }

        let line = &mut self.lines[index];
        line.quantity = quantity;
        line.product = product;
        Ok(Some(&self.lines[index]))
    }

    /// Remove a line; returns whether it existed.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
