//! Invoice Model
//!
//! An invoice is an append-only sales ledger entry. Amounts are exact
//! decimals so the arithmetic invariants hold with `==`:
//!
//! - `item.total == item.price × item.quantity`
//! - `subtotal == Σ item.total`
//! - `total == subtotal − discount`
//!
//! Amount arithmetic is checked: an amount that does not fit a `Decimal`
//! yields `None` instead of panicking.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Product;
use crate::types::{Quantity, Timestamp};

/// 支付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

/// Invoice line with the product frozen at sale time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub product_id: String,
    pub product: Product,
    pub quantity: Quantity,
    /// Unit price
    pub price: Decimal,
    /// `price × quantity`
    pub total: Decimal,
}

impl InvoiceItem {
    /// Build a line from a product snapshot; the line total is derived, never supplied.
    ///
    /// `None` when the line total overflows.
    pub fn new(product: Product, quantity: Quantity, price: Decimal) -> Option<Self> {
        Some(Self {
            product_id: product.id.clone(),
            total: line_total(price, quantity)?,
            product,
            quantity,
            price,
        })
    }

    /// Margin of this line against the snapshot purchase price
    pub fn profit(&self) -> Decimal {
        (self.price - self.product.purchase_price) * Decimal::from(self.quantity)
    }
}

/// Invoice entity (immutable once created)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub items: Vec<InvoiceItem>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    pub created_at: Timestamp,
}

impl Invoice {
    /// Assemble an invoice, deriving subtotal and total from the lines.
    ///
    /// `None` when the subtotal or total overflows.
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        id: String,
        items: Vec<InvoiceItem>,
        discount: Decimal,
        payment_method: PaymentMethod,
        customer_name: Option<String>,
        customer_phone: Option<String>,
        created_at: Timestamp,
    ) -> Option<Self> {
        let subtotal = subtotal_of(&items)?;
        Some(Self {
            id,
            items,
            subtotal,
            discount,
            total: subtotal.checked_sub(discount)?,
            payment_method,
            customer_name,
            customer_phone,
            created_at,
        })
    }

    /// Check every arithmetic invariant exactly.
    pub fn is_consistent(&self) -> bool {
        self.items
            .iter()
            .all(|item| line_total(item.price, item.quantity) == Some(item.total))
            && subtotal_of(&self.items) == Some(self.subtotal)
            && self.subtotal.checked_sub(self.discount) == Some(self.total)
    }

    /// Find the line for a product
    pub fn line_for(&self, product_id: &str) -> Option<&InvoiceItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    pub fn item_count(&self) -> Quantity {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Gross margin of the invoice (discount not deducted, as on the sales report)
    pub fn profit(&self) -> Decimal {
        self.items.iter().map(InvoiceItem::profit).sum()
    }
}

/// `price × quantity`, `None` on overflow
pub fn line_total(price: Decimal, quantity: Quantity) -> Option<Decimal> {
    price.checked_mul(Decimal::from(quantity))
}

/// `Σ item.total`, `None` on overflow
pub fn subtotal_of(items: &[InvoiceItem]) -> Option<Decimal> {
    sum_amounts(items.iter().map(|item| item.total))
}

/// Checked sum of amounts
pub fn sum_amounts(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn snapshot(id: usize) -> Product {
        Product {
            id: id.to_string(),
            name: format!("P{}", id),
            barcode: format!("{:013}", id),
            purchase_price: Decimal::ZERO,
            sale_price: Decimal::ZERO,
            quantity: 0,
            category: String::new(),
            description: None,
            image: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn line_strategy() -> impl Strategy<Value = (i64, u32, Quantity)> {
        // price in cents with 0..=2 decimal places, quantity 1..=999
        (0i64..10_000_000, 0u32..=2, 1 as Quantity..=999)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn invoice_arithmetic_is_exact(
            lines in prop::collection::vec(line_strategy(), 1..12),
            discount_cents in 0i64..1_000_000,
        ) {
            let items: Vec<InvoiceItem> = lines
                .iter()
                .enumerate()
                .map(|(i, (mantissa, scale, qty))| {
                    InvoiceItem::new(snapshot(i), *qty, Decimal::new(*mantissa, *scale)).unwrap()
                })
                .collect();
            let discount = Decimal::new(discount_cents, 2);
            let invoice = Invoice::assemble(
                "p".to_string(),
                items.clone(),
                discount,
                PaymentMethod::Cash,
                None,
                None,
                0,
            )
            .unwrap();

            prop_assert!(invoice.is_consistent());
            let expected: Decimal = lines
                .iter()
                .map(|(m, s, q)| Decimal::new(*m, *s) * Decimal::from(*q))
                .sum();
            prop_assert_eq!(invoice.subtotal, expected);
            prop_assert_eq!(invoice.total, expected - discount);
        }
    }
}
