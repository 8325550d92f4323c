//! Sales reports and dashboard figures
//!
//! Pure functions over `get_all` snapshots; nothing here writes. Dates are
//! calendar days in the given time zone (the till's local zone in
//! [`Reports`]).

use std::collections::HashMap;

use chrono::{Local, NaiveDate, TimeZone};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{Invoice, Product};
use shared::types::{Quantity, Timestamp};
use shared::util::now_millis;

use crate::db::{PosStore, StoreResult};

const TOP_PRODUCTS: usize = 10;
const RECENT_INVOICES: usize = 5;
const DASHBOARD_LOW_STOCK: usize = 10;

/// Calendar day of a millisecond timestamp in `tz`
pub fn local_date<Tz: TimeZone>(millis: Timestamp, tz: &Tz) -> Option<NaiveDate> {
    tz.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.date_naive())
}

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The last `days` days up to and including `today`
    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        Self {
            start: today - chrono::Duration::days(days),
            end: today,
        }
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesStats {
    pub total_sales: Decimal,
    pub total_invoices: usize,
    pub avg_invoice_value: Decimal,
    pub total_discount: Decimal,
    /// Σ (line price − snapshot purchase price) × quantity
    pub total_profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product: Product,
    pub quantity: Quantity,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySales {
    pub category: String,
    pub sales: Decimal,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: NaiveDate,
    pub sales: Decimal,
    pub invoices: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub period: DateRange,
    pub stats: SalesStats,
    pub top_products: Vec<ProductSales>,
    pub category_sales: Vec<CategorySales>,
    pub daily_sales: Vec<DailySales>,
    pub low_stock_products: Vec<Product>,
    pub generated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: usize,
    pub low_stock_count: usize,
    pub today_sales: Decimal,
    pub today_invoices: usize,
    pub total_revenue: Decimal,
    /// Newest first
    pub recent_invoices: Vec<Invoice>,
    pub low_stock_products: Vec<Product>,
}

pub fn sales_stats(invoices: &[&Invoice]) -> SalesStats {
    let total_sales: Decimal = invoices.iter().map(|i| i.total).sum();
    let total_invoices = invoices.len();
    let avg_invoice_value = if total_invoices > 0 {
        (total_sales / Decimal::from(total_invoices)).round_dp(2)
    } else {
        Decimal::ZERO
    };
    SalesStats {
        total_sales,
        total_invoices,
        avg_invoice_value,
        total_discount: invoices.iter().map(|i| i.discount).sum(),
        total_profit: invoices.iter().map(|i| i.profit()).sum(),
    }
}

/// Best sellers by revenue, keyed on the snapshot of the first sale seen
pub fn top_products(invoices: &[&Invoice], limit: usize) -> Vec<ProductSales> {
    let mut by_product: HashMap<&str, ProductSales> = HashMap::new();
    for item in invoices.iter().flat_map(|i| &i.items) {
        by_product
            .entry(item.product_id.as_str())
            .and_modify(|s| {
                s.quantity += item.quantity;
                s.revenue += item.total;
            })
            .or_insert_with(|| ProductSales {
                product: item.product.clone(),
                quantity: item.quantity,
                revenue: item.total,
            });
    }
    let mut sales: Vec<ProductSales> = by_product.into_values().collect();
    sales.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.product.id.cmp(&b.product.id))
    });
    sales.truncate(limit);
    sales
}

/// Sales per snapshot category, largest first
pub fn category_sales(invoices: &[&Invoice]) -> Vec<CategorySales> {
    let mut by_category: HashMap<&str, CategorySales> = HashMap::new();
    for item in invoices.iter().flat_map(|i| &i.items) {
        let entry = by_category
            .entry(item.product.category.as_str())
            .or_insert_with(|| CategorySales {
                category: item.product.category.clone(),
                sales: Decimal::ZERO,
                quantity: 0,
            });
        entry.sales += item.total;
        entry.quantity += item.quantity;
    }
    let mut sales: Vec<CategorySales> = by_category.into_values().collect();
    sales.sort_by(|a, b| b.sales.cmp(&a.sales).then_with(|| a.category.cmp(&b.category)));
    sales
}

/// Totals per day, oldest first
pub fn daily_sales<Tz: TimeZone>(invoices: &[&Invoice], tz: &Tz) -> Vec<DailySales> {
    let mut by_day: HashMap<NaiveDate, DailySales> = HashMap::new();
    for invoice in invoices {
        let Some(date) = local_date(invoice.created_at, tz) else {
            continue;
        };
        let entry = by_day.entry(date).or_insert_with(|| DailySales {
            date,
            sales: Decimal::ZERO,
            invoices: 0,
        });
        entry.sales += invoice.total;
        entry.invoices += 1;
    }
    let mut days: Vec<DailySales> = by_day.into_values().collect();
    days.sort_by_key(|d| d.date);
    days
}

pub fn low_stock(products: &[Product], threshold: Quantity) -> Vec<Product> {
    products
        .iter()
        .filter(|p| p.quantity <= threshold)
        .cloned()
        .collect()
}

pub fn build_sales_report<Tz: TimeZone>(
    invoices: &[Invoice],
    products: &[Product],
    period: DateRange,
    low_stock_threshold: Quantity,
    tz: &Tz,
) -> SalesReport {
    let in_range: Vec<&Invoice> = invoices
        .iter()
        .filter(|i| local_date(i.created_at, tz).is_some_and(|d| period.contains_date(d)))
        .collect();

    SalesReport {
        period,
        stats: sales_stats(&in_range),
        top_products: top_products(&in_range, TOP_PRODUCTS),
        category_sales: category_sales(&in_range),
        daily_sales: daily_sales(&in_range, tz),
        low_stock_products: low_stock(products, low_stock_threshold),
        generated_at: now_millis(),
    }
}

pub fn build_dashboard<Tz: TimeZone>(
    invoices: &[Invoice],
    products: &[Product],
    today: NaiveDate,
    low_stock_threshold: Quantity,
    tz: &Tz,
) -> DashboardStats {
    let todays: Vec<&Invoice> = invoices
        .iter()
        .filter(|i| local_date(i.created_at, tz).is_some_and(|d| d >= today))
        .collect();
    let low = low_stock(products, low_stock_threshold);

    let mut recent: Vec<Invoice> = invoices.to_vec();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(RECENT_INVOICES);

    DashboardStats {
        total_products: products.len(),
        low_stock_count: low.len(),
        today_sales: todays.iter().map(|i| i.total).sum(),
        today_invoices: todays.len(),
        total_revenue: invoices.iter().map(|i| i.total).sum(),
        recent_invoices: recent,
        low_stock_products: low.into_iter().take(DASHBOARD_LOW_STOCK).collect(),
    }
}

/// Report queries over the live store in the local time zone
#[derive(Debug, Clone)]
pub struct Reports {
    store: PosStore,
    low_stock_threshold: Quantity,
}

impl Reports {
    pub fn new(store: PosStore, low_stock_threshold: Quantity) -> Self {
        Self {
            store,
            low_stock_threshold,
        }
    }

    pub async fn sales_report(&self, period: DateRange) -> StoreResult<SalesReport> {
        let invoices: Vec<Invoice> = self.store.get_all().await?;
        let products: Vec<Product> = self.store.get_all().await?;
        Ok(build_sales_report(
            &invoices,
            &products,
            period,
            self.low_stock_threshold,
            &Local,
        ))
    }

    pub async fn dashboard(&self) -> StoreResult<DashboardStats> {
        let invoices: Vec<Invoice> = self.store.get_all().await?;
        let products: Vec<Product> = self.store.get_all().await?;
        let today = Local::now().date_naive();
        Ok(build_dashboard(
            &invoices,
            &products,
            today,
            self.low_stock_threshold,
            &Local,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::models::{InvoiceItem, PaymentMethod};

    const DAY_MS: i64 = 86_400_000;

    fn product(id: &str, category: &str, cost: i64, quantity: Quantity) -> Product {
        Product {
            id: id.into(),
            name: id.into(),
            barcode: id.into(),
            purchase_price: Decimal::from(cost),
            sale_price: Decimal::from(cost * 2),
            quantity,
            category: category.into(),
            description: None,
            image: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn invoice(id: &str, at: i64, lines: &[(&Product, Quantity, i64)], discount: i64) -> Invoice {
        Invoice::assemble(
            id.into(),
            lines
                .iter()
                .map(|(p, q, price)| {
                    InvoiceItem::new((*p).clone(), *q, Decimal::from(*price)).unwrap()
                })
                .collect(),
            Decimal::from(discount),
            PaymentMethod::Cash,
            None,
            None,
            at,
        )
        .unwrap()
    }

    fn date(ms: i64) -> NaiveDate {
        local_date(ms, &Utc).unwrap()
    }

    #[test]
    fn test_report_over_range() {
        let cable = product("cable", "كابلات", 50, 3);
        let buds = product("buds", "سماعات", 400, 20);
        let invoices = vec![
            invoice("a", 0, &[(&cable, 2, 100), (&buds, 1, 500)], 20),
            invoice("b", DAY_MS, &[(&buds, 2, 500)], 0),
            // Outside the range
            invoice("c", 10 * DAY_MS, &[(&cable, 9, 100)], 0),
        ];
        let products = vec![cable.clone(), buds.clone()];

        let report = build_sales_report(
            &invoices,
            &products,
            DateRange::new(date(0), date(DAY_MS)),
            5,
            &Utc,
        );

        assert_eq!(report.stats.total_invoices, 2);
        assert_eq!(report.stats.total_sales, Decimal::from(680 + 1000));
        assert_eq!(report.stats.avg_invoice_value, Decimal::from(840));
        assert_eq!(report.stats.total_discount, Decimal::from(20));
        // (100-50)*2 + (500-400)*1 + (500-400)*2
        assert_eq!(report.stats.total_profit, Decimal::from(400));

        assert_eq!(report.top_products[0].product.id, "buds");
        assert_eq!(report.top_products[0].revenue, Decimal::from(1500));
        assert_eq!(report.top_products[0].quantity, 3);

        assert_eq!(report.category_sales[0].category, "سماعات");
        assert_eq!(report.category_sales[1].sales, Decimal::from(200));

        assert_eq!(report.daily_sales.len(), 2);
        assert!(report.daily_sales[0].date < report.daily_sales[1].date);
        assert_eq!(report.daily_sales[1].invoices, 1);

        assert_eq!(report.low_stock_products.len(), 1);
        assert_eq!(report.low_stock_products[0].id, "cable");
    }

    #[test]
    fn test_empty_range() {
        let report = build_sales_report(&[], &[], DateRange::new(date(0), date(0)), 5, &Utc);
        assert_eq!(report.stats.total_invoices, 0);
        assert_eq!(report.stats.avg_invoice_value, Decimal::ZERO);
        assert!(report.top_products.is_empty());
    }

    #[test]
    fn test_top_products_limit() {
        let products: Vec<Product> = (0..12)
            .map(|i| product(&format!("p{:02}", i), "أخرى", 1, 10))
            .collect();
        let lines: Vec<(&Product, Quantity, i64)> =
            products.iter().enumerate().map(|(i, p)| (p, 1, i as i64 + 1)).collect();
        let invoices = vec![invoice("x", 0, &lines, 0)];
        let refs: Vec<&Invoice> = invoices.iter().collect();

        let top = top_products(&refs, TOP_PRODUCTS);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].product.id, "p11");
    }

    #[test]
    fn test_dashboard() {
        let cable = product("cable", "كابلات", 50, 2);
        let invoices: Vec<Invoice> = (0..7)
            .map(|i| invoice(&format!("i{}", i), i * DAY_MS, &[(&cable, 1, 100)], 0))
            .collect();

        let dash = build_dashboard(&invoices, &[cable], date(6 * DAY_MS), 5, &Utc);
        assert_eq!(dash.total_products, 1);
        assert_eq!(dash.low_stock_count, 1);
        assert_eq!(dash.today_invoices, 1);
        assert_eq!(dash.today_sales, Decimal::from(100));
        assert_eq!(dash.total_revenue, Decimal::from(700));
        assert_eq!(dash.recent_invoices.len(), 5);
        assert_eq!(dash.recent_invoices[0].id, "i6");
    }

    #[tokio::test]
    async fn test_reports_service_reads_store() {
        let store = PosStore::open_in_memory().unwrap();
        store.add(&product("p1", "بطاريات", 10, 1)).await.unwrap();
        let reports = Reports::new(store, 5);
        let dash = reports.dashboard().await.unwrap();
        assert_eq!(dash.total_products, 1);
        assert_eq!(dash.low_stock_count, 1);

        let today = Local::now().date_naive();
        let report = reports
            .sales_report(DateRange::last_days(today, 30))
            .await
            .unwrap();
        assert_eq!(report.stats.total_invoices, 0);
    }
}
