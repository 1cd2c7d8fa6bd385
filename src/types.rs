use chrono::NaiveDate;
use serde::Deserialize;
use tabled::Tabled;

/// One CSV row as shipped in the export. Every field is optional text;
/// typing happens in the loader.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Fecha")]
    pub date: Option<String>,
    #[serde(rename = "Total_Neto")]
    pub net_total: Option<String>,
    #[serde(rename = "Categoria_Producto")]
    pub category: Option<String>,
    #[serde(rename = "Metodo_Pago")]
    pub payment_method: Option<String>,
    #[serde(rename = "Region")]
    pub region: Option<String>,
    #[serde(rename = "Valoracion_Cliente")]
    pub rating: Option<String>,
    #[serde(rename = "Tiempo_Entrega_Dias")]
    pub delivery_days: Option<String>,
}

/// Label substituted for a missing customer rating. Counting it as its
/// own category keeps the rating breakdown total over all records.
pub const UNRATED_LABEL: &str = "Unrated";

/// A normalized sale. Immutable once the loader has produced it.
///
/// The calendar fields are derived from `date` and are `None` exactly
/// when the source date failed to parse; the record itself is kept.
#[derive(Debug, Clone)]
pub struct SaleRecord {
    pub date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Zero-padded `"YYYY-MM"`; lexicographic order is chronological.
    pub month_year: Option<String>,
    pub net_total: f64,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub region: Option<String>,
    pub rating: Option<u8>,
    pub rating_label: String,
    pub delivery_days: Option<f64>,
}

#[derive(Debug, Tabled, Clone)]
pub struct MonthlySalesRow {
    #[tabled(rename = "Month")]
    pub month_year: String,
    #[tabled(rename = "NetSales")]
    pub net_sales: String,
    #[tabled(skip)]
    pub total: f64,
}

#[derive(Debug, Tabled, Clone)]
pub struct CategorySalesRow {
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "NetSales")]
    pub net_sales: String,
    #[tabled(skip)]
    pub total: f64,
}

#[derive(Debug, Tabled, Clone)]
pub struct RegionSalesRow {
    #[tabled(rename = "Region")]
    pub region: String,
    #[tabled(rename = "NetSales")]
    pub net_sales: String,
    #[tabled(skip)]
    pub total: f64,
}

#[derive(Debug, Tabled, Clone)]
pub struct PaymentMethodRow {
    #[tabled(rename = "Method")]
    pub method: String,
    #[tabled(rename = "Orders")]
    pub count: usize,
    #[tabled(rename = "Share")]
    pub share: String,
    #[tabled(skip)]
    pub share_pct: f64,
}

#[derive(Debug, Tabled, Clone)]
pub struct RatingCountRow {
    #[tabled(rename = "Rating")]
    pub rating: String,
    #[tabled(rename = "Orders")]
    pub count: usize,
}

/// One equal-width histogram bucket, shared by the ticket-size and
/// delivery-time distributions.
#[derive(Debug, Tabled, Clone)]
pub struct HistogramBinRow {
    #[tabled(rename = "Range")]
    pub range: String,
    #[tabled(rename = "Orders")]
    pub count: usize,
    #[tabled(skip)]
    pub lo: f64,
    #[tabled(skip)]
    pub hi: f64,
}

/// Average-ticket KPI result: the headline mean plus the distribution
/// behind it.
#[derive(Debug, Clone)]
pub struct TicketSummary {
    pub mean: f64,
    pub bins: Vec<HistogramBinRow>,
}

/// Delivery-time KPI result. `missing` counts the records excluded from
/// the histogram for lacking a delivery time.
#[derive(Debug, Clone)]
pub struct DeliverySummary {
    pub bins: Vec<HistogramBinRow>,
    pub binned: usize,
    pub missing: usize,
}
