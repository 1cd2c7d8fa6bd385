use crate::types::{
    CategorySalesRow, DeliverySummary, HistogramBinRow, MonthlySalesRow, PaymentMethodRow,
    RatingCountRow, RegionSalesRow, SaleRecord, TicketSummary,
};
use crate::util::{average, bin_values, format_number, pct};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Bucket counts for the ticket-size and delivery-time distributions.
/// Chosen for terminal width; the binning contract lives in `bin_values`.
const TICKET_BINS: usize = 12;
const DELIVERY_BINS: usize = 10;

/// Sum `net_total` per non-missing key. Rows where `key` returns `None`
/// stay out of the result entirely, so the groups partition exactly the
/// rows that carry the key.
fn sum_by_key<F>(data: &[SaleRecord], key: F) -> Vec<(String, f64)>
where
    F: Fn(&SaleRecord) -> Option<&str>,
{
    let mut map: HashMap<String, f64> = HashMap::new();
    for r in data {
        if let Some(k) = key(r) {
            *map.entry(k.to_string()).or_insert(0.0) += r.net_total;
        }
    }
    map.into_iter().collect()
}

fn to_bin_rows(bins: Vec<(f64, f64, usize)>, decimals: usize) -> Vec<HistogramBinRow> {
    bins.into_iter()
        .map(|(lo, hi, count)| HistogramBinRow {
            range: format!(
                "{} - {}",
                format_number(lo, decimals),
                format_number(hi, decimals)
            ),
            count,
            lo,
            hi,
        })
        .collect()
}

/// KPI 1: net sales summed per month, in chronological order.
///
/// The ascending sort is on the `"YYYY-MM"` label itself; zero padding
/// makes that ordering chronological across year boundaries.
pub fn sales_over_time(data: &[SaleRecord]) -> Vec<MonthlySalesRow> {
    let mut groups = sum_by_key(data, |r| r.month_year.as_deref());
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    groups
        .into_iter()
        .map(|(month_year, total)| MonthlySalesRow {
            net_sales: format_number(total, 2),
            month_year,
            total,
        })
        .collect()
}

/// KPI 2: net sales per product category, best sellers first.
pub fn sales_by_category(data: &[SaleRecord]) -> Vec<CategorySalesRow> {
    let mut groups = sum_by_key(data, |r| r.category.as_deref());
    groups.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    groups
        .into_iter()
        .map(|(category, total)| CategorySalesRow {
            net_sales: format_number(total, 2),
            category,
            total,
        })
        .collect()
}

/// KPI 3: mean ticket over every record (zero and negative totals count
/// too), with the full ticket-size distribution behind it.
pub fn ticket_summary(data: &[SaleRecord]) -> TicketSummary {
    let totals: Vec<f64> = data.iter().map(|r| r.net_total).collect();
    TicketSummary {
        mean: average(&totals),
        bins: to_bin_rows(bin_values(&totals, TICKET_BINS), 2),
    }
}

/// KPI 4: orders per payment method with a share label.
///
/// The share denominator is the total record count, not the non-missing
/// subset, so shares only reach 100% when every row names a method.
pub fn payment_breakdown(data: &[SaleRecord]) -> Vec<PaymentMethodRow> {
    let mut map: HashMap<String, usize> = HashMap::new();
    for r in data {
        if let Some(m) = r.payment_method.as_deref() {
            *map.entry(m.to_string()).or_insert(0) += 1;
        }
    }
    let total = data.len();
    let mut rows: Vec<PaymentMethodRow> = map
        .into_iter()
        .map(|(method, count)| {
            let share_pct = pct(count, total);
            PaymentMethodRow {
                share: format!("{:.1}%", share_pct),
                method,
                count,
                share_pct,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.method.cmp(&b.method)));
    rows
}

/// KPI 5: net sales per region, strongest market first.
pub fn sales_by_region(data: &[SaleRecord]) -> Vec<RegionSalesRow> {
    let mut groups = sum_by_key(data, |r| r.region.as_deref());
    groups.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    groups
        .into_iter()
        .map(|(region, total)| RegionSalesRow {
            net_sales: format_number(total, 2),
            region,
            total,
        })
        .collect()
}

/// KPI 6: orders per rating category. The label is total, so the counts
/// across categories (sentinel included) add up to the record count.
pub fn rating_breakdown(data: &[SaleRecord]) -> Vec<RatingCountRow> {
    let mut map: HashMap<String, usize> = HashMap::new();
    for r in data {
        *map.entry(r.rating_label.clone()).or_insert(0) += 1;
    }
    let mut rows: Vec<RatingCountRow> = map
        .into_iter()
        .map(|(rating, count)| RatingCountRow { rating, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.rating.cmp(&b.rating)));
    rows
}

/// KPI 7: delivery-time distribution over the records that have one,
/// with the excluded (missing) count reported alongside.
pub fn delivery_summary(data: &[SaleRecord]) -> DeliverySummary {
    let days: Vec<f64> = data.iter().filter_map(|r| r.delivery_days).collect();
    let missing = data.len() - days.len();
    DeliverySummary {
        bins: to_bin_rows(bin_values(&days, DELIVERY_BINS), 1),
        binned: days.len(),
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNRATED_LABEL;
    use chrono::NaiveDate;
    use crate::util::month_year_label;

    fn sale(date: &str, net_total: f64) -> SaleRecord {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok();
        SaleRecord {
            date,
            year: date.map(|d| chrono::Datelike::year(&d)),
            month: date.map(|d| chrono::Datelike::month(&d)),
            month_year: date.map(month_year_label),
            net_total,
            category: Some("Books".to_string()),
            payment_method: Some("Card".to_string()),
            region: Some("North".to_string()),
            rating: Some(4),
            rating_label: "4".to_string(),
            delivery_days: Some(3.0),
        }
    }

    fn unrated(mut r: SaleRecord) -> SaleRecord {
        r.rating = None;
        r.rating_label = UNRATED_LABEL.to_string();
        r
    }

    #[test]
    fn monthly_sales_are_chronological() {
        let data = vec![
            sale("2024-02-10", 5.0),
            sale("2023-12-01", 7.0),
            sale("2024-02-20", 3.0),
            sale("2023-09-09", 1.0),
        ];
        let rows = sales_over_time(&data);
        let months: Vec<&str> = rows.iter().map(|r| r.month_year.as_str()).collect();
        assert_eq!(months, vec!["2023-09", "2023-12", "2024-02"]);
        assert_eq!(rows[2].total, 8.0);
    }

    #[test]
    fn unparsed_dates_stay_out_of_the_time_series() {
        let data = vec![sale("2024-01-01", 5.0), sale("bogus", 7.0)];
        let rows = sales_over_time(&data);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total, 5.0);
    }

    #[test]
    fn category_groups_partition_the_non_missing_total() {
        let mut a = sale("2024-01-01", 10.0);
        a.category = Some("Books".to_string());
        let mut b = sale("2024-01-02", 20.0);
        b.category = Some("Games".to_string());
        let mut c = sale("2024-01-03", 30.0);
        c.category = Some("Books".to_string());
        let mut d = sale("2024-01-04", 40.0);
        d.category = None;
        let data = vec![a, b, c, d];

        let rows = sales_by_category(&data);
        let grouped: f64 = rows.iter().map(|r| r.total).sum();
        let non_missing: f64 = data
            .iter()
            .filter(|r| r.category.is_some())
            .map(|r| r.net_total)
            .sum();
        assert_eq!(grouped, non_missing);
        // Best seller first; no synthesized zero-count groups.
        assert_eq!(rows[0].category, "Books");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn ticket_mean_over_three_known_totals() {
        let data = vec![
            sale("2024-01-01", 10.0),
            sale("2024-01-02", 20.0),
            sale("2024-01-03", 30.0),
        ];
        let summary = ticket_summary(&data);
        assert_eq!(summary.mean, 20.0);
        let binned: usize = summary.bins.iter().map(|b| b.count).sum();
        assert_eq!(binned, 3);
    }

    #[test]
    fn ticket_mean_includes_zero_and_negative_totals() {
        let data = vec![sale("2024-01-01", -10.0), sale("2024-01-02", 0.0), sale("2024-01-03", 40.0)];
        assert_eq!(ticket_summary(&data).mean, 10.0);
    }

    #[test]
    fn payment_shares_sum_to_100_when_nothing_is_missing() {
        let mut data = Vec::new();
        for _ in 0..3 {
            data.push(sale("2024-01-01", 1.0));
        }
        let mut transfer = sale("2024-01-02", 1.0);
        transfer.payment_method = Some("Transfer".to_string());
        data.push(transfer);

        let rows = payment_breakdown(&data);
        let total_pct: f64 = rows.iter().map(|r| r.share_pct).sum();
        assert!((total_pct - 100.0).abs() < 1e-9);
        assert_eq!(rows[0].method, "Card");
        assert_eq!(rows[0].share, "75.0%");
    }

    #[test]
    fn payment_share_denominator_is_the_full_record_count() {
        let mut missing = sale("2024-01-01", 1.0);
        missing.payment_method = None;
        let data = vec![sale("2024-01-02", 1.0), missing];

        let rows = payment_breakdown(&data);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].share_pct, 50.0);
    }

    #[test]
    fn rating_counts_are_total_including_the_sentinel() {
        let data = vec![
            sale("2024-01-01", 1.0),
            sale("2024-01-02", 1.0),
            unrated(sale("2024-01-03", 1.0)),
        ];
        let rows = rating_breakdown(&data);
        let counted: usize = rows.iter().map(|r| r.count).sum();
        assert_eq!(counted, data.len());
        assert!(rows.iter().any(|r| r.rating == UNRATED_LABEL && r.count == 1));
    }

    #[test]
    fn delivery_histogram_excludes_missing_and_accounts_for_them() {
        let mut no_delivery = sale("2024-01-01", 1.0);
        no_delivery.delivery_days = None;
        let mut slow = sale("2024-01-02", 1.0);
        slow.delivery_days = Some(9.0);
        let data = vec![sale("2024-01-03", 1.0), slow, no_delivery];

        let summary = delivery_summary(&data);
        assert_eq!(summary.missing, 1);
        assert_eq!(summary.binned, 2);
        let binned: usize = summary.bins.iter().map(|b| b.count).sum();
        assert_eq!(summary.missing + binned, data.len());
    }

    #[test]
    fn empty_table_produces_empty_results() {
        let data: Vec<SaleRecord> = Vec::new();
        assert!(sales_over_time(&data).is_empty());
        assert!(sales_by_category(&data).is_empty());
        assert!(payment_breakdown(&data).is_empty());
        assert!(rating_breakdown(&data).is_empty());
        assert_eq!(ticket_summary(&data).mean, 0.0);
        let delivery = delivery_summary(&data);
        assert!(delivery.bins.is_empty());
        assert_eq!(delivery.missing, 0);
    }
}
