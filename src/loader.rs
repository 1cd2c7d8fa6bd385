use crate::types::{RawRow, SaleRecord, UNRATED_LABEL};
use crate::util::{month_year_label, parse_date_safe, parse_f64_safe, parse_rating_safe};
use anyhow::{Context, Result};
use chrono::Datelike;
use csv::ReaderBuilder;
use tracing::debug;

/// What happened during the one-time load, for the startup diagnostics
/// line. Coerced fields are counted, not treated as failures.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub coerced_dates: usize,
    pub unrated: usize,
    pub missing_delivery: usize,
}

/// Trim a raw categorical cell; blank cells become `None` so they stay
/// out of the group-by keys.
fn clean_category(s: Option<String>) -> Option<String> {
    let s = s?.trim().to_string();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Derive the normalized record for one raw row.
///
/// The only mandatory field is the net total: every KPI aggregates it, so
/// a row without one is unusable and the caller skips it. Everything else
/// is coerced — a bad date keeps the row but leaves the calendar fields
/// empty, a missing rating gets the sentinel label.
fn normalize_row(row: RawRow) -> Option<SaleRecord> {
    let net_total = parse_f64_safe(row.net_total.as_deref())?;

    let date = parse_date_safe(row.date.as_deref());
    let year = date.map(|d| d.year());
    let month = date.map(|d| d.month());
    let month_year = date.map(month_year_label);

    let rating = parse_rating_safe(row.rating.as_deref());
    let rating_label = match rating {
        Some(r) => r.to_string(),
        None => UNRATED_LABEL.to_string(),
    };

    Some(SaleRecord {
        date,
        year,
        month,
        month_year,
        net_total,
        category: clean_category(row.category),
        payment_method: clean_category(row.payment_method),
        region: clean_category(row.region),
        rating,
        rating_label,
        delivery_days: parse_f64_safe(row.delivery_days.as_deref()),
    })
}

/// Read and normalize the sales CSV in one pass.
///
/// Fails only when the file itself is missing or structurally unreadable;
/// per-row problems are coerced or counted and the load continues.
pub fn load_and_normalize(path: &str) -> Result<(Vec<SaleRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening sales dataset {}", path))?;

    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records: Vec<SaleRecord> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(row = total_rows, error = %e, "unreadable CSV row skipped");
                parse_errors += 1;
                continue;
            }
        };
        match normalize_row(row) {
            Some(rec) => records.push(rec),
            None => {
                debug!(row = total_rows, "row without a net total skipped");
                parse_errors += 1;
            }
        }
    }

    let coerced_dates = records.iter().filter(|r| r.date.is_none()).count();
    let unrated = records.iter().filter(|r| r.rating.is_none()).count();
    let missing_delivery = records.iter().filter(|r| r.delivery_days.is_none()).count();

    let report = LoadReport {
        total_rows,
        loaded_rows: records.len(),
        parse_errors,
        coerced_dates,
        unrated,
        missing_delivery,
    };
    debug!(?report, "sales dataset normalized");
    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_fixture(name: &str, body: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("kpi_dashboard_loader_{}_{}.csv", name, std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    const HEADER: &str =
        "Fecha,Total_Neto,Categoria_Producto,Metodo_Pago,Region,Valoracion_Cliente,Tiempo_Entrega_Dias\n";

    #[test]
    fn bad_date_is_coerced_and_row_kept() {
        let csv = format!(
            "{}2024-03-15,10.00,Books,Card,North,4,2\nnot-a-date,20.00,Books,Card,North,5,3\n",
            HEADER
        );
        let path = write_fixture("bad_date", &csv);
        let (records, report) = load_and_normalize(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(report.total_rows, 2);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.coerced_dates, 1);

        let bad = &records[1];
        assert!(bad.date.is_none());
        assert!(bad.year.is_none());
        assert!(bad.month.is_none());
        assert!(bad.month_year.is_none());
        assert_eq!(bad.net_total, 20.0);

        let good = &records[0];
        assert_eq!(good.year, Some(2024));
        assert_eq!(good.month, Some(3));
        assert_eq!(good.month_year.as_deref(), Some("2024-03"));
    }

    #[test]
    fn row_without_net_total_is_skipped_and_counted() {
        let csv = format!(
            "{}2024-01-01,10.00,Books,Card,North,4,2\n2024-01-02,,Books,Card,North,4,2\n",
            HEADER
        );
        let path = write_fixture("no_total", &csv);
        let (records, report) = load_and_normalize(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(report.total_rows, 2);
        assert_eq!(report.loaded_rows, 1);
        assert_eq!(report.parse_errors, 1);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn missing_rating_gets_sentinel_label() {
        let csv = format!(
            "{}2024-01-01,10.00,Books,Card,North,,2\n2024-01-02,15.00,Books,Card,North,5.0,\n",
            HEADER
        );
        let path = write_fixture("rating", &csv);
        let (records, report) = load_and_normalize(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(records[0].rating, None);
        assert_eq!(records[0].rating_label, UNRATED_LABEL);
        assert_eq!(records[1].rating, Some(5));
        assert_eq!(records[1].rating_label, "5");
        assert_eq!(records[1].delivery_days, None);
        assert_eq!(report.unrated, 1);
        assert_eq!(report.missing_delivery, 1);
    }

    #[test]
    fn blank_categoricals_become_none() {
        let csv = format!("{}2024-01-01,10.00, ,Card,,4,2\n", HEADER);
        let path = write_fixture("blank_cat", &csv);
        let (records, _) = load_and_normalize(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(records[0].category, None);
        assert_eq!(records[0].region, None);
        assert_eq!(records[0].payment_method.as_deref(), Some("Card"));
    }

    #[test]
    fn missing_file_is_a_hard_error() {
        assert!(load_and_normalize("/nonexistent/ventas.csv").is_err());
    }
}
