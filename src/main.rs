// Entry point and interactive dashboard flow.
//
// Startup loads and normalizes the sales CSV exactly once (a missing or
// unreadable file aborts before any view renders). The menu then serves
// the seven KPI views; each selection re-runs one aggregation against
// the in-memory table and prints a table, a bar chart, and the view's
// fixed commentary.
use anyhow::Result;
use kpi_dashboard::types::SaleRecord;
use kpi_dashboard::util::{format_int, format_number};
use kpi_dashboard::{loader, output, reports};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DATA_PATH: &str = "ventas_ecommerce_10000.csv";

// The table is loaded once and read-only afterwards; the mutex is only
// held long enough to clone a handle out for the selected view.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Vec<SaleRecord>>,
}

/// Read a single line of input after printing the common "Select KPI:" prompt.
fn read_choice() -> String {
    print!("Select KPI: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the KPI menu after a view.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to KPI menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Load the dataset into `APP_STATE`, printing the coercion diagnostics.
fn load_dataset() -> Result<()> {
    let (data, report) = loader::load_and_normalize(DATA_PATH)?;
    println!(
        "Processing dataset... ({} rows read, {} loaded)",
        format_int(report.total_rows as i64),
        format_int(report.loaded_rows as i64)
    );
    if report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse errors.",
            format_int(report.parse_errors as i64)
        );
    }
    println!(
        "Info: {} invalid dates coerced, {} orders unrated, {} without delivery data.\n",
        format_int(report.coerced_dates as i64),
        format_int(report.unrated as i64),
        format_int(report.missing_delivery as i64)
    );
    let mut state = APP_STATE.lock().unwrap();
    state.data = Some(data);
    Ok(())
}

fn current_data() -> Option<Vec<SaleRecord>> {
    let state = APP_STATE.lock().unwrap();
    state.data.clone()
}

fn view_sales_evolution(data: &[SaleRecord]) {
    output::section_header("KPI 1: Sales Evolution");
    let rows = reports::sales_over_time(data);
    output::subsection("Net sales by month");
    output::print_table(&rows);
    let items: Vec<(String, f64, String)> = rows
        .iter()
        .map(|r| (r.month_year.clone(), r.total, r.net_sales.clone()))
        .collect();
    output::bar_chart(&items);
    output::commentary(&[
        ("Context", "Tracks how the business performs over time."),
        ("Calculation", "Sum of net totals grouped by month."),
        ("Interpretation", "The series reveals demand peaks and likely campaign windows."),
        ("Insight", "Growth concentrates in specific months."),
        ("Relevance", "Feeds inventory planning, promotions, and sales forecasts."),
    ]);
}

fn view_sales_by_category(data: &[SaleRecord]) {
    output::section_header("KPI 2: Sales by Category");
    let rows = reports::sales_by_category(data);
    output::subsection("Net sales by product category");
    output::print_table(&rows);
    let items: Vec<(String, f64, String)> = rows
        .iter()
        .map(|r| (r.category.clone(), r.total, r.net_sales.clone()))
        .collect();
    output::bar_chart(&items);
    output::commentary(&[
        ("Context", "Identifies which product lines are the most profitable."),
        ("Calculation", "Sum of net totals per product category."),
        ("Interpretation", "Top categories concentrate most of the revenue."),
        ("Insight", "Revenue is heavily concentrated in one or two categories."),
        ("Relevance", "Guides catalog decisions and commercial investment."),
    ]);
}

fn view_average_ticket(data: &[SaleRecord]) {
    output::section_header("KPI 3: Average Ticket");
    let summary = reports::ticket_summary(data);
    output::metric("Average ticket (EUR)", &format_number(summary.mean, 2));
    output::subsection("Ticket size distribution");
    output::print_table(&summary.bins);
    output::histogram_chart(&summary.bins);
    let interpretation = format!(
        "The current average ticket is {} EUR.",
        format_number(summary.mean, 2)
    );
    output::commentary(&[
        ("Context", "Measures the average value of a transaction."),
        ("Calculation", "Mean of the net total over every order."),
        ("Interpretation", interpretation.as_str()),
        ("Insight", "Premium purchases pull the mean upward."),
        ("Relevance", "Useful for upselling and bundle strategies."),
    ]);
}

fn view_payment_methods(data: &[SaleRecord]) {
    output::section_header("KPI 4: Payment Methods");
    let rows = reports::payment_breakdown(data);
    output::subsection("Orders by payment method");
    output::print_table(&rows);
    let items: Vec<(String, f64, String)> = rows
        .iter()
        .map(|r| {
            (
                r.method.clone(),
                r.count as f64,
                format!("{} ({})", format_int(r.count as i64), r.share),
            )
        })
        .collect();
    output::bar_chart(&items);
    output::commentary(&[
        ("Context", "Reflects checkout experience and payment friction."),
        ("Calculation", "Orders counted per payment method, share of all orders."),
        ("Interpretation", "A single method tends to dominate checkout."),
        ("Insight", "Heavy reliance on one payment method."),
        ("Relevance", "Suggests expanding alternatives to improve conversion."),
    ]);
}

fn view_sales_by_region(data: &[SaleRecord]) {
    output::section_header("KPI 5: Sales by Region");
    let rows = reports::sales_by_region(data);
    output::subsection("Net sales by region");
    output::print_table(&rows);
    let items: Vec<(String, f64, String)> = rows
        .iter()
        .map(|r| (r.region.clone(), r.total, r.net_sales.clone()))
        .collect();
    output::bar_chart(&items);
    output::commentary(&[
        ("Context", "Detects strong markets and opportunity zones."),
        ("Calculation", "Sum of net totals per region."),
        ("Interpretation", "A few regions concentrate most of the revenue."),
        ("Insight", "The business is geographically concentrated."),
        ("Relevance", "Informs logistics, campaigns, and stock distribution."),
    ]);
}

fn view_customer_ratings(data: &[SaleRecord]) {
    output::section_header("KPI 6: Customer Ratings");
    let rows = reports::rating_breakdown(data);
    output::subsection("Orders by rating");
    output::print_table(&rows);
    let items: Vec<(String, f64, String)> = rows
        .iter()
        .map(|r| (r.rating.clone(), r.count as f64, format_int(r.count as i64)))
        .collect();
    output::bar_chart(&items);
    output::commentary(&[
        ("Context", "Measures post-purchase satisfaction and service quality."),
        ("Calculation", "Orders counted per rating category, unrated included."),
        ("Interpretation", "High ratings predominate; the unrated share stays relevant."),
        ("Insight", "Overall satisfaction is high."),
        ("Relevance", "Guides retention work and customer feedback loops."),
    ]);
}

fn view_delivery_time(data: &[SaleRecord]) {
    output::section_header("KPI 7: Delivery Time");
    let summary = reports::delivery_summary(data);
    output::subsection("Delivery time distribution (days)");
    output::print_table(&summary.bins);
    output::histogram_chart(&summary.bins);
    output::metric(
        "Orders without delivery data",
        &format_int(summary.missing as i64),
    );
    output::commentary(&[
        ("Context", "Delivery time drives satisfaction and repeat purchases."),
        ("Calculation", "Histogram of known delivery times; missing reported separately."),
        ("Interpretation", "Most deliveries concentrate within a few days."),
        ("Insight", "The spread shows room for logistics optimization."),
        ("Relevance", "Pinpoints fulfillment bottlenecks."),
    ]);
}

fn print_menu() {
    println!("Sales KPI Dashboard");
    println!("Project: ShopOnline\n");
    println!("[1] Sales evolution");
    println!("[2] Sales by category");
    println!("[3] Average ticket");
    println!("[4] Payment methods");
    println!("[5] Sales by region");
    println!("[6] Customer ratings");
    println!("[7] Delivery time");
    println!("[Q] Quit\n");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    load_dataset()?;

    loop {
        print_menu();
        let choice = read_choice();
        if choice.eq_ignore_ascii_case("q") {
            println!("Exiting the dashboard.");
            break;
        }
        let Some(data) = current_data() else {
            println!("Error: no data loaded.\n");
            continue;
        };
        match choice.as_str() {
            "1" => view_sales_evolution(&data),
            "2" => view_sales_by_category(&data),
            "3" => view_average_ticket(&data),
            "4" => view_payment_methods(&data),
            "5" => view_sales_by_region(&data),
            "6" => view_customer_ratings(&data),
            "7" => view_delivery_time(&data),
            _ => {
                println!("Invalid choice. Please enter 1-7 or Q.\n");
                continue;
            }
        }
        if !prompt_back_to_menu() {
            println!("Exiting the dashboard.");
            break;
        }
    }
    Ok(())
}
