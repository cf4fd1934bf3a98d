// ListingDesk - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation
// 3. Import of a CSV into a listing store
// 4. View operations (search, conditions, sort, page, grouping) and bulk edits
// 5. Printing the page window and optional export

use clap::Parser;
use listingdesk::app::settings::JsonFileSettings;
use listingdesk::app::store::{ListingStore, MergeMode, StoreOptions};
use listingdesk::core::bulk::{AdjustmentDirection, AdjustmentKind, PriceAdjustment, Rounding, Scope};
use listingdesk::core::export::{default_export_file_name, export_csv, export_json};
use listingdesk::core::filter::{FilterCondition, Logic, Operator};
use listingdesk::core::group::GroupField;
use listingdesk::core::import::{read_csv_file, ImportDefaults};
use listingdesk::core::model::{Condition, Field, Listing};
use listingdesk::core::sort::{SortDirection, SortState};
use listingdesk::platform::config::{load_config, load_config_file, AppConfig, PlatformPaths};
use listingdesk::util::constants::{self, DEFAULT_PRICE_BINS, MAX_PRICE_BINS};
use listingdesk::util::error::{ExportError, Result};
use listingdesk::util::logging;
use std::path::{Path, PathBuf};

/// ListingDesk - bulk editor for marketplace listings.
///
/// Loads a CSV of listings, applies search, filters, sorting, and bulk
/// edits, prints the requested page, and optionally exports the result.
#[derive(Parser, Debug)]
#[command(name = "listingdesk", version, about)]
struct Cli {
    /// CSV file to load.
    path: PathBuf,

    /// Quick search: whitespace-separated terms, all must match.
    #[arg(short = 's', long)]
    search: Option<String>,

    /// Advanced condition FIELD:operator[:value][:and|or]. Repeatable.
    #[arg(short = 'f', long = "filter", value_parser = parse_condition)]
    filters: Vec<FilterCondition>,

    /// Sort column, optionally with direction: PRICE or PRICE:desc.
    #[arg(long, value_parser = parse_sort)]
    sort: Option<SortState>,

    /// Page to show (1-based).
    #[arg(long)]
    page: Option<usize>,

    /// Rows per page (10, 25, 50, 100, 250).
    #[arg(long)]
    rows: Option<usize>,

    /// Width of the hosting viewport, for the default page size.
    #[arg(long)]
    viewport_width: Option<u32>,

    /// Hide a column. Repeatable.
    #[arg(long = "hide", value_parser = parse_field)]
    hidden: Vec<Field>,

    /// Print groups by CATEGORY, CONDITION or OFFER SHIPPING instead of the page.
    #[arg(short = 'g', long, value_parser = parse_group)]
    group: Option<GroupField>,

    /// Remove rows missing TITLE, PRICE or CONDITION before anything else.
    #[arg(long)]
    remove_invalid: bool,

    /// Set a field on every row: FIELD=VALUE. Repeatable.
    #[arg(long = "set", value_parser = parse_assignment)]
    assignments: Vec<(Field, String)>,

    /// Adjust every price: +10%, -5, +2.50.
    #[arg(long, value_parser = parse_adjustment, allow_hyphen_values = true)]
    adjust_price: Option<PriceAdjustment>,

    /// Rounding for --adjust-price: none, nearest, ceil, floor.
    #[arg(long, default_value = "none", value_parser = parse_rounding)]
    rounding: Rounding,

    /// Export the full working set (.csv or .json). Pass a directory to use
    /// the default timestamped file name.
    #[arg(short = 'o', long)]
    export: Option<PathBuf>,

    /// Print summary statistics and the price distribution.
    #[arg(long)]
    summary: bool,

    /// Histogram bins for --summary.
    #[arg(long, default_value_t = DEFAULT_PRICE_BINS)]
    bins: usize,

    /// Use this config.toml instead of the platform default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let platform_paths = PlatformPaths::resolve();
    let (config, config_warnings) = match cli.config {
        Some(ref path) => load_config_file(path),
        None => load_config(&platform_paths.config_dir),
    };

    logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref().map(Path::new),
    );

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "ListingDesk starting"
    );
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    if let Err(e) = run(&cli, &config, &platform_paths) {
        tracing::error!(error = %e, "ListingDesk failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, config: &AppConfig, paths: &PlatformPaths) -> Result<()> {
    let options = StoreOptions {
        viewport_width: cli.viewport_width.unwrap_or(u32::MAX),
        narrow_viewport_width: config.narrow_viewport_width,
        rows_per_page: config.default_rows_per_page,
        import_defaults: ImportDefaults {
            category: config.default_category.clone(),
            condition: Condition::New,
        },
    };
    let backend = JsonFileSettings::in_data_dir(&paths.data_dir);
    let mut store = ListingStore::new(Vec::new(), Box::new(backend), options);

    let raw = read_csv_file(&cli.path)?;
    let imported = store.merge_import(raw, MergeMode::Replace);
    println!(
        "Imported {} listings ({} autofilled, {} rejected)",
        imported.accepted_count(),
        imported.autofilled,
        imported.rejected_count()
    );
    for rejected in &imported.rejected {
        println!("  row {}: {}", rejected.batch_index + 1, rejected.reason);
    }

    if cli.remove_invalid {
        let removed = store.remove_invalid_rows();
        println!("Removed {} rows missing required fields", removed.len());
    }

    for (field, value) in &cli.assignments {
        let changed = store.set_field(Scope::All, *field, value)?;
        println!("Set {field} on {changed} rows");
    }

    if let Some(mut adjustment) = cli.adjust_price {
        adjustment.rounding = cli.rounding;
        let changed = store.adjust_prices(Scope::All, &adjustment)?;
        println!("Adjusted {changed} prices");
    }

    for field in &cli.hidden {
        store.set_column_visible(*field, false);
    }
    if let Some(ref query) = cli.search {
        store.set_search(query.as_str());
    }
    if !cli.filters.is_empty() {
        store.set_conditions(cli.filters.clone());
    }
    if let Some(sort) = cli.sort {
        store.set_sort(sort);
    }
    if let Some(rows) = cli.rows {
        if !store.set_rows_per_page(rows) {
            eprintln!(
                "Ignoring --rows {rows}: expected one of {:?}",
                constants::ROWS_PER_PAGE_OPTIONS
            );
        }
    }
    if let Some(page) = cli.page {
        store.go_to_page(page);
    }

    match cli.group {
        Some(by) => print_groups(&store, by),
        None => print_page(&store),
    }

    if cli.summary {
        print_summary(&store, cli.bins.clamp(1, MAX_PRICE_BINS))?;
    }

    if let Some(ref target) = cli.export {
        export(&store, target, config.include_autofill_column)?;
    }

    Ok(())
}

// =============================================================================
// Output
// =============================================================================

fn print_page(store: &ListingStore) {
    let window = store.page();
    let columns = store.visible_columns();

    let header: Vec<&str> = columns.iter().map(|f| f.label()).collect();
    println!("    ID\t{}", header.join("\t"));
    for listing in window.rows() {
        let cells: Vec<String> = columns.iter().map(|&f| cell_text(listing, f)).collect();
        let marker = if store.issues(listing.id).is_empty() { ' ' } else { '!' };
        println!("{marker} {:>4}\t{}", listing.id, cells.join("\t"));
        for issue in store.issues(listing.id) {
            println!("         {issue}");
        }
    }
    println!(
        "Page {} of {} ({} rows, {} per page)",
        window.page,
        window.total_pages.max(1),
        window.total_rows,
        store.pagination().rows_per_page()
    );
}

/// Cell text with a trailing `*` on autofilled fields.
fn cell_text(listing: &Listing, field: Field) -> String {
    let text = listing.field_text(field);
    if listing.is_auto_filled(field) {
        format!("{text}*")
    } else {
        text
    }
}

fn print_groups(store: &ListingStore, by: GroupField) {
    for group in store.groups(by) {
        let label = if group.value.is_empty() { "(empty)" } else { &group.value };
        println!(
            "{label}: {} items, total {:.2}, average {:.2}",
            group.count, group.total_price, group.avg_price
        );
        for listing in &group.items {
            println!("    {:>4}  {}", listing.id, listing.title);
        }
    }
}

fn print_summary(store: &ListingStore, bins: usize) -> Result<()> {
    let report = serde_json::json!({
        "summary": store.summary(),
        "price_distribution": store.price_distribution(bins),
    });
    let text = serde_json::to_string_pretty(&report).map_err(|e| ExportError::Json {
        path: PathBuf::from("<stdout>"),
        source: e,
    })?;
    println!("{text}");
    Ok(())
}

fn export(store: &ListingStore, target: &Path, include_autofill: bool) -> Result<()> {
    let path = if target.is_dir() {
        target.join(default_export_file_name(chrono::Local::now()))
    } else {
        target.to_path_buf()
    };

    let file = std::fs::File::create(&path).map_err(|e| ExportError::Io {
        path: path.clone(),
        source: e,
    })?;
    let writer = std::io::BufWriter::new(file);
    let spec = store.export_spec(include_autofill);
    let snapshot = store.snapshot();

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let count = if is_json {
        export_json(&snapshot, &spec, writer, &path)?
    } else {
        export_csv(&snapshot, &spec, writer, &path)?
    };
    println!("Exported {count} listings to {}", path.display());
    Ok(())
}

// =============================================================================
// Argument parsers
// =============================================================================

fn parse_field(raw: &str) -> std::result::Result<Field, String> {
    Field::parse(raw).ok_or_else(|| format!("unknown column '{raw}'"))
}

fn parse_group(raw: &str) -> std::result::Result<GroupField, String> {
    let field = parse_field(raw)?;
    GroupField::from_field(field)
        .ok_or_else(|| format!("cannot group by {field}; use CATEGORY, CONDITION or OFFER SHIPPING"))
}

fn parse_sort(raw: &str) -> std::result::Result<SortState, String> {
    let (name, direction) = match raw.rsplit_once(':') {
        Some((name, dir)) => {
            let direction = match dir.to_ascii_lowercase().as_str() {
                "asc" => SortDirection::Asc,
                "desc" => SortDirection::Desc,
                other => return Err(format!("unknown sort direction '{other}'")),
            };
            (name, direction)
        }
        None => (raw, SortDirection::Asc),
    };
    Ok(SortState::by(parse_field(name)?, direction))
}

/// `FIELD:operator[:value][:and|or]`. The value may itself contain colons.
fn parse_condition(raw: &str) -> std::result::Result<FilterCondition, String> {
    let mut parts = raw.splitn(3, ':');
    let field = parse_field(parts.next().unwrap_or_default())?;
    let op_text = parts
        .next()
        .ok_or_else(|| format!("missing operator in '{raw}'"))?;
    let operator = Operator::parse(op_text).ok_or_else(|| format!("unknown operator '{op_text}'"))?;
    let rest = parts.next().unwrap_or_default();

    let (value, logic) = match rest.rsplit_once(':') {
        Some((value, tail)) => match Logic::parse(tail) {
            Some(logic) => (value, logic),
            None => (rest, Logic::And),
        },
        None => match Logic::parse(rest) {
            Some(logic) if operator.is_unary() => ("", logic),
            _ => (rest, Logic::And),
        },
    };

    if !operator.is_unary() && value.is_empty() {
        return Err(format!("operator '{op_text}' needs a value"));
    }
    Ok(FilterCondition::new(field, operator, value).with_logic(logic))
}

fn parse_assignment(raw: &str) -> std::result::Result<(Field, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    Ok((parse_field(name)?, value.to_string()))
}

/// `+10%`, `-5`, `2.50` (no sign means increase).
fn parse_adjustment(raw: &str) -> std::result::Result<PriceAdjustment, String> {
    let text = raw.trim();
    let (direction, text) = match text.as_bytes().first() {
        Some(b'-') => (AdjustmentDirection::Decrease, &text[1..]),
        Some(b'+') => (AdjustmentDirection::Increase, &text[1..]),
        _ => (AdjustmentDirection::Increase, text),
    };
    let (kind, number) = match text.strip_suffix('%') {
        Some(number) => (AdjustmentKind::Percentage, number),
        None => (AdjustmentKind::Fixed, text),
    };
    let amount: f64 = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid adjustment amount '{raw}'"))?;
    let adjustment = PriceAdjustment {
        kind,
        direction,
        amount,
        rounding: Rounding::None,
    };
    adjustment.check().map_err(|e| e.to_string())?;
    Ok(adjustment)
}

fn parse_rounding(raw: &str) -> std::result::Result<Rounding, String> {
    Rounding::parse(raw).ok_or_else(|| format!("unknown rounding '{raw}'"))
}
