//! OpenGov query CLI - inspect and repair query configs and saved views
//!
//! Usage:
//!   opengov validate <config.json> [--repair]
//!   opengov date <value>
//!   opengov filters <view.json> [--query <config.json>] [--map id=ref ...]
//!   opengov columns <config.json>
//!   opengov request <config.json> [--facet <column> ...]
//!   opengov result <config.json> <response.json> [--status <code>]
//!   opengov views list [--table <name>]
//!   opengov views show|delete --table <name> <view>
//!   opengov views save --table <name> <view> <view.json> [--overwrite]
//!   opengov encode <view.json>
//!   opengov decode <param>
//!
//! Examples:
//!   opengov date 2024-02
//!   opengov filters state.json --map category=c.category
//!   opengov validate spending.json --repair > repaired.json
//!   opengov request spending.json --facet status

use clap::{Parser, Subcommand};
use opengov_query::api::{
    execute_request_body, facet_request_body, parse_execute_response, QueryResult, EXECUTE_PATH,
    FACETS_PATH,
};
use opengov_query::config::Settings;
use opengov_query::convert::{
    apply_view_state, build_facet_query_config, convert_filters_to_query_config,
    sorting_state_to_order_by, ColumnRefMap, FacetQueryInput,
};
use opengov_query::dates::{
    format_partial_date_for_display, next_boundary, parse_partial_date, partial_date_range,
    previous_boundary,
};
use opengov_query::model::QueryConfig;
use opengov_query::unified::UnifiedColumn;
use opengov_query::validation::{malformed_conditions, prepare_for_save, validate_query_config};
use opengov_query::view::{
    decode_view_state, encode_view_state, MemoryUrl, SqliteStorage, ViewState, ViewStateManager,
};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "opengov")]
#[command(about = "OpenGov - query configuration and saved view tooling")]
#[command(version)]
struct Cli {
    /// Path to an opengov.toml (overrides the default search)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check groupBy/orderBy references of a query config
    Validate {
        /// Path to the query config JSON
        file: PathBuf,

        /// Print the config with invalid references removed
        #[arg(long)]
        repair: bool,
    },

    /// Parse a partial date and show its range
    Date {
        /// YYYY, YYYY-MM or YYYY-MM-DD
        value: String,
    },

    /// Convert a table view state into orderBy and filters
    Filters {
        /// Path to the view state JSON
        file: PathBuf,

        /// Base query config the view applies to
        #[arg(long = "query")]
        query: Option<PathBuf>,

        /// Column id mapping, e.g. category=c.category
        #[arg(short, long = "map", value_parser = parse_mapping)]
        mappings: Vec<(String, String)>,
    },

    /// List the columns of a query config in display order
    Columns {
        /// Path to the query config JSON
        file: PathBuf,
    },

    /// Print the backend request for a query config, or for its facets
    Request {
        /// Path to the query config JSON
        file: PathBuf,

        /// Request distinct values of these columns instead of rows
        #[arg(long = "facet")]
        facets: Vec<String>,
    },

    /// Read a backend execute response against the query that produced it
    #[command(name = "result")]
    ReadResult {
        /// Path to the query config JSON
        config: PathBuf,

        /// Path to the response body
        response: PathBuf,

        /// HTTP status of the response
        #[arg(long, default_value_t = 200)]
        status: u16,
    },

    /// Manage saved views
    Views {
        #[command(subcommand)]
        action: ViewsAction,
    },

    /// Encode a view state JSON file as a URL parameter
    Encode {
        /// Path to the view state JSON
        file: PathBuf,
    },

    /// Decode a URL parameter into view state JSON
    Decode {
        /// Value of the `view` parameter
        param: String,
    },
}

#[derive(Subcommand)]
enum ViewsAction {
    /// List tables with saved views, or the views of one table
    List {
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Print a saved view's state
    Show {
        #[arg(short, long)]
        table: String,
        name: String,
    },

    /// Save a view state file under a name
    Save {
        #[arg(short, long)]
        table: String,
        name: String,
        /// Path to the view state JSON
        file: PathBuf,
        /// Replace an existing view of the same name
        #[arg(long)]
        overwrite: bool,
    },

    /// Delete a saved view
    Delete {
        #[arg(short, long)]
        table: String,
        name: String,
    },
}

fn parse_mapping(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((id, reference)) if !id.is_empty() && !reference.is_empty() => {
            Ok((id.to_string(), reference.to_string()))
        }
        _ => Err(format!("expected id=reference, got '{}'", s)),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Validate { file, repair } => cmd_validate(&file, repair, &settings),
        Commands::Date { value } => cmd_date(&value),
        Commands::Filters {
            file,
            query,
            mappings,
        } => cmd_filters(&file, query.as_deref(), mappings, &settings),
        Commands::Columns { file } => cmd_columns(&file, &settings),
        Commands::Request { file, facets } => cmd_request(&file, &facets, &settings),
        Commands::ReadResult {
            config,
            response,
            status,
        } => cmd_result(&config, &response, status, &settings),
        Commands::Views { action } => cmd_views(action, &settings),
        Commands::Encode { file } => cmd_encode(&file),
        Commands::Decode { param } => cmd_decode(&param),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let source = fs::read_to_string(path)
        .map_err(|e| format!("Error reading file '{}': {}", path.display(), e))?;
    serde_json::from_str(&source)
        .map_err(|e| format!("Error parsing '{}': {}", path.display(), e))
}

/// Read a query config, applying the configured default limit.
fn read_query(path: &Path, settings: &Settings) -> Result<QueryConfig, String> {
    let source = fs::read_to_string(path)
        .map_err(|e| format!("Error reading file '{}': {}", path.display(), e))?;
    settings
        .query
        .parse_query_config(&source)
        .map_err(|e| format!("Error parsing '{}': {}", path.display(), e))
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_validate(file: &Path, repair: bool, settings: &Settings) -> ExitCode {
    let config = match read_query(file, settings) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let validation = validate_query_config(&config);
    let malformed = config
        .filters
        .as_ref()
        .map(malformed_conditions)
        .unwrap_or_default();

    if validation.has_invalid() {
        eprintln!("Warning: {}", validation);
    }
    for condition in &malformed {
        eprintln!(
            "Warning: filter on '{}' has a value that does not fit operator {}",
            condition.column, condition.operator
        );
    }

    if repair {
        return print_json(&prepare_for_save(&config));
    }

    if validation.has_invalid() || !malformed.is_empty() {
        ExitCode::FAILURE
    } else {
        println!("✓ {}", validation);
        ExitCode::SUCCESS
    }
}

fn cmd_date(value: &str) -> ExitCode {
    let Some(parsed) = parse_partial_date(value) else {
        eprintln!("'{}' is not a valid date (YYYY, YYYY-MM or YYYY-MM-DD)", value);
        return ExitCode::FAILURE;
    };

    println!("Value:     {}", value.trim());
    println!("Precision: {:?}", parsed.precision());
    println!("Display:   {}", format_partial_date_for_display(value));
    if let Some(range) = partial_date_range(value) {
        println!("Range:     {} .. {}", range.start, range.end);
    }
    if let Some(previous) = previous_boundary(value) {
        println!("Before:    {}", previous);
    }
    if let Some(next) = next_boundary(value) {
        println!("After:     {}", next);
    }
    ExitCode::SUCCESS
}

fn cmd_filters(
    file: &Path,
    query: Option<&Path>,
    mappings: Vec<(String, String)>,
    settings: &Settings,
) -> ExitCode {
    let state: ViewState = match read_json(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let map: ColumnRefMap = mappings.into_iter().collect();
    let map = (!map.is_empty()).then_some(&map);

    match query {
        Some(path) => {
            let base = match read_query(path, settings) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("{}", e);
                    return ExitCode::FAILURE;
                }
            };
            print_json(&apply_view_state(&base, &state, map))
        }
        None => {
            let order_by = sorting_state_to_order_by(&state.sorting, None, map);
            let filters = convert_filters_to_query_config(
                &state.column_filters,
                state.filter_group.as_ref(),
                map,
            );
            print_json(&serde_json::json!({
                "orderBy": order_by,
                "filters": filters,
            }))
        }
    }
}

fn cmd_columns(file: &Path, settings: &Settings) -> ExitCode {
    let config = match read_query(file, settings) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let patterns = settings.column_patterns();

    println!("Table: {}", config.source_table);
    println!();
    for column in config.unified_columns() {
        let render = match &column {
            UnifiedColumn::Regular(spec) => patterns.resolve(&spec.column),
            UnifiedColumn::Expression(expr) => patterns.resolve(&expr.alias),
        };
        match render.decimals {
            Some(d) => println!(
                "  {:<30} -> {:<24} {} ({} decimals)",
                column.id(),
                column.result_key(),
                render.kind,
                d
            ),
            None => println!(
                "  {:<30} -> {:<24} {}",
                column.id(),
                column.result_key(),
                render.kind
            ),
        }
    }
    ExitCode::SUCCESS
}

fn cmd_request(file: &Path, facets: &[String], settings: &Settings) -> ExitCode {
    let config = match read_query(file, settings) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let (path, body) = if facets.is_empty() {
        (EXECUTE_PATH, execute_request_body(&config))
    } else {
        let facet = build_facet_query_config(FacetQueryInput {
            joins: &config.joins,
            filters: config.filters.as_ref(),
            ..FacetQueryInput::new(&config.source_table, facets)
        });
        (FACETS_PATH, facet_request_body(&facet))
    };

    let url = match settings.api.endpoint(path) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    match body {
        Ok(body) => {
            println!("POST {}", url);
            println!("Timeout: {}s", settings.api.timeout().as_secs());
            println!();
            println!("{}", body);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing request: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_result(config: &Path, response: &Path, status: u16, settings: &Settings) -> ExitCode {
    let config = match read_query(config, settings) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let body = match fs::read_to_string(response) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", response.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let result = match parse_execute_response(status, &body) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Query error: {}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    println!("{} rows", result.row_count);
    for (index, row) in result.data.iter().enumerate() {
        println!("Row {}:", index + 1);
        for spec in &config.columns {
            let value = QueryResult::column_value(row, spec).unwrap_or(&serde_json::Value::Null);
            println!("  {:<24} {}", spec.column_key(), value);
        }
    }
    ExitCode::SUCCESS
}

fn open_storage(settings: &Settings) -> Result<SqliteStorage, String> {
    let path = settings
        .views
        .resolved_storage_path()
        .map_err(|e| format!("Configuration error: {}", e))?;
    let storage = match path {
        Some(p) => SqliteStorage::open(&p),
        None => SqliteStorage::open_default(),
    };
    storage.map_err(|e| format!("Error opening view store: {}", e))
}

fn cmd_views(action: ViewsAction, settings: &Settings) -> ExitCode {
    let storage = match open_storage(settings) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // No page URL outside a browser.
    let mut options = settings.views.view_options();
    options.disable_url_sync = true;

    match action {
        ViewsAction::List { table: None } => match storage.tables_with_views() {
            Ok(tables) if tables.is_empty() => {
                println!("No saved views.");
                ExitCode::SUCCESS
            }
            Ok(tables) => {
                for table in tables {
                    println!("{}", table);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error reading view store: {}", e);
                ExitCode::FAILURE
            }
        },
        ViewsAction::List { table: Some(table) } => {
            let manager = ViewStateManager::new(&table, storage, MemoryUrl::new(), options);
            let views = manager.saved_views();
            if views.is_empty() {
                println!("No saved views for '{}'.", table);
            }
            for view in views {
                let marker = if view.is_default == Some(true) {
                    " (default)"
                } else {
                    ""
                };
                println!("  - {}{}", view.name, marker);
            }
            ExitCode::SUCCESS
        }
        ViewsAction::Show { table, name } => {
            let manager = ViewStateManager::new(&table, storage, MemoryUrl::new(), options);
            match manager.saved_views().into_iter().find(|v| v.name == name) {
                Some(view) => print_json(&view.state),
                None => {
                    eprintln!("No view named '{}' for '{}'", name, table);
                    ExitCode::FAILURE
                }
            }
        }
        ViewsAction::Save {
            table,
            name,
            file,
            overwrite,
        } => {
            let state: ViewState = match read_json(&file) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{}", e);
                    return ExitCode::FAILURE;
                }
            };
            let mut manager = ViewStateManager::new(&table, storage, MemoryUrl::new(), options);
            manager.set_state(state);
            match manager.save_view(&name, overwrite) {
                Ok(()) => {
                    println!("✓ Saved view '{}' for '{}'", name, table);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        ViewsAction::Delete { table, name } => {
            let mut manager = ViewStateManager::new(&table, storage, MemoryUrl::new(), options);
            match manager.delete_view(&name) {
                Ok(()) => {
                    println!("✓ Deleted view '{}' for '{}'", name, table);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn cmd_encode(file: &Path) -> ExitCode {
    let state: ViewState = match read_json(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    match encode_view_state(&state) {
        Ok(param) => {
            println!("{}", param);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error encoding view state: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_decode(param: &str) -> ExitCode {
    match decode_view_state(param) {
        Ok(state) => print_json(&state),
        Err(e) => {
            eprintln!("Error decoding view parameter: {}", e);
            ExitCode::FAILURE
        }
    }
}
