//! newsdeck CLI
//! Browse merged NewsAPI and Guardian headlines from the terminal
//!
//! Features:
//! - Concurrent fetch of both providers (or offline fixtures)
//! - Search, facet, author and date-range filtering
//! - Sorting and pagination
//! - Persistent recent searches
//! - Correlation IDs in structured logs

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use newsdeck::aggregator::Aggregator;
use newsdeck::config::Config;
use newsdeck::controller::{QueryController, ViewState};
use newsdeck::metrics;
use newsdeck::recent_searches::{FileStore, RecentSearches};
use newsdeck::schemas::{truncate_text, DateRange, SearchFilters, SortBy, SortOrder};

/// newsdeck - merged news headlines with client-side filtering
#[derive(Parser, Debug)]
#[command(name = "newsdeck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse merged NewsAPI and Guardian headlines")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, default_value = "false", global = true)]
    json_logs: bool,

    /// Print Prometheus metrics after the command
    #[arg(long, default_value = "false", global = true)]
    metrics: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch, filter and print one page of articles
    Browse {
        /// Text search over title, description, author and category
        #[arg(short, long)]
        query: Option<String>,

        /// Category facet (repeatable)
        #[arg(short, long)]
        category: Vec<String>,

        /// Source facet, exact name (repeatable)
        #[arg(short, long)]
        source: Vec<String>,

        /// Author substring
        #[arg(short, long)]
        author: Option<String>,

        /// Date range (today, week, month, year, all)
        #[arg(short, long)]
        date_range: Option<String>,

        /// Sort field (publishedAt, title, source)
        #[arg(long, default_value = "publishedAt")]
        sort_by: String,

        /// Sort order (asc, desc)
        #[arg(long, default_value = "desc")]
        sort_order: String,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,

        /// Read newsapi.json and guardian.json from this directory instead of the network
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },

    /// List available categories and sources
    Facets {
        /// Read payloads from this directory instead of the network
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },

    /// Show or edit recent searches
    Recent {
        /// Record a search
        #[arg(long)]
        add: Option<String>,

        /// Only show entries containing this text
        #[arg(long)]
        filter: Option<String>,

        /// Remove all entries
        #[arg(long, default_value = "false")]
        clear: bool,
    },

    /// Show provider configuration
    Status,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Table,
    Json,
    Summary,
}

/// Generates a new correlation ID for the session
fn generate_correlation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Sets up structured logging with tracing
fn setup_logging(log_level: &str, json_output: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli.log_level, cli.json_logs);

    let correlation_id = generate_correlation_id();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        correlation_id = %correlation_id,
        "Starting newsdeck"
    );

    let config = Config::load()?;
    config.validate()?;

    info!(
        newsapi = config.has_newsapi(),
        guardian = config.has_guardian(),
        page_size = config.page_size,
        cache_ttl = %config.cache_ttl,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Browse {
            query,
            category,
            source,
            author,
            date_range,
            sort_by,
            sort_order,
            page,
            output,
            fixtures,
        } => {
            let filters = SearchFilters::new()
                .author(author.unwrap_or_default())
                .date_range(DateRange::parse_optional(date_range.as_deref().unwrap_or(""))?)
                .sort(sort_by.parse::<SortBy>()?, sort_order.parse::<SortOrder>()?);

            let request = BrowseRequest {
                query,
                categories: category,
                sources: source,
                filters,
                page,
            };
            browse(config, correlation_id, request, output, fixtures).await?;
        }

        Commands::Facets { fixtures } => {
            show_facets(config, correlation_id, fixtures).await?;
        }

        Commands::Recent { add, filter, clear } => {
            manage_recent(&config, add, filter, clear)?;
        }

        Commands::Status => {
            show_status(config, correlation_id)?;
        }
    }

    if cli.metrics {
        println!("{}", metrics::gather_metrics());
    }

    Ok(())
}

struct BrowseRequest {
    query: Option<String>,
    categories: Vec<String>,
    sources: Vec<String>,
    filters: SearchFilters,
    page: usize,
}

/// Loads both providers into a fresh controller
async fn load_controller(
    config: &Config,
    correlation_id: String,
    fixtures: Option<PathBuf>,
) -> Result<QueryController> {
    let aggregator = Aggregator::new(config.clone(), correlation_id)?;
    let mut controller = QueryController::new(config.page_size, config.search_debounce());

    match fixtures {
        Some(dir) => aggregator.load_fixtures(&dir, &mut controller),
        None => aggregator.load_into(&mut controller).await,
    }

    Ok(controller)
}

async fn browse(
    config: Config,
    correlation_id: String,
    request: BrowseRequest,
    output: OutputFormat,
    fixtures: Option<PathBuf>,
) -> Result<()> {
    let mut controller = load_controller(&config, correlation_id, fixtures).await?;

    if let Some(query) = request.query.as_deref() {
        controller.commit_search(query);
        let mut recent = RecentSearches::load(
            FileStore::new(&config.recent_searches_path),
            config.max_recent_searches,
        );
        recent.record(query)?;
    }

    let categories = request
        .categories
        .iter()
        .map(|c| c.trim().to_lowercase())
        .collect();
    controller.set_selected_categories(categories);
    controller.set_selected_sources(request.sources);
    controller.set_filters(request.filters);
    controller.set_page(request.page.saturating_sub(1));

    let view = controller.view();
    if let Some(error) = view.error {
        bail!(error);
    }

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Table => print_table(&view),
        OutputFormat::Summary => print_summary(&view),
    }

    Ok(())
}

fn print_table(view: &ViewState) {
    let now = Utc::now();

    println!("\n{:<50} {:<20} {:<15} {:<16}", "Title", "Source", "Category", "Published");
    println!("{}", "-".repeat(104));
    for article in &view.items {
        println!(
            "{:<50} {:<20} {:<15} {:<16}",
            truncate_text(&article.title, 47),
            truncate_text(&article.source.name, 17),
            article.category.as_deref().unwrap_or(""),
            article.format_published(now)
        );
    }

    if let Some(ref message) = view.empty_message {
        println!("{}", message);
    }
    println!(
        "\nPage {} of {} ({} articles)",
        view.current_page + 1,
        view.page_count.max(1),
        view.total_results
    );
}

fn print_summary(view: &ViewState) {
    println!("\nBrowse Summary");
    println!("==============");
    println!("Results:    {}", view.total_results);
    println!("Page:       {} of {}", view.current_page + 1, view.page_count.max(1));
    println!("Filtered:   {}", if view.has_active_filters { "yes" } else { "no" });

    if let Some(first) = view.items.first() {
        println!("Newest:     {} ({})", first.title, first.source.name);
        println!("            {}", first.excerpt(120));
    }
    if let Some(ref message) = view.empty_message {
        println!("{}", message);
    }

    println!("\nCategories: {}", view.available_categories.join(", "));
    println!("Sources:    {}", view.available_sources.join(", "));
}

async fn show_facets(config: Config, correlation_id: String, fixtures: Option<PathBuf>) -> Result<()> {
    let controller = load_controller(&config, correlation_id, fixtures).await?;

    let view = controller.view();
    if let Some(error) = view.error {
        bail!(error);
    }

    let facets = controller.facets();
    println!("\nCategories:");
    for category in &facets.categories {
        println!("  - {}", category);
    }
    println!("\nSources:");
    for source in &facets.sources {
        println!("  - {}", source);
    }

    Ok(())
}

fn manage_recent(config: &Config, add: Option<String>, filter: Option<String>, clear: bool) -> Result<()> {
    let mut recent = RecentSearches::load(
        FileStore::new(&config.recent_searches_path),
        config.max_recent_searches,
    );

    if clear {
        recent.clear()?;
        println!("Recent searches cleared");
        return Ok(());
    }

    if let Some(query) = add {
        recent.record(&query)?;
    }

    let entries = recent.suggestions(filter.as_deref().unwrap_or(""));
    if entries.is_empty() {
        println!("No recent searches");
    }
    for (i, entry) in entries.iter().enumerate() {
        println!("{}. {}", i + 1, entry);
    }

    Ok(())
}

/// Shows provider configuration
fn show_status(config: Config, correlation_id: String) -> Result<()> {
    let recent_path = config.recent_searches_path.clone();
    let ttl = config.cache_ttl.clone();
    let aggregator = Aggregator::new(config, correlation_id)?;

    println!("\nnewsdeck Status");
    println!("===============\n");

    println!("Providers:");
    for status in aggregator.status() {
        println!(
            "  - {:<13} {} (default: {})",
            status.name,
            if status.configured { "configured" } else { "missing API key" },
            status.default_param
        );
    }

    println!("\nCache TTL:       {}", ttl);
    println!("Recent searches: {}", recent_path.display());

    Ok(())
}
