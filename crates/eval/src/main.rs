//! Evaluation CLI for browsing a studio catalog from the terminal.
//!
//! Usage:
//!     eval search --file studios.json --category Residential --facet Style=Modern
//!     eval search --query villa --price 0..250000 --sort price-asc --json
//!     eval search --file studios.json --image moodboard.jpg
//!     eval domains --file studios.json
//!     eval options --category Residential
//!     eval health

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use atelier_backend_marketplace::{
    CatalogSource, LocalCatalog, MarketplaceBackend, MarketplaceConfig, PaletteAnalyzer,
    WorkspaceStore,
};
use atelier_explain::{
    active_filter_count, describe_filters, explain_signals, facet_counts, summarize_listing,
    FilterChip,
};
use atelier_features::SignalRules;
use atelier_model::{ListingHit, CATEGORY_ALL, CATEGORY_DISPLAY_ORDER};
use atelier_query::{typologies_for, Facet, FilterAction, RangeFacet, RangeSelection, ServiceFocus};
use atelier_rerank::{RankConfig, SortOrder, PAGE_SIZE};
use atelier_session::{CatalogSession, ImageStatus, LoadState};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "eval")]
#[command(about = "Browse and filter a studio catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Marketplace API base URL
    #[arg(long, default_value = "http://127.0.0.1:4000/api")]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,
}

#[derive(Args)]
struct SourceArgs {
    /// Read records from a JSON fixture instead of the marketplace API
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Local catalog used when the marketplace API fails
    #[arg(long)]
    fallback: Option<PathBuf>,

    /// Workspace file whose published records are merged in
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Capability rule table (TOML or JSON)
    #[arg(long)]
    rules: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter, sort and page through the catalog
    Search {
        #[command(flatten)]
        source: SourceArgs,

        /// Top-level category
        #[arg(short, long, default_value = CATEGORY_ALL)]
        category: String,

        /// Free-text query
        #[arg(short, long, default_value = "")]
        query: String,

        /// Facet selection as `Facet=Option`, repeatable
        #[arg(long = "facet", value_parser = parse_facet_option)]
        facets: Vec<(Facet, String)>,

        /// Offering focus (all, services, plans, design-build)
        #[arg(long, default_value = "all")]
        focus: ServiceFocus,

        /// Price range, `low..high`
        #[arg(long)]
        price: Option<RangeSelection>,

        /// Area range in sq ft, `low..high`
        #[arg(long)]
        area: Option<RangeSelection>,

        /// Floor count range, `low..high`
        #[arg(long)]
        floors: Option<RangeSelection>,

        /// Program count range, `low..high`
        #[arg(long)]
        programs: Option<RangeSelection>,

        /// Sort order (featured, price-asc, price-desc, rating-desc)
        #[arg(short, long, default_value = "featured")]
        sort: SortOrder,

        /// Number of pages to reveal
        #[arg(short, long, default_value = "1")]
        pages: usize,

        /// Listings per page
        #[arg(long, default_value_t = PAGE_SIZE)]
        page_size: usize,

        /// Filter by keywords derived from an image's palette
        #[arg(long)]
        image: Option<PathBuf>,

        /// Print service explanations for each listing
        #[arg(long)]
        explain: bool,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show range domains and facet counts of the catalog
    Domains {
        #[command(flatten)]
        source: SourceArgs,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List categories, facet options and typologies
    Options {
        /// Category whose typologies are listed
        #[arg(short, long, default_value = CATEGORY_ALL)]
        category: String,
    },

    /// Check marketplace API health
    Health,
}

fn parse_facet_option(s: &str) -> Result<(Facet, String), String> {
    let (facet, option) = s
        .split_once('=')
        .ok_or_else(|| format!("expected Facet=Option, got '{}'", s))?;
    let facet: Facet = facet.parse().map_err(|e| format!("{}", e))?;
    let option = option.trim();
    if option.is_empty() {
        return Err(format!("empty option for facet {}", facet));
    }
    Ok((facet, option.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("atelier=debug".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = MarketplaceConfig {
        base_url: cli.api_url,
        timeout_secs: cli.timeout,
    };

    match cli.command {
        Commands::Search {
            source,
            category,
            query,
            facets,
            focus,
            price,
            area,
            floors,
            programs,
            sort,
            pages,
            page_size,
            image,
            explain,
            json,
        } => {
            let rules = load_rules(source.rules.as_deref())?;
            let mut session = CatalogSession::new(
                rules.clone(),
                RankConfig {
                    page_size,
                    order: sort,
                },
            );

            session.dispatch(FilterAction::SelectCategory(category));
            session.dispatch(FilterAction::SetQuery(query));
            load_catalog(&mut session, &source, &config).await?;

            for (facet, option) in facets {
                session.dispatch(FilterAction::ToggleOption { facet, option });
            }
            session.dispatch(FilterAction::SetFocus(focus));
            let ranges = [
                (RangeFacet::Price, price),
                (RangeFacet::Area, area),
                (RangeFacet::Floors, floors),
                (RangeFacet::Programs, programs),
            ];
            for (facet, selection) in ranges {
                if let Some(selection) = selection {
                    session.dispatch(FilterAction::SetRange { facet, selection });
                }
            }

            if let Some(path) = image {
                session.analyze_image(&PaletteAnalyzer, &path).await;
            }

            for _ in 1..pages {
                session.load_more();
            }

            print_search(&session, &rules, explain, json)?;
        }
        Commands::Domains { source, json } => {
            let rules = load_rules(source.rules.as_deref())?;
            let mut session = CatalogSession::new(rules, RankConfig::default());
            load_catalog(&mut session, &source, &config).await?;
            print_domains(&session, json)?;
        }
        Commands::Options { category } => {
            print_options(&category);
        }
        Commands::Health => {
            let backend = MarketplaceBackend::new(config)?;
            run_health(&backend).await?;
        }
    }

    Ok(())
}

fn load_rules(path: Option<&Path>) -> Result<SignalRules> {
    match path {
        Some(path) => SignalRules::from_file(path)
            .with_context(|| format!("loading rule table {}", path.display())),
        None => Ok(SignalRules::default()),
    }
}

async fn load_catalog(
    session: &mut CatalogSession,
    source: &SourceArgs,
    config: &MarketplaceConfig,
) -> Result<()> {
    if let Some(path) = &source.workspace {
        let records = WorkspaceStore::new(path).load()?;
        session.set_workspace_records(records);
    }

    match (&source.file, &source.fallback) {
        (Some(file), _) => {
            let catalog = LocalCatalog::from_file(file)
                .with_context(|| format!("loading catalog {}", file.display()))?;
            session.refresh(&catalog).await;
        }
        (None, Some(fallback)) => {
            let backend = MarketplaceBackend::new(config.clone())?;
            let local = LocalCatalog::from_file(fallback)
                .with_context(|| format!("loading fallback catalog {}", fallback.display()))?;
            session.refresh_with_fallback(&backend, &local).await;
        }
        (None, None) => {
            let backend = MarketplaceBackend::new(config.clone())?;
            session.refresh(&backend).await;
        }
    }

    if let LoadState::Failed(message) = session.load_state() {
        bail!("catalog fetch failed: {}", message);
    }
    tracing::info!(
        listings = session.listings().len(),
        results = session.results().len(),
        "Catalog ready"
    );
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchReport<'a> {
    total: usize,
    shown: usize,
    has_more: bool,
    fallback: bool,
    active_filters: usize,
    filters: Vec<FilterChip>,
    keywords: &'a [String],
    hits: Vec<ListingHit>,
}

fn print_search(session: &CatalogSession, rules: &SignalRules, explain: bool, json: bool) -> Result<()> {
    let page = session.page();
    let state = session.state();

    if json {
        let report = SearchReport {
            total: page.total,
            shown: page.hits.len(),
            has_more: page.has_more,
            fallback: session.is_fallback(),
            active_filters: active_filter_count(state),
            filters: describe_filters(state),
            keywords: &state.keywords,
            hits: page.hits,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if session.is_fallback() {
        println!("(showing local fallback catalog)");
    }
    let chips = describe_filters(state);
    if !chips.is_empty() {
        let labels: Vec<&str> = chips.iter().map(|c| c.label.as_str()).collect();
        println!("Filters ({}): {}", active_filter_count(state), labels.join(" | "));
    }
    if let ImageStatus::Failed(message) = session.image_status() {
        println!("Image: {}", message);
    }
    println!("Sort: {}", session.order());
    println!("---");

    for (i, hit) in page.hits.iter().enumerate() {
        let record = &hit.record;
        println!("\n{}. {} [{}]", i + 1, record.title, record.id);
        let price = record
            .price
            .map(|p| match record.price_unit.as_deref() {
                Some(unit) => format!("{} {:.0} / {}", record.currency, p, unit),
                None => format!("{} {:.0}", record.currency, p),
            })
            .unwrap_or_else(|| "price on request".to_string());
        let rating = record
            .rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "unrated".to_string());
        println!("   {} | rating {}", price, rating);
        println!("   {}", summarize_listing(hit));

        if explain {
            for explanation in explain_signals(hit, rules) {
                let evidence: Vec<&str> =
                    explanation.evidence.iter().map(|e| e.value.as_str()).collect();
                println!("   - {}: {}", explanation.summary, explanation.detail);
                if !evidence.is_empty() {
                    println!("     matched: {}", evidence.join(", "));
                }
            }
        }
    }

    println!("\n---");
    println!("Showing {} of {} results", page.hits.len(), page.total);
    if page.has_more {
        println!("More available (use --pages)");
    }

    Ok(())
}

fn print_domains(session: &CatalogSession, json: bool) -> Result<()> {
    let records: Vec<_> = session.records().cloned().collect();
    let counts = facet_counts(&records);

    if json {
        let report = serde_json::json!({
            "records": records.len(),
            "domains": session.domains(),
            "facets": counts,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Records: {}", records.len());
    for facet in RangeFacet::ALL {
        let domain = session.domains().get(facet);
        println!("{:<14} {} .. {}", facet.label(), domain.min, domain.max);
    }

    println!("---");
    for (title, list) in [("Categories", &counts.categories), ("Styles", &counts.styles), ("Tags", &counts.tags)] {
        if list.is_empty() {
            continue;
        }
        let entries: Vec<String> = list.iter().map(|c| format!("{} ({})", c.name, c.count)).collect();
        println!("{}: {}", title, entries.join(", "));
    }
    Ok(())
}

fn print_options(category: &str) {
    println!("Categories: {}", CATEGORY_DISPLAY_ORDER.join(", "));
    println!("Typologies ({}): {}", category, typologies_for(category).join(", "));
    for facet in Facet::ALL.into_iter().filter(|f| !f.options().is_empty()) {
        println!("{}: {}", facet.label(), facet.options().join(", "));
    }
    let focus = [
        ServiceFocus::All,
        ServiceFocus::Services,
        ServiceFocus::Plans,
        ServiceFocus::DesignBuild,
    ];
    let labels: Vec<&str> = focus.iter().map(|f| f.label()).collect();
    println!("Offerings: {}", labels.join(", "));
    let sorts: Vec<String> = SortOrder::ALL
        .iter()
        .map(|s| format!("{} ({})", s.label(), if s.key().is_empty() { "default" } else { s.key() }))
        .collect();
    println!("Sort: {}", sorts.join(", "));
}

async fn run_health(backend: &MarketplaceBackend) -> Result<()> {
    print!("Checking {} backend... ", backend.name());

    match backend.health_check().await {
        Ok(()) => {
            println!("OK");
            Ok(())
        }
        Err(e) => {
            println!("FAILED: {}", e);
            std::process::exit(1);
        }
    }
}
