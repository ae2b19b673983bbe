// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use incident_analytics::analytics::{MAX_TREND_DAYS, SearchFilter, find_similar_in_store};
use incident_analytics::extractor::patterns::is_private_ip;
use incident_analytics::models::IocType;
use incident_analytics::utils::logging::{
    format_count, format_error, format_heading, format_info, format_success, format_warning,
    init_logger,
};
use incident_analytics::{
    AnalyticsReport, Config, CsvImporter, EnrichmentOutcome, EnrichmentPipeline, IncidentRecord,
    IncidentStore, InsertOutcome, IocExtractor, JsonFileStore, KeywordClassifier, NewIncident,
    OperationTimer, SimilarityMatcher, ThreatActorIdentifier, TimeRange, Validator, all_sectors,
    daily_trend, import_batch, incident_statistics, search_incidents, spawn_enrichment,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

const LABEL_WIDTH: usize = 28;

#[derive(Parser)]
#[command(name = "incident-analytics")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Cyber incident classification and analytics engine", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate stored incidents and print trend and recommendations
    Analyze {
        /// 1m, 3m, 6m, 1y or all (defaults to analytics.default_time_range)
        #[arg(short, long)]
        range: Option<TimeRange>,

        #[arg(long)]
        json: bool,
    },

    /// Classify free text without storing anything
    Classify {
        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Extract indicators of compromise from text
    Iocs {
        text: String,

        /// Drop private, loopback and link-local IPv4 addresses
        #[arg(long)]
        public_only: bool,
    },

    /// List incidents related to a stored incident
    Similar {
        id: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Store a new incident
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: String,

        #[arg(long, default_value = "medium")]
        severity: String,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        sector: Option<String>,

        #[arg(long)]
        attack_vector: Option<String>,

        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        source_url: Option<String>,

        #[arg(long = "indicator", value_name = "IOC")]
        indicators: Vec<String>,

        /// Run enrichment in the background right after storing
        #[arg(long)]
        enrich: bool,
    },

    /// Store incidents from a header-row CSV file
    Import {
        file: PathBuf,

        /// Enrich the imported incidents afterwards
        #[arg(long)]
        enrich: bool,
    },

    /// Enrich every incident that has not been processed yet
    Enrich,

    /// Dashboard summary counts and daily trend
    Stats {
        #[arg(
            long,
            default_value_t = 7,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_TREND_DAYS))
        )]
        days: u32,
    },

    /// Filter stored incidents
    Search {
        #[arg(short, long)]
        term: Option<String>,

        #[arg(long)]
        sector: Option<String>,

        #[arg(long)]
        severity: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },

    /// Write the analytics report as JSON
    Export {
        #[arg(short, long, default_value = "./exports")]
        output: PathBuf,

        #[arg(short, long)]
        range: Option<TimeRange>,

        #[arg(short, long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(cli.color, cli.verbose);

    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::default_config()
    };

    match cli.command {
        Commands::Analyze { range, json } => {
            cmd_analyze(&config, range, json).await?;
        }
        Commands::Classify { title, description } => {
            cmd_classify(&title, &description);
        }
        Commands::Iocs { text, public_only } => {
            cmd_iocs(&text, public_only);
        }
        Commands::Similar { id, limit } => {
            cmd_similar(&config, &id, limit).await?;
        }
        Commands::Add {
            title,
            description,
            severity,
            status,
            sector,
            attack_vector,
            source,
            source_url,
            indicators,
            enrich,
        } => {
            let new = NewIncident {
                title,
                description,
                severity,
                status,
                sector,
                source,
                source_url,
                attack_vector,
                indicators,
                ..Default::default()
            };
            cmd_add(&config, new, enrich).await?;
        }
        Commands::Import { file, enrich } => {
            cmd_import(&config, &file, enrich).await?;
        }
        Commands::Enrich => {
            cmd_enrich(&config).await?;
        }
        Commands::Stats { days } => {
            cmd_stats(&config, days).await?;
        }
        Commands::Search {
            term,
            sector,
            severity,
            status,
        } => {
            let filter = SearchFilter {
                term,
                sector,
                severity,
                status,
            };
            cmd_search(&config, &filter).await?;
        }
        Commands::Export {
            output,
            range,
            pretty,
        } => {
            cmd_export(&config, output, range, pretty).await?;
        }
    }

    Ok(())
}

async fn open_store(config: &Config) -> Result<JsonFileStore> {
    JsonFileStore::open(&config.store.path, config.store.create_if_missing)
        .await
        .with_context(|| {
            format!(
                "Failed to open incident store at {}",
                config.store.path.display()
            )
        })
}

async fn cmd_analyze(config: &Config, range: Option<TimeRange>, json: bool) -> Result<()> {
    let range = range.unwrap_or(config.analytics.default_time_range);
    let store = open_store(config).await?;

    let timer = OperationTimer::new("analyze");
    let incidents = store.list_incidents().await?;
    let report = AnalyticsReport::build(&incidents, range, Utc::now());
    timer.finish_with_count(report.snapshot.total_incidents);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let snapshot = &report.snapshot;
    println!(
        "\n{} ({} incidents, range {})\n",
        format_heading("Incident Analytics"),
        snapshot.total_incidents,
        range
    );

    print_counts("By sector", &snapshot.incidents_by_sector);
    print_counts("By severity", &snapshot.incidents_by_severity);
    print_counts("By attack vector", &snapshot.incidents_by_attack_vector);
    print_counts("By month", &snapshot.incidents_by_month);
    print_counts("By threat actor", &snapshot.incidents_by_threat_actor);

    println!("{}", format_heading("Trend"));
    println!("  {}\n", report.trend);

    println!("{}", format_heading("Recommendations"));
    for (idx, recommendation) in report.recommendations.iter().enumerate() {
        println!("  {}. {}", idx + 1, recommendation);
    }
    println!();

    Ok(())
}

fn print_counts<K: ToString>(heading: &str, counts: &BTreeMap<K, u64>) {
    println!("{}", format_heading(heading));
    if counts.is_empty() {
        println!("  {}", "no data".dimmed());
    }
    for (label, count) in counts {
        println!("{}", format_count(&label.to_string(), *count, LABEL_WIDTH));
    }
    println!();
}

fn cmd_classify(title: &str, description: &str) {
    let classification = KeywordClassifier::new().classify(title, description);
    let actors = ThreatActorIdentifier::new().identify(
        title,
        description,
        classification.attack_vector.as_deref(),
    );

    println!("\n{}", format_heading("Classification"));
    println!("  Sector:        {}", classification.sector);
    println!("  Severity:      {}", classification.severity);
    println!(
        "  Attack vector: {}",
        classification.attack_vector.as_deref().unwrap_or("-")
    );
    println!("  Confidence:    {:.3}", classification.confidence);

    if !actors.is_empty() {
        println!("\n{}", format_heading("Threat actors"));
        for actor in &actors {
            println!("  {} ({:.2})", actor.name.bold(), actor.confidence);
        }
    }
    println!();
}

fn cmd_iocs(text: &str, public_only: bool) {
    let iocs: Vec<_> = IocExtractor::new()
        .extract_typed(text)
        .into_iter()
        .filter(|ioc| !(public_only && ioc.ioc_type == IocType::Ip && is_private_ip(&ioc.value)))
        .collect();

    if iocs.is_empty() {
        println!("{}", format_info("No indicators found"));
        return;
    }

    for ioc in &iocs {
        println!("  {:<8} {}", ioc.ioc_type.to_string().cyan(), ioc.value);
    }
}

async fn cmd_similar(config: &Config, id: &str, limit: Option<usize>) -> Result<()> {
    let store = open_store(config).await?;

    let Some(target) = store.get_incident(id).await? else {
        println!("{}", format_error(&format!("Incident not found: {}", id)));
        return Ok(());
    };

    let mut matcher = SimilarityMatcher::new(config.similarity);
    if let Some(limit) = limit {
        matcher = matcher.with_limit(limit);
    }

    let similar =
        find_similar_in_store(&store, &matcher, &target.id, &target.title, &target.description)
            .await;

    if similar.is_empty() {
        println!("{}", format_info("No similar incidents found"));
        return Ok(());
    }

    println!("\n{} {}\n", format_heading("Similar to"), target.title);
    for (idx, incident) in similar.iter().enumerate() {
        println!(
            "  {}. [{:.0}%] {} ({})",
            idx + 1,
            incident.similarity * 100.0,
            Validator::truncate_text(&incident.title, 60),
            incident.id.dimmed()
        );
    }
    println!();

    Ok(())
}

async fn cmd_add(config: &Config, new: NewIncident, enrich: bool) -> Result<()> {
    let record = IncidentRecord::from_new(new, Utc::now()).context("Invalid incident")?;
    let store = Arc::new(open_store(config).await?);

    let id = match store.insert_incident(record).await? {
        InsertOutcome::Inserted(id) => {
            println!("{}", format_success(&format!("Stored incident {}", id)));
            id
        }
        InsertOutcome::Duplicate(id) => {
            println!(
                "{}",
                format_warning(&format!("Incident already stored as {}", id))
            );
            return Ok(());
        }
    };

    if enrich {
        let handle = spawn_enrichment(store.clone(), id.clone(), config);
        match handle.await.context("Enrichment task panicked")? {
            EnrichmentOutcome::Enriched(id) => {
                println!("{}", format_success(&format!("Enriched incident {}", id)));
            }
            EnrichmentOutcome::TimedOut(id) => {
                println!(
                    "{}",
                    format_warning(&format!("Enrichment of {} timed out", id))
                );
            }
            EnrichmentOutcome::Failed { id, reason } => {
                println!(
                    "{}",
                    format_error(&format!("Enrichment of {} failed: {}", id, reason))
                );
            }
        }
    }

    Ok(())
}

async fn cmd_import(config: &Config, file: &Path, enrich: bool) -> Result<()> {
    let batch = CsvImporter::read_path(file, Utc::now())
        .with_context(|| format!("Failed to read {}", file.display()))?;

    if !batch.is_valid() {
        println!(
            "{}",
            format_error(&format!(
                "{} problems in {} rows, nothing imported",
                batch.errors.len(),
                batch.total_rows
            ))
        );
        for error in &batch.errors {
            println!("  {}", error);
        }
        anyhow::bail!("CSV validation failed");
    }

    let store = open_store(config).await?;
    let timer = OperationTimer::new("import");
    let summary = import_batch(&store, batch.incidents).await?;
    timer.finish_with_count(summary.inserted.len());

    println!(
        "{}",
        format_success(&format!(
            "Imported {} incidents into {}",
            summary.inserted.len(),
            store.path().display()
        ))
    );
    if !summary.duplicates.is_empty() {
        println!(
            "{}",
            format_warning(&format!(
                "Skipped {} already stored incidents",
                summary.duplicates.len()
            ))
        );
    }

    if enrich {
        cmd_enrich(config).await?;
    }

    Ok(())
}

async fn cmd_enrich(config: &Config) -> Result<()> {
    let store = Arc::new(open_store(config).await?);
    let pipeline = EnrichmentPipeline::new(store, config);

    let timer = OperationTimer::new("enrich");
    let stats = pipeline
        .process_unanalyzed()
        .await
        .context("Enrichment run failed")?;
    timer.finish_with_count(stats.total());

    println!(
        "{}",
        format_success(&format!(
            "Enriched {} incidents ({} failed, {} timed out)",
            stats.enriched, stats.failed, stats.timed_out
        ))
    );

    Ok(())
}

async fn cmd_stats(config: &Config, days: u32) -> Result<()> {
    let store = open_store(config).await?;
    let incidents = store.list_incidents().await?;
    let stats = incident_statistics(&incidents);

    println!("\n{}\n", format_heading("Incident Statistics"));
    println!("  Total incidents:   {}", stats.total_incidents);
    println!("  Critical:          {}", stats.critical_incidents.to_string().red());
    println!("  High:              {}", stats.high_incidents.to_string().yellow());
    println!("  Open:              {}", stats.open_incidents);
    println!(
        "  Sectors affected:  {} ({})\n",
        stats.sectors_affected,
        all_sectors(&incidents).join(", ")
    );

    println!("{}", format_heading(&format!("Last {} days", days)));
    for point in daily_trend(&incidents, days, Utc::now()) {
        println!("  {:<8} {}", point.date, "█".repeat(point.count));
    }
    println!();

    Ok(())
}

async fn cmd_search(config: &Config, filter: &SearchFilter) -> Result<()> {
    let store = open_store(config).await?;
    let incidents = store.list_incidents().await?;
    let found = search_incidents(&incidents, filter);

    if found.is_empty() {
        println!("{}", format_info("No incidents match the given filters"));
        return Ok(());
    }

    println!("\nFound {} incident(s)\n", found.len());
    println!("{}", "=".repeat(80));

    for incident in &found {
        let severity = incident
            .severity
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let date = incident
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "\n{} [{}] {}",
            date,
            severity.bold(),
            Validator::truncate_text(&incident.title, 70)
        );
        println!(
            "   Sector: {} | Vector: {} | Id: {}",
            incident.sector_label().unwrap_or("-"),
            incident.attack_vector_label().unwrap_or("-"),
            incident.id.dimmed()
        );
    }

    println!("\n{}", "=".repeat(80));
    Ok(())
}

async fn cmd_export(
    config: &Config,
    output: PathBuf,
    range: Option<TimeRange>,
    pretty: bool,
) -> Result<()> {
    info!("Initializing JSON export");

    let range = range.unwrap_or(config.analytics.default_time_range);
    let store = open_store(config).await?;
    let incidents = store.list_incidents().await?;

    let timer = OperationTimer::new("export");
    let report = AnalyticsReport::build(&incidents, range, Utc::now());
    let exporter = incident_analytics::JsonExporter::new(&output)?;
    let manifest = exporter.export_report(&report, pretty)?;
    timer.finish();

    println!(
        "{}",
        format_success(&format!(
            "Exported {} to {}",
            manifest.files.join(", "),
            output.display()
        ))
    );

    Ok(())
}
