mod error;
mod telemetry;

use std::path::PathBuf;

use chrono::{Duration, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use housing_core::config::AppConfig;
use housing_core::fetch::HttpFetcher;
use housing_core::matching::report::{report_entries, MatchReportEntry};
use housing_core::matching::{load_policies, MatchEngine};
use housing_core::notices::digest::{build_digest, NoticeDigest};
use housing_core::notices::sources::official_sources;
use housing_core::notices::{collect_notices, CollectReport, JsonFileBackend, NoticeStore};
use housing_core::transport::{enrich_transport, AmapClient};
use tracing::info;

use error::AppError;

/// Official self-service portals printed at the end of every match report.
const USEFUL_LINKS: [(&str, &str); 4] = [
    ("深圳市住建局官网", "https://zjj.sz.gov.cn"),
    ("不动产登记查询", "https://www.szreorc.com/"),
    ("社保缴纳记录查询", "https://sipub.sz.gov.cn/hspms/"),
    ("个人纳税记录查询", "https://etax.sz.gov.cn/"),
];

#[derive(Parser, Debug)]
#[command(
    name = "housing-matcher",
    about = "Track Shenzhen subsidized-housing notices and rank them against your profile",
    version
)]
struct Cli {
    /// Log level/filter applied when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the official channels and merge new notices into the store
    Fetch(FetchArgs),
    /// Rank candidate policies against the configured profile
    Match(MatchArgs),
    /// Show the notices stored during the last N days
    Digest(DigestArgs),
    /// Write a profile template to fill in
    Init(InitArgs),
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Path of the notice store file
    #[arg(long, default_value = "notices.json")]
    store: PathBuf,
}

#[derive(Args, Debug)]
struct MatchArgs {
    /// Path of the user profile
    #[arg(long, default_value = "profile.json")]
    config: PathBuf,
    /// Path of the candidate policies file (a JSON list)
    #[arg(long, default_value = "policies.json")]
    policies: PathBuf,
    /// Compute drive times via AMap (needs an API key)
    #[arg(long)]
    transport: bool,
    /// Evaluation date for recency scoring (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// How many ranked policies to print
    #[arg(long, default_value_t = 3)]
    top: usize,
}

#[derive(Args, Debug)]
struct DigestArgs {
    /// Path of the notice store file
    #[arg(long, default_value = "notices.json")]
    store: PathBuf,
    /// Range of the digest in days
    #[arg(long, default_value_t = 7)]
    days: i64,
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Where to write the profile template
    #[arg(long, default_value = "profile.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    match cli.command {
        Command::Fetch(args) => run_fetch(args).await,
        Command::Match(args) => run_match(args).await,
        Command::Digest(args) => run_digest(args),
        Command::Init(args) => run_init(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

async fn run_fetch(args: FetchArgs) -> Result<(), AppError> {
    let fetcher = HttpFetcher::new()?;
    let store = NoticeStore::new(JsonFileBackend::new(&args.store));
    let today = Local::now().date_naive();

    let report = collect_notices(&fetcher, &store, &official_sources(), today).await?;
    render_collect_report(&report, &args.store);
    Ok(())
}

async fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load(&args.config)?;
    let mut policies = load_policies(&args.policies)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    if args.transport {
        let client = AmapClient::new(config.amap_key()?);
        let workplace = config.user_profile.transportation.workplace_address.clone();
        for policy in &mut policies {
            if policy.location.is_empty() {
                continue;
            }
            info!(project = %policy.project_name, "computing drive times");
            policy.transport_info =
                Some(enrich_transport(&client, &policy.location, &workplace).await);
        }
    }

    let workplace_label = config
        .user_profile
        .transportation
        .workplace_name
        .clone()
        .unwrap_or_else(|| "公司".to_string());
    let candidates = policies.len();

    let engine = MatchEngine::new(config.user_profile);
    let ranked = engine.rank(policies, today);
    let entries = report_entries(&ranked, &workplace_label);

    render_match_report(&entries, candidates, args.top, today);
    Ok(())
}

fn run_digest(args: DigestArgs) -> Result<(), AppError> {
    let store = NoticeStore::new(JsonFileBackend::new(&args.store));
    let today = Local::now().date_naive();
    let since = today - Duration::days(args.days);

    let recent = store.recent(since)?;
    let digest = build_digest(&recent, since);
    render_digest(&digest, today);
    Ok(())
}

fn run_init(args: InitArgs) -> Result<(), AppError> {
    AppConfig::write_template(&args.config)?;
    println!("Profile template written to {}.", args.config.display());
    println!("Edit it with your household details, then run `housing-matcher match`.");
    println!("Drive-time scoring additionally needs an AMap key (AMAP_API_KEY).");
    Ok(())
}

fn render_collect_report(report: &CollectReport, store_path: &std::path::Path) {
    println!("Notice collection");
    for source in &report.sources {
        if source.available {
            let strategy = source
                .strategy
                .map(|strategy| strategy.label())
                .unwrap_or("no strategy matched");
            println!("- {}: {} notice(s) via {}", source.source_name, source.found, strategy);
        } else {
            println!("- {}: unavailable this run", source.source_name);
        }
    }
    println!(
        "\n{} new notice(s) merged, {} stored in {}",
        report.merged.added,
        report.merged.total,
        store_path.display()
    );
}

fn render_match_report(
    entries: &[MatchReportEntry],
    candidates: usize,
    top: usize,
    today: NaiveDate,
) {
    println!("Match report (evaluated {today})");
    println!("{} of {candidates} candidate policies are eligible", entries.len());

    if entries.is_empty() {
        println!("\nNo eligible policies; consider widening the profile preferences.");
        return;
    }

    for entry in entries.iter().take(top) {
        println!();
        println!(
            "{}. [{}] {} — {} (score {}/100)",
            entry.rank, entry.recommendation, entry.project_name, entry.district, entry.total_score
        );
        println!(
            "   Location: {} | Type: {} | Layout: {}",
            blank_as_dash(&entry.location),
            blank_as_dash(&entry.housing_type),
            blank_as_dash(&entry.layout)
        );
        println!(
            "   Price: {} | Units: {}",
            entry.price_label, entry.total_units
        );
        match (entry.application_start, entry.application_end) {
            (Some(start), Some(end)) => println!("   Application window: {start} -> {end}"),
            (Some(start), None) => println!("   Application opens: {start}"),
            (None, Some(end)) => println!("   Application closes: {end}"),
            (None, None) => {}
        }

        println!("   Score breakdown:");
        for component in &entry.components {
            println!(
                "   - {}: {}/{} ({})",
                component.factor_label, component.points, component.cap, component.notes
            );
        }

        if !entry.transport.is_empty() {
            println!("   Drive times:");
            for leg in &entry.transport {
                println!(
                    "   - {}: {:.1} km, about {:.0} min, {} {}",
                    leg.landmark, leg.distance_km, leg.duration_min, leg.band_label, leg.band_symbol
                );
            }
        }

        println!("   Link: {}", entry.url);
    }

    println!("\nUseful links");
    for (name, url) in USEFUL_LINKS {
        println!("- {name}: {url}");
    }
}

fn render_digest(digest: &NoticeDigest, today: NaiveDate) {
    println!("Notice digest {} -> {today}", digest.since);

    if digest.is_empty() {
        println!("\nNo notices in this range.");
        return;
    }

    println!("{} notice(s) in range", digest.notice_count());
    for group in &digest.groups {
        let marker = if group.date == today { " (today)" } else { "" };
        println!("\n{}{} — {}", group.date, marker, group.source_name);
        for notice in &group.notices {
            println!("- {}", notice.title);
            println!("  {}", notice.url);
        }
    }

    if digest.priority.is_empty() {
        println!("\nNothing currently open for application.");
    } else {
        println!("\nOpen for application now:");
        for notice in &digest.priority {
            println!("- {} ({})", notice.title, notice.publish_date);
            println!("  {}", notice.url);
        }
    }
}

fn blank_as_dash(value: &str) -> &str {
    if value.is_empty() {
        "—"
    } else {
        value
    }
}
