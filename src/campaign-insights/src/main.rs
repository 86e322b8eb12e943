//! Campaign Insights: A/B performance charts and creative heatmaps, plus the
//! campaign co-pilot, from the command line.

use std::io::Write;

use campaign_copilot::{CopilotView, Role, Typewriter};
use campaign_core::config::AppConfig;
use campaign_core::format;
use campaign_core::types::{Campaign, DateRange, Granularity, Metric, Variant, WinnerPolicy};
use campaign_core::{CampaignCatalog, CampaignError};
use campaign_heatmap::gradient::legend;
use campaign_heatmap::{generate_points, HeatmapOverlay, ImageSize};
use campaign_reporting::chart::{ChartView, ComparisonChart};
use campaign_reporting::{best_variants, PerformanceSnapshot};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-insights")]
#[command(about = "Campaign A/B analytics, creative heatmaps and co-pilot")]
#[command(version)]
struct Cli {
    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, global = true, env = "CAMPAIGN_INSIGHTS__TODAY")]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List campaigns with their headline rates
    Campaigns {
        /// Case-insensitive filter on the campaign title
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Render the Version A vs Version B comparison chart
    Chart {
        /// Use this campaign's date range
        #[arg(short, long)]
        campaign_id: Option<String>,

        /// Range start (defaults to January 1st of the current year)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Range end (defaults to today)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// ctr, conversion_rate or revenue
        #[arg(short, long)]
        metric: Option<Metric>,

        /// monthly or daily
        #[arg(short, long)]
        granularity: Option<Granularity>,

        /// Seed for the synthetic traffic
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value_t = false)]
        hide_a: bool,

        #[arg(long, default_value_t = false)]
        hide_b: bool,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Compare both variants of a campaign against targets
    Compare {
        #[arg(short, long)]
        campaign_id: String,

        /// computed, a or b (overrides config)
        #[arg(long)]
        policy: Option<WinnerPolicy>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Generate a click heatmap for a creative preview
    Heatmap {
        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,

        #[arg(long)]
        seed: Option<u64>,

        /// Overlay opacity, 0-100
        #[arg(long)]
        opacity: Option<u8>,

        /// Write the SVG overlay to this path ("-" for stdout)
        #[arg(long)]
        svg: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Chat with the campaign co-pilot
    Copilot {
        #[arg(short, long)]
        campaign_id: String,

        /// Message to send (repeatable)
        #[arg(short, long)]
        message: Vec<String>,

        /// Send a preset prompt by index (repeatable)
        #[arg(short, long)]
        preset: Vec<usize>,

        /// Reveal replies with the typewriter animation
        #[arg(long, default_value_t = false)]
        animate: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campaign_insights=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let catalog = CampaignCatalog::with_demo_campaigns();

    info!(campaigns = catalog.len(), %today, "Campaign Insights starting");

    match cli.command {
        Commands::Campaigns { search, json } => cmd_campaigns(&catalog, search, json),
        Commands::Chart {
            campaign_id,
            from,
            to,
            metric,
            granularity,
            seed,
            hide_a,
            hide_b,
            json,
        } => {
            let range = match campaign_id {
                Some(id) => match lookup(&catalog, &id)? {
                    Some(campaign) => campaign.date_range,
                    None => return Ok(()),
                },
                None => {
                    let ytd = DateRange::year_to_date(today);
                    DateRange::new(from.unwrap_or(ytd.from), to.unwrap_or(ytd.to))
                }
            };
            let mut chart = ComparisonChart::new(
                range,
                granularity.unwrap_or(config.reporting.default_granularity),
                metric.unwrap_or(config.reporting.default_metric),
            );
            if hide_a {
                chart.toggle(Variant::A);
            }
            if hide_b {
                chart.toggle(Variant::B);
            }
            cmd_chart(&config, &chart, seed, today, json)
        }
        Commands::Compare {
            campaign_id,
            policy,
            json,
        } => {
            let Some(campaign) = lookup(&catalog, &campaign_id)? else {
                return Ok(());
            };
            cmd_compare(
                &config,
                &campaign,
                policy.unwrap_or(config.reporting.winner_policy),
                json,
            )
        }
        Commands::Heatmap {
            width,
            height,
            seed,
            opacity,
            svg,
            json,
        } => cmd_heatmap(&config, width, height, seed, opacity, svg, json),
        Commands::Copilot {
            campaign_id,
            message,
            preset,
            animate,
        } => {
            let Some(campaign) = lookup(&catalog, &campaign_id)? else {
                return Ok(());
            };
            cmd_copilot(&config, &campaign, message, preset, animate).await
        }
    }
}

/// Fetch a campaign, printing the not-found placeholder instead of failing.
fn lookup(catalog: &CampaignCatalog, id: &str) -> anyhow::Result<Option<Campaign>> {
    match catalog.get(id) {
        Ok(campaign) => Ok(Some(campaign)),
        Err(e) if e.is_not_found() => {
            println!("Campaign not found");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

fn cmd_campaigns(
    catalog: &CampaignCatalog,
    search: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let campaigns = match search.as_deref() {
        Some(query) => catalog.search(query),
        None => catalog.list(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&campaigns)?);
        return Ok(());
    }

    let overview = catalog.overview();
    println!("=== Campaigns ===");
    println!();
    println!(
        "  Running: {}   Testing: {}   Scheduled: {}   Avg CTR: {}   Avg CR: {}",
        overview.running,
        overview.testing,
        overview.scheduled,
        format::percent(overview.average_ctr),
        format::percent(overview.average_conversion_rate),
    );
    println!();
    println!(
        "  {:<4} {:<28} {:<14} {:<10} {:>6} {:>6}  Dates",
        "ID", "Title", "Owner", "Status", "CTR", "CR"
    );
    println!("  {}", "-".repeat(90));
    for c in &campaigns {
        println!(
            "  {:<4} {:<28} {:<14} {:<10} {:>6} {:>6}  {} → {} {}",
            c.id,
            truncate(&c.title, 26),
            truncate(&c.owner, 14),
            format!("{:?}", c.status),
            format::percent(c.click_through_rate),
            format::percent(c.conversion_rate),
            c.date_range.from.format("%b %d"),
            c.date_range.to.format("%b %d"),
            c.performance.emoji(),
        );
    }
    println!();
    println!("  Total: {} campaigns", campaigns.len());
    Ok(())
}

fn cmd_chart(
    config: &AppConfig,
    chart: &ComparisonChart,
    seed: Option<u64>,
    today: NaiveDate,
    json: bool,
) -> anyhow::Result<()> {
    let mut rng = rng_for(seed);
    let view = chart.render(&config.reporting.samples, &mut rng, today);
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    match view {
        ChartView::Empty {
            message,
            reset_range,
        } => {
            println!("{message}");
            println!(
                "Reset filter: --from {} --to {}",
                reset_range.from, reset_range.to
            );
        }
        ChartView::Bars(bars) => {
            println!("=== {} ===", bars.title);
            println!();
            let cell = |v: Option<f64>| match v {
                Some(v) => campaign_reporting::spec(bars.metric).format(v),
                None => "-".to_string(),
            };
            println!("  {:<8} {:>12} {:>12}", "Period", "Version A", "Version B");
            println!("  {}", "-".repeat(34));
            for row in &bars.rows {
                println!("  {:<8} {:>12} {:>12}", row.label, cell(row.a), cell(row.b));
            }
            if !bars.tick_labels.is_empty() {
                println!();
                println!("  Axis: {}", bars.tick_labels.join(" | "));
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct VariantReport {
    variant: Variant,
    best_for: Vec<Metric>,
    snapshot: PerformanceSnapshot,
}

fn cmd_compare(
    config: &AppConfig,
    campaign: &Campaign,
    policy: WinnerPolicy,
    json: bool,
) -> anyhow::Result<()> {
    let best = best_variants(&campaign.variants, policy);
    let reports: Vec<VariantReport> = Variant::ALL
        .into_iter()
        .map(|variant| VariantReport {
            variant,
            best_for: Metric::ALL
                .into_iter()
                .filter(|m| best.for_metric(*m) == variant)
                .collect(),
            snapshot: PerformanceSnapshot::new(
                campaign.variants.get(variant),
                &config.reporting.targets,
            ),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!("=== {} ===", campaign.title);
    println!();
    for report in &reports {
        let badge = if report.best_for.is_empty() {
            String::new()
        } else {
            "  ★ Best version".to_string()
        };
        let s = &report.snapshot;
        println!("  {}{}", report.variant.display_name(), badge);
        println!(
            "    CTR:      {:>8}  target {:>8}  {:>5.0}%",
            format::percent(s.ctr.actual),
            format::percent(s.ctr.target),
            s.ctr.percent
        );
        println!(
            "    CR:       {:>8}  target {:>8}  {:>5.0}%",
            format::percent(s.conversion_rate.actual),
            format::percent(s.conversion_rate.target),
            s.conversion_rate.percent
        );
        println!(
            "    Revenue:  {:>8}  target {:>8}  {:>5.0}%",
            format::currency_eur(s.revenue.actual),
            format::currency_eur(s.revenue.target),
            s.revenue.percent
        );
        if s.has_unmet_targets() {
            println!("    → Improve with co-pilot: campaign-insights copilot -c {}", campaign.id);
        }
        println!();
    }
    Ok(())
}

fn cmd_heatmap(
    config: &AppConfig,
    width: Option<u32>,
    height: Option<u32>,
    seed: Option<u64>,
    opacity: Option<u8>,
    svg: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let size = ImageSize::new(
        width.unwrap_or(config.heatmap.image_width),
        height.unwrap_or(config.heatmap.image_height),
    );
    let points = match generate_points(size, &mut rng_for(seed)) {
        Ok(points) => points,
        Err(CampaignError::Validation(msg)) => {
            println!("{msg}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut overlay = HeatmapOverlay::from_config(&config.heatmap);
    if !overlay.is_visible() {
        overlay.toggle();
    }
    if let Some(opacity) = opacity {
        overlay.set_opacity(opacity);
    }

    if let Some(path) = svg {
        let rendered = overlay.render_svg(&points, size);
        if path == "-" {
            print!("{rendered}");
        } else {
            std::fs::write(&path, rendered)?;
            info!(path = %path, points = points.len(), "Heatmap overlay written");
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&overlay.spots(&points, size))?);
        return Ok(());
    }

    println!("=== Click heatmap {}x{} ===", size.width, size.height);
    println!();
    println!("  Points:   {}", points.len());
    println!(
        "  Clicks:   {}",
        format::count(points.iter().map(|p| p.clicks as u64).sum())
    );
    println!("  Opacity:  {}%", overlay.opacity());
    for label in ["CTA Button", "Card Image"] {
        let clicks: u64 = points
            .iter()
            .filter(|p| p.element.as_deref() == Some(label))
            .map(|p| p.clicks as u64)
            .sum();
        println!("  {:<10} {} clicks", format!("{label}:"), format::count(clicks));
    }
    let swatches: Vec<String> = legend().iter().map(|c| c.to_hex()).collect();
    println!();
    println!("  Legend (low → high): {}", swatches.join(" "));
    Ok(())
}

async fn cmd_copilot(
    config: &AppConfig,
    campaign: &Campaign,
    messages: Vec<String>,
    presets: Vec<usize>,
    animate: bool,
) -> anyhow::Result<()> {
    let mut view = CopilotView::open(campaign, &config.reporting.targets, &config.copilot);
    println!("=== Co-pilot · {} ===", view.campaign_title());
    println!();

    for index in presets {
        if view.apply_preset(index).is_none() {
            warn!(index, "Unknown preset prompt");
            continue;
        }
        view.send();
    }
    for message in messages {
        view.set_draft(message);
        view.send();
    }

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let interrupted = tokio::select! {
        _ = token.cancelled() => true,
        _ = view.settle() => false,
    };
    if interrupted {
        view.close();
    }

    for message in view.messages() {
        match message.role {
            Role::User => println!("you › {}", message.content),
            Role::Assistant if animate && !token.is_cancelled() => {
                print!("co-pilot › ");
                let typewriter = Typewriter::from_config(&message.content, &config.copilot);
                reveal(typewriter, token.clone()).await?;
            }
            Role::Assistant => println!("co-pilot › {}", message.content),
        }
        println!();
    }

    if view.has_unsaved_changes() {
        println!("(Unsaved changes)");
    }
    view.close();
    Ok(())
}

/// Stream a typewriter reveal to stdout.
async fn reveal(typewriter: Typewriter, token: CancellationToken) -> anyhow::Result<()> {
    let full = typewriter.text().to_string();
    let (mut rx, handle) = typewriter.spawn(token);
    let mut shown = 0usize;
    let mut stdout = std::io::stdout();
    while rx.changed().await.is_ok() {
        let frame = rx.borrow_and_update().displayed.clone();
        stdout.write_all(frame[shown..].as_bytes())?;
        stdout.flush()?;
        shown = frame.len();
    }
    let _ = handle.await;
    if shown < full.len() {
        println!("{}", &full[shown..]);
    } else {
        println!();
    }
    Ok(())
}
