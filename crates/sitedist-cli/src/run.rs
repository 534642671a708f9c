//! The `rank` command: load sites, drive a calculation run, print results.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use sitedist_core::{AppConfig, DistanceResult, ResultTag, SiteRecord, SiteStatus, TagFilter};
use sitedist_geo::{CacheStore, GeocodeResolver, NominatimClient, OsrmClient, RouteDistanceService};
use sitedist_pipeline::{Orchestrator, Pacing, RunEvent, RunSummary};

use crate::display::render_table;
use crate::input::{normalize_reference, parse_sites};

/// How often queued run events are drained.
const DRAIN_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Args)]
pub struct RankArgs {
    /// Address distances are measured from
    #[arg(long, short)]
    reference: String,

    /// File with one site per line; reads stdin when omitted
    #[arg(long)]
    sites: Option<PathBuf>,

    /// Only show these tags (success, cached, warning, error)
    #[arg(long, value_delimiter = ',')]
    show: Vec<ResultTag>,

    /// Also write the full report as JSON to this file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Override the coordinate cache location
    #[arg(long)]
    cache: Option<PathBuf>,
}

/// Run `rank` end to end.
///
/// # Errors
///
/// Returns an error if the sites cannot be read, no valid site is found, a
/// provider client cannot be built, the run is refused or aborts, or the
/// JSON report cannot be written.
pub async fn rank(config: &AppConfig, args: RankArgs) -> anyhow::Result<()> {
    let reference = normalize_reference(&args.reference);
    let text = read_sites(args.sites.as_deref())?;
    let parsed = parse_sites(&text);
    if parsed.duplicates > 0 || parsed.rejected > 0 {
        eprintln!(
            "Skipped {} duplicate and {} unparseable line(s)",
            parsed.duplicates, parsed.rejected
        );
    }
    if parsed.addresses.is_empty() {
        anyhow::bail!(
            "no valid site addresses found; expected `street, suburb, STATE`, \
             tab-separated or pipe-separated columns"
        );
    }

    let cache_path = args.cache.unwrap_or_else(|| config.cache_path.clone());
    let cache = CacheStore::load(&cache_path);
    let sites: Vec<SiteRecord> = parsed
        .addresses
        .into_iter()
        .map(|address| {
            let mut record = SiteRecord::new(address);
            cache.hydrate(&mut record);
            record
        })
        .collect();
    let already_cached = sites.iter().filter(|s| s.status == SiteStatus::Cached).count();
    eprintln!("Loaded {} site(s), {already_cached} already cached", sites.len());

    let geocoder = NominatimClient::with_base_url(
        &config.geocoder_url,
        &config.user_agent,
        config.request_timeout_secs,
        &config.country_codes,
    )?;
    let router = OsrmClient::with_base_url(
        &config.router_url,
        &config.user_agent,
        config.request_timeout_secs,
    )?;
    let orchestrator = Orchestrator::new(
        GeocodeResolver::new(geocoder, Duration::from_millis(config.attempt_delay_ms)),
        RouteDistanceService::new(router),
        Arc::new(Mutex::new(cache)),
        Pacing::from_config(config),
    );

    let mut handle = orchestrator.start(&reference, sites.clone())?;
    tracing::info!(run_id = %handle.run_id(), %reference, "started calculation");

    let cancel = handle.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Cancelling after the current site...");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let mut view = RunView::new(sites);
    let mut ticker = tokio::time::interval(DRAIN_INTERVAL);
    while !view.finished {
        ticker.tick().await;
        let finished_before_drain = handle.is_finished();
        for event in handle.drain() {
            if let Some(line) = view.apply(event) {
                eprintln!("{line}");
            }
        }
        if finished_before_drain && !view.finished {
            anyhow::bail!("calculation ended without reporting an outcome");
        }
    }

    if let Some(message) = view.error {
        anyhow::bail!("calculation failed: {message}");
    }
    let Some(results) = view.results else {
        eprintln!("Calculation cancelled; no results.");
        return Ok(());
    };

    let filter = tag_filter(&args.show);
    print!("{}", render_table(&results, &filter));

    if let Some(path) = args.json {
        write_report(
            &path,
            &Report {
                reference: &reference,
                summary: view.summary.as_ref(),
                results: &results,
            },
        )?;
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

fn read_sites(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read sites from {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read sites from stdin")?;
            Ok(text)
        }
    }
}

/// Every tag when none were requested.
fn tag_filter(show: &[ResultTag]) -> TagFilter {
    if show.is_empty() {
        TagFilter::all()
    } else {
        show.iter().copied().collect()
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    reference: &'a str,
    summary: Option<&'a RunSummary>,
    results: &'a [DistanceResult],
}

fn write_report(path: &Path, report: &Report<'_>) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(report)?;
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

/// Consumer-side state of a run, updated event by event.
struct RunView {
    sites: Vec<SiteRecord>,
    last_site: Option<usize>,
    results: Option<Vec<DistanceResult>>,
    summary: Option<RunSummary>,
    error: Option<String>,
    finished: bool,
}

impl RunView {
    fn new(sites: Vec<SiteRecord>) -> Self {
        Self {
            sites,
            last_site: None,
            results: None,
            summary: None,
            error: None,
            finished: false,
        }
    }

    /// Applies one event and returns the line to show for it, if any.
    fn apply(&mut self, event: RunEvent) -> Option<String> {
        match event {
            RunEvent::Status(message) => Some(message),
            RunEvent::Progress(fraction) => {
                let site = self.last_site.and_then(|i| self.sites.get(i))?;
                let label = match site.status {
                    SiteStatus::Unresolved => "not found".to_owned(),
                    _ => site
                        .location
                        .as_ref()
                        .map_or_else(String::new, |l| l.match_description.clone()),
                };
                Some(format!("[{:>3.0}%] {} ({label})", fraction * 100.0, site.address))
            }
            RunEvent::SiteUpdate(update) => {
                if let Some(site) = self.sites.get_mut(update.index) {
                    update.apply_to(site);
                    self.last_site = Some(update.index);
                }
                None
            }
            RunEvent::Results(results) => {
                self.results = Some(results);
                None
            }
            RunEvent::Complete(summary) => {
                self.summary = Some(summary);
                self.finished = true;
                None
            }
            RunEvent::Cancelled => {
                self.finished = true;
                None
            }
            RunEvent::Error(message) => {
                self.error = Some(message);
                self.finished = true;
                None
            }
        }
    }
}
