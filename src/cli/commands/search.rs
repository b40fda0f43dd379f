//! Search command - stream a practitioner search

use crate::cli::output::{self, colors};
use crate::cli::OutputFormat;
use crate::core::explain::ParsedExplanation;
use crate::core::services::Services;
use crate::core::session::{SearchSession, SessionSnapshot, SessionStage, SessionTimings};
use crate::core::types::{ExplanationStatus, KeywordEvidence, LlmSearchTerms, SearchQuery};
use clap::Args;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Free-text search query
    pub query: String,

    /// Maximum number of matches (clamped to the configured maximum)
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,

    /// Skip AI explanation generation
    #[arg(long)]
    pub no_explanations: bool,

    /// Show explanations as structured evidence instead of raw text
    #[arg(long, short = 'p')]
    pub parse: bool,

    /// Suppress progress messages on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// One match in the command output
#[derive(Debug, Serialize)]
pub struct SearchResultItem {
    pub rank: usize,
    pub practitioner_id: String,
    pub name: String,
    pub headline: String,
    pub location: String,
    pub match_score: f64,
    pub score_band: &'static str,
    pub keywords: KeywordEvidence,
    pub explanation_status: ExplanationStatus,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_explanation: Option<ParsedExplanation>,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponseOutput {
    pub query: String,
    pub stage: SessionStage,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub total_results: usize,
    pub explanations_completed: usize,
    pub progress_percent: u8,
    pub timings: SessionTimings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_search_terms: Option<LlmSearchTerms>,
    pub results: Vec<SearchResultItem>,
}

impl SearchResponseOutput {
    pub fn from_snapshot(snapshot: &SessionSnapshot, services: &Services, parse: bool) -> Self {
        let results = snapshot
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| SearchResultItem {
                rank: i + 1,
                practitioner_id: item.practitioner_id.clone(),
                name: item.name.clone(),
                headline: item.headline.clone(),
                location: item.location.clone(),
                match_score: item.match_score,
                score_band: item.score_band().label(),
                keywords: item.keyword_evidence(),
                explanation_status: item.explanation_status,
                explanation: item.explanation.clone(),
                parsed_explanation: (parse && !item.explanation.is_empty())
                    .then(|| services.parser.parse(&item.explanation)),
            })
            .collect();

        Self {
            query: snapshot
                .query()
                .map(|q| q.query.clone())
                .unwrap_or_default(),
            stage: snapshot.stage(),
            status: snapshot.status_message().to_string(),
            error: snapshot.error().map(str::to_string),
            total_results: snapshot.total_results(),
            explanations_completed: snapshot.completed(),
            progress_percent: snapshot.progress_percent(),
            timings: snapshot.timings().clone(),
            llm_search_terms: snapshot.llm_search_terms().cloned(),
            results,
        }
    }
}

/// Execute the search command
pub async fn execute(
    args: SearchArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut query = SearchQuery::new(args.query.clone());
    if let Some(limit) = args.limit {
        query = query.with_limit(limit);
    }
    if args.no_explanations {
        query = query.with_explanations(false);
    }

    let session = services.session();
    let run_id = session.start(query)?;
    let snapshot = follow(&session, run_id, args.quiet).await;

    let response = SearchResponseOutput::from_snapshot(&snapshot, services, args.parse);

    match format {
        OutputFormat::Human => print_human(&response),
        OutputFormat::Json => output::print_json(&response)?,
    }

    match snapshot.stage() {
        SessionStage::Error => Err(snapshot
            .error()
            .unwrap_or("Search failed")
            .to_string()
            .into()),
        SessionStage::Idle => {
            output::print_warning("Search cancelled, showing partial results");
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Report progress until the run settles; Ctrl-C cancels it
async fn follow(session: &SearchSession, run_id: u64, quiet: bool) -> SessionSnapshot {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Could not listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    follow_until(session, run_id, quiet, ctrl_c).await
}

/// Report progress until run `run_id` settles.
///
/// `interrupt` is polled across every iteration; when it resolves the
/// run is cancelled once and the partial snapshot is returned.
pub async fn follow_until<F>(
    session: &SearchSession,
    run_id: u64,
    quiet: bool,
    interrupt: F,
) -> SessionSnapshot
where
    F: Future<Output = ()>,
{
    let mut watcher = session.subscribe();
    let mut last_status = String::new();
    let mut cancel_requested = false;
    tokio::pin!(interrupt);

    loop {
        let snapshot = Arc::clone(&watcher.borrow_and_update());
        if snapshot.run_id() == run_id {
            if !quiet && snapshot.status_message() != last_status {
                let percent = (snapshot.stage() == SessionStage::Enriching)
                    .then(|| snapshot.progress_percent());
                output::print_progress(snapshot.status_message(), percent);
                last_status = snapshot.status_message().to_string();
            }
            if !snapshot.is_stream_active() {
                return snapshot;
            }
        }

        tokio::select! {
            changed = watcher.changed() => {
                if changed.is_err() {
                    return session.snapshot();
                }
            }
            _ = &mut interrupt, if !cancel_requested => {
                cancel_requested = true;
                session.cancel();
            }
        }
    }
}

fn print_human(output: &SearchResponseOutput) {
    if output.results.is_empty() {
        println!("No matches found for '{}'", colors::label(&output.query));
        return;
    }

    println!(
        "Found {} match(es) for '{}' ({} total):\n",
        colors::number(&output.results.len().to_string()),
        colors::label(&output.query),
        colors::number(&output.total_results.to_string())
    );

    if let Some(terms) = &output.llm_search_terms {
        if !terms.primary_concepts.is_empty() {
            println!(
                "{} {}",
                colors::dim("Concepts:"),
                terms.primary_concepts.join(", ")
            );
        }
        if !terms.expanded_terms.is_empty() {
            println!(
                "{} {}\n",
                colors::dim("Expanded:"),
                terms.expanded_terms.join(", ")
            );
        }
    }

    for result in &output.results {
        println!(
            "[{}] {} {} {}",
            colors::rank(&result.rank.to_string()),
            colors::name(&result.name),
            colors::score(&format!("{:.0}", result.match_score)),
            colors::dim(&format!("({})", result.score_band))
        );
        if !result.headline.is_empty() {
            println!("    {}", result.headline);
        }
        if !result.location.is_empty() {
            println!("    {}", colors::dim(&result.location));
        }
        if !result.keywords.phrases.is_empty() || !result.keywords.words.is_empty() {
            let mut keywords = result.keywords.phrases.clone();
            keywords.extend(result.keywords.words.iter().cloned());
            println!("    {} {}", colors::dim("Keywords:"), keywords.join(", "));
        }

        println!(
            "    {} {}",
            colors::dim("Explanation:"),
            output::format_status(result.explanation_status)
        );
        match &result.parsed_explanation {
            Some(parsed) => output::print_explanation(parsed, 6),
            None => {
                for line in result.explanation.lines().take(8) {
                    println!("      {}", colors::dim(line));
                }
            }
        }
        println!();
    }

    let mut footer = format!("{}", colors::label(&output.status));
    if let Some(ms) = output.timings.total_processing_time_ms {
        footer.push_str(&format!(" in {}", output::format_duration_ms(ms)));
    } else if let Some(ms) = output.timings.search_time_ms {
        footer.push_str(&format!(" (search {})", output::format_duration_ms(ms)));
    }
    println!("{footer}");
}
