use std::time::SystemTime;

use jobseek_core::models::{
    CacheEntry, CoreError, CoreErrorKind, CoreResult, JobPosting, ThemePreference,
};
use jobseek_core::orchestration::{PageSnapshot, SearchOutcome};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Serialize)]
struct PageView<'a> {
    source: &'static str,
    current_page: i64,
    page_count: usize,
    total_results: usize,
    jobs: &'a [JobPosting],
}

#[derive(Serialize)]
struct HistoryItem<'a> {
    index: usize,
    query: &'a str,
    location: &'a str,
    job_type: &'a str,
    experience_level: &'a str,
    results: usize,
    searched_at: String,
}

pub fn print_page(outcome: &SearchOutcome, page: &PageSnapshot, json: bool) -> CoreResult<()> {
    let source = match outcome {
        SearchOutcome::CacheHit { .. } => "cache",
        SearchOutcome::Fetched { .. } => "network",
        SearchOutcome::Superseded => "superseded",
    };

    if json {
        return print_json(&PageView {
            source,
            current_page: page.current_page,
            page_count: page.page_count,
            total_results: page.total_results,
            jobs: &page.postings,
        });
    }

    if page.total_results == 0 {
        println!("No jobs found. Try searching above.");
        return Ok(());
    }

    for posting in &page.postings {
        println!("{}  [{}]", posting.title, posting.source);
        println!("  {}", posting.company);
        if let Some(description) = posting.description.as_deref().filter(|d| !d.is_empty()) {
            println!("  {description}");
        }
        println!("  Apply: {}", posting.link);
        println!();
    }

    let previous = if page.has_previous { "<" } else { " " };
    let next = if page.has_next { ">" } else { " " };
    println!(
        "{previous} page {} of {} {next}  ({} jobs, from {source})",
        page.current_page, page.page_count, page.total_results
    );
    Ok(())
}

pub fn print_history(history: &[CacheEntry], json: bool) -> CoreResult<()> {
    let items: Vec<HistoryItem<'_>> = history
        .iter()
        .enumerate()
        .map(|(index, entry)| HistoryItem {
            index: index + 1,
            query: &entry.key.query,
            location: &entry.key.location,
            job_type: &entry.key.job_type,
            experience_level: &entry.key.experience_level,
            results: entry.results.len(),
            searched_at: format_timestamp(entry.timestamp),
        })
        .collect();

    if json {
        return print_json(&items);
    }

    if items.is_empty() {
        println!("No recent searches.");
        return Ok(());
    }

    for item in &items {
        let filters: Vec<&str> = [item.location, item.job_type, item.experience_level]
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect();
        if filters.is_empty() {
            println!("{:>2}. {}  ({})", item.index, item.query, item.searched_at);
        } else {
            println!(
                "{:>2}. {} [{}]  ({})",
                item.index,
                item.query,
                filters.join(", "),
                item.searched_at
            );
        }
    }
    Ok(())
}

pub fn print_theme(theme: ThemePreference) {
    println!("{}", theme.as_str());
}

fn format_timestamp(timestamp: SystemTime) -> String {
    OffsetDateTime::from(timestamp)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown time".to_string())
}

fn print_json(value: &impl Serialize) -> CoreResult<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(|error| CoreError {
        kind: CoreErrorKind::Internal,
        message: format!("failed to render json output: {error}"),
    })?;
    println!("{rendered}");
    Ok(())
}
