use tracing::debug;

use crate::config::{DelayRange, OrderPolicy};
use crate::models::{AcceptedRecord, CandidateRecord, EMOJI_ACCEPTED, EMOJI_PAGE, EMOJI_REJECTED};
use crate::output::Diagnostics;
use crate::pipeline::{check, check_details, PagePlan, RejectReason, RunState};
use crate::scrapers::{FilmSource, NextPage, PageExtract};
use crate::utils::progress::{format_time, ProgressTracker};
use crate::utils::PageFetcher;

const MILESTONE_EVERY: usize = 10;

/// Where the fetch-extract-accept loop currently is.
#[derive(Debug)]
pub enum DriverPhase {
    Fetching,
    Accepting { extract: PageExtract, fetch_failed: bool },
    Done,
}

/// Result of a finished run, records already in output order.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub records: Vec<AcceptedRecord>,
    pub state: RunState,
    pub pages_visited: u32,
}

/// Drives one job across its pages.
pub struct PaginationDriver<'a> {
    source: &'a dyn FilmSource,
    fetcher: &'a dyn PageFetcher,
    plan: &'a PagePlan,
    order: OrderPolicy,
    delay: DelayRange,
    diagnostics: &'a mut Diagnostics,
    progress: ProgressTracker,
}

impl<'a> PaginationDriver<'a> {
    pub fn new(
        source: &'a dyn FilmSource,
        fetcher: &'a dyn PageFetcher,
        plan: &'a PagePlan,
        order: OrderPolicy,
        delay: DelayRange,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            source,
            fetcher,
            plan,
            order,
            delay,
            diagnostics,
            progress: ProgressTracker::new(None),
        }
    }

    pub async fn run(mut self, mut state: RunState) -> RunReport {
        self.progress = ProgressTracker::new(state.target_count);
        let mut pages_visited = 0;
        let mut phase = DriverPhase::Fetching;

        loop {
            phase = match phase {
                DriverPhase::Fetching => {
                    if state.cap_reached() {
                        DriverPhase::Done
                    } else if let Some(url) = self.plan.url_for(state.page_number) {
                        pages_visited += 1;
                        self.diagnostics
                            .note(format!("{} Loading page {}: {}", EMOJI_PAGE, state.page_number, url));
                        match self.fetcher.fetch(&url).await {
                            Ok(html) => DriverPhase::Accepting {
                                extract: self.source.extract(&html, &url),
                                fetch_failed: false,
                            },
                            Err(e) => {
                                self.diagnostics
                                    .warn(format!("Error accessing URL {}: {}", url, e));
                                DriverPhase::Accepting {
                                    extract: PageExtract::empty(),
                                    fetch_failed: true,
                                }
                            }
                        }
                    } else {
                        debug!("Page plan exhausted at page {}", state.page_number);
                        DriverPhase::Done
                    }
                }
                DriverPhase::Accepting { extract, fetch_failed } => {
                    let next_page = extract.next_page;
                    let found = extract.candidates.len();
                    state = self.process_page(state, extract).await;

                    if state.cap_reached() {
                        self.diagnostics.note(format!(
                            "Reached the limit of {} films, stopping",
                            state.accepted_count()
                        ));
                        DriverPhase::Done
                    } else if next_page == NextPage::Exhausted {
                        DriverPhase::Done
                    } else if found == 0 && !(fetch_failed && self.plan.is_bounded()) {
                        // An empty page ends the data, unless the page plan
                        // already knows a later page exists
                        DriverPhase::Done
                    } else {
                        state.page_number += 1;
                        let pause = self.delay.pick();
                        if !pause.is_zero() {
                            tokio::time::sleep(pause).await;
                        }
                        DriverPhase::Fetching
                    }
                }
                DriverPhase::Done => break,
            };
        }

        let mut records = state.accepted.clone();
        if self.order == OrderPolicy::RankSorted {
            // Stable, so unranked records keep their relative order at the end
            records.sort_by_key(|r| (r.record.rank.is_none(), r.record.rank));
        }

        self.diagnostics.note(format!(
            "Finished after {} page(s): {} accepted, {} rejected, {} unreadable rows",
            pages_visited,
            records.len(),
            state.rejected.len(),
            state.skipped_rows
        ));

        RunReport {
            records,
            state,
            pages_visited,
        }
    }

    /// Filter, dedup and accept one page's candidates in document order,
    /// stopping as soon as the cap is reached.
    pub async fn process_page(&mut self, mut state: RunState, extract: PageExtract) -> RunState {
        for reason in &extract.skipped {
            debug!("Skipped row on page {}: {}", state.page_number, reason);
        }
        state.skipped_rows += extract.skipped.len();

        for candidate in extract.candidates {
            if state.cap_reached() {
                break;
            }

            let candidate = if self.source.enriches() {
                // Known duplicates never cost a film-page fetch
                if !candidate.year.is_empty() && !state.dedup.is_new(&candidate) {
                    self.reject(&mut state, candidate, RejectReason::Duplicate);
                    continue;
                }
                match self.source.enrich(candidate.clone(), self.fetcher).await {
                    Ok(enriched) => enriched,
                    Err(reason) => {
                        self.reject(&mut state, candidate, RejectReason::Skipped(reason));
                        continue;
                    }
                }
            } else {
                candidate
            };

            let verdict = check(&candidate, state.min_popularity, state.rank_ceiling)
                .and_then(|()| check_details(&candidate, &state.details));
            if let Err(reason) = verdict {
                self.reject(&mut state, candidate, reason);
                continue;
            }
            if !state.dedup.is_new(&candidate) {
                self.reject(&mut state, candidate, RejectReason::Duplicate);
                continue;
            }

            self.accept(&mut state, candidate);
        }

        state
    }

    fn accept(&mut self, state: &mut RunState, candidate: CandidateRecord) {
        let label = candidate.label();
        let order = state.accept(candidate).original_order;
        debug!("{} #{} {}", EMOJI_ACCEPTED, order, label);

        if order % MILESTONE_EVERY == 0 {
            let stats = self.progress.stats(order);
            let target = state
                .target_count
                .map(|t| t.to_string())
                .unwrap_or_else(|| "?".to_string());
            self.diagnostics.note(format!(
                "Processed {}/{} films | Elapsed {} | Remaining {} | {:.2} films/second | Last: {}",
                order,
                target,
                format_time(stats.elapsed),
                stats.remaining.map(format_time).unwrap_or_else(|| "?".to_string()),
                stats.per_second,
                label
            ));
        }
    }

    fn reject(&mut self, state: &mut RunState, candidate: CandidateRecord, reason: RejectReason) {
        let rejected = state.reject(candidate, reason);
        let line = format!(
            "{} {} was not added: {}",
            EMOJI_REJECTED,
            rejected.record.label(),
            rejected.reason
        );
        if matches!(rejected.reason, RejectReason::Duplicate) {
            debug!("{}", line);
        } else {
            self.diagnostics.note(line);
        }
    }
}
