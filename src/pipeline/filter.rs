use std::fmt;

use crate::models::CandidateRecord;
use crate::scrapers::SkipReason;

/// Why a candidate did not make it into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnknownPopularity,
    InsufficientPopularity { count: u64, min: u64 },
    BeyondRankCeiling { rank: u32, ceiling: u32 },
    UnknownRuntime,
    ShortRuntime { minutes: u32, min: u32 },
    MissingExternalId,
    Duplicate,
    Skipped(SkipReason),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnknownPopularity => write!(f, "Unknown rating count"),
            RejectReason::InsufficientPopularity { count, min } => {
                write!(f, "Insufficient ratings ({} < {})", count, min)
            }
            RejectReason::BeyondRankCeiling { rank, ceiling } => {
                write!(f, "Rank {} beyond top {}", rank, ceiling)
            }
            RejectReason::UnknownRuntime => write!(f, "Unknown runtime"),
            RejectReason::ShortRuntime { minutes, min } => {
                write!(f, "Short runtime ({} < {} mins)", minutes, min)
            }
            RejectReason::MissingExternalId => write!(f, "Missing TMDB ID"),
            RejectReason::Duplicate => write!(f, "Already added"),
            RejectReason::Skipped(reason) => write!(f, "Skipped: {}", reason),
        }
    }
}

/// Threshold and rank checks. Rejection is an ordinary outcome, never an error.
pub fn check(
    record: &CandidateRecord,
    min_popularity: Option<u64>,
    rank_ceiling: Option<u32>,
) -> Result<(), RejectReason> {
    if let Some(min) = min_popularity {
        match record.popularity {
            None => return Err(RejectReason::UnknownPopularity),
            Some(count) if count < min => {
                return Err(RejectReason::InsufficientPopularity { count, min })
            }
            Some(_) => {}
        }
    }

    if let (Some(ceiling), Some(rank)) = (rank_ceiling, record.rank) {
        if rank > ceiling {
            return Err(RejectReason::BeyondRankCeiling { rank, ceiling });
        }
    }

    Ok(())
}

pub fn accept(record: &CandidateRecord, min_popularity: Option<u64>, rank_ceiling: Option<u32>) -> bool {
    check(record, min_popularity, rank_ceiling).is_ok()
}

/// Rules that need the film page: runtime and external id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailRules {
    pub min_runtime: Option<u32>,
    pub require_external_id: bool,
}

/// Runs after [`check`], in that order.
pub fn check_details(record: &CandidateRecord, rules: &DetailRules) -> Result<(), RejectReason> {
    if let Some(min) = rules.min_runtime {
        match record.runtime {
            None => return Err(RejectReason::UnknownRuntime),
            Some(minutes) if minutes < min => {
                return Err(RejectReason::ShortRuntime { minutes, min })
            }
            Some(_) => {}
        }
    }

    if rules.require_external_id && record.external_id.is_none() {
        return Err(RejectReason::MissingExternalId);
    }

    Ok(())
}
