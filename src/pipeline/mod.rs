pub mod dedup;
pub mod driver;
pub mod filter;
pub mod pages;
pub mod state;

pub use dedup::Deduplicator;
pub use driver::{DriverPhase, PaginationDriver, RunReport};
pub use filter::{accept, check, check_details, DetailRules, RejectReason};
pub use pages::PagePlan;
pub use state::{RejectedRecord, RunState};
