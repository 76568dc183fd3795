pub mod record;
pub mod site;

pub use record::*;
pub use site::*;

// Markers used in operator-facing progress lines
pub const EMOJI_ACCEPTED: &str = "✅";
pub const EMOJI_REJECTED: &str = "❌";
pub const EMOJI_PAGE: &str = "📄";
pub const EMOJI_SAVED: &str = "💾";
