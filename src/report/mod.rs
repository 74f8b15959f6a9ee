pub mod counters;
pub mod format;

pub use counters::{recover_counters, seeded_counters};
pub use format::format_post;
