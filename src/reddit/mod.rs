pub mod platform;
pub mod session;

pub use platform::PostingPlatform;
pub use session::{RedditCredentials, RedditSession};
