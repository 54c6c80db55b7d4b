pub mod adapter;
pub mod apify;
pub mod discovery;
pub mod error;
mod parse_helpers;
pub mod retry;
pub mod sources;
pub mod throttle;

pub use adapter::{AdapterRegistry, SourceAdapter};
pub use apify::ApifyClient;
pub use discovery::{ApifySearchResolver, ProfileResolver};
pub use error::ScraperError;
pub use retry::{backoff_schedule, run_with_retry, Sleeper, TokioSleeper};
pub use sources::{apify_registry, InstagramAdapter, TiktokAdapter, YoutubeAdapter};
pub use throttle::RateLimiter;
