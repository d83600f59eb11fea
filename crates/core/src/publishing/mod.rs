//! Published posts: the overview feed, the calendar and the analytics screen.

pub mod metrics;
pub mod post;
pub mod range;

pub use metrics::{AnalyticsSummary, DailyViews, PlatformEngagement, TopPost};
pub use post::{truncate_caption, CalendarEntry, RecentPost};
pub use range::{AnalyticsRange, CalendarParams, CalendarWindow, Platform};
