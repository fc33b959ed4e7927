//! Analysis stages run after binning: timezone search, sleep extraction,
//! daily profile and schedule summaries.

pub mod profile;
pub mod schedule;
pub mod sleep;
pub mod timezone;

pub use profile::daily_profile;
pub use schedule::{format_hm, TypicalSchedule};
pub use sleep::{extract_episodes, SleepEpisode, SleepSummary};
pub use timezone::{OffsetScore, TimezoneSearch};
