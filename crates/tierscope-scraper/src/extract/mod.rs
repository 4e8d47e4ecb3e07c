//! Section extractors. Each reads one part of a profile page and falls back
//! to the field's default when the section is missing or misbehaves.

pub mod about;
pub mod breakdowns;
pub mod chat;
pub mod feed;
pub mod identity;
pub mod social;
pub mod tiers;

pub use about::extract_about;
pub use breakdowns::{extract_breakdowns, post_type_for_icon, BreakdownKind, FilterLayout};
pub use chat::extract_chat;
pub use feed::{extract_engagement, load_all_posts};
pub use identity::{dismiss_age_gate, extract_counters, read_creator_name};
pub use social::{count_external_links, extract_social, is_own_domain};
pub use tiers::{extract_tiers, scan_cards, CardLayout, CarouselState, TierEntry};
