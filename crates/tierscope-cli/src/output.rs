//! CSV and JSON writers for gathered records.
//!
//! The CSV has a fixed column set. Mapping fields are embedded as JSON
//! strings, platform presence is `yes`/`no`, and unknown about-page member
//! counts are left empty.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tierscope_core::{BreakdownMap, ExtractionRecord, Platform};
use tierscope_scraper::extract::breakdowns::UNKNOWN_POST_TYPE;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Post-type buckets with their own column, in column order.
const POST_TYPE_COLUMNS: [&str; 8] = [
    "text_posts",
    "image_posts",
    "video_posts",
    "podcast_posts",
    "audio_posts",
    "link_posts",
    "poll_posts",
    "livestream_posts",
];

const OTHER_POSTS_PREFIX: &str = "other_posts";

pub(crate) const COLUMNS: [&str; 41] = [
    "URL",
    "creator_name",
    "total_post",
    "patreon_number",
    "income_per_month",
    "tier_post_data",
    "post_year_count",
    "tier_count",
    "total_links",
    "facebook",
    "twitter",
    "instagram",
    "youtube",
    "twitch",
    "tiktok",
    "discord",
    "social_link_count",
    "text_posts",
    "image_posts",
    "video_posts",
    "podcast_posts",
    "audio_posts",
    "link_posts",
    "poll_posts",
    "livestream_posts",
    "other_posts",
    "unknown",
    "public_likes",
    "public_comments",
    "locked_likes",
    "locked_comments",
    "total_likes_combined",
    "total_comments_combined",
    "has_chat_tab",
    "free_chat_count",
    "paid_chat_count",
    "membership_tier_count",
    "membership_tiers_json",
    "about_word_count",
    "about_total_members",
    "about_paid_members",
];

/// Local wall-clock stamp used in output file names.
pub(crate) fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "yes" } else { "no" };
    text.to_string()
}

fn map_json(map: &BreakdownMap) -> anyhow::Result<String> {
    Ok(serde_json::to_string(map)?)
}

fn optional(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Known buckets, then the folded `other_posts_*` sum, then the unknown bucket.
fn post_type_cells(post_types: &BreakdownMap) -> Vec<String> {
    let mut cells: Vec<String> = POST_TYPE_COLUMNS
        .iter()
        .map(|key| post_types.get(*key).copied().unwrap_or(0).to_string())
        .collect();
    let other: u64 = post_types
        .iter()
        .filter(|(key, _)| key.starts_with(OTHER_POSTS_PREFIX))
        .map(|(_, count)| count)
        .sum();
    cells.push(other.to_string());
    cells.push(post_types.get(UNKNOWN_POST_TYPE).copied().unwrap_or(0).to_string());
    cells
}

pub(crate) fn record_row(record: &ExtractionRecord) -> anyhow::Result<Vec<String>> {
    let mut row = Vec::with_capacity(COLUMNS.len());
    row.push(record.url.clone());
    row.push(record.creator_name.clone());
    row.push(record.counters.posts.unwrap_or(0).to_string());
    row.push(record.final_patron_count().to_string());
    row.push(record.counters.monthly_income.unwrap_or(0.0).to_string());
    row.push(map_json(&record.breakdowns.tiers)?);
    row.push(map_json(&record.breakdowns.years)?);
    row.push(record.breakdowns.tiers.len().to_string());
    row.push(record.social.total_links.to_string());
    row.extend(Platform::ALL.iter().map(|p| yes_no(record.social.has(*p))));
    row.push(record.social.platform_count().to_string());
    row.extend(post_type_cells(&record.breakdowns.post_types));

    let engagement = &record.engagement;
    row.push(engagement.public.likes.to_string());
    row.push(engagement.public.comments.to_string());
    row.push(engagement.restricted.likes.to_string());
    row.push(engagement.restricted.comments.to_string());
    row.push(engagement.total_likes().to_string());
    row.push(engagement.total_comments().to_string());

    row.push(yes_no(record.chat.has_chat()));
    row.push(record.chat.free.to_string());
    row.push(record.chat.restricted.to_string());

    row.push(record.tiers.len().to_string());
    row.push(serde_json::to_string(&record.tiers)?);

    row.push(record.about.word_count.to_string());
    row.push(optional(record.about.total_members));
    row.push(optional(record.about.paid_members));
    Ok(row)
}

/// Write `creator_data_<stamp>.csv` under `dir`, creating it if needed.
///
/// Returns `None` without touching the filesystem when there are no records.
pub(crate) fn write_csv(
    dir: &Path,
    records: &[ExtractionRecord],
    stamp: &str,
) -> anyhow::Result<Option<PathBuf>> {
    if records.is_empty() {
        return Ok(None);
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(format!("creator_data_{stamp}.csv"));

    let mut file = BufWriter::new(
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?,
    );
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.write_record(record_row(record)?)?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = records.len(), "csv written");
    Ok(Some(path))
}

pub(crate) fn write_json(
    dir: &Path,
    records: &[ExtractionRecord],
    stamp: &str,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(format!("creator_data_{stamp}.json"));
    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)?;
    tracing::info!(path = %path.display(), records = records.len(), "json written");
    Ok(path)
}

#[cfg(test)]
#[path = "output_test.rs"]
mod tests;
