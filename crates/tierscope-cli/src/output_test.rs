use super::*;

use tierscope_core::{Platform, TierCard};

fn cell<'a>(row: &'a [String], column: &str) -> &'a str {
    let index = COLUMNS
        .iter()
        .position(|c| *c == column)
        .unwrap_or_else(|| panic!("no column {column}"));
    &row[index]
}

fn full_record() -> ExtractionRecord {
    let mut record = ExtractionRecord::new("https://creators.example/alice");
    record.creator_name = "Alice".to_string();
    record.counters.patrons = Some(120);
    record.counters.posts = Some(340);
    record.counters.monthly_income = Some(1250.5);
    record.tiers = vec![TierCard {
        id: "t-1".to_string(),
        name: "Fan".to_string(),
        price: 5.0,
        description_words: 12,
    }];
    record.breakdowns.years.insert("2024".to_string(), 40);
    record.breakdowns.tiers.insert("Fan".to_string(), 12);
    record.breakdowns.tiers.insert("Public".to_string(), 3);
    for (key, count) in [
        ("image_posts", 7),
        ("poll_posts", 2),
        ("other_posts_IconSparkle", 4),
        ("other_posts_IconBadge", 1),
        ("unknown_type_no_svg", 9),
    ] {
        record.breakdowns.post_types.insert(key.to_string(), count);
    }
    record.engagement.public.add(10, 3);
    record.engagement.restricted.add(1503, 40);
    record.social.platforms.insert(Platform::Facebook);
    record.social.platforms.insert(Platform::Discord);
    record.social.total_links = 5;
    record.chat.free = 2;
    record.chat.restricted = 1;
    record.about.total_members = Some(300);
    record.about.word_count = 87;
    record
}

#[test]
fn row_matches_column_count() {
    let row = record_row(&full_record()).unwrap();
    assert_eq!(row.len(), COLUMNS.len());
}

#[test]
fn row_values_follow_record() {
    let row = record_row(&full_record()).unwrap();

    assert_eq!(cell(&row, "URL"), "https://creators.example/alice");
    assert_eq!(cell(&row, "total_post"), "340");
    // about total members beats the header counter
    assert_eq!(cell(&row, "patreon_number"), "300");
    assert_eq!(cell(&row, "income_per_month"), "1250.5");
    assert_eq!(cell(&row, "tier_post_data"), r#"{"Fan":12,"Public":3}"#);
    assert_eq!(cell(&row, "post_year_count"), r#"{"2024":40}"#);
    assert_eq!(cell(&row, "tier_count"), "2");
    assert_eq!(cell(&row, "facebook"), "yes");
    assert_eq!(cell(&row, "twitter"), "no");
    assert_eq!(cell(&row, "discord"), "yes");
    assert_eq!(cell(&row, "social_link_count"), "2");
    assert_eq!(cell(&row, "total_links"), "5");
    assert_eq!(cell(&row, "image_posts"), "7");
    assert_eq!(cell(&row, "video_posts"), "0");
    assert_eq!(cell(&row, "other_posts"), "5");
    assert_eq!(cell(&row, "unknown"), "9");
    assert_eq!(cell(&row, "locked_likes"), "1503");
    assert_eq!(cell(&row, "total_likes_combined"), "1513");
    assert_eq!(cell(&row, "total_comments_combined"), "43");
    assert_eq!(cell(&row, "has_chat_tab"), "yes");
    assert_eq!(cell(&row, "paid_chat_count"), "1");
    assert_eq!(cell(&row, "membership_tier_count"), "1");
    assert!(cell(&row, "membership_tiers_json").contains(r#""tier_id":"t-1""#));
    assert_eq!(cell(&row, "about_total_members"), "300");
    assert_eq!(cell(&row, "about_paid_members"), "");
}

#[test]
fn empty_record_uses_column_defaults() {
    let row = record_row(&ExtractionRecord::new("https://creators.example/x")).unwrap();
    assert_eq!(cell(&row, "patreon_number"), "0");
    assert_eq!(cell(&row, "income_per_month"), "0");
    assert_eq!(cell(&row, "tier_post_data"), "{}");
    assert_eq!(cell(&row, "membership_tiers_json"), "[]");
    assert_eq!(cell(&row, "instagram"), "no");
    assert_eq!(cell(&row, "has_chat_tab"), "no");
    assert_eq!(cell(&row, "about_total_members"), "");
}

#[test]
fn csv_starts_with_bom_and_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), &[full_record()], "20240102_030405")
        .unwrap()
        .unwrap();

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "creator_data_20240102_030405.csv"
    );
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(UTF8_BOM));

    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, COLUMNS.map(str::to_string).to_vec());
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][1], "Alice");
}

#[test]
fn no_records_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    assert!(write_csv(&out, &[], "20240102_030405").unwrap().is_none());
    assert!(!out.exists());
}

#[test]
fn json_output_is_an_array_of_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(dir.path(), &[full_record()], "20240102_030405").unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["creator_name"], "Alice");
    assert_eq!(records[0]["social"]["platforms"][0], "facebook");
}

#[test]
fn timestamp_has_date_and_time_parts() {
    let stamp = timestamp();
    assert_eq!(stamp.len(), 15);
    assert_eq!(&stamp[8..9], "_");
}
