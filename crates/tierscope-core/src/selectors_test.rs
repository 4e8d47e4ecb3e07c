use std::io::Write;

use super::*;

#[test]
fn default_set_passes_validation() {
    SelectorSet::default()
        .validate()
        .expect("built-in selectors must be valid");
}

#[test]
fn default_entries_have_unique_names() {
    let set = SelectorSet::default();
    let mut names: Vec<&str> = set.entries().into_iter().map(|(n, _)| n).collect();
    let before = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), before);
}

#[test]
fn xpath_entries_lists_xpath_locators_only() {
    let mut set = SelectorSet::default();
    let names = set.xpath_entries();
    assert!(names.contains(&"post_type_count"));
    assert!(names.contains(&"tier_price"));
    assert!(!names.contains(&"creator_name"));

    set.post_type_count = Locator::css("div.count");
    assert!(!set.xpath_entries().contains(&"post_type_count"));
}

#[test]
fn partial_override_keeps_other_defaults() {
    let yaml = r#"
tier_name:
  css: "div.tier-title"
tier_price:
  css: "div.tier-price"
"#;
    let set = parse_selectors(yaml).unwrap();
    assert_eq!(set.tier_name, Locator::css("div.tier-title"));
    assert_eq!(set.tier_price, Locator::css("div.tier-price"));
    assert_eq!(set.creator_name, SelectorSet::default().creator_name);
    assert_eq!(set.filter_dialog, Locator::id("post-feed-filter-dialog"));
}

#[test]
fn empty_document_yields_defaults() {
    let set = parse_selectors("   \n").unwrap();
    assert_eq!(set, SelectorSet::default());
}

#[test]
fn unknown_key_is_rejected() {
    let yaml = "creator_nmae:\n  css: h1\n";
    let result = parse_selectors(yaml);
    assert!(
        matches!(result, Err(ConfigError::SelectorsFileParse(_))),
        "expected parse error for misspelled key, got: {result:?}"
    );
}

#[test]
fn blank_expression_fails_validation() {
    let yaml = "post_card:\n  css: \"  \"\n";
    let result = parse_selectors(yaml);
    match result {
        Err(ConfigError::Validation(msg)) => assert!(msg.contains("post_card"), "{msg}"),
        other => panic!("expected Validation error, got: {other:?}"),
    }
}

#[test]
fn yaml_rendering_round_trips_through_loader() {
    let rendered = SelectorSet::default().to_yaml().unwrap();
    assert!(rendered.contains("creator_name:"));
    let reparsed = parse_selectors(&rendered).unwrap();
    assert_eq!(reparsed, SelectorSet::default());
}

#[test]
fn load_selectors_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "chat_item:\n  css: \"li.chat\"").unwrap();
    let set = load_selectors(file.path()).unwrap();
    assert_eq!(set.chat_item, Locator::css("li.chat"));
}

#[test]
fn load_selectors_missing_file_reports_path() {
    let result = load_selectors(Path::new("/nonexistent/selectors.yaml"));
    match result {
        Err(ConfigError::SelectorsFileIo { path, .. }) => {
            assert!(path.contains("selectors.yaml"));
        }
        other => panic!("expected SelectorsFileIo, got: {other:?}"),
    }
}
