use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::locator::Locator;
use crate::ConfigError;

/// Every element lookup the extractors perform, keyed by logical field.
///
/// Built once at startup and shared read-only. A selectors YAML file only
/// needs the keys it changes; everything else keeps the built-in value.
/// Locators documented as relative are evaluated inside a scope element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorSet {
    // identity / header counters
    pub creator_name: Locator,
    pub patron_count: Locator,
    pub total_posts: Locator,
    pub monthly_income: Locator,
    /// Relative to a counter label: digit-bearing spans nearby.
    pub counter_span: Locator,
    pub age_gate_button: Locator,
    pub page_body: Locator,

    // legacy dropdown breakdowns
    pub year_button: Locator,
    pub tier_button: Locator,
    pub post_type_button: Locator,
    pub year_dropdown: Locator,
    pub tier_dropdown: Locator,
    pub post_type_dropdown: Locator,
    pub year_item: Locator,
    pub tier_item: Locator,
    pub post_type_item: Locator,
    /// Relative to a tier dropdown item.
    pub tier_item_label: Locator,
    /// Relative to a post-type item.
    pub post_type_icon: Locator,
    /// Relative to a post-type item.
    pub post_type_count: Locator,

    // consolidated filter dialog
    pub filter_toggle: Locator,
    pub filter_dialog: Locator,
    /// Relative to the filter dialog.
    pub filter_post_type_item: Locator,
    /// Relative to the filter dialog.
    pub filter_year_item: Locator,
    /// Relative to a year radio.
    pub filter_year_label: Locator,

    // post feed
    pub load_more_button: Locator,
    pub post_card: Locator,
    /// Relative to a post card.
    pub post_lock: Locator,
    /// Relative to a post card.
    pub like_count: Locator,
    /// Relative to a post card.
    pub comment_count: Locator,

    // chats
    pub chat_nav_link: Locator,
    pub chat_item: Locator,
    /// Relative to a chat item.
    pub chat_lock: Locator,

    // about page
    pub about_link: Locator,
    pub about_content: Locator,
    pub about_total_members: Locator,
    pub about_paid_members: Locator,
    /// Relative to a member-count block.
    pub member_number: Locator,

    // social links
    pub social_link_area: Locator,
    pub social_link: Locator,
    pub any_link: Locator,

    // membership tiers
    pub become_member_button: Locator,
    pub see_membership_button: Locator,
    pub membership_dialog: Locator,
    pub dialog_close_button: Locator,
    pub tier_card: Locator,
    /// Relative to a tier card.
    pub tier_name: Locator,
    /// Relative to a tier card.
    pub tier_price: Locator,
    /// Relative to a tier card.
    pub tier_description: Locator,
    /// Relative to a tier card on the dedicated tiers page.
    pub tier_show_more: Locator,
    /// Relative to a tier card on the dedicated tiers page.
    pub tier_page_description: Locator,
    pub carousel_right: Locator,
    pub carousel_right_clickable: Locator,
    pub carousel_left_clickable: Locator,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            creator_name: Locator::css("header h1, h1[class*='cm-']"),
            patron_count: Locator::css("span[data-tag='patron-count']"),
            total_posts: Locator::css("span[data-tag='creation-count']"),
            monthly_income: Locator::css("span[data-tag='earnings-count']"),
            counter_span: Locator::tag("span"),
            age_gate_button: Locator::css("button[data-tag='age-verification-button-yes']"),
            page_body: Locator::tag("body"),

            year_button: Locator::css("button[aria-label='Sort posts by date']"),
            tier_button: Locator::css("button[aria-label='Sort posts by tier']"),
            post_type_button: Locator::css("button[aria-label='Sort posts by post type']"),
            year_dropdown: Locator::css("div[role='dialog'][aria-label='Sort posts by date']"),
            tier_dropdown: Locator::css("div[role='dialog'][aria-label='Sort posts by tier']"),
            post_type_dropdown: Locator::css(
                "div[role='dialog'][aria-label='Sort posts by post type']",
            ),
            year_item: Locator::tag("a"),
            tier_item: Locator::tag("a"),
            post_type_item: Locator::tag("button"),
            tier_item_label: Locator::tag("p"),
            post_type_icon: Locator::css("svg[data-tag]"),
            post_type_count: Locator::xpath(".//span[svg[@data-tag]]/following-sibling::div"),

            filter_toggle: Locator::css(
                "button[data-tag='post-feed-consolidated-filters-toggle']",
            ),
            filter_dialog: Locator::id("post-feed-filter-dialog"),
            filter_post_type_item: Locator::xpath(
                ".//h3[contains(text(), 'Post type')]/../following-sibling::div//button",
            ),
            filter_year_item: Locator::css(
                "div[aria-label='Date Filter'][role='radiogroup'] div[role='radio']",
            ),
            filter_year_label: Locator::tag("p"),

            load_more_button: Locator::xpath(
                "//button[contains(., 'See more posts') or contains(., '查看更多文章')]",
            ),
            post_card: Locator::css("div[data-tag='post-card']"),
            post_lock: Locator::css(
                "button[data-tag='locked-badge-button'], svg[data-tag='IconLock']",
            ),
            like_count: Locator::css("span[data-tag='like-count']"),
            comment_count: Locator::css("a[data-tag='comment-post-icon']"),

            chat_nav_link: Locator::css("li > a[href*='/chats']"),
            chat_item: Locator::css("button[data-tag^='chat-list-item-']"),
            chat_lock: Locator::css("svg[data-tag='IconLock']"),

            about_link: Locator::css("li > a[href*='/about']"),
            about_content: Locator::css("div[data-tag='about-contents']"),
            about_total_members: Locator::css("div[data-tag='member-count']"),
            about_paid_members: Locator::css("div[data-tag='paid-member-count']"),
            member_number: Locator::css("div, span"),

            social_link_area: Locator::css(
                "div[data-testid='creator-profile-social-links'], section[aria-label*='Social']",
            ),
            social_link: Locator::css("a[href]"),
            any_link: Locator::tag("a"),

            become_member_button: Locator::css("button[data-tag='creator-become-a-patron-button']"),
            see_membership_button: Locator::css(
                "button[data-tag='creator-header-see-membership-options']",
            ),
            membership_dialog: Locator::css("div[role='dialog']"),
            dialog_close_button: Locator::css("button[data-tag='dialog-close-icon']"),
            tier_card: Locator::css("div[data-tag='tier-card']"),
            tier_name: Locator::xpath(
                ".//div[contains(@aria-label, ' per month')]/preceding-sibling::div",
            ),
            tier_price: Locator::xpath(
                ".//div[contains(@aria-label, ' per month')]//div[starts-with(normalize-space(.), '$')]",
            ),
            tier_description: Locator::xpath(
                ".//a[@data-tag='patron-checkout-continue-button']/ancestor::div[2]/following-sibling::div",
            ),
            tier_show_more: Locator::xpath(".//button[contains(., 'Show more')]"),
            tier_page_description: Locator::xpath(
                ".//div[.//h3[contains(text(), 'What Will You Find?')]]",
            ),
            carousel_right: Locator::css("button[data-tag='carousel-right']"),
            carousel_right_clickable: Locator::css(
                "button[data-tag='carousel-right']:not([aria-disabled='true'])",
            ),
            carousel_left_clickable: Locator::css(
                "button[data-tag='carousel-left']:not([aria-disabled='true'])",
            ),
        }
    }
}

impl SelectorSet {
    /// Every entry paired with its field name, in declaration order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("creator_name", &self.creator_name),
            ("patron_count", &self.patron_count),
            ("total_posts", &self.total_posts),
            ("monthly_income", &self.monthly_income),
            ("counter_span", &self.counter_span),
            ("age_gate_button", &self.age_gate_button),
            ("page_body", &self.page_body),
            ("year_button", &self.year_button),
            ("tier_button", &self.tier_button),
            ("post_type_button", &self.post_type_button),
            ("year_dropdown", &self.year_dropdown),
            ("tier_dropdown", &self.tier_dropdown),
            ("post_type_dropdown", &self.post_type_dropdown),
            ("year_item", &self.year_item),
            ("tier_item", &self.tier_item),
            ("post_type_item", &self.post_type_item),
            ("tier_item_label", &self.tier_item_label),
            ("post_type_icon", &self.post_type_icon),
            ("post_type_count", &self.post_type_count),
            ("filter_toggle", &self.filter_toggle),
            ("filter_dialog", &self.filter_dialog),
            ("filter_post_type_item", &self.filter_post_type_item),
            ("filter_year_item", &self.filter_year_item),
            ("filter_year_label", &self.filter_year_label),
            ("load_more_button", &self.load_more_button),
            ("post_card", &self.post_card),
            ("post_lock", &self.post_lock),
            ("like_count", &self.like_count),
            ("comment_count", &self.comment_count),
            ("chat_nav_link", &self.chat_nav_link),
            ("chat_item", &self.chat_item),
            ("chat_lock", &self.chat_lock),
            ("about_link", &self.about_link),
            ("about_content", &self.about_content),
            ("about_total_members", &self.about_total_members),
            ("about_paid_members", &self.about_paid_members),
            ("member_number", &self.member_number),
            ("social_link_area", &self.social_link_area),
            ("social_link", &self.social_link),
            ("any_link", &self.any_link),
            ("become_member_button", &self.become_member_button),
            ("see_membership_button", &self.see_membership_button),
            ("membership_dialog", &self.membership_dialog),
            ("dialog_close_button", &self.dialog_close_button),
            ("tier_card", &self.tier_card),
            ("tier_name", &self.tier_name),
            ("tier_price", &self.tier_price),
            ("tier_description", &self.tier_description),
            ("tier_show_more", &self.tier_show_more),
            ("tier_page_description", &self.tier_page_description),
            ("carousel_right", &self.carousel_right),
            ("carousel_right_clickable", &self.carousel_right_clickable),
            ("carousel_left_clickable", &self.carousel_left_clickable),
        ]
    }

    /// Names of the entries that use the XPath strategy.
    #[must_use]
    pub fn xpath_entries(&self) -> Vec<&'static str> {
        self.entries()
            .into_iter()
            .filter(|(_, locator)| matches!(locator, Locator::XPath(_)))
            .map(|(name, _)| name)
            .collect()
    }

    /// Reject entries whose expression is blank.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first blank entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, locator) in self.entries() {
            if locator.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "selector '{name}' has an empty {} expression",
                    locator.strategy()
                )));
            }
        }
        Ok(())
    }

    /// Render as YAML, the same shape [`load_selectors`] reads.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::SelectorsFileParse` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(ConfigError::SelectorsFileParse)
    }
}

/// Load selector overrides from a YAML file on top of the built-in set.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_selectors(path: &Path) -> Result<SelectorSet, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SelectorsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_selectors(&content)
}

fn parse_selectors(content: &str) -> Result<SelectorSet, ConfigError> {
    // An empty document deserializes to unit, not an empty map.
    if content.trim().is_empty() {
        return Ok(SelectorSet::default());
    }

    let selectors: SelectorSet =
        serde_yaml::from_str(content).map_err(ConfigError::SelectorsFileParse)?;

    selectors.validate()?;

    Ok(selectors)
}

#[cfg(test)]
#[path = "selectors_test.rs"]
mod tests;
