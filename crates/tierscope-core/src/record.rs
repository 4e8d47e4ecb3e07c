use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use url::Url;

/// Category label to post count.
pub type BreakdownMap = BTreeMap<String, u64>;

/// Everything gathered for one Target.
///
/// Every field has a default so a partially failed extraction still yields a
/// structurally complete record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionRecord {
    pub url: String,
    pub creator_name: String,
    pub counters: Counters,
    pub tiers: Vec<TierCard>,
    pub breakdowns: Breakdowns,
    pub engagement: Engagement,
    pub social: SocialPresence,
    pub chat: ChatRooms,
    pub about: AboutMetrics,
}

impl ExtractionRecord {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Best available patron figure: about-page paid members, then about-page
    /// total members, then the header counter.
    #[must_use]
    pub fn final_patron_count(&self) -> u64 {
        self.about
            .paid_members
            .or(self.about.total_members)
            .or(self.counters.patrons)
            .unwrap_or(0)
    }
}

/// Header counters. `None` means the landmark was absent or unparseable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Counters {
    pub patrons: Option<u64>,
    pub posts: Option<u64>,
    pub monthly_income: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierCard {
    #[serde(rename = "tier_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(rename = "description_word_count")]
    pub description_words: usize,
}

impl TierCard {
    /// A card is recorded even without content, so it is not parsed twice.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.name.is_empty() || self.price > 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Breakdowns {
    pub years: BreakdownMap,
    pub tiers: BreakdownMap,
    pub post_types: BreakdownMap,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngagementBucket {
    pub likes: u64,
    pub comments: u64,
}

impl EngagementBucket {
    pub fn add(&mut self, likes: u64, comments: u64) {
        self.likes += likes;
        self.comments += comments;
    }
}

/// Likes and comments split by whether the post is publicly visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Engagement {
    pub public: EngagementBucket,
    pub restricted: EngagementBucket,
}

impl Engagement {
    #[must_use]
    pub fn total_likes(&self) -> u64 {
        self.public.likes + self.restricted.likes
    }

    #[must_use]
    pub fn total_comments(&self) -> u64 {
        self.public.comments + self.restricted.comments
    }
}

/// Recognized outbound social platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Twitter,
    Instagram,
    Youtube,
    Twitch,
    Tiktok,
    Discord,
}

impl Platform {
    /// Output column order.
    pub const ALL: [Platform; 7] = [
        Platform::Facebook,
        Platform::Twitter,
        Platform::Instagram,
        Platform::Youtube,
        Platform::Twitch,
        Platform::Tiktok,
        Platform::Discord,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
            Platform::Youtube => "youtube",
            Platform::Twitch => "twitch",
            Platform::Tiktok => "tiktok",
            Platform::Discord => "discord",
        }
    }

    /// Classify an absolute link by its host. First match wins.
    ///
    /// Subdomains count (`www.`, `m.`), lookalike hosts such as
    /// `netflix.com` do not. YouTube only counts channel-style paths so
    /// embedded videos are not mistaken for a profile, and discord.com only
    /// counts invites.
    #[must_use]
    pub fn classify(href: &str) -> Option<Platform> {
        let url = Url::parse(href.trim()).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();
        let path = url.path();
        let on = |domain: &str| {
            host == domain
                || host
                    .strip_suffix(domain)
                    .is_some_and(|rest| rest.ends_with('.'))
        };

        if on("facebook.com") {
            Some(Platform::Facebook)
        } else if on("twitter.com") || on("x.com") {
            Some(Platform::Twitter)
        } else if on("instagram.com") {
            Some(Platform::Instagram)
        } else if on("youtube.com")
            && ["/channel/", "/user/", "/@"].iter().any(|p| path.starts_with(p))
        {
            Some(Platform::Youtube)
        } else if on("twitch.tv") {
            Some(Platform::Twitch)
        } else if on("discord.gg") || (on("discord.com") && path.starts_with("/invite")) {
            Some(Platform::Discord)
        } else if on("tiktok.com") {
            Some(Platform::Tiktok)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SocialPresence {
    pub platforms: BTreeSet<Platform>,
    /// Anchors on the profile page leading off the platform's own domain.
    pub total_links: u64,
}

impl SocialPresence {
    #[must_use]
    pub fn has(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }

    #[must_use]
    pub fn platform_count(&self) -> usize {
        self.platforms.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChatRooms {
    pub free: u64,
    pub restricted: u64,
}

impl ChatRooms {
    #[must_use]
    pub fn has_chat(&self) -> bool {
        self.free + self.restricted > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AboutMetrics {
    pub total_members: Option<u64>,
    pub paid_members: Option<u64>,
    pub word_count: usize,
}
