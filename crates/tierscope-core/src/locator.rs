use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// One element lookup rule: a strategy plus its expression.
///
/// Serialized as a single-key map, e.g. `{ css: "div[data-tag='tier-card']" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locator {
    Css(String),
    XPath(String),
    Id(String),
    Tag(String),
}

impl Locator {
    #[must_use]
    pub fn css(expr: impl Into<String>) -> Self {
        Locator::Css(expr.into())
    }

    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    #[must_use]
    pub fn id(expr: impl Into<String>) -> Self {
        Locator::Id(expr.into())
    }

    #[must_use]
    pub fn tag(expr: impl Into<String>) -> Self {
        Locator::Tag(expr.into())
    }

    /// The raw expression regardless of strategy.
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Locator::Css(e) | Locator::XPath(e) | Locator::Id(e) | Locator::Tag(e) => e,
        }
    }

    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            Locator::Css(_) => "css",
            Locator::XPath(_) => "xpath",
            Locator::Id(_) => "id",
            Locator::Tag(_) => "tag",
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expression().trim().is_empty()
    }
}

// Written by hand so YAML output uses the map form instead of `!tag` syntax.
impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.strategy(), self.expression())?;
        map.end()
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.strategy(), self.expression())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_strategy() {
        assert_eq!(Locator::id("post-feed-filter-dialog").to_string(), "id=post-feed-filter-dialog");
        assert_eq!(Locator::css("a[href]").to_string(), "css=a[href]");
    }

    #[test]
    fn whitespace_expression_is_empty() {
        assert!(Locator::xpath("   ").is_empty());
        assert!(!Locator::tag("p").is_empty());
    }

    #[test]
    fn deserializes_from_tagged_yaml() {
        let loc: Locator = serde_yaml::from_str("xpath: .//button[contains(., 'Show more')]").unwrap();
        assert_eq!(loc, Locator::xpath(".//button[contains(., 'Show more')]"));

        let loc: Locator = serde_yaml::from_str("css: \"span[data-tag='like-count']\"").unwrap();
        assert_eq!(loc.strategy(), "css");
    }

    #[test]
    fn rejects_unknown_strategy() {
        let result: Result<Locator, _> = serde_yaml::from_str("link_text: Home");
        assert!(result.is_err());
    }

    #[test]
    fn serializes_as_single_key_map() {
        let json = serde_json::to_value(Locator::css("h1")).unwrap();
        assert_eq!(json, serde_json::json!({ "css": "h1" }));

        let yaml = serde_yaml::to_string(&Locator::xpath("//a")).unwrap();
        assert_eq!(yaml.trim(), "xpath: //a");
    }
}
