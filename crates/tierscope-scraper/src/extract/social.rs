use std::collections::BTreeSet;

use reqwest::Url;
use tierscope_core::Platform;

use crate::driver::Driver;
use crate::locate::Page;

/// Whether `href` points back at the Target's own site.
///
/// Hosts are compared without a leading `www.`. Relative or unparseable
/// links count as own-domain.
#[must_use]
pub fn is_own_domain(href: &str, target: &str) -> bool {
    let Ok(link) = Url::parse(href) else {
        return true;
    };
    let Some(target_host) = Url::parse(target).ok().and_then(|u| u.host_str().map(bare_host)) else {
        return false;
    };
    link.host_str().map(bare_host) == Some(target_host)
}

fn bare_host(host: &str) -> String {
    let host = host.to_ascii_lowercase();
    host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
}

/// Outbound hrefs of every anchor `links` yields, skipping fragments and
/// own-domain links.
async fn external_hrefs<D: Driver>(page: &Page<'_, D>, links: &[D::Element], target: &str) -> Vec<String> {
    let mut hrefs = Vec::new();
    for link in links {
        let Some(href) = page.attribute(link, "href").await else {
            continue;
        };
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') || is_own_domain(href, target) {
            continue;
        }
        hrefs.push(href.to_string());
    }
    hrefs
}

/// Platforms linked from the profile's social area, or from the whole page
/// when there is no such area.
pub async fn extract_social<D: Driver>(page: &Page<'_, D>, target: &str) -> BTreeSet<Platform> {
    let sel = page.selectors;
    let area = page
        .find(&sel.social_link_area, None, page.timing.control_probe)
        .await;
    if area.is_none() {
        tracing::debug!("no social link area; scanning whole page");
    }
    let links = page.find_all(&sel.social_link, area.as_ref()).await;

    let platforms: BTreeSet<Platform> = external_hrefs(page, &links, target)
        .await
        .iter()
        .filter_map(|href| Platform::classify(href))
        .collect();
    tracing::info!(platforms = platforms.len(), "social links");
    platforms
}

/// Anchors anywhere on the page that leave the Target's site.
pub async fn count_external_links<D: Driver>(page: &Page<'_, D>, target: &str) -> u64 {
    let links = page.find_all(&page.selectors.any_link, None).await;
    let count = external_hrefs(page, &links, target).await.len();
    u64::try_from(count).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixture;

    #[test]
    fn own_domain_rules() {
        let target = "https://www.patreon.com/alice";
        assert!(is_own_domain("https://www.patreon.com/bob", target));
        assert!(is_own_domain("https://patreon.com/alice/posts", target));
        assert!(is_own_domain("/alice/about", target));
        assert!(!is_own_domain("https://www.facebook.com/alice", target));
        assert!(!is_own_domain("https://alice.patreon.com.evil.test/", target));
    }

    #[tokio::test]
    async fn whole_page_scan_without_link_area() {
        let html = r#"<html><body>
            <a href="https://www.facebook.com/alice">fb</a>
            <a href="https://twitter.com/alice">tw</a>
            <a href="https://twitter.com/alice_alt">tw again</a>
            <a href="https://creators.example/alice/posts">posts</a>
            <a href="https://shop.example.org/">shop</a>
            </body></html>"#;
        let fx = fixture::load(html, &[]).await;
        let page = fx.page();

        let platforms = extract_social(&page, fixture::URL).await;
        assert_eq!(
            platforms.into_iter().collect::<Vec<_>>(),
            vec![Platform::Facebook, Platform::Twitter]
        );
        assert_eq!(count_external_links(&page, fixture::URL).await, 4);
    }

    #[tokio::test]
    async fn link_area_limits_the_scan() {
        let html = r#"<html><body>
            <div data-testid="creator-profile-social-links">
              <a href="https://www.youtube.com/@alice">yt</a>
            </div>
            <a href="https://www.instagram.com/someone_else">unrelated</a>
            </body></html>"#;
        let fx = fixture::load(html, &[]).await;
        let platforms = extract_social(&fx.page(), fixture::URL).await;
        assert_eq!(platforms.len(), 1);
        assert!(platforms.contains(&Platform::Youtube));
    }
}
