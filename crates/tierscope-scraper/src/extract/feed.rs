//! Post feed: load every post, then total likes and comments split by
//! whether each post is locked.

use std::time::Duration;

use tierscope_core::Engagement;
use tokio::time::Instant;

use crate::driver::{Driver, ScrollTarget};
use crate::error::DriverError;
use crate::locate::Page;
use crate::normalize::parse_scaled_count;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PostSample {
    locked: bool,
    likes: u64,
    comments: u64,
}

/// Clicks "load more" (or scrolls to the bottom when there is no such
/// button) until the page stops growing. Returns the number of rounds that
/// grew the page.
pub async fn load_all_posts<D: Driver>(page: &Page<'_, D>) -> usize {
    let sel = page.selectors;
    let timing = page.timing;
    let Some(mut height) = page.page_height().await else {
        return 0;
    };

    let mut grown = 0;
    for attempt in 0..timing.max_load_attempts {
        let clicked = page.exists(&sel.load_more_button, timing.control_probe).await
            && page.click(&sel.load_more_button, timing.click).await;
        let budget = if clicked {
            timing.load_more_growth
        } else {
            page.scroll_to(ScrollTarget::Bottom).await;
            timing.scroll_growth
        };

        match wait_for_growth(page, height, budget).await {
            Some(new_height) => {
                tracing::debug!(attempt, clicked, height = new_height, "feed grew");
                height = new_height;
                grown += 1;
            }
            None => {
                tracing::debug!(attempt, "feed stopped growing");
                break;
            }
        }
    }
    grown
}

async fn wait_for_growth<D: Driver>(page: &Page<'_, D>, from: u64, budget: Duration) -> Option<u64> {
    let deadline = Instant::now() + budget;
    loop {
        let current = page.page_height().await?;
        if current > from {
            return Some(current);
        }
        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        tokio::time::sleep(page.timing.poll_interval.min(deadline - now)).await;
    }
}

pub async fn extract_engagement<D: Driver>(page: &Page<'_, D>) -> Engagement {
    load_all_posts(page).await;

    let cards = page.find_all(&page.selectors.post_card, None).await;
    let mut engagement = Engagement::default();
    let mut skipped = 0usize;
    for (index, card) in cards.iter().enumerate() {
        match read_post(page, card).await {
            Ok(post) => {
                let bucket = if post.locked {
                    &mut engagement.restricted
                } else {
                    &mut engagement.public
                };
                bucket.add(post.likes, post.comments);
            }
            Err(e) => {
                skipped += 1;
                tracing::debug!(index, error = %e, "post card skipped");
            }
        }
    }

    tracing::info!(
        posts = cards.len(),
        skipped,
        public_likes = engagement.public.likes,
        locked_likes = engagement.restricted.likes,
        "feed engagement"
    );
    engagement
}

async fn read_post<D: Driver>(page: &Page<'_, D>, card: &D::Element) -> Result<PostSample, DriverError> {
    let sel = page.selectors;
    let locked = !page.probe_within(&sel.post_lock, card).await?.is_empty();
    let likes = scoped_count(page, &sel.like_count, card).await?;
    let comments = scoped_count(page, &sel.comment_count, card).await?;
    Ok(PostSample {
        locked,
        likes,
        comments,
    })
}

async fn scoped_count<D: Driver>(
    page: &Page<'_, D>,
    locator: &tierscope_core::Locator,
    card: &D::Element,
) -> Result<u64, DriverError> {
    let Some(element) = page.probe_within(locator, card).await?.into_iter().next() else {
        return Ok(0);
    };
    Ok(page
        .text(&element)
        .await
        .and_then(|t| parse_scaled_count(&t))
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixture;

    fn post(locked: bool, likes: &str, comments: &str) -> String {
        let lock = if locked {
            r#"<button data-tag="locked-badge-button">Locked</button>"#
        } else {
            ""
        };
        format!(
            r#"<div data-tag="post-card">{lock}
                 <span data-tag="like-count">{likes}</span>
                 <a data-tag="comment-post-icon">{comments}</a>
               </div>"#
        )
    }

    #[tokio::test]
    async fn likes_split_by_lock_state() {
        let html = format!(
            "<html><body>{}{}{}{}</body></html>",
            post(false, "10", "2"),
            post(true, "1.5K", "40"),
            post(false, "", "1"),
            post(true, "3", "")
        );
        let fx = fixture::load(&html, &[]).await;
        let engagement = extract_engagement(&fx.page()).await;

        assert_eq!(engagement.public.likes, 10);
        assert_eq!(engagement.public.comments, 3);
        assert_eq!(engagement.restricted.likes, 1503);
        assert_eq!(engagement.restricted.comments, 40);
        assert_eq!(engagement.total_likes(), 1513);
    }

    #[tokio::test]
    async fn static_page_stops_loading_immediately() {
        let fx = fixture::load("<html><body><p>short</p></body></html>", &[]).await;
        assert_eq!(load_all_posts(&fx.page()).await, 0);
        assert_eq!(extract_engagement(&fx.page()).await, Engagement::default());
    }
}
