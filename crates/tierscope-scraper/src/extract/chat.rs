use tierscope_core::ChatRooms;

use crate::driver::Driver;
use crate::locate::Page;

/// Counts free and locked chat rooms on the chats tab.
///
/// Leaves the session on the chats page; the orchestrator navigates back.
pub async fn extract_chat<D: Driver>(page: &Page<'_, D>) -> ChatRooms {
    let sel = page.selectors;
    let timing = page.timing;
    let mut rooms = ChatRooms::default();

    if !page.exists(&sel.chat_nav_link, timing.control_probe).await {
        tracing::debug!("no chats tab");
        return rooms;
    }
    if !page.click(&sel.chat_nav_link, timing.click).await {
        tracing::debug!("chats tab not clickable");
        return rooms;
    }
    if !page.exists(&sel.chat_item, timing.section).await {
        tracing::info!("chats tab has no rooms");
        return rooms;
    }

    for item in page.find_all(&sel.chat_item, None).await {
        match page.probe_within(&sel.chat_lock, &item).await {
            Ok(locks) if locks.is_empty() => rooms.free += 1,
            Ok(_) => rooms.restricted += 1,
            Err(e) => tracing::debug!(error = %e, "chat item skipped"),
        }
    }

    tracing::info!(free = rooms.free, restricted = rooms.restricted, "chat rooms");
    rooms
}
