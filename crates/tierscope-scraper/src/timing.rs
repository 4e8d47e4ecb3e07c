use std::time::Duration;

/// Wait budgets and loop bounds used across the pipeline.
#[derive(Debug, Clone)]
pub struct Timing {
    /// Identity landmark after navigation.
    pub landmark: Duration,
    /// Identity landmark after returning from a sub-page.
    pub return_landmark: Duration,
    /// Default single-element lookup.
    pub find: Duration,
    /// Multi-element lookup.
    pub find_all: Duration,
    /// Lookups scoped inside an element already on screen.
    pub probe: Duration,
    /// Presence checks for optional page-level controls.
    pub control_probe: Duration,
    pub click: Duration,
    pub age_gate: Duration,
    /// Chat list and about-page blocks.
    pub section: Duration,
    pub poll_interval: Duration,
    /// Pause after scrolling to the top before clicking a trigger.
    pub settle: Duration,
    /// Presence check for the carousel's scroll-right control.
    pub carousel_probe: Duration,
    pub carousel_left_settle: Duration,
    pub carousel_right_settle: Duration,
    pub carousel_step_probe: Duration,
    pub carousel_max_clicks: usize,
    /// Name and price lookups inside a tier card.
    pub card_field: Duration,
    /// Wait for page growth after clicking "load more".
    pub load_more_growth: Duration,
    /// Wait for page growth after scrolling to the bottom.
    pub scroll_growth: Duration,
    pub max_load_attempts: usize,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            landmark: Duration::from_secs(20),
            return_landmark: Duration::from_secs(15),
            find: Duration::from_secs(10),
            find_all: Duration::from_secs(5),
            probe: Duration::from_millis(100),
            control_probe: Duration::from_secs(3),
            click: Duration::from_secs(10),
            age_gate: Duration::from_secs(3),
            section: Duration::from_secs(15),
            poll_interval: Duration::from_millis(250),
            settle: Duration::from_millis(500),
            carousel_probe: Duration::from_secs(2),
            carousel_left_settle: Duration::from_millis(600),
            carousel_right_settle: Duration::from_millis(800),
            carousel_step_probe: Duration::from_millis(500),
            carousel_max_clicks: 15,
            card_field: Duration::from_secs(1),
            load_more_growth: Duration::from_secs(10),
            scroll_growth: Duration::from_secs(5),
            max_load_attempts: 10,
        }
    }
}

impl Timing {
    /// Zero waits with the default loop bounds. For fixtures that are fully
    /// rendered before the first lookup.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            landmark: Duration::ZERO,
            return_landmark: Duration::ZERO,
            find: Duration::ZERO,
            find_all: Duration::ZERO,
            probe: Duration::ZERO,
            control_probe: Duration::ZERO,
            click: Duration::ZERO,
            age_gate: Duration::ZERO,
            section: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
            settle: Duration::ZERO,
            carousel_probe: Duration::ZERO,
            carousel_left_settle: Duration::ZERO,
            carousel_right_settle: Duration::ZERO,
            carousel_step_probe: Duration::ZERO,
            card_field: Duration::ZERO,
            load_more_growth: Duration::ZERO,
            scroll_growth: Duration::ZERO,
            ..Self::default()
        }
    }
}
