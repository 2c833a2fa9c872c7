//! Two-phase parcel-key extraction.
//!
//! Phase one finds and activates the collapsible cadastral-info panel;
//! phase two finds the key node inside the expanded panel. Both phases walk
//! an ordered selector list with a bounded per-strategy wait. The settle and
//! render delays accommodate asynchronous page rendering; they are
//! heuristics, not correctness guarantees, and stay configurable.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use foundation::ParcelKey;

use crate::error::{LocateError, PageError};
use crate::query::{Page, PageElement};
use crate::selectors::{Selector, key_selectors, panel_selectors};

/// Wait budgets for the locate algorithm. Defaults mirror the live page's
/// observed rendering behavior.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Per-strategy wait for the panel toggle.
    pub panel_timeout: Duration,
    /// Per-strategy wait for the key node.
    pub key_timeout: Duration,
    /// Interval between selector re-evaluations while waiting.
    pub poll_interval: Duration,
    /// Pause after scrolling the toggle into view, before clicking.
    pub settle_delay: Duration,
    /// Pause after the click, while the panel content renders.
    pub render_delay: Duration,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            panel_timeout: Duration::from_secs(5),
            key_timeout: Duration::from_secs(3),
            poll_interval: Duration::from_millis(100),
            settle_delay: Duration::from_secs(1),
            render_delay: Duration::from_secs(2),
        }
    }
}

/// Poll one selector until it matches or the budget runs out.
///
/// `Ok(None)` on timeout; page errors propagate.
pub async fn wait_for_element(
    page: &dyn Page,
    selector: &Selector,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<Box<dyn PageElement>>, PageError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(element) = page.query(selector).await? {
            return Ok(Some(element));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        sleep(poll_interval).await;
    }
}

/// First strategy in the list that matches within its own wait budget.
///
/// A strategy that times out or errors is logged and skipped; ordering
/// encodes preference, so the first success wins.
async fn first_match(
    page: &dyn Page,
    selectors: &[Selector],
    timeout: Duration,
    poll_interval: Duration,
) -> Option<Box<dyn PageElement>> {
    for selector in selectors {
        match wait_for_element(page, selector, timeout, poll_interval).await {
            Ok(Some(element)) => {
                debug!("selector matched: {selector}");
                return Some(element);
            }
            Ok(None) => {
                debug!("selector timed out: {selector}");
            }
            Err(e) => {
                debug!("selector failed: {selector}: {e}");
            }
        }
    }
    None
}

/// Extract the parcel key from a rendered page.
pub async fn locate(page: &dyn Page, config: &LocatorConfig) -> Result<ParcelKey, LocateError> {
    let panel = first_match(
        page,
        &panel_selectors(),
        config.panel_timeout,
        config.poll_interval,
    )
    .await
    .ok_or(LocateError::PanelNotFound)?;

    panel.scroll_into_view().await?;
    sleep(config.settle_delay).await;
    panel.click().await?;
    sleep(config.render_delay).await;
    debug!("cadastral info panel expanded");

    let key_node = first_match(
        page,
        &key_selectors(),
        config.key_timeout,
        config.poll_interval,
    )
    .await
    .ok_or(LocateError::KeyNotFound)?;

    let text = key_node.text().await?;
    let key = ParcelKey::parse(&text).ok_or(LocateError::EmptyKey)?;
    info!("extracted parcel key: {key}");
    Ok(key)
}
