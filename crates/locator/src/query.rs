//! Page-query capability.
//!
//! The locator never touches a real document model directly; it goes through
//! the `Page`/`PageElement` traits so extraction is testable against an
//! in-memory page and the browser host stays outside this crate. Methods
//! return boxed futures for dyn-compatibility.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::PageError;
use crate::selectors::Selector;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A located element on a page.
pub trait PageElement: Send + Sync {
    fn scroll_into_view(&self) -> BoxFuture<'_, Result<(), PageError>>;
    fn click(&self) -> BoxFuture<'_, Result<(), PageError>>;
    fn text(&self) -> BoxFuture<'_, Result<String, PageError>>;
}

/// A rendered page that selectors can be resolved against.
pub trait Page: Send + Sync {
    /// Resolve one selector against the current page state.
    ///
    /// `Ok(None)` means no element currently matches; it may still appear
    /// later (panels expand, content renders asynchronously).
    fn query<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> BoxFuture<'a, Result<Option<Box<dyn PageElement>>, PageError>>;
}

/// One scripted element in a page snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSpec {
    pub id: String,
    /// XPath renderings this element answers to.
    pub matches: Vec<String>,
    #[serde(default)]
    pub text: String,
    /// Present only after the element with this id has been clicked.
    #[serde(default)]
    pub revealed_by: Option<String>,
    /// Rendering delay: the element only exists this long after page load.
    #[serde(default)]
    pub appears_after_ms: u64,
}

/// Serializable description of a page's scrape-relevant elements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub elements: Vec<ElementSpec>,
}

/// In-memory `Page` backed by a snapshot.
///
/// Used by tests and by the CLI's page-snapshot mode. Click state is the
/// only mutable part: elements carrying `revealed_by` stay invisible until
/// their revealer has been clicked, which is how the collapsible panel
/// behaves on the live page.
pub struct StaticPage {
    inner: Arc<PageInner>,
}

struct PageInner {
    elements: Vec<ElementSpec>,
    clicked: Mutex<HashSet<String>>,
    loaded_at: Instant,
}

impl StaticPage {
    pub fn new(snapshot: PageSnapshot) -> Self {
        Self {
            inner: Arc::new(PageInner {
                elements: snapshot.elements,
                clicked: Mutex::new(HashSet::new()),
                loaded_at: Instant::now(),
            }),
        }
    }

    pub async fn was_clicked(&self, id: &str) -> bool {
        self.inner.clicked.lock().await.contains(id)
    }
}

struct StaticElement {
    inner: Arc<PageInner>,
    index: usize,
}

impl PageElement for StaticElement {
    fn scroll_into_view(&self) -> BoxFuture<'_, Result<(), PageError>> {
        Box::pin(async { Ok(()) })
    }

    fn click(&self) -> BoxFuture<'_, Result<(), PageError>> {
        Box::pin(async move {
            let id = self.inner.elements[self.index].id.clone();
            self.inner.clicked.lock().await.insert(id);
            Ok(())
        })
    }

    fn text(&self) -> BoxFuture<'_, Result<String, PageError>> {
        Box::pin(async move { Ok(self.inner.elements[self.index].text.clone()) })
    }
}

impl Page for StaticPage {
    fn query<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> BoxFuture<'a, Result<Option<Box<dyn PageElement>>, PageError>> {
        Box::pin(async move {
            let xpath = selector.xpath();
            let elapsed = self.inner.loaded_at.elapsed();
            let clicked = self.inner.clicked.lock().await;
            for (index, spec) in self.inner.elements.iter().enumerate() {
                let revealed = spec
                    .revealed_by
                    .as_deref()
                    .map(|id| clicked.contains(id))
                    .unwrap_or(true);
                let rendered = elapsed >= Duration::from_millis(spec.appears_after_ms);
                if revealed && rendered && spec.matches.iter().any(|m| m == &xpath) {
                    return Ok(Some(Box::new(StaticElement {
                        inner: self.inner.clone(),
                        index,
                    }) as Box<dyn PageElement>));
                }
            }
            Ok(None)
        })
    }
}
