//! Structural matchers over the mapping page.
//!
//! Each selector is a capability-typed strategy; lists are ordered most
//! specific/stable first and tried in sequence, so a markup change upstream
//! degrades to the next strategy instead of breaking extraction outright.

/// One element-selection strategy, expressible as an XPath query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `button` whose content contains the given text.
    ButtonWithText(&'static str),
    /// `button` whose class attribute contains the given fragment.
    ButtonClassContains(&'static str),
    /// `button` that is an ancestor of an `h3` containing the given text.
    HeadingAncestorButton(&'static str),
    /// Link inside the `dd` following a `dt` containing the given label.
    TermSiblingLink(&'static str),
    /// Link with a class fragment inside a container with a class fragment.
    LinkClassContains {
        container: &'static str,
        link: &'static str,
    },
    /// Any link whose `href` contains the given fragment.
    LinkHrefContains(&'static str),
}

impl Selector {
    /// The XPath rendering used against a real document model.
    pub fn xpath(&self) -> String {
        match self {
            Selector::ButtonWithText(text) => format!("//button[contains(., '{text}')]"),
            Selector::ButtonClassContains(class) => {
                format!("//button[contains(@class, '{class}')]")
            }
            Selector::HeadingAncestorButton(text) => {
                format!("//h3[contains(., '{text}')]/ancestor::button")
            }
            Selector::TermSiblingLink(label) => {
                format!("//dt[contains(., '{label}')]/following-sibling::dd//a")
            }
            Selector::LinkClassContains { container, link } => {
                format!("//div[contains(@class, '{container}')]//a[contains(@class, '{link}')]")
            }
            Selector::LinkHrefContains(fragment) => format!("//a[contains(@href, '{fragment}')]"),
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.xpath())
    }
}

/// Strategies for the collapsible cadastral-info panel toggle.
pub fn panel_selectors() -> Vec<Selector> {
    vec![
        Selector::ButtonWithText("Kadastrale informatie"),
        Selector::ButtonClassContains("geopunt-map-sidebar-accordion__toggle"),
        Selector::HeadingAncestorButton("Kadastrale informatie"),
    ]
}

/// Strategies for the parcel-key link inside the expanded panel.
pub fn key_selectors() -> Vec<Selector> {
    vec![
        Selector::TermSiblingLink("CaPaKey:"),
        Selector::LinkClassContains {
            container: "vl-properties__list--kadastraal",
            link: "geopunt-map-kadastraal-capakey-link",
        },
        Selector::LinkHrefContains("/capakey/"),
    ]
}

#[cfg(test)]
mod tests {
    use super::{Selector, key_selectors, panel_selectors};
    use pretty_assertions::assert_eq;

    #[test]
    fn xpath_renderings_match_page_structure() {
        assert_eq!(
            Selector::ButtonWithText("Kadastrale informatie").xpath(),
            "//button[contains(., 'Kadastrale informatie')]"
        );
        assert_eq!(
            Selector::TermSiblingLink("CaPaKey:").xpath(),
            "//dt[contains(., 'CaPaKey:')]/following-sibling::dd//a"
        );
        assert_eq!(
            Selector::LinkHrefContains("/capakey/").xpath(),
            "//a[contains(@href, '/capakey/')]"
        );
    }

    #[test]
    fn lists_keep_most_stable_strategy_first() {
        assert_eq!(
            panel_selectors()[0],
            Selector::ButtonWithText("Kadastrale informatie")
        );
        assert_eq!(key_selectors()[0], Selector::TermSiblingLink("CaPaKey:"));
        assert_eq!(panel_selectors().len(), 3);
        assert_eq!(key_selectors().len(), 3);
    }
}
