//! Label-text lookup over an event fragment.
//!
//! The listings markup attaches values to plain-text labels ("Abstract:",
//! "Event listing ID:", "Event website:") rather than to stable ids or
//! classes on the values themselves. [`LabelLookup`] is the small capability
//! the parser depends on, so the lookup strategy (tree traversal here) can
//! be swapped without touching reconciliation or presentation.

use scraper::{ElementRef, Selector};

/// Lookup of values attached to text labels within one event fragment.
pub trait LabelLookup {
    /// Trimmed text of the next `.conflist_value` node after `label`.
    fn labeled_value(&self, label: &str) -> Option<String>;

    /// Trimmed text of the next `.conflist_inline` node after `label`.
    fn labeled_inline(&self, label: &str) -> Option<String>;

    /// `href` of the next hyperlink after `label`.
    fn labeled_link(&self, label: &str) -> Option<String>;
}

/// A single `div.evnt` fragment, viewed through `scraper`'s DOM.
pub struct Fragment<'a> {
    root: ElementRef<'a>,
}

impl<'a> Fragment<'a> {
    pub fn new(root: ElementRef<'a>) -> Self {
        Self { root }
    }

    /// Trimmed text of the first element matching `selector`, if any.
    pub fn select_text(&self, selector: &str) -> Option<String> {
        let sel = Selector::parse(selector).ok()?;
        self.root
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

    /// First element in document order after the text node `label`
    /// that matches `selector`.
    fn element_after_label(&self, label: &str, selector: &Selector) -> Option<ElementRef<'a>> {
        let mut past_label = false;
        for node in self.root.descendants() {
            if !past_label {
                if let Some(text) = node.value().as_text() {
                    if text.trim() == label {
                        past_label = true;
                    }
                }
            } else if let Some(el) = ElementRef::wrap(node) {
                if selector.matches(&el) {
                    return Some(el);
                }
            }
        }
        None
    }
}

impl LabelLookup for Fragment<'_> {
    fn labeled_value(&self, label: &str) -> Option<String> {
        let sel = Selector::parse(".conflist_value").unwrap();
        self.element_after_label(label, &sel)
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

    fn labeled_inline(&self, label: &str) -> Option<String> {
        let sel = Selector::parse(".conflist_inline").unwrap();
        self.element_after_label(label, &sel)
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

    fn labeled_link(&self, label: &str) -> Option<String> {
        let sel = Selector::parse("a[href]").unwrap();
        self.element_after_label(label, &sel)
            .and_then(|el| el.value().attr("href"))
            .map(str::to_string)
    }
}
