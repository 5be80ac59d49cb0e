//! Server-rendered HTML pages.
//!
//! Renderers are plain functions from view data to markup. Every piece of
//! user-supplied text goes through [`escape_html`](tba_core::html::escape_html).
//!
//! - [`layout`]: document shell, header, and shared fragments
//! - [`home`]: craving chips, recent markers, and the spotlight
//! - [`list`]: filterable table of all markers
//! - [`map`]: Leaflet map of places with the add-place form
//! - [`products`]: product table with the add-product form
//! - [`marker`]: one marker with voting and editing
//! - [`votes`]: the signed-in user's votes

pub mod home;
pub mod layout;
pub mod list;
pub mod map;
pub mod marker;
pub mod products;
pub mod votes;

use tba_core::html::escape_html as esc;

/// A filter or shortcut pill.
#[derive(Debug, Clone)]
pub struct Chip {
    pub href: String,
    pub label: String,
    pub icon_url: Option<String>,
    pub active: bool,
}

impl Chip {
    pub fn link(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            label: label.into(),
            icon_url: None,
            active: false,
        }
    }

    pub fn with_icon(mut self, icon_url: impl Into<String>) -> Self {
        self.icon_url = Some(icon_url.into());
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn render(&self) -> String {
        let icon = self
            .icon_url
            .as_deref()
            .map(|url| format!(r#"<img class="chip-ic" src="{}" alt="">"#, esc(url)))
            .unwrap_or_default();
        let class = if self.active { "chip active" } else { "chip" };
        format!(
            r#"<a class="{class}" href="{}">{icon}<span>{}</span></a>"#,
            esc(&self.href),
            esc(&self.label)
        )
    }
}

pub fn render_chips(chips: &[Chip]) -> String {
    chips.iter().map(Chip::render).collect()
}

/// `"/path"` or `"/path?query"`.
pub fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chip_markup() {
        let chip = Chip::link("/list?category=1&x=2", "Pizza")
            .with_icon("https://cdn.example/p.svg")
            .active(true);
        assert_eq!(
            chip.render(),
            r#"<a class="chip active" href="/list?category=1&amp;x=2"><img class="chip-ic" src="https://cdn.example/p.svg" alt=""><span>Pizza</span></a>"#
        );
    }

    #[test]
    fn with_query_skips_empty() {
        assert_eq!(with_query("/map", ""), "/map");
        assert_eq!(with_query("/map", "rating=9-10"), "/map?rating=9-10");
    }
}
