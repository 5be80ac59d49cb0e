//! Home page: craving shortcuts, recent markers, and a random spotlight.

use tba_core::html::escape_html as esc;

use super::layout::{empty_block, mini_marker, render, Chrome};
use super::{render_chips, Chip};
use crate::views::{MarkerSummary, SpotlightPick};

pub struct HomeView {
    pub place_chips: Vec<Chip>,
    pub product_chips: Vec<Chip>,
    pub recent: Vec<MarkerSummary>,
    pub spotlight: Option<SpotlightPick>,
}

fn craving_section(title: &str, chips: &[Chip]) -> String {
    let body = if chips.is_empty() {
        r#"<span class="muted">No categories yet.</span>"#.to_string()
    } else {
        render_chips(chips)
    };
    format!(r#"<div class="craving"><h3>{}</h3><div class="chips">{body}</div></div>"#, esc(title))
}

fn recent_section(recent: &[MarkerSummary]) -> String {
    if recent.is_empty() {
        return empty_block(
            "🗺️",
            "No markers yet.",
            "Add your first place on the map or your first product in Products.",
            &[("/map", "Open Map", true), ("/products", "Open Products", false)],
        );
    }

    let rows: String = recent
        .iter()
        .map(|m| {
            format!(
                r#"<a class="recent-row" href="/marker/{id}">{icon} <span class="recent-title">{title}</span> <span class="muted">{meta}</span> <span class="recent-score">{score}</span></a><br>"#,
                id = m.id(),
                icon = mini_marker(m.css_class(), &m.icon_url),
                title = esc(&m.marker.title),
                meta = esc(&format!("{} · {}", m.marker.group_type.as_str(), m.category_name)),
                score = esc(&m.overall_long()),
            )
        })
        .collect();
    format!(r#"<div class="recent-list">{rows}</div>"#)
}

fn spotlight_section(pick: Option<&SpotlightPick>) -> String {
    let Some(pick) = pick else {
        return empty_block(
            "✨",
            "Nothing to surprise you with yet.",
            "Your spotlight is empty.",
            &[("/map", "Add a place", true), ("/products", "Add a product", false)],
        );
    };

    let m = &pick.marker;
    format!(
        r#"<div class="spotlight">
<div class="spotlight-quip">{quip}</div>
<div class="muted">{kicker}</div>
<h3>{icon} {title}</h3>
<div>{category}</div>
<div>{detail}</div>
<div class="spotlight-score">{score}</div>
<div class="spotlight-actions">
<a class="tba-btn tba-btn-primary" href="/marker/{id}">Open details</a>
<a class="tba-btn" href="{secondary_href}">{secondary_label}</a>
<a class="tba-btn" id="shuffleSpotlight" href="/?last={id}">Show another</a>
</div>
</div>"#,
        quip = esc(pick.quip),
        kicker = esc(pick.kicker),
        icon = mini_marker(m.css_class(), &m.icon_url),
        title = esc(&m.marker.title),
        category = esc(&m.category_name),
        detail = esc(&pick.detail),
        score = esc(&m.overall_long()),
        id = m.id(),
        secondary_href = esc(&pick.secondary_href),
        secondary_label = esc(pick.secondary_label),
    )
}

pub fn render_home(chrome: &Chrome, view: &HomeView) -> String {
    let body = format!(
        r#"<h1>What are you craving?</h1>
<section class="cravings">{places}{products}</section>
<section><h2>Recently added</h2>{recent}</section>
<section><h2>Spotlight</h2>{spotlight}</section>"#,
        places = craving_section("Places", &view.place_chips),
        products = craving_section("Products", &view.product_chips),
        recent = recent_section(&view.recent),
        spotlight = spotlight_section(view.spotlight.as_ref()),
    );
    render(chrome, "", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::layout::Nav;

    fn chrome() -> Chrome {
        Chrome {
            title: "Home".into(),
            nav: Nav::Home,
            signed_in: false,
            email: None,
            login_url: "/login.html".into(),
        }
    }

    #[test]
    fn empty_home_shows_both_empty_states() {
        let html = render_home(
            &chrome(),
            &HomeView {
                place_chips: vec![],
                product_chips: vec![],
                recent: vec![],
                spotlight: None,
            },
        );
        assert!(html.contains("No markers yet."));
        assert!(html.contains("Nothing to surprise you with yet."));
        assert!(html.contains("Your spotlight is empty."));
        assert!(html.contains("No categories yet."));
    }
}
