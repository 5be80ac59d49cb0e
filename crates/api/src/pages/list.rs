//! All markers, filterable by type, category, and minimum rating.

use tba_core::html::escape_html as esc;
use tba_core::listing::ListFilter;
use tba_core::marker::GroupType;
use tba_core::vote::VoteValue;
use tba_db::models::category::Category;

use super::layout::{category_options, empty_block, mini_marker, render, status_line, Chrome};
use crate::views::MarkerSummary;

pub struct ListView<'a> {
    pub filter: &'a ListFilter,
    pub categories: &'a [Category],
    pub rows: Vec<MarkerSummary>,
}

fn type_options(selected: Option<GroupType>) -> String {
    [(None, "All types"), (Some(GroupType::Place), "Places"), (Some(GroupType::Product), "Products")]
        .iter()
        .map(|(value, label)| {
            let sel = if *value == selected { " selected" } else { "" };
            let v = value.map(GroupType::as_str).unwrap_or("");
            format!(r#"<option value="{v}"{sel}>{label}</option>"#)
        })
        .collect()
}

fn min_rating_options(selected: Option<VoteValue>) -> String {
    let mut out = String::from(r#"<option value="">Any rating</option>"#);
    for v in VoteValue::all() {
        let sel = if Some(v) == selected { " selected" } else { "" };
        out.push_str(&format!(r#"<option value="{v}"{sel}>{v}+</option>"#));
    }
    out
}

pub fn render_list(chrome: &Chrome, view: &ListView<'_>) -> String {
    let filter = view.filter;
    let form = format!(
        r#"<form id="listFilters" method="get" action="/list">
<select name="type">{types}</select>
<select name="category">{categories}</select>
<select name="min_rating">{ratings}</select>
<button class="tba-btn" type="submit">Apply</button>
<a class="tba-btn" href="/list">Clear</a>
</form>"#,
        types = type_options(filter.group_type),
        categories = category_options(view.categories, filter.category_id.as_deref(), Some("All categories")),
        ratings = min_rating_options(filter.min_rating),
    );

    let (status, table) = if view.rows.is_empty() {
        (
            String::new(),
            empty_block(
                "🔎",
                "No markers found.",
                "Try clearing a filter.",
                &[("/list", "Clear filters", false)],
            ),
        )
    } else {
        let rows: String = view
            .rows
            .iter()
            .map(|m| {
                format!(
                    r#"<tr><td>{icon}</td><td><a href="/marker/{id}">{title}</a></td><td>{kind}</td><td>{category}</td><td>{info}</td><td>{score}</td></tr>"#,
                    icon = mini_marker(m.css_class(), &m.icon_url),
                    id = m.id(),
                    title = esc(&m.marker.title),
                    kind = m.marker.group_type.as_str(),
                    category = esc(&m.category_name),
                    info = esc(&m.info()),
                    score = esc(&m.overall),
                )
            })
            .collect();
        (
            format!("Loaded {} marker(s).", view.rows.len()),
            format!(
                r#"<table class="table"><thead><tr><th></th><th>Title</th><th>Type</th><th>Category</th><th>Info</th><th>Rating</th></tr></thead><tbody id="listBody">{rows}</tbody></table>"#
            ),
        )
    };

    let body = format!(
        "<h1>List</h1>{form}{status}{table}",
        status = status_line("listStatus", &status),
    );
    render(chrome, "", &body)
}
