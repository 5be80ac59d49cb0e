//! One marker: details, the signed-in user's vote, edit, and deactivate.

use serde::Deserialize;
use tba_core::html::escape_html as esc;
use tba_core::marker::format_timestamp;
use tba_core::vote::{VoteState, VoteValue};
use tba_db::models::brand::Brand;
use tba_db::models::category::Category;
use tba_db::models::marker::Marker;

use super::layout::{brand_options, category_options, mini_marker, render, status_line, vote_options, Chrome};
use crate::views::MarkerSummary;

/// `POST /marker/{id}/vote`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VoteForm {
    pub vote: String,
}

/// `POST /marker/{id}/edit`, as typed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditForm {
    pub title: String,
    pub category_id: String,
    pub brand_id: String,
    pub address: String,
    pub lat: String,
    pub lon: String,
}

impl EditForm {
    pub fn from_marker(marker: &Marker) -> Self {
        let num = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        Self {
            title: marker.title.clone(),
            category_id: marker.category_id.clone().unwrap_or_default(),
            brand_id: marker.brand_id.clone().unwrap_or_default(),
            address: marker.address.clone().unwrap_or_default(),
            lat: num(marker.lat),
            lon: num(marker.lon),
        }
    }
}

/// `?notice=` values set by redirects after creating a marker.
pub fn notice_text(key: &str) -> Option<&'static str> {
    match key {
        "exists" => Some("This product already exists. Here it is."),
        "vote_failed" => Some("Saved ✅ but your vote failed. Set it below."),
        "created" => Some("Saved ✅"),
        _ => None,
    }
}

pub struct MarkerView<'a> {
    pub summary: MarkerSummary,
    /// `None` for guests.
    pub vote: Option<VoteState>,
    /// Categories valid for this marker's type.
    pub categories: &'a [Category],
    pub brands: &'a [Brand],
    pub edit: EditForm,
    pub notice: Option<&'static str>,
    pub vote_status: String,
    pub edit_status: String,
}

fn details(m: &MarkerSummary) -> String {
    let marker = &m.marker;
    let mut rows = vec![
        ("Type", marker.group_type.as_str().to_string()),
        ("Category", m.category_name.clone()),
    ];
    if marker.is_place() {
        rows.push(("Address", marker.address.clone().unwrap_or_default()));
        if let Some((lat, lon)) = marker.position() {
            rows.push(("Location", format!("{lat:.6}, {lon:.6}")));
        }
    } else {
        rows.push(("Brand", m.brand_name.clone()));
    }
    rows.push(("Rating", m.overall_long()));
    if let Some(created) = marker.created_at {
        rows.push(("Added", format_timestamp(&created.to_rfc3339())));
    }

    let rows: String = rows
        .into_iter()
        .map(|(k, v)| format!("<tr><th>{k}</th><td>{}</td></tr>", esc(&v)))
        .collect();
    format!(r#"<table class="table marker-details">{rows}</table>"#)
}

fn vote_section(view: &MarkerView<'_>, login_url: &str) -> String {
    let id = view.summary.id();
    let Some(state) = view.vote else {
        return format!(
            r#"<section class="my-vote"><h2>My vote</h2><p class="muted"><a href="{}">Login</a> to vote.</p>{}</section>"#,
            esc(login_url),
            status_line("voteStatus", &view.vote_status)
        );
    };
    if !view.summary.marker.is_active {
        return status_line("voteStatus", &view.vote_status);
    }

    let (line, selected, extra) = match state {
        VoteState::NoRow => ("You have not voted yet.".to_string(), VoteValue::default(), String::new()),
        VoteState::Active { value } => (
            format!("Your vote: {value}"),
            value,
            format!(
                r#"<form method="post" action="/marker/{id}/vote/clear"><button class="tba-btn" type="submit">Clear my vote</button></form>"#
            ),
        ),
        VoteState::Inactive { retained } => (
            format!("Your vote ({retained}) is cleared."),
            retained,
            format!(
                r#"<form method="post" action="/marker/{id}/vote/reactivate"><button class="tba-btn" type="submit">Restore my {retained}</button></form>"#
            ),
        ),
    };
    format!(
        r#"<section class="my-vote"><h2>My vote</h2>
<p id="myVoteLine">{line}</p>
<form method="post" action="/marker/{id}/vote"><select name="vote">{options}</select> <button class="tba-btn tba-btn-primary" type="submit">Save vote</button></form>
{extra}
{status}
</section>"#,
        line = esc(&line),
        options = vote_options(selected),
        status = status_line("voteStatus", &view.vote_status),
    )
}

fn edit_section(view: &MarkerView<'_>) -> String {
    let marker = &view.summary.marker;
    if view.vote.is_none() || !marker.is_active {
        return status_line("editStatus", &view.edit_status);
    }
    let id = marker.id;
    let form = &view.edit;
    let type_fields = if marker.is_place() {
        format!(
            r#"<input name="address" placeholder="Address" value="{}">
<input name="lat" placeholder="Lat" value="{}">
<input name="lon" placeholder="Lon" value="{}">"#,
            esc(&form.address),
            esc(&form.lat),
            esc(&form.lon)
        )
    } else {
        format!(
            r#"<select name="brand_id">{}</select>"#,
            brand_options(view.brands, Some(form.brand_id.as_str()))
        )
    };
    format!(
        r#"<section class="edit-marker"><h2>Edit</h2>
<form method="post" action="/marker/{id}/edit">
<input name="title" placeholder="Title" value="{title}">
<select name="category_id">{categories}</select>
{type_fields}
<button class="tba-btn tba-btn-primary" type="submit">Save changes</button>
</form>
<form method="post" action="/marker/{id}/deactivate" onsubmit="return confirm('Deactivate this marker?')"><button class="tba-btn" type="submit">Deactivate</button></form>
{status}
</section>"#,
        title = esc(&form.title),
        categories = category_options(view.categories, Some(form.category_id.as_str()), None),
        status = status_line("editStatus", &view.edit_status),
    )
}

pub fn render_marker(chrome: &Chrome, view: &MarkerView<'_>) -> String {
    let m = &view.summary;
    let inactive = if m.marker.is_active {
        ""
    } else {
        r#"<p class="badge">This marker is inactive.</p>"#
    };
    let back = if m.marker.is_place() {
        format!(r#"<a class="tba-btn" href="/map?focus={}">Open on Map</a>"#, m.id())
    } else {
        r#"<a class="tba-btn" href="/products">Open Products</a>"#.to_string()
    };
    let body = format!(
        r#"{notice}<h1>{icon} {title}</h1>{inactive}{details}{back}{vote}{edit}"#,
        notice = status_line("markerNotice", view.notice.unwrap_or("")),
        icon = mini_marker(m.css_class(), &m.icon_url),
        title = esc(&m.marker.title),
        details = details(m),
        vote = vote_section(view, &chrome.login_url),
        edit = edit_section(view),
    );
    render(chrome, "", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices() {
        assert_eq!(notice_text("exists"), Some("This product already exists. Here it is."));
        assert_eq!(notice_text("bogus"), None);
    }
}
