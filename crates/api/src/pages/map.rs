//! Map page: places on a Leaflet map, category and rating filters, the
//! selected-marker panel, and the add-place form.
//!
//! Pins are embedded as a JSON block and drawn client-side. Clicking a pin
//! reloads with `?focus=<id>` so the panel is rendered here.

use serde::{Deserialize, Serialize};
use tba_core::html::escape_html as esc;
use tba_core::listing::MapFilter;
use tba_core::rating::FILTER_BUCKETS;
use tba_core::types::MarkerId;
use tba_db::models::category::Category;

use super::layout::{category_options, empty_block, mini_marker, render, status_line, vote_options, Chrome};
use super::{render_chips, with_query, Chip};
use crate::catalog::parse_vote;
use crate::views::MarkerSummary;

/// Where the map opens when nothing is focused.
pub const DEFAULT_CENTER: [f64; 2] = [41.3889, 2.1618];
pub const DEFAULT_ZOOM: u8 = 15;
const FOCUS_ZOOM: u8 = 17;

const LEAFLET_HEAD: &str = r#"<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>"#;

const MAP_SCRIPT: &str = r#"<script>
(function () {
  var data = JSON.parse(document.getElementById('mapData').textContent);
  var map = L.map('map').setView(data.center, data.zoom);
  L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
    maxZoom: 19,
    attribution: '&copy; OpenStreetMap contributors'
  }).addTo(map);

  data.pins.forEach(function (p) {
    var inner = document.createElement('div');
    inner.className = 'tba-marker-inner ' + p.css_class;
    var img = document.createElement('img');
    img.src = p.icon_url;
    img.alt = '';
    inner.appendChild(img);
    var icon = L.divIcon({ className: 'tba-marker', html: inner.outerHTML, iconSize: [34, 34], iconAnchor: [17, 17] });
    L.marker([p.lat, p.lon], { icon: icon, title: p.title }).addTo(map).on('click', function () {
      var q = new URLSearchParams(data.query);
      q.set('focus', p.id);
      window.location.search = q.toString();
    });
  });

  var form = document.getElementById('placeForm');
  if (!form) return;
  var picked = null;
  map.on('click', function (e) {
    var lat = e.latlng.lat.toFixed(6);
    var lon = e.latlng.lng.toFixed(6);
    form.elements.lat.value = lat;
    form.elements.lon.value = lon;
    if (picked) map.removeLayer(picked);
    picked = L.circleMarker(e.latlng, { radius: 8 }).addTo(map);
    var status = document.getElementById('saveStatus');
    status.textContent = 'Looking up address…';
    fetch('/api/v1/geocode/reverse?lat=' + lat + '&lon=' + lon)
      .then(function (r) { return r.json(); })
      .then(function (body) {
        var d = body.data || {};
        if (d.address) form.elements.address.value = d.address;
        status.textContent = d.message || '';
      })
      .catch(function () {
        status.textContent = 'Address lookup failed (you can type it manually).';
      });
  });
})();
</script>"#;

/// Add-place form fields as posted. Kept as text so a rejected post
/// re-renders exactly what was typed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaceForm {
    pub title: String,
    pub category_id: String,
    pub address: String,
    pub lat: String,
    pub lon: String,
    pub vote: String,
}

#[derive(Debug, Serialize)]
struct Pin<'a> {
    id: MarkerId,
    lat: f64,
    lon: f64,
    title: &'a str,
    icon_url: &'a str,
    css_class: &'static str,
}

#[derive(Debug, Serialize)]
struct MapData<'a> {
    center: [f64; 2],
    zoom: u8,
    query: String,
    pins: Vec<Pin<'a>>,
}

pub struct MapView<'a> {
    pub filter: &'a MapFilter,
    /// Most used place categories with their icons.
    pub quick_categories: Vec<(&'a Category, String)>,
    /// Every place category, for the "More" dropdown and the add form.
    pub categories: &'a [Category],
    pub pins: Vec<MarkerSummary>,
    pub focused: Option<MarkerSummary>,
    pub can_add: bool,
    pub form: PlaceForm,
    pub save_status: String,
}

fn map_href(filter: &MapFilter) -> String {
    with_query("/map", &filter.to_query_string())
}

fn category_chips(view: &MapView<'_>) -> Vec<Chip> {
    let current = view.filter;
    let all = MapFilter {
        category_id: None,
        focus: None,
        ..current.clone()
    };
    let mut chips = vec![Chip::link(map_href(&all), "All").active(current.category_id.is_none())];
    for (category, icon) in &view.quick_categories {
        let target = MapFilter {
            category_id: Some(category.id.clone()),
            focus: None,
            ..current.clone()
        };
        chips.push(
            Chip::link(map_href(&target), category.name.clone())
                .with_icon(icon.clone())
                .active(current.category_id.as_deref() == Some(category.id.as_str())),
        );
    }
    chips
}

fn rating_chips(filter: &MapFilter) -> Vec<Chip> {
    let mut chips: Vec<Chip> = FILTER_BUCKETS
        .iter()
        .map(|bucket| {
            let target = MapFilter {
                rating_bucket: Some(*bucket),
                focus: None,
                ..filter.clone()
            };
            Chip::link(map_href(&target), bucket.label()).active(filter.rating_bucket == Some(*bucket))
        })
        .collect();
    if filter.has_filters() {
        chips.push(Chip::link("/map", "Clear"));
    }
    chips
}

fn more_form(view: &MapView<'_>) -> String {
    let rating = view
        .filter
        .rating_bucket
        .and_then(|b| b.key())
        .map(|key| format!(r#"<input type="hidden" name="rating" value="{key}">"#))
        .unwrap_or_default();
    format!(
        r#"<form class="more-categories" method="get" action="/map">{rating}<select name="category" onchange="this.form.submit()">{options}</select><noscript><button class="tba-btn" type="submit">Go</button></noscript></form>"#,
        options = category_options(view.categories, view.filter.category_id.as_deref(), Some("More…")),
    )
}

fn focus_panel(focused: Option<&MarkerSummary>) -> String {
    let Some(m) = focused else {
        return r#"<div class="focus-panel muted">Click a marker to see it here.</div>"#.to_string();
    };
    let address = m
        .marker
        .address
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or("No address yet");
    format!(
        r#"<div class="focus-panel">{icon} <b>{title}</b><div>{category}</div><div class="muted">{address}</div><div>{score}</div><a class="tba-btn tba-btn-primary" href="/marker/{id}">Open details</a></div>"#,
        icon = mini_marker(m.css_class(), &m.icon_url),
        title = esc(&m.marker.title),
        category = esc(&m.category_name),
        address = esc(address),
        score = esc(&m.overall),
        id = m.id(),
    )
}

fn place_form(view: &MapView<'_>, login_url: &str) -> String {
    if !view.can_add {
        return format!(
            r#"<div class="add-place muted">Want to add a place? <a href="{}">Login</a> first.{}</div>"#,
            esc(login_url),
            status_line("saveStatus", &view.save_status)
        );
    }
    let form = &view.form;
    let selected_vote = parse_vote(&form.vote).unwrap_or_default();
    format!(
        r#"<form id="placeForm" class="add-place" method="post" action="/map/places">
<h3>Add a place</h3>
<p class="muted">Click the map to pick a location.</p>
<input name="title" placeholder="Title" value="{title}">
<select name="category_id">{categories}</select>
<input name="address" placeholder="Address" value="{address}">
<input name="lat" placeholder="Lat" value="{lat}" readonly>
<input name="lon" placeholder="Lon" value="{lon}" readonly>
<label>My vote <select name="vote">{votes}</select></label>
<button class="tba-btn tba-btn-primary" type="submit">Save</button>
{status}
</form>"#,
        title = esc(&form.title),
        categories = category_options(view.categories, Some(form.category_id.as_str()), Some("Choose a category…")),
        address = esc(&form.address),
        lat = esc(&form.lat),
        lon = esc(&form.lon),
        votes = vote_options(selected_vote),
        status = status_line("saveStatus", &view.save_status),
    )
}

fn map_data(view: &MapView<'_>) -> String {
    let pins: Vec<Pin<'_>> = view
        .pins
        .iter()
        .filter_map(|m| {
            let (lat, lon) = m.marker.position()?;
            Some(Pin {
                id: m.id(),
                lat,
                lon,
                title: &m.marker.title,
                icon_url: &m.icon_url,
                css_class: m.css_class(),
            })
        })
        .collect();

    let (center, zoom) = match view.focused.as_ref().and_then(|m| m.marker.position()) {
        Some((lat, lon)) => ([lat, lon], FOCUS_ZOOM),
        None => (DEFAULT_CENTER, DEFAULT_ZOOM),
    };
    let data = MapData {
        center,
        zoom,
        query: MapFilter {
            focus: None,
            ..view.filter.clone()
        }
        .to_query_string(),
        pins,
    };
    // `<` only occurs inside JSON strings, where `<` is equivalent.
    serde_json::to_string(&data)
        .unwrap_or_else(|_| "{}".to_string())
        .replace('<', "\\u003c")
}

pub fn render_map(chrome: &Chrome, view: &MapView<'_>) -> String {
    let status = if view.pins.is_empty() {
        String::new()
    } else {
        format!("Loaded {} place(s).", view.pins.len())
    };
    let empty = if view.pins.is_empty() {
        if view.filter.has_filters() {
            empty_block("🧭", "No places match these filters.", "", &[("/map", "Clear filters", false)])
        } else {
            empty_block("📍", "No places yet.", "Click the map to add the first one.", &[])
        }
    } else {
        String::new()
    };

    let body = format!(
        r#"<h1>Map</h1>
<div class="map-filters"><div class="chips">{categories}{more}</div><div class="chips rating-segment">{ratings}</div></div>
{status}
<div id="map"></div>
{empty}
{focus}
{form}
<script type="application/json" id="mapData">{data}</script>
{MAP_SCRIPT}"#,
        categories = render_chips(&category_chips(view)),
        more = more_form(view),
        ratings = render_chips(&rating_chips(view.filter)),
        status = status_line("mapStatus", &status),
        focus = focus_panel(view.focused.as_ref()),
        form = place_form(view, &chrome.login_url),
        data = map_data(view),
    );
    render(chrome, LEAFLET_HEAD, &body)
}
