//! Page shell and small shared fragments.

use tba_core::html::escape_html as esc;
use tba_core::vote::VoteValue;
use tba_db::models::brand::Brand;
use tba_db::models::category::Category;

use crate::config::ServerConfig;
use crate::middleware::auth::MaybeUser;

/// Which header link is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Home,
    Map,
    List,
    Products,
    Votes,
    None,
}

const NAV_LINKS: [(Nav, &str, &str); 5] = [
    (Nav::Home, "/", "Home"),
    (Nav::Map, "/map", "Map"),
    (Nav::List, "/list", "List"),
    (Nav::Products, "/products", "Products"),
    (Nav::Votes, "/votes", "My votes"),
];

/// Everything the shell needs besides the page body.
#[derive(Debug, Clone)]
pub struct Chrome {
    pub title: String,
    pub nav: Nav,
    pub signed_in: bool,
    pub email: Option<String>,
    pub login_url: String,
}

impl Chrome {
    pub fn new(title: &str, nav: Nav, user: &MaybeUser, config: &ServerConfig) -> Self {
        Self {
            title: title.to_string(),
            nav,
            signed_in: user.0.is_some(),
            email: user.email().map(ToString::to_string),
            login_url: config.login_url.clone(),
        }
    }

    fn auth_status(&self) -> String {
        match (&self.email, self.signed_in) {
            (Some(email), _) => format!(r#"<span class="auth-email">{}</span>"#, esc(email)),
            (None, true) => r#"<span class="auth-email">Signed in</span>"#.to_string(),
            (None, false) => format!(r#"<a href="{}">Login</a>"#, esc(&self.login_url)),
        }
    }
}

const STYLE: &str = r#"
body{font-family:system-ui,sans-serif;margin:0;color:#1d1d1f;background:#fafafa}
header{display:flex;align-items:center;gap:18px;padding:12px 20px;background:#fff;border-bottom:1px solid #e6e6e6}
header .brand{font-weight:700}
header nav a{margin-right:12px;color:#333;text-decoration:none}
header nav a.active{font-weight:700;text-decoration:underline}
header .auth{margin-left:auto}
main{max-width:1080px;margin:0 auto;padding:20px}
.muted{color:#777}
.status{min-height:1.2em;color:#555}
.table{width:100%;border-collapse:collapse}
.table th,.table td{text-align:left;padding:8px;border-bottom:1px solid #eee}
.chip{display:inline-flex;align-items:center;gap:6px;padding:4px 10px;margin:2px;border:1px solid #ddd;border-radius:999px;text-decoration:none;color:#333}
.chip.active{border-color:#333;font-weight:600}
.chip-ic{width:18px;height:18px}
.tba-btn{display:inline-block;padding:6px 12px;border:1px solid #ccc;border-radius:8px;background:#fff;color:#333;text-decoration:none;cursor:pointer}
.tba-btn-primary{background:#222;color:#fff;border-color:#222}
.mini-marker{display:inline-flex;width:30px;height:30px;border-radius:50%;align-items:center;justify-content:center;border:3px solid #bbb}
.mini-marker img{width:18px;height:18px}
.tba-marker-inner{width:28px;height:28px;border-radius:50%;background:#fff;border-width:3px;border-style:solid;display:flex;align-items:center;justify-content:center}
.tba-marker-inner img{width:18px;height:18px}
.empty{padding:16px;border:1px dashed #ccc;border-radius:12px;text-align:center}
.empty-emoji{font-size:28px}
.badge{display:inline-block;padding:2px 8px;border-radius:999px;border:1px solid #ccc;font-size:.9em}
.rating-none{border-color:#bbb}
.rating-1-2{border-color:#d93025}
.rating-3-4{border-color:#f29900}
.rating-5-6{border-color:#f9d71c}
.rating-7-8{border-color:#7cb342}
.rating-9-10{border-color:#188038}
#map{height:520px;border-radius:12px}
"#;

/// Wrap a page body in the document shell.
pub fn render(chrome: &Chrome, head_extra: &str, body: &str) -> String {
    let nav: String = NAV_LINKS
        .iter()
        .map(|(nav, href, label)| {
            let class = if *nav == chrome.nav { r#" class="active""# } else { "" };
            format!(r#"<a href="{href}"{class}>{label}</a>"#)
        })
        .collect();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · The Best Again</title>
<style>{STYLE}</style>
{head_extra}
</head>
<body>
<header><a class="brand" href="/">The Best Again</a><nav>{nav}</nav><div class="auth" id="authStatus">{auth}</div></header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = esc(&chrome.title),
        auth = chrome.auth_status(),
    )
}

/// The status line each page reports loads and failures in.
pub fn status_line(id: &str, message: &str) -> String {
    format!(
        r#"<p id="{id}" class="status" role="status">{}</p>"#,
        esc(message)
    )
}

/// `<option>`s for a 1–10 vote dropdown.
pub fn vote_options(selected: VoteValue) -> String {
    VoteValue::all()
        .map(|v| {
            let sel = if v == selected { " selected" } else { "" };
            format!(r#"<option value="{v}"{sel}>{v}</option>"#)
        })
        .collect()
}

/// `<option>`s for a category dropdown, with an optional leading blank entry.
pub fn category_options<'a, I>(categories: I, selected: Option<&str>, blank: Option<&str>) -> String
where
    I: IntoIterator<Item = &'a Category>,
{
    let mut out = String::new();
    if let Some(label) = blank {
        out.push_str(&format!(r#"<option value="">{}</option>"#, esc(label)));
    }
    for c in categories {
        let sel = if selected == Some(c.id.as_str()) { " selected" } else { "" };
        out.push_str(&format!(
            r#"<option value="{}"{sel}>{}</option>"#,
            esc(&c.id),
            esc(&c.name)
        ));
    }
    out
}

pub fn brand_options(brands: &[Brand], selected: Option<&str>) -> String {
    let mut out = String::from(r#"<option value="">Choose a brand…</option>"#);
    for b in brands {
        let sel = if selected == Some(b.id.as_str()) { " selected" } else { "" };
        out.push_str(&format!(
            r#"<option value="{}"{sel}>{}</option>"#,
            esc(&b.id),
            esc(&b.name)
        ));
    }
    out
}

/// Rating-coloured round category icon.
pub fn mini_marker(css_class: &str, icon_url: &str) -> String {
    format!(
        r#"<span class="mini-marker {css_class}"><img src="{}" alt=""></span>"#,
        esc(icon_url)
    )
}

/// Empty-state block with optional call-to-action links `(href, label, primary)`.
pub fn empty_block(emoji: &str, title: &str, hint: &str, actions: &[(&str, &str, bool)]) -> String {
    let buttons: String = actions
        .iter()
        .map(|(href, label, primary)| {
            let class = if *primary { "tba-btn tba-btn-primary" } else { "tba-btn" };
            format!(r#"<a class="{class}" href="{}">{}</a> "#, esc(href), esc(label))
        })
        .collect();
    let buttons = if buttons.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="empty-actions">{buttons}</div>"#)
    };
    format!(
        r#"<div class="empty"><div class="empty-emoji">{emoji}</div><div><b>{}</b></div><div class="muted">{}</div>{buttons}</div>"#,
        esc(title),
        esc(hint)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrome(email: Option<&str>, signed_in: bool) -> Chrome {
        Chrome {
            title: "Home".into(),
            nav: Nav::Home,
            signed_in,
            email: email.map(Into::into),
            login_url: "https://example.org/login.html".into(),
        }
    }

    #[test]
    fn header_shows_login_link_for_guests() {
        let html = render(&chrome(None, false), "", "<p>hi</p>");
        assert!(html.contains(r#"<a href="https://example.org/login.html">Login</a>"#));
        assert!(html.contains(r#"<a href="/" class="active">Home</a>"#));
    }

    #[test]
    fn header_shows_escaped_email() {
        let html = render(&chrome(Some("a<b>@x.io"), true), "", "");
        assert!(html.contains("a&lt;b&gt;@x.io"));
        assert!(!html.contains(">Login<"));
    }

    #[test]
    fn vote_options_preselect() {
        let html = vote_options(VoteValue::default());
        assert_eq!(html.matches("<option").count(), 10);
        assert!(html.contains(r#"<option value="7" selected>7</option>"#));
    }

    #[test]
    fn category_options_escape_and_select() {
        let cats = vec![Category {
            id: "1".into(),
            name: "Fish & Chips".into(),
            icon_url: None,
            is_active: true,
            for_places: true,
            for_products: false,
        }];
        let html = category_options(&cats, Some("1"), Some("All"));
        assert_eq!(
            html,
            r#"<option value="">All</option><option value="1" selected>Fish &amp; Chips</option>"#
        );
    }
}
