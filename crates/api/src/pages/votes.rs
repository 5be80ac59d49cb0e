//! The signed-in user's active votes.

use tba_core::html::escape_html as esc;
use tba_core::marker::format_timestamp;
use tba_db::models::vote::MyVote;

use super::layout::{empty_block, render, status_line, Chrome};

pub fn render_votes(chrome: &Chrome, votes: &[MyVote]) -> String {
    let content = if votes.is_empty() {
        empty_block(
            "🗳️",
            "No votes yet. Open a marker and set your vote.",
            "",
            &[("/list", "Browse markers", true)],
        )
    } else {
        let rows: String = votes
            .iter()
            .map(|v| {
                let inactive = if v.marker_active {
                    ""
                } else {
                    r#" <span class="badge">(inactive)</span>"#
                };
                let updated = v
                    .updated_at
                    .map(|t| format_timestamp(&t.to_rfc3339()))
                    .unwrap_or_default();
                format!(
                    r#"<tr><td><a href="/marker/{id}">{title}</a>{inactive}</td><td>{kind}</td><td>{category}</td><td>{vote}</td><td>{updated}</td></tr>"#,
                    id = v.marker_id,
                    title = esc(&v.title),
                    kind = v.group_type.as_str(),
                    category = esc(&v.category_name),
                    vote = v.vote,
                    updated = esc(&updated),
                )
            })
            .collect();
        format!(
            r#"<table class="table"><thead><tr><th>Marker</th><th>Type</th><th>Category</th><th>My vote</th><th>Updated</th></tr></thead><tbody id="votesBody">{rows}</tbody></table>"#
        )
    };
    let status = if votes.is_empty() {
        String::new()
    } else {
        format!("Loaded {} vote(s).", votes.len())
    };

    let body = format!(
        "<h1>My votes</h1>{}{content}",
        status_line("votesStatus", &status)
    );
    render(chrome, "", &body)
}

#[cfg(test)]
mod tests {
    use tba_core::marker::GroupType;
    use tba_core::vote::VoteValue;

    use super::*;
    use crate::pages::layout::Nav;

    #[test]
    fn inactive_marker_badge() {
        let chrome = Chrome {
            title: "My votes".into(),
            nav: Nav::Votes,
            signed_in: true,
            email: None,
            login_url: "/login.html".into(),
        };
        let votes = vec![MyVote {
            marker_id: uuid::Uuid::nil(),
            vote: VoteValue::new(9).unwrap(),
            updated_at: None,
            title: "Gone <place>".into(),
            group_type: GroupType::Place,
            category_id: None,
            category_name: "Pizza".into(),
            marker_active: false,
        }];
        let html = render_votes(&chrome, &votes);
        assert!(html.contains("Gone &lt;place&gt;"));
        assert!(html.contains("(inactive)"));
        assert!(html.contains("Loaded 1 vote(s)."));
        assert!(html.contains("<td>9</td>"));
    }
}
