//! Products page: every product, best rated first, and the add form.

use serde::Deserialize;
use tba_core::html::escape_html as esc;
use tba_db::models::brand::Brand;
use tba_db::models::category::Category;

use super::layout::{
    brand_options, category_options, empty_block, mini_marker, render, status_line, vote_options,
    Chrome,
};
use crate::catalog::parse_vote;
use crate::views::MarkerSummary;

/// Add-product form fields as posted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub title: String,
    pub category_id: String,
    pub brand_id: String,
    pub vote: String,
}

pub struct ProductsView<'a> {
    pub rows: Vec<MarkerSummary>,
    pub categories: &'a [Category],
    pub brands: &'a [Brand],
    pub can_add: bool,
    pub form: ProductForm,
    pub save_status: String,
}

fn product_form(view: &ProductsView<'_>, login_url: &str) -> String {
    if !view.can_add {
        return format!(
            r#"<div class="add-product muted">Want to add a product? <a href="{}">Login</a> first.{}</div>"#,
            esc(login_url),
            status_line("productSaveStatus", &view.save_status)
        );
    }
    let form = &view.form;
    format!(
        r#"<form id="productForm" class="add-product" method="post" action="/products">
<h3>Add a product</h3>
<input name="title" placeholder="Title" value="{title}">
<select name="category_id">{categories}</select>
<select name="brand_id">{brands}</select>
<label>My vote <select name="vote">{votes}</select></label>
<button class="tba-btn tba-btn-primary" type="submit">Save</button>
{status}
</form>"#,
        title = esc(&form.title),
        categories = category_options(view.categories, Some(form.category_id.as_str()), Some("Choose a category…")),
        brands = brand_options(view.brands, Some(form.brand_id.as_str())),
        votes = vote_options(parse_vote(&form.vote).unwrap_or_default()),
        status = status_line("productSaveStatus", &view.save_status),
    )
}

pub fn render_products(chrome: &Chrome, view: &ProductsView<'_>) -> String {
    let (status, table) = if view.rows.is_empty() {
        (
            String::new(),
            empty_block("🛒", "No products yet.", "Add the first one below.", &[]),
        )
    } else {
        let rows: String = view
            .rows
            .iter()
            .map(|m| {
                format!(
                    r#"<tr><td>{icon}</td><td><a href="/marker/{id}">{title}</a></td><td>{category}</td><td>{brand}</td><td>{score}</td></tr>"#,
                    icon = mini_marker(m.css_class(), &m.icon_url),
                    id = m.id(),
                    title = esc(&m.marker.title),
                    category = esc(&m.category_name),
                    brand = esc(&m.brand_name),
                    score = esc(&m.overall),
                )
            })
            .collect();
        (
            format!("Loaded {} product(s).", view.rows.len()),
            format!(
                r#"<table class="table"><thead><tr><th></th><th>Title</th><th>Category</th><th>Brand</th><th>Rating</th></tr></thead><tbody id="productsBody">{rows}</tbody></table>"#
            ),
        )
    };

    let body = format!(
        "<h1>Products</h1>{status}{table}{form}",
        status = status_line("productsStatus", &status),
        form = product_form(view, &chrome.login_url),
    );
    render(chrome, "", &body)
}
