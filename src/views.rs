//! Server-rendered HTML. Deliberately plain: pages are assembled with `format!`
//! and every dynamic value passes through [`escape`].

use axum::response::Html;

use crate::{
    clock,
    entries::repo_types::ProductionEntry,
    flash::Flash,
};

pub const COMPANY_TITLE: &str = "Anchemco India Private Limited";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthTab {
    #[default]
    Login,
    Signup,
}

#[derive(Debug, Default)]
pub struct AuthPage<'a> {
    pub active_tab: AuthTab,
    pub login_error: Option<&'a str>,
    pub signup_error: Option<&'a str>,
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, flashes: &[Flash], body: &str) -> Html<String> {
    let notices: String = flashes
        .iter()
        .map(|f| {
            format!(
                r#"<div class="alert alert-{}">{}</div>"#,
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .collect();
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<script>if ('serviceWorker' in navigator) {{ navigator.serviceWorker.register('/service-worker.js'); }}</script>
</head>
<body>
{notices}
{body}
</body>
</html>
"#,
        title = escape(title),
    ))
}

fn alert(level: &str, message: Option<&str>) -> String {
    message
        .map(|m| format!(r#"<div class="alert alert-{}">{}</div>"#, level, escape(m)))
        .unwrap_or_default()
}

pub fn auth_page(page: &AuthPage<'_>, flashes: &[Flash]) -> Html<String> {
    let (login_class, signup_class) = match page.active_tab {
        AuthTab::Login => ("tab active", "tab"),
        AuthTab::Signup => ("tab", "tab active"),
    };
    let body = format!(
        r#"<h1>{company}</h1>
<section id="login" class="{login_class}">
<h2>Login</h2>
{login_error}
<form method="post" action="/login">
<input name="username" placeholder="Username" required>
<input name="password" type="password" placeholder="Password" required>
<button type="submit">Login</button>
</form>
<a href="/forgot_password">Forgot password?</a>
</section>
<section id="signup" class="{signup_class}">
<h2>Sign up</h2>
{signup_error}
<form method="post" action="/signup">
<input name="username" placeholder="Username" required>
<input name="email" type="email" placeholder="Email" required>
<input name="password" type="password" placeholder="Password" required>
<input name="confirm_password" type="password" placeholder="Confirm password" required>
<button type="submit">Sign up</button>
</form>
</section>"#,
        company = COMPANY_TITLE,
        login_error = alert("danger", page.login_error),
        signup_error = alert("danger", page.signup_error),
    );
    layout("Login", flashes, &body)
}

pub fn home(username: &str) -> Html<String> {
    let body = format!(
        r#"<h1>{company}</h1>
<p>Welcome, {username}</p>
<h2>Batch Mfg Records</h2>
<nav>
<a href="/entry">New entry</a>
<a href="/dashboard">Dashboard</a>
<a href="/download_excel">Download Excel</a>
<a href="/logout">Logout</a>
</nav>"#,
        company = COMPANY_TITLE,
        username = escape(username),
    );
    layout("Home", &[], &body)
}

pub fn forgot_password() -> Html<String> {
    layout(
        "Forgot password",
        &[],
        r#"<h1>Forgot password</h1>
<p>Please contact your administrator to reset your password.</p>
<a href="/login">Back to login</a>"#,
    )
}

pub fn entry_form(flashes: &[Flash]) -> Html<String> {
    layout(
        "New entry",
        flashes,
        r#"<h1>Batch Mfg Record</h1>
<form method="post" action="/save_entry" enctype="multipart/form-data">
<input name="authorised_person" placeholder="Authorised person" required>
<input name="employee_id" placeholder="Employee ID" required>
<input name="final_batch_number" placeholder="Final batch number" required>
<input name="batch_quantity" placeholder="Batch quantity" required>
<input name="urea_percentage" type="number" step="any" placeholder="Urea %" required>
<input name="density" type="number" step="any" placeholder="Density" required>
<input name="photo" type="file" accept="image/*" capture="environment">
<button type="submit">Save</button>
</form>
<a href="/dashboard">Dashboard</a>"#,
    )
}

fn cell(value: Option<&str>) -> String {
    escape(value.unwrap_or(""))
}

fn number_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn dashboard(entries: &[ProductionEntry], flashes: &[Flash]) -> Html<String> {
    let rows: String = entries
        .iter()
        .map(|e| {
            let photo = e
                .photo_path
                .as_deref()
                .map(|p| {
                    let p = escape(p);
                    format!(r#"<a href="/uploads/{p}">{p}</a>"#)
                })
                .unwrap_or_default();
            format!(
                "<tr><td>{id}</td><td>{date}</td><td>{person}</td><td>{employee}</td>\
                 <td>{product}</td><td>{batch}</td><td>{qty}</td><td>{urea}</td>\
                 <td>{density}</td><td>{photo}</td>\
                 <td><a href=\"/delete_entry/{id}\">Delete</a></td></tr>\n",
                id = e.id,
                date = clock::display(e.created_at),
                person = cell(e.authorised_person.as_deref()),
                employee = cell(e.employee_id.as_deref()),
                product = cell(e.sf_batch_number.as_deref()),
                batch = cell(e.final_batch_number.as_deref()),
                qty = cell(e.batch_quantity.as_deref()),
                urea = number_cell(e.urea_percentage),
                density = number_cell(e.density),
            )
        })
        .collect();
    let body = format!(
        r#"<h1>Dashboard</h1>
<nav><a href="/entry">New entry</a> <a href="/download_excel">Download Excel</a> <a href="/home">Home</a></nav>
<table>
<thead><tr><th>ID</th><th>Date</th><th>Auth Person</th><th>Employee ID</th><th>Product</th><th>Final Batch</th><th>Batch Quantity</th><th>Urea %</th><th>Density</th><th>Photo</th><th></th></tr></thead>
<tbody>
{rows}</tbody>
</table>"#
    );
    layout("Dashboard", flashes, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b>"A&B's"</b>"#),
            "&lt;b&gt;&quot;A&amp;B&#x27;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn auth_page_shows_inline_errors_and_flashes() {
        let page = AuthPage {
            active_tab: AuthTab::Signup,
            signup_error: Some("Passwords do not match!"),
            ..Default::default()
        };
        let Html(html) = auth_page(&page, &[Flash::success("Signup successful! Please login.")]);
        assert!(html.contains("Passwords do not match!"));
        assert!(html.contains("Signup successful! Please login."));
        assert!(html.contains(r#"id="signup" class="tab active""#));
    }

    #[test]
    fn dashboard_escapes_user_text() {
        let entry = ProductionEntry {
            id: 3,
            user_id: 1,
            company_name: Some("Sharanu".into()),
            authorised_person: Some("<script>".into()),
            employee_id: None,
            final_batch_number: Some("BATCH100".into()),
            sf_batch_number: Some("SF AdBlue".into()),
            batch_quantity: Some("1000 Liters".into()),
            urea_percentage: Some(45.5),
            density: Some(1.2),
            photo_path: Some("20250101000000_test.jpg".into()),
            created_at: time::macros::datetime!(2025-01-01 00:00:00),
        };
        let Html(html) = dashboard(&[entry], &[]);
        assert!(!html.contains("<td><script>"));
        assert!(html.contains("<td>&lt;script&gt;</td>"));
        assert!(html.contains("/delete_entry/3"));
        assert!(html.contains("/uploads/20250101000000_test.jpg"));
        assert!(html.contains("45.5"));
    }
}
