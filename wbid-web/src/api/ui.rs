//! UI serving routes

use axum::response::Html;

const UPLOAD_HTML: &str = include_str!("../ui/upload.html");
const LOGIN_HTML: &str = include_str!("../ui/login.html");

/// GET / and GET /identify
pub async fn serve_upload_page() -> Html<&'static str> {
    Html(UPLOAD_HTML)
}

/// Admin login form, optionally with an error banner
pub fn login_page(error: Option<&str>) -> Html<String> {
    let banner = error
        .map(|msg| format!("<p class=\"error\">{}</p>", escape_html(msg)))
        .unwrap_or_default();
    Html(LOGIN_HTML.replace("{{error}}", &banner))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
