use crate::domain::HistoryEntry;
use crate::infra::DashboardData;

/// Render the dashboard as one self-contained HTML document. The host drops
/// this straight into a webview; no scripts, no external assets.
pub fn render_dashboard(data: &DashboardData, history: &[HistoryEntry]) -> String {
    let mut html = String::with_capacity(4 * 1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<style>\n");
    html.push_str(
        "body{font-family:sans-serif;margin:1rem}table{border-collapse:collapse}\n\
         td,th{padding:.25rem .75rem;text-align:left}h2{margin-top:1.5rem}\n\
         .cards{display:flex;gap:1rem}.card{border:1px solid #8884;border-radius:6px;padding:.5rem 1rem}\n\
         .notice{color:#a60}\n",
    );
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&format!(
        "<h1>Agent activity · {}</h1>\n",
        escape_html(&data.snapshot.date)
    ));
    if let Some(notice) = &data.notice {
        html.push_str(&format!(
            "<p class=\"notice\">{}</p>\n",
            escape_html(notice)
        ));
    }

    html.push_str("<div class=\"cards\">\n");
    for (label, value) in [
        ("Messages", data.snapshot.messages),
        ("Sessions", data.snapshot.sessions),
        ("Tool calls", data.snapshot.tool_calls),
        ("Tokens", data.snapshot.total_tokens),
    ] {
        html.push_str(&format!(
            "<div class=\"card\"><strong>{value}</strong><br>{label}</div>\n"
        ));
    }
    html.push_str("</div>\n");

    if !data.model_usage.is_empty() {
        html.push_str("<h2>Model usage</h2>\n<table>\n");
        html.push_str("<tr><th>Model</th><th>Input tokens</th><th>Output tokens</th></tr>\n");
        for model in &data.model_usage {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&model.display_name),
                model.input_tokens,
                model.output_tokens
            ));
        }
        html.push_str("</table>\n");
    }

    html.push_str("<h2>Projects</h2>\n<table>\n");
    html.push_str("<tr><th>Project</th><th>Sessions</th><th>Messages</th></tr>\n");
    for project in &data.projects {
        html.push_str(&format!(
            "<tr><td title=\"{}\">{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&project.project_path.display().to_string()),
            escape_html(&project.name),
            project.sessions.len(),
            project.total_messages
        ));
    }
    html.push_str("</table>\n");

    if !history.is_empty() {
        html.push_str("<h2>Recent prompts</h2>\n<ul>\n");
        for entry in history {
            html.push_str(&format!("<li>{}</li>\n", escape_html(&entry.text)));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
