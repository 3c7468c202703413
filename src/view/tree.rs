use crate::domain::{
    ActivitySnapshot, ModelUsageSummary, ProjectSummary, SessionSummary, format_relative_time,
    system_time_to_unix_ms,
};

/// Host-agnostic tree node. The editor binding maps these 1:1 onto its own
/// tree item type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreeItem {
    pub label: String,
    pub description: Option<String>,
    pub tooltip: Option<String>,
    pub children: Vec<TreeItem>,
}

impl TreeItem {
    fn leaf(label: String, description: Option<String>, tooltip: Option<String>) -> Self {
        Self {
            label,
            description,
            tooltip,
            children: Vec::new(),
        }
    }
}

/// Projects with their sessions as children, in the order the aggregator
/// produced them (newest first).
pub fn project_tree_items(projects: &[ProjectSummary], now_ms: i64) -> Vec<TreeItem> {
    projects
        .iter()
        .map(|project| TreeItem {
            label: project.name.clone(),
            description: Some(format!(
                "{} session{} · {} message{}",
                project.sessions.len(),
                plural(project.sessions.len()),
                project.total_messages,
                plural(project.total_messages),
            )),
            tooltip: Some(project.project_path.display().to_string()),
            children: project
                .sessions
                .iter()
                .map(|session| session_tree_item(session, now_ms))
                .collect(),
        })
        .collect()
}

fn session_tree_item(session: &SessionSummary, now_ms: i64) -> TreeItem {
    let when = session
        .file_modified
        .and_then(system_time_to_unix_ms)
        .map(|then_ms| format_relative_time(then_ms, now_ms));

    let mut tooltip_parts = vec![format!("{} · {}", session.source.label(), session.meta.id)];
    if let Some(branch) = &session.git_branch {
        tooltip_parts.push(format!("branch: {branch}"));
    }
    if let Some(provider) = &session.provider {
        tooltip_parts.push(format!("via {provider}"));
    }

    TreeItem::leaf(
        session.title.clone(),
        when,
        Some(tooltip_parts.join("\n")),
    )
}

/// Flat summary nodes for the usage view: today's snapshot first, then one
/// node per model family.
pub fn usage_tree_items(
    snapshot: &ActivitySnapshot,
    models: &[ModelUsageSummary],
) -> Vec<TreeItem> {
    let mut items = vec![
        TreeItem::leaf(
            format!("Activity · {}", snapshot.date),
            Some(format!(
                "{} messages · {} sessions · {} tool calls",
                snapshot.messages, snapshot.sessions, snapshot.tool_calls
            )),
            Some(format!("{} tokens", snapshot.total_tokens)),
        ),
    ];

    for model in models {
        items.push(TreeItem::leaf(
            model.display_name.clone(),
            Some(format!(
                "{} in · {} out",
                model.input_tokens, model.output_tokens
            )),
            Some(format!("{} tokens total", model.total_tokens())),
        ));
    }

    items
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
