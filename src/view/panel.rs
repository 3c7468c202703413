use std::collections::BTreeMap;

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct PanelId(String);

impl PanelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One live dashboard panel, holding the last HTML rendered into it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DashboardPanel {
    pub html: String,
}

/// Panels keyed by identity, created on demand and dropped on close.
///
/// Repeated opens of the same id reuse the existing panel, so the host can
/// treat "open" as "reveal" without tracking a singleton of its own.
#[derive(Debug, Default)]
pub struct PanelRegistry {
    panels: BTreeMap<PanelId, DashboardPanel>,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_or_create(&mut self, id: PanelId) -> &mut DashboardPanel {
        self.panels.entry(id).or_default()
    }

    pub fn get(&self, id: &PanelId) -> Option<&DashboardPanel> {
        self.panels.get(id)
    }

    /// Returns true when the panel existed.
    pub fn close(&mut self, id: &PanelId) -> bool {
        self.panels.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}
