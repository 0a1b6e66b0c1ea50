//! Root configuration.

/// Follow-up passes allowed in a row before the root gives up.
pub const DEFAULT_NESTED_UPDATE_LIMIT: usize = 50;

/// Options for [`create_root_with_options`](super::create_root_with_options).
///
/// ```ignore
/// let options = RootOptions::default()
///     .with_label("sidebar")
///     .with_nested_update_limit(10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootOptions {
    /// Maximum follow-up passes triggered by updates dispatched during a pass.
    pub nested_update_limit: usize,
    /// Name shown in log lines, to tell roots apart.
    pub label: Option<String>,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            nested_update_limit: DEFAULT_NESTED_UPDATE_LIMIT,
            label: None,
        }
    }
}

impl RootOptions {
    pub fn with_nested_update_limit(mut self, limit: usize) -> Self {
        self.nested_update_limit = limit;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label for log lines.
    pub(crate) fn log_label(&self) -> &str {
        self.label.as_deref().unwrap_or("root")
    }
}
