//! Runtime configuration.

/// Prefix marking a prop as an event listener (`onclick` listens to `click`).
pub const DEFAULT_EVENT_PREFIX: &str = "on";

/// Default bound on nested setter-triggered cycles.
pub const DEFAULT_MAX_UPDATE_DEPTH: usize = 50;

// ---------------------------------------------------------------------------
// RuntimeConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Runtime`](crate::Runtime).
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Props whose name starts with this prefix are installed as listeners.
    pub event_prefix: String,
    /// How deep setters called from effects may nest before the cycle fails.
    pub max_update_depth: usize,
    /// Keep a copy of every committed mutation list.
    pub journal: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_prefix: DEFAULT_EVENT_PREFIX.to_owned(),
            max_update_depth: DEFAULT_MAX_UPDATE_DEPTH,
            journal: false,
        }
    }
}

impl RuntimeConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listener prefix (builder).
    pub fn with_event_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.event_prefix = prefix.into();
        self
    }

    /// Set the nesting limit (builder).
    pub fn with_max_update_depth(mut self, depth: usize) -> Self {
        self.max_update_depth = depth;
        self
    }

    /// Enable or disable the mutation journal (builder).
    pub fn with_journal(mut self, journal: bool) -> Self {
        self.journal = journal;
        self
    }

    /// Whether a prop name denotes a listener: the prefix followed by at
    /// least one character.
    pub fn is_listener(&self, name: &str) -> bool {
        name.len() > self.event_prefix.len() && name.starts_with(self.event_prefix.as_str())
    }

    /// Event name for a listener prop, lowercased: `onClick` -> `click`.
    pub fn event_name(&self, prop: &str) -> String {
        prop.strip_prefix(self.event_prefix.as_str())
            .unwrap_or(prop)
            .to_ascii_lowercase()
    }
}
