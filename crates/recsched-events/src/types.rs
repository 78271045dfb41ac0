use serde::{Deserialize, Serialize};

/// Opaque event identifier, chosen by the caller and unique within a store.
pub type Tag = String;

/// How an event's schedule evolves after its stop time passes.
///
/// Labels are the exact strings the persisted format carries. Unrecognized
/// labels are preserved verbatim as [`RepeatRule::Other`] so a newer file is
/// never mangled by an older reader; they simply never roll over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RepeatRule {
    /// Fire once, then the event is removed.
    Once,
    /// Shift forward one day after each occurrence.
    Daily,
    /// Shift forward seven days after each occurrence.
    Weekly,
    /// Labelled as weekdays-only but shifts one day exactly like `Daily`;
    /// the original recorder never skipped weekends. Preserved as-is.
    MondayFriday,
    /// Marked for removal; the next rollover pass deletes it.
    Delete,
    /// Already recorded. Kept for display, never shifts, never self-removes.
    Deleted,
    /// Unrecognized label, preserved verbatim.
    Other(String),
}

impl RepeatRule {
    pub fn label(&self) -> &str {
        match self {
            RepeatRule::Once => "Once",
            RepeatRule::Daily => "Daily",
            RepeatRule::Weekly => "Weekly",
            RepeatRule::MondayFriday => "Monday-Friday",
            RepeatRule::Delete => "Delete",
            RepeatRule::Deleted => "Deleted",
            RepeatRule::Other(label) => label,
        }
    }
}

impl Default for RepeatRule {
    fn default() -> Self {
        RepeatRule::Once
    }
}

impl std::fmt::Display for RepeatRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for RepeatRule {
    type Err = std::convert::Infallible;

    /// Never fails: the empty string defaults to `Once`, anything
    /// unrecognized becomes `Other`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "" | "Once" => RepeatRule::Once,
            "Daily" => RepeatRule::Daily,
            "Weekly" => RepeatRule::Weekly,
            "Monday-Friday" => RepeatRule::MondayFriday,
            "Delete" => RepeatRule::Delete,
            "Deleted" => RepeatRule::Deleted,
            other => RepeatRule::Other(other.to_string()),
        })
    }
}

impl From<String> for RepeatRule {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl From<RepeatRule> for String {
    fn from(rule: RepeatRule) -> Self {
        rule.label().to_string()
    }
}

/// One scheduled recording.
///
/// `start`/`stop` are instants on the offset-normalized timeline (see
/// `recsched_core::wallclock`); either may be unset for a half-filled entry.
/// `start <= stop` is expected but not enforced — the store never validates
/// what the collaborator supplies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub channel: Option<String>,
    pub title: Option<String>,
    pub start: Option<i64>,
    pub stop: Option<i64>,
    #[serde(default)]
    pub repeat: RepeatRule,
}
