use serde::{Deserialize, Serialize};

/// Options offered by the length selector. The backend maps each value to
/// its own min/max summary bounds; the client only sends the string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "short" => Some(SummaryLength::Short),
            "medium" => Some(SummaryLength::Medium),
            "long" => Some(SummaryLength::Long),
            _ => None,
        }
    }

    pub fn all() -> Vec<SummaryLength> {
        vec![SummaryLength::Short, SummaryLength::Medium, SummaryLength::Long]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SummaryLength::Short => "Short",
            SummaryLength::Medium => "Medium",
            SummaryLength::Long => "Long",
        }
    }

    /// Next option, wrapping around.
    pub fn next(&self) -> Self {
        match self {
            SummaryLength::Short => SummaryLength::Medium,
            SummaryLength::Medium => SummaryLength::Long,
            SummaryLength::Long => SummaryLength::Short,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            SummaryLength::Short => SummaryLength::Long,
            SummaryLength::Medium => SummaryLength::Short,
            SummaryLength::Long => SummaryLength::Medium,
        }
    }
}
