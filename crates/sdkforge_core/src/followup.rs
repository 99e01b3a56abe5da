use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowUpKind {
    Preview,
    Generate,
    Export,
}

impl FollowUpKind {
    /// Preview and generate are presented together and share one in-flight slot.
    fn shares_codegen_slot(self) -> bool {
        matches!(self, FollowUpKind::Preview | FollowUpKind::Generate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            other => Err(format!("unsupported export format {other:?}")),
        }
    }
}

/// In-flight flags serialising follow-up operations against themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FollowUpGate {
    codegen_in_flight: bool,
    export_in_flight: bool,
}

impl FollowUpGate {
    /// Claims the slot for `kind`. Returns false when it is already taken.
    pub fn try_acquire(&mut self, kind: FollowUpKind) -> bool {
        let slot = self.slot_mut(kind);
        if *slot {
            return false;
        }
        *slot = true;
        true
    }

    pub fn release(&mut self, kind: FollowUpKind) {
        *self.slot_mut(kind) = false;
    }

    pub fn is_busy(&self, kind: FollowUpKind) -> bool {
        if kind.shares_codegen_slot() {
            self.codegen_in_flight
        } else {
            self.export_in_flight
        }
    }

    fn slot_mut(&mut self, kind: FollowUpKind) -> &mut bool {
        if kind.shares_codegen_slot() {
            &mut self.codegen_in_flight
        } else {
            &mut self.export_in_flight
        }
    }
}
