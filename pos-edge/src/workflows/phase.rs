//! Workflow phases
//!
//! ```text
//! SelectingTarget → EnteringDetails → Submitting → Committed
//!                                              ╲→ Failed
//! ```
//!
//! Nothing is written before `Submitting`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    /// Picking the cart products, the invoice line or the damaged product
    SelectingTarget,
    /// Quantities, discount, reason, refund, reporter
    EnteringDetails,
    /// Writing the record, then moving stock
    Submitting,
    Committed,
    Failed,
}

impl WorkflowPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowPhase::SelectingTarget => "selecting_target",
            WorkflowPhase::EnteringDetails => "entering_details",
            WorkflowPhase::Submitting => "submitting",
            WorkflowPhase::Committed => "committed",
            WorkflowPhase::Failed => "failed",
        }
    }

    /// Whether reaching this phase can have written anything
    pub fn may_have_written(&self) -> bool {
        matches!(
            self,
            WorkflowPhase::Submitting | WorkflowPhase::Committed | WorkflowPhase::Failed
        )
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
