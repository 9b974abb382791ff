use crate::ir::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("block `{from}` jumps to label `{label}` which does not exist")]
    UnresolvedLabel { from: String, label: String },

    #[error("graph has no root node")]
    MissingRoot,

    #[error("node {0} is not part of the graph")]
    UnknownNode(NodeId),

    #[error("malformed instruction `{instr}`: {reason}")]
    MalformedInstruction { instr: String, reason: String },

    #[error("invalid bril json: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn unresolved_label(from: &str, label: &str) -> Self {
        Self::UnresolvedLabel {
            from: from.to_string(),
            label: label.to_string(),
        }
    }

    pub fn malformed(instr: impl ToString, reason: impl Into<String>) -> Self {
        Self::MalformedInstruction {
            instr: instr.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by a control flow graph that cannot be built or walked.
    pub fn is_malformed_graph(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedLabel { .. } | Self::MissingRoot | Self::UnknownNode(_)
        )
    }
}
