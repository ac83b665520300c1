use std::fmt;

/// Classified orchestration failure — tells the boundary *why* a turn failed
/// so it can pick the right user-facing text.
#[derive(Debug)]
pub enum AssistantError {
    /// Model server unreachable, slow, or failed its health probe.
    BackendUnavailable { message: String },
    /// Retry budget spent. Carries only the attempt count; the last
    /// underlying error is logged, not propagated.
    OperationExhausted { attempts: u32 },
    /// The model invoked a function that is not in the catalog.
    UnknownTool { name: String },
    /// The record store rejected a write.
    PersistenceFailure { message: String },
    /// Tool arguments failed schema validation — missing required field or
    /// a value outside its closed enumeration.
    ValidationGap { tool: String, message: String },
}

impl fmt::Display for AssistantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssistantError::BackendUnavailable { message } => {
                write!(f, "Model backend unavailable: {}", message)
            }
            AssistantError::OperationExhausted { attempts } => {
                write!(f, "Operation failed after {} attempts", attempts)
            }
            AssistantError::UnknownTool { name } => {
                write!(f, "Unknown function: {}", name)
            }
            AssistantError::PersistenceFailure { message } => {
                write!(f, "Record store write failed: {}", message)
            }
            AssistantError::ValidationGap { tool, message } => {
                write!(f, "Invalid arguments for {}: {}", tool, message)
            }
        }
    }
}

impl std::error::Error for AssistantError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_reports_attempt_count_only() {
        let err = AssistantError::OperationExhausted { attempts: 3 };
        assert_eq!(err.to_string(), "Operation failed after 3 attempts");
    }

    #[test]
    fn unknown_tool_names_the_function() {
        let err = AssistantError::UnknownTool {
            name: "transfer_funds".to_string(),
        };
        assert!(err.to_string().contains("transfer_funds"));
    }
}
