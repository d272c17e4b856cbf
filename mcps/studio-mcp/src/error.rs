//! Conversion of orchestrator errors into MCP errors

use rmcp::ErrorData as McpError;
use studio_orchestrator::OrchestratorError;

/// Trait for converting errors into MCP-compatible errors
pub trait IntoMcpError {
    fn into_mcp_error(self) -> McpError;
}

/// Bad workflow types, unknown agents and missing fields are the caller's
/// fault; provider failures are ours.
impl IntoMcpError for OrchestratorError {
    fn into_mcp_error(self) -> McpError {
        if self.is_caller_error() {
            McpError::invalid_params(self.to_string(), None)
        } else {
            McpError::internal_error(self.to_string(), None)
        }
    }
}

impl IntoMcpError for serde_json::Error {
    fn into_mcp_error(self) -> McpError {
        McpError::internal_error(format!("JSON error: {}", self), None)
    }
}

/// Extension trait giving any convertible `Result` a `to_mcp_err()`
pub trait ResultExt<T> {
    fn to_mcp_err(self) -> Result<T, McpError>;
}

impl<T, E: IntoMcpError> ResultExt<T> for Result<T, E> {
    fn to_mcp_err(self) -> Result<T, McpError> {
        self.map_err(|e| e.into_mcp_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;
    use studio_orchestrator::ProviderError;

    #[test]
    fn test_caller_errors_are_invalid_params() {
        let err = OrchestratorError::UnknownAgent("wizard".to_string()).into_mcp_error();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, "Unknown agent: wizard");

        let err = OrchestratorError::missing_field("ux_ui", "platform").into_mcp_error();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn test_provider_failures_are_internal() {
        let err = OrchestratorError::AgentExecutionFailed {
            agent: "narrative".to_string(),
            model: "claude-haiku".to_string(),
            source: ProviderError::unavailable("claude-haiku"),
        }
        .into_mcp_error();
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert!(err.message.contains("Model claude-haiku not available"));
    }
}
