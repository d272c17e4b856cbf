//! Task descriptions, workflow context and agent requests

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::OrchestratorError;
use crate::llm::ThinkingMode;

/// One unit of work supplied by the caller
///
/// The common fields are typed. Anything else an agent needs (`theme`,
/// `player_data`, `assets`, ...) lands in `extra` and is validated when the
/// agent builds its prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaskSpec {
    /// Task type, used to pick steps in named workflows
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,

    /// Step name in custom workflows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Agent key in custom workflows (falls back to the task type)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,

    /// Model override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Thinking override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_mode: Option<ThinkingMode>,

    /// Conversation thread to continue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_id: Option<String>,

    /// Agent-specific fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskSpec {
    pub fn of_type(task_type: impl Into<String>) -> Self {
        Self {
            task_type: Some(task_type.into()),
            ..Default::default()
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_type(&self, task_type: &str) -> bool {
        self.task_type.as_deref() == Some(task_type)
    }
}

/// Read-only key/value data shared by every step of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct WorkflowContext(Map<String, Value>);

impl WorkflowContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for WorkflowContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Arguments handed to an agent for one execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentRequest {
    pub args: Map<String, Value>,
    pub model: Option<String>,
    pub thinking_mode: Option<ThinkingMode>,
    pub continuation_id: Option<String>,
}

impl AgentRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a task into an argument map
    pub fn from_task(task: &TaskSpec) -> Self {
        let mut args = task.extra.clone();
        if let Some(prompt) = &task.prompt {
            args.insert("prompt".to_string(), Value::String(prompt.clone()));
        }
        if !task.files.is_empty() {
            args.insert(
                "files".to_string(),
                Value::Array(task.files.iter().cloned().map(Value::String).collect()),
            );
        }

        Self {
            args,
            model: task.model.clone(),
            thinking_mode: task.thinking_mode,
            continuation_id: task.continuation_id.clone(),
        }
    }

    /// Set an argument, replacing any existing value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_thinking(mut self, thinking_mode: ThinkingMode) -> Self {
        self.thinking_mode = Some(thinking_mode);
        self
    }

    pub fn with_continuation(mut self, thread_id: impl Into<String>) -> Self {
        self.continuation_id = Some(thread_id.into());
        self
    }

    /// Whether the argument is present and not null
    pub fn has(&self, key: &str) -> bool {
        self.args.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.args.get(key).filter(|v| !v.is_null())
    }

    /// A required textual argument; non-string values are rendered as JSON
    pub fn require_str(&self, agent: &str, key: &str) -> Result<String, OrchestratorError> {
        self.get(key)
            .map(value_text)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| OrchestratorError::missing_field(agent, key))
    }

    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .map(value_text)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn u64_or(&self, key: &str, default: u64) -> u64 {
        match self.get(key) {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// A list argument; a single string counts as a one-element list
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().map(value_text).collect(),
            Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// A structured argument rendered as pretty JSON, or `default`
    pub fn json_or(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
            None => default.to_string(),
        }
    }

    /// A required structured argument rendered as pretty JSON
    pub fn require_json(&self, agent: &str, key: &str) -> Result<String, OrchestratorError> {
        if !self.has(key) {
            return Err(OrchestratorError::missing_field(agent, key));
        }
        Ok(self.json_or(key, ""))
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_spec_deserialize() {
        let task: TaskSpec = serde_json::from_value(json!({
            "type": "implementation",
            "prompt": "Build the save system",
            "files": ["src/save.rs"],
            "thinking_mode": "high",
            "theme": "haunted"
        }))
        .unwrap();

        assert!(task.is_type("implementation"));
        assert_eq!(task.files, vec!["src/save.rs"]);
        assert_eq!(task.thinking_mode, Some(ThinkingMode::High));
        assert_eq!(task.extra.get("theme"), Some(&json!("haunted")));
    }

    #[test]
    fn test_request_accessors() {
        let task = TaskSpec::of_type("procedural_puzzle")
            .with_prompt("A lock")
            .with_field("variations", 5)
            .with_field("metrics", json!({"deaths": 3}));
        let request = AgentRequest::from_task(&task).with("difficulty", "hard");

        assert_eq!(request.require_str("procedural_puzzle", "prompt").unwrap(), "A lock");
        assert_eq!(request.str_or("theme", "horror"), "horror");
        assert_eq!(request.str_or("difficulty", "medium"), "hard");
        assert_eq!(request.u64_or("variations", 3), 5);
        assert!(request.json_or("metrics", "{}").contains("\"deaths\": 3"));
        assert_eq!(request.json_or("requirements", "{}"), "{}");
        assert!(request.string_list("files").is_empty());
    }

    #[test]
    fn test_require_str_rejects_missing_and_blank() {
        let request = AgentRequest::new().with("prompt", "  ");
        let err = request.require_str("content", "prompt").unwrap_err();
        assert_eq!(err.to_string(), "Missing required field 'prompt' for agent content");

        let request = AgentRequest::new().with("prompt", Value::Null);
        assert!(request.require_str("content", "prompt").is_err());
        assert!(request.require_json("content", "prompt").is_err());
    }
}
