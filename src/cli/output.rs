//! Output formatting utilities for the CLI.

use serde::Serialize;

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Truncate a string to at most `max_len` characters, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// First eight characters of an id, as shown in tables.
pub fn short_id(id: &uuid::Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

/// Generic success message for mutating commands.
#[derive(Debug, Serialize)]
pub struct ActionOutput {
    pub success: bool,
    pub message: String,
}

impl ActionOutput {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

impl CommandOutput for ActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Store", 10), "Store");
        assert_eq!(truncate("Inventory night", 10), "Invento...");
        assert_eq!(truncate("Café crème brûlée", 8), "Café ...");
    }

    #[test]
    fn test_short_id() {
        let id = uuid::Uuid::parse_str("0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0").unwrap();
        assert_eq!(short_id(&id), "0f1e2d3c");
    }

    #[test]
    fn test_action_output_json() {
        let out = ActionOutput::ok("Shift deleted");
        assert_eq!(out.to_json()["success"], serde_json::json!(true));
        assert_eq!(out.to_human(), "Shift deleted");
    }
}
