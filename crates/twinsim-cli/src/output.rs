//! Rendering of action results for the terminal.

use serde_json::{json, Value};
use twinsim_core::action::ActionKind;
use twinsim_core::normalize::ActionOutput;
use twinsim_core::platform::{CommandPlan, Platform};

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Lines printed to stdout for a successful action in text mode.
pub fn text_lines(output: &ActionOutput) -> Vec<String> {
    match output {
        ActionOutput::Text(s) if s.is_empty() => Vec::new(),
        ActionOutput::Text(s) => vec![s.clone()],
        ActionOutput::Bool(b) => vec![b.to_string()],
        ActionOutput::List(items) => items.clone(),
    }
}

pub fn result_json(kind: ActionKind, platform: Platform, output: &ActionOutput) -> Value {
    json!({
        "action": kind.name(),
        "platform": platform,
        "success": true,
        "result": output,
    })
}

pub fn plan_json(kind: ActionKind, platform: Platform, plan: &CommandPlan) -> Value {
    json!({
        "action": kind.name(),
        "platform": platform,
        "steps": plan.steps(),
        "command": plan.to_shell(),
    })
}

pub fn error_json(message: &str) -> Value {
    json!({
        "success": false,
        "error": message,
    })
}
