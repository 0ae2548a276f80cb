//! Total coercion of untrusted producer output into the canonical shape.
//!
//! The vision model's reply is treated as an untyped document. Each field is
//! mapped through an explicit coercion rule; nothing here can fail, which
//! makes this the last line of defense before persistence.

use serde_json::Value;

use crate::models::diagnosis::{DiagnosisResult, Difficulty, PartItem, RepairStep, ToolItem};

/// Placeholder title when the producer supplied none.
const DEFAULT_ISSUE_TITLE: &str = "Unknown issue";

const DEFAULT_CONFIDENCE: i64 = 60;
const DEFAULT_ESTIMATED_MINUTES: i64 = 30;

/// Coerce raw producer output into a canonical `DiagnosisResult`.
pub fn normalize(raw: &Value) -> DiagnosisResult {
    DiagnosisResult {
        issue_title: string_or(raw.get("issueTitle"), DEFAULT_ISSUE_TITLE),
        confidence: clamped_int(raw.get("confidence"), DEFAULT_CONFIDENCE, 0, 100),
        difficulty: difficulty(raw.get("difficulty")),
        estimated_minutes: clamped_int(
            raw.get("estimatedMinutes"),
            DEFAULT_ESTIMATED_MINUTES,
            1,
            240,
        ),
        high_level_overview: string_seq(raw.get("highLevelOverview")),
        tools: seq(raw.get("tools"), tool_item),
        parts: seq(raw.get("parts"), part_item),
        steps: seq(raw.get("steps"), repair_step),
        safety_checklist: string_seq(raw.get("safetyChecklist")),
        common_mistakes: string_seq(raw.get("commonMistakes")),
        verify_before_buy: string_seq(raw.get("verifyBeforeBuy")),
    }
}

fn string_or(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Integers may arrive as floats or strings of digits; anything else falls
/// back to the default. The result is clamped into `[min, max]`.
fn clamped_int(value: Option<&Value>, default: i64, min: i64, max: i64) -> i32 {
    let parsed = value.and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_f64().map(|f| f.round() as i64))
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
    });
    parsed.unwrap_or(default).clamp(min, max) as i32
}

fn difficulty(value: Option<&Value>) -> Difficulty {
    value
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

fn string_seq(value: Option<&Value>) -> Vec<String> {
    match value.and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

fn seq<T>(value: Option<&Value>, coerce: impl Fn(&Value) -> T) -> Vec<T> {
    match value.and_then(Value::as_array) {
        Some(items) => items.iter().map(coerce).collect(),
        None => Vec::new(),
    }
}

fn tool_item(value: &Value) -> ToolItem {
    ToolItem {
        name: string_or(value.get("name"), ""),
        quantity: clamped_int(value.get("quantity"), 1, 1, 99),
        must_have: value
            .get("mustHave")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn part_item(value: &Value) -> PartItem {
    PartItem {
        name: string_or(value.get("name"), ""),
        variants: string_seq(value.get("variants")),
        notes: string_or(value.get("notes"), ""),
    }
}

fn repair_step(value: &Value) -> RepairStep {
    RepairStep {
        order: clamped_int(value.get("order"), 0, 0, 999),
        title: string_or(value.get("title"), ""),
        detail: string_or(value.get("detail"), ""),
    }
}
