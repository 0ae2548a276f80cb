use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Repair difficulty as presented to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Canonical diagnosis shape returned to the client (camelCase on the wire).
///
/// Every sequence field defaults to empty rather than null; the normalizer
/// guarantees `confidence` and `estimated_minutes` are in range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    pub issue_title: String,
    pub confidence: i32,
    pub difficulty: Difficulty,
    pub estimated_minutes: i32,
    pub high_level_overview: Vec<String>,
    pub tools: Vec<ToolItem>,
    pub parts: Vec<PartItem>,
    pub steps: Vec<RepairStep>,
    pub safety_checklist: Vec<String>,
    pub common_mistakes: Vec<String>,
    pub verify_before_buy: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolItem {
    pub name: String,
    pub quantity: i32,
    pub must_have: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartItem {
    pub name: String,
    pub variants: Vec<String>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairStep {
    pub order: i32,
    pub title: String,
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_exact_variants_only() {
        assert_eq!("Easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("easy".parse::<Difficulty>().is_err());
        assert!("Impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let tool = ToolItem {
            name: "Screwdriver".to_string(),
            quantity: 1,
            must_have: true,
        };
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["mustHave"], serde_json::json!(true));
        assert!(json.get("must_have").is_none());
    }
}
