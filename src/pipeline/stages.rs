//! Typed views over the four raw stage results.
//!
//! Each record is built leniently from its raw mapping: absent or oddly
//! shaped fields fall back to empty values instead of failing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::normalize::{as_string_list, core_variables, field_text, knowledge_items, text_or_na};

/// Raw JSON object recovered from one model completion.
pub type StageResult = Map<String, Value>;

/// The four pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// S1: internal knowledge retrieval.
    KnowledgeRetrieval,
    /// Phase I: premise extraction.
    PremiseExtraction,
    /// Phase II: branch expansion.
    BranchExpansion,
    /// Phase III: contradiction diagnosis.
    ContradictionDiagnosis,
}

impl Stage {
    /// All stages in the order they run.
    pub const ALL: [Stage; 4] = [
        Stage::KnowledgeRetrieval,
        Stage::PremiseExtraction,
        Stage::BranchExpansion,
        Stage::ContradictionDiagnosis,
    ];

    /// Key used for this stage under `raw_phases`
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::KnowledgeRetrieval => "s1_knowledge_retrieval",
            Stage::PremiseExtraction => "phase_1",
            Stage::BranchExpansion => "phase_2",
            Stage::ContradictionDiagnosis => "phase_3",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// S1 result: retrieved knowledge and admitted gaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeRetrieval {
    pub internal_knowledge: Vec<String>,
    pub knowledge_gaps: Vec<String>,
}

impl KnowledgeRetrieval {
    pub fn from_raw(raw: &StageResult) -> Self {
        Self {
            internal_knowledge: knowledge_items(raw.get("internal_knowledge")),
            knowledge_gaps: as_string_list(raw.get("knowledge_gaps")),
        }
    }
}

/// Phase I result: the premise broken into goal, variables and assumptions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PremiseExtraction {
    pub stated_goal: String,
    pub core_variables: Vec<String>,
    pub internal_knowledge_used: Vec<String>,
    pub hidden_assumptions: Vec<String>,
    pub reality_gaps: Vec<String>,
}

impl PremiseExtraction {
    pub fn from_raw(raw: &StageResult) -> Self {
        Self {
            stated_goal: field_text(raw.get("stated_goal")),
            core_variables: core_variables(raw.get("core_variables"), raw.get("variables")),
            internal_knowledge_used: as_string_list(raw.get("internal_knowledge_used")),
            hidden_assumptions: as_string_list(raw.get("hidden_assumptions")),
            reality_gaps: as_string_list(raw.get("reality_gaps")),
        }
    }
}

/// One hypothesized outcome and its effect on the stated goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
    pub name: String,
    pub result: String,
    pub goal_impact: String,
}

/// Phase II result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchExpansion {
    pub branches: Vec<BranchRecord>,
}

impl BranchExpansion {
    /// Non-object entries in `branches` are skipped.
    pub fn from_raw(raw: &StageResult) -> Self {
        let branches = match raw.get("branches") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_object)
                .map(|branch| BranchRecord {
                    name: text_or_na(branch.get("name")),
                    result: text_or_na(branch.get("result")),
                    goal_impact: text_or_na(branch.get("goal_impact")),
                })
                .collect(),
            _ => Vec::new(),
        };
        Self { branches }
    }
}

/// Classification of a detected contradiction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ParadoxType {
    /// The goal, pursued as stated, negates itself.
    Antinomy,
    /// Valid-looking, but rests on a false assumption.
    Falsidical,
    /// Valid but counterintuitive trade-off.
    Veridical,
    #[default]
    None,
    /// A label outside the protocol, kept as the model wrote it.
    Unrecognized(String),
}

impl ParadoxType {
    /// Parse a model-supplied label. Known labels match case-insensitively;
    /// blank input means [`ParadoxType::None`].
    pub fn parse(raw: &str) -> Self {
        let label = raw.trim();
        match label.to_ascii_lowercase().as_str() {
            "" | "none" => ParadoxType::None,
            "antinomy" => ParadoxType::Antinomy,
            "falsidical" => ParadoxType::Falsidical,
            "veridical" => ParadoxType::Veridical,
            _ => ParadoxType::Unrecognized(label.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ParadoxType::Antinomy => "Antinomy",
            ParadoxType::Falsidical => "Falsidical",
            ParadoxType::Veridical => "Veridical",
            ParadoxType::None => "None",
            ParadoxType::Unrecognized(label) => label,
        }
    }
}

impl fmt::Display for ParadoxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ParadoxType {
    fn from(value: String) -> Self {
        ParadoxType::parse(&value)
    }
}

impl From<ParadoxType> for String {
    fn from(value: ParadoxType) -> Self {
        value.as_str().to_string()
    }
}

/// Phase III result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContradictionDiagnosis {
    pub paradox_type: ParadoxType,
    pub reasoning: String,
    pub contradiction_path: Vec<String>,
    pub mitigation: Vec<String>,
}

impl ContradictionDiagnosis {
    pub fn from_raw(raw: &StageResult) -> Self {
        Self {
            paradox_type: ParadoxType::parse(&field_text(raw.get("paradox_type"))),
            reasoning: field_text(raw.get("reasoning")),
            contradiction_path: as_string_list(raw.get("contradiction_path")),
            mitigation: as_string_list(raw.get("mitigation")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(value: Value) -> StageResult {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_stage_order_and_keys() {
        let keys: Vec<&str> = Stage::ALL.iter().map(Stage::as_str).collect();
        assert_eq!(
            keys,
            vec!["s1_knowledge_retrieval", "phase_1", "phase_2", "phase_3"]
        );
        assert_eq!(Stage::BranchExpansion.to_string(), "phase_2");
    }

    #[test]
    fn test_knowledge_retrieval_defaults() {
        let record = KnowledgeRetrieval::from_raw(&StageResult::new());
        assert_eq!(record, KnowledgeRetrieval::default());
    }

    #[test]
    fn test_premise_extraction_from_raw() {
        let record = PremiseExtraction::from_raw(&raw(json!({
            "stated_goal": "  full employment ",
            "variables": {"labor": ["jobs"], "tech": ["automation"]},
            "hidden_assumptions": "Displaced workers are absorbed elsewhere",
            "extra": "ignored"
        })));
        assert_eq!(record.stated_goal, "full employment");
        assert_eq!(record.core_variables, vec!["jobs", "automation"]);
        assert_eq!(
            record.hidden_assumptions,
            vec!["Displaced workers are absorbed elsewhere"]
        );
        assert!(record.reality_gaps.is_empty());
    }

    #[test]
    fn test_branch_expansion_skips_non_objects() {
        let record = BranchExpansion::from_raw(&raw(json!({
            "branches": [
                "stray text",
                {"name": "Mass layoffs", "result": "Unemployment spikes"},
                42
            ]
        })));
        assert_eq!(
            record.branches,
            vec![BranchRecord {
                name: "Mass layoffs".to_string(),
                result: "Unemployment spikes".to_string(),
                goal_impact: "N/A".to_string(),
            }]
        );
    }

    #[test]
    fn test_branch_expansion_non_list() {
        let record = BranchExpansion::from_raw(&raw(json!({"branches": {"name": "x"}})));
        assert!(record.branches.is_empty());
    }

    #[test]
    fn test_paradox_type_parse() {
        assert_eq!(ParadoxType::parse("Antinomy"), ParadoxType::Antinomy);
        assert_eq!(ParadoxType::parse(" veridical "), ParadoxType::Veridical);
        assert_eq!(ParadoxType::parse("FALSIDICAL"), ParadoxType::Falsidical);
        assert_eq!(ParadoxType::parse(""), ParadoxType::None);
        assert_eq!(
            ParadoxType::parse("Sorites"),
            ParadoxType::Unrecognized("Sorites".to_string())
        );
        assert_eq!(ParadoxType::parse("Sorites").to_string(), "Sorites");
    }

    #[test]
    fn test_paradox_type_serializes_as_string() {
        assert_eq!(
            serde_json::to_value(ParadoxType::Antinomy).unwrap(),
            json!("Antinomy")
        );
        let parsed: ParadoxType = serde_json::from_value(json!("none")).unwrap();
        assert_eq!(parsed, ParadoxType::None);
    }

    #[test]
    fn test_contradiction_diagnosis_defaults_type_to_none() {
        let record = ContradictionDiagnosis::from_raw(&raw(json!({
            "reasoning": " circular ",
            "mitigation": ["Phase automation in gradually"]
        })));
        assert_eq!(record.paradox_type, ParadoxType::None);
        assert_eq!(record.reasoning, "circular");
        assert_eq!(record.mitigation, vec!["Phase automation in gradually"]);

        let record =
            ContradictionDiagnosis::from_raw(&raw(json!({"paradox_type": null})));
        assert_eq!(record.paradox_type, ParadoxType::None);
    }
}
