//! Report assembly.

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, Serializer};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use super::stages::{
    BranchExpansion, BranchRecord, ContradictionDiagnosis, KnowledgeRetrieval, ParadoxType,
    PremiseExtraction, StageResult,
};

/// Length of the hexadecimal report identifier.
pub const REPORT_ID_LEN: usize = 12;

/// The verbatim output of all four stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPhases {
    pub s1_knowledge_retrieval: StageResult,
    pub phase_1: StageResult,
    pub phase_2: StageResult,
    pub phase_3: StageResult,
}

/// Premise breakdown drawn from S1 and Phase I.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicalBreakdown {
    pub primary_goal: String,
    pub core_variables: Vec<String>,
    pub retrieved_internal_knowledge: Vec<String>,
    pub internal_knowledge_used: Vec<String>,
    pub knowledge_gaps: Vec<String>,
    pub hidden_assumptions: Vec<String>,
    pub reality_gaps: Vec<String>,
}

/// Phase III verdict.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParadoxDiagnosis {
    #[serde(rename = "type")]
    pub paradox_type: ParadoxType,
    pub reasoning: String,
    pub contradiction_path: Vec<String>,
}

/// Final result of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: String,
    pub logical_breakdown: LogicalBreakdown,
    pub stress_test_results: Vec<BranchRecord>,
    pub paradox_diagnosis: ParadoxDiagnosis,
    pub suggested_mitigation: Vec<String>,
    pub raw_phases: RawPhases,
}

impl Report {
    /// Assemble a report from the statement and the four raw stage results.
    pub fn build(statement: &str, raw_phases: RawPhases) -> Self {
        let report_id = report_id(statement, &raw_phases);

        let knowledge = KnowledgeRetrieval::from_raw(&raw_phases.s1_knowledge_retrieval);
        let premises = PremiseExtraction::from_raw(&raw_phases.phase_1);
        let expansion = BranchExpansion::from_raw(&raw_phases.phase_2);
        let diagnosis = ContradictionDiagnosis::from_raw(&raw_phases.phase_3);

        Self {
            report_id,
            logical_breakdown: LogicalBreakdown {
                primary_goal: premises.stated_goal,
                core_variables: premises.core_variables,
                retrieved_internal_knowledge: knowledge.internal_knowledge,
                internal_knowledge_used: premises.internal_knowledge_used,
                knowledge_gaps: knowledge.knowledge_gaps,
                hidden_assumptions: premises.hidden_assumptions,
                reality_gaps: premises.reality_gaps,
            },
            stress_test_results: expansion.branches,
            paradox_diagnosis: ParadoxDiagnosis {
                paradox_type: diagnosis.paradox_type,
                reasoning: diagnosis.reasoning,
                contradiction_path: diagnosis.contradiction_path,
            },
            suggested_mitigation: diagnosis.mitigation,
            raw_phases,
        }
    }
}

/// Deterministic identifier for a statement and its stage outputs.
///
/// SHA-256 over the key-sorted JSON of the five inputs, truncated to
/// [`REPORT_ID_LEN`] lowercase hex characters. The JSON text uses `", "` and
/// `": "` separators with non-ASCII characters left unescaped, so ids match
/// those produced by the earlier Python tooling for the same inputs.
pub fn report_id(statement: &str, raw_phases: &RawPhases) -> String {
    let source = json!({
        "user_input": statement,
        "s1_knowledge": raw_phases.s1_knowledge_retrieval,
        "phase_1": raw_phases.phase_1,
        "phase_2": raw_phases.phase_2,
        "phase_3": raw_phases.phase_3,
    });
    let sorted = sort_keys(&source);
    // Writing a Value to memory cannot fail.
    let canonical = canonical_json(&sorted).unwrap_or_else(|_| sorted.to_string().into_bytes());

    let digest = Sha256::digest(&canonical);
    let mut hex = format!("{:x}", digest);
    hex.truncate(REPORT_ID_LEN);
    hex
}

/// Single-line JSON with a space after every `,` and `:`.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn canonical_json(value: &Value) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, SpacedFormatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

/// Rebuild a value with every object's keys in sorted order.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(key, inner)| (key.clone(), sort_keys(inner)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
