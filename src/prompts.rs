//! Centralized prompt definitions for the paradox pipeline
//!
//! Each stage prompt is a fixed instruction block (with the exact JSON schema
//! the stage must return) followed by the output language, the prior stage
//! results the stage conditions on, and the user's statement.

/// System prompt shared by all four stages.
pub const BASE_SYSTEM_PROMPT: &str = r#"You are "Paradox Machine", a strict logic referee.
Rules:
1) Be objective and adversarial toward weak assumptions.
2) Do not default to being polite or agreeable.
3) Return valid JSON only. No markdown fences.
4) Keep outputs concise and technically rigorous."#;

/// Stage S1: internal knowledge retrieval.
pub const S1_KNOWLEDGE_INSTRUCTIONS: &str = r#"S1: Internal Knowledge Retrieval.

Task:
- Retrieve domain knowledge from your internal knowledge base that is relevant to the user's statement.
- Focus on mechanisms, constraints, and known trade-offs that can affect validity.
- Keep each item atomic so later stages can cite it.

Return this exact JSON schema:
{
  "internal_knowledge": [
    {
      "item": "string",
      "relevance": "string",
      "confidence": "high | medium | low"
    }
  ],
  "knowledge_gaps": ["string"]
}"#;

/// Phase I: premise extraction and axiomatization.
pub const PHASE_1_INSTRUCTIONS: &str = r#"Phase I: Premise Extraction & Axiomatization.

Task:
- Read the S1 internal knowledge retrieval below and treat it as trusted context.
- Read the user's statement.
- Identify the explicit goal.
- Identify the core variables.
- Identify the hidden assumptions required for success.
- Identify reality gaps between the statement and known system behavior.
- List which S1 knowledge items you used.

Return this exact JSON schema:
{
  "stated_goal": "string",
  "core_variables": ["string"],
  "internal_knowledge_used": ["string"],
  "hidden_assumptions": ["string"],
  "reality_gaps": ["string"]
}"#;

/// Phase II: constrained branch expansion.
pub const PHASE_2_INSTRUCTIONS: &str = r#"Phase II: Multi-Dimensional Expansion (constrained Tree of Thoughts).

Task:
- Infer several distinct outcomes caused by the premise.
- Keep each branch logically independent.
- Focus on consequences and their impact on the stated goal.
- Every branch must include both `result` and `goal_impact`.

Return this exact JSON schema:
{
  "branches": [
    {
      "name": "string",
      "result": "string",
      "goal_impact": "string"
    }
  ]
}"#;

/// Phase III: contradiction catching and mitigation.
pub const PHASE_3_INSTRUCTIONS: &str = r#"Phase III: Contradiction Catching & Mitigation.

Classify the paradox type:
- Antinomy: pursuing goal X destroys goal X (self-contradiction).
- Falsidical: looks valid but rests on a false hidden assumption.
- Veridical: counterintuitive but technically valid trade-off.
- None: no paradox detected in the tested branches.

Return this exact JSON schema:
{
  "paradox_type": "Antinomy | Falsidical | Veridical | None",
  "reasoning": "string",
  "contradiction_path": ["string"],
  "mitigation": ["string"]
}"#;

/// Render the S1 knowledge-retrieval prompt.
pub fn s1_knowledge_prompt(output_language: &str, statement: &str) -> String {
    format!(
        "{S1_KNOWLEDGE_INSTRUCTIONS}\n\nOutput language: {output_language}\n\nUser statement:\n{statement}"
    )
}

/// Render the Phase I prompt from the S1 result.
pub fn phase_1_prompt(output_language: &str, s1_knowledge_json: &str, statement: &str) -> String {
    format!(
        "{PHASE_1_INSTRUCTIONS}\n\nOutput language: {output_language}\n\nS1 internal knowledge retrieval:\n{s1_knowledge_json}\n\nUser statement:\n{statement}"
    )
}

/// Render the Phase II prompt from the Phase I result.
pub fn phase_2_prompt(output_language: &str, phase_1_json: &str, statement: &str) -> String {
    format!(
        "{PHASE_2_INSTRUCTIONS}\n\nOutput language: {output_language}\n\nPhase I result:\n{phase_1_json}\n\nUser statement:\n{statement}"
    )
}

/// Render the Phase III prompt from the Phase I and Phase II results.
pub fn phase_3_prompt(
    output_language: &str,
    phase_1_json: &str,
    phase_2_json: &str,
    statement: &str,
) -> String {
    format!(
        "{PHASE_3_INSTRUCTIONS}\n\nOutput language: {output_language}\n\nPhase I result:\n{phase_1_json}\n\nPhase II result:\n{phase_2_json}\n\nUser statement:\n{statement}"
    )
}

/// Default system prompt for direct question answering.
pub fn direct_answer_system_prompt(output_language: &str) -> String {
    format!(
        "You are a general assistant. Respond directly, clearly, and rigorously in {output_language}."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_demands_json() {
        assert!(BASE_SYSTEM_PROMPT.contains("valid JSON only"));
    }

    #[test]
    fn test_s1_prompt_embeds_language_and_statement() {
        let prompt = s1_knowledge_prompt("English", "Cut costs by hiring more");
        assert!(prompt.starts_with("S1: Internal Knowledge Retrieval."));
        assert!(prompt.contains("\"internal_knowledge\""));
        assert!(prompt.contains("Output language: English"));
        assert!(prompt.ends_with("User statement:\nCut costs by hiring more"));
    }

    #[test]
    fn test_phase_prompts_embed_prior_results() {
        let p1 = phase_1_prompt("English", "{\"knowledge_gaps\": []}", "s");
        assert!(p1.contains("S1 internal knowledge retrieval:\n{\"knowledge_gaps\": []}"));

        let p2 = phase_2_prompt("English", "{\"stated_goal\": \"g\"}", "s");
        assert!(p2.contains("Phase I result:\n{\"stated_goal\": \"g\"}"));
        assert!(p2.contains("\"goal_impact\""));

        let p3 = phase_3_prompt("English", "{\"p1\": 1}", "{\"p2\": 2}", "s");
        assert!(p3.contains("Phase I result:\n{\"p1\": 1}"));
        assert!(p3.contains("Phase II result:\n{\"p2\": 2}"));
        assert!(p3.contains("Antinomy | Falsidical | Veridical | None"));
    }

    #[test]
    fn test_braces_in_statement_are_kept_verbatim() {
        let prompt = s1_knowledge_prompt("English", "{output_language} {x}");
        assert!(prompt.ends_with("{output_language} {x}"));
    }

    #[test]
    fn test_direct_answer_prompt() {
        assert!(direct_answer_system_prompt("Chinese").ends_with("in Chinese."));
    }
}
