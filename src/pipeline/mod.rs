//! The four-stage paradox detection pipeline.
//!
//! Stages run strictly in order, each prompt embedding the JSON results of
//! the stages it depends on:
//!
//! ```text
//! S1 knowledge ──▶ Phase I premises ──▶ Phase II branches ──▶ Phase III diagnosis
//!                        │                                          ▲
//!                        └──────────────────────────────────────────┘
//! ```
//!
//! Any chat or extraction failure aborts the whole analysis; there is no
//! partial report and no stage is retried here.

mod extract;
mod format;
mod normalize;
mod report;
mod stages;

pub use extract::extract_json_object;
pub use format::format_report;
pub use normalize::{
    as_string_list, core_variables, knowledge_items, text_or_na, FieldShape, NOT_AVAILABLE,
};
pub use report::{report_id, LogicalBreakdown, ParadoxDiagnosis, RawPhases, Report, REPORT_ID_LEN};
pub use stages::{
    BranchExpansion, BranchRecord, ContradictionDiagnosis, KnowledgeRetrieval, ParadoxType,
    PremiseExtraction, Stage, StageResult,
};

use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::ModelConfig;
use crate::error::{AppError, AppResult};
use crate::llm::{ChatClient, ChatExchange, OpenAiCompatClient};
use crate::prompts::{
    phase_1_prompt, phase_2_prompt, phase_3_prompt, s1_knowledge_prompt, BASE_SYSTEM_PROMPT,
};

/// Language requested from the model when none is given.
pub const DEFAULT_OUTPUT_LANGUAGE: &str = "Chinese";

/// Runs the paradox pipeline against a chat client.
pub struct ParadoxDetector<C> {
    client: C,
    output_language: String,
}

impl ParadoxDetector<OpenAiCompatClient> {
    /// Build a detector backed by an HTTP client for `config`.
    pub fn from_config(config: ModelConfig, output_language: impl Into<String>) -> AppResult<Self> {
        config.validate()?;
        let client = OpenAiCompatClient::new(config)?;
        Ok(Self::new(client, output_language))
    }
}

impl<C: ChatClient> ParadoxDetector<C> {
    /// Create a detector over any chat client
    pub fn new(client: C, output_language: impl Into<String>) -> Self {
        Self {
            client,
            output_language: output_language.into(),
        }
    }

    /// The underlying chat client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Language the stage prompts ask for
    pub fn output_language(&self) -> &str {
        &self.output_language
    }

    /// Analyze a statement and build the report.
    pub async fn analyze(&self, statement: &str) -> AppResult<Report> {
        let statement = statement.trim();
        if statement.is_empty() {
            return Err(AppError::Validation {
                field: "statement".to_string(),
                reason: "Input statement cannot be empty".to_string(),
            });
        }

        let start = Instant::now();
        let lang = self.output_language.as_str();

        let s1_knowledge = self
            .run_stage(Stage::KnowledgeRetrieval, s1_knowledge_prompt(lang, statement))
            .await?;

        let phase_1 = self
            .run_stage(
                Stage::PremiseExtraction,
                phase_1_prompt(lang, &pretty_json(&s1_knowledge), statement),
            )
            .await?;

        let phase_2 = self
            .run_stage(
                Stage::BranchExpansion,
                phase_2_prompt(lang, &pretty_json(&phase_1), statement),
            )
            .await?;

        let phase_3 = self
            .run_stage(
                Stage::ContradictionDiagnosis,
                phase_3_prompt(
                    lang,
                    &pretty_json(&phase_1),
                    &pretty_json(&phase_2),
                    statement,
                ),
            )
            .await?;

        let report = Report::build(
            statement,
            RawPhases {
                s1_knowledge_retrieval: s1_knowledge,
                phase_1,
                phase_2,
                phase_3,
            },
        );

        info!(
            report_id = %report.report_id,
            paradox_type = %report.paradox_diagnosis.paradox_type,
            branches = report.stress_test_results.len(),
            latency_ms = start.elapsed().as_millis(),
            "Paradox analysis completed"
        );

        Ok(report)
    }

    /// Issue one stage prompt and extract its JSON result.
    async fn run_stage(&self, stage: Stage, prompt: String) -> AppResult<StageResult> {
        let start = Instant::now();
        debug!(stage = %stage, prompt_chars = prompt.len(), "Running stage");

        let exchange = ChatExchange::new(BASE_SYSTEM_PROMPT, prompt);
        let raw = self.client.chat(exchange).await.map_err(|e| {
            error!(stage = %stage, error = %e, "Stage chat call failed");
            AppError::from(e)
        })?;

        let result = extract_json_object(&raw).map_err(|e| {
            error!(stage = %stage, completion_chars = raw.len(), "Stage output had no JSON object");
            AppError::from(e)
        })?;

        info!(
            stage = %stage,
            keys = result.len(),
            latency_ms = start.elapsed().as_millis(),
            "Stage completed"
        );
        Ok(result)
    }
}

/// Pretty JSON for embedding a prior stage result in a prompt.
fn pretty_json(result: &StageResult) -> String {
    // A map of JSON values always serializes.
    serde_json::to_string_pretty(result).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ApiResult};
    use async_trait::async_trait;
    use mockall::{mock, predicate, Sequence};

    mock! {
        Chat {}

        #[async_trait]
        impl ChatClient for Chat {
            async fn chat(&self, exchange: ChatExchange) -> ApiResult<String>;
        }
    }

    fn stage_header(exchange: &ChatExchange, header: &str) -> bool {
        exchange.system_prompt == BASE_SYSTEM_PROMPT && exchange.user_prompt.starts_with(header)
    }

    #[tokio::test]
    async fn test_stages_run_in_order_with_prior_context() {
        let mut client = MockChat::new();
        let mut seq = Sequence::new();

        client
            .expect_chat()
            .with(predicate::function(|e: &ChatExchange| {
                stage_header(e, "S1:") && e.user_prompt.contains("Output language: English")
            }))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(r#"{"internal_knowledge": ["K-marker"]}"#.to_string()));
        client
            .expect_chat()
            .with(predicate::function(|e: &ChatExchange| {
                stage_header(e, "Phase I:") && e.user_prompt.contains("K-marker")
            }))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(r#"{"stated_goal": "G-marker"}"#.to_string()));
        client
            .expect_chat()
            .with(predicate::function(|e: &ChatExchange| {
                stage_header(e, "Phase II:")
                    && e.user_prompt.contains("G-marker")
                    && !e.user_prompt.contains("K-marker")
            }))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(r#"{"branches": [{"name": "B-marker"}]}"#.to_string()));
        client
            .expect_chat()
            .with(predicate::function(|e: &ChatExchange| {
                stage_header(e, "Phase III:")
                    && e.user_prompt.contains("G-marker")
                    && e.user_prompt.contains("B-marker")
            }))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(r#"{"paradox_type": "Veridical"}"#.to_string()));

        let detector = ParadoxDetector::new(client, "English");
        let report = detector.analyze("  A statement  ").await.unwrap();

        assert_eq!(report.paradox_diagnosis.paradox_type, ParadoxType::Veridical);
        assert_eq!(report.logical_breakdown.primary_goal, "G-marker");
        assert_eq!(report.stress_test_results.len(), 1);
    }

    #[tokio::test]
    async fn test_api_error_aborts_pipeline() {
        let mut client = MockChat::new();
        client
            .expect_chat()
            .times(1)
            .returning(|_| Ok(r#"{"internal_knowledge": []}"#.to_string()));
        client.expect_chat().times(1).returning(|_| {
            Err(ApiError::Status {
                provider: "mock".to_string(),
                status: 500,
                body: "boom".to_string(),
            })
        });

        let detector = ParadoxDetector::new(client, DEFAULT_OUTPUT_LANGUAGE);
        let err = detector.analyze("statement").await.unwrap_err();

        assert!(matches!(err, AppError::Api(ApiError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_parse_error_aborts_pipeline() {
        let mut client = MockChat::new();
        client
            .expect_chat()
            .times(1)
            .returning(|_| Ok("I cannot answer that.".to_string()));

        let detector = ParadoxDetector::new(client, DEFAULT_OUTPUT_LANGUAGE);
        let err = detector.analyze("statement").await.unwrap_err();

        match err {
            AppError::Parse(parse) => assert_eq!(parse.text, "I cannot answer that."),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_statement_makes_no_calls() {
        let mut client = MockChat::new();
        client.expect_chat().never();

        let detector = ParadoxDetector::new(client, DEFAULT_OUTPUT_LANGUAGE);
        let err = detector.analyze("   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_from_config_rejects_missing_key() {
        let config = ModelConfig::new("p", "m", "http://localhost", "");
        let result = ParadoxDetector::from_config(config, "English");
        assert!(matches!(result, Err(AppError::Config { .. })));
    }

    #[test]
    fn test_from_config_rejects_huge_timeout() {
        let yaml = "provider: p\nmodel: m\nbase_url: http://localhost\napi_key: k\ntimeout_seconds: 1e300\n";
        let config = ModelConfig::from_yaml_str(yaml, std::path::Path::new("huge.yaml")).unwrap();
        let result = ParadoxDetector::from_config(config, "English");
        assert!(matches!(result, Err(AppError::Config { .. })));
    }

    #[test]
    fn test_pretty_json_preserves_model_key_order() {
        let result: StageResult =
            serde_json::from_str(r#"{"zeta": 1, "alpha": 2}"#).unwrap();
        let text = pretty_json(&result);
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
    }
}
