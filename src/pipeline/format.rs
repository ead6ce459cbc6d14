//! Plain-text rendering of a [`Report`].

use super::normalize::NOT_AVAILABLE;
use super::report::Report;

/// Render a report as the fixed four-section text layout.
pub fn format_report(report: &Report) -> String {
    let mut lines: Vec<String> = vec![format!("REPORT ID: {}", or_na(&report.report_id))];

    let logical = &report.logical_breakdown;
    lines.push(String::new());
    lines.push("1. LOGICAL BREAKDOWN".to_string());
    lines.push(format!("- Primary Goal: {}", or_na(&logical.primary_goal)));
    lines.push(format!(
        "- Core Variables: {}",
        or_na(&logical.core_variables.join(", "))
    ));
    push_nested_list(
        &mut lines,
        "- Retrieved Internal Knowledge (S1):",
        &logical.retrieved_internal_knowledge,
    );
    push_nested_list(
        &mut lines,
        "- Internal Knowledge Used (Phase I):",
        &logical.internal_knowledge_used,
    );
    push_nested_list(&mut lines, "- Knowledge Gaps:", &logical.knowledge_gaps);
    push_nested_list(&mut lines, "- Hidden Assumptions:", &logical.hidden_assumptions);
    push_nested_list(&mut lines, "- Reality Gaps:", &logical.reality_gaps);

    lines.push(String::new());
    lines.push("2. STRESS TEST RESULTS (Phase II)".to_string());
    if report.stress_test_results.is_empty() {
        lines.push(format!("- {}", NOT_AVAILABLE));
    }
    for (idx, branch) in report.stress_test_results.iter().enumerate() {
        lines.push(format!("- Branch {}: {}", idx + 1, or_na(&branch.name)));
        lines.push(format!("  Result: {}", or_na(&branch.result)));
        lines.push(format!("  Goal Impact: {}", or_na(&branch.goal_impact)));
    }

    let diagnosis = &report.paradox_diagnosis;
    lines.push(String::new());
    lines.push("3. PARADOX DIAGNOSIS (Phase III)".to_string());
    lines.push(format!("- Type: {}", diagnosis.paradox_type));
    lines.push(format!("- Reasoning: {}", or_na(&diagnosis.reasoning)));
    push_nested_list(&mut lines, "- Contradiction Path:", &diagnosis.contradiction_path);

    lines.push(String::new());
    lines.push("4. SUGGESTED MITIGATION".to_string());
    if report.suggested_mitigation.is_empty() {
        lines.push(format!("- {}", NOT_AVAILABLE));
    }
    for item in &report.suggested_mitigation {
        lines.push(format!("- {}", item));
    }

    lines.join("\n")
}

fn or_na(text: &str) -> &str {
    if text.is_empty() {
        NOT_AVAILABLE
    } else {
        text
    }
}

fn push_nested_list(lines: &mut Vec<String>, heading: &str, items: &[String]) {
    lines.push(heading.to_string());
    if items.is_empty() {
        lines.push(format!("  - {}", NOT_AVAILABLE));
    }
    for item in items {
        lines.push(format!("  - {}", item));
    }
}
