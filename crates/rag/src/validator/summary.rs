//! Human-readable validation summaries.

use super::ValidationReport;

/// Confidence below this, or any warning, earns a summary block.
pub const SUMMARY_THRESHOLD: f64 = 0.8;

/// Confidence below this earns a warning banner.
pub const BANNER_THRESHOLD: f64 = 0.7;

pub const LOW_CONFIDENCE_BANNER: &str =
    "**⚠️ WARNING: This response has low confidence and may contain unverified information.**";

const SUMMARY_HEADING: &str = "--- Validation Summary ---";

fn push_section(summary: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    summary.push('\n');
    summary.push_str(heading);
    summary.push('\n');
    for item in items {
        summary.push_str("• ");
        summary.push_str(item);
        summary.push('\n');
    }
}

pub fn generate_validation_summary(report: &ValidationReport) -> String {
    let mut summary = format!("Confidence Score: {:.1}%\n", report.confidence_score * 100.0);
    push_section(&mut summary, "⚠️ Warnings:", &report.warnings);
    push_section(&mut summary, "❓ Unverified Claims:", &report.unverified_claims);
    push_section(&mut summary, "💡 Recommendations:", &report.recommendations);
    summary
}

/// Apply the validation outcome to the user-facing answer text.
pub fn augment_response(text: &str, report: &ValidationReport) -> String {
    let mut augmented = text.to_string();

    if !report.warnings.is_empty() || report.confidence_score < SUMMARY_THRESHOLD {
        augmented.push_str("\n\n");
        augmented.push_str(SUMMARY_HEADING);
        augmented.push('\n');
        augmented.push_str(&generate_validation_summary(report));

        if report.confidence_score < BANNER_THRESHOLD {
            augmented = format!("{}\n\n{}", LOW_CONFIDENCE_BANNER, augmented);
        }
    }

    augmented
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(confidence: f64, warnings: &[&str]) -> ValidationReport {
        ValidationReport {
            confidence_score: confidence,
            warnings: warnings.iter().map(|w| w.to_string()).collect(),
            ..ValidationReport::default()
        }
    }

    #[test]
    fn test_summary_sections() {
        let mut r = report(0.65, &["Low source coverage"]);
        r.recommendations.push("Cite more".to_string());

        assert_eq!(
            generate_validation_summary(&r),
            "Confidence Score: 65.0%\n\n⚠️ Warnings:\n• Low source coverage\n\n💡 Recommendations:\n• Cite more\n"
        );
    }

    #[test]
    fn test_clean_answer_is_untouched() {
        assert_eq!(augment_response("Answer.", &report(0.95, &[])), "Answer.");
    }

    #[test]
    fn test_summary_without_banner() {
        let text = augment_response("Answer.", &report(0.75, &[]));
        assert!(text.starts_with("Answer.\n\n--- Validation Summary ---\nConfidence Score: 75.0%"));
    }

    #[test]
    fn test_low_confidence_banner() {
        let text = augment_response("Answer.", &report(0.5, &["x"]));
        assert!(text.starts_with(LOW_CONFIDENCE_BANNER));
        assert!(text.contains("Answer.\n\n--- Validation Summary ---"));
    }
}
