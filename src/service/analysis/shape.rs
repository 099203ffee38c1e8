//! Response shaping for raw model output
//!
//! Both shapes always yield well-formed JSON regardless of what the model
//! actually produced: the grounded shape wraps raw text unconditionally, and
//! the legacy JSON shape degrades to a loose envelope on parse failure
//! instead of failing the request.

use chrono::Utc;
use serde_json::{json, Value};

use crate::model::{AnalysisMetadata, AnalysisRequest, AnalysisResult};
use crate::service::analysis::confidence::score_confidence;
use crate::service::llm::Completion;

/// Suggestions kept per response
const MAX_SUGGESTIONS: usize = 5;

/// Line prefixes recognized as bullet markers
const BULLET_MARKERS: &[&str] = &["- ", "* ", "• "];

/// Confidence reported on a legacy parse failure
const DEGRADED_CONFIDENCE: f64 = 0.5;

/// Shape raw completion text into the grounded response schema
pub fn shape_grounded(request: &AnalysisRequest, completion: &Completion) -> AnalysisResult {
    let content = completion.text.trim().to_string();

    let suggestions = request
        .analysis
        .supports_suggestions()
        .then(|| extract_suggestions(&content));

    AnalysisResult {
        success: true,
        analysis_type: request.analysis.label().to_string(),
        content,
        suggestions,
        confidence: score_confidence(request.supplied_transcript_len),
        metadata: AnalysisMetadata {
            tokens_used: completion.tokens_used,
            timestamp: Utc::now().to_rfc3339(),
            session_topic: request.session_topic.clone(),
            transcript_length: request.supplied_transcript_len,
        },
    }
}

/// Shape JSON-mode completion text into the legacy response
///
/// On successful parse of a JSON object, a metadata block is merged in; any
/// other output degrades to the `{result, type, confidence, error}` envelope.
pub fn shape_legacy(request: &AnalysisRequest, completion: &Completion) -> Value {
    let metadata = json!({
        "transcriptLength": request.supplied_transcript_len,
        "hasContent": request.supplied_transcript_len > 0,
        "timestamp": Utc::now().to_rfc3339(),
    });

    match serde_json::from_str::<Value>(completion.text.trim()) {
        Ok(Value::Object(mut parsed)) => {
            parsed.insert("metadata".to_string(), metadata);
            Value::Object(parsed)
        }
        Ok(_) | Err(_) => {
            tracing::warn!(
                analysis_type = request.analysis.label(),
                "Model output was not a JSON object, degrading to raw envelope"
            );
            json!({
                "result": completion.text,
                "type": request.analysis.label(),
                "confidence": DEGRADED_CONFIDENCE,
                "error": "parsing failed",
                "metadata": metadata,
            })
        }
    }
}

/// Extract bullet-marked lines as suggestions
///
/// Keeps at most the first [`MAX_SUGGESTIONS`] bullet lines in source order,
/// with the marker stripped.
pub fn extract_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim_start();
            BULLET_MARKERS
                .iter()
                .find_map(|marker| line.strip_prefix(marker))
                .map(|rest| rest.trim().to_string())
        })
        .filter(|suggestion| !suggestion.is_empty())
        .take(MAX_SUGGESTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalysisType, RequestedAnalysis};

    fn request(kind: AnalysisType, supplied_len: usize) -> AnalysisRequest {
        AnalysisRequest {
            session_topic: "Pricing".to_string(),
            transcript: "A: raise prices.".to_string(),
            supplied_transcript_len: supplied_len,
            analysis: RequestedAnalysis::Known(kind),
            client_id: "anonymous".to_string(),
            session_duration_minutes: None,
        }
    }

    fn completion(text: &str) -> Completion {
        Completion {
            text: text.to_string(),
            tokens_used: 42,
        }
    }

    #[test]
    fn test_suggestions_present_iff_type_supports_them() {
        let raw = completion("- Q1\n- Q2");

        for kind in [AnalysisType::Followup, AnalysisType::Facilitation] {
            let shaped = shape_grounded(&request(kind, 10), &raw);
            assert_eq!(
                shaped.suggestions,
                Some(vec!["Q1".to_string(), "Q2".to_string()])
            );
        }

        for kind in [
            AnalysisType::Insights,
            AnalysisType::Synthesis,
            AnalysisType::CrossReference,
        ] {
            let shaped = shape_grounded(&request(kind, 10), &raw);
            assert_eq!(shaped.suggestions, None);
        }
    }

    #[test]
    fn test_suggestions_capped_at_five_preserving_order() {
        let raw = completion("- one\ntext\n- two\n* three\n• four\n- five\n- six\n- seven");
        let suggestions = extract_suggestions(&raw.text);

        assert_eq!(
            suggestions,
            vec!["one", "two", "three", "four", "five"]
        );
    }

    #[test]
    fn test_non_bullet_text_yields_no_suggestions() {
        assert!(extract_suggestions("No list here.\nJust prose.").is_empty());
        assert!(extract_suggestions("-not a bullet, no space").is_empty());
    }

    #[test]
    fn test_grounded_shape_wraps_trimmed_text_and_metadata() {
        let shaped = shape_grounded(&request(AnalysisType::Insights, 16), &completion("  body  \n"));

        assert!(shaped.success);
        assert_eq!(shaped.analysis_type, "insights");
        assert_eq!(shaped.content, "body");
        assert_eq!(shaped.metadata.tokens_used, 42);
        assert_eq!(shaped.metadata.session_topic, "Pricing");
        assert_eq!(shaped.metadata.transcript_length, 16);
        assert!((0.0..=1.0).contains(&shaped.confidence));
    }

    #[test]
    fn test_legacy_invalid_json_degrades_softly() {
        let shaped = shape_legacy(&request(AnalysisType::Insights, 0), &completion("{ invalid json"));

        assert_eq!(shaped["result"], "{ invalid json");
        assert_eq!(shaped["type"], "insights");
        assert_eq!(shaped["confidence"], DEGRADED_CONFIDENCE);
        assert_eq!(shaped["error"], "parsing failed");
        assert_eq!(shaped["metadata"]["hasContent"], false);
    }

    #[test]
    fn test_legacy_valid_json_gets_metadata_merged() {
        let raw = completion(r#"{"insights": ["margin pressure"], "confidence": 0.7}"#);
        let shaped = shape_legacy(&request(AnalysisType::Insights, 16), &raw);

        assert_eq!(shaped["insights"][0], "margin pressure");
        assert_eq!(shaped["confidence"], 0.7);
        assert_eq!(shaped["metadata"]["transcriptLength"], 16);
        assert_eq!(shaped["metadata"]["hasContent"], true);
        assert!(shaped["metadata"]["timestamp"].is_string());
    }

    #[test]
    fn test_legacy_non_object_json_also_degrades() {
        let shaped = shape_legacy(&request(AnalysisType::Synthesis, 5), &completion("42"));
        assert_eq!(shaped["error"], "parsing failed");
        assert_eq!(shaped["result"], "42");
    }
}
