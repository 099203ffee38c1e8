//! Payload validation for analysis requests
//!
//! Turns an untyped JSON payload into a typed [`AnalysisRequest`], reporting
//! every violated field constraint rather than stopping at the first.
//! Validation is pure: the same payload always yields the same result.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::model::{AnalysisRequest, AnalysisType, RequestedAnalysis, UnknownTypePolicy};

/// Substituted for an absent or empty transcript
pub const TRANSCRIPT_PLACEHOLDER: &str =
    "No transcript has been captured for this session yet.";

/// Client id bucket for callers that supply none
pub const DEFAULT_CLIENT_ID: &str = "anonymous";

/// Accepted field names for the session topic, canonical first
const TOPIC_FIELDS: &[&str] = &["sessionTopic", "questionContext"];

/// Accepted field names for the transcript, canonical first
const TRANSCRIPT_FIELDS: &[&str] = &["liveTranscript", "currentTranscript", "transcript"];

/// One violated field constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate an untyped payload into a typed request
///
/// Collects every issue; a non-empty issue list means the request is
/// rejected wholesale.
pub fn validate(
    payload: &Value,
    policy: UnknownTypePolicy,
) -> Result<AnalysisRequest, Vec<FieldIssue>> {
    let Some(body) = payload.as_object() else {
        return Err(vec![FieldIssue::new("body", "must be a JSON object")]);
    };

    let mut issues = Vec::new();

    let session_topic = match first_present(body, TOPIC_FIELDS) {
        Some((field, value)) => match value.as_str() {
            Some(topic) if !topic.trim().is_empty() => Some(topic.to_string()),
            Some(_) => {
                issues.push(FieldIssue::new(field, "must be a non-empty string"));
                None
            }
            None => {
                issues.push(FieldIssue::new(field, "must be a string"));
                None
            }
        },
        None => {
            issues.push(FieldIssue::new(
                TOPIC_FIELDS[0],
                "required and must be a non-empty string",
            ));
            None
        }
    };

    let analysis = match body.get("analysisType") {
        Some(value) => match value.as_str() {
            Some(label) => match AnalysisType::parse(label) {
                Some(kind) => Some(RequestedAnalysis::Known(kind)),
                None => match policy {
                    UnknownTypePolicy::Reject => {
                        issues.push(FieldIssue::new(
                            "analysisType",
                            format!(
                                "unsupported analysis type '{}'; expected one of: {}",
                                label,
                                AnalysisType::SUPPORTED.join(", ")
                            ),
                        ));
                        None
                    }
                    UnknownTypePolicy::GenericFallback => {
                        Some(RequestedAnalysis::Fallback(label.to_string()))
                    }
                },
            },
            None => {
                issues.push(FieldIssue::new("analysisType", "must be a string"));
                None
            }
        },
        None => {
            issues.push(FieldIssue::new("analysisType", "required"));
            None
        }
    };

    let (transcript, supplied_transcript_len) = match first_present(body, TRANSCRIPT_FIELDS) {
        Some((field, value)) => match value.as_str() {
            Some(text) if !text.is_empty() => (text.to_string(), text.len()),
            Some(_) => (TRANSCRIPT_PLACEHOLDER.to_string(), 0),
            None => {
                issues.push(FieldIssue::new(field, "must be a string"));
                (TRANSCRIPT_PLACEHOLDER.to_string(), 0)
            }
        },
        None => (TRANSCRIPT_PLACEHOLDER.to_string(), 0),
    };

    let client_id = match body.get("clientId") {
        Some(value) => match value.as_str() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            Some(_) => DEFAULT_CLIENT_ID.to_string(),
            None => {
                issues.push(FieldIssue::new("clientId", "must be a string"));
                DEFAULT_CLIENT_ID.to_string()
            }
        },
        None => DEFAULT_CLIENT_ID.to_string(),
    };

    let session_duration_minutes = match body.get("sessionDuration") {
        Some(value) => match value.as_u64() {
            Some(minutes) => Some(minutes),
            None => {
                issues.push(FieldIssue::new(
                    "sessionDuration",
                    "must be a non-negative integer",
                ));
                None
            }
        },
        None => None,
    };

    // A missing topic or analysis always comes with an issue, so the happy
    // path has both
    match (session_topic, analysis) {
        (Some(session_topic), Some(analysis)) if issues.is_empty() => Ok(AnalysisRequest {
            session_topic,
            transcript,
            supplied_transcript_len,
            analysis,
            client_id,
            session_duration_minutes,
        }),
        _ => Err(issues),
    }
}

/// First field from `candidates` present in the payload
fn first_present<'a>(
    body: &'a serde_json::Map<String, Value>,
    candidates: &'static [&'static str],
) -> Option<(&'static str, &'a Value)> {
    candidates
        .iter()
        .find_map(|field| body.get(*field).map(|value| (*field, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_payload_produces_typed_request() {
        let payload = json!({
            "sessionTopic": "Pricing",
            "liveTranscript": "A: we should raise prices.",
            "analysisType": "insights",
            "clientId": "team-42",
            "sessionDuration": 30
        });

        let request = validate(&payload, UnknownTypePolicy::Reject).expect("payload is valid");

        assert_eq!(request.session_topic, "Pricing");
        assert_eq!(request.transcript, "A: we should raise prices.");
        assert_eq!(request.supplied_transcript_len, 26);
        assert_eq!(
            request.analysis,
            RequestedAnalysis::Known(AnalysisType::Insights)
        );
        assert_eq!(request.client_id, "team-42");
        assert_eq!(request.session_duration_minutes, Some(30));
    }

    #[test]
    fn test_all_violations_reported_not_just_first() {
        let payload = json!({
            "sessionTopic": "",
            "analysisType": 7,
            "clientId": 1,
            "sessionDuration": "long"
        });

        let issues = validate(&payload, UnknownTypePolicy::Reject).expect_err("payload is invalid");

        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["sessionTopic", "analysisType", "clientId", "sessionDuration"]
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let payload = json!({
            "sessionTopic": "Roadmap",
            "analysisType": "synthesis"
        });

        let first = validate(&payload, UnknownTypePolicy::Reject).expect("valid");
        let second = validate(&payload, UnknownTypePolicy::Reject).expect("valid");
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_or_empty_transcript_gets_placeholder() {
        let omitted = json!({"sessionTopic": "Pricing", "analysisType": "followup"});
        let request = validate(&omitted, UnknownTypePolicy::Reject).expect("valid");
        assert_eq!(request.transcript, TRANSCRIPT_PLACEHOLDER);
        assert_eq!(request.supplied_transcript_len, 0);

        let empty = json!({
            "sessionTopic": "Pricing",
            "analysisType": "followup",
            "liveTranscript": ""
        });
        let request = validate(&empty, UnknownTypePolicy::Reject).expect("valid");
        assert_eq!(request.transcript, TRANSCRIPT_PLACEHOLDER);
        assert_eq!(request.supplied_transcript_len, 0);
    }

    #[test]
    fn test_legacy_field_aliases_accepted() {
        let payload = json!({
            "questionContext": "Team retro",
            "currentTranscript": "B: the release slipped.",
            "analysisType": "synthesis"
        });

        let request = validate(&payload, UnknownTypePolicy::GenericFallback).expect("valid");
        assert_eq!(request.session_topic, "Team retro");
        assert_eq!(request.transcript, "B: the release slipped.");
    }

    #[test]
    fn test_client_id_defaults_to_anonymous() {
        let payload = json!({"sessionTopic": "Pricing", "analysisType": "insights"});
        let request = validate(&payload, UnknownTypePolicy::Reject).expect("valid");
        assert_eq!(request.client_id, DEFAULT_CLIENT_ID);
    }

    #[test]
    fn test_unknown_type_policy() {
        let payload = json!({"sessionTopic": "Pricing", "analysisType": "sentiment"});

        let issues = validate(&payload, UnknownTypePolicy::Reject).expect_err("rejected");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "analysisType");
        assert!(issues[0].message.contains("cross_reference"));

        let request = validate(&payload, UnknownTypePolicy::GenericFallback).expect("accepted");
        assert_eq!(
            request.analysis,
            RequestedAnalysis::Fallback("sentiment".to_string())
        );
    }

    #[test]
    fn test_non_object_body_is_a_single_issue() {
        let issues =
            validate(&json!("not an object"), UnknownTypePolicy::Reject).expect_err("invalid");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "body");
    }
}
