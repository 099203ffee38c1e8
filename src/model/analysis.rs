//! Domain model for grounded discussion analysis

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Supported analysis categories
///
/// Each variant selects a prompt instruction block and, for
/// [`AnalysisType::Followup`] and [`AnalysisType::Facilitation`], the
/// suggestion-list extraction in response shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    Insights,
    Synthesis,
    Followup,
    CrossReference,
    Facilitation,
}

impl AnalysisType {
    /// All supported wire labels, in declaration order
    pub const SUPPORTED: &'static [&'static str] = &[
        "insights",
        "synthesis",
        "followup",
        "cross_reference",
        "facilitation",
    ];

    /// Parse a wire label into an analysis type
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "insights" => Some(Self::Insights),
            "synthesis" => Some(Self::Synthesis),
            "followup" => Some(Self::Followup),
            "cross_reference" => Some(Self::CrossReference),
            "facilitation" => Some(Self::Facilitation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insights => "insights",
            Self::Synthesis => "synthesis",
            Self::Followup => "followup",
            Self::CrossReference => "cross_reference",
            Self::Facilitation => "facilitation",
        }
    }

    /// Whether shaped responses carry a `suggestions` list for this type
    pub fn supports_suggestions(&self) -> bool {
        matches!(self, Self::Followup | Self::Facilitation)
    }
}

/// Policy for `analysisType` values outside the supported set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownTypePolicy {
    /// Report a validation issue (default)
    Reject,
    /// Carry the raw label through to the generic prompt block
    GenericFallback,
}

/// The analysis a request asked for
///
/// `Fallback` only occurs under [`UnknownTypePolicy::GenericFallback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedAnalysis {
    Known(AnalysisType),
    Fallback(String),
}

impl RequestedAnalysis {
    /// Wire label echoed back in responses
    pub fn label(&self) -> &str {
        match self {
            Self::Known(kind) => kind.as_str(),
            Self::Fallback(label) => label,
        }
    }

    pub fn supports_suggestions(&self) -> bool {
        matches!(self, Self::Known(kind) if kind.supports_suggestions())
    }
}

/// Typed analysis request, the output of payload validation
///
/// `transcript` is the effective text handed to the prompt builder; when the
/// caller supplied nothing it holds the fixed placeholder sentence while
/// `supplied_transcript_len` stays 0.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub session_topic: String,
    pub transcript: String,
    pub supplied_transcript_len: usize,
    pub analysis: RequestedAnalysis,
    pub client_id: String,
    pub session_duration_minutes: Option<u64>,
}

/// Shaped analysis response (grounded schema)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub success: bool,
    pub analysis_type: String,
    pub content: String,
    /// Present only for followup and facilitation analyses; at most 5 entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    /// In [0, 1]
    pub confidence: f64,
    pub metadata: AnalysisMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub tokens_used: u32,
    /// ISO-8601 / RFC 3339 timestamp of shaping
    pub timestamp: String,
    pub session_topic: String,
    /// Length of the caller-supplied transcript (0 when absent or empty)
    pub transcript_length: usize,
}
