//! Prompts for grounded discussion analysis

use crate::model::{AnalysisType, RequestedAnalysis};

/// System instruction sent with every completion call
pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are an AI co-facilitator supporting a live group discussion.

Your role is to analyze the running transcript and produce the requested
analysis for the human facilitator, in real time.

You must:
- Base everything strictly on the transcript content provided
- Quote or closely paraphrase actual transcript passages as evidence
- Acknowledge explicitly when the transcript is minimal or empty
- Keep output concise enough to be usable mid-session

Do not:
- Invent participants, quotes, statistics, or events
- Speculate about what participants might have meant
- Bring in outside knowledge the transcript does not support"#;

/// Grounding rules prepended to every rendered prompt
pub const GROUNDING_PREAMBLE: &str = r#"Ground rules for this analysis:
- Only reference content that is present in the transcript below.
- Never invent participants, quotes, or events.
- If the transcript is minimal or empty, state that explicitly instead of filling gaps."#;

/// Build the analysis prompt
///
/// Deterministic and side-effect-free. The transcript is substituted
/// verbatim and never truncated; upstream size limits belong to the
/// transport boundary, not here.
pub fn build_analysis_prompt(analysis: &RequestedAnalysis, topic: &str, transcript: &str) -> String {
    format!(
        r#"{preamble}

Discussion topic: {topic}

## Transcript
{transcript}

## Task
{block}"#,
        preamble = GROUNDING_PREAMBLE,
        topic = topic,
        transcript = transcript,
        block = instruction_block(analysis),
    )
}

/// Type-specific instruction block describing the expected output shape
fn instruction_block(analysis: &RequestedAnalysis) -> &'static str {
    let RequestedAnalysis::Known(kind) = analysis else {
        return GENERIC_BLOCK;
    };

    match kind {
        AnalysisType::Insights => {
            "Extract the key insights that have emerged in the discussion so far.\n\
             For each insight, name the supporting transcript passage and keep the\n\
             wording close to what was actually said. If fewer than three insights\n\
             are supported by the transcript, report only what is supported."
        }
        AnalysisType::Synthesis => {
            "Synthesize the discussion into a short narrative summary: the main\n\
             threads, points of agreement, and unresolved tensions. Use only what\n\
             was said; do not resolve tensions the participants left open."
        }
        AnalysisType::Followup => {
            "Propose up to 5 follow-up questions the facilitator could ask next.\n\
             Output each question as its own line starting with '- '. Every\n\
             question must build directly on something said in the transcript."
        }
        AnalysisType::CrossReference => {
            "Identify connections across the transcript: where participants echoed,\n\
             contradicted, or built on each other's points. Name the passages on\n\
             both sides of each connection."
        }
        AnalysisType::Facilitation => {
            "Give the facilitator concrete guidance for the next few minutes of\n\
             this session. Output up to 5 suggested interventions as lines\n\
             starting with '- ', each tied to the current state of the transcript\n\
             (participation balance, stalled threads, open questions)."
        }
    }
}

/// Fallback block for unrecognized analysis types
const GENERIC_BLOCK: &str =
    "Provide a concise analysis of the transcript relevant to the requested task,\n\
     strictly grounded in the transcript content.";
