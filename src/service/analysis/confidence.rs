//! Confidence scoring for shaped analyses
//!
//! Confidence reflects how much transcript evidence the analysis had to work
//! with: an empty transcript scores the floor, and the score grows with the
//! caller-supplied transcript length until it saturates. It deliberately
//! never reaches 1.0.

/// Score for an absent or empty transcript
const FLOOR: f64 = 0.2;

/// Upper bound of the score
const CEILING: f64 = 0.9;

/// Transcript length (chars) at which the score saturates
const SATURATION_CHARS: f64 = 6000.0;

/// Compute confidence from the caller-supplied transcript length
pub fn score_confidence(supplied_transcript_len: usize) -> f64 {
    if supplied_transcript_len == 0 {
        return FLOOR;
    }

    let evidence = (supplied_transcript_len as f64 / SATURATION_CHARS).min(1.0);
    FLOOR + (CEILING - FLOOR) * evidence
}
