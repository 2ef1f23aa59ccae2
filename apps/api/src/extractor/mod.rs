//! Response Extractor — normalizes free-form LLM replies into the strict
//! payload contracts the frontend consumes.
//!
//! Model output is unreliable rather than malicious: JSON wrapped in code
//! fences, prose around the object, trailing commas, raw newlines inside
//! arrays. The extractor applies one shared repair pipeline (fence strip →
//! balanced bracket scan → comma repair → parse) and then degrades along a
//! fixed fallback ladder. Callers branch on tags, never on exceptions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Max raw-text excerpt carried in fallback payloads and diagnostics.
const EXCERPT_CHARS: usize = 500;

/// Canned feedback returned when a located JSON object cannot be parsed.
const FALLBACK_FEEDBACK: &str =
    "Your answer shows good effort. Keep practicing and try to be more specific with examples.";
/// Canned suggested answer paired with `FALLBACK_FEEDBACK`.
const FALLBACK_SUGGESTED_ANSWER: &str =
    "Provide a more structured answer with specific examples from your experience.";
/// Substituted when a parsed evaluation omits or empties its suggested answer.
/// An evaluation must never carry an empty suggested answer.
const PLACEHOLDER_SUGGESTED_ANSWER: &str =
    "Structure your answer around a concrete example from your own experience.";
/// General-answer text used when the model reply is empty.
const EMPTY_REPLY_RESPONSE: &str = "Please provide a clearer input.";

/// What shape the calling endpoint expects the model to have produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetShape {
    /// `/evaluate`: object carrying a `"type"` discriminator. Lenient — the
    /// ladder always produces a payload, never a failure.
    TaggedObject,
    /// `/cv/analyze`: object with a fixed field layout. Strict.
    AnalysisObject,
    /// `/questions/generate`: flat array of short strings. Strict.
    StringArray,
}

/// Structured CV analysis, as promised by the analysis prompt contract.
/// Fields tolerate absence so a partially filled reply still extracts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvAnalysis {
    #[serde(default)]
    pub extracted_role: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub experience_years: String,
    #[serde(default)]
    pub experience_summary: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub learning_path: LearningPath,
    #[serde(default)]
    pub recommended_tasks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    #[serde(default)]
    pub immediate: Vec<String>,
    #[serde(default)]
    pub short_term: Vec<String>,
    #[serde(default)]
    pub long_term: Vec<String>,
}

/// The model sometimes reports the year estimate as a bare number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// The normalized result of parsing an LLM reply, tagged per endpoint contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtractedPayload {
    Evaluation {
        feedback: String,
        suggested_answer: String,
    },
    GeneralAnswer {
        response: String,
    },
    Analysis(CvAnalysis),
    Questions {
        questions: Vec<String>,
    },
}

/// Why the extractor degraded from a clean parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    NoJsonFound,
    ParseFailed,
    MissingSuggestedAnswer,
}

/// A successful extraction: the payload plus the fallback step taken, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub payload: ExtractedPayload,
    pub fallback: Option<FallbackReason>,
}

impl Extraction {
    fn clean(payload: ExtractedPayload) -> Self {
        Self {
            payload,
            fallback: None,
        }
    }
}

/// Failure for strict target shapes. `TaggedObject` never produces this.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("no JSON {expected} found in model reply")]
    NoJsonFound {
        expected: &'static str,
        raw_excerpt: String,
    },

    #[error("model reply could not be parsed: {message}")]
    ParseFailed {
        message: String,
        raw_excerpt: String,
    },
}

impl ExtractionFailure {
    /// The first 500 characters of the offending reply, for diagnostics.
    pub fn raw_excerpt(&self) -> &str {
        match self {
            ExtractionFailure::NoJsonFound { raw_excerpt, .. } => raw_excerpt,
            ExtractionFailure::ParseFailed { raw_excerpt, .. } => raw_excerpt,
        }
    }
}

/// Extracts a structured payload from a raw model reply.
///
/// All three shapes share the same repair pipeline; what differs is the
/// bracket kind scanned for and how much leniency the caller's contract
/// allows once the pipeline gives up.
pub fn extract(raw: &str, target: TargetShape) -> Result<Extraction, ExtractionFailure> {
    let text = strip_code_fences(raw);
    match target {
        TargetShape::TaggedObject => Ok(extract_tagged(text)),
        TargetShape::AnalysisObject => extract_analysis(text),
        TargetShape::StringArray => extract_questions(text),
    }
}

fn extract_tagged(text: &str) -> Extraction {
    let Some(candidate) = find_balanced(text, '{', '}') else {
        warn!("no JSON object found in model reply; degrading to general answer");
        let response = if text.is_empty() {
            EMPTY_REPLY_RESPONSE.to_string()
        } else {
            excerpt(text)
        };
        return Extraction {
            payload: ExtractedPayload::GeneralAnswer { response },
            fallback: Some(FallbackReason::NoJsonFound),
        };
    };

    let cleaned = strip_trailing_commas(candidate);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => map_tagged_value(&value),
        Err(e) => {
            warn!("model reply failed to parse as JSON: {e}");
            canned_evaluation(FallbackReason::ParseFailed)
        }
    }
}

fn map_tagged_value(value: &Value) -> Extraction {
    match value.get("type").and_then(Value::as_str) {
        Some("evaluation") => {
            let feedback = str_field(value, "feedback");
            let suggested_answer = str_field(value, "suggested_answer");
            if suggested_answer.trim().is_empty() {
                debug!("evaluation reply missing suggested_answer; substituting placeholder");
                Extraction {
                    payload: ExtractedPayload::Evaluation {
                        feedback,
                        suggested_answer: PLACEHOLDER_SUGGESTED_ANSWER.to_string(),
                    },
                    fallback: Some(FallbackReason::MissingSuggestedAnswer),
                }
            } else {
                Extraction::clean(ExtractedPayload::Evaluation {
                    feedback,
                    suggested_answer,
                })
            }
        }
        Some("general_answer") => Extraction::clean(ExtractedPayload::GeneralAnswer {
            response: str_field(value, "response"),
        }),
        other => {
            warn!("model reply carried an unusable type discriminator: {other:?}");
            canned_evaluation(FallbackReason::ParseFailed)
        }
    }
}

fn extract_analysis(text: &str) -> Result<Extraction, ExtractionFailure> {
    let candidate = find_balanced(text, '{', '}').ok_or_else(|| ExtractionFailure::NoJsonFound {
        expected: "object",
        raw_excerpt: excerpt(text),
    })?;

    let cleaned = strip_trailing_commas(candidate);
    let analysis: CvAnalysis =
        serde_json::from_str(&cleaned).map_err(|e| ExtractionFailure::ParseFailed {
            message: e.to_string(),
            raw_excerpt: excerpt(text),
        })?;

    Ok(Extraction::clean(ExtractedPayload::Analysis(analysis)))
}

fn extract_questions(text: &str) -> Result<Extraction, ExtractionFailure> {
    let candidate = find_balanced(text, '[', ']').ok_or_else(|| ExtractionFailure::NoJsonFound {
        expected: "array",
        raw_excerpt: excerpt(text),
    })?;

    let cleaned = strip_trailing_commas(candidate);
    // Flat arrays of short strings: raw newlines inside the array are a
    // common model defect and safe to collapse.
    let cleaned = cleaned.replace('\n', " ").replace('\r', " ");

    let value: Value =
        serde_json::from_str(&cleaned).map_err(|e| ExtractionFailure::ParseFailed {
            message: e.to_string(),
            raw_excerpt: excerpt(text),
        })?;

    let items = value.as_array().ok_or_else(|| ExtractionFailure::ParseFailed {
        message: "reply is not a JSON array".to_string(),
        raw_excerpt: excerpt(text),
    })?;

    let mut questions = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some(s) => questions.push(s.to_string()),
            None => {
                return Err(ExtractionFailure::ParseFailed {
                    message: "array items must be strings".to_string(),
                    raw_excerpt: excerpt(text),
                })
            }
        }
    }

    Ok(Extraction::clean(ExtractedPayload::Questions { questions }))
}

fn canned_evaluation(reason: FallbackReason) -> Extraction {
    Extraction {
        payload: ExtractedPayload::Evaluation {
            feedback: FALLBACK_FEEDBACK.to_string(),
            suggested_answer: FALLBACK_SUGGESTED_ANSWER.to_string(),
        },
        fallback: Some(reason),
    }
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// First `EXCERPT_CHARS` characters of the reply. Character-based: replies
/// are frequently multibyte.
fn excerpt(raw: &str) -> String {
    raw.chars().take(EXCERPT_CHARS).collect()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
/// Interior fences are harmless — the balanced scan runs afterwards.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the optional language label on the fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    rest.strip_suffix("```").map(str::trim).unwrap_or_else(|| rest.trim())
}

/// Finds the first balanced top-level `open`..`close` span. Tracks nesting
/// depth and skips bracket characters inside quoted strings, so nested
/// structures and strings containing brackets never terminate the match
/// early. Returns `None` when no balanced span exists.
fn find_balanced(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Removes a trailing comma immediately preceding a closing bracket/brace,
/// outside of string literals: `{"a": 1,}` → `{"a": 1}`.
fn strip_trailing_commas(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in json.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '}' | ']' => {
                let kept = out.trim_end().len();
                if out[..kept].ends_with(',') {
                    out.truncate(kept - 1);
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(raw: &str) -> Extraction {
        extract(raw, TargetShape::TaggedObject).expect("tagged extraction is infallible")
    }

    // ── fence stripping ─────────────────────────────────────────────────

    #[test]
    fn test_strip_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_unterminated() {
        let input = "```json\n{\"key\": \"value\"}";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    // ── balanced scan ───────────────────────────────────────────────────

    #[test]
    fn test_find_balanced_nested_objects() {
        let text = "reply: {\"a\": {\"b\": 1}} trailing";
        assert_eq!(find_balanced(text, '{', '}'), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_find_balanced_ignores_braces_in_strings() {
        let text = r#"{"a": "closing } inside", "b": 2}"#;
        assert_eq!(find_balanced(text, '{', '}'), Some(text));
    }

    #[test]
    fn test_find_balanced_ignores_escaped_quotes() {
        let text = r#"{"a": "quote \" then } brace"}"#;
        assert_eq!(find_balanced(text, '{', '}'), Some(text));
    }

    #[test]
    fn test_find_balanced_unterminated_returns_none() {
        assert_eq!(find_balanced("{\"a\": 1", '{', '}'), None);
    }

    #[test]
    fn test_find_balanced_array() {
        let text = "here: [\"a\", [\"b\"]] done";
        assert_eq!(find_balanced(text, '[', ']'), Some("[\"a\", [\"b\"]]"));
    }

    // ── trailing comma repair ───────────────────────────────────────────

    #[test]
    fn test_strip_trailing_comma_in_object() {
        assert_eq!(strip_trailing_commas("{\"a\": 1,}"), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_trailing_comma_with_whitespace() {
        assert_eq!(strip_trailing_commas("[1, 2, \n ]"), "[1, 2]");
    }

    #[test]
    fn test_strip_trailing_comma_keeps_commas_in_strings() {
        let input = r#"{"a": "one, two,"}"#;
        assert_eq!(strip_trailing_commas(input), input);
    }

    // ── evaluation (lenient) ladder ─────────────────────────────────────

    #[test]
    fn test_clean_evaluation_parses() {
        let raw = r#"{"type": "evaluation", "feedback": "good", "suggested_answer": "try this"}"#;
        let extraction = tagged(raw);
        assert_eq!(extraction.fallback, None);
        assert_eq!(
            extraction.payload,
            ExtractedPayload::Evaluation {
                feedback: "good".to_string(),
                suggested_answer: "try this".to_string(),
            }
        );
    }

    #[test]
    fn test_fenced_reply_with_trailing_comma_and_missing_suggestion() {
        // Fences stripped, trailing comma repaired, then the missing
        // suggested_answer triggers the placeholder.
        let raw = "```json\n{\"type\":\"evaluation\",\"feedback\":\"ok\",}\n```";
        let extraction = tagged(raw);
        assert_eq!(
            extraction.fallback,
            Some(FallbackReason::MissingSuggestedAnswer)
        );
        match extraction.payload {
            ExtractedPayload::Evaluation {
                feedback,
                suggested_answer,
            } => {
                assert_eq!(feedback, "ok");
                assert!(!suggested_answer.is_empty());
            }
            other => panic!("expected evaluation, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_suggested_answer_gets_placeholder() {
        let raw = r#"{"type": "evaluation", "feedback": "ok", "suggested_answer": "  "}"#;
        let extraction = tagged(raw);
        assert_eq!(
            extraction.fallback,
            Some(FallbackReason::MissingSuggestedAnswer)
        );
        match extraction.payload {
            ExtractedPayload::Evaluation {
                suggested_answer, ..
            } => assert!(!suggested_answer.trim().is_empty()),
            other => panic!("expected evaluation, got {other:?}"),
        }
    }

    #[test]
    fn test_general_answer_passes_through() {
        let raw = r#"{"type": "general_answer", "response": "hello there"}"#;
        let extraction = tagged(raw);
        assert_eq!(extraction.fallback, None);
        assert_eq!(
            extraction.payload,
            ExtractedPayload::GeneralAnswer {
                response: "hello there".to_string(),
            }
        );
    }

    #[test]
    fn test_no_brackets_degrades_to_general_answer() {
        let extraction = tagged("I could not produce JSON for that question.");
        assert_eq!(extraction.fallback, Some(FallbackReason::NoJsonFound));
        assert_eq!(
            extraction.payload,
            ExtractedPayload::GeneralAnswer {
                response: "I could not produce JSON for that question.".to_string(),
            }
        );
    }

    #[test]
    fn test_no_brackets_response_capped_at_500_chars() {
        let raw = "x".repeat(1200);
        let extraction = tagged(&raw);
        match extraction.payload {
            ExtractedPayload::GeneralAnswer { response } => {
                assert_eq!(response.chars().count(), 500)
            }
            other => panic!("expected general answer, got {other:?}"),
        }
    }

    #[test]
    fn test_excerpt_is_character_based() {
        // 600 multibyte characters: a byte-based cut would split a char.
        let raw = "ü".repeat(600);
        let extraction = tagged(&raw);
        match extraction.payload {
            ExtractedPayload::GeneralAnswer { response } => {
                assert_eq!(response.chars().count(), 500)
            }
            other => panic!("expected general answer, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_reply_prompts_for_clearer_input() {
        let extraction = tagged("");
        assert_eq!(
            extraction.payload,
            ExtractedPayload::GeneralAnswer {
                response: "Please provide a clearer input.".to_string(),
            }
        );
    }

    #[test]
    fn test_unparseable_object_yields_canned_evaluation() {
        let extraction = tagged("{\"type\": \"evaluation\", \"feedback\": broken}");
        assert_eq!(extraction.fallback, Some(FallbackReason::ParseFailed));
        match extraction.payload {
            ExtractedPayload::Evaluation {
                feedback,
                suggested_answer,
            } => {
                assert!(!feedback.is_empty());
                assert!(!suggested_answer.is_empty());
            }
            other => panic!("expected canned evaluation, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_discriminator_yields_canned_evaluation() {
        let extraction = tagged(r#"{"type": "poem", "response": "roses"}"#);
        assert_eq!(extraction.fallback, Some(FallbackReason::ParseFailed));
        assert!(matches!(
            extraction.payload,
            ExtractedPayload::Evaluation { .. }
        ));
    }

    #[test]
    fn test_canned_fallback_is_a_fixed_point() {
        let canned = canned_evaluation(FallbackReason::ParseFailed);
        let serialized = serde_json::to_string(&canned.payload).unwrap();
        let reparsed = tagged(&serialized);
        assert_eq!(reparsed.payload, canned.payload);
        assert_eq!(reparsed.fallback, None);
    }

    // ── analysis (strict object) ────────────────────────────────────────

    #[test]
    fn test_analysis_full_object_extracts() {
        let raw = r#"Here is the analysis:
        {
          "extracted_role": "Software Engineer",
          "skills": ["rust", "sql"],
          "experience_years": "4",
          "experience_summary": "Backend work",
          "education": "BSc",
          "strengths": ["systems"],
          "weaknesses": ["frontend"],
          "learning_path": {
            "immediate": ["docker"],
            "short_term": ["kubernetes"],
            "long_term": ["architecture"]
          },
          "recommended_tasks": ["build a service"]
        }"#;
        let extraction = extract(raw, TargetShape::AnalysisObject).unwrap();
        match extraction.payload {
            ExtractedPayload::Analysis(analysis) => {
                assert_eq!(analysis.extracted_role, "Software Engineer");
                assert_eq!(analysis.skills, vec!["rust", "sql"]);
                assert_eq!(analysis.learning_path.short_term, vec!["kubernetes"]);
            }
            other => panic!("expected analysis, got {other:?}"),
        }
    }

    #[test]
    fn test_analysis_tolerates_missing_fields_and_numeric_years() {
        let raw = r#"{"extracted_role": "Analyst", "experience_years": 3}"#;
        let extraction = extract(raw, TargetShape::AnalysisObject).unwrap();
        match extraction.payload {
            ExtractedPayload::Analysis(analysis) => {
                assert_eq!(analysis.experience_years, "3");
                assert!(analysis.skills.is_empty());
                assert!(analysis.learning_path.immediate.is_empty());
            }
            other => panic!("expected analysis, got {other:?}"),
        }
    }

    #[test]
    fn test_analysis_without_object_fails_with_excerpt() {
        let err = extract("no json here at all", TargetShape::AnalysisObject).unwrap_err();
        assert!(matches!(err, ExtractionFailure::NoJsonFound { .. }));
        assert_eq!(err.raw_excerpt(), "no json here at all");
    }

    // ── questions (strict array) ────────────────────────────────────────

    #[test]
    fn test_questions_array_with_newlines_and_trailing_comma() {
        let raw = "```json\n[\n  \"[Background] Tell me about yourself.\",\n  \"[Technical] Explain ownership.\",\n]\n```";
        let extraction = extract(raw, TargetShape::StringArray).unwrap();
        assert_eq!(
            extraction.payload,
            ExtractedPayload::Questions {
                questions: vec![
                    "[Background] Tell me about yourself.".to_string(),
                    "[Technical] Explain ownership.".to_string(),
                ],
            }
        );
    }

    #[test]
    fn test_questions_without_array_fails_with_excerpt() {
        let raw = "Sorry, I can only answer in prose.";
        let err = extract(raw, TargetShape::StringArray).unwrap_err();
        assert!(matches!(err, ExtractionFailure::NoJsonFound { .. }));
        assert_eq!(err.raw_excerpt(), raw);
    }

    #[test]
    fn test_questions_object_instead_of_array_fails() {
        // An object reply has no balanced array to find.
        let raw = r#"{"questions": "not an array"}"#;
        let err = extract(raw, TargetShape::StringArray).unwrap_err();
        assert!(matches!(err, ExtractionFailure::NoJsonFound { .. }));
    }

    #[test]
    fn test_questions_non_string_items_fail() {
        let err = extract("[1, 2, 3]", TargetShape::StringArray).unwrap_err();
        assert!(matches!(err, ExtractionFailure::ParseFailed { .. }));
    }

    #[test]
    fn test_questions_failure_excerpt_capped_at_500_chars() {
        let raw = format!("prose {}", "y".repeat(1000));
        let err = extract(&raw, TargetShape::StringArray).unwrap_err();
        assert_eq!(err.raw_excerpt().chars().count(), 500);
    }
}
