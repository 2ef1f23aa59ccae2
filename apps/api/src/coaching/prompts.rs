// All LLM prompt constants for the coaching module.

/// System prompt for answer evaluation — coach persona + JSON-only contract.
pub const EVALUATION_SYSTEM: &str =
    "You are CareerCoach, an expert interview coach. \
    Analyze the user's input and respond with a single valid JSON object. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Evaluation prompt template. Replace `{user_answer}` before sending.
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"If the input is clearly an interview answer, return exactly this format:
{
  "type": "evaluation",
  "feedback": "Detailed feedback on strengths and weaknesses, with specific suggestions for improvement.",
  "suggested_answer": "A better example answer to this question, based on the user's answer. A suggested answer must be provided for every question, never left empty."
}

Otherwise, return this format:
{
  "type": "general_answer",
  "response": "Your reply to the user's input."
}

User input:
{user_answer}

Return ONLY the JSON object, no other text. Always include the "suggested_answer" field when type is "evaluation"."#;

/// System prompt for interview question generation — array-only contract.
pub const QUESTIONS_SYSTEM: &str =
    "You are a senior technical recruiter. \
    You MUST respond with a single valid JSON array of strings. \
    Do NOT include any text outside the brackets. \
    Do NOT use markdown code fences.";

/// Question generation template. Replace `{role}`, `{field}`, `{skills}`.
pub const QUESTIONS_PROMPT_TEMPLATE: &str = r#"Create interview questions for the following profile:

TARGET ROLE: {role}
FIELD: {field}
KEY SKILLS: {skills}

Return ONLY a valid JSON array of 15-20 strings (no markdown, no text outside the brackets).
Every question MUST start with exactly one tag: [Background], [Situation], or [Technical].

Example format:
[
  "[Background] Tell me about your experience with data analysis.",
  "[Situation] Describe how you handled a difficult deadline.",
  "[Technical] Explain the key concepts of machine learning."
]

Make the questions specific to the role and skills. Return ONLY the JSON array, nothing else."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_template_substitutes_answer() {
        let prompt = EVALUATION_PROMPT_TEMPLATE.replace("{user_answer}", "I led a team of five.");
        assert!(prompt.contains("I led a team of five."));
        assert!(!prompt.contains("{user_answer}"));
    }

    #[test]
    fn test_questions_template_substitutes_all_fields() {
        let prompt = QUESTIONS_PROMPT_TEMPLATE
            .replace("{role}", "Backend Engineer")
            .replace("{field}", "Software")
            .replace("{skills}", "rust, sql");
        assert!(prompt.contains("TARGET ROLE: Backend Engineer"));
        assert!(prompt.contains("FIELD: Software"));
        assert!(prompt.contains("KEY SKILLS: rust, sql"));
    }

    #[test]
    fn test_questions_template_names_all_three_tags() {
        for tag in ["[Background]", "[Situation]", "[Technical]"] {
            assert!(QUESTIONS_PROMPT_TEMPLATE.contains(tag));
        }
    }
}
