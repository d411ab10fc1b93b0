//! Prompts for complaint analysis and completion

/// System prompt for structured complaint analysis
pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are a medical analysis assistant.
Return ONLY valid JSON with this exact structure:
{
  "summary": string,
  "risk": "low" | "medium" | "high",
  "rubrics": [
    {
      "path": string,
      "confidence": number between 0 and 1,
      "evidence": string,
      "category": string (like 'Mind', 'Head', 'Stomach', etc.)
    }
  ]
}
Extract 3-5 key medical rubrics from the patient complaint. Rubrics should follow the format 'Category > Subcategory > Symptom'. Evidence should be a brief quote or summary from the text."#;

pub const ANALYSIS_TEMPERATURE: f64 = 0.1;
pub const ANALYSIS_MAX_TOKENS: u64 = 500;

/// System prompt for complaint completion
pub const SUGGESTION_SYSTEM_PROMPT: &str = "You are a medical assistant. Given a partial patient complaint, suggest how to complete it with relevant symptoms, history, and details. Return only the suggested text.";

pub const SUGGESTION_TEMPERATURE: f64 = 0.3;
pub const SUGGESTION_MAX_TOKENS: u64 = 200;

/// Returned when no suggestion could be produced
pub const SUGGESTION_FALLBACK: &str =
    "Unable to generate suggestion. Please add more details about symptoms, duration, and history.";

/// Build the user prompt asking the model to complete a partial complaint
pub fn build_suggestion_prompt(partial: &str) -> String {
    format!(
        "Complete this medical complaint with relevant symptoms, history, and details:\n\n{}\n\nComplete complaint:",
        partial
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_prompt_embeds_text_verbatim() {
        let prompt = build_suggestion_prompt("Headache since Monday");
        assert!(prompt.starts_with("Complete this medical complaint"));
        assert!(prompt.contains("\n\nHeadache since Monday\n\n"));
        assert!(prompt.ends_with("Complete complaint:"));
    }

    #[test]
    fn analysis_prompt_names_every_field() {
        for field in ["summary", "risk", "rubrics", "path", "confidence", "evidence", "category"] {
            assert!(ANALYSIS_SYSTEM_PROMPT.contains(field), "missing {field}");
        }
        assert!(ANALYSIS_SYSTEM_PROMPT.contains("Category > Subcategory > Symptom"));
    }
}
