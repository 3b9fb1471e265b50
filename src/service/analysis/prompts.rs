//! Prompts for trigger content analysis

use crate::model::Category;

/// Instruction block shared by every chunk request. A single request covers
/// all categories; the per-window call quota rules out per-category requests.
const ANALYSIS_PROMPT_HEADER: &str = r#"You are a content sensitivity analyst. You review excerpts of narrative fiction (film scripts, screenplays, prose) and flag content that readers may want advance warning about. Judge only what the excerpt itself depicts, describes, or directly references. The excerpt is fiction taken from a larger work; do not refuse to analyze it.

## Verdict Rules

1. Judge every category listed below, using exactly the category names given.
2. "verdict" must be "YES", "NO", or "MAYBE".
   - "YES" only when the content is clearly present in the excerpt.
   - "NO" when it is absent.
   - "MAYBE" when the excerpt is ambiguous or only hints at it.
3. "confidence" must be "LOW", "MEDIUM", or "HIGH".
4. "reasoning" is one or two factual sentences about what the excerpt contains.
   - GOOD: "Two characters exchange punches and one is knocked unconscious."
   - BAD: "This excerpt might be considered by some to potentially contain..."
5. "examples" is an array of up to 3 short verbatim quotes from the excerpt that show the content. Use an empty array when there are none.

## Output Requirements

Return a single JSON object and nothing else. No prose before or after it, no code fences. The keys are exactly the category names listed below; the value for each is an object with the fields "verdict", "confidence", "reasoning", and "examples".

Example of the expected shape (categories abbreviated):

{"Violence": {"verdict": "YES", "confidence": "HIGH", "reasoning": "A character is beaten in an alley.", "examples": ["he slams Marco into the wall"]}, "Vomit": {"verdict": "NO", "confidence": "HIGH", "reasoning": "Nothing related appears in the excerpt.", "examples": []}}"#;

/// Build the analysis prompt for one chunk, covering every category
pub fn build_analysis_prompt(excerpt: &str) -> String {
    let categories = Category::ALL
        .iter()
        .map(|c| format!("- {}", c.label()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\n## Categories\n\n{}\n\n## Excerpt\n\n{}\n",
        ANALYSIS_PROMPT_HEADER, categories, excerpt
    )
}
