//! The chain-of-density instruction template and prompt assembly.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — tightening a guideline or renaming an
//!    output field requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can render and inspect prompts directly
//!    without a live completion endpoint, so template regressions (a
//!    placeholder left unsubstituted, a field name drifting) are caught
//!    immediately.
//!
//! The article text is inserted verbatim. Nothing shields the template from
//! adversarial content inside the PDF itself; that is an accepted
//! limitation of the design, not an oversight.

use crate::config::SummaryConfig;

/// Opens the instruction-plus-article block in the chat message.
pub const ARTICLE_OPEN: &str = "<ARTICLE>";

/// Closes the instruction-plus-article block.
pub const ARTICLE_CLOSE: &str = "</ARTICLE>";

/// The densification instruction template.
///
/// `{max_words}`, `{entity_range}`, `{content_category}`, and
/// `{iterations}` are substituted by [`build_prompt`]; every other brace in
/// the text (the example JSON) is literal. The model is asked for a single
/// minified JSON list of `1 + iterations` records with the exact keys
/// `missing_entities` and `denser_summary`, each record strictly denser
/// than the last while never dropping an entity — a contract the prompt
/// states but the pipeline cannot verify.
const DENSIFY_TEMPLATE: &str = r#"As an expert copy-writer, you will write increasingly concise, entity-dense summaries of the above Article. The initial summary should be under {max_words} words and contain {entity_range} informative Descriptive Entities from the {content_category}.

A Descriptive Entity is:
- Relevant: to the main story.
- Specific: descriptive yet concise (5 words or fewer).
- Faithful: present in the {content_category}.
- Anywhere: located anywhere in the {content_category}.

# Your Summarization Process
- Read through the {content_category} and the all the below sections to get an understanding of the task.
- Pick {entity_range} informative Descriptive Entities from the {content_category} (";" delimited, do not add spaces).
- In your output JSON list of dictionaries, write an initial summary of max {max_words} words containing the Entities.
- You now have `[{"missing_entities": "...", "denser_summary": "..."}]`

Then, repeat the below 2 steps {iterations} times:
- Step 1. In a new dict in the same list, identify {entity_range} new informative Descriptive Entities from the {content_category} which are missing from the previously generated summary.
- Step 2. Write a new, denser summary of identical length which covers every Entity and detail from the previous summary plus the new Missing Entities.

A Missing Entity is:
- An informative Descriptive Entity from the {content_category} as defined above.
- Novel: not in the previous summary.

# Guidelines
- The first summary should be long (max {max_words} words) yet highly non-specific, containing little information beyond the Entities marked as missing. Use overly verbose language and fillers (e.g., "this {content_category} discusses") to reach ~{max_words} words.
- Make every word count: re-write the previous summary to improve flow and make space for additional entities.
- Make space with fusion, compression, and removal of uninformative phrases like "the {content_category} discusses".
- The summaries should become highly dense and concise yet self-contained, e.g., easily understood without the {content_category}.
- Missing entities can appear anywhere in the new summary.
- Never drop entities from the previous summary. If space cannot be made, add fewer new entities.
- You're finished when your JSON list has 1+{iterations} dictionaries of increasing density.

# IMPORTANT
- Remember, to keep each summary to max {max_words} words.
- Never remove Entities or details. Only add more from the {content_category}.
- Do not discuss the {content_category} itself, focus on the content: informative Descriptive Entities, and details.
- Remember, if you're overusing filler phrases in later summaries, or discussing the {content_category} itself, not its contents, choose more informative Descriptive Entities and include more details from the {content_category}.
- Answer with a minified JSON list of dictionaries with keys "missing_entities" and "denser_summary".

## Example output
[{"missing_entities": "ent1;ent2", "denser_summary": "<vague initial summary with entities 'ent1','ent2'>"}, {"missing_entities": "ent3", "denser_summary": "denser summary with 'ent1','ent2','ent3'"}, ...]

# Articles

"#;

/// Render the instruction template with the configured parameters.
fn render_instructions(config: &SummaryConfig) -> String {
    DENSIFY_TEMPLATE
        .replace("{max_words}", &config.word_budget.words().to_string())
        .replace("{entity_range}", &config.entity_range.to_string())
        .replace("{content_category}", &config.content_category)
        .replace("{iterations}", &config.iterations.to_string())
}

/// Build the full prompt: rendered instructions followed by the delimited
/// article section — an optional `# <name>` line, then the article text.
///
/// The caller (the completion client) wraps the result in
/// [`ARTICLE_OPEN`]/[`ARTICLE_CLOSE`] before submission; keeping the
/// markers out of this function lets the ingestor tokenize exactly what
/// will be inside the markers.
pub fn build_prompt(config: &SummaryConfig, article_name: &str, article_text: &str) -> String {
    let mut prompt = render_instructions(config);
    prompt.push('\n');
    if !article_name.is_empty() {
        prompt.push_str("# ");
        prompt.push_str(article_name);
    }
    prompt.push('\n');
    prompt.push_str(article_text);
    prompt
}
