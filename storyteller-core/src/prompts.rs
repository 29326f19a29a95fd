//! Prompt builders for each node.
//!
//! Builders are pure string formatting so they can be tested without a model.

use crate::state::Turn;

/// Marker the story model must print after the last line of the story.
pub const END_SENTINEL: &str = "<END>";

/// Number of trailing history turns included as prompt context.
pub const HISTORY_WINDOW: usize = 6;

/// Render history turns as `Role: content` lines.
pub fn format_history(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn classify_intent(message: &str, history: &[Turn]) -> String {
    let context = if history.is_empty() {
        String::new()
    } else {
        format!("\nConversation context:\n{}\n", format_history(history))
    };

    format!(
        r#"You are an expert at classifying user intent.
Classify MESSAGE as exactly one of:
- "story": a request for a new or continued story
- "feedback": instructions to revise or improve the current story or its specification
- "general": a general question or statement unrelated to the story
Return ONLY valid JSON like {{"intent": "story"}}, {{"intent": "feedback"}} or {{"intent": "general"}}.
{context}
MESSAGE: {message}"#
    )
}

pub fn build_specification(request: &str, prior: Option<&str>, feedback: Option<&str>) -> String {
    let prior = prior
        .map(|spec| format!("\nCURRENT SPEC (JSON):\n{spec}\n"))
        .unwrap_or_default();
    let feedback = feedback
        .map(|fb| format!("\nFEEDBACK TO APPLY:\n{fb}\n"))
        .unwrap_or_default();
    let revise = if prior.is_empty() {
        ""
    } else {
        "\nRevise the CURRENT SPEC rather than starting over: keep what still fits and change what the feedback asks for.\n"
    };

    format!(
        r#"You are writing a SPECIFICATION for a children's bedtime story (ages 5-10).
Fill out the following JSON object and return ONLY valid JSON, no extra text.

Schema (keys and types must match EXACTLY):
{{
  "topic": "string",
  "tone": "string",
  "style": "string",
  "plan": "string",
  "length": 1000
}}

Field guide:
- topic: concise topic or title derived from the request.
- tone: e.g. "cozy, reassuring".
- style: e.g. "simple sentences, gentle imagery, some dialogue".
- plan: a short walkthrough of the arc (beginning, small non-scary problem, kind resolution, warm closing), 3-6 sentences.
- length: integer target word count, typically 350-700 unless the request implies otherwise.

Constraints:
- The audience is ages 5-10: no violence, no scares, no bullying, no romance, no medical or legal advice.
- Do NOT write the story, only the JSON spec.
- Do NOT include comments or any keys beyond the five above.
{revise}
USER REQUEST:
{request}
{prior}{feedback}
Return ONLY the JSON object."#
    )
}

pub fn generate_story(specification_json: &str) -> String {
    format!(
        r#"You are a children's storyteller (ages 5-10).
Using ONLY the following SPECIFICATION, write the story. Do NOT include the specification in your output.

SPEC:
"""{specification_json}"""

Write the full bedtime story now.
At the very end add the token {END_SENTINEL} on its own line."#
    )
}

pub fn judge_story(story: &str) -> String {
    format!(
        r#"You are a careful reviewer of children's bedtime stories (ages 5-10).
Return ONLY JSON with exactly these fields:
{{
  "is_appropriate": true,
  "feedback": "brief explanation and concrete suggestions, only when the story is not appropriate"
}}

STORY:
"""{story}""""#
    )
}

pub fn general_response(message: &str, history: &[Turn]) -> String {
    let context = if history.is_empty() {
        String::new()
    } else {
        format!("\nRecent conversation:\n{}\n", format_history(history))
    };

    format!(
        r#"You are a friendly storyteller assistant. Explain that this program tells bedtime stories for children (ages 5-10), and that the user can ask for a story or suggest changes to one. Answer general conversational questions as long as they are polite and appropriate.
{context}
MESSAGE:
{message}"#
    )
}
