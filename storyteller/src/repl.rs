//! Line-oriented conversation loop.
//!
//! Each non-blank input line is one user message. `exit` or `quit` (any
//! case) ends the loop, as does end of input.

use std::io::{self, BufRead, Write};

use storyteller_core::StorySession;

const GREETING: &str =
    "Storyteller ready! Ask for a story, give feedback, or just chat. Type 'exit' to quit.";

fn is_exit(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// Run the loop until the user quits or input ends.
///
/// A failed turn is reported and the loop keeps going.
pub async fn run<R: BufRead, W: Write>(
    session: &mut StorySession,
    input: R,
    mut out: W,
) -> io::Result<()> {
    writeln!(out, "{GREETING}")?;
    write!(out, "\nYou: ")?;
    out.flush()?;

    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            write!(out, "You: ")?;
            out.flush()?;
            continue;
        }
        if is_exit(line) {
            writeln!(out, "Goodbye!")?;
            return Ok(());
        }

        match session.send(line).await {
            Ok(reply) => {
                writeln!(out, "\nBot: {}", reply.text())?;
                if let Some(feedback) = reply.judge_feedback() {
                    writeln!(out, "[Judge feedback] {feedback}")?;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "turn failed");
                writeln!(out, "\n[Error] {e}")?;
            }
        }

        write!(out, "\nYou: ")?;
        out.flush()?;
    }

    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storyteller_core::testing::{spec_json, verdict_json};
    use storyteller_core::{ScriptedGenerator, StoryConfig};

    async fn transcript(replies: Vec<String>, input: &str) -> (String, StorySession) {
        let generator = Arc::new(ScriptedGenerator::new(replies));
        let mut session = StorySession::new(generator, &StoryConfig::new()).unwrap();
        let mut out = Vec::new();
        run(&mut session, input.as_bytes(), &mut out).await.unwrap();
        (String::from_utf8(out).unwrap(), session)
    }

    #[test]
    fn test_exit_words() {
        assert!(is_exit("exit"));
        assert!(is_exit("QUIT"));
        assert!(is_exit("Exit"));
        assert!(!is_exit("exit now"));
    }

    #[tokio::test]
    async fn test_story_turn_then_quit() {
        let replies = vec![
            r#"{"intent": "story"}"#.to_string(),
            spec_json("A brave mouse"),
            "The mouse was brave.\n<END>".to_string(),
            verdict_json(true, "sweet and calm"),
        ];
        let (out, session) = transcript(replies, "\n  \na mouse story\nquit\nignored\n").await;

        assert!(out.starts_with(GREETING));
        assert!(out.contains("Bot: The mouse was brave.\n"));
        assert!(out.contains("[Judge feedback] sweet and calm\n"));
        assert!(out.trim_end().ends_with("Goodbye!"));
        assert_eq!(session.history().len(), 3);
    }

    #[tokio::test]
    async fn test_error_keeps_loop_running() {
        let replies = vec![
            "not json".to_string(),
            r#"{"intent": "general"}"#.to_string(),
            "Hi! I tell stories.".to_string(),
        ];
        let (out, _) = transcript(replies, "first\nsecond\n").await;

        assert!(out.contains("[Error] "));
        assert!(out.contains("Bot: Hi! I tell stories."));
        assert!(!out.contains("Goodbye!"));
    }
}
