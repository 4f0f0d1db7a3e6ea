//! Base prompt assembly.
//!
//! The base conversation is the fixed context prepended to every live
//! exchange: one system message (instruction text plus today's date),
//! followed by each example transcript as a user/assistant turn pair. It
//! is assembled fresh per call and never mutated afterwards — surfaces
//! clone and extend it.

use chrono::NaiveDate;
use std::path::Path;

use crate::Message;
use crate::transcripts::{TrailingExample, load_transcripts};

/// Returns the system instruction for timeblok generation, without the
/// date line.
pub fn system_instruction() -> String {
    "\
You are a scheduling assistant that converts natural-language requests into \
timeblok, a plain-text calendar language.

timeblok rules:
- A line like `2023-4-4` sets the current date; `2023-10--` spans a month \
and `2023--` spans a year.
- An event is a time followed by its description: `10am wake up`, \
`20:00 weekly review`, or a range like `3pm~4pm design meeting`.
- A filter line such as `{workday}`, `{weekend}` or `{mon or thu}` limits \
the following events to matching days.

The user prefixes each request with `new:` for a fresh schedule or `edit:` \
to revise the last one you produced. Reply with a short explanation and \
exactly one fenced code block tagged `timeblok` containing the script. \
Resolve relative dates (\"tomorrow\", \"next Friday\") against today's date."
        .to_string()
}

/// System instruction with the date line appended, as sent to the model.
pub fn system_prompt_for(today: NaiveDate) -> String {
    format!(
        "{}\nToday's date is {}",
        system_instruction(),
        today.format("%Y-%m-%d")
    )
}

/// Assemble the base conversation against an explicit date.
pub fn base_conversation_at(
    samples_dir: impl AsRef<Path>,
    today: NaiveDate,
) -> Result<Vec<Message>, String> {
    let mut messages = vec![Message::system(system_prompt_for(today))];
    for (prompt, script) in load_transcripts(samples_dir, TrailingExample::Flush)? {
        messages.push(Message::user(prompt));
        messages.push(Message::assistant(script));
    }
    Ok(messages)
}

/// Assemble the base conversation against the local calendar date.
pub fn base_conversation(samples_dir: impl AsRef<Path>) -> Result<Vec<Message>, String> {
    base_conversation_at(samples_dir, chrono::Local::now().date_naive())
}

/// Write the base conversation (system + examples, no live turns) to
/// `out` as pretty-printed JSON, for reuse or inspection.
pub fn export_prompt(
    samples_dir: impl AsRef<Path>,
    out: impl AsRef<Path>,
) -> Result<(), String> {
    let messages = base_conversation(samples_dir)?;
    let json = serde_json::to_string_pretty(&messages)
        .map_err(|e| format!("failed to serialize prompt: {e}"))?;
    std::fs::write(out.as_ref(), json)
        .map_err(|e| format!("failed to write {}: {e}", out.as_ref().display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageRole;
    use std::fs;

    fn sample_dir(n: usize) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..n {
            fs::write(
                dir.path().join(format!("{i:02}.txt")),
                format!("prompt {i}\n+++\nscript {i}\n---\n"),
            )
            .unwrap();
        }
        dir
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 4, 4).unwrap()
    }

    #[test]
    fn system_prompt_carries_the_date() {
        let prompt = system_prompt_for(date());
        assert!(prompt.contains("timeblok"));
        assert!(prompt.ends_with("Today's date is 2023-04-04"));
    }

    #[test]
    fn base_conversation_alternates_roles() {
        let dir = sample_dir(3);
        let messages = base_conversation_at(dir.path(), date()).unwrap();

        assert_eq!(messages.len(), 1 + 2 * 3);
        assert_eq!(messages[0].role, MessageRole::System);
        for pair in messages[1..].chunks(2) {
            assert_eq!(pair[0].role, MessageRole::User);
            assert_eq!(pair[1].role, MessageRole::Assistant);
        }
        assert_eq!(messages[1].content, "prompt 0\n");
        assert_eq!(messages[2].content, "script 0\n");
    }

    #[test]
    fn zero_examples_still_yields_a_system_message() {
        let dir = sample_dir(0);
        let mut messages = base_conversation_at(dir.path(), date()).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::System);

        // A live turn on top still forms a well-formed pair to send.
        messages.push(Message::user("new: meeting at 3pm"));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, MessageRole::User);
    }

    #[test]
    fn export_writes_json_message_list() {
        let dir = sample_dir(1);
        let out = dir.path().join("prompt.json");
        export_prompt(dir.path(), &out).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["role"], "system");
        assert_eq!(entries[1]["role"], "user");
        assert_eq!(entries[2]["role"], "assistant");
    }
}
