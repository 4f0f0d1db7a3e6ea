//! Interactive terminal chat loop.
//!
//! The loop is split into three testable pieces: [`parse_command`] maps a
//! raw input line to a [`Command`], [`ChatSession`] owns the conversation
//! state and the last extracted script, and [`run_chat`] wires both to
//! stdin/stdout and the completion client.

use std::io::{BufRead, Write};
use tracing::warn;

use crate::extract::extract_script;
use crate::viewer::open_in_calendar;
use crate::{Message, OpenAiClient};

/// Help banner printed when the loop starts.
const BANNER: &str = "Welcome to Timeblok!
 Use '/n' to create a new timeblok,
 '/e' to edit the returned timeblok,
 '/s' to open the last returned timeblok,
 or '/q' to quit
";

// ── Command parsing ────────────────────────────────────────────────

/// A parsed user input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Exact `/q`: leave the loop.
    Quit,
    /// Exact `/s`: open the last extracted script, if any.
    Show,
    /// A tagged request to send to the model.
    Send(String),
}

/// Map a raw input line to a [`Command`].
///
/// `/n` and `/e` are prefixes whose remainder becomes a `new:`- or
/// `edit:`-tagged request; any unrecognized input is an implicit `new:`
/// request.
pub fn parse_command(input: &str) -> Command {
    if input == "/q" {
        Command::Quit
    } else if input == "/s" {
        Command::Show
    } else if let Some(rest) = input.strip_prefix("/n") {
        Command::Send(format!("new:{rest}"))
    } else if let Some(rest) = input.strip_prefix("/e") {
        Command::Send(format!("edit:{rest}"))
    } else {
        Command::Send(format!("new:{input}"))
    }
}

// ── Session state ──────────────────────────────────────────────────

/// Conversation state for one interactive session: the message history
/// (seeded with the base prompt) and the last successfully extracted
/// script. Held only in memory; discarded at process exit.
pub struct ChatSession {
    messages: Vec<Message>,
    last_script: Option<String>,
}

impl ChatSession {
    pub fn new(base: Vec<Message>) -> Self {
        Self {
            messages: base,
            last_script: None,
        }
    }

    /// The full conversation to send to the completion client.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The script extracted from the most recent reply that contained one.
    pub fn last_script(&self) -> Option<&str> {
        self.last_script.as_deref()
    }

    /// Append the tagged user message for the turn being processed.
    pub fn begin_turn(&mut self, content: String) {
        self.messages.push(Message::user(content));
    }

    /// Roll back a turn whose completion call failed, so the history stays
    /// consistent for the next attempt.
    pub fn abort_turn(&mut self) {
        self.messages.pop();
    }

    /// Record the assistant's raw reply: extract a script if one is
    /// present (overwriting the previous one) and append the reply to the
    /// history.
    pub fn complete_turn(&mut self, reply: &str) {
        if let Some(script) = extract_script(reply) {
            self.last_script = Some(script.to_string());
        }
        self.messages.push(Message::assistant(reply));
    }
}

// ── Loop ───────────────────────────────────────────────────────────

/// Run the interactive loop until `/q` or end of input.
///
/// Completion failures are reported and the turn is rolled back; viewer
/// failures are reported as warnings. Both leave the loop running.
pub async fn run_chat(client: &OpenAiClient, mut session: ChatSession) -> Result<(), String> {
    println!("{BANNER}");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!("Enter command (/n, /e, /s, /q): ");
        std::io::stdout()
            .flush()
            .map_err(|e| format!("failed to flush stdout: {e}"))?;

        let Some(line) = lines.next() else {
            break; // end of input behaves like /q
        };
        let line = line.map_err(|e| format!("failed to read input: {e}"))?;

        match parse_command(&line) {
            Command::Quit => break,
            Command::Show => {
                if let Some(script) = session.last_script()
                    && let Err(e) = open_in_calendar(script)
                {
                    warn!("viewer invocation failed: {e}");
                    eprintln!("Error: failed to open timeblok in calendar: {e}");
                }
            }
            Command::Send(content) => {
                session.begin_turn(content);
                match client.chat(session.messages()).await {
                    Ok(completion) => {
                        let reply = completion.content().to_string();
                        session.complete_turn(&reply);
                        println!("{reply}");
                    }
                    Err(e) => {
                        session.abort_turn();
                        eprintln!("Error: completion failed: {e}");
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageRole;

    #[test]
    fn quit_and_show_require_exact_match() {
        assert_eq!(parse_command("/q"), Command::Quit);
        assert_eq!(parse_command("/s"), Command::Show);
        // Near-misses are implicit new requests.
        assert_eq!(
            parse_command("/q now"),
            Command::Send("new:/q now".to_string())
        );
        assert_eq!(
            parse_command("/september plans"),
            Command::Send("new:/september plans".to_string())
        );
    }

    #[test]
    fn slash_n_and_e_rewrite_to_tags() {
        assert_eq!(
            parse_command("/n gym at 7am"),
            Command::Send("new: gym at 7am".to_string())
        );
        assert_eq!(
            parse_command("/e move it to 8am"),
            Command::Send("edit: move it to 8am".to_string())
        );
        assert_eq!(parse_command("/n"), Command::Send("new:".to_string()));
    }

    #[test]
    fn bare_input_is_an_implicit_new_request() {
        assert_eq!(
            parse_command("meeting at 3pm"),
            Command::Send("new:meeting at 3pm".to_string())
        );
    }

    #[test]
    fn session_records_reply_and_script() {
        let mut session = ChatSession::new(vec![Message::system("s")]);
        assert!(session.last_script().is_none());

        session.begin_turn("new: standup at 10".to_string());
        session.complete_turn("Sure:\n```timeblok\n2023-4-4\n10am standup\n```");

        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[2].role, MessageRole::Assistant);
        assert_eq!(session.last_script(), Some("2023-4-4\n10am standup\n"));
    }

    #[test]
    fn later_script_overwrites_earlier_one() {
        let mut session = ChatSession::new(vec![Message::system("s")]);
        session.begin_turn("new: a".to_string());
        session.complete_turn("```timeblok\nfirst\n```");
        session.begin_turn("edit: b".to_string());
        session.complete_turn("```timeblok\nsecond\n```");
        assert_eq!(session.last_script(), Some("second\n"));
    }

    #[test]
    fn scriptless_reply_keeps_previous_script() {
        let mut session = ChatSession::new(vec![Message::system("s")]);
        session.begin_turn("new: a".to_string());
        session.complete_turn("```timeblok\nkept\n```");
        session.begin_turn("what does that mean?".to_string());
        session.complete_turn("Just a plain-text explanation.");

        assert_eq!(session.last_script(), Some("kept\n"));
        assert_eq!(session.messages().len(), 5);
    }

    #[test]
    fn abort_turn_rolls_back_the_user_message() {
        let mut session = ChatSession::new(vec![Message::system("s")]);
        session.begin_turn("new: a".to_string());
        session.abort_turn();
        assert_eq!(session.messages().len(), 1);
    }
}
