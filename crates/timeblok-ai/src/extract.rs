//! Script extraction from model replies.
//!
//! Model replies are free-form markdown; the script, when present, lives
//! in a fenced code block tagged `timeblok`. Only the first such block is
//! ever used — a reply with several blocks is out of contract.

/// Opening fence for a timeblok script block. The tag match is exact and
/// case-sensitive.
const OPENING_FENCE: &str = "```timeblok\n";

/// Closing fence. No language tag required.
const CLOSING_FENCE: &str = "```";

/// Return the body of the first ```` ```timeblok ```` fenced block in
/// `reply`, or `None` when the reply contains no complete block.
///
/// The body is returned verbatim, trailing newline included, up to but
/// excluding the closing fence.
pub fn extract_script(reply: &str) -> Option<&str> {
    let (_, after_fence) = reply.split_once(OPENING_FENCE)?;
    let (body, _) = after_fence.split_once(CLOSING_FENCE)?;
    Some(body)
}
