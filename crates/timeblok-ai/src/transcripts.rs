//! Few-shot example transcripts.
//!
//! Each transcript file encodes one or more (user prompt, timeblok script)
//! pairs in a two-marker plain-text format:
//!
//! ```text
//! new: gym every workday at 7am
//! +++
//! 2023--
//! {workday}
//! 7am~8am gym
//! ---
//! ```
//!
//! A line consisting of exactly `+++` switches from collecting the prompt
//! to collecting the script; a line of exactly `---` ends the current pair.
//! Every other line belongs verbatim (newline included) to whichever side
//! is being collected.

use std::path::Path;
use tracing::debug;

/// Marker line that switches from prompt to script collection.
pub const SCRIPT_MARKER: &str = "+++";

/// Marker line that terminates the current example pair.
pub const END_MARKER: &str = "---";

/// What to do with a pair that is still being collected when the file ends
/// without a terminating `---`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrailingExample {
    /// Emit the pending pair if it is non-empty.
    Flush,
    /// Discard the pending pair, matching the historical loader exactly.
    Drop,
}

/// Which side of the pair the parser is currently accumulating.
enum Collecting {
    Prompt,
    Script,
}

/// Parse one transcript's text into (prompt, script) pairs.
pub fn parse_transcript(text: &str, trailing: TrailingExample) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut prompt = String::new();
    let mut script = String::new();
    let mut mode = Collecting::Prompt;

    for line in text.lines() {
        if line == END_MARKER {
            pairs.push((std::mem::take(&mut prompt), std::mem::take(&mut script)));
            mode = Collecting::Prompt;
        } else if line == SCRIPT_MARKER {
            mode = Collecting::Script;
        } else {
            let buf = match mode {
                Collecting::Prompt => &mut prompt,
                Collecting::Script => &mut script,
            };
            buf.push_str(line);
            buf.push('\n');
        }
    }

    if trailing == TrailingExample::Flush && (!prompt.is_empty() || !script.is_empty()) {
        pairs.push((prompt, script));
    }

    pairs
}

/// Load every transcript file in `dir`, in sorted filename order, and
/// return the concatenated (prompt, script) pairs.
///
/// The directory is re-read on every call; nothing is cached.
pub fn load_transcripts(
    dir: impl AsRef<Path>,
    trailing: TrailingExample,
) -> Result<Vec<(String, String)>, String> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .map_err(|e| format!("failed to read transcripts dir {}: {e}", dir.display()))?;

    let mut files: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_file()))
        .map(|entry| entry.path())
        .collect();
    files.sort();

    let mut pairs = Vec::new();
    for path in &files {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read transcript {}: {e}", path.display()))?;
        pairs.extend(parse_transcript(&text, trailing));
    }

    debug!(
        "Loaded {} example pair(s) from {} file(s) in {}",
        pairs.len(),
        files.len(),
        dir.display()
    );
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const ONE_PAIR: &str = "new: lunch at noon\n+++\n2023-4-4\n12pm~1pm lunch\n---\n";

    #[test]
    fn parses_single_pair() {
        let pairs = parse_transcript(ONE_PAIR, TrailingExample::Flush);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "new: lunch at noon\n");
        assert_eq!(pairs[0].1, "2023-4-4\n12pm~1pm lunch\n");
    }

    #[test]
    fn parses_multiple_pairs_in_one_file() {
        let text = format!("{ONE_PAIR}second prompt\n+++\nsecond script\n---\n");
        let pairs = parse_transcript(&text, TrailingExample::Flush);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].0, "second prompt\n");
        assert_eq!(pairs[1].1, "second script\n");
    }

    #[test]
    fn marker_lines_must_match_exactly() {
        // Indented or decorated markers are ordinary content.
        let text = " +++\n----\nbody\n---\n";
        let pairs = parse_transcript(text, TrailingExample::Flush);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, " +++\n----\nbody\n");
        assert_eq!(pairs[0].1, "");
    }

    #[test]
    fn unterminated_pair_flushes_by_default() {
        let text = "a prompt\n+++\na script\n";
        let pairs = parse_transcript(text, TrailingExample::Flush);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, "a script\n");
    }

    #[test]
    fn unterminated_pair_dropped_in_compat_mode() {
        let text = "a prompt\n+++\na script\n";
        let pairs = parse_transcript(text, TrailingExample::Drop);
        assert!(pairs.is_empty());
    }

    #[test]
    fn empty_input_yields_nothing_under_both_policies() {
        assert!(parse_transcript("", TrailingExample::Flush).is_empty());
        assert!(parse_transcript("", TrailingExample::Drop).is_empty());
    }

    #[test]
    fn loads_directory_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "from b\n+++\nscript b\n---\n").unwrap();
        fs::write(dir.path().join("a.txt"), "from a\n+++\nscript a\n---\n").unwrap();

        let pairs = load_transcripts(dir.path(), TrailingExample::Flush).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "from a\n");
        assert_eq!(pairs[1].0, "from b\n");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = load_transcripts("/nonexistent/transcripts", TrailingExample::Flush)
            .unwrap_err();
        assert!(err.contains("failed to read transcripts dir"));
    }
}
