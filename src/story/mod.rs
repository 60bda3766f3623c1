//! Remote story client — the service contract, reply grouping, and the
//! presentation sequencer.
//!
//! The story engine itself lives in an external process on the session bus;
//! everything in this module is presentation plumbing around its replies.

pub mod config;
pub mod dbus;
pub mod sequencer;

use thiserror::Error;

/// Errors crossing the story-service boundary.
#[derive(Debug, Error)]
pub enum StoryError {
    /// The service is unreachable or rejected the request (bad script path,
    /// out-of-range option index, …). Never recovered locally; the caller
    /// reports it and the presentation state stays where it was.
    #[error("story service call failed: {0}")]
    RemoteCall(#[from] zbus::Error),

    /// The reply decoded on the wire, but not into a shape this client
    /// understands.
    #[error("malformed reply from story service: {0}")]
    MalformedReply(String),
}

/// The typed contract of the remote story service.
///
/// `launch`, `choose`, and `output` return replies already grouped into
/// paragraphs (see [`group_paragraphs`]). The sequencer depends on this
/// trait alone, never on the transport behind it.
pub trait StoryService {
    /// Start the script at `path` from the beginning and return its opening
    /// output. The path is validated by the service, not here.
    fn launch(&mut self, path: &str) -> Result<Vec<String>, StoryError>;

    /// Select option `option` (0-based, as previously listed by [`options`])
    /// and return the output that follows. Out-of-range indices are
    /// forwarded as-is; the service is the validator.
    ///
    /// [`options`]: StoryService::options
    fn choose(&mut self, option: u32) -> Result<Vec<String>, StoryError>;

    /// Re-read the current output without advancing the story.
    fn output(&mut self) -> Result<Vec<String>, StoryError>;

    /// The currently valid choice labels; empty mid-narration or at the end.
    fn options(&mut self) -> Result<Vec<String>, StoryError>;

    /// Whether the story has reached a terminal state.
    fn finished(&mut self) -> Result<bool, StoryError>;

    /// Restart the current story from the beginning.
    fn reset(&mut self) -> Result<(), StoryError>;
}

/// Group raw reply lines into display paragraphs.
///
/// Consecutive non-blank lines are joined with `\n`. A blank line (empty or
/// all-whitespace) closes the current group — pushed even when empty — and
/// the final accumulator is always pushed after the scan, so a reply with no
/// trailing blank still yields its last paragraph and a fully blank reply
/// yields empty groups.
pub fn group_paragraphs<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut groups = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            groups.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    groups.push(current.join("\n"));

    groups
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::group_paragraphs;

    #[test]
    fn grouping_is_deterministic() {
        let lines = ["one", "", "  ", "two", "three", ""];
        assert_eq!(group_paragraphs(&lines), group_paragraphs(&lines));
    }

    #[test]
    fn unseparated_lines_form_one_paragraph() {
        let lines = ["It was a dark", "and stormy night."];
        assert_eq!(
            group_paragraphs(&lines),
            vec!["It was a dark\nand stormy night."]
        );
    }

    #[test]
    fn blank_lines_split_paragraphs() {
        assert_eq!(group_paragraphs(&["a", "", "b"]), vec!["a", "b"]);
    }

    #[test]
    fn whitespace_only_lines_are_separators() {
        assert_eq!(group_paragraphs(&["a", " \t ", "b"]), vec!["a", "b"]);
    }

    #[test]
    fn trailing_blank_yields_empty_final_group() {
        assert_eq!(group_paragraphs(&["a", ""]), vec!["a", ""]);
    }

    #[test]
    fn all_blank_input_yields_two_empty_groups() {
        assert_eq!(group_paragraphs(&[""]), vec!["", ""]);
    }

    #[test]
    fn single_line_yields_single_group() {
        assert_eq!(group_paragraphs(&["only"]), vec!["only"]);
    }

    #[test]
    fn empty_input_yields_one_empty_group() {
        assert_eq!(group_paragraphs::<&str>(&[]), vec![""]);
    }
}
