//! One-message-at-a-time presentation of grouped story output.
//!
//! The sequencer owns two pieces of state: the queue of paragraphs still
//! waiting to be shown, and the single message currently on screen. User
//! events drive it forward; a choice round-trips through the remote service
//! and replaces the queue with the reply.

use std::collections::VecDeque;

use super::{StoryError, StoryService};

/// The message currently on screen and how it should be rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    /// A paragraph with a plain "continue" affordance.
    Advance { text: String },
    /// The final paragraph of a batch, offering branch choices.
    Choice { text: String, options: Vec<String> },
}

impl Message {
    /// The paragraph text, whichever way the message renders.
    pub fn text(&self) -> &str {
        match self {
            Message::Advance { text } => text,
            Message::Choice { text, .. } => text,
        }
    }
}

/// Drives one-at-a-time display of paragraph batches.
///
/// At most one message is ever live; it is dropped before its successor is
/// created. Choices are offered only on the last paragraph of a batch, and
/// only when the service reported a non-empty option set for it.
#[derive(Debug, Default)]
pub struct Sequencer {
    queue: VecDeque<String>,
    options: Vec<String>,
    current: Option<Message>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The message currently on screen, if any.
    pub fn current(&self) -> Option<&Message> {
        self.current.as_ref()
    }

    /// `true` when nothing is displayed and nothing is queued.
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Paragraphs still queued behind the current message.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Replace the queue with a fresh batch and show its first paragraph.
    ///
    /// Any previous queue contents and the current message are discarded.
    /// Blank groups are paragraph separators, not content, and are not
    /// enqueued. An empty batch leaves the sequencer idle.
    pub fn start_sequence(&mut self, groups: Vec<String>, options: Vec<String>) {
        self.queue = groups.into_iter().filter(|g| !g.is_empty()).collect();
        self.options = options;
        self.current = None;
        self.advance();
    }

    /// Pop the next paragraph into the display slot, or go idle.
    fn advance(&mut self) {
        self.current = self.queue.pop_front().map(|text| {
            if self.queue.is_empty() && !self.options.is_empty() {
                Message::Choice {
                    text,
                    options: self.options.clone(),
                }
            } else {
                Message::Advance { text }
            }
        });
    }

    /// The user dismissed the current message; show the next one, if any.
    pub fn user_advance(&mut self) {
        self.current = None;
        self.advance();
    }

    /// Start the script at `path` and present its opening batch.
    pub fn user_launch(
        &mut self,
        service: &mut dyn StoryService,
        path: &str,
    ) -> Result<(), StoryError> {
        let groups = service.launch(path)?;
        let options = service.options()?;
        self.start_sequence(groups, options);
        Ok(())
    }

    /// Feed the chosen option back to the service and present the reply.
    ///
    /// Both remote calls complete before any state changes, so a failure
    /// leaves the queue and the current message exactly as they were.
    pub fn user_choose(
        &mut self,
        service: &mut dyn StoryService,
        option: u32,
    ) -> Result<(), StoryError> {
        let groups = service.choose(option)?;
        let options = service.options()?;
        self.start_sequence(groups, options);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use pretty_assertions::assert_eq;

    use super::{Message, Sequencer};
    use crate::story::{StoryError, StoryService, group_paragraphs};

    /// Scripted stand-in for the remote service: each `launch`/`choose`
    /// pops the next canned raw reply, groups it like the real client, and
    /// records the call for ordering assertions.
    #[derive(Default)]
    struct ScriptedService {
        launch_replies: VecDeque<Result<Vec<String>, StoryError>>,
        choose_replies: VecDeque<Result<Vec<String>, StoryError>>,
        options_reply: Vec<String>,
        calls: Vec<String>,
    }

    impl ScriptedService {
        fn offline_error() -> StoryError {
            StoryError::MalformedReply("service offline".to_string())
        }

        fn raw(lines: &[&str]) -> Result<Vec<String>, StoryError> {
            Ok(lines.iter().map(|l| l.to_string()).collect())
        }
    }

    impl StoryService for ScriptedService {
        fn launch(&mut self, path: &str) -> Result<Vec<String>, StoryError> {
            self.calls.push(format!("launch {path}"));
            let reply = self
                .launch_replies
                .pop_front()
                .unwrap_or_else(|| Err(Self::offline_error()));
            reply.map(|lines| group_paragraphs(&lines))
        }

        fn choose(&mut self, option: u32) -> Result<Vec<String>, StoryError> {
            self.calls.push(format!("choose {option}"));
            let reply = self
                .choose_replies
                .pop_front()
                .unwrap_or_else(|| Err(Self::offline_error()));
            reply.map(|lines| group_paragraphs(&lines))
        }

        fn output(&mut self) -> Result<Vec<String>, StoryError> {
            self.calls.push("output".to_string());
            Ok(Vec::new())
        }

        fn options(&mut self) -> Result<Vec<String>, StoryError> {
            self.calls.push("options".to_string());
            Ok(self.options_reply.clone())
        }

        fn finished(&mut self) -> Result<bool, StoryError> {
            self.calls.push("finished".to_string());
            Ok(false)
        }

        fn reset(&mut self) -> Result<(), StoryError> {
            self.calls.push("reset".to_string());
            Ok(())
        }
    }

    #[test]
    fn empty_batch_leaves_sequencer_idle() {
        let mut sequencer = Sequencer::new();
        sequencer.start_sequence(Vec::new(), vec!["Yes".to_string()]);

        assert!(sequencer.is_idle());
        assert_eq!(sequencer.current(), None);
    }

    #[test]
    fn options_are_offered_only_on_the_last_paragraph() {
        let mut sequencer = Sequencer::new();
        sequencer.start_sequence(
            vec!["first".to_string(), "last".to_string()],
            vec!["Yes".to_string(), "No".to_string()],
        );

        // Not the last paragraph: advance affordance even though options
        // accompany the batch.
        assert_eq!(
            sequencer.current(),
            Some(&Message::Advance {
                text: "first".to_string()
            })
        );

        sequencer.user_advance();
        assert_eq!(
            sequencer.current(),
            Some(&Message::Choice {
                text: "last".to_string(),
                options: vec!["Yes".to_string(), "No".to_string()],
            })
        );
    }

    #[test]
    fn empty_option_set_never_offers_a_choice() {
        let mut sequencer = Sequencer::new();
        sequencer.start_sequence(vec!["only".to_string()], Vec::new());

        assert_eq!(
            sequencer.current(),
            Some(&Message::Advance {
                text: "only".to_string()
            })
        );

        sequencer.user_advance();
        assert!(sequencer.is_idle());
    }

    #[test]
    fn launch_presents_paragraphs_one_at_a_time() {
        let mut service = ScriptedService::default();
        service
            .launch_replies
            .push_back(ScriptedService::raw(&["Hello.", "", "World.", ""]));

        let mut sequencer = Sequencer::new();
        sequencer
            .user_launch(&mut service, "/tmp/basic.ink")
            .unwrap();

        assert_eq!(
            sequencer.current(),
            Some(&Message::Advance {
                text: "Hello.".to_string()
            })
        );

        sequencer.user_advance();
        assert_eq!(
            sequencer.current(),
            Some(&Message::Advance {
                text: "World.".to_string()
            })
        );

        sequencer.user_advance();
        assert!(sequencer.is_idle());
    }

    #[test]
    fn choice_round_trips_through_the_service() {
        let mut service = ScriptedService::default();
        service
            .launch_replies
            .push_back(ScriptedService::raw(&["Pick one:"]));
        service
            .choose_replies
            .push_back(ScriptedService::raw(&["You said no."]));
        service.options_reply = vec!["Yes".to_string(), "No".to_string()];

        let mut sequencer = Sequencer::new();
        sequencer
            .user_launch(&mut service, "/tmp/choice.ink")
            .unwrap();

        assert_eq!(
            sequencer.current(),
            Some(&Message::Choice {
                text: "Pick one:".to_string(),
                options: vec!["Yes".to_string(), "No".to_string()],
            })
        );

        service.options_reply = Vec::new();
        sequencer.user_choose(&mut service, 1).unwrap();

        assert_eq!(
            sequencer.current(),
            Some(&Message::Advance {
                text: "You said no.".to_string()
            })
        );

        assert_eq!(
            service.calls,
            vec![
                "launch /tmp/choice.ink",
                "options",
                "choose 1",
                "options"
            ]
        );
    }

    #[test]
    fn one_user_event_issues_at_most_one_mutating_call() {
        let mut service = ScriptedService::default();
        service
            .choose_replies
            .push_back(ScriptedService::raw(&["next"]));

        let mut sequencer = Sequencer::new();
        sequencer.start_sequence(vec!["prompt".to_string()], vec!["Go".to_string()]);
        sequencer.user_choose(&mut service, 0).unwrap();

        let mutating = service
            .calls
            .iter()
            .filter(|call| call.starts_with("choose") || call.starts_with("launch"))
            .count();
        assert_eq!(mutating, 1);
    }

    #[test]
    fn failed_choice_leaves_state_untouched() {
        let mut service = ScriptedService::default();
        service
            .choose_replies
            .push_back(Err(ScriptedService::offline_error()));

        let mut sequencer = Sequencer::new();
        sequencer.start_sequence(
            vec!["kept".to_string(), "also kept".to_string()],
            vec!["Stay".to_string()],
        );
        let before = sequencer.current().cloned();
        let queued = sequencer.remaining();

        let result = sequencer.user_choose(&mut service, 0);

        assert!(result.is_err());
        assert_eq!(sequencer.current(), before.as_ref());
        assert_eq!(sequencer.remaining(), queued);
        // The failed call never reached the follow-up options() fetch.
        assert_eq!(service.calls, vec!["choose 0"]);
    }

    #[test]
    fn failed_launch_leaves_sequencer_idle() {
        let mut service = ScriptedService::default();
        service
            .launch_replies
            .push_back(Err(ScriptedService::offline_error()));

        let mut sequencer = Sequencer::new();
        let result = sequencer.user_launch(&mut service, "/tmp/missing.ink");

        assert!(result.is_err());
        assert!(sequencer.is_idle());
    }

    #[test]
    fn new_batch_discards_the_old_queue() {
        let mut sequencer = Sequencer::new();
        sequencer.start_sequence(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            Vec::new(),
        );
        assert_eq!(sequencer.remaining(), 2);

        sequencer.start_sequence(vec!["fresh".to_string()], Vec::new());
        assert_eq!(sequencer.remaining(), 0);
        assert_eq!(
            sequencer.current(),
            Some(&Message::Advance {
                text: "fresh".to_string()
            })
        );
    }

    #[test]
    fn blank_groups_are_not_displayed() {
        let mut sequencer = Sequencer::new();
        sequencer.start_sequence(group_paragraphs(&["", ""]), Vec::new());
        assert!(sequencer.is_idle());
    }
}
