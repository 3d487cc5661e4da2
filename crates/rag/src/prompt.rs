//! Prompt assembly for grounded answers.
//!
//! A chat prompt is laid out as:
//!
//! 1. **System**: fixed grounding instruction
//! 2. **History**: the recent turns, each a user message then an assistant message
//! 3. **User**: retrieved passages, then the new message
//!
//! A one-shot question prompt has no history and a stricter instruction.

use ragdock_config::HistoryOrder;
use ragdock_core::message::Message;

use crate::session::Turn;

pub const CHAT_SYSTEM_PROMPT: &str = "Be helpful. Prefer grounded answers using CONTEXT.";

pub const QUERY_SYSTEM_PROMPT: &str = "You are a concise assistant. Use the provided CONTEXT to answer. \
If the answer is not in context, say you don't know and suggest next steps.";

/// Separator placed between retrieved passages.
pub const PASSAGE_DELIMITER: &str = "\n---\n";

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptAssembler {
    history_order: HistoryOrder,
}

impl PromptAssembler {
    pub fn new(history_order: HistoryOrder) -> Self {
        Self { history_order }
    }

    /// Messages for a chat turn. `history` is oldest first and already
    /// limited to the window that should be shown.
    pub fn build_chat_messages(
        &self,
        history: &[Turn],
        message: &str,
        passages: &[String],
    ) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2 + history.len() * 2);
        messages.push(Message::system(CHAT_SYSTEM_PROMPT));

        let push_turn = |messages: &mut Vec<Message>, turn: &Turn| {
            messages.push(Message::user(turn.user.as_str()));
            messages.push(Message::assistant(turn.assistant.as_str()));
        };
        match self.history_order {
            HistoryOrder::Chronological => {
                for turn in history {
                    push_turn(&mut messages, turn);
                }
            }
            HistoryOrder::MostRecentFirst => {
                for turn in history.iter().rev() {
                    push_turn(&mut messages, turn);
                }
            }
        }

        messages.push(Message::user(format!(
            "CONTEXT:\n{}\n\nUSER: {message}",
            passages.join(PASSAGE_DELIMITER)
        )));
        messages
    }

    /// Messages for a one-shot question.
    pub fn build_query_messages(&self, question: &str, passages: &[String]) -> Vec<Message> {
        vec![
            Message::system(QUERY_SYSTEM_PROMPT),
            Message::user(format!(
                "CONTEXT:\n{}\n\nQUESTION: {question}",
                passages.join(PASSAGE_DELIMITER)
            )),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragdock_core::message::Role;

    fn turns(n: usize) -> Vec<Turn> {
        (0..n)
            .map(|i| Turn::new(format!("q{i}"), format!("a{i}")))
            .collect()
    }

    fn contents(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn chat_layout_chronological() {
        let assembler = PromptAssembler::default();
        let messages = assembler.build_chat_messages(
            &turns(2),
            "and now?",
            &["doc one".to_string(), "memory".to_string()],
        );

        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, CHAT_SYSTEM_PROMPT);
        assert_eq!(contents(&messages[1..5]), vec!["q0", "a0", "q1", "a1"]);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[5].role, Role::User);
        assert_eq!(
            messages[5].content,
            "CONTEXT:\ndoc one\n---\nmemory\n\nUSER: and now?"
        );
    }

    #[test]
    fn chat_layout_most_recent_first_keeps_pairs() {
        let assembler = PromptAssembler::new(HistoryOrder::MostRecentFirst);
        let messages = assembler.build_chat_messages(&turns(3), "x", &[]);
        assert_eq!(
            contents(&messages[1..7]),
            vec!["q2", "a2", "q1", "a1", "q0", "a0"]
        );
    }

    #[test]
    fn chat_without_history_or_context() {
        let messages = PromptAssembler::default().build_chat_messages(&[], "hi", &[]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "CONTEXT:\n\n\nUSER: hi");
    }

    #[test]
    fn query_layout() {
        let messages = PromptAssembler::default()
            .build_query_messages("What is X?", &["X is a letter.".to_string()]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.starts_with("You are a concise assistant."));
        assert!(messages[0].content.ends_with("suggest next steps."));
        assert_eq!(
            messages[1].content,
            "CONTEXT:\nX is a letter.\n\nQUESTION: What is X?"
        );
    }
}
