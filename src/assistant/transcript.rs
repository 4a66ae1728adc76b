//! Append-only conversation transcript.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use super::prompt::GREETING;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// A transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Sequence number of the question this entry belongs to; 0 is the greeting
    pub seq: u64,
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Question/answer history for one session.
///
/// Questions are numbered on arrival. Answers carry their question's number,
/// so an answer that lands late is shown next to its question instead of
/// after newer exchanges.
pub struct Transcript {
    messages: Mutex<Vec<Message>>,
    next_seq: AtomicU64,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// A transcript holding only the greeting.
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(vec![Message {
                seq: 0,
                speaker: Speaker::Assistant,
                text: GREETING.to_string(),
                at: Utc::now(),
            }]),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Record a question. Blank questions are ignored and get no number.
    pub fn ask(&self, question: &str) -> Option<u64> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.messages.lock().push(Message {
            seq,
            speaker: Speaker::User,
            text: question.to_string(),
            at: Utc::now(),
        });
        Some(seq)
    }

    /// Record the answer to question `seq`.
    pub fn answer(&self, seq: u64, text: impl Into<String>) {
        self.messages.lock().push(Message {
            seq,
            speaker: Speaker::Assistant,
            text: text.into(),
            at: Utc::now(),
        });
    }

    /// All messages in display order: by question number, question first.
    pub fn messages(&self) -> Vec<Message> {
        let mut messages = self.messages.lock().clone();
        // Stable sort keeps arrival order within a question
        messages.sort_by_key(|m| (m.seq, m.speaker == Speaker::Assistant && m.seq != 0));
        messages
    }

    /// The answer recorded for question `seq`, if any.
    pub fn answer_for(&self, seq: u64) -> Option<Message> {
        self.messages
            .lock()
            .iter()
            .find(|m| m.seq == seq && m.speaker == Speaker::Assistant)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_greeting() {
        let transcript = Transcript::new();
        let messages = transcript.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].speaker, Speaker::Assistant);
        assert_eq!(messages[0].text, GREETING);
    }

    #[test]
    fn test_blank_questions_ignored() {
        let transcript = Transcript::new();
        assert_eq!(transcript.ask("   "), None);
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let transcript = Transcript::new();
        assert_eq!(transcript.ask("one"), Some(1));
        assert_eq!(transcript.ask("two"), Some(2));
    }

    #[test]
    fn test_late_answer_stays_with_its_question() {
        let transcript = Transcript::new();
        let first = transcript.ask("first").unwrap();
        let second = transcript.ask("second").unwrap();
        transcript.answer(second, "answer two");
        transcript.answer(first, "answer one");

        let texts: Vec<_> = transcript.messages().into_iter().map(|m| m.text).collect();
        assert_eq!(texts[1..], ["first", "answer one", "second", "answer two"]);
        assert_eq!(transcript.answer_for(first).unwrap().text, "answer one");
        assert!(transcript.answer_for(99).is_none());
    }
}
