//! Bounded conversation memory for interactive sessions.

use std::collections::VecDeque;

/// One question and the answer it got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

/// The most recent exchanges of a session, oldest first.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    exchanges: VecDeque<Exchange>,
    max_exchanges: usize,
}

impl ConversationHistory {
    /// Keep at most `max_exchanges` exchanges. Zero keeps nothing.
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            exchanges: VecDeque::with_capacity(max_exchanges),
            max_exchanges,
        }
    }

    /// Record an exchange, dropping the oldest beyond the limit.
    pub fn add_exchange(&mut self, question: &str, answer: &str) {
        if self.max_exchanges == 0 {
            return;
        }
        self.exchanges.push_back(Exchange {
            question: question.to_string(),
            answer: answer.to_string(),
        });
        while self.exchanges.len() > self.max_exchanges {
            self.exchanges.pop_front();
        }
    }

    /// Prior conversation as `User:` / `Assistant:` lines, or `None` when empty.
    pub fn render(&self) -> Option<String> {
        if self.exchanges.is_empty() {
            return None;
        }

        let lines: Vec<String> = self
            .exchanges
            .iter()
            .flat_map(|e| {
                [
                    format!("User: {}", e.question),
                    format!("Assistant: {}", e.answer),
                ]
            })
            .collect();
        Some(lines.join("\n"))
    }

    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty() {
        assert_eq!(ConversationHistory::new(2).render(), None);
    }

    #[test]
    fn test_keeps_most_recent() {
        let mut history = ConversationHistory::new(2);
        history.add_exchange("q1", "a1");
        history.add_exchange("q2", "a2");
        history.add_exchange("q3", "a3");

        assert_eq!(history.len(), 2);
        assert_eq!(
            history.render().unwrap(),
            "User: q2\nAssistant: a2\nUser: q3\nAssistant: a3"
        );
    }

    #[test]
    fn test_zero_limit_and_clear() {
        let mut none = ConversationHistory::new(0);
        none.add_exchange("q", "a");
        assert!(none.is_empty());

        let mut history = ConversationHistory::new(3);
        history.add_exchange("q", "a");
        history.clear();
        assert!(history.render().is_none());
    }
}
