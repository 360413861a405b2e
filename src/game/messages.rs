//! In-game message log.

use crate::game::{colour, Rgb};
use serde::{Deserialize, Serialize};

/// One log line, possibly standing for several identical consecutive messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub plain_text: String,
    pub fg: Rgb,
    pub count: u32,
}

impl Message {
    pub fn new(text: impl Into<String>, fg: Rgb) -> Self {
        Self {
            plain_text: text.into(),
            fg,
            count: 1,
        }
    }

    /// Text with a repeat suffix such as `(x3)`.
    pub fn full_text(&self) -> String {
        if self.count > 1 {
            format!("{} (x{})", self.plain_text, self.count)
        } else {
            self.plain_text.clone()
        }
    }
}

/// Ordered list of messages shown to the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `text`, or bumps the repeat counter of the last line when
    /// `stack` is set and the text is identical.
    pub fn add_message(&mut self, text: impl Into<String>, fg: Rgb, stack: bool) {
        let text = text.into();
        match self.messages.last_mut() {
            Some(last) if stack && last.plain_text == text => last.count += 1,
            _ => self.messages.push(Message::new(text, fg)),
        }
    }

    /// Stacking add in the default colour.
    pub fn log(&mut self, text: impl Into<String>) {
        self.add_message(text, colour::WHITE, true);
    }

    /// Stacking add in `fg`.
    pub fn log_coloured(&mut self, text: impl Into<String>, fg: Rgb) {
        self.add_message(text, fg, true);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The newest `count` messages, oldest first.
    pub fn recent(&self, count: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(count);
        &self.messages[start..]
    }

    /// A page of history counted back from the newest message.
    ///
    /// Page 0 is the newest `page_size` messages; each further page is older.
    pub fn history_page(&self, page: usize, page_size: usize) -> &[Message] {
        let page_size = page_size.max(1);
        let end = self
            .messages
            .len()
            .saturating_sub(page.saturating_mul(page_size));
        let start = end.saturating_sub(page_size);
        &self.messages[start..end]
    }
}

/// Word wrap to `width` columns. Words longer than a line are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    textwrap::wrap(text, width.max(1))
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_messages_stack() {
        let mut log = MessageLog::new();
        log.log("That way is blocked.");
        log.log("That way is blocked.");
        log.log("That way is blocked.");
        assert_eq!(log.len(), 1);
        assert_eq!(log.messages()[0].full_text(), "That way is blocked. (x3)");
    }

    #[test]
    fn test_stack_false_appends() {
        let mut log = MessageLog::new();
        log.add_message("Hi", colour::WHITE, false);
        log.add_message("Hi", colour::WHITE, false);
        assert_eq!(log.len(), 2);
        assert_eq!(log.messages()[1].full_text(), "Hi");
    }

    #[test]
    fn test_stacking_keeps_first_colour() {
        let mut log = MessageLog::new();
        log.log_coloured("Ouch", colour::ENEMY_ATK);
        log.log_coloured("Ouch", colour::PLAYER_ATK);
        assert_eq!(log.last().map(|m| m.fg), Some(colour::ENEMY_ATK));
    }

    #[test]
    fn test_history_pages() {
        let mut log = MessageLog::new();
        for index in 0..7 {
            log.log(format!("message {index}"));
        }
        let newest: Vec<_> = log.history_page(0, 3).iter().map(|m| m.plain_text.as_str()).collect();
        assert_eq!(newest, vec!["message 4", "message 5", "message 6"]);
        assert_eq!(log.history_page(2, 3).len(), 1);
        assert!(log.history_page(5, 3).is_empty());
        assert_eq!(log.recent(2).len(), 2);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(
            wrap("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap("", 5).is_empty());
        assert_eq!(wrap("first\nsecond line", 20), vec!["first", "second line"]);
    }
}
