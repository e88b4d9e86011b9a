use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use layerstack::config::{CommandTable, LayerAction};

/// Check for escape key (Esc or Ctrl+[)
pub fn is_escape(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('[') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Result of processing a key through the buffer
#[derive(Debug, PartialEq)]
pub enum KeyBufferResult {
    /// A sequence matched, execute this action `count` times
    Action(LayerAction, usize),
    /// Waiting for more keys (buffer is a valid prefix)
    Pending,
    /// No sequence matched, process this key normally
    Fallthrough(KeyEvent),
}

/// Buffer for accumulating multi-key sequences with optional count prefix
pub struct KeyBuffer {
    keys: Vec<char>,
    count: Option<usize>,
    last_key_time: Instant,
    timeout: Duration,
}

impl KeyBuffer {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            count: None,
            last_key_time: Instant::now(),
            timeout: Duration::from_millis(1000),
        }
    }

    /// Process a key event, returning what action to take
    pub fn process(&mut self, key: KeyEvent, commands: &CommandTable) -> KeyBufferResult {
        // Clear buffer if too much time has passed since last key
        if self.last_key_time.elapsed() > self.timeout {
            self.clear();
        }

        // Only buffer character keys (no modifiers except shift)
        let c = match key.code {
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => c,
            _ => {
                self.clear();
                return KeyBufferResult::Fallthrough(key);
            }
        };

        self.last_key_time = Instant::now();

        if self.keys.is_empty() {
            if let Some(digit) = c.to_digit(10).filter(|d| *d > 0 || self.count.is_some()) {
                self.count = Some(self.count.unwrap_or(0) * 10 + digit as usize);
                return KeyBufferResult::Pending;
            }
        }

        self.keys.push(c);

        if let Some(action) = commands.match_sequence(&self.keys) {
            let count = self.take_count();
            self.keys.clear();
            return KeyBufferResult::Action(action, count);
        }

        if commands.is_prefix(&self.keys) {
            return KeyBufferResult::Pending;
        }

        self.clear();
        KeyBufferResult::Fallthrough(key)
    }

    /// Clear the buffer (e.g., on mode change)
    pub fn clear(&mut self) {
        self.keys.clear();
        self.count = None;
    }

    /// Pending keys, for the status bar
    pub fn display(&self) -> String {
        let count = self.count.map(|c| c.to_string()).unwrap_or_default();
        let keys: String = self.keys.iter().collect();
        format!("{}{}", count, keys)
    }

    fn take_count(&mut self) -> usize {
        self.count.take().unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_single_key_action() {
        let commands = CommandTable::default();
        let mut buffer = KeyBuffer::new();
        assert_eq!(
            buffer.process(key(']'), &commands),
            KeyBufferResult::Action(LayerAction::MoveForward, 1)
        );
    }

    #[test]
    fn test_two_key_sequence() {
        let commands = CommandTable::default();
        let mut buffer = KeyBuffer::new();
        assert_eq!(buffer.process(key('d'), &commands), KeyBufferResult::Pending);
        assert_eq!(buffer.display(), "d");
        assert_eq!(
            buffer.process(key('d'), &commands),
            KeyBufferResult::Action(LayerAction::DeleteSelected, 1)
        );
        assert_eq!(buffer.display(), "");
    }

    #[test]
    fn test_count_prefix() {
        let commands = CommandTable::default();
        let mut buffer = KeyBuffer::new();
        assert_eq!(buffer.process(key('1'), &commands), KeyBufferResult::Pending);
        assert_eq!(buffer.process(key('2'), &commands), KeyBufferResult::Pending);
        assert_eq!(
            buffer.process(key('['), &commands),
            KeyBufferResult::Action(LayerAction::MoveBackward, 12)
        );
    }

    #[test]
    fn test_unknown_key_falls_through() {
        let commands = CommandTable::default();
        let mut buffer = KeyBuffer::new();
        assert_eq!(buffer.process(key('z'), &commands), KeyBufferResult::Fallthrough(key('z')));
        assert_eq!(buffer.process(key('d'), &commands), KeyBufferResult::Pending);
        assert_eq!(buffer.process(key('x'), &commands), KeyBufferResult::Fallthrough(key('x')));
        assert_eq!(buffer.display(), "");
    }

    #[test]
    fn test_control_keys_fall_through() {
        let commands = CommandTable::default();
        let mut buffer = KeyBuffer::new();
        let redo = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(buffer.process(redo, &commands), KeyBufferResult::Fallthrough(redo));
    }

    #[test]
    fn test_escape_detection() {
        assert!(is_escape(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_escape(KeyEvent::new(KeyCode::Char('['), KeyModifiers::CONTROL)));
        assert!(!is_escape(key('[')));
    }
}
