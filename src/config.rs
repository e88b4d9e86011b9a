use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::Level;

use crate::error::ConfigError;
use crate::history::DEFAULT_CAPACITY;

/// Key presses that make up one command in the layers panel
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum KeySequence {
    Zero,
    One(char),
    Two(char, char),
}

impl KeySequence {
    pub fn from_chars(keys: &[char]) -> Self {
        match keys {
            [] => KeySequence::Zero,
            [a] => KeySequence::One(*a),
            [a, b, ..] => KeySequence::Two(*a, *b),
        }
    }

    pub fn first(&self) -> Option<char> {
        match self {
            KeySequence::Zero => None,
            KeySequence::One(a) | KeySequence::Two(a, _) => Some(*a),
        }
    }
}

/// Everything the layers panel can ask of the layer stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerAction {
    CursorDown,
    CursorUp,
    ToggleSelect,
    SelectAll,
    ClearSelection,
    /// Add a layer where the settings say new layers go
    AddLayer,
    /// Add a layer at the other end of the stack
    AddLayerOpposite,
    DeleteSelected,
    DuplicateSelected,
    Undo,
    Redo,
    MoveForward,
    MoveBackward,
    BringToFront,
    SendToBack,
    Nudge,
    Rename,
    Quit,
}

pub struct CommandTable {
    map: HashMap<KeySequence, LayerAction>,
}

impl CommandTable {
    pub fn new(map: HashMap<KeySequence, LayerAction>) -> Self {
        Self { map }
    }

    pub fn get(&self, seq: KeySequence) -> Option<LayerAction> {
        self.map.get(&seq).copied()
    }

    pub fn match_sequence(&self, keys: &[char]) -> Option<LayerAction> {
        self.get(KeySequence::from_chars(keys))
    }

    /// `keys` could still grow into a two-key sequence
    pub fn is_prefix(&self, keys: &[char]) -> bool {
        match keys {
            [c] => self
                .map
                .keys()
                .any(|seq| matches!(seq, KeySequence::Two(..)) && seq.first() == Some(*c)),
            _ => false,
        }
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self {
            map: HashMap::from([
                (KeySequence::One('j'), LayerAction::CursorDown),
                (KeySequence::One('k'), LayerAction::CursorUp),
                (KeySequence::One(' '), LayerAction::ToggleSelect),
                (KeySequence::Two('v', 'a'), LayerAction::SelectAll),
                (KeySequence::Two('v', 'n'), LayerAction::ClearSelection),
                (KeySequence::One('a'), LayerAction::AddLayer),
                (KeySequence::One('A'), LayerAction::AddLayerOpposite),
                (KeySequence::Two('d', 'd'), LayerAction::DeleteSelected),
                (KeySequence::Two('y', 'y'), LayerAction::DuplicateSelected),
                (KeySequence::One('u'), LayerAction::Undo),
                (KeySequence::One('U'), LayerAction::Redo),
                (KeySequence::One(']'), LayerAction::MoveForward),
                (KeySequence::One('['), LayerAction::MoveBackward),
                (KeySequence::One('}'), LayerAction::BringToFront),
                (KeySequence::One('{'), LayerAction::SendToBack),
                (KeySequence::One('m'), LayerAction::Nudge),
                (KeySequence::One('r'), LayerAction::Rename),
                (KeySequence::One('q'), LayerAction::Quit),
            ]),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Level {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Settings read from a TOML file. Missing keys fall back to defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Most history entries kept for undo
    pub history_capacity: usize,
    pub log_level: LogLevel,
    /// New layers go on top of the stack instead of underneath
    pub new_layers_at_front: bool,
    /// Distance one nudge key moves the selection
    pub nudge_step: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            log_level: LogLevel::Warn,
            new_layers_at_front: true,
            nudge_step: 1.0,
        }
    }
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        if !self.nudge_step.is_finite() || self.nudge_step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "nudge_step must be a positive number, got {}",
                self.nudge_step
            )));
        }
        Ok(())
    }
}

pub struct AppConfig {
    pub commands: CommandTable,
    pub settings: Settings,
}

impl AppConfig {
    pub fn new(settings: Settings) -> Self {
        Self {
            commands: CommandTable::default(),
            settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_key_sequence_from_chars() {
        assert_eq!(KeySequence::from_chars(&[]), KeySequence::Zero);
        assert_eq!(KeySequence::from_chars(&['j']), KeySequence::One('j'));
        assert_eq!(KeySequence::from_chars(&['d', 'd']), KeySequence::Two('d', 'd'));
    }

    #[test]
    fn test_default_commands() {
        let table = CommandTable::default();
        assert_eq!(table.match_sequence(&[']']), Some(LayerAction::MoveForward));
        assert_eq!(table.match_sequence(&['d', 'd']), Some(LayerAction::DeleteSelected));
        assert_eq!(table.match_sequence(&['d']), None);
        assert!(table.is_prefix(&['d']));
        assert!(table.is_prefix(&['v']));
        assert!(!table.is_prefix(&['j']));
        assert!(!table.is_prefix(&['d', 'x']));
    }

    #[test]
    fn test_settings_defaults_fill_missing_keys() {
        let settings = Settings::from_toml("log_level = \"debug\"").unwrap();
        assert_eq!(settings.log_level, LogLevel::Debug);
        assert_eq!(settings.history_capacity, DEFAULT_CAPACITY);
        assert!(settings.new_layers_at_front);
        assert_eq!(Level::from(settings.log_level), Level::DEBUG);
    }

    #[test]
    fn test_settings_reject_zero_capacity() {
        let err = Settings::from_toml("history_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_settings_reject_bad_nudge_step() {
        let err = Settings::from_toml("nudge_step = -2.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_settings_parse_error() {
        let err = Settings::from_toml("history_capacity = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_settings_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "history_capacity = 5").unwrap();
        writeln!(file, "new_layers_at_front = false").unwrap();
        writeln!(file, "nudge_step = 4.5").unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.history_capacity, 5);
        assert!(!settings.new_layers_at_front);
        assert_eq!(settings.nudge_step, 4.5);
        assert_eq!(settings.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_settings_missing_file() {
        let err = Settings::from_file(Path::new("/nonexistent/layerstack.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
