#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Arrow keys move the selection virtually until Enter or Esc
    Nudge,
    /// Typing renames the cursor layer virtually until Enter or Esc
    Rename,
}

impl Mode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Nudge => "NUDGE",
            Mode::Rename => "RENAME",
        }
    }

    /// Modes that hold an uncommitted gesture
    pub fn is_gesture(&self) -> bool {
        matches!(self, Mode::Nudge | Mode::Rename)
    }
}
