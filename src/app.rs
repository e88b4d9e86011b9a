use std::io;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyModifiers};
use rand::Rng;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use layerstack::config::{AppConfig, LayerAction};
use layerstack::{HistoryResult, Layer, LayerId, LayerKind, LayerStack, Staging};

use crate::input::{is_escape, KeyBuffer, KeyBufferResult};
use crate::mode::Mode;
use crate::ui;

pub struct App {
    pub stack: LayerStack,
    pub config: AppConfig,
    pub mode: Mode,
    /// Row under the cursor; row 0 is the front of the stack
    pub cursor: usize,
    pub message: Option<String>,
    pub should_quit: bool,
    pub rename_buffer: String,
    rename_target: Option<LayerId>,
    key_buffer: KeyBuffer,
}

impl App {
    pub fn new(stack: LayerStack, config: AppConfig) -> Self {
        Self {
            stack,
            config,
            mode: Mode::Normal,
            cursor: 0,
            message: None,
            should_quit: false,
            rename_buffer: String::new(),
            rename_target: None,
            key_buffer: KeyBuffer::new(),
        }
    }

    pub fn key_buffer_display(&self) -> String {
        self.key_buffer.display()
    }

    /// Layers in display order, front first
    pub fn rows(&self) -> impl Iterator<Item = &Layer> {
        self.stack.layers().iter().rev().map(|layer| layer.as_ref())
    }

    /// Layer shown at the cursor row
    pub fn cursor_layer(&self) -> Option<&Layer> {
        let len = self.stack.len();
        if self.cursor >= len {
            return None;
        }
        self.stack.layers().get(len - 1 - self.cursor).map(|layer| layer.as_ref())
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        while !self.should_quit {
            terminal.draw(|f| ui::render(f, self))?;

            if poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.message = None;
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    // === Key handling ===

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Nudge => self.handle_nudge_key(key),
            Mode::Rename => self.handle_rename_key(key),
        }
        self.clamp_cursor();
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match self.key_buffer.process(key, &self.config.commands) {
            KeyBufferResult::Action(action, count) => {
                for _ in 0..count {
                    if !self.perform(action) {
                        break;
                    }
                }
            }
            KeyBufferResult::Pending => {}
            KeyBufferResult::Fallthrough(key) => match key.code {
                KeyCode::Char('r') if ctrl => {
                    self.perform(LayerAction::Redo);
                }
                KeyCode::Down => {
                    self.perform(LayerAction::CursorDown);
                }
                KeyCode::Up => {
                    self.perform(LayerAction::CursorUp);
                }
                _ => {}
            },
        }
    }

    /// Run one action. Returns false when the action could not run, so
    /// counted repeats stop early.
    fn perform(&mut self, action: LayerAction) -> bool {
        match action {
            LayerAction::CursorDown => {
                self.cursor += 1;
                true
            }
            LayerAction::CursorUp => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            LayerAction::ToggleSelect => match self.cursor_layer().map(|layer| layer.id) {
                Some(id) => {
                    let result = self.stack.toggle_selected(id);
                    self.report(result, None)
                }
                None => self.refuse("No layer under cursor"),
            },
            LayerAction::SelectAll => {
                let result = self.stack.select_all();
                self.report(result, None)
            }
            LayerAction::ClearSelection => {
                let result = self.stack.clear_selection();
                self.report(result, None)
            }
            LayerAction::AddLayer => self.add_layer(self.config.settings.new_layers_at_front),
            LayerAction::AddLayerOpposite => self.add_layer(!self.config.settings.new_layers_at_front),
            LayerAction::DeleteSelected => {
                if !self.stack.has_selection() {
                    return self.refuse("No layers selected");
                }
                let count = self.stack.selected_count();
                let result = self.stack.delete_selected_layers();
                self.report(result, Some(format!("Deleted {} layer(s)", count)))
            }
            LayerAction::DuplicateSelected => {
                if !self.stack.has_selection() {
                    return self.refuse("No layers selected");
                }
                let count = self.stack.selected_count();
                let result = self.stack.duplicate_selected_layers();
                self.report(result, Some(format!("Duplicated {} layer(s)", count)))
            }
            LayerAction::Undo => {
                if !self.stack.can_undo() {
                    return self.refuse("Nothing to undo");
                }
                let result = self.stack.undo();
                self.report(result, Some("Undo".to_string()))
            }
            LayerAction::Redo => {
                if !self.stack.can_redo() {
                    return self.refuse("Nothing to redo");
                }
                let result = self.stack.redo();
                self.report(result, Some("Redo".to_string()))
            }
            LayerAction::MoveForward => {
                if !self.stack.can_move_layers_forward() {
                    return self.refuse("Cannot move forward");
                }
                let result = self.stack.move_layers_forward().map(|_| ());
                self.report(result, None)
            }
            LayerAction::MoveBackward => {
                if !self.stack.can_move_layers_backward() {
                    return self.refuse("Cannot move backward");
                }
                let result = self.stack.move_layers_backward().map(|_| ());
                self.report(result, None)
            }
            LayerAction::BringToFront => {
                if !self.stack.can_bring_layers_to_front() {
                    return self.refuse("Already at front");
                }
                let result = self.stack.bring_layers_to_front().map(|_| ());
                self.report(result, None)
            }
            LayerAction::SendToBack => {
                if !self.stack.can_send_layers_to_back() {
                    return self.refuse("Already at back");
                }
                let result = self.stack.send_layers_to_back().map(|_| ());
                self.report(result, None)
            }
            LayerAction::Nudge => {
                if !self.stack.has_selection() {
                    return self.refuse("No layers selected");
                }
                self.enter_mode(Mode::Nudge);
                true
            }
            LayerAction::Rename => match self.cursor_layer().map(|layer| (layer.id, layer.name.clone())) {
                Some((id, name)) => {
                    self.rename_target = Some(id);
                    self.rename_buffer = name;
                    self.enter_mode(Mode::Rename);
                    true
                }
                None => self.refuse("No layer under cursor"),
            },
            LayerAction::Quit => {
                self.should_quit = true;
                true
            }
        }
    }

    fn handle_nudge_key(&mut self, key: KeyEvent) {
        if is_escape(key) {
            self.finish_gesture(false);
            return;
        }

        let step = self.config.settings.nudge_step;
        let (dx, dy) = match key.code {
            KeyCode::Left | KeyCode::Char('h') => (-step, 0.0),
            KeyCode::Right | KeyCode::Char('l') => (step, 0.0),
            KeyCode::Up | KeyCode::Char('k') => (0.0, -step),
            KeyCode::Down | KeyCode::Char('j') => (0.0, step),
            KeyCode::Enter => {
                self.finish_gesture(true);
                return;
            }
            _ => return,
        };

        let result = self
            .stack
            .edit_selected_layers(|layer| layer.moved_by(dx, dy), Staging::Virtual);
        self.report(result, None);
    }

    fn handle_rename_key(&mut self, key: KeyEvent) {
        if is_escape(key) {
            self.finish_gesture(false);
            return;
        }

        match key.code {
            KeyCode::Enter => {
                self.finish_gesture(true);
                return;
            }
            KeyCode::Backspace => {
                self.rename_buffer.pop();
            }
            KeyCode::Char(c) => self.rename_buffer.push(c),
            _ => return,
        }

        let Some(id) = self.rename_target else {
            return;
        };
        let name = self.rename_buffer.clone();
        let result = self
            .stack
            .update_layer(id, |layer| layer.renamed(name), Staging::Virtual);
        self.report(result, None);
    }

    // === Helpers ===

    fn enter_mode(&mut self, mode: Mode) {
        self.key_buffer.clear();
        self.mode = mode;
    }

    /// Commit or drop the virtual edits of the current gesture and return to normal mode
    fn finish_gesture(&mut self, commit: bool) {
        let result = match (commit, self.stack.has_pending_changes()) {
            (true, true) => self.stack.commit_virtual_state(),
            (true, false) => Ok(()),
            (false, _) => self.stack.discard_virtual_state(),
        };
        let message = if commit { "Applied" } else { "Cancelled" };
        self.report(result, Some(message.to_string()));
        self.rename_target = None;
        self.rename_buffer.clear();
        self.mode = Mode::Normal;
    }

    fn add_layer(&mut self, at_front: bool) -> bool {
        let layer = self.make_layer();
        let name = layer.name.clone();
        let result = self.stack.add_layer(layer, at_front);
        if result.is_ok() {
            self.cursor = if at_front { 0 } else { self.stack.len() - 1 };
        }
        self.report(result, Some(format!("Added {}", name)))
    }

    /// Fresh layer with a default name: a blank canvas or a random fill
    fn make_layer(&mut self) -> Layer {
        let mut rng = rand::thread_rng();
        if rng.gen_bool(0.5) {
            self.stack.new_layer(256, 256)
        } else {
            let [r, g, b]: [u8; 3] = rng.gen();
            let sequence = self.stack.sequence_mut();
            let id = sequence.next_id();
            let name = sequence.next_name();
            Layer::new(id, name, LayerKind::Fill { color: [r, g, b, 255] })
        }
    }

    /// Surface the outcome of a stack operation. Returns whether it succeeded.
    fn report(&mut self, result: HistoryResult<()>, success: Option<String>) -> bool {
        match result {
            Ok(()) => {
                if let Some(msg) = success {
                    info!(message = %msg);
                    self.message = Some(msg);
                }
                true
            }
            Err(e) => {
                error!(error = %e, "layer operation failed");
                self.message = Some(format!("Error: {}", e));
                false
            }
        }
    }

    fn refuse(&mut self, msg: &str) -> bool {
        self.message = Some(msg.to_string());
        false
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.stack.len().saturating_sub(1));
    }
}
