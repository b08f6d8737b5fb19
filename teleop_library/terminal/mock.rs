//! In-memory terminal driven by a key script
//!
//! Clones share state, so a test can keep one handle while the node owns
//! another (even on the scheduler thread).

use super::{check_line, Key, TerminalInterface};
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use teleop_core::{TeleopError, TeleopResult};

#[derive(Debug, Default)]
struct ScriptState {
    /// One entry per `read_key`; `Ok(None)` is a poll that finds no key
    script: VecDeque<TeleopResult<Option<Key>>>,
    lines: BTreeMap<usize, String>,
    clears: usize,
    refreshes: usize,
    beeps: usize,
}

#[derive(Debug, Clone)]
pub struct ScriptedTerminal {
    num_lines: usize,
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedTerminal {
    pub fn new(num_lines: usize) -> Self {
        Self {
            num_lines,
            state: Arc::new(Mutex::new(ScriptState::default())),
        }
    }

    /// Queue key presses, returned one per `read_key`
    pub fn push_keys<K: IntoIterator<Item = Key>>(&self, keys: K) -> &Self {
        self.state.lock().script.extend(keys.into_iter().map(|key| Ok(Some(key))));
        self
    }

    /// Queue one poll that finds no key pending
    pub fn push_idle(&self) -> &Self {
        self.state.lock().script.push_back(Ok(None));
        self
    }

    /// Queue one poll that fails as a broken terminal would
    pub fn push_read_error(&self, message: &str) -> &Self {
        self.state
            .lock()
            .script
            .push_back(Err(TeleopError::terminal(message)));
        self
    }

    pub fn pending(&self) -> usize {
        self.state.lock().script.len()
    }

    /// Text currently drawn on logical line `lineno`
    pub fn line(&self, lineno: usize) -> Option<String> {
        self.state.lock().lines.get(&lineno).cloned()
    }

    pub fn clear_count(&self) -> usize {
        self.state.lock().clears
    }

    pub fn refresh_count(&self) -> usize {
        self.state.lock().refreshes
    }

    pub fn beep_count(&self) -> usize {
        self.state.lock().beeps
    }
}

impl TerminalInterface for ScriptedTerminal {
    fn read_key(&mut self) -> TeleopResult<Option<Key>> {
        self.state.lock().script.pop_front().unwrap_or(Ok(None))
    }

    fn clear(&mut self) -> TeleopResult<()> {
        let mut state = self.state.lock();
        state.lines.clear();
        state.clears += 1;
        Ok(())
    }

    fn write_line(&mut self, lineno: usize, message: &str) -> TeleopResult<()> {
        check_line(lineno, self.num_lines)?;
        self.state.lock().lines.insert(lineno, message.to_string());
        Ok(())
    }

    fn refresh(&mut self) -> TeleopResult<()> {
        self.state.lock().refreshes += 1;
        Ok(())
    }

    fn beep(&mut self) -> TeleopResult<()> {
        self.state.lock().beeps += 1;
        Ok(())
    }
}
