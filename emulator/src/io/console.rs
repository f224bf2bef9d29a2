use std::collections::VecDeque;
use std::io::{stdout, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::io::{PortDevice, PortReg};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use crossterm::terminal;
use log::{error, trace, warn};

// Pending key codes, oldest first. Only the console side pushes and only the
// port side pops.
#[derive(Debug, Default)]
pub struct KeyQueue {
    keys: VecDeque<u16>,
}

impl KeyQueue {
    // Largest code a key may carry; anything else has no byte to read back as.
    pub const KEY_LIMIT: u32 = 0x100; // Exclusive

    pub fn new() -> Self {
        Self::default()
    }

    // Returns whether the key was queued.
    pub fn push(&mut self, code: u32) -> bool {
        if code >= Self::KEY_LIMIT {
            warn!("Console: dropping keycode={code:X}");
            return false;
        }
        trace!("Console: queued key {code:#04x}");
        self.keys.push_back(code as u16);
        true
    }

    pub fn has_key(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn pop(&mut self) -> Option<u16> {
        self.keys.pop_front()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

////////////////////////////////////////////////////////////////////////////////

// Host side of the console: shows output and feeds translated keys.
pub trait Console: Send + Sync {
    fn put_char(&self, ch: u8);

    // Drains host input events into `keys`. Called periodically by the machine loop;
    // must not block.
    fn pump(&self, _keys: &mut KeyQueue) {}
}

////////////////////////////////////////////////////////////////////////////////

// In-memory console: collects what the guest prints and holds key presses
// until the next pump.
#[derive(Default)]
pub struct PipeConsole {
    screen: Mutex<Vec<u8>>,
    pressed: Mutex<Vec<u32>>,
}

impl PipeConsole {
    // Everything printed since the last call.
    pub fn take_output(&self) -> String {
        let screen = std::mem::take(&mut *self.screen.lock().unwrap());
        String::from_utf8_lossy(&screen).into_owned()
    }

    pub fn has_output(&self) -> bool {
        !self.screen.lock().unwrap().is_empty()
    }

    // A translated key code, as `translate_key` would produce it.
    pub fn press(&self, code: u32) {
        self.pressed.lock().unwrap().push(code);
    }

    // One key press per character; newlines are typed as Enter.
    pub fn type_text(&self, text: &str) {
        let mut pressed = self.pressed.lock().unwrap();
        pressed.extend(text.chars().map(|ch| if ch == '\n' { '\r' as u32 } else { ch as u32 }));
    }
}

impl Console for PipeConsole {
    fn put_char(&self, ch: u8) {
        self.screen.lock().unwrap().push(ch);
    }

    fn pump(&self, keys: &mut KeyQueue) {
        for code in self.pressed.lock().unwrap().drain(..) {
            keys.push(code);
        }
    }
}

////////////////////////////////////////////////////////////////////////////////

// Raw mode terminal. Restores the terminal when dropped.
pub struct TermConsole(());

impl TermConsole {
    pub fn new() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(TermConsole(()))
    }
}

impl Drop for TermConsole {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            error!("Console: failed to restore terminal: {e}");
        }
    }
}

impl Console for TermConsole {
    fn put_char(&self, ch: u8) {
        let mut out = stdout().lock();
        if let Err(e) = out.write_all(&[ch]).and_then(|_| out.flush()) {
            error!("Console: write failed: {e}");
        }
    }

    fn pump(&self, keys: &mut KeyQueue) {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => (),
                Ok(false) => return,
                Err(e) => {
                    error!("Console: poll failed: {e}");
                    return;
                }
            }

            match event::read() {
                Ok(Event::Key(ev)) if ev.kind != KeyEventKind::Release => {
                    if let Some(code) = translate_key(&ev) {
                        keys.push(code);
                    }
                }
                Ok(_) => (),
                Err(e) => {
                    error!("Console: read failed: {e}");
                    return;
                }
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////

// US QWERTY shift, independent of the host layout.
fn shift_key(code: u32) -> u32 {
    let Some(ch) = char::from_u32(code) else {
        return code;
    };

    let shifted = match ch {
        'a'..='z' => ch.to_ascii_uppercase(),
        '`' => '~',
        '1' => '!',
        '2' => '@',
        '3' => '#',
        '4' => '$',
        '5' => '%',
        '6' => '^',
        '7' => '&',
        '8' => '*',
        '9' => '(',
        '0' => ')',
        '-' => '_',
        '=' => '+',
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        ';' => ':',
        '\'' => '"',
        ',' => '<',
        '.' => '>',
        '/' => '?',
        _ => ch,
    };
    shifted as u32
}

// Folds modifiers into a key code. Codes at or above `KeyQueue::KEY_LIMIT` are
// returned as is; the queue rejects them.
pub fn translate_key(ev: &KeyEvent) -> Option<u32> {
    const DEL: u32 = 0x7F;
    const BS: u32 = 0x08;

    let mut code = match ev.code {
        KeyCode::Char(ch) => ch as u32,
        KeyCode::Enter => '\r' as u32,
        KeyCode::Tab => '\t' as u32,
        KeyCode::Backspace => BS,
        KeyCode::Delete => DEL,
        KeyCode::Esc => 0x1B,
        KeyCode::Modifier(_) => return None,
        other => {
            trace!("Console: no code for {other:?}");
            return None;
        }
    };

    if code < KeyQueue::KEY_LIMIT
        && (ev.modifiers.contains(KeyModifiers::SHIFT) || ev.state.contains(KeyEventState::CAPS_LOCK))
    {
        code = shift_key(code);
    }

    if code < KeyQueue::KEY_LIMIT && ev.modifiers.contains(KeyModifiers::CONTROL) {
        code &= 0x1F;
    }

    if code == DEL {
        code = BS;
    }

    Some(code)
}

////////////////////////////////////////////////////////////////////////////////

pub struct ConsolePort {
    device: Arc<dyn Console>,
    keys: KeyQueue,
}

impl ConsolePort {
    pub fn new(device: Arc<dyn Console>) -> Self {
        ConsolePort { device, keys: KeyQueue::new() }
    }

    pub fn pump(&mut self) {
        self.device.pump(&mut self.keys);
    }

    pub fn enqueue_key(&mut self, code: u32) -> bool {
        self.keys.push(code)
    }

    pub fn poll_key(&self) -> bool {
        self.keys.has_key()
    }

    pub fn get_key(&mut self) -> Option<u16> {
        self.keys.pop()
    }

    pub fn put_char(&self, ch: u8) {
        self.device.put_char(ch);
    }

    fn data_read(&mut self) -> u8 {
        match self.get_key() {
            Some(0x0D) => b'\n',
            Some(key) => key as u8,
            None => {
                warn!("Console: read of data port when no key is available");
                0
            }
        }
    }
}

impl PortDevice for ConsolePort {
    fn reset(&mut self) {
        self.keys.clear();
    }

    fn read_byte(&mut self, reg: PortReg) -> u8 {
        match reg {
            PortReg::Ctrl => self.poll_key() as u8,
            PortReg::Data => self.data_read(),
        }
    }

    fn write_byte(&mut self, reg: PortReg, val: u8) {
        match reg {
            PortReg::Ctrl => trace!("Console: ignoring control write {val:#04x}"),
            PortReg::Data => self.put_char(val),
        }
    }
}
