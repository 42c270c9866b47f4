//! Terminal-agnostic keyboard input.
//!
//! Transports hand the runtime raw bytes exactly as the remote terminal sent
//! them. [`KeyDecoder`] turns that byte stream into [`KeyInput`] values once,
//! at the boundary, so the state machine only ever matches on a closed enum.

/// Keyboard input abstraction.
///
/// Decouples application logic from any particular terminal encoding,
/// enabling deterministic testing of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Tab key.
    Tab,
    /// Escape key.
    Esc,
    /// Ctrl-C.
    Interrupt,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
}

const ESC: u8 = 0x1b;
const CTRL_C: u8 = 0x03;
const DEL: u8 = 0x7f;
const BS: u8 = 0x08;

/// Longest escape sequence or partial character carried between chunks.
/// Anything longer is garbage and dropped.
const MAX_PENDING: usize = 16;

/// Outcome of decoding one key at the front of a byte slice.
enum Step {
    /// `consumed` bytes were used; `key` is `None` for ignored input.
    Key { key: Option<KeyInput>, consumed: usize },
    /// The slice ends mid-sequence; wait for more bytes.
    Incomplete,
}

/// Incremental decoder from raw terminal bytes to keys.
///
/// Sequences split across chunks are completed by the next call to
/// [`KeyDecoder::feed`]; keys are returned in arrival order.
#[derive(Debug, Default)]
pub struct KeyDecoder {
    pending: Vec<u8>,
}

impl KeyDecoder {
    /// Create a decoder with no buffered input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk of input.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<KeyInput> {
        let mut buf = std::mem::take(&mut self.pending);
        buf.extend_from_slice(bytes);

        let mut keys = Vec::new();
        let mut rest = buf.as_slice();
        while !rest.is_empty() {
            match decode_one(rest) {
                Step::Key { key, consumed } => {
                    keys.extend(key);
                    rest = &rest[consumed..];
                },
                Step::Incomplete => {
                    if rest.len() <= MAX_PENDING {
                        self.pending = rest.to_vec();
                    }
                    break;
                },
            }
        }
        keys
    }
}

fn decode_one(bytes: &[u8]) -> Step {
    let key = |key, consumed| Step::Key { key: Some(key), consumed };
    let ignore = |consumed| Step::Key { key: None, consumed };

    match bytes[0] {
        ESC => decode_escape(bytes),
        b'\r' if bytes.get(1) == Some(&b'\n') => key(KeyInput::Enter, 2),
        b'\r' | b'\n' => key(KeyInput::Enter, 1),
        CTRL_C => key(KeyInput::Interrupt, 1),
        b'\t' => key(KeyInput::Tab, 1),
        DEL | BS => key(KeyInput::Backspace, 1),
        0x00..=0x1f => ignore(1),
        byte @ 0x20..=0x7e => key(KeyInput::Char(byte as char), 1),
        lead => {
            let Some(width) = utf8_width(lead) else {
                return ignore(1);
            };
            if bytes.len() < width {
                return Step::Incomplete;
            }
            match std::str::from_utf8(&bytes[..width]).ok().and_then(|s| s.chars().next()) {
                Some(c) => key(KeyInput::Char(c), width),
                None => ignore(1),
            }
        },
    }
}

/// Decode a sequence starting with ESC.
///
/// A trailing ESC waits for the next chunk; it is the Escape key unless that
/// chunk continues it as a CSI or SS3 sequence.
fn decode_escape(bytes: &[u8]) -> Step {
    match bytes.get(1) {
        None => Step::Incomplete,
        Some(b'[') => decode_csi(bytes),
        Some(b'O') => match bytes.get(2) {
            None => Step::Incomplete,
            Some(&final_byte) => Step::Key { key: arrow_key(final_byte), consumed: 3 },
        },
        Some(_) => Step::Key { key: Some(KeyInput::Esc), consumed: 1 },
    }
}

/// Decode `ESC [ params intermediates final`.
fn decode_csi(bytes: &[u8]) -> Step {
    const BODY_START: usize = 2;

    for (offset, &byte) in bytes[BODY_START..].iter().enumerate() {
        let end = BODY_START + offset;
        match byte {
            0x20..=0x3f => {},
            0x40..=0x7e => {
                let params = &bytes[BODY_START..end];
                let key = match byte {
                    b'~' => tilde_key(params),
                    other => arrow_key(other),
                };
                return Step::Key { key, consumed: end + 1 };
            },
            // Malformed: drop what was read and resume at this byte.
            _ => return Step::Key { key: None, consumed: end },
        }
    }
    Step::Incomplete
}

fn arrow_key(final_byte: u8) -> Option<KeyInput> {
    match final_byte {
        b'A' => Some(KeyInput::Up),
        b'B' => Some(KeyInput::Down),
        b'C' => Some(KeyInput::Right),
        b'D' => Some(KeyInput::Left),
        b'H' => Some(KeyInput::Home),
        b'F' => Some(KeyInput::End),
        _ => None,
    }
}

fn tilde_key(params: &[u8]) -> Option<KeyInput> {
    match params {
        b"1" | b"7" => Some(KeyInput::Home),
        b"3" => Some(KeyInput::Delete),
        b"4" | b"8" => Some(KeyInput::End),
        _ => None,
    }
}

fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}
