//! Output relay threads.
//!
//! Each child stream gets one reader thread that decodes whatever the
//! child wrote into text and sends it to the control thread as an
//! [`Event`]. Reads are relayed as they arrive rather than line by line,
//! so prompts without a trailing newline show up immediately.

use crate::supervisor::event::Event;
use std::io::{self, Read};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

const READ_BUFFER: usize = 4096;

/// Incremental UTF-8 decoder.
///
/// Invalid bytes become U+FFFD. An incomplete sequence at the end of a
/// chunk is held back until the next chunk completes it.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    /// Decode `bytes`, returning all text that is complete so far.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush anything held back, lossily.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// Drop one trailing line terminator (`\n` or `\r\n`).
pub fn trim_trailing_newline(text: &str) -> &str {
    match text.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => text,
    }
}

/// Start a thread that relays `reader` until end of file.
///
/// Every decoded chunk is wrapped by `to_event`; `on_close`, when given,
/// is sent once the stream is exhausted. The thread exits early if the
/// receiving side has gone away.
pub fn spawn_reader<R, F>(
    name: String,
    mut reader: R,
    tx: Sender<Event>,
    to_event: F,
    on_close: Option<Event>,
) -> io::Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
    F: Fn(String) -> Event + Send + 'static,
{
    thread::Builder::new().name(name).spawn(move || {
        let mut decoder = ChunkDecoder::default();
        let mut buf = [0u8; READ_BUFFER];

        let send = |text: String| -> bool {
            tx.send(to_event(trim_trailing_newline(&text).to_string()))
                .is_ok()
        };

        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    let text = decoder.push(&buf[..n]);
                    if !text.is_empty() && !send(text) {
                        return;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!("Stream read failed: {}", e);
                    break;
                }
            }
        }

        let rest = decoder.finish();
        if !rest.is_empty() && !send(rest) {
            return;
        }
        if let Some(event) = on_close {
            let _ = tx.send(event);
        }
    })
}
