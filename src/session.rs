//! Online HTTP session classifier.
//!
//! Keeps one accumulator per TCP conversation that opened with a GET
//! request and classifies response payloads against the reference
//! library, either standalone for response-start segments or over the
//! accumulated session frequencies.

use crate::error::PtridError;
use crate::library::ReferenceLibrary;
use crate::packet::{self, TcpSegment};
use crate::reader::{self, ByteReader, BASE_SET_SIZE};
use log::{debug, trace};
use std::collections::HashMap;

/// Payloads shorter than this carry too little signal to score.
pub const MIN_SCORED_PAYLOAD: usize = 20;

struct HttpSession {
    request_line: Vec<u8>,
    frequencies: Vec<u32>,
}

/// Outcome of one processed packet, ready for printing.
#[derive(Debug, PartialEq, Eq)]
pub enum Verdict {
    /// A new GET conversation, reported as plain text until data
    /// arrives.
    Opened { request_line: Vec<u8> },
    /// A scored payload on an open session.
    Classified {
        request_line: Vec<u8>,
        type_index: usize,
    },
    /// A packet on an open session too short to score.
    Skipped { request_line: Vec<u8> },
}

/// Per-conversation state machine fed straight from the capture loop.
pub struct HttpClassifier {
    library: ReferenceLibrary,
    sessions: HashMap<packet::SessionKey, HttpSession>,
}

impl HttpClassifier {
    pub fn new(library: ReferenceLibrary) -> Self {
        Self {
            library,
            sessions: HashMap::new(),
        }
    }

    pub fn library(&self) -> &ReferenceLibrary {
        &self.library
    }

    pub fn open_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Feeds one captured frame through the session state machine.
    /// Non-TCP frames, malformed frames and data on unknown
    /// conversations yield no verdict.
    pub fn process(&mut self, data: &[u8], caplen: usize) -> Option<Verdict> {
        let segment = match packet::extract_tcp_payload(data, caplen) {
            Ok(segment) => segment,
            Err(e) => {
                trace!("skipping frame: {e}");
                return None;
            }
        };
        if self.sessions.contains_key(&segment.key) {
            self.continue_session(&segment)
        } else {
            self.open_session(&segment)
        }
    }

    fn open_session(&mut self, segment: &TcpSegment<'_>) -> Option<Verdict> {
        if !segment.payload.starts_with(b"GET") {
            trace!("dropping frame: {}", PtridError::MissingSession);
            return None;
        }
        let request_line = request_line(segment.payload);
        self.sessions.insert(
            segment.key,
            HttpSession {
                request_line: request_line.clone(),
                frequencies: vec![0; BASE_SET_SIZE * BASE_SET_SIZE],
            },
        );
        debug!("session opened, {} now tracked", self.sessions.len());
        Some(Verdict::Opened { request_line })
    }

    fn continue_session(&mut self, segment: &TcpSegment<'_>) -> Option<Verdict> {
        let closing = segment.flags & (packet::TCP_FIN | packet::TCP_RST) != 0;

        let session = self.sessions.get_mut(&segment.key)?;
        let verdict = if segment.payload.len() < MIN_SCORED_PAYLOAD {
            Verdict::Skipped {
                request_line: session.request_line.clone(),
            }
        } else {
            let mut sample = ByteReader::new(2);
            sample.read_buffer(segment.payload);
            let type_index = if segment.payload.starts_with(b"HTTP") {
                // A response-start segment is scored standalone, without
                // touching the session accumulator.
                self.library.analyzer().score(sample.frequencies())
            } else {
                reader::accumulate(&mut session.frequencies, sample.frequencies());
                self.library.analyzer().score(&session.frequencies)
            };
            Verdict::Classified {
                request_line: session.request_line.clone(),
                type_index,
            }
        };

        if closing {
            self.sessions.remove(&segment.key);
            debug!("session closed, {} still tracked", self.sessions.len());
        }
        Some(verdict)
    }
}

/// The first line of the payload, up to and including the newline; the
/// whole payload when no newline is present.
fn request_line(payload: &[u8]) -> Vec<u8> {
    match payload.iter().position(|&b| b == b'\n') {
        Some(pos) => payload[..=pos].to_vec(),
        None => payload.to_vec(),
    }
}

/// Prints one verdict in the wire-log format: the request line, which
/// carries its own newline, followed by the type verdict.
pub fn print_verdict(library: &ReferenceLibrary, verdict: &Verdict) {
    match verdict {
        Verdict::Opened { request_line } => {
            print!("{}", String::from_utf8_lossy(request_line));
            println!("Data type is plain_text");
        }
        Verdict::Classified {
            request_line,
            type_index,
        } => {
            print!("{}", String::from_utf8_lossy(request_line));
            println!("Data type is {}", library.name(*type_index));
        }
        Verdict::Skipped { request_line } => {
            print!("{}", String::from_utf8_lossy(request_line));
        }
    }
}
