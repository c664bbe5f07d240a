//! Voice command intake.
//!
//! DESIGN
//! ======
//! Fragments from a listening session accumulate in a transcript buffer.
//! A completed utterance (listening ended, or the text box lost focus) is
//! submitted to the parser exactly once; while that request is in flight
//! further submissions are dropped. When the parser is unreachable the
//! utterance falls back to being a plain place search.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};
use trips::{ResolutionMethod, VoiceParse};

use crate::api::TripApi;
use crate::capability::SpeechEvent;

// =============================================================================
// TRANSCRIPT
// =============================================================================

/// Final fragments of the current session plus the latest interim guess.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TranscriptBuffer {
    finalized: String,
    interim: String,
}

impl TranscriptBuffer {
    pub fn push_interim(&mut self, text: &str) {
        text.clone_into(&mut self.interim);
    }

    pub fn push_final(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            if !self.finalized.is_empty() {
                self.finalized.push(' ');
            }
            self.finalized.push_str(text);
        }
        self.interim.clear();
    }

    /// Everything heard so far, interim guess included.
    #[must_use]
    pub fn text(&self) -> String {
        let interim = self.interim.trim();
        match (self.finalized.is_empty(), interim.is_empty()) {
            (_, true) => self.finalized.clone(),
            (true, false) => interim.to_owned(),
            (false, false) => format!("{} {interim}", self.finalized),
        }
    }

    pub fn take(&mut self) -> String {
        let text = self.text();
        *self = Self::default();
        text
    }
}

// =============================================================================
// SUBMISSION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    InFlight,
}

/// What happened to a completed utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Parsed { utterance: String, parse: VoiceParse },
    /// The parser failed; the utterance should be used as a free-text search.
    Unparsed { utterance: String, error: String },
    Skipped(SkipReason),
}

/// Clears the in-flight flag however the parse future ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct VoiceIntake {
    api: Arc<dyn TripApi>,
    transcript: Mutex<TranscriptBuffer>,
    in_flight: AtomicBool,
}

impl VoiceIntake {
    #[must_use]
    pub fn new(api: Arc<dyn TripApi>) -> Self {
        Self { api, transcript: Mutex::new(TranscriptBuffer::default()), in_flight: AtomicBool::new(false) }
    }

    /// Feed one recognition callback into the transcript.
    pub fn on_speech_event(&self, event: &SpeechEvent) {
        let mut transcript = self.transcript.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match event {
            SpeechEvent::Interim(text) => transcript.push_interim(text),
            SpeechEvent::Final(text) => transcript.push_final(text),
            SpeechEvent::Error(_) | SpeechEvent::Ended => {}
        }
    }

    #[must_use]
    pub fn transcript(&self) -> String {
        self.transcript
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .text()
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The listening session is over: submit whatever was heard.
    pub async fn on_listening_ended(&self) -> Submission {
        let utterance = self
            .transcript
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        self.submit(&utterance).await
    }

    /// The command box lost focus with `text` in it.
    pub async fn on_text_blur(&self, text: &str) -> Submission {
        self.submit(text).await
    }

    async fn submit(&self, utterance: &str) -> Submission {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Submission::Skipped(SkipReason::Empty);
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!(len = utterance.len(), "voice: parse already in flight, dropping submission");
            return Submission::Skipped(SkipReason::InFlight);
        }
        let _guard = InFlight(&self.in_flight);

        match self.api.parse_voice_query(utterance).await {
            Ok(parse) => {
                info!(resolved = parse.resolved, has_query = !parse.semantic_query.is_empty(), "voice: parsed");
                Submission::Parsed { utterance: utterance.to_owned(), parse }
            }
            Err(e) => {
                warn!(error = %e, "voice: parse failed, using utterance as search");
                Submission::Unparsed { utterance: utterance.to_owned(), error: e.to_string() }
            }
        }
    }
}

// =============================================================================
// RESOLUTION NOTICE
// =============================================================================

/// Original and resolved text for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub role: &'static str,
    pub original: String,
    pub resolved: String,
}

/// Shown to the user when the parser rewrote a vague location. Display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionNotice {
    pub methods: Vec<ResolutionMethod>,
    pub endpoints: Vec<ResolvedEndpoint>,
}

impl ResolutionNotice {
    #[must_use]
    pub fn from_parse(parse: &VoiceParse) -> Option<Self> {
        if !parse.resolved {
            return None;
        }
        let mut endpoints = Vec::new();
        if let Some(original) = &parse.original_origin {
            endpoints.push(ResolvedEndpoint { role: "origin", original: original.clone(), resolved: parse.origin.clone() });
        }
        if let Some(original) = &parse.original_destination {
            endpoints.push(ResolvedEndpoint {
                role: "destination",
                original: original.clone(),
                resolved: parse.destination.clone(),
            });
        }
        let mut methods = parse.resolution_methods.clone();
        if methods.is_empty() {
            methods.push(ResolutionMethod::ExactMatch);
        }
        Some(Self { methods, endpoints })
    }

    /// One line per resolved endpoint, then the strategies that fired.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .endpoints
            .iter()
            .map(|e| format!("{}: \"{}\" -> {}", e.role, e.original, e.resolved))
            .collect();
        let labels: Vec<&str> = self.methods.iter().map(ResolutionMethod::label).collect();
        lines.push(format!("resolved by {}", labels.join(", ")));
        lines
    }
}

#[cfg(test)]
#[path = "voice_test.rs"]
mod tests;
