//! Terminal stand-ins for the map surface and the microphone.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use planner::{CaptureError, MarkerStyle, PanelLayout, PlaceMarker, RenderOptions, RouteRenderer, SpeechCapture, SpeechEvent};
use tokio::sync::mpsc;
use trips::RouteResult;

/// Draws routes and markers as plain text lines.
pub struct TerminalRenderer<W> {
    out: Mutex<W>,
}

impl TerminalRenderer<std::io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lines(&self, lines: &[String]) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        for line in lines {
            // A closed stdout (e.g. piped into `head`) is not worth failing over.
            let _ = writeln!(out, "{line}");
        }
    }
}

pub fn route_lines(route: &RouteResult, options: &RenderOptions) -> Vec<String> {
    let mut lines = vec![format!("Route: {}", route.summary().unwrap_or("(unnamed)"))];
    for (i, (start, end)) in route.leg_boundaries().iter().enumerate() {
        lines.push(format!("  leg {}: {} -> {}", i + 1, start.to_param(), end.to_param()));
    }
    if options.traffic_layer {
        lines.push("  traffic: shown".to_owned());
    }
    if options.layout != PanelLayout::Sidebar {
        lines.push(format!("  layout: {:?}", options.layout).to_lowercase());
    }
    lines
}

pub fn marker_lines(markers: &[PlaceMarker]) -> Vec<String> {
    if markers.is_empty() {
        return vec!["No places found along the route.".to_owned()];
    }
    let mut lines = Vec::with_capacity(markers.len() + 1);
    let picks = markers.iter().filter(|m| m.style == MarkerStyle::AiPick).count();
    lines.push(format!("Places: {} ({picks} recommended)", markers.len()));
    for marker in markers {
        let rating = marker.place.rating.map_or_else(|| "-".to_owned(), |r| format!("{r:.1}"));
        let mut line = match marker.style {
            MarkerStyle::AiPick => format!("  * {} ({rating})", marker.title()),
            MarkerStyle::Standard => format!("    {} ({rating})", marker.title()),
        };
        if let Some(address) = marker.place.address() {
            line.push_str(", ");
            line.push_str(address);
        }
        if let Some(reason) = marker.reason.as_deref() {
            line.push_str(" - ");
            line.push_str(reason);
        }
        lines.push(line);
    }
    lines
}

impl<W: Write + Send> RouteRenderer for TerminalRenderer<W> {
    fn render_route(&self, route: &RouteResult, options: &RenderOptions) {
        self.write_lines(&route_lines(route, options));
    }

    fn render_markers(&self, markers: &[PlaceMarker]) {
        self.write_lines(&marker_lines(markers));
    }
}

/// A terminal has no recognizer; commands are typed instead.
pub struct UnsupportedSpeech;

impl SpeechCapture for UnsupportedSpeech {
    fn start_capture(&self) -> Result<mpsc::Receiver<SpeechEvent>, CaptureError> {
        Err(CaptureError::Unsupported("no microphone capture in the terminal; pass the command as arguments".into()))
    }

    fn stop_capture(&self) {}
}

#[cfg(test)]
#[path = "terminal_test.rs"]
mod tests;
