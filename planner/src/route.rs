//! Route form state and the gate in front of route computation.
//!
//! The gate publishes each computed route on a watch channel. Anything that
//! needs a route (place search) awaits that channel rather than polling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};
use trips::{RouteEndpoint, RouteRequest, RouteResult, VoiceParse, Waypoint};

use crate::capability::{RouteError, RouteService};

/// Shortest trimmed origin/destination worth sending to the geocoder.
pub const MIN_ENDPOINT_CHARS: usize = 3;

/// The user's current trip inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteForm {
    pub origin: String,
    pub destination: String,
    pub semantic_query: String,
    pub waypoints: Vec<Waypoint>,
}

impl RouteForm {
    /// Copy over each field the parse actually filled; empty parse fields
    /// leave the form untouched.
    pub fn apply_parse(&mut self, parse: &VoiceParse) {
        if !parse.origin.is_empty() {
            self.origin.clone_from(&parse.origin);
        }
        if !parse.destination.is_empty() {
            self.destination.clone_from(&parse.destination);
        }
        if !parse.semantic_query.is_empty() {
            self.semantic_query.clone_from(&parse.semantic_query);
        }
    }

    /// Parser unavailable: search for the whole utterance as free text.
    pub fn apply_unparsed(&mut self, utterance: &str) {
        self.origin.clear();
        self.destination.clear();
        utterance.clone_into(&mut self.semantic_query);
    }
}

#[must_use]
pub fn is_geocodable(text: &str) -> bool {
    text.trim().chars().count() >= MIN_ENDPOINT_CHARS
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Planned(Arc<RouteResult>),
    /// Inputs too short; nothing was sent.
    NotAttempted,
}

pub struct RouteGate {
    service: Arc<dyn RouteService>,
    current: watch::Sender<Option<Arc<RouteResult>>>,
}

impl RouteGate {
    #[must_use]
    pub fn new(service: Arc<dyn RouteService>) -> Self {
        let (current, _) = watch::channel(None);
        Self { service, current }
    }

    /// Validate the form and compute its route.
    ///
    /// # Errors
    ///
    /// Propagates the route service's [`RouteError`]. The previously
    /// published route stays current in that case.
    pub async fn plan(&self, form: &RouteForm, optimize_waypoints: bool) -> Result<RouteOutcome, RouteError> {
        if !is_geocodable(&form.origin) || !is_geocodable(&form.destination) {
            debug!(origin_len = form.origin.trim().len(), destination_len = form.destination.trim().len(), "route: not attempted");
            return Ok(RouteOutcome::NotAttempted);
        }

        let request = RouteRequest {
            origin: RouteEndpoint::parse(&form.origin),
            destination: RouteEndpoint::parse(&form.destination),
            waypoints: form.waypoints.clone(),
            optimize_waypoints,
        };
        let route = Arc::new(self.service.compute_route(&request).await?);
        info!(waypoints = request.waypoints.len(), legs = route.leg_boundaries().len(), "route: computed");

        self.current.send_replace(Some(Arc::clone(&route)));
        Ok(RouteOutcome::Planned(route))
    }

    #[must_use]
    pub fn current(&self) -> Option<Arc<RouteResult>> {
        self.current.borrow().clone()
    }

    /// Forget the current route, e.g. when the user edits the endpoints.
    pub fn clear(&self) {
        self.current.send_replace(None);
    }

    /// Resolve with the current route, or with the next one published
    /// within `window`. `None` when the window passes without a route.
    pub async fn wait_for_route(&self, window: Duration) -> Option<Arc<RouteResult>> {
        let mut rx = self.current.subscribe();
        let waited = tokio::time::timeout(window, rx.wait_for(Option::is_some)).await;
        match waited {
            Ok(Ok(route)) => (*route).clone(),
            Ok(Err(_)) | Err(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;
