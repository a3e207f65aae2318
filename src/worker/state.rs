//! Worker lifecycle states and events

use crate::fetch::Request;
use crate::store::ResponseSnapshot;
use std::fmt;

/// Lifecycle state of the worker
///
/// Installing → Waiting → Active, with Redundant as the terminal state
/// for a version whose install failed or that was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Populating the static generation from the asset manifest
    Installing,
    /// Install succeeded; ready to take over from the previous version
    Waiting,
    /// Controlling pages and intercepting fetches
    Active,
    /// Discarded; a previous version (if any) keeps serving
    Redundant,
}

impl WorkerState {
    /// Whether fetch events are served from the cache layer in this
    /// state; anywhere else they pass through to the network untouched
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether the worker is permanently out of service
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Redundant)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installing => write!(f, "installing"),
            Self::Waiting => write!(f, "waiting"),
            Self::Active => write!(f, "active"),
            Self::Redundant => write!(f, "redundant"),
        }
    }
}

/// An event delivered by the hosting runtime
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// New worker version registered: populate the static generation
    Install,
    /// This version is taking over: evict stale generations, claim pages
    Activate,
    /// A controlled page issued a network request
    Fetch(Request),
}

impl WorkerEvent {
    /// Event kind name, for logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Fetch(_) => "fetch",
        }
    }
}

/// What a dispatched event produced
#[derive(Debug)]
pub enum EventOutcome {
    /// Install completed; the worker is waiting (eagerly) to activate
    Installed,
    /// Activation completed; the worker now controls open pages
    Activated,
    /// A fetch event resolved to this response
    Response(ResponseSnapshot),
}

impl EventOutcome {
    /// The response, if the event was a fetch
    pub fn into_response(self) -> Option<ResponseSnapshot> {
        match self {
            Self::Response(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}
