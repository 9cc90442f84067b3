//! Dashboard fetch state machine.
//!
//! Every dashboard/settings screen owns one `Loader` per projection it
//! shows: fetch on mount, pull-to-refresh re-fetches without blanking the
//! data already on screen, errors surface with a manual retry.
//!
//! Each fetch gets a generation ticket. A result presented with a stale
//! ticket (the screen refreshed again or went away) is discarded instead
//! of clobbering newer state.

/// Loading state for one projection.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading { previous: Option<T> },
    Success(T),
    Error { message: String, previous: Option<T> },
}

impl<T> LoadState<T> {
    /// Data worth rendering right now, stale or fresh.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Loading { previous } | Self::Error { previous, .. } => previous.as_ref(),
            Self::Idle => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    fn take_data(self) -> Option<T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Loading { previous } | Self::Error { previous, .. } => previous,
            Self::Idle => None,
        }
    }
}

/// Ticket identifying one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// State holder for one screen's fetch-on-mount / pull-to-refresh cycle.
#[derive(Debug)]
pub struct Loader<T> {
    state: LoadState<T>,
    generation: u64,
}

impl<T> Loader<T> {
    pub fn new() -> Self {
        Self {
            state: LoadState::Idle,
            generation: 0,
        }
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    /// Enter `Loading`, keeping whatever data was on screen, and hand back
    /// the ticket the eventual result must present.
    pub fn begin(&mut self) -> FetchTicket {
        self.generation += 1;
        let previous = std::mem::replace(&mut self.state, LoadState::Idle).take_data();
        self.state = LoadState::Loading { previous };
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Apply a fetch result. Returns false (and changes nothing) when the
    /// ticket is stale.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<T, String>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!("discarding stale fetch result");
            return false;
        }
        self.state = match result {
            Ok(data) => LoadState::Success(data),
            Err(message) => LoadState::Error {
                message,
                previous: std::mem::replace(&mut self.state, LoadState::Idle).take_data(),
            },
        };
        true
    }

    /// The screen went away; any in-flight result becomes stale.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }
}

impl<T> Default for Loader<T> {
    fn default() -> Self {
        Self::new()
    }
}
