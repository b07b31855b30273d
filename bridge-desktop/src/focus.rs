//! Process-local audio focus

use bridge_traits::{
    error::Result, FocusChange, FocusChangeListener, FocusGrant, FocusProvider, FocusResponse,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Grants audio focus to one holder at a time within the process.
///
/// A new request supersedes the current holder without notifying it, the
/// way a platform arbiter treats repeated requests from one application.
/// Other applications are simulated with [`revoke`](Self::revoke).
#[derive(Default)]
pub struct LocalFocusProvider {
    state: Mutex<LocalFocusState>,
}

#[derive(Default)]
struct LocalFocusState {
    next_token: u64,
    holder: Option<(FocusGrant, Arc<dyn FocusChangeListener>)>,
    deny: bool,
    requests: usize,
    releases: usize,
}

impl LocalFocusProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer subsequent requests with [`FocusResponse::Denied`].
    pub fn set_deny(&self, deny: bool) {
        self.state.lock().deny = deny;
    }

    pub fn is_held(&self) -> bool {
        self.state.lock().holder.is_some()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests
    }

    pub fn release_count(&self) -> usize {
        self.state.lock().releases
    }

    /// Report `change` to the current holder, as if another application
    /// took focus. Loss changes drop the holder.
    ///
    /// Returns `false` when nobody holds focus.
    pub fn revoke(&self, change: FocusChange) -> bool {
        let listener = {
            let mut state = self.state.lock();
            let listener = match state.holder.as_ref() {
                Some((_, listener)) => Arc::clone(listener),
                None => return false,
            };
            if change.is_loss() {
                state.holder = None;
            }
            listener
        };

        debug!(?change, "Delivering focus change to holder");
        listener.on_focus_change(change);
        true
    }
}

impl FocusProvider for LocalFocusProvider {
    fn request_focus(&self, listener: Arc<dyn FocusChangeListener>) -> Result<FocusResponse> {
        let mut state = self.state.lock();
        state.requests += 1;

        if state.deny {
            debug!("Focus request denied");
            return Ok(FocusResponse::Denied);
        }

        let grant = FocusGrant::new(state.next_token);
        state.next_token += 1;
        state.holder = Some((grant, listener));
        debug!(token = grant.token(), "Focus granted");
        Ok(FocusResponse::Granted(grant))
    }

    fn release_focus(&self, grant: FocusGrant) -> Result<()> {
        let mut state = self.state.lock();
        state.releases += 1;

        let current = state.holder.as_ref().map(|(held, _)| *held);
        if current == Some(grant) {
            state.holder = None;
            debug!(token = grant.token(), "Focus released");
        } else {
            debug!(token = grant.token(), "Ignoring release of stale grant");
        }
        Ok(())
    }
}
