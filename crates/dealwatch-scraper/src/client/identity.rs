//! Rotating client identity (`User-Agent`) for outgoing requests.

use std::sync::atomic::{AtomicUsize, Ordering};

use dealwatch_core::app_config::DEFAULT_USER_AGENTS;

/// Round-robin pool of user agents. Each call to [`UserAgentPool::next`]
/// advances the cursor, independent of retry timing.
#[derive(Debug)]
pub(crate) struct UserAgentPool {
    agents: Vec<String>,
    cursor: AtomicUsize,
}

impl UserAgentPool {
    /// Builds a pool, falling back to the built-in agents when `agents` is empty.
    pub(crate) fn new(agents: Vec<String>) -> Self {
        let agents = if agents.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|s| (*s).to_owned()).collect()
        } else {
            agents
        };
        Self {
            agents,
            cursor: AtomicUsize::new(0),
        }
    }

    pub(crate) fn next(&self) -> &str {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.agents.len();
        &self.agents[idx]
    }
}
