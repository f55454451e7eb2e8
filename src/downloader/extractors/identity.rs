// Client identities handed to the engine on each invocation.
//
// The pool is fixed at startup and shared read-only; every engine call picks
// one entry uniformly at random.

use std::sync::Arc;

use rand::Rng;

const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
];

const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub user_agent: String,
    pub accept_language: String,
}

impl ClientIdentity {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }

    /// yt-dlp arguments carrying this identity
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "--user-agent".to_string(),
            self.user_agent.clone(),
            "--add-header".to_string(),
            format!("Accept-Language:{}", self.accept_language),
        ]
    }
}

/// Immutable, never-empty list of identities
#[derive(Debug, Clone)]
pub struct IdentityPool {
    identities: Arc<[ClientIdentity]>,
}

impl IdentityPool {
    /// An empty list falls back to the built-in identities.
    pub fn new(identities: Vec<ClientIdentity>) -> Self {
        if identities.is_empty() {
            return Self::default();
        }
        Self {
            identities: identities.into(),
        }
    }

    pub fn from_user_agents<I, S>(agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let identities = agents
            .into_iter()
            .map(Into::into)
            .filter(|ua: &String| !ua.trim().is_empty())
            .map(ClientIdentity::new)
            .collect();
        Self::new(identities)
    }

    pub fn pick(&self) -> &ClientIdentity {
        let idx = rand::thread_rng().gen_range(0..self.identities.len());
        &self.identities[idx]
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClientIdentity> {
        self.identities.iter()
    }
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self {
            identities: DEFAULT_USER_AGENTS
                .iter()
                .map(|ua| ClientIdentity::new(*ua))
                .collect(),
        }
    }
}
