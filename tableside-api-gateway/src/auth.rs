use std::collections::HashMap;

/// Resolves a bearer token to the username of the authenticated principal.
/// Token issuance lives outside this service; the gateway only consumes
/// already-issued credentials.
pub trait TokenResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Option<String>;
}

/// Token table loaded at startup.
pub struct StaticTokenResolver {
    tokens: HashMap<String, String>,
}

impl StaticTokenResolver {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    /// Parse `token=username` pairs separated by commas, e.g.
    /// `AUTH_TOKENS=s3cret-a=alice,s3cret-b=bob`.
    pub fn from_env(var: &str) -> Self {
        let raw = std::env::var(var).unwrap_or_default();
        let tokens = raw
            .split(',')
            .filter_map(|pair| {
                let (token, username) = pair.split_once('=')?;
                let token = token.trim();
                let username = username.trim();
                if token.is_empty() || username.is_empty() {
                    return None;
                }
                Some((token.to_string(), username.to_string()))
            })
            .collect();
        Self { tokens }
    }
}

impl TokenResolver for StaticTokenResolver {
    fn resolve(&self, token: &str) -> Option<String> {
        self.tokens.get(token).cloned()
    }
}
