use super::key::CacheKey;

/// Cache effects applied after a mutation succeeds. Nothing is applied when
/// it fails.
#[derive(Debug, Clone, Default)]
pub struct Mutation {
    pub(crate) invalidates: Vec<CacheKey>,
    pub(crate) appends_to: Vec<CacheKey>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate `key` (and, for a bare resource key, every record under it).
    #[must_use]
    pub fn invalidates(mut self, key: CacheKey) -> Self {
        self.invalidates.push(key);
        self
    }

    /// Push the mutation's result onto the `Vec` cached under `key`, starting
    /// a one-element list when nothing is cached yet.
    #[must_use]
    pub fn appends_to(mut self, key: CacheKey) -> Self {
        self.appends_to.push(key);
        self
    }
}
