use std::borrow::Cow;
use std::fmt;

/// Logical identity of a cached query: a resource name plus an optional
/// record id. `users` is the list, `users/3` one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    resource: Cow<'static, str>,
    id: Option<u64>,
}

impl CacheKey {
    pub fn new(resource: impl Into<Cow<'static, str>>) -> Self {
        Self {
            resource: resource.into(),
            id: None,
        }
    }

    pub fn item(resource: impl Into<Cow<'static, str>>, id: u64) -> Self {
        Self {
            resource: resource.into(),
            id: Some(id),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// Prefix match used by invalidation: a bare resource key covers the
    /// list and every record under it; a keyed id covers only itself.
    pub fn starts_with(&self, prefix: &CacheKey) -> bool {
        self.resource == prefix.resource && (prefix.id.is_none() || prefix.id == self.id)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}/{id}", self.resource),
            None => f.write_str(&self.resource),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_resource_and_id() {
        assert_eq!(CacheKey::new("users").to_string(), "users");
        assert_eq!(CacheKey::item("users", 3).to_string(), "users/3");
    }

    #[test]
    fn resource_key_prefixes_its_records() {
        let list = CacheKey::new("users");
        assert!(list.starts_with(&list));
        assert!(CacheKey::item("users", 3).starts_with(&list));
        assert!(!CacheKey::item("posts", 3).starts_with(&list));
    }

    #[test]
    fn record_key_matches_only_itself() {
        let one = CacheKey::item("users", 1);
        assert!(one.starts_with(&one));
        assert!(!CacheKey::item("users", 2).starts_with(&one));
        assert!(!CacheKey::new("users").starts_with(&one));
    }
}
