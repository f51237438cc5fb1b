use std::fmt;

/// Address of a cached query: a scope such as `quoteRequests` or `quote`,
/// plus an optional record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    scope: &'static str,
    id: Option<String>,
}

impl QueryKey {
    pub fn new(scope: &'static str) -> Self {
        Self { scope, id: None }
    }

    pub fn with_id(scope: &'static str, id: impl Into<String>) -> Self {
        Self {
            scope,
            id: Some(id.into()),
        }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}/{}", self.scope, id),
            None => f.write_str(self.scope),
        }
    }
}
