use crate::manifest::deserialize_tags;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Reporter id used when nobody is signed in.
pub const ANONYMOUS_REPORTER: &str = "anonymous";

/// A theme listed in the hosted catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogThemeRef {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub preview: Option<String>,
    /// Storage file id of the `.reskin` package.
    pub file: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
}

impl CatalogThemeRef {
    /// Case-insensitive match on name, author, description and tags.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        [&self.name, &self.author, &self.description]
            .into_iter()
            .chain(self.tags.iter())
            .any(|field| field.to_lowercase().contains(&query))
    }
}

/// A report about a malicious or broken catalog theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub theme_id: String,
    pub reporter_id: String,
    pub reason: String,
}

impl Report {
    /// Builds a report, falling back to the anonymous reporter.
    ///
    /// Returns `None` for a blank reason: such a report is never sent.
    pub fn new(
        theme_id: impl Into<String>,
        reporter: Option<&Identity>,
        reason: &str,
    ) -> Option<Self> {
        let reason = reason.trim();
        if reason.is_empty() {
            return None;
        }
        Some(Self {
            theme_id: theme_id.into(),
            reporter_id: reporter
                .map(|identity| identity.id.clone())
                .unwrap_or_else(|| ANONYMOUS_REPORTER.to_string()),
            reason: reason.to_string(),
        })
    }
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "$id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// An authenticated session with the account backend.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "$id", alias = "id")]
    pub id: String,
    #[serde(rename = "userId", alias = "user_id")]
    pub user_id: String,
    #[serde(default)]
    pub secret: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Email and password for sign-in and sign-up. The password is wiped on drop.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: Zeroizing<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What the session store persists between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub session: Session,
    pub identity: Identity,
}

/// Document list envelope returned by the catalog.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DocumentList<T> {
    #[serde(default)]
    pub total: u64,
    pub documents: Vec<T>,
}
