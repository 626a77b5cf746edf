use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier shared with the backend (e.g. `"BLOGPOST_CREATE"`).
///
/// Authorities are opaque strings at this layer. The client never rejects an
/// identifier it receives from the backend; it only tests membership. The
/// associated constants name the identifiers the backend currently issues.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(Cow<'static, str>);

impl Authority {
    pub const BLOGPOST_CREATE: Authority = Authority::from_static("BLOGPOST_CREATE");
    pub const BLOGPOST_MODIFY: Authority = Authority::from_static("BLOGPOST_MODIFY");
    pub const BLOGPOST_DELETE: Authority = Authority::from_static("BLOGPOST_DELETE");
    pub const BLOGPOST_EDIT_OWN: Authority = Authority::from_static("BLOGPOST_EDIT_OWN");
    pub const BLOGPOST_EDIT_ANY: Authority = Authority::from_static("BLOGPOST_EDIT_ANY");
    pub const BLOGPOST_DELETE_OWN: Authority = Authority::from_static("BLOGPOST_DELETE_OWN");
    pub const BLOGPOST_DELETE_ANY: Authority = Authority::from_static("BLOGPOST_DELETE_ANY");
    pub const USER_READ: Authority = Authority::from_static("USER_READ");
    pub const USER_CREATE: Authority = Authority::from_static("USER_CREATE");
    pub const USER_MODIFY: Authority = Authority::from_static("USER_MODIFY");
    pub const USER_DEACTIVATE: Authority = Authority::from_static("USER_DEACTIVATE");

    /// Every identifier the backend is known to issue.
    pub const KNOWN_NAMES: [&'static str; 11] = [
        "BLOGPOST_CREATE",
        "BLOGPOST_MODIFY",
        "BLOGPOST_DELETE",
        "BLOGPOST_EDIT_OWN",
        "BLOGPOST_EDIT_ANY",
        "BLOGPOST_DELETE_OWN",
        "BLOGPOST_DELETE_ANY",
        "USER_READ",
        "USER_CREATE",
        "USER_MODIFY",
        "USER_DEACTIVATE",
    ];

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identifier is one of [`Authority::KNOWN_NAMES`].
    ///
    /// Informational only; unknown identifiers still take part in checks.
    pub fn is_known(&self) -> bool {
        Self::KNOWN_NAMES.iter().any(|name| *name == self.as_str())
    }
}

impl core::fmt::Display for Authority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Authority {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl From<String> for Authority {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl core::str::FromStr for Authority {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Cow::Owned(s.to_string())))
    }
}
