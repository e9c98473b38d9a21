//! Launch intent model – what the OS hands the shell on activation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The action an intent requests of the app.
///
/// Android spells these out as `android.intent.action.VIEW`; desktop launch
/// paths and the CLI use the short form. Both map to the same variant, and
/// each variant keeps the text it was delivered with so the bridge sees the
/// action unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IntentAction {
    View(String),
    Main(String),
    Other(String),
}

impl IntentAction {
    pub fn view() -> Self {
        IntentAction::View("view".to_string())
    }

    pub fn main() -> Self {
        IntentAction::Main("main".to_string())
    }

    /// The action text as delivered.
    pub fn as_str(&self) -> &str {
        match self {
            IntentAction::View(s) | IntentAction::Main(s) | IntentAction::Other(s) => s,
        }
    }

    pub fn is_view(&self) -> bool {
        matches!(self, IntentAction::View(_))
    }

    pub fn is_main(&self) -> bool {
        matches!(self, IntentAction::Main(_))
    }
}

impl From<String> for IntentAction {
    fn from(s: String) -> Self {
        let short = s.strip_prefix("android.intent.action.").unwrap_or(&s);
        if short.eq_ignore_ascii_case("view") {
            IntentAction::View(s)
        } else if short.eq_ignore_ascii_case("main") {
            IntentAction::Main(s)
        } else {
            IntentAction::Other(s)
        }
    }
}

impl From<&str> for IntentAction {
    fn from(s: &str) -> Self {
        IntentAction::from(s.to_string())
    }
}

impl From<IntentAction> for String {
    fn from(action: IntentAction) -> Self {
        match action {
            IntentAction::View(s) | IntentAction::Main(s) | IntentAction::Other(s) => s,
        }
    }
}

impl FromStr for IntentAction {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(IntentAction::from(s))
    }
}

impl fmt::Display for IntentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Deep link
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDeepLink {
    #[error("not an absolute URI (missing scheme): {0}")]
    MissingScheme(String),

    #[error("invalid URI {uri}: {source}")]
    Parse {
        uri: String,
        #[source]
        source: url::ParseError,
    },
}

/// An absolute URI carried by an intent.
///
/// The text is kept exactly as delivered. `url::Url` would normalise host
/// case, percent-encoding and trailing slashes, and the bridge must see the
/// link byte-for-byte, so it is only used to validate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeepLink {
    raw: String,
    /// Byte offset of the `:` ending the scheme.
    scheme_end: usize,
}

impl DeepLink {
    pub fn parse(input: &str) -> Result<Self, InvalidDeepLink> {
        let scheme_end = scheme_end(input)
            .ok_or_else(|| InvalidDeepLink::MissingScheme(input.to_string()))?;
        url::Url::parse(input).map_err(|source| InvalidDeepLink::Parse {
            uri: input.to_string(),
            source,
        })?;
        Ok(Self {
            raw: input.to_string(),
            scheme_end,
        })
    }

    /// The scheme as written, without the trailing `:`.
    pub fn scheme(&self) -> &str {
        &self.raw[..self.scheme_end]
    }

    /// Everything after the scheme, starting at the `:`.
    pub fn remainder(&self) -> &str {
        &self.raw[self.scheme_end..]
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Scheme comparison by value, ignoring ASCII case (RFC 3986 §3.1).
    pub fn has_scheme(&self, scheme: &str) -> bool {
        self.scheme().eq_ignore_ascii_case(scheme)
    }

    /// Swap the scheme and re-parse the result. The remainder is carried over
    /// untouched.
    pub fn with_scheme(&self, scheme: &str) -> Result<Self, url::ParseError> {
        let raw = format!("{}{}", scheme, self.remainder());
        url::Url::parse(&raw)?;
        Ok(Self {
            raw,
            scheme_end: scheme.len(),
        })
    }
}

/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )` followed by `:`.
fn scheme_end(input: &str) -> Option<usize> {
    let colon = input.find(':')?;
    let scheme = &input[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    Some(colon)
}

impl TryFrom<String> for DeepLink {
    type Error = InvalidDeepLink;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        DeepLink::parse(&s)
    }
}

impl From<DeepLink> for String {
    fn from(link: DeepLink) -> Self {
        link.raw
    }
}

impl FromStr for DeepLink {
    type Err = InvalidDeepLink;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeepLink::parse(s)
    }
}

impl fmt::Display for DeepLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// An activation request from the OS. Absence of an intent altogether is
/// modelled as `Option<LaunchIntent>::None` by callers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LaunchIntent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<IntentAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<DeepLink>,
    /// Opaque payload forwarded to the bridge as-is.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl LaunchIntent {
    pub fn view(uri: DeepLink) -> Self {
        Self {
            action: Some(IntentAction::view()),
            uri: Some(uri),
            extras: BTreeMap::new(),
        }
    }

    pub fn main() -> Self {
        Self {
            action: Some(IntentAction::main()),
            uri: None,
            extras: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    pub fn is_view(&self) -> bool {
        self.action.as_ref().is_some_and(IntentAction::is_view)
    }
}
