//! Deep-link normalization – runs once per delivery, before the bridge
//! runtime sees the intent.
//!
//! A `view` intent carrying a URI always leaves here with the `https`
//! scheme. Everything else passes through untouched.

use crate::intent::LaunchIntent;
use serde::{Deserialize, Serialize};

/// The scheme every deep link is rewritten to.
pub const CANONICAL_SCHEME: &str = "https";

/// What normalization did to an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    NoIntent,
    NotView,
    NoUri,
    AlreadyHttps,
    Rewritten { from: String },
    /// The rewrite failed and the original intent was forwarded instead.
    PassedThrough { reason: String },
}

impl Outcome {
    pub fn is_rewritten(&self) -> bool {
        matches!(self, Outcome::Rewritten { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("rewritten deep link {rewritten} is not a valid URI: {source}")]
    MalformedUri {
        intent: Box<LaunchIntent>,
        rewritten: String,
        #[source]
        source: url::ParseError,
    },
}

impl NormalizeError {
    /// Give back the intent exactly as it was delivered.
    pub fn into_original(self) -> LaunchIntent {
        match self {
            NormalizeError::MalformedUri { intent, .. } => *intent,
        }
    }
}

/// An intent that has been through normalization. Bridge runtimes only
/// accept this type, so nothing reaches them unexamined.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedIntent {
    intent: Option<LaunchIntent>,
    outcome: Outcome,
}

impl NormalizedIntent {
    fn new(intent: Option<LaunchIntent>, outcome: Outcome) -> Self {
        Self { intent, outcome }
    }

    fn passed_through(err: NormalizeError) -> Self {
        let reason = err.to_string();
        Self::new(Some(err.into_original()), Outcome::PassedThrough { reason })
    }

    pub fn intent(&self) -> Option<&LaunchIntent> {
        self.intent.as_ref()
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn into_intent(self) -> Option<LaunchIntent> {
        self.intent
    }

    pub fn into_parts(self) -> (Option<LaunchIntent>, Outcome) {
        (self.intent, self.outcome)
    }
}

/// How to treat a deep link whose rewritten form does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedUriPolicy {
    /// Log and forward the original intent. Startup never fails.
    #[default]
    PassThrough,
    /// Surface the error to the caller.
    Strict,
}

impl MalformedUriPolicy {
    pub fn apply(self, intent: Option<LaunchIntent>) -> Result<NormalizedIntent, NormalizeError> {
        match (try_normalize(intent), self) {
            (Ok(normalized), _) => Ok(normalized),
            (Err(e), MalformedUriPolicy::PassThrough) => {
                tracing::warn!(error = %e, "deep link rewrite failed, forwarding original intent");
                Ok(NormalizedIntent::passed_through(e))
            }
            (Err(e), MalformedUriPolicy::Strict) => Err(e),
        }
    }
}

/// Normalize an intent, reporting a malformed rewrite as an error.
pub fn try_normalize(intent: Option<LaunchIntent>) -> Result<NormalizedIntent, NormalizeError> {
    let Some(mut intent) = intent else {
        return Ok(NormalizedIntent::new(None, Outcome::NoIntent));
    };
    if !intent.is_view() {
        return Ok(NormalizedIntent::new(Some(intent), Outcome::NotView));
    }
    let Some(uri) = intent.uri.as_ref() else {
        return Ok(NormalizedIntent::new(Some(intent), Outcome::NoUri));
    };
    if uri.has_scheme(CANONICAL_SCHEME) {
        return Ok(NormalizedIntent::new(Some(intent), Outcome::AlreadyHttps));
    }

    match uri.with_scheme(CANONICAL_SCHEME) {
        Ok(rewritten) => {
            let from = uri.scheme().to_string();
            tracing::debug!(from = %from, uri = %rewritten, "rewrote deep link scheme");
            intent.uri = Some(rewritten);
            Ok(NormalizedIntent::new(Some(intent), Outcome::Rewritten { from }))
        }
        Err(source) => {
            let rewritten = format!("{}{}", CANONICAL_SCHEME, uri.remainder());
            Err(NormalizeError::MalformedUri {
                intent: Box::new(intent),
                rewritten,
                source,
            })
        }
    }
}

/// Normalize an intent; a malformed rewrite is logged and the original
/// intent returned unchanged.
pub fn normalize(intent: Option<LaunchIntent>) -> Option<LaunchIntent> {
    match MalformedUriPolicy::PassThrough.apply(intent) {
        Ok(normalized) => normalized.into_intent(),
        Err(e) => Some(e.into_original()),
    }
}
