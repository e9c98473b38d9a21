use crate::config::{get_config, LoggingLevelsConfig, RedactionConfig};
use regex::Regex;
use std::io;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

/// Deep links routinely carry one-time codes and session tokens in their
/// query string; these never reach the log sink.
const DEFAULT_PII_PATTERNS: &[(&str, &str)] = &[
    (
        r"(?i)\b(token|code|access_token|id_token|refresh_token|password)=[^&#\s]+",
        "$1=[REDACTED]",
    ),
    (r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}", "[EMAIL]"),
];

struct RedactingWriter<W> {
    inner: W,
    patterns: Vec<(Regex, String)>,
}

impl<W: io::Write> io::Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let mut redacted = s.to_string();
        for (re, replacement) in &self.patterns {
            redacted = re.replace_all(&redacted, replacement.as_str()).to_string();
        }
        self.inner.write_all(redacted.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter {
    patterns: Vec<(Regex, String)>,
}

impl<'a> fmt::MakeWriter<'a> for RedactingMakeWriter {
    type Writer = RedactingWriter<io::Stdout>;

    fn make_writer(&self) -> Self::Writer {
        RedactingWriter {
            inner: io::stdout(),
            patterns: self.patterns.clone(),
        }
    }
}

/// Most verbose level enabled in config.
fn level_directive(levels: &LoggingLevelsConfig) -> &'static str {
    let mut level = "off";
    if levels.critical {
        level = "error";
    }
    if levels.error {
        level = "error";
    }
    if levels.warning {
        level = "warn";
    }
    if levels.info {
        level = "info";
    }
    if levels.debug {
        level = "debug";
    }
    level
}

/// Compiled redaction rules, plus the names of configured patterns whose
/// regex did not compile.
fn redaction_patterns(config: &RedactionConfig) -> (Vec<(Regex, String)>, Vec<String>) {
    let mut patterns = Vec::new();
    let mut rejected = Vec::new();
    if !config.enabled {
        return (patterns, rejected);
    }
    if config.use_default_pii {
        for (re, placeholder) in DEFAULT_PII_PATTERNS {
            if let Ok(re) = Regex::new(re) {
                patterns.push((re, placeholder.to_string()));
            }
        }
    }
    for p in &config.patterns {
        match Regex::new(&p.regex) {
            Ok(re) => patterns.push((re, p.placeholder.clone())),
            Err(_) => rejected.push(p.name.clone()),
        }
    }
    (patterns, rejected)
}

pub fn init_logging() {
    let config = get_config();

    let level = level_directive(&config.logging.levels);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let show_file = config.logging.format.location.show_file;
    let show_line = config.logging.format.location.show_line;

    let (patterns, rejected) = redaction_patterns(&config.logging.redaction);
    let make_writer = RedactingMakeWriter { patterns };

    // Use Layer::boxed() to unify the types of the if/else branches
    let fmt_layer = if !config.logging.format.show_time {
        fmt::layer()
            .with_writer(make_writer)
            .with_target(show_file)
            .with_file(show_file)
            .with_line_number(show_line)
            .with_thread_ids(false)
            .without_time()
            .boxed()
    } else {
        fmt::layer()
            .with_writer(make_writer)
            .with_target(show_file)
            .with_file(show_file)
            .with_line_number(show_line)
            .with_thread_ids(false)
            .boxed()
    };

    // try_init: a mobile host may load the library more than once per process.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();

    for name in rejected {
        tracing::warn!(pattern = %name, "invalid redaction regex, pattern not applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RedactionPattern;
    use std::io::Write;

    fn redact(config: &RedactionConfig, line: &str) -> String {
        let mut w = RedactingWriter {
            inner: Vec::new(),
            patterns: redaction_patterns(config).0,
        };
        w.write_all(line.as_bytes()).unwrap();
        String::from_utf8(w.inner).unwrap()
    }

    fn defaults() -> RedactionConfig {
        RedactionConfig {
            enabled: true,
            use_default_pii: true,
            patterns: vec![],
        }
    }

    #[test]
    fn test_redacts_deep_link_credentials() {
        let out = redact(
            &defaults(),
            "uri=https://app.test/cb?code=abc123&state=xyz#access_token=t0k",
        );
        assert_eq!(
            out,
            "uri=https://app.test/cb?code=[REDACTED]&state=xyz#access_token=[REDACTED]"
        );
    }

    #[test]
    fn test_redacts_email() {
        let out = redact(&defaults(), "invite for jane.doe@example.org sent");
        assert_eq!(out, "invite for [EMAIL] sent");
    }

    #[test]
    fn test_custom_pattern_and_disabled() {
        let mut config = RedactionConfig {
            enabled: true,
            use_default_pii: false,
            patterns: vec![RedactionPattern {
                name: "profile".into(),
                regex: r"profile/\d+".into(),
                placeholder: "profile/[ID]".into(),
            }],
        };
        assert_eq!(
            redact(&config, "https://open/profile/42?code=1"),
            "https://open/profile/[ID]?code=1"
        );

        config.enabled = false;
        assert_eq!(
            redact(&config, "https://open/profile/42"),
            "https://open/profile/42"
        );
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let config = RedactionConfig {
            enabled: true,
            use_default_pii: false,
            patterns: vec![
                RedactionPattern {
                    name: "broken".into(),
                    regex: r"token=([a-z".into(),
                    placeholder: "token=[REDACTED]".into(),
                },
                RedactionPattern {
                    name: "profile".into(),
                    regex: r"profile/\d+".into(),
                    placeholder: "profile/[ID]".into(),
                },
            ],
        };
        let (patterns, rejected) = redaction_patterns(&config);
        assert_eq!(patterns.len(), 1);
        assert_eq!(rejected, vec!["broken".to_string()]);
    }

    #[test]
    fn test_default_pii_patterns_compile() {
        let (patterns, rejected) = redaction_patterns(&defaults());
        assert_eq!(patterns.len(), DEFAULT_PII_PATTERNS.len());
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_level_directive() {
        let mut levels = LoggingLevelsConfig {
            debug: false,
            info: false,
            warning: false,
            error: false,
            critical: false,
        };
        assert_eq!(level_directive(&levels), "off");
        levels.critical = true;
        assert_eq!(level_directive(&levels), "error");
        levels.info = true;
        assert_eq!(level_directive(&levels), "info");
        levels.debug = true;
        assert_eq!(level_directive(&levels), "debug");
    }
}
