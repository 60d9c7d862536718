//! Builtin policies for the common injection surfaces.
//!
//! Each policy is a small struct with a configurable list and sensible
//! defaults; `check()` never errors — a missing or non-string parameter
//! resolves the same way an empty string would.

use custos_contracts::plan::ActionParams;

use crate::registry::ActionPolicy;

/// The parameter's string value, or "" when absent or not a string.
fn param_str<'a>(params: &'a ActionParams, key: &str) -> &'a str {
    params.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

/// Recipients of outbound email must belong to a trusted domain.
///
/// A recipient without an '@' (including a missing parameter) is never
/// trusted.
#[derive(Debug, Clone)]
pub struct EmailDomainPolicy {
    pub trusted_domains: Vec<String>,
}

impl Default for EmailDomainPolicy {
    fn default() -> Self {
        Self {
            trusted_domains: vec!["company.com".to_string(), "partner.org".to_string()],
        }
    }
}

impl ActionPolicy for EmailDomainPolicy {
    fn check(&self, params: &ActionParams) -> bool {
        let recipient = param_str(params, "recipient");
        match recipient.rsplit_once('@') {
            Some((_, domain)) => self.trusted_domains.iter().any(|d| d == domain),
            None => false,
        }
    }
}

/// Email attachments must not carry an executable extension.
#[derive(Debug, Clone)]
pub struct AttachmentPolicy {
    pub forbidden_extensions: Vec<String>,
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self {
            forbidden_extensions: [".exe", ".bat", ".sh", ".js"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ActionPolicy for AttachmentPolicy {
    fn check(&self, params: &ActionParams) -> bool {
        let document = param_str(params, "document").to_lowercase();
        !self
            .forbidden_extensions
            .iter()
            .any(|ext| document.ends_with(ext.as_str()))
    }
}

/// Search queries must not smuggle SQL-shaped payloads.
///
/// Patterns are matched case-insensitively as substrings.
#[derive(Debug, Clone)]
pub struct QuerySanitizationPolicy {
    pub forbidden_patterns: Vec<String>,
}

impl Default for QuerySanitizationPolicy {
    fn default() -> Self {
        Self {
            forbidden_patterns: ["drop table", "delete from", "truncate table", ";"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ActionPolicy for QuerySanitizationPolicy {
    fn check(&self, params: &ActionParams) -> bool {
        let query = param_str(params, "query").to_lowercase();
        !self
            .forbidden_patterns
            .iter()
            .any(|pattern| query.contains(pattern.as_str()))
    }
}
