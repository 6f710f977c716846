/// PEP 503 normalization: lowercase, with `_` and `.` folded into `-`.
pub fn canonicalize_package_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut last_dash = false;
    for ch in name.trim().chars() {
        let ch = match ch {
            '_' | '.' | '-' => '-',
            other => other.to_ascii_lowercase(),
        };
        if ch == '-' {
            if last_dash {
                continue;
            }
            last_dash = true;
        } else {
            last_dash = false;
        }
        normalized.push(ch);
    }
    normalized
}

/// Canonical distribution name of a requirement string such as
/// `a2a-sdk[http]>=0.3; python_version >= "3.10"`.
pub fn dependency_name(spec: &str) -> String {
    let parts = RequirementParts::split(spec);
    canonicalize_package_name(parts.name)
}

pub(crate) fn strip_wrapping_quotes(input: &str) -> &str {
    if input.len() >= 2 {
        let bytes = input.as_bytes();
        let first = bytes[0];
        let last = bytes[input.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &input[1..input.len() - 1];
        }
    }
    input
}

/// A requirement string cut into its name, extras and the remainder
/// (version specifiers, direct reference and markers), without normalizing
/// any of the pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RequirementParts<'a> {
    pub(crate) name: &'a str,
    pub(crate) extras: &'a str,
    pub(crate) rest: &'a str,
}

impl<'a> RequirementParts<'a> {
    pub(crate) fn split(spec: &'a str) -> Self {
        let trimmed = strip_wrapping_quotes(spec.trim());
        let end = trimmed
            .char_indices()
            .find(|(_, ch)| {
                ch.is_ascii_whitespace()
                    || matches!(ch, '<' | '>' | '=' | '!' | '~' | ';' | '[' | '@' | '(')
            })
            .map_or(trimmed.len(), |(idx, _)| idx);
        let name = &trimmed[..end];
        let after = &trimmed[end..];
        let (extras, rest) = if after.starts_with('[') {
            match after.find(']') {
                Some(close) => (&after[..=close], &after[close + 1..]),
                None => (after, ""),
            }
        } else {
            ("", after)
        };
        Self { name, extras, rest }
    }

    /// Direct references (`name @ url`) pin the requirement to a location.
    pub(crate) fn is_direct_reference(&self) -> bool {
        self.rest.trim_start().starts_with('@')
    }

    /// The environment marker, without the leading `;`.
    pub(crate) fn marker(&self) -> Option<&'a str> {
        let idx = self.rest.find(';')?;
        let marker = self.rest[idx + 1..].trim();
        (!marker.is_empty()).then_some(marker)
    }
}
