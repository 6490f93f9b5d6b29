//! Platform version → capability `Tier`.

use crate::Tier;

/// First minor version of the 1.x line with event-driven armor changes.
const INTERMEDIATE_MINOR: u32 = 13;
/// First minor version of the 1.x line with the current equipment events.
const CURRENT_MINOR: u32 = 20;

/// Classify a reported platform version.
///
/// Accepts `"<major>.<minor>[.<patch>][-suffix]"`, tolerating a leading `v`,
/// surrounding whitespace, and distribution strings of the form
/// `"git-Paper-123 (MC: 1.20.4)"` or `"Paper 1.20.4"`. Anything unparseable falls back to
/// `Tier::Baseline` with a warning; this never fails.
pub fn detect(version: &str) -> Tier {
    match parse_version(version) {
        Some((major, minor)) => {
            let tier = classify(major, minor);
            tracing::debug!(version, major, minor, ?tier, "platform version classified");
            tier
        }
        None => {
            tracing::warn!(
                version,
                fallback = ?Tier::Baseline,
                "unrecognised platform version, assuming the most conservative tier"
            );
            Tier::Baseline
        }
    }
}

fn classify(major: u32, minor: u32) -> Tier {
    if major > 1 || minor >= CURRENT_MINOR {
        Tier::Current
    } else if minor >= INTERMEDIATE_MINOR {
        Tier::Intermediate
    } else {
        Tier::Baseline
    }
}

/// Extracts `(major, minor)`. Patch and suffix are ignored.
pub(crate) fn parse_version(raw: &str) -> Option<(u32, u32)> {
    let core = version_core(raw.trim());
    let core = core.strip_prefix(['v', 'V']).unwrap_or(core);
    let core = core.split(['-', '+', ' ']).next()?;

    let mut parts = core.split('.');
    let major: u32 = leading_number(parts.next()?)?;
    let minor: u32 = leading_number(parts.next()?)?;
    if major == 0 {
        return None;
    }
    Some((major, minor))
}

/// Picks the version out of `"... (MC: 1.20.4)"`. Without a marker, takes
/// the last whitespace-separated token that looks like a version, so
/// `"Paper 1.20.4"` yields `"1.20.4"`.
fn version_core(raw: &str) -> &str {
    if let Some(at) = raw.rfind("MC:") {
        return raw[at + 3..].trim_start().trim_end_matches(')').trim();
    }
    raw.split_whitespace()
        .rev()
        .find(|token| {
            token
                .strip_prefix(['v', 'V'])
                .unwrap_or(*token)
                .starts_with(|c: char| c.is_ascii_digit())
        })
        .unwrap_or(raw)
}

/// Parses the digits at the start of `part`; `"4_R0"` yields `4`.
fn leading_number(part: &str) -> Option<u32> {
    let end = part
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(part.len(), |(idx, _)| idx);
    part[..end].parse().ok()
}

pub fn parse_dotted(raw: &str) -> Vec<u32> {
    raw.trim()
        .trim_start_matches(['v', 'V'])
        .split(['-', '+', ' '])
        .next()
        .unwrap_or_default()
        .split('.')
        .map_while(leading_number)
        .collect()
}

/// True when `candidate` is a strictly newer dotted version than `current`.
/// Missing components count as zero.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    let candidate = parse_dotted(candidate);
    let current = parse_dotted(current);
    if candidate.is_empty() {
        return false;
    }
    let len = candidate.len().max(current.len());
    for idx in 0..len {
        let a = candidate.get(idx).copied().unwrap_or(0);
        let b = current.get(idx).copied().unwrap_or(0);
        if a != b {
            return a > b;
        }
    }
    false
}
