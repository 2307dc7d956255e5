//! Argument normalization utilities.
//!
//! Transforms CLI arguments before clap parsing so the release flags can be
//! written the legacy way (`-BUILD_VERSION 1.2.3`, in any letter case) as well
//! as the clap way (`--build-version 1.2.3`).

/// Release flags in their clap form, and whether the flag takes a value.
const RELEASE_FLAGS: [(&str, bool); 5] = [
    ("--build-version", true),
    ("--publish", false),
    ("--docker-registry", true),
    ("--docker-registry-username", true),
    ("--docker-registry-password", true),
];

/// Resolve a raw token to its clap long flag.
///
/// Matching ignores letter case, the number of leading dashes and the
/// `_`/`-` word separator, so `-BUILD_VERSION`, `-build_version` and
/// `--build-version` all resolve to `--build-version`.
pub fn canonical_flag(arg: &str) -> Option<(&'static str, bool)> {
    if !arg.starts_with('-') {
        return None;
    }

    let key = arg
        .trim_start_matches('-')
        .to_ascii_lowercase()
        .replace('_', "-");

    RELEASE_FLAGS
        .iter()
        .find(|(long, _)| long.trim_start_matches('-') == key)
        .copied()
}

/// Rewrite release flags into `--long=value` form.
///
/// The value is always the token immediately following the flag, even when it
/// starts with a dash. A value flag given as the final token is dropped so the
/// required-flag check reports it by name. Everything after `--` passes through
/// unchanged.
pub fn normalize_release_flags(args: Vec<String>) -> Vec<String> {
    let mut result = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();

    // Program name
    if let Some(program) = iter.next() {
        result.push(program);
    }

    while let Some(arg) = iter.next() {
        if arg == "--" {
            result.push(arg);
            result.extend(iter);
            break;
        }

        match canonical_flag(&arg) {
            Some((long, true)) => {
                if let Some(value) = iter.next() {
                    result.push(format!("{}={}", long, value));
                }
            }
            Some((long, false)) => result.push(long.to_string()),
            None => result.push(arg),
        }
    }

    result
}

/// Apply all argument normalizations in sequence.
pub fn normalize(args: Vec<String>) -> Vec<String> {
    normalize_release_flags(args)
}
