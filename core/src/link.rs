//! Token link parsing
//!
//! Pulls a token contract address out of whatever the user pasted: a raw
//! address, a clanker.world page, or a zora.co coin page.

use std::sync::OnceLock;

use regex::Regex;

use crate::campaign::TokenFamily;

const CLANKER_PATTERNS: [&str; 4] = [
    r"clanker\.world/clanker/(0x[a-fA-F0-9]{40})",
    r"clanker\.world/clanker/([a-fA-F0-9]{40})",
    r"clanker/(0x[a-fA-F0-9]{40})",
    r"clanker/([a-fA-F0-9]{40})",
];

const ZORA_PATTERNS: [&str; 4] = [
    r"zora\.co/coin/base:(0x[a-fA-F0-9]{40})",
    r"zora\.co/coin/(0x[a-fA-F0-9]{40})",
    r"zora/(0x[a-fA-F0-9]{40})",
    r"zora/([a-fA-F0-9]{40})",
];

/// Compiled pattern lists, Clanker first.
struct LinkPatterns {
    clanker: Vec<Regex>,
    zora: Vec<Regex>,
}

fn patterns() -> &'static LinkPatterns {
    static PATTERNS: OnceLock<LinkPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| LinkPatterns {
        clanker: CLANKER_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("invalid clanker link pattern"))
            .collect(),
        zora: ZORA_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("invalid zora link pattern"))
            .collect(),
    })
}

fn first_capture<'a>(regexes: &[Regex], input: &'a str) -> Option<&'a str> {
    regexes
        .iter()
        .find_map(|re| re.captures(input))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn with_prefix(address: &str) -> String {
    if address.starts_with("0x") {
        address.to_string()
    } else {
        format!("0x{}", address)
    }
}

/// Extract a token address from a pasted link or raw address.
///
/// Input that already starts with `0x` is returned unchanged. Otherwise the
/// Clanker patterns are tried before the Zora patterns and the first match
/// wins.
pub fn extract_token_address(input: &str) -> Option<String> {
    if input.starts_with("0x") {
        tracing::debug!("Direct address detected: {}", input);
        return Some(input.to_string());
    }

    let patterns = patterns();
    let found = first_capture(&patterns.clanker, input)
        .or_else(|| first_capture(&patterns.zora, input))
        .map(with_prefix);

    match &found {
        Some(address) => tracing::debug!("Token address extracted: {}", address),
        None => tracing::debug!("No token address found in {:?}", input),
    }
    found
}

/// Which family's URL shape matched, if any.
///
/// Raw addresses carry no family information and yield `None`. Clanker
/// shapes are checked first, same as [`extract_token_address`].
pub fn detect_family(input: &str) -> Option<TokenFamily> {
    if input.starts_with("0x") {
        return None;
    }
    let patterns = patterns();
    if first_capture(&patterns.clanker, input).is_some() {
        Some(TokenFamily::Clanker)
    } else if first_capture(&patterns.zora, input).is_some() {
        Some(TokenFamily::Zora)
    } else {
        None
    }
}
