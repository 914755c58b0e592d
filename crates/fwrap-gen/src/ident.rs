//! Identifier synthesis.
//!
//! Fortran identifiers are case-insensitive, at most 63 characters long and
//! may not start with a digit or an underscore. Every name the generator
//! emits goes through [`mangle`], which is deterministic and idempotent.

/// Longest identifier the Fortran standard allows.
pub const MAX_IDENT_LEN: usize = 63;

/// Number of retained characters that also feed the hash of a shortened
/// identifier, so the hash digits never hide part of the distinguishing text.
const HASH_BACKTRACK: usize = 8;

/// What [`mangle_with_report`] had to change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MangleReport {
    /// A leading run of digits or underscores was moved to the end.
    pub moved_prefix: bool,
    /// The name was too long and its tail was replaced by a hash.
    pub shortened: bool,
}

impl MangleReport {
    pub fn changed(&self) -> bool {
        self.moved_prefix || self.shortened
    }
}

/// Turn an arbitrary symbol into a valid Fortran identifier.
pub fn mangle(raw: &str) -> String {
    mangle_with_report(raw).0
}

/// Like [`mangle`], also reporting which rewrites were applied.
pub fn mangle_with_report(raw: &str) -> (String, MangleReport) {
    let mut report = MangleReport::default();
    let chars: Vec<char> = raw.chars().collect();

    let split = chars
        .iter()
        .position(|&c| c != '_' && !c.is_ascii_digit())
        .unwrap_or(chars.len());

    let mut result = if split == 0 && !chars.is_empty() {
        chars
    } else {
        report.moved_prefix = !chars.is_empty();
        let (head, rest) = chars.split_at(split);
        let mut moved = if rest.is_empty() {
            vec!['f']
        } else {
            rest.to_vec()
        };
        moved.extend_from_slice(head);
        moved
    };

    if result.len() > MAX_IDENT_LEN {
        result = shorten(&result);
        report.shortened = true;
    }

    let result: String = result.into_iter().collect();
    debug_assert!(is_valid_identifier(&result), "mangled '{}' is invalid", result);
    (result, report)
}

/// Keep the first 63 characters and overwrite their end with a base-36 hash
/// of the UTF-8 bytes from 8 characters before the cut to the end.
fn shorten(chars: &[char]) -> Vec<char> {
    let tail: String = chars[MAX_IDENT_LEN - HASH_BACKTRACK..].iter().collect();
    let hash = tail
        .bytes()
        .fold(5381u32, |h, b| h.wrapping_mul(33).wrapping_add(b as u32));
    let digits = base36(hash);

    let mut result = chars[..MAX_IDENT_LEN].to_vec();
    let start = MAX_IDENT_LEN - digits.len();
    result[start..].copy_from_slice(&digits);
    result
}

/// Minimal base-36 encoding using `0-9A-Z`.
fn base36(mut value: u32) -> Vec<char> {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return vec!['0'];
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    digits.reverse();
    digits
}

/// Whether `name` can be used verbatim as a Fortran identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    match name.chars().next() {
        None => false,
        Some(c) if c == '_' || c.is_ascii_digit() => false,
        Some(_) => name.chars().count() <= MAX_IDENT_LEN,
    }
}

/// Private implementation name for a generated procedure:
/// `swigf_[nspace_][aggregate_]base`.
pub fn proxy_name(nspace: Option<&str>, aggregate: Option<&str>, base: &str) -> String {
    let mut name = String::from("swigf");
    for part in [nspace, aggregate].into_iter().flatten() {
        name.push('_');
        name.push_str(part);
    }
    name.push('_');
    name.push_str(base);
    mangle(&name)
}

/// Linkage name of the C wrapper for `symbol`.
pub fn wrapper_name(symbol: &str) -> String {
    format!("_wrap_{}", symbol)
}

/// Name of the `bind(C)` interface routine for `symbol`.
pub fn interface_name(symbol: &str) -> String {
    mangle(&format!("swigc_{}", symbol))
}
