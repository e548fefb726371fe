//! Shared pure functions for command-token extraction.
//!
//! Used by the registry to decide whether a message is command-shaped and to
//! normalize `/cmd@botname` to `/cmd` before matching.

/// Returns the command token of `text` if it begins with `/`, with any
/// `@botname` suffix stripped. Matching against registered commands is
/// case-sensitive, so no case folding happens here.
#[inline]
pub fn command_token(text: &str) -> Option<&str> {
    let token = text.split_whitespace().next()?;
    if !token.starts_with('/') || token.len() == 1 {
        return None;
    }
    Some(token.split('@').next().unwrap_or(token))
}
