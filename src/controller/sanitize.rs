//! Raw game-text normalization.
//!
//! Two rewrites, both idempotent:
//! - bracketed special-item markers carry opaque game-internal blobs and are
//!   replaced with a fixed placeholder;
//! - a zero-width non-joiner is inserted after every `@` so Discord never
//!   resolves a live user/role mention, independent of the explicit
//!   mention suppression applied on delivery.

use fancy_regex::Regex;
use once_cell::sync::Lazy;

/// Placeholder shown in place of embedded special-item blobs.
const ITEM_PLACEHOLDER: &str = "<blueprint>";

static SPECIAL_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[special-item=.*?\]").expect("special-item pattern is valid")
});

// Lookahead keeps the rewrite idempotent: an `@` already followed by the
// separator is left alone.
static MENTION_TRIGGER: Lazy<Regex> =
    Lazy::new(|| Regex::new("@(?!\u{200c})").expect("mention pattern is valid"));

/// Normalize raw game-event text before any downstream use. Pure and
/// idempotent.
pub fn sanitize(raw: &str) -> String {
    let text = SPECIAL_ITEM.replace_all(raw, ITEM_PLACEHOLDER);
    MENTION_TRIGGER
        .replace_all(&text, "@\u{200c}")
        .into_owned()
}
