use std::sync::LazyLock;

use regex::Regex;

/// User mention markup: `<@123>` or the legacy nickname form `<@!123>`.
static MENTION_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<@!?(\d+)>").ok());

/// Extract user ids from mention markup in `text`, in order of first
/// appearance. Repeated mentions are collapsed; anything that is not a
/// mention is ignored.
pub fn parse_mentions(text: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    let Some(re) = MENTION_RE.as_ref() else {
        return ids;
    };
    for caps in re.captures_iter(text) {
        let id = &caps[1];
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}
