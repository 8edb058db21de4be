//! Reply reassembly
//!
//! Fragments arrive one per frame. Backends occasionally deliver the same
//! fragment twice, so a non-whitespace fragment that the reply already ends
//! with is dropped. Whitespace-only fragments are always kept: a single space
//! would otherwise be swallowed whenever the reply already ends in one.

/// Reserved frame marking the end of a reply. Never part of the content.
pub const END_OF_STREAM: &str = "__END__";

/// What a fragment did to the reply it was applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// The reply is complete
    Finished,
    /// Exact repeat of the reply's tail, discarded
    Duplicate,
    /// Appended to the reply
    Appended,
}

/// Decide what `fragment` does to `content` without touching it
pub fn classify(content: &str, fragment: &str) -> FragmentOutcome {
    if fragment == END_OF_STREAM {
        return FragmentOutcome::Finished;
    }

    if !is_whitespace_only(fragment) && content.ends_with(fragment) {
        return FragmentOutcome::Duplicate;
    }

    FragmentOutcome::Appended
}

/// Apply one fragment to a reply
pub fn accumulate(content: &mut String, fragment: &str) -> FragmentOutcome {
    let outcome = classify(content, fragment);
    if outcome == FragmentOutcome::Appended {
        content.push_str(fragment);
    }
    outcome
}

/// Fold a whole fragment sequence, stopping at the end-of-stream marker
pub fn reassemble<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut content = String::new();
    for fragment in fragments {
        if accumulate(&mut content, fragment) == FragmentOutcome::Finished {
            break;
        }
    }
    content
}

/// Empty fragments count as whitespace, same as `^\s*$`
fn is_whitespace_only(fragment: &str) -> bool {
    fragment.chars().all(char::is_whitespace)
}
