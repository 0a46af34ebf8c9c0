//! Author lookup for human-written poems
//!
//! The human poem collection is ordered by author, so the poem number alone
//! identifies who wrote it.

use crate::poem::Category;

/// Name returned for numbers outside the collection and for AI poems
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Map a human poem number to its author
pub fn author_by_poem_number(poem_number: u32) -> &'static str {
    match poem_number {
        1..=20 => "E.E. Cummings",
        21..=40 => "Pablo Neruda",
        41..=50 => "T.S. Eliot",
        51..=60 => "Ralph Waldo Emerson",
        61..=80 => "Emily Dickinson",
        81..=90 => "Oscar Wilde",
        91..=100 => "Sylvia Plath",
        _ => UNKNOWN_AUTHOR,
    }
}

/// Author for a poem of the given category
///
/// AI-generated poems have no author.
pub fn author_of(category: Category, poem_number: u32) -> &'static str {
    match category {
        Category::Human => author_by_poem_number(poem_number),
        Category::Ai => UNKNOWN_AUTHOR,
    }
}
