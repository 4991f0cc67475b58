//! Search engine query templates.

/// Number of primary queries issued by every search.
pub const PRIMARY_QUERY_COUNT: usize = 3;

/// Builds the primary queries, in the order they are run.
///
/// The description is always embedded, even when empty.
pub fn primary_queries(keyword: &str, description: &str) -> [String; PRIMARY_QUERY_COUNT] {
    [
        format!(r#"site:linkedin.com/posts "{keyword}" "{description}""#),
        format!(r#"site:linkedin.com/feed/update "{keyword}" "{description}""#),
        format!(r#"inurl:linkedin.com/posts "{keyword}" "{description}""#),
    ]
}

/// Query used once when no primary query produced anything.
pub fn broader_query(keyword: &str) -> String {
    format!(r#"site:linkedin.com/posts "{keyword}""#)
}
