//! Offset/limit page planning
//!
//! Produces the page sequence for a paginated extraction. The planner
//! cannot know how many pages actually hold data, so it enumerates up to
//! the caller's page cap and leaves termination to the executor, which
//! stops at the first page returning fewer rows than requested.

use tracing::debug;

use crate::planner::Segment;

/// Plan the ordered page sequence for a paginated extraction.
///
/// Page `i` covers rows `[i * limit, (i + 1) * limit)`. A non-positive
/// `limit` disables splitting entirely and yields a single [`Segment::Whole`],
/// running the base request as-is.
///
/// # Arguments
/// * `limit` - Rows requested per page
/// * `max_pages` - Upper bound on pages to enumerate
pub fn page_segments(limit: i64, max_pages: usize) -> Vec<Segment> {
    if limit <= 0 {
        debug!(limit, "Non-positive page limit, planning single-shot query");
        return vec![Segment::Whole];
    }

    let limit = limit as u64;
    (0..max_pages)
        .map(|index| Segment::Page {
            offset_rows: index as u64 * limit,
            limit_rows: limit,
        })
        .collect()
}
