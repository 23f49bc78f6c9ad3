//! Typed wrappers around the CRM endpoints
//!
//! Each submodule adds an `impl LyceumClient` block, so every call goes through
//! the authenticated request path and its refresh handling.

mod enrollments;
mod finance;
mod groups;
mod managers;
mod rooms;
mod students;
mod teachers;

pub use finance::{overview_window, OverviewWindow};

/// Path of a single record under a collection
pub(crate) fn item_path(collection: &str, id: &str) -> String {
    format!("{collection}/{}", encode_segment(id))
}

/// Percent-encode a path segment so ids cannot change the route
pub(crate) fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_path_escapes_ids() {
        assert_eq!(item_path("/students", "s-1"), "/students/s-1");
        assert_eq!(item_path("/students", "../auth"), "/students/..%2Fauth");
        assert_eq!(item_path("/rooms", "a b"), "/rooms/a%20b");
    }
}
