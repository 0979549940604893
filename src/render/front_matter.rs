//! Front matter pages
//!
//! An index page is a YAML document between two `---` lines, followed by the
//! page body.

use serde::Serialize;

use crate::error::Result;

/// Front matter delimiter line.
pub const DELIMITER: &str = "---\n";

/// Notice put at the top of the root page body on the beta channel.
pub const BETA_NOTICE: &str = "::remark-box
---
kind: warning
---

⚠️ This content is marked as **beta**, meaning it's unfinished or still in progress and may change significantly.
::

";

/// Render `manifest` as front matter followed by `body`.
///
/// ```
/// use labpress::render::front_matter;
/// use std::collections::BTreeMap;
///
/// let mut manifest = BTreeMap::new();
/// manifest.insert("kind", "lesson");
///
/// let page = front_matter::page(&manifest, "Hello\n").unwrap();
/// assert_eq!(page, "---\nkind: lesson\n---\nHello\n");
/// ```
pub fn page<T: Serialize + ?Sized>(manifest: &T, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(manifest)?;

    let mut page = String::with_capacity(yaml.len() + body.len() + 2 * DELIMITER.len());
    page.push_str(DELIMITER);
    page.push_str(&yaml);
    if !yaml.ends_with('\n') {
        page.push('\n');
    }
    page.push_str(DELIMITER);
    page.push_str(body);

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::publish::{PublishedContent, TaskMap};
    use crate::manifest::ContentKind;

    #[test]
    fn test_page_round_trips_front_matter() {
        let manifest = PublishedContent {
            kind: ContentKind::Lesson,
            title: "Intro".to_string(),
            description: "First steps".to_string(),
            categories: vec!["linux".to_string()],
            tags: Vec::new(),
            created_at: "2024-05-01".to_string(),
            updated_at: String::new(),
            cover: String::new(),
            playground: None,
            tasks: TaskMap::new(),
            difficulty: None,
            slug: None,
            name: None,
            challenges: Default::default(),
            tutorials: Default::default(),
            courses: Default::default(),
            working_title: None,
        };

        let page = page(&manifest, "Body\n").unwrap();

        assert!(page.starts_with("---\nkind: lesson\n"));
        let (front, body) = page[4..].split_once("---\n").unwrap();
        assert_eq!(body, "Body\n");
        let parsed: PublishedContent = serde_yaml::from_str(front).unwrap();
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn test_beta_notice_is_a_remark_box() {
        assert!(BETA_NOTICE.starts_with("::remark-box\n---\nkind: warning\n---\n"));
        assert!(BETA_NOTICE.ends_with("::\n\n"));
    }
}
