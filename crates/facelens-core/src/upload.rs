//! Grouping uploaded reference photos by person.
//!
//! Photos are named after the person they show, optionally with a copy
//! suffix: `John Doe.jpg`, `John Doe (2).jpg`, `John Doe - Copy.png`.
//! All photos of one person are submitted together in a single request.

use regex::Regex;
use std::sync::OnceLock;

static FILE_NAME_PATTERN: OnceLock<Regex> = OnceLock::new();

fn file_name_pattern() -> &'static Regex {
    FILE_NAME_PATTERN.get_or_init(|| {
        Regex::new(r"^(.+?)( \(\d+\))?( - Copy)?(\.[^.]+)?$").expect("file name pattern is valid")
    })
}

/// Person name encoded in a photo's file name, without copy suffix or extension.
pub fn person_name_from_file_name(file_name: &str) -> Option<String> {
    file_name_pattern()
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// One photo waiting to be submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    /// Base64-encoded image bytes.
    pub image_data: String,
}

/// All photos of one person.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadGroup {
    pub name: String,
    pub images: Vec<String>,
}

impl UploadGroup {
    /// Name as stored by the server: upper-cased, with `%2B` decoded.
    pub fn submit_name(&self) -> String {
        self.name.to_uppercase().replace("%2B", "+")
    }
}

/// Group photos by person name, keeping first-seen order of names and photos.
pub fn group_uploads(files: impl IntoIterator<Item = UploadFile>) -> Vec<UploadGroup> {
    let mut groups: Vec<UploadGroup> = Vec::new();
    for file in files {
        match groups.iter_mut().find(|g| g.name == file.name) {
            Some(group) => group.images.push(file.image_data),
            None => groups.push(UploadGroup {
                name: file.name,
                images: vec![file.image_data],
            }),
        }
    }
    groups
}

/// Per-group completion flags for a batch of grouped submissions.
///
/// Each group finalises its own flag whether its request succeeded or
/// not, so one failure never holds up the rest of the batch.
#[derive(Debug, Clone, Default)]
pub struct UploadTracker {
    uploaded: Vec<bool>,
}

impl UploadTracker {
    pub fn new(groups: usize) -> Self {
        Self {
            uploaded: vec![false; groups],
        }
    }

    pub fn finish(&mut self, group: usize) {
        if let Some(flag) = self.uploaded.get_mut(group) {
            *flag = true;
        }
    }

    pub fn is_finished(&self, group: usize) -> bool {
        self.uploaded.get(group).copied().unwrap_or(false)
    }

    /// True while at least one group of a non-empty batch is outstanding.
    pub fn is_pending(&self) -> bool {
        !self.uploaded.is_empty() && !self.uploaded.iter().all(|&done| done)
    }

    pub fn finished_count(&self) -> usize {
        self.uploaded.iter().filter(|&&done| done).count()
    }

    pub fn len(&self) -> usize {
        self.uploaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploaded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, data: &str) -> UploadFile {
        UploadFile {
            name: name.into(),
            image_data: data.into(),
        }
    }

    #[test]
    fn test_person_name_from_file_name() {
        let cases = [
            ("John Doe.jpg", "John Doe"),
            ("John Doe (2).jpg", "John Doe"),
            ("John Doe - Copy.png", "John Doe"),
            ("John Doe (3) - Copy.jpeg", "John Doe"),
            ("Jane Roe", "Jane Roe"),
            ("J.R. Smith.jpg", "J.R. Smith"),
        ];
        for (input, expected) in cases {
            assert_eq!(person_name_from_file_name(input).as_deref(), Some(expected), "{input}");
        }
        assert_eq!(person_name_from_file_name(""), None);
    }

    #[test]
    fn test_group_uploads_one_group_per_name() {
        let files = vec![
            file("John Doe", "j1"),
            file("Jane Roe", "r1"),
            file("John Doe", "j2"),
            file("John Doe", "j3"),
            file("Jane Roe", "r2"),
        ];
        let groups = group_uploads(files);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "John Doe");
        assert_eq!(groups[0].images, vec!["j1", "j2", "j3"]);
        assert_eq!(groups[1].name, "Jane Roe");
        assert_eq!(groups[1].images, vec!["r1", "r2"]);
        assert_eq!(groups[0].submit_name(), "JOHN DOE");
    }

    #[test]
    fn test_submit_name_decodes_plus() {
        let g = UploadGroup {
            name: "ann%2Bmarie".into(),
            images: vec![],
        };
        assert_eq!(g.submit_name(), "ANN+MARIE");
    }

    #[test]
    fn test_tracker_finalises_groups_independently() {
        let mut t = UploadTracker::new(3);
        assert!(t.is_pending());
        t.finish(2);
        t.finish(0);
        assert!(t.is_pending());
        assert!(t.is_finished(2));
        assert!(!t.is_finished(1));
        assert_eq!(t.finished_count(), 2);
        t.finish(1);
        assert!(!t.is_pending());
        // out of range is ignored
        t.finish(9);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_empty_tracker_is_not_pending() {
        let t = UploadTracker::new(0);
        assert!(t.is_empty());
        assert!(!t.is_pending());
    }
}
