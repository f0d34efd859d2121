// SPDX-License-Identifier: MPL-2.0
//! Server-produced results and archives.

/// Which archive the server should bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// The annotated output images.
    Images,
    /// The per-image JSON annotations.
    Annotations,
}

impl ArchiveKind {
    /// All archive kinds, in the order they are offered to the user.
    pub const ALL: [ArchiveKind; 2] = [ArchiveKind::Images, ArchiveKind::Annotations];

    /// File name proposed in the save dialog when the server sends none.
    #[must_use]
    pub fn default_filename(self) -> &'static str {
        match self {
            ArchiveKind::Images => "processed_images.zip",
            ArchiveKind::Annotations => "processed_json.zip",
        }
    }

    /// i18n key for the download button label.
    #[must_use]
    pub fn i18n_key(self) -> &'static str {
        match self {
            ArchiveKind::Images => "results-download-images",
            ArchiveKind::Annotations => "results-download-annotations",
        }
    }
}

/// A downloaded archive blob and the file name to save it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePayload {
    pub kind: ArchiveKind,
    pub bytes: Vec<u8>,
    pub suggested_filename: String,
}

/// One output image produced by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    filename: String,
    remote_url: String,
    source_name: Option<String>,
}

impl ResultItem {
    /// Creates a result item.
    pub fn new(
        filename: impl Into<String>,
        remote_url: impl Into<String>,
        source_name: Option<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            remote_url: remote_url.into(),
            source_name,
        }
    }

    /// Output file name as reported by the server.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Session-scoped URL the image can be fetched from.
    #[must_use]
    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    /// Name of the staged file this result was produced from, if known.
    #[must_use]
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }
}

/// Pairs output file names with the submitted source names.
///
/// Response order is not trusted. A result belongs to the source whose name
/// it ends with (the server prefixes outputs, e.g. `annotated_a.png`). Each
/// result takes the longest unclaimed source it ends with; among equal names
/// the earliest submission is taken first, so each source is claimed at most
/// once. Matched results come first in submission order, unmatched results
/// follow in response order.
#[must_use]
pub fn correlate(submitted: &[String], results: &[String]) -> Vec<(String, Option<String>)> {
    let mut claimed = vec![false; submitted.len()];
    let mut matched: Vec<(usize, &String)> = Vec::new();
    let mut unmatched: Vec<&String> = Vec::new();

    for result in results {
        let best = submitted
            .iter()
            .enumerate()
            .filter(|(i, source)| !claimed[*i] && result.ends_with(source.as_str()))
            // Longest name, then earliest submission.
            .max_by_key(|(i, source)| (source.len(), std::cmp::Reverse(*i)));

        match best {
            Some((index, _)) => {
                claimed[index] = true;
                matched.push((index, result));
            }
            None => unmatched.push(result),
        }
    }

    matched.sort_by_key(|(index, _)| *index);
    matched
        .into_iter()
        .map(|(index, result)| (result.clone(), Some(submitted[index].clone())))
        .chain(unmatched.into_iter().map(|result| (result.clone(), None)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn archive_kinds_have_distinct_filenames() {
        assert_ne!(
            ArchiveKind::Images.default_filename(),
            ArchiveKind::Annotations.default_filename()
        );
    }

    #[test]
    fn correlate_reorders_by_submission() {
        let submitted = names(&["a.png", "b.png", "c.png"]);
        let results = names(&["annotated_c.png", "annotated_a.png", "annotated_b.png"]);

        let paired = correlate(&submitted, &results);
        let order: Vec<_> = paired.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(
            order,
            vec!["annotated_a.png", "annotated_b.png", "annotated_c.png"]
        );
        assert_eq!(paired[0].1.as_deref(), Some("a.png"));
    }

    #[test]
    fn correlate_appends_unmatched_results() {
        let submitted = names(&["a.png"]);
        let results = names(&["summary.png", "annotated_a.png"]);

        let paired = correlate(&submitted, &results);
        assert_eq!(paired[0], ("annotated_a.png".to_string(), Some("a.png".to_string())));
        assert_eq!(paired[1], ("summary.png".to_string(), None));
    }

    #[test]
    fn correlate_prefers_closest_match() {
        // "b.png" is a suffix of "ab.png"; the longer source keeps its output.
        let submitted = names(&["b.png", "ab.png"]);
        let results = names(&["annotated_ab.png", "annotated_b.png"]);

        let paired = correlate(&submitted, &results);
        assert_eq!(paired[0].0, "annotated_b.png");
        assert_eq!(paired[1].0, "annotated_ab.png");
    }

    #[test]
    fn longer_source_keeps_its_result_when_shorter_one_has_none() {
        // "a.png" is a suffix of "ba.png"; only the "ba.png" output came back.
        let submitted = names(&["a.png", "ba.png"]);
        let results = names(&["annotated_ba.png"]);

        let paired = correlate(&submitted, &results);
        assert_eq!(
            paired,
            vec![("annotated_ba.png".to_string(), Some("ba.png".to_string()))]
        );
    }

    #[test]
    fn suffix_sources_are_each_matched_whatever_the_response_order() {
        let submitted = names(&["a.png", "ba.png"]);
        let results = names(&["annotated_ba.png", "annotated_a.png"]);

        let paired = correlate(&submitted, &results);
        assert_eq!(
            paired,
            vec![
                ("annotated_a.png".to_string(), Some("a.png".to_string())),
                ("annotated_ba.png".to_string(), Some("ba.png".to_string())),
            ]
        );
    }

    #[test]
    fn duplicate_sources_claim_distinct_results() {
        let submitted = names(&["a.png", "a.png"]);
        let results = names(&["annotated_a.png", "annotated_a.png"]);

        let paired = correlate(&submitted, &results);
        assert_eq!(paired.len(), 2);
        assert!(paired
            .iter()
            .all(|(_, source)| source.as_deref() == Some("a.png")));
    }

    #[test]
    fn surplus_output_for_a_duplicate_name_is_unmatched() {
        let submitted = names(&["a.png", "b.png", "a.png"]);
        let results = names(&[
            "annotated_a.png",
            "annotated_a.png",
            "annotated_a.png",
            "annotated_b.png",
        ]);

        let paired = correlate(&submitted, &results);
        let sources: Vec<_> = paired.iter().map(|(_, s)| s.as_deref()).collect();
        assert_eq!(sources, vec![Some("a.png"), Some("b.png"), Some("a.png"), None]);
    }

    #[test]
    fn result_item_accessors() {
        let item = ResultItem::new("annotated_a.png", "http://h/results/annotated_a.png", None);
        assert_eq!(item.filename(), "annotated_a.png");
        assert_eq!(item.remote_url(), "http://h/results/annotated_a.png");
        assert_eq!(item.source_name(), None);
    }
}
