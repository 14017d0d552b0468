/// Heading-to-body mapping for one document. Keys are lowercased heading
/// text; iteration follows first-seen heading order, which the retrieval
/// resolver relies on for its first-match-wins shortcut.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    entries: Vec<(String, String)>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a section. A repeated heading overwrites the earlier body but
    /// keeps its original position (last write wins).
    pub fn insert(&mut self, heading: String, body: String) {
        match self.entries.iter_mut().find(|(key, _)| *key == heading) {
            Some(entry) => entry.1 = body,
            None => self.entries.push((heading, body)),
        }
    }

    pub fn get(&self, heading: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == heading)
            .map(|(_, body)| body.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, body)| (key.as_str(), body.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Partitions `text` into named sections. A line is a heading when, after
/// trimming, it is non-empty, does not start with a colon, and ends with a
/// colon. Lines before the first heading are discarded.
pub fn parse_sections(text: &str) -> SectionMap {
    let mut sections = SectionMap::new();
    let mut current_heading: Option<String> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for line in text.lines() {
        if is_heading(line) {
            if let Some(heading) = current_heading.take() {
                sections.insert(heading, buffer.join("\n").trim().to_string());
                buffer.clear();
            }
            let stripped = line.trim().trim_end_matches(':');
            current_heading = Some(stripped.to_lowercase());
            continue;
        }

        if current_heading.is_some() {
            buffer.push(line);
        }
    }

    if let Some(heading) = current_heading {
        if !buffer.is_empty() {
            sections.insert(heading, buffer.join("\n").trim().to_string());
        }
    }

    sections
}

fn is_heading(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with(':') && trimmed.ends_with(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_style_document_is_split_into_sections() {
        let sections = parse_sections("Education:\nBS in CS.\nSkills:\nPython, Go.");

        assert_eq!(sections.len(), 2);
        assert_eq!(sections.get("education"), Some("BS in CS."));
        assert_eq!(sections.get("skills"), Some("Python, Go."));
    }

    #[test]
    fn preamble_before_first_heading_is_discarded() {
        let sections = parse_sections("John Doe\nResume\nEducation:\nBS in CS.");

        assert_eq!(sections.len(), 1);
        assert_eq!(sections.get("education"), Some("BS in CS."));
    }

    #[test]
    fn colon_leading_line_is_not_a_heading() {
        let sections = parse_sections("Education:\n: not a heading\nBS in CS.");
        assert_eq!(sections.get("education"), Some(": not a heading\nBS in CS."));
    }

    // Repeated headings keep last-write-wins semantics on purpose; this test
    // pins the behavior down rather than endorsing it.
    #[test]
    fn duplicate_heading_keeps_last_body_and_first_position() {
        let sections = parse_sections("Skills:\nPython.\nEducation:\nBS.\nSkills:\nGo.");

        assert_eq!(sections.get("skills"), Some("Go."));
        let order: Vec<&str> = sections.iter().map(|(key, _)| key).collect();
        assert_eq!(order, vec!["skills", "education"]);
    }

    #[test]
    fn heading_key_is_lowercased_and_colon_stripped() {
        let sections = parse_sections("  Work Experience:  \nACME Corp.");
        assert_eq!(sections.get("work experience"), Some("ACME Corp."));
    }

    #[test]
    fn reparsing_reconstructed_text_yields_same_map() {
        let first = parse_sections("Education:\nBS in CS.\nSkills:\nPython, Go.");
        let reconstructed = first
            .iter()
            .map(|(key, body)| format!("{key}:\n{body}"))
            .collect::<Vec<_>>()
            .join("\n");
        let second = parse_sections(&reconstructed);
        assert_eq!(first, second);
    }
}
