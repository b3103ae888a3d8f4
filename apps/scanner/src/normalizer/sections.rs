use crate::extraction::model::LanguageModel;

/// Byte range of a section body (heading line excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub start: usize,
    pub end: usize,
}

impl Section {
    pub fn contains(&self, start: usize, end: usize) -> bool {
        self.start <= start && end <= self.end
    }
}

/// Locates the experience section: from the first experience heading to the next
/// section heading of any kind, or the end of the text.
pub fn find_experience_section(text: &str, model: &LanguageModel) -> Option<Section> {
    let mut offset = 0;
    let mut body_start: Option<usize> = None;

    for line in text.split('\n') {
        let line_start = offset;
        offset += line.len() + 1;

        match body_start {
            None if model.is_experience_heading(line) => {
                body_start = Some(offset.min(text.len()));
            }
            Some(start) if model.is_section_heading(line) => {
                return Some(Section {
                    start,
                    end: line_start,
                });
            }
            _ => {}
        }
    }

    body_start.map(|start| Section {
        start,
        end: text.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::model::test_model;

    #[test]
    fn test_section_runs_until_next_heading() {
        let text = "Jane Doe\nExperience\nEngineer at Acme\nEducation\nBSc";
        let section = find_experience_section(text, &test_model()).unwrap();
        assert_eq!(&text[section.start..section.end], "Engineer at Acme\n");
    }

    #[test]
    fn test_section_runs_to_end_of_text() {
        let text = "PROFESSIONAL EXPERIENCE:\nAnalyst, Globex Inc";
        let section = find_experience_section(text, &test_model()).unwrap();
        assert_eq!(&text[section.start..section.end], "Analyst, Globex Inc");
    }

    #[test]
    fn test_no_heading_means_no_section() {
        let text = "Python, Go, 5 years experience";
        assert!(find_experience_section(text, &test_model()).is_none());
    }

    #[test]
    fn test_heading_on_last_line_yields_empty_section() {
        let text = "Jane Doe\nExperience";
        let section = find_experience_section(text, &test_model()).unwrap();
        assert_eq!(section.start, section.end);
    }
}
