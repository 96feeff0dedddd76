use crate::config::SelectorConfig;
use crate::error::{ExtractorError, Result};
use regex::Regex;

/// Compiled form of a [`SelectorConfig`].
///
/// Each marker is a regular expression searched in every class of an element
/// and then in its whole class list, so both single-class anchored patterns
/// and multi-class markers match.
#[derive(Debug, Clone)]
pub struct Selectors {
    file_path: Regex,
    code_table: Regex,
    code_line: Regex,
}

impl Selectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            file_path: compile_marker(&config.file_path_class)?,
            code_table: compile_marker(&config.code_table_class)?,
            code_line: compile_marker(&config.code_line_class)?,
        })
    }

    pub fn is_header(&self, class_attr: &str) -> bool {
        matches_class(&self.file_path, class_attr)
    }

    pub fn is_code_table(&self, class_attr: &str) -> bool {
        matches_class(&self.code_table, class_attr)
    }

    pub fn is_code_line(&self, class_attr: &str) -> bool {
        matches_class(&self.code_line, class_attr)
    }
}

fn compile_marker(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ExtractorError::InvalidSelector {
        pattern: pattern.to_string(),
        source,
    })
}

// The whole list is compared in its canonical single-space form so that
// multi-class markers survive odd whitespace in the markup.
fn matches_class(pattern: &Regex, class_attr: &str) -> bool {
    let classes: Vec<&str> = class_attr.split_whitespace().collect();
    if classes.is_empty() {
        return false;
    }

    classes.iter().any(|class| pattern.is_match(class)) || pattern.is_match(&classes.join(" "))
}
