use crate::extractor::Selectors;
use dom_query::{Document, NodeRef, Selection};
use serde::Serialize;
use tracing::{debug, warn};

/// One reconstructed file: its relative path and the code lines found for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    pub path: String,
    pub lines: Vec<String>,
}

impl CodeBlock {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// File content as written to disk: lines joined by `\n`, no trailing newline.
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }
}

/// Path-to-lines mapping in first-seen order.
///
/// Inserting a path that is already present replaces its lines but keeps
/// its original position, like inserting into an ordered map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CodeBlocks {
    blocks: Vec<CodeBlock>,
}

impl CodeBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: String, lines: Vec<String>) {
        match self.blocks.iter_mut().find(|block| block.path == path) {
            Some(existing) => existing.lines = lines,
            None => self.blocks.push(CodeBlock { path, lines }),
        }
    }

    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.blocks
            .iter()
            .find(|block| block.path == path)
            .map(|block| block.lines.as_slice())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CodeBlock> {
        self.blocks.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|block| block.path.as_str())
    }

    /// Blocks that will not produce a file because no code line matched.
    pub fn empty_paths(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter(|block| block.is_empty())
            .map(|block| block.path.clone())
            .collect()
    }

    pub fn total_lines(&self) -> usize {
        self.blocks.iter().map(|block| block.lines.len()).sum()
    }
}

impl<'a> IntoIterator for &'a CodeBlocks {
    type Item = &'a CodeBlock;
    type IntoIter = std::slice::Iter<'a, CodeBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

pub fn parse_document(html: &str) -> Document {
    Document::from(html)
}

/// Collect every code block of `document`.
///
/// `on_progress` receives `i / n * 100` before header `i` of `n` is handled.
pub fn compute_blocks(
    document: &Document,
    selectors: &Selectors,
    on_progress: Option<&dyn Fn(f64)>,
) -> CodeBlocks {
    let all_elements = document.select("*");
    let elements = all_elements.nodes();

    let headers: Vec<usize> = elements
        .iter()
        .enumerate()
        .filter(|(_, node)| class_attr(node).is_some_and(|class| selectors.is_header(&class)))
        .map(|(position, _)| position)
        .collect();

    if headers.is_empty() {
        warn!("No file headers found. Check if the HTML structure matches the expected pattern.");
    }

    let total_headers = headers.len();
    let mut blocks = CodeBlocks::new();

    for (index, &position) in headers.iter().enumerate() {
        if let Some(callback) = on_progress {
            callback(index as f64 / total_headers as f64 * 100.0);
        }

        let Some(path) = header_path(&elements[position].text()) else {
            debug!("Skipping header {} with an empty file path", index + 1);
            continue;
        };

        // Document order puts the header's own descendants first, then
        // everything after it.
        let lines = elements[position + 1..]
            .iter()
            .find(|node| is_code_table(node, selectors))
            .map(|table| code_lines(table, selectors))
            .unwrap_or_default();

        debug!("Header '{}' has {} code lines", path, lines.len());
        blocks.insert(path, lines);
    }

    blocks
}

/// Turn header text into a relative file path.
///
/// Surrounding whitespace is trimmed and at most one trailing colon removed.
/// Returns `None` when nothing is left.
pub fn header_path(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let path = trimmed.strip_suffix(':').unwrap_or(trimmed);

    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

fn class_attr(node: &NodeRef) -> Option<String> {
    node.attr("class").map(|class| class.to_string())
}

fn is_code_table(node: &NodeRef, selectors: &Selectors) -> bool {
    node.node_name()
        .is_some_and(|name| name.eq_ignore_ascii_case("table"))
        && class_attr(node).is_some_and(|class| selectors.is_code_table(&class))
}

fn code_lines(table: &NodeRef, selectors: &Selectors) -> Vec<String> {
    let rows = Selection::from(*table).select("tr");

    rows.nodes()
        .iter()
        .filter(|row| class_attr(row).is_some_and(|class| selectors.is_code_line(&class)))
        .map(|row| row.text().trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;
    use std::cell::RefCell;

    const TWO_FILES: &str = r#"
    <html>
    <body>
        <div class="text-sm text-zinc-400 mb-2 font-mono">test.py:</div>
        <table class="syntax-highlight">
            <tr class="line added"><td>print("Hello, World!")</td></tr>
            <tr class="line added"><td>print("This is a test")</td></tr>
        </table>

        <div class="text-sm text-zinc-400 mb-2 font-mono">folder/test2.py:</div>
        <table class="syntax-highlight">
            <tr class="line added"><td>def test_function():</td></tr>
            <tr class="line added"><td>    return "Test"</td></tr>
        </table>
    </body>
    </html>
    "#;

    fn blocks_for(html: &str) -> CodeBlocks {
        let selectors = Selectors::compile(&SelectorConfig::default()).unwrap();
        compute_blocks(&parse_document(html), &selectors, None)
    }

    fn header(text: &str) -> String {
        format!(r#"<div class="text-sm text-zinc-400 mb-2 font-mono">{}</div>"#, text)
    }

    fn table(rows: &[&str]) -> String {
        let rows: String = rows
            .iter()
            .map(|row| format!(r#"<tr class="line added"><td>{}</td></tr>"#, row))
            .collect();
        format!(r#"<table class="syntax-highlight">{}</table>"#, rows)
    }

    #[test]
    fn test_two_files_in_document_order() {
        let blocks = blocks_for(TWO_FILES);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks.paths().collect::<Vec<_>>(), vec!["test.py", "folder/test2.py"]);
        assert_eq!(
            blocks.get("test.py").unwrap(),
            &["print(\"Hello, World!\")", "print(\"This is a test\")"]
        );
        assert_eq!(
            blocks.get("folder/test2.py").unwrap(),
            &["def test_function():", "return \"Test\""]
        );
    }

    #[test]
    fn test_line_counts_follow_rows() {
        let html = format!(
            "{}{}{}{}{}{}",
            header("a.rs"),
            table(&["1"]),
            header("b.rs"),
            table(&["1", "2", "3"]),
            header("c.rs"),
            table(&["1", "2"])
        );
        let blocks = blocks_for(&html);

        let counts: Vec<usize> = blocks.iter().map(|block| block.lines.len()).collect();
        assert_eq!(counts, vec![1, 3, 2]);
        assert_eq!(blocks.total_lines(), 6);
    }

    #[test]
    fn test_no_headers_gives_empty_mapping() {
        let blocks = blocks_for("<html><body><h1>Test</h1><p>This is a test</p></body></html>");
        assert!(blocks.is_empty());

        assert!(blocks_for("").is_empty());
    }

    #[test]
    fn test_header_without_table_is_present_but_empty() {
        let blocks = blocks_for(&header("lonely.py:"));

        assert!(blocks.contains("lonely.py"));
        assert!(blocks.get("lonely.py").unwrap().is_empty());
        assert_eq!(blocks.empty_paths(), vec!["lonely.py".to_string()]);
    }

    #[test]
    fn test_header_skips_tables_with_other_classes() {
        let html = format!(
            r#"{}<table class="plain"><tr class="line added"><td>nope</td></tr></table>{}"#,
            header("x.py"),
            table(&["yes"])
        );
        let blocks = blocks_for(&html);
        assert_eq!(blocks.get("x.py").unwrap(), &["yes"]);
    }

    #[test]
    fn test_only_matching_rows_are_collected() {
        let html = format!(
            r#"{}<table class="syntax-highlight">
                <tr class="line"><td>context</td></tr>
                <tr class="line added"><td>kept</td></tr>
                <tr class="line removed"><td>gone</td></tr>
                <tr class="line added"><td><span>a</span> <span>b</span></td></tr>
            </table>"#,
            header("diff.py")
        );
        let blocks = blocks_for(&html);
        assert_eq!(blocks.get("diff.py").unwrap(), &["kept", "a b"]);
    }

    #[test]
    fn test_table_inside_header_comes_before_later_tables() {
        let html = format!(
            r#"<div class="text-sm text-zinc-400 mb-2 font-mono">nested.py{}</div>{}"#,
            table(&["inner"]),
            table(&["outer"])
        );
        let blocks = blocks_for(&html);

        assert_eq!(blocks.len(), 1);
        let block = blocks.iter().next().unwrap();
        // The header's text includes its descendants.
        assert!(block.path.starts_with("nested.py"));
        assert_eq!(block.lines, vec!["inner"]);
    }

    #[test]
    fn test_two_headers_can_share_the_next_table() {
        let html = format!("{}{}{}", header("first.py"), header("second.py"), table(&["shared"]));
        let blocks = blocks_for(&html);

        assert_eq!(blocks.get("first.py").unwrap(), &["shared"]);
        assert_eq!(blocks.get("second.py").unwrap(), &["shared"]);
    }

    #[test]
    fn test_trailing_colon_rule() {
        assert_eq!(header_path("src/app.py:"), Some("src/app.py".to_string()));
        assert_eq!(header_path("src/app.py"), Some("src/app.py".to_string()));
        assert_eq!(header_path("a.py::"), Some("a.py:".to_string()));
        assert_eq!(header_path("  spaced.py:  \n"), Some("spaced.py".to_string()));
        assert_eq!(header_path(":"), None);
        assert_eq!(header_path("   "), None);
    }

    #[test]
    fn test_colon_only_header_is_skipped() {
        let html = format!("{}{}{}{}", header(":"), table(&["orphan"]), header("kept.py"), table(&["x"]));
        let blocks = blocks_for(&html);

        assert_eq!(blocks.len(), 1);
        assert!(blocks.contains("kept.py"));
    }

    #[test]
    fn test_duplicate_path_last_wins() {
        let html = format!(
            "{}{}{}{}{}{}",
            header("dup.py"),
            table(&["old"]),
            header("other.py"),
            table(&["o"]),
            header("dup.py:"),
            table(&["new", "newer"])
        );
        let blocks = blocks_for(&html);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks.get("dup.py").unwrap(), &["new", "newer"]);
        assert_eq!(blocks.paths().next(), Some("dup.py"));
    }

    #[test]
    fn test_header_with_extra_classes_matches() {
        let html = format!(
            r#"<div class="text-sm text-zinc-400 mb-2 font-mono extra">extra.py</div>{}"#,
            table(&["ok"])
        );
        assert!(blocks_for(&html).contains("extra.py"));
    }

    #[test]
    fn test_custom_selectors() {
        let html = r#"
            <div class="file-path">test.py:</div>
            <table class="code-table">
                <tr class="code-line"><td>print("Hello, World!")</td></tr>
            </table>
        "#;
        let config = SelectorConfig {
            file_path_class: "file-path".to_string(),
            code_table_class: "code-table".to_string(),
            code_line_class: "code-line".to_string(),
        };
        let selectors = Selectors::compile(&config).unwrap();
        let blocks = compute_blocks(&parse_document(html), &selectors, None);

        assert_eq!(blocks.get("test.py").unwrap(), &["print(\"Hello, World!\")"]);
        assert!(blocks_for(html).is_empty());
    }

    #[test]
    fn test_progress_reports_each_header() {
        let selectors = Selectors::compile(&SelectorConfig::default()).unwrap();
        let seen = RefCell::new(Vec::new());
        let record = |percent: f64| seen.borrow_mut().push(percent);

        let html = format!("{}{}{}{}", header("a"), table(&["1"]), header("b"), table(&["2"]));
        compute_blocks(&parse_document(&html), &selectors, Some(&record));

        assert_eq!(*seen.borrow(), vec![0.0, 50.0]);
    }

    #[test]
    fn test_block_content_has_no_trailing_newline() {
        let block = CodeBlock {
            path: "x".to_string(),
            lines: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(block.content(), "a\nb");
    }
}
