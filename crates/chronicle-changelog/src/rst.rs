//! Minimal reStructuredText line builder

/// Underline characters indexed by section depth.
const SECTION_UNDERLINES: &[char] = &[
    '=', '-', '~', '^', '.', '*', '+', ':', '`', '\'', '"', '_', '#',
];

/// Stateful accumulator of RST lines.
///
/// Callers are responsible for calling `set_title` first (at most once), for
/// monotonic depth usage, and for staying within the underline palette.
#[derive(Debug, Default)]
pub struct RstBuilder {
    lines: Vec<String>,
}

impl RstBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the overlined and underlined document title.
    pub fn set_title(&mut self, title: &str) {
        let bar = SECTION_UNDERLINES[0].to_string().repeat(title.chars().count());
        self.lines.push(bar.clone());
        self.lines.push(title.to_string());
        self.lines.push(bar);
        self.lines.push(String::new());
    }

    /// Write a section heading at the given depth.
    pub fn add_section(&mut self, name: &str, depth: usize) {
        let underline = SECTION_UNDERLINES[depth].to_string().repeat(name.chars().count());
        self.lines.push(name.to_string());
        self.lines.push(underline);
        self.lines.push(String::new());
    }

    /// Append raw RST content verbatim.
    pub fn add_raw_rst(&mut self, content: &str) {
        self.lines.push(content.to_string());
    }

    /// Append a bullet list item; continuation lines are indented under the
    /// bullet.
    pub fn add_list_item(&mut self, content: &str) {
        for (i, line) in content.lines().enumerate() {
            if i == 0 {
                self.lines.push(format!("- {line}"));
            } else {
                self.lines.push(format!("  {line}"));
            }
        }
    }

    /// Join all accumulated lines into the final document text.
    pub fn generate(&self) -> String {
        self.lines.join("\n")
    }
}
