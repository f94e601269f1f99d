/// A significant source line split into words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    /// Whitespace separated words, comment removed
    pub words: Vec<&'a str>,
    /// The line text without comment and surrounding whitespace
    pub text: &'a str,
    /// 1-based line number
    pub line: u32,
}

/// Lazy scanner over the lines of one VM module
///
/// Blank and comment-only lines are skipped. The scanner only moves
/// forward; re-reading a module means building a new one.
pub struct Lexer<'a> {
    lines: std::str::Lines<'a>,
    line: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines(),
            line: 0,
        }
    }

    /// Current line number (the last line handed out or skipped)
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for raw in self.lines.by_ref() {
            self.line += 1;

            let text = strip_comment(raw).trim();
            if text.is_empty() {
                continue;
            }

            return Some(Line {
                words: text.split_whitespace().collect(),
                text,
                line: self.line,
            });
        }
        None
    }
}

/// Remove a `//` comment from the end of a line
pub fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}
