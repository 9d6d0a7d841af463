//! Line-oriented payloads.

/// Input to the line-writing operations.
///
/// Both shapes normalize to the same sequence of logical lines, without
/// terminators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineInput {
    /// Already-split lines. One trailing `\n` or `\r\n` per entry is ignored.
    Lines(Vec<String>),
    /// Raw text, split on line breaks.
    ///
    /// A trailing line break does not start an empty last line: `"a\n"` is
    /// the single line `a`, not `a` followed by an empty line.
    Text(String),
}

impl LineInput {
    /// Normalize into logical lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        match self {
            Self::Lines(lines) => lines
                .into_iter()
                .map(|mut line| {
                    if line.ends_with('\n') {
                        line.pop();
                        if line.ends_with('\r') {
                            line.pop();
                        }
                    }
                    line
                })
                .collect(),
            Self::Text(text) => text.lines().map(str::to_owned).collect(),
        }
    }

    /// Render as text with every line terminated by `\n`.
    #[must_use]
    pub fn render(self) -> String {
        let lines = self.into_lines();
        let mut out = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

impl From<Vec<String>> for LineInput {
    fn from(lines: Vec<String>) -> Self {
        Self::Lines(lines)
    }
}

impl From<Vec<&str>> for LineInput {
    fn from(lines: Vec<&str>) -> Self {
        Self::Lines(lines.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for LineInput {
    fn from(lines: &[&str]) -> Self {
        Self::Lines(lines.iter().map(|l| (*l).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for LineInput {
    fn from(lines: [&str; N]) -> Self {
        Self::Lines(lines.iter().map(|l| (*l).to_owned()).collect())
    }
}

impl From<String> for LineInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for LineInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

/// Split `text` into lines, keeping each line's terminator.
///
/// The last line has no terminator if `text` does not end with one. Empty
/// input yields no lines.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_owned).collect()
}
