//! Line-oriented text builder for TypeScript output.

#[derive(Debug, Default)]
pub struct Emitter {
    output: String,
    indent: usize,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// One line at the current indentation. Empty text emits a bare newline.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.output.push_str("  ");
            }
            self.output.push_str(text);
        }
        self.output.push('\n');
    }

    pub fn blank(&mut self) {
        self.output.push('\n');
    }

    /// Emit `open`, indent, and return to the caller for the body.
    pub fn open(&mut self, open: impl AsRef<str>) {
        self.line(open);
        self.indent += 1;
    }

    pub fn close(&mut self, close: impl AsRef<str>) {
        self.dedent();
        self.line(close);
    }

    /// Step back one level without emitting anything, for chains that end
    /// on a continuation line.
    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// JSDoc block; nothing when there is no text.
    pub fn doc(&mut self, text: Option<&str>) {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return;
        };
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        if lines.len() == 1 {
            self.line(format!("/** {} */", escape_doc(lines[0])));
            return;
        }
        self.line("/**");
        for l in lines {
            if l.is_empty() {
                self.line(" *");
            } else {
                self.line(format!(" * {}", escape_doc(l)));
            }
        }
        self.line(" */");
    }

    pub fn finish(self) -> String {
        self.output
    }
}

fn escape_doc(text: &str) -> String {
    text.replace("*/", "*\\/")
}
