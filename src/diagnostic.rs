use owo_colors::OwoColorize;
use std::fmt;
use std::rc::Rc;

/// A location in a source file, 1-based line and column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    pub file: Rc<str>,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(file: Rc<str>, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }

    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Byte offsets of line starts, for turning lexer spans into positions.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// 1-based line and column of a byte offset. Columns count characters.
    pub fn line_col(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&start| start <= offset);
        let start = self.starts[line - 1];
        let column = source
            .get(start..offset)
            .map_or(0, |text| text.chars().count());
        (line, column + 1)
    }
}

/// A label pointing at a run of columns on one line
#[derive(Debug, Clone)]
pub struct Label {
    pub position: Position,
    pub width: usize,
    pub message: String,
}

impl Label {
    pub fn primary(position: Position, width: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            width: width.max(1),
            message: message.into(),
        }
    }
}

/// A complete diagnostic message
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: Option<String>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.notes.push(format!("help: {}", help.into()));
        self
    }
}

fn source_line(source: &str, line_num: usize) -> Option<&str> {
    source.lines().nth(line_num.checked_sub(1)?)
}

/// Diagnostic renderer for rustc-like error output
pub struct DiagnosticRenderer<'a> {
    source: &'a str,
    file: Option<&'a str>,
    use_color: bool,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(source: &'a str, use_color: bool) -> Self {
        Self {
            source,
            file: None,
            use_color,
        }
    }

    /// Source lines are only shown for labels that point into `file`.
    pub fn for_file(mut self, file: &'a str) -> Self {
        self.file = Some(file);
        self
    }

    fn shows_source(&self, label: &Label) -> bool {
        label.position.is_known() && self.file.map_or(true, |file| &*label.position.file == file)
    }

    /// Render a diagnostic to a string
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();

        // error[E0101]: message
        self.render_header(&mut output, diagnostic);

        let mut lines_to_show: Vec<usize> = diagnostic
            .labels
            .iter()
            .filter(|l| self.shows_source(l))
            .map(|l| l.position.line)
            .collect();
        lines_to_show.sort_unstable();
        lines_to_show.dedup();

        if let Some(label) = diagnostic.labels.iter().find(|l| l.position.is_known()) {
            output.push_str(&format!("  {} {}\n", self.style_blue("-->"), label.position));
        }

        if !lines_to_show.is_empty() {
            let max_line = lines_to_show.last().copied().unwrap_or(1);
            let width = max_line.to_string().len();

            output.push_str(&format!("{} {}\n", " ".repeat(width + 1), self.style_blue("|")));
            for &line_num in &lines_to_show {
                self.render_line(&mut output, diagnostic, line_num, width);
            }
            output.push_str(&format!("{} {}\n", " ".repeat(width + 1), self.style_blue("|")));
        }

        for note in &diagnostic.notes {
            output.push_str(&format!("  {} {}\n", self.style_blue("="), note));
        }

        output
    }

    fn render_header(&self, output: &mut String, diagnostic: &Diagnostic) {
        let severity = self.style_red_bold("error");

        match &diagnostic.code {
            Some(code) => output.push_str(&format!(
                "{}[{}]: {}\n",
                severity,
                code,
                self.style_bold(&diagnostic.message)
            )),
            None => output.push_str(&format!(
                "{}: {}\n",
                severity,
                self.style_bold(&diagnostic.message)
            )),
        }
    }

    fn render_line(&self, output: &mut String, diagnostic: &Diagnostic, line_num: usize, width: usize) {
        let Some(content) = source_line(self.source, line_num) else {
            return;
        };

        output.push_str(&format!(
            "{:>width$} {} {}\n",
            self.style_blue(&line_num.to_string()),
            self.style_blue("|"),
            content,
            width = width + 1
        ));

        for label in diagnostic
            .labels
            .iter()
            .filter(|l| l.position.line == line_num && self.shows_source(l))
        {
            let padding = " ".repeat(label.position.column.saturating_sub(1));
            let carets = "^".repeat(label.width);
            let text = if label.message.is_empty() {
                carets
            } else {
                format!("{} {}", carets, label.message)
            };
            output.push_str(&format!(
                "{} {} {}{}\n",
                " ".repeat(width + 1),
                self.style_blue("|"),
                padding,
                self.style_red(&text)
            ));
        }
    }

    fn style_red(&self, s: &str) -> String {
        if self.use_color {
            s.red().to_string()
        } else {
            s.to_string()
        }
    }

    fn style_red_bold(&self, s: &str) -> String {
        if self.use_color {
            s.red().bold().to_string()
        } else {
            s.to_string()
        }
    }

    fn style_blue(&self, s: &str) -> String {
        if self.use_color {
            s.blue().to_string()
        } else {
            s.to_string()
        }
    }

    fn style_bold(&self, s: &str) -> String {
        if self.use_color {
            s.bold().to_string()
        } else {
            s.to_string()
        }
    }
}

/// Render multiple diagnostics followed by an error summary line
pub fn render_diagnostics(source: &str, diagnostics: &[Diagnostic], use_color: bool) -> String {
    render_with(DiagnosticRenderer::new(source, use_color), diagnostics)
}

/// Like [`render_diagnostics`], but only quotes `source` for positions in `file`.
pub fn render_file_diagnostics(
    source: &str,
    file: &str,
    diagnostics: &[Diagnostic],
    use_color: bool,
) -> String {
    render_with(DiagnosticRenderer::new(source, use_color).for_file(file), diagnostics)
}

fn render_with(renderer: DiagnosticRenderer<'_>, diagnostics: &[Diagnostic]) -> String {
    let mut output = String::new();

    for diagnostic in diagnostics {
        output.push_str(&renderer.render(diagnostic));
        output.push('\n');
    }

    let error_count = diagnostics.len();
    if error_count > 0 {
        output.push_str(&format!(
            "error: aborting due to {} error{}\n",
            error_count,
            if error_count == 1 { "" } else { "s" }
        ));
    }

    output
}
