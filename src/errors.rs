use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePos {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl SourcePos {
    pub fn new(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    pub fn is_ordered(&self) -> bool {
        (self.start_line, self.start_col) <= (self.end_line, self.end_col)
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({})..{}({})",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    position: SourcePos,
    message: String,
}

impl ErrorInfo {
    pub fn with(template: &str, token_name: &str, position: SourcePos) -> Self {
        Self {
            position,
            message: template.replace('%', token_name),
        }
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    pub fn position(&self) -> SourcePos {
        self.position
    }

    /// Catalogue number of a semantic error (`#N: ...`), if the message carries one
    pub fn code(&self) -> Option<u8> {
        let rest = self.message.strip_prefix('#')?;
        let (number, _) = rest.split_once(':')?;
        number.parse().ok()
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ERROR: {} {}..{}, line {}.",
            self.message, self.position.start_col, self.position.end_col, self.position.start_line
        )
    }
}

/// Collects user-facing diagnostics of every compilation phase.
/// Compilation succeeds iff nothing was reported.
#[derive(Default)]
pub struct ErrorReporter {
    errors: Vec<ErrorInfo>,
    echo: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reporter that also prints each diagnostic to stdout as it arrives
    pub fn with_console() -> Self {
        Self {
            errors: Vec::new(),
            echo: true,
        }
    }

    pub fn report_error(&mut self, template: &str, token_name: &str, position: SourcePos) {
        let info = ErrorInfo::with(template, token_name, position);
        tracing::debug!(%position, message = info.message(), "diagnostic");
        if self.echo {
            println!("{info}");
        }
        self.errors.push(info);
    }

    pub fn num_errors(&self) -> usize {
        self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ErrorInfo] {
        &self.errors
    }
}
