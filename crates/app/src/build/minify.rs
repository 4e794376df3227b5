//! Conservative minifier.
//!
//! Outside strings and template literals, comments are stripped and
//! whitespace runs are dropped unless the tokens on either side would merge
//! without them. An input line is appended to the previous output line
//! when the newline between them cannot affect automatic semicolon
//! insertion. Template literal text is kept verbatim, newlines included.
//! Each input line remembers where it came from so a line-level source map
//! can be written. Regular-expression literals are not recognised.

use super::sourcemap::Mapping;
use crate::error::AppError;

/// One line of input, tagged with its module index and 0-based line number.
#[derive(Debug, Clone, Copy)]
pub struct SourceLine<'a> {
    pub source: usize,
    pub line: usize,
    pub text: &'a str,
}

/// Minified text of one input line and the position of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub source: usize,
    pub line: usize,
    pub column: usize,
    starts_in_template: bool,
}

/// One line of output, built from one or more fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub mappings: Vec<Mapping>,
}

impl OutputLine {
    fn push(&mut self, fragment: Fragment) {
        self.mappings.push(Mapping {
            generated_column: self.text.chars().count(),
            source: fragment.source,
            line: fragment.line,
            column: fragment.column,
        });
        self.text.push_str(&fragment.text);
    }

    /// A line break before `next` is only kept where it may end a statement.
    fn joins(&self, next: &Fragment) -> bool {
        !next.starts_in_template
            && (self.text.ends_with(|c: char| matches!(c, '{' | ';' | ',' | '(' | '['))
                || next.text.starts_with(|c: char| matches!(c, '}' | ')' | ']')))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    Template,
    BlockComment,
}

#[derive(Debug, Clone, Copy)]
struct Open {
    ch: char,
    /// `${` of a template literal.
    interp: bool,
    source: usize,
    line: usize,
}

fn closer(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether `a` and `b` would lex differently with nothing between them.
fn needs_space(a: char, b: char) -> bool {
    (is_word(a) && is_word(b))
        || (matches!(a, '+' | '-') && matches!(b, '+' | '-'))
        || (a == '/' && matches!(b, '/' | '*'))
        || (b == '.' && (a.is_ascii_digit() || a == '?'))
}

/// Push `c`, first writing one space for a dropped whitespace run when
/// the neighbouring tokens need it.
fn emit(out: &mut String, pending_space: &mut bool, c: char) {
    if std::mem::take(pending_space) && out.chars().last().is_some_and(|last| needs_space(last, c)) {
        out.push(' ');
    }
    out.push(c);
}

/// Scan a quoted string starting at `start`; returns the index of the
/// closing quote.
fn scan_string(chars: &[char], start: usize, quote: char) -> Option<usize> {
    let mut j = start + 1;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            c if c == quote => return Some(j),
            _ => j += 1,
        }
    }
    None
}

pub struct Minifier<'n> {
    names: &'n [String],
    modes: Vec<Mode>,
    brackets: Vec<Open>,
}

impl<'n> Minifier<'n> {
    /// `names` labels module indexes in error messages.
    pub fn new(names: &'n [String]) -> Self {
        Self {
            names,
            modes: vec![Mode::Code],
            brackets: Vec::new(),
        }
    }

    fn mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Code)
    }

    fn error(&self, source: usize, line: usize, message: impl std::fmt::Display) -> AppError {
        let name = self.names.get(source).map(String::as_str).unwrap_or("<unknown>");
        AppError::Build(format!("{}:{}: {}", name, line + 1, message))
    }

    fn close(&mut self, ch: char, source: usize, line: usize) -> Result<(), AppError> {
        let Some(open) = self.brackets.pop() else {
            return Err(self.error(source, line, format_args!("unexpected '{}'", ch)));
        };
        if closer(open.ch) != ch {
            return Err(self.error(
                source,
                line,
                format_args!(
                    "'{}' does not close '{}' opened at line {}",
                    ch,
                    open.ch,
                    open.line + 1
                ),
            ));
        }
        if open.interp {
            // back into the enclosing template literal
            self.modes.pop();
        }
        Ok(())
    }

    /// Process one line. `None` means the line minified away.
    pub fn line(&mut self, src: SourceLine<'_>) -> Result<Option<Fragment>, AppError> {
        let chars: Vec<char> = src.text.chars().collect();
        let starts_in_template = self.mode() == Mode::Template;
        let mut out = String::with_capacity(src.text.len());
        let mut pending_space = false;
        let mut column = None;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();
            let (at, before) = (i, out.len());

            match self.mode() {
                Mode::BlockComment => {
                    if c == '*' && next == Some('/') {
                        self.modes.pop();
                        pending_space = true;
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                Mode::Template => match c {
                    '\\' => {
                        out.push(c);
                        if let Some(n) = next {
                            out.push(n);
                        }
                        i += 2;
                    }
                    '`' => {
                        out.push(c);
                        self.modes.pop();
                        i += 1;
                    }
                    '$' if next == Some('{') => {
                        out.push_str("${");
                        self.brackets.push(Open {
                            ch: '{',
                            interp: true,
                            source: src.source,
                            line: src.line,
                        });
                        self.modes.push(Mode::Code);
                        i += 2;
                    }
                    _ => {
                        out.push(c);
                        i += 1;
                    }
                },
                Mode::Code => match c {
                    c if c.is_whitespace() => {
                        pending_space = true;
                        i += 1;
                    }
                    '\'' | '"' => {
                        let end = scan_string(&chars, i, c)
                            .ok_or_else(|| self.error(src.source, src.line, "unterminated string literal"))?;
                        emit(&mut out, &mut pending_space, c);
                        out.extend(&chars[i + 1..=end]);
                        i = end + 1;
                    }
                    '`' => {
                        emit(&mut out, &mut pending_space, c);
                        self.modes.push(Mode::Template);
                        i += 1;
                    }
                    '/' if next == Some('/') => break,
                    '/' if next == Some('*') => {
                        self.modes.push(Mode::BlockComment);
                        i += 2;
                    }
                    '(' | '[' | '{' => {
                        self.brackets.push(Open {
                            ch: c,
                            interp: false,
                            source: src.source,
                            line: src.line,
                        });
                        emit(&mut out, &mut pending_space, c);
                        i += 1;
                    }
                    ')' | ']' | '}' => {
                        self.close(c, src.source, src.line)?;
                        emit(&mut out, &mut pending_space, c);
                        i += 1;
                    }
                    _ => {
                        emit(&mut out, &mut pending_space, c);
                        i += 1;
                    }
                },
            }

            if column.is_none() && out.len() > before {
                column = Some(at);
            }
        }

        let ends_in_template = self.mode() == Mode::Template;
        if out.is_empty() && !starts_in_template && !ends_in_template {
            return Ok(None);
        }
        Ok(Some(Fragment {
            text: out,
            source: src.source,
            line: src.line,
            column: column.unwrap_or(0),
            starts_in_template,
        }))
    }

    /// Check that nothing is left open at end of input.
    pub fn finish(self) -> Result<(), AppError> {
        match self.mode() {
            Mode::Template => return Err(AppError::Build("unterminated template literal".into())),
            Mode::BlockComment => return Err(AppError::Build("unterminated block comment".into())),
            Mode::Code => {}
        }
        if let Some(open) = self.brackets.last() {
            return Err(self.error(open.source, open.line, format_args!("unclosed '{}'", open.ch)));
        }
        Ok(())
    }
}

/// Minify a whole sequence of lines.
pub fn minify<'a>(
    lines: impl IntoIterator<Item = SourceLine<'a>>,
    names: &[String],
) -> Result<Vec<OutputLine>, AppError> {
    let mut minifier = Minifier::new(names);
    let mut out: Vec<OutputLine> = Vec::new();
    for line in lines {
        let Some(fragment) = minifier.line(line)? else {
            continue;
        };
        match out.last_mut() {
            Some(last) if last.joins(&fragment) => last.push(fragment),
            _ => {
                let mut next = OutputLine::default();
                next.push(fragment);
                out.push(next);
            }
        }
    }
    minifier.finish()?;
    Ok(out)
}
