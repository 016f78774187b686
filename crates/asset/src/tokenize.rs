//! Line tokenizer shared by the OBJ and MTL parsers.
//!
//! Yields one [`Statement`] per meaningful line. Blank lines and `#` comments
//! are dropped, and so are lines that do not start with a keyword followed by
//! whitespace or end of line.

/// One tokenized line: `keyword rest...`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement<'a> {
    /// 1-based line number in the source text.
    pub line: usize,
    pub keyword: &'a str,
    /// Everything after the keyword, with the separating whitespace removed.
    pub rest: &'a str,
    pub args: Vec<&'a str>,
}

/// A line whose keyword no parser handles. Logged and skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unhandled {
    pub line: usize,
    pub keyword: String,
}

impl Unhandled {
    pub(crate) fn report(statement: &Statement<'_>, format: &str) -> Self {
        log::warn!(
            "{format}: unhandled keyword '{}' on line {}",
            statement.keyword,
            statement.line
        );
        Self {
            line: statement.line,
            keyword: statement.keyword.to_string(),
        }
    }
}

/// Lazy iterator over the statements of a text. Cloning restarts nothing,
/// it forks the cursor; call [`statements`] again to start over.
#[derive(Clone, Debug)]
pub struct Statements<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

/// Tokenize `text` into statements.
pub fn statements(text: &str) -> Statements<'_> {
    Statements {
        lines: text.lines().enumerate(),
    }
}

impl<'a> Iterator for Statements<'a> {
    type Item = Statement<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, raw) in self.lines.by_ref() {
            if let Some(statement) = tokenize_line(idx + 1, raw) {
                return Some(statement);
            }
        }
        None
    }
}

/// Parse the first `N` arguments as floats, warning on failure.
pub(crate) fn parse_floats<const N: usize>(statement: &Statement<'_>) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        let Some(token) = statement.args.get(i) else {
            log::warn!(
                "'{}' on line {} expects {} numbers, found {}",
                statement.keyword,
                statement.line,
                N,
                statement.args.len()
            );
            return None;
        };
        match token.parse::<f32>() {
            Ok(v) => *slot = v,
            Err(_) => {
                log::warn!(
                    "invalid number '{}' for '{}' on line {}",
                    token,
                    statement.keyword,
                    statement.line
                );
                return None;
            }
        }
    }
    Some(out)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tokenize_line(line: usize, raw: &str) -> Option<Statement<'_>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let end = trimmed
        .find(|c: char| !is_word_char(c))
        .unwrap_or(trimmed.len());
    if end == 0 {
        return None;
    }
    let (keyword, tail) = trimmed.split_at(end);
    if !tail.is_empty() && !tail.starts_with(char::is_whitespace) {
        return None;
    }

    let rest = tail.trim_start();
    Some(Statement {
        line,
        keyword,
        rest,
        args: rest.split_whitespace().collect(),
    })
}
