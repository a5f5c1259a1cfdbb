//! Token lines and the line-format policy
//!
//! A command is built as a [`TokenLine`] of atomic tokens. [`wrap`] packs the
//! tokens greedily into physical lines of at most [`MAX_WIDTH`] columns,
//! closing every non-final physical line with [`CONTINUATION`] and starting
//! the next one at [`INDENT`]. A token is never split; a token longer than the
//! width on its own is emitted unbroken.

use std::fmt;

/// Maximum column width of a physical command line
pub const MAX_WIDTH: usize = 180;

/// Continuation marker closing a non-final physical line
pub const CONTINUATION: &str = " &";

/// Indent opening a continuation line
pub const INDENT: &str = "    ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    /// Forced line break
    Break,
}

/// One logical command prior to wrapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenLine {
    tokens: Vec<Token>,
}

impl TokenLine {
    pub fn new(keyword: impl Into<String>) -> Self {
        let mut line = Self::default();
        line.word(keyword);
        line
    }

    pub fn word(&mut self, token: impl Into<String>) -> &mut Self {
        let token = token.into();
        if !token.is_empty() {
            self.tokens.push(Token::Word(token));
        }
        self
    }

    pub fn word_if(&mut self, cond: bool, token: &str) -> &mut Self {
        if cond {
            self.word(token);
        }
        self
    }

    /// Positional literal
    pub fn num(&mut self, value: impl Literal) -> &mut Self {
        self.word(value.literal())
    }

    pub fn num_opt<T: Literal>(&mut self, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.num(v);
        }
        self
    }

    pub fn kv(&mut self, key: &str, value: impl Literal) -> &mut Self {
        self.word(format!("{key}={}", value.literal()))
    }

    pub fn kv_opt<T: Literal>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.kv(key, v);
        }
        self
    }

    /// `key='value'`
    pub fn quoted(&mut self, key: &str, value: &str) -> &mut Self {
        self.word(format!("{key}={}", quote(value)))
    }

    pub fn quoted_opt(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            self.quoted(key, v);
        }
        self
    }

    pub fn brk(&mut self) -> &mut Self {
        self.tokens.push(Token::Break);
        self
    }

    pub fn append(&mut self, other: TokenLine) -> &mut Self {
        self.tokens.extend(other.tokens);
        self
    }

    /// Words in emission order, forced breaks skipped
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Word(w) => Some(w.as_str()),
            Token::Break => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.words().next().is_none()
    }

    /// Break-separated runs of words, empty runs dropped
    fn segments(&self) -> Vec<Vec<&str>> {
        let mut segments = vec![Vec::new()];
        for token in &self.tokens {
            match token {
                Token::Word(w) => {
                    if let Some(last) = segments.last_mut() {
                        last.push(w.as_str());
                    }
                }
                Token::Break => segments.push(Vec::new()),
            }
        }
        segments.retain(|s| !s.is_empty());
        segments
    }
}

impl fmt::Display for TokenLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&wrap(self))
    }
}

pub fn quote(value: &str) -> String {
    format!("'{value}'")
}

/// Pack a token line into physical lines.
///
/// A continuation line starts at [`INDENT`] unless the indent alone would
/// push a token past [`MAX_WIDTH`], in which case it starts at column 0. A
/// physical line is wider than [`MAX_WIDTH`] only when it holds one token
/// that does not fit even on a line of its own.
pub fn wrap(line: &TokenLine) -> String {
    let marker = CONTINUATION.chars().count();
    let indent = INDENT.chars().count();
    let segments = line.segments();
    let total: usize = segments.iter().map(Vec::len).sum();

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut width = 0usize;
    let mut placed = 0usize;

    for (i, segment) in segments.iter().enumerate() {
        for (j, token) in segment.iter().enumerate() {
            placed += 1;
            let len = token.chars().count();
            let tail = if placed == total { 0 } else { marker };
            let forced = i > 0 && j == 0;

            if placed == 1 {
                current.push_str(token);
                width = len;
            } else if !forced && width + 1 + len + tail <= MAX_WIDTH {
                current.push(' ');
                current.push_str(token);
                width += 1 + len;
            } else {
                lines.push(std::mem::take(&mut current));
                let fits_bare = len + tail <= MAX_WIDTH;
                if indent + len + tail <= MAX_WIDTH || !fits_bare {
                    current.push_str(INDENT);
                    width = indent;
                } else {
                    width = 0;
                }
                current.push_str(token);
                width += len;
            }
        }
    }
    lines.push(current);
    lines.join(&format!("{CONTINUATION}\n"))
}

/// Render several token lines, one per logical command.
pub fn render_lines(lines: &[TokenLine]) -> String {
    lines.iter().map(wrap).collect::<Vec<_>>().join("\n")
}

// ============================================================================
// Literals
// ============================================================================

/// Value written into a command as a literal token.
pub trait Literal {
    fn literal(&self) -> String;
}

impl Literal for f64 {
    fn literal(&self) -> String {
        float(*self)
    }
}

macro_rules! int_literal {
    ($($t:ty),*) => {
        $(impl Literal for $t {
            fn literal(&self) -> String {
                self.to_string()
            }
        })*
    };
}

int_literal!(i32, i64, u8, u16, u32, u64, usize);

impl Literal for str {
    fn literal(&self) -> String {
        self.to_string()
    }
}

impl Literal for String {
    fn literal(&self) -> String {
        self.clone()
    }
}

impl<T: Literal + ?Sized> Literal for &T {
    fn literal(&self) -> String {
        (**self).literal()
    }
}

/// Shortest round-trip float text, always carrying a decimal point or an
/// exponent (`1.0`, `0.04`, `4.7e-07`, `1e+16`).
pub fn float(x: f64) -> String {
    let magnitude = x.abs();
    if x.is_finite() && magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let sci = format!("{x:e}");
        let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.abs());
    }
    let plain = format!("{x}");
    if plain.contains('.') || !x.is_finite() {
        plain
    } else {
        format!("{plain}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn words_of(text: &str) -> Vec<String> {
        text.lines()
            .flat_map(|l| l.strip_suffix(CONTINUATION).unwrap_or(l).split_whitespace())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_float_literals() {
        assert_eq!(float(1.0), "1.0");
        assert_eq!(float(0.0), "0.0");
        assert_eq!(float(-2.5), "-2.5");
        assert_eq!(float(0.04), "0.04");
        assert_eq!(float(1e-4), "0.0001");
        assert_eq!(float(4.7e-7), "4.7e-07");
        assert_eq!(float(1e-5), "1e-05");
        assert_eq!(float(2.5e16), "2.5e+16");
        assert_eq!(float(3600.0), "3600.0");
    }

    #[test]
    fn test_short_line_unchanged() {
        let mut line = TokenLine::new("GEN3");
        line.word("KOMEN").kv("agrow", 0.0015);
        assert_eq!(wrap(&line), "GEN3 KOMEN agrow=0.0015");
    }

    #[test]
    fn test_optional_tokens_skipped() {
        let mut line = TokenLine::new("PROJECT");
        line.quoted_opt("name", None).quoted("nr", "01");
        assert_eq!(wrap(&line), "PROJECT nr='01'");
    }

    #[test]
    fn test_forced_breaks() {
        let mut line = TokenLine::new("POINTS");
        line.quoted("sname", "pts");
        for (x, y) in [(1.0, 2.0), (3.0, 4.0)] {
            line.brk().kv("xp", x).kv("yp", y);
        }
        assert_eq!(
            wrap(&line),
            "POINTS sname='pts' &\n    xp=1.0 yp=2.0 &\n    xp=3.0 yp=4.0"
        );
    }

    #[test]
    fn test_empty_segments_dropped() {
        let mut line = TokenLine::new("BLOCK");
        line.brk().brk().word("HSIGN").brk();
        assert_eq!(wrap(&line), "BLOCK &\n    HSIGN");
    }

    #[test]
    fn test_overlong_token_emitted_whole() {
        let long = "x".repeat(MAX_WIDTH + 20);
        let mut line = TokenLine::new("READINP");
        line.word(long.clone()).word("FREE");
        let text = wrap(&line);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "READINP &");
        assert_eq!(lines[1], format!("{INDENT}{long} &"));
        assert_eq!(lines[2], format!("{INDENT}FREE"));
    }

    #[test]
    fn test_token_too_wide_for_indent_starts_at_column_zero() {
        let wide = "x".repeat(MAX_WIDTH - 2);
        let mut line = TokenLine::new("READINP");
        line.word(wide.clone()).word("FREE");
        let text = wrap(&line);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, vec!["READINP &".to_string(), format!("{wide} &"), format!("{INDENT}FREE")]);
        assert!(lines.iter().all(|l| l.chars().count() <= MAX_WIDTH));
    }

    #[test]
    fn test_final_token_needs_no_room_for_marker() {
        let wide = "y".repeat(MAX_WIDTH - INDENT.len());
        let mut line = TokenLine::new("INPGRID");
        line.word(wide.clone());
        assert_eq!(wrap(&line), format!("INPGRID &\n{INDENT}{wide}"));
    }

    fn token() -> impl Strategy<Value = String> {
        (1..=MAX_WIDTH, "[a-z0-9=.']").prop_map(|(n, c)| c.repeat(n))
    }

    proptest! {
        #[test]
        fn test_wrap_is_atomic_and_bounded(
            tokens in prop::collection::vec(token(), 1..40),
            breaks in prop::collection::vec(any::<bool>(), 40),
        ) {
            let mut line = TokenLine::default();
            for (t, brk) in tokens.iter().zip(&breaks) {
                if *brk {
                    line.brk();
                }
                line.word(t.clone());
            }
            let text = wrap(&line);
            for physical in text.lines() {
                let body = physical.strip_suffix(CONTINUATION);
                let tail = if body.is_some() { CONTINUATION.len() } else { 0 };
                let body = body.unwrap_or(physical).trim_start();
                let alone = !body.contains(' ') && body.chars().count() + tail > MAX_WIDTH;
                prop_assert!(physical.chars().count() <= MAX_WIDTH || alone, "too wide: {}", physical);
            }
            prop_assert!(!text.ends_with(CONTINUATION));
            prop_assert_eq!(words_of(&text), tokens);
        }
    }
}
