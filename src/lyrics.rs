//! Lyric line formatting. Catalog lines carry three inline markers:
//!
//! * a leading `^` marks a chorus line, shown emphasized as a whole;
//! * `*text*` pairs emphasize a fragment of a regular line;
//! * `|` is a line break.
//!
//! One tokenizer feeds two outputs: the markup string (`<b>`/`<br>`) used as
//! the canonical display form, and the row/fragment structure the terminal
//! front-end draws. Formatting never fails; unmatched markers stay literal.

use std::sync::OnceLock;

use regex::Regex;

const CHORUS_MARKER: char = '^';
const BREAK_MARKER: char = '|';

fn emphasis_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*(.*?)\*").expect("emphasis pattern is valid"))
}

/// A run of text that is either emphasized or plain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub strong: bool,
}

impl Fragment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            strong: false,
        }
    }

    fn strong(text: &str) -> Self {
        Self {
            text: text.to_string(),
            strong: true,
        }
    }
}

/// One display row: the fragments between two line breaks.
pub type LyricRow = Vec<Fragment>;

enum Token {
    /// Chorus text with its markers already stripped.
    Chorus(String),
    /// Regular line split on emphasis pairs. Break markers are still inside.
    Plain(Vec<Fragment>),
}

fn tokenize(line: &str) -> Token {
    if let Some(rest) = line.strip_prefix(CHORUS_MARKER) {
        let rest = rest.strip_suffix(BREAK_MARKER).unwrap_or(rest);
        return Token::Chorus(rest.to_string());
    }

    let mut fragments = Vec::new();
    let mut cursor = 0;
    for captures in emphasis_pattern().captures_iter(line) {
        let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if whole.start() > cursor {
            fragments.push(Fragment::plain(&line[cursor..whole.start()]));
        }
        fragments.push(Fragment::strong(inner.as_str()));
        cursor = whole.end();
    }
    if cursor < line.len() {
        fragments.push(Fragment::plain(&line[cursor..]));
    }
    Token::Plain(fragments)
}

/// Render raw lyric lines into the display markup.
///
/// Chorus lines lose the marker and one trailing break marker, get wrapped in
/// `<b>` and end with a single `<br>`. Other lines get `*text*` pairs wrapped
/// in `<b>` and every `|` turned into `<br>`. Lines are joined without a
/// separator since breaks come from the markers themselves.
pub fn format_lyrics<S: AsRef<str>>(lines: &[S]) -> String {
    let mut output = String::new();
    for line in lines {
        match tokenize(line.as_ref()) {
            Token::Chorus(text) => {
                output.push_str("<b>");
                output.push_str(&text);
                output.push_str("</b><br>");
            }
            Token::Plain(fragments) => {
                for fragment in fragments {
                    let text = fragment.text.replace(BREAK_MARKER, "<br>");
                    if fragment.strong {
                        output.push_str("<b>");
                        output.push_str(&text);
                        output.push_str("</b>");
                    } else {
                        output.push_str(&text);
                    }
                }
            }
        }
    }
    output
}

/// Lay raw lyric lines out as display rows. Produces exactly the rows the
/// `<br>` tags of [`format_lyrics`] would, with a trailing empty row dropped.
pub fn lyric_rows<S: AsRef<str>>(lines: &[S]) -> Vec<LyricRow> {
    let mut rows = Vec::new();
    let mut current: LyricRow = Vec::new();

    for line in lines {
        match tokenize(line.as_ref()) {
            Token::Chorus(text) => {
                if !text.is_empty() {
                    current.push(Fragment::strong(&text));
                }
                rows.push(std::mem::take(&mut current));
            }
            Token::Plain(fragments) => {
                for fragment in fragments {
                    let mut pieces = fragment.text.split(BREAK_MARKER);
                    if let Some(first) = pieces.next() {
                        if !first.is_empty() {
                            current.push(Fragment {
                                text: first.to_string(),
                                strong: fragment.strong,
                            });
                        }
                    }
                    for piece in pieces {
                        rows.push(std::mem::take(&mut current));
                        if !piece.is_empty() {
                            current.push(Fragment {
                                text: piece.to_string(),
                                strong: fragment.strong,
                            });
                        }
                    }
                }
            }
        }
    }

    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(row: &LyricRow) -> String {
        row.iter()
            .map(|fragment| {
                if fragment.strong {
                    format!("[{}]", fragment.text)
                } else {
                    fragment.text.clone()
                }
            })
            .collect()
    }

    #[test]
    fn chorus_line_is_wrapped_and_broken_once() {
        assert_eq!(format_lyrics(&["^Hello|"]), "<b>Hello</b><br>");
    }

    #[test]
    fn chorus_strips_only_one_trailing_break() {
        assert_eq!(format_lyrics(&["^Hello||"]), "<b>Hello|</b><br>");
        assert_eq!(format_lyrics(&["^Hello"]), "<b>Hello</b><br>");
    }

    #[test]
    fn emphasis_pairs_and_breaks_are_replaced() {
        assert_eq!(format_lyrics(&["a *b* c|"]), "a <b>b</b> c<br>");
        assert_eq!(
            format_lyrics(&["*one* and *two*|"]),
            "<b>one</b> and <b>two</b><br>"
        );
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        assert_eq!(format_lyrics(&["a *b|"]), "a *b<br>");
        assert_eq!(format_lyrics(&["2 * 3 = 6"]), "2 * 3 = 6");
    }

    #[test]
    fn plain_lines_pass_through_and_concatenate() {
        assert_eq!(format_lyrics(&["no markers"]), "no markers");
        assert_eq!(
            format_lyrics(&["Normal line|", "^Chorus line|", "Another|"]),
            "Normal line<br><b>Chorus line</b><br>Another<br>"
        );
        assert_eq!(format_lyrics::<&str>(&[]), "");
    }

    #[test]
    fn emphasis_spanning_a_break_keeps_the_break_inside() {
        assert_eq!(format_lyrics(&["*a|b*"]), "<b>a<br>b</b>");
    }

    #[test]
    fn rows_follow_break_markers() {
        let rows = lyric_rows(&["Normal line|", "^Chorus line|", "a *b* c|", "tail"]);
        let texts: Vec<String> = rows.iter().map(row_text).collect();
        assert_eq!(texts, vec!["Normal line", "[Chorus line]", "a [b] c", "tail"]);
    }

    #[test]
    fn double_breaks_leave_a_blank_row() {
        let rows = lyric_rows(&["verse||", "next|"]);
        let texts: Vec<String> = rows.iter().map(row_text).collect();
        assert_eq!(texts, vec!["verse", "", "next"]);
    }

    #[test]
    fn lines_without_breaks_share_a_row() {
        let rows = lyric_rows(&["first ", "second|"]);
        assert_eq!(rows.len(), 1);
        assert_eq!(row_text(&rows[0]), "first second");
    }
}
