use super::symbol::{Defines, Pool, Symbols};
use super::tag::Tag;
use super::token::{is_operator, keyword_code, operator_code, raw_keyword_index};
use super::Error;
use crate::error;

/// What pass 1 found on a line, leftmost occurrence winning.
#[derive(Debug, PartialEq)]
pub enum Directive {
    Asm,
    Define,
    Comment(usize),
    Str(usize),
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_uppercase() || c == '_'
}

fn is_sigil(c: char) -> bool {
    c == '%' || c == '$' || c == '!' || c == '#' || c == ':'
}

/// Finds the next pass-1 item on a line: an `#ASM` or `#DEFINE`
/// directive, a comment quote, or a string quote.
pub fn find_directive(line: &str) -> Option<Directive> {
    for (i, c) in line.char_indices() {
        match c {
            '#' => {
                if line[i..].starts_with("#ASM") {
                    return Some(Directive::Asm);
                }
                if line[i..].starts_with("#DEFINE") {
                    return Some(Directive::Define);
                }
            }
            '\'' => return Some(Directive::Comment(i)),
            '"' => return Some(Directive::Str(i)),
            _ => {}
        }
    }
    None
}

/// Replaces a comment running to end of line with a comment tag.
pub fn strip_comment(line: &str, at: usize, comments: &mut Pool) -> String {
    let index = comments.push(&line[at + 1..]);
    format!("{}{}", &line[..at], Tag::Comment(index).marker())
}

/// Replaces a string literal with a string tag. The error carries no
/// line number; the caller owns the source position.
pub fn strip_string(line: &str, at: usize, strings: &mut Pool) -> Result<String, Error> {
    let end = match line[at + 1..].find('"') {
        Some(offset) => at + 1 + offset,
        None => return Err(error!(SyntaxError; "COULD NOT FIND END OF STRING")),
    };
    let index = strings.push(&line[at + 1..end]);
    Ok(format!(
        "{}{}{}",
        &line[..at],
        Tag::Str(index).marker(),
        &line[end + 1..]
    ))
}

/// Parses `#DEFINE NAME VALUE`. Names are `[A-Z][A-Z0-9_]+`.
pub fn parse_define(line: &str) -> Result<(String, String), Error> {
    let malformed = || error!(SyntaxError; "INVALID #DEFINE");
    let at = line.find("#DEFINE").ok_or_else(malformed)?;
    let rest = line[at + "#DEFINE".len()..].trim_start();
    if rest.len() == line.len() - at - "#DEFINE".len() && !rest.is_empty() {
        return Err(malformed());
    }
    let name: String = rest.chars().take_while(|c| is_ident_char(*c)).collect();
    if name.len() < 2 || !name.chars().next().map_or(false, |c| c.is_ascii_uppercase()) {
        return Err(malformed());
    }
    let value = &rest[name.len()..];
    if !value.starts_with(|c: char| c.is_whitespace()) {
        return Err(malformed());
    }
    Ok((name, value.trim().to_string()))
}

/// Substitutes macro names until a full scan changes nothing. Strings
/// and comments are already pooled, so a define can never cross into
/// literal text.
pub fn apply_defines(line: &str, defines: &Defines) -> Result<String, Error> {
    if defines.is_empty() {
        return Ok(line.to_string());
    }
    let mut line = line.to_string();
    for _ in 0..100 {
        match substitute_one(&line, defines) {
            Some(replaced) => line = replaced,
            None => return Ok(line),
        }
    }
    Err(error!(SyntaxError; "RECURSIVE #DEFINE"))
}

fn substitute_one(line: &str, defines: &Defines) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if is_ident_start(chars[i]) && (i == 0 || !is_ident_char(chars[i - 1])) {
            let mut j = i + 1;
            while j < chars.len() && is_ident_char(chars[j]) {
                j += 1;
            }
            let name: String = chars[i..j].iter().collect();
            if let Some(value) = defines.get(&name) {
                let head: String = chars[..i].iter().collect();
                let tail: String = chars[j..].iter().collect();
                return Some(format!("{}{}{}", head, value, tail));
            }
            i = j;
        } else {
            i += 1;
        }
    }
    None
}

/// Replaces `$` + hex-digit runs with number tags. Identical literals
/// share one pool slot.
pub fn tag_numbers(line: &str, numbers: &mut Pool) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '$' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_ascii_hexdigit() {
                j += 1;
            }
            if j > i + 1 {
                let literal: String = chars[i..j].iter().collect();
                out.push_str(&Tag::Number(numbers.intern(&literal)).marker());
                i = j;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Classifies identifier-like tokens into keyword, raw-keyword, label,
/// directive, and variable tags. `line_number` is the BASIC line number
/// this line will receive; label definitions resolve to it.
pub fn tag_idents(line: &str, symbols: &mut Symbols, line_number: u16) -> Result<String, Error> {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '@' && i + 1 < chars.len() && is_ident_start(chars[i + 1]) {
            let mut j = i + 1;
            while j < chars.len() && is_ident_char(chars[j]) {
                j += 1;
            }
            let name: String = chars[i + 1..j].iter().collect();
            let index = symbols.labels.index_of(&name);
            if j < chars.len() && chars[j] == ':' {
                symbols.labels.resolve(&name, line_number);
                out.push_str(&Tag::LabelDef(index).marker());
                j += 1;
            } else {
                out.push_str(&Tag::LabelRef(index).marker());
            }
            i = j;
        } else if c == '#' && i + 1 < chars.len() && is_ident_start(chars[i + 1]) {
            // unhandled directive: the whole line is dropped
            return Ok(String::new());
        } else if is_ident_start(c) && (i == 0 || !is_ident_char(chars[i - 1])) {
            let mut j = i + 1;
            while j < chars.len() && is_ident_char(chars[j]) {
                j += 1;
            }
            let name: String = chars[i..j].iter().collect();
            let mut sigil = String::new();
            if j < chars.len() && is_sigil(chars[j]) {
                sigil.push(chars[j]);
                j += 1;
            }
            let token = format!("{}{}", name, sigil);
            if let Some(code) = keyword_code(&token) {
                out.push_str(&Tag::Keyword(code).marker());
            } else if let Some(index) = raw_keyword_index(&token) {
                out.push_str(&Tag::Raw(index).marker());
            } else if sigil == ":" {
                // statement separator, not part of the identifier
                match keyword_code(&name) {
                    Some(code) => out.push_str(&Tag::Keyword(code).marker()),
                    None => match raw_keyword_index(&name) {
                        Some(index) => out.push_str(&Tag::Raw(index).marker()),
                        None => match symbols.vars.index_of(&name, "")? {
                            Some(index) => out.push_str(&Tag::Var(index).marker()),
                            None => out.push_str(&name),
                        },
                    },
                }
                out.push(':');
            } else {
                match symbols.vars.index_of(&name, &sigil)? {
                    Some(index) => out.push_str(&Tag::Var(index).marker()),
                    None => out.push_str(&token),
                }
            }
            i = j;
        } else {
            out.push(c);
            i += 1;
        }
    }
    Ok(out)
}

/// Replaces the single-character operators with operator tags. A miss
/// in the static table is a tagging bug.
pub fn tag_operators(line: &str) -> Result<String, Error> {
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        if is_operator(c) {
            match operator_code(c) {
                Some(code) => out.push_str(&Tag::Operator(code).marker()),
                None => {
                    return Err(error!(InternalError; "OPERATOR NOT IN TABLE"));
                }
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// Trims the line and collapses internal whitespace to single spaces.
pub fn collapse_whitespace(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_space = false;
    for c in line.trim().chars() {
        if c.is_whitespace() {
            in_space = true;
            continue;
        }
        if in_space {
            out.push(' ');
            in_space = false;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_directive_leftmost() {
        assert_eq!(find_directive("PRINT \"#ASM\""), Some(Directive::Str(6)));
        assert_eq!(find_directive("#ASM(BYTE X)"), Some(Directive::Asm));
        assert_eq!(find_directive("#DEFINE W 40"), Some(Directive::Define));
        assert_eq!(find_directive("A = 1 'NOTE"), Some(Directive::Comment(6)));
        assert_eq!(find_directive("A = 1"), None);
    }

    #[test]
    fn test_strip_comment() {
        let mut comments = Pool::default();
        let line = strip_comment("A = 1 'A NOTE", 6, &mut comments);
        assert_eq!(line, "A = 1 {c:0}");
        assert_eq!(comments.get(0), Some("A NOTE"));
    }

    #[test]
    fn test_strip_string() {
        let mut strings = Pool::default();
        let line = strip_string("PRINT \"HELLO\";A$", 6, &mut strings).unwrap();
        assert_eq!(line, "PRINT {s:0};A$");
        assert_eq!(strings.get(0), Some("HELLO"));
        assert!(strip_string("PRINT \"OOPS", 6, &mut strings).is_err());
    }

    #[test]
    fn test_parse_define() {
        let (name, value) = parse_define("#DEFINE WIDTH 40 + 2").unwrap();
        assert_eq!(name, "WIDTH");
        assert_eq!(value, "40 + 2");
        assert!(parse_define("#DEFINE W 40").is_err());
        assert!(parse_define("#DEFINE WIDTH").is_err());
        assert!(parse_define("#DEFINE 9X 1").is_err());
    }

    #[test]
    fn test_apply_defines() {
        let mut defines = Defines::default();
        defines.insert("WIDTH", "40");
        defines.insert("AREA", "WIDTH * HEIGHT");
        defines.insert("HEIGHT", "25");
        let line = apply_defines("A = AREA", &defines).unwrap();
        assert_eq!(line, "A = 40 * 25");
        // boundaries respected
        let line = apply_defines("A = WIDTHX", &defines).unwrap();
        assert_eq!(line, "A = WIDTHX");
    }

    #[test]
    fn test_apply_defines_recursion_is_fatal() {
        let mut defines = Defines::default();
        defines.insert("AA", "BB");
        defines.insert("BB", "AA");
        assert!(apply_defines("AA", &defines).is_err());
    }

    #[test]
    fn test_tag_numbers() {
        let mut numbers = Pool::default();
        let line = tag_numbers("POKE $C000,$FF", &mut numbers);
        assert_eq!(line, "POKE {n:0},{n:1}");
        let line = tag_numbers("VPOKE $C000,1", &mut numbers);
        assert_eq!(line, "VPOKE {n:0},1");
        assert_eq!(numbers.get(0), Some("$C000"));
        // a bare sigil is not a number
        assert_eq!(tag_numbers("PRINT A$", &mut numbers), "PRINT A$");
    }

    #[test]
    fn test_tag_idents_keywords_and_vars() {
        let mut symbols = Symbols::new();
        let line = tag_idents("PRINT COUNTER", &mut symbols, 10).unwrap();
        assert_eq!(line, "{r:153} {v:0}");
        let line = tag_idents("NAME$ MID$", &mut symbols, 10).unwrap();
        assert_eq!(line, "{v:1} {r:202}");
        assert_eq!(symbols.vars.alias(0), Some("AA"));
        assert_eq!(symbols.vars.alias(1), Some("AB$"));
    }

    #[test]
    fn test_tag_idents_labels() {
        let mut symbols = Symbols::new();
        let line = tag_idents("@LOOP:", &mut symbols, 30).unwrap();
        assert_eq!(line, "{l:0}");
        let line = tag_idents("GOTO @LOOP", &mut symbols, 40).unwrap();
        assert_eq!(line, "{r:137} {g:0}");
        assert_eq!(symbols.labels.line_for("LOOP"), Some(30));
    }

    #[test]
    fn test_tag_idents_forward_label_reference() {
        let mut symbols = Symbols::new();
        let line = tag_idents("GOSUB @DONE", &mut symbols, 10).unwrap();
        assert_eq!(line, "{r:141} {g:0}");
        tag_idents("@DONE:", &mut symbols, 50).unwrap();
        assert_eq!(symbols.labels.line_for("DONE"), Some(50));
    }

    #[test]
    fn test_tag_idents_unhandled_directive_drops_line() {
        let mut symbols = Symbols::new();
        let line = tag_idents("#PRAGMA X", &mut symbols, 10).unwrap();
        assert_eq!(line, "");
    }

    #[test]
    fn test_tag_idents_separator_colon() {
        let mut symbols = Symbols::new();
        let line = tag_idents("POKE A,B: RETURN", &mut symbols, 10).unwrap();
        assert_eq!(line, "{r:151} {v:0},{v:1}: {r:142}");
    }

    #[test]
    fn test_tag_idents_reserved_var_passes_through() {
        let mut symbols = Symbols::new();
        let line = tag_idents("GET#1,A$", &mut symbols, 10).unwrap();
        assert_eq!(line, "GET#1,{v:0}");
    }

    #[test]
    fn test_tag_operators() {
        let line = tag_operators("{v:0}={v:1}+2").unwrap();
        assert_eq!(line, "{v:0}{o:178}{v:1}{o:170}2");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  A   B\tC "), "A B C");
    }
}
