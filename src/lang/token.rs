use std::collections::HashMap;

/// Binary token codes for reserved words and operators. Values below
/// 256 tokenize to a single byte; the X16 extensions carry a two byte
/// code stored little-endian.
pub const KEYWORDS: &[(&str, u16)] = &[
    ("END", 128),
    ("FOR", 129),
    ("NEXT", 130),
    ("DATA", 131),
    ("INPUT#", 132),
    ("INPUT", 133),
    ("DIM", 134),
    ("READ", 135),
    ("LET", 136),
    ("GOTO", 137),
    ("RUN", 138),
    ("IF", 139),
    ("RESTORE", 140),
    ("GOSUB", 141),
    ("RETURN", 142),
    ("REM", 143),
    ("STOP", 144),
    ("ON", 145),
    ("WAIT", 146),
    ("LOAD", 147),
    ("SAVE", 148),
    ("VERIFY", 149),
    ("DEF", 150),
    ("POKE", 151),
    ("PRINT#", 152),
    ("PRINT", 153),
    ("CONT", 154),
    ("LIST", 155),
    ("CLR", 156),
    ("CMD", 157),
    ("SYS", 158),
    ("OPEN", 159),
    ("CLOSE", 160),
    ("GET", 161),
    ("NEW", 162),
    ("TAB", 163),
    ("TO", 164),
    ("FN", 165),
    ("SPC", 166),
    ("THEN", 167),
    ("NOT", 168),
    ("STEP", 169),
    ("+", 170),
    ("-", 171),
    ("*", 172),
    ("/", 173),
    ("^", 174),
    ("AND", 175),
    ("OR", 176),
    (">", 177),
    ("=", 178),
    ("<", 179),
    ("SGN", 180),
    ("INT", 181),
    ("ABS", 182),
    ("USR", 183),
    ("FRE", 184),
    ("POS", 185),
    ("SQR", 186),
    ("RND", 187),
    ("LOG", 188),
    ("EXP", 189),
    ("COS", 190),
    ("SIN", 191),
    ("TAN", 192),
    ("ATN", 193),
    ("PEEK", 194),
    ("LEN", 195),
    ("STR$", 196),
    ("VAL", 197),
    ("ASC", 198),
    ("CHR$", 199),
    ("LEFT$", 200),
    ("RIGHT$", 201),
    ("MID$", 202),
    ("GO", 203),
    // X16 extended tokens
    ("CHAR", 0x8bce),
    ("CLS", 0x90ce),
    ("COLOR", 0x8dce),
    ("DOS", 0x81ce),
    ("FRAME", 0x89ce),
    ("GEOS", 0x83ce),
    ("JOY", 0x95ce),
    ("LINE", 0x88ce),
    ("MON", 0x80ce),
    ("MOUSE", 0x8cce),
    ("MX", 0x92ce),
    ("MY", 0x93ce),
    ("MB", 0x94ce),
    ("OLD", 0x82ce),
    ("PSET", 0x87ce),
    ("RECT", 0x8ace),
    ("RESET", 0x8fce),
    ("SCREEN", 0x86ce),
    ("VPOKE", 0x84ce),
    ("VPEEK", 0x91ce),
    ("VLOAD", 0x85ce),
];

thread_local!(
    static KEYWORD_MAP: HashMap<&'static str, u16> = KEYWORDS.iter().cloned().collect();
);

/// Reserved words with no binary token. These are emitted as raw text.
pub const RAW_KEYWORDS: &[&str] = &["TIME", "TIME$"];

/// Two-letter reserved words. A generated variable alias matching one
/// of these is discarded and the next candidate used instead.
pub const RESERVED_PAIRS: &[&str] = &["TO", "GO", "IF", "OR", "ST", "TI"];

/// Indexed I/O pseudo-variables. Never aliased; left in place verbatim.
pub const RESERVED_VARS: &[&str] = &["GET#", "INPUT#", "PRINT#"];

/// Alias alphabets. The first character must be a letter; the second
/// may be a digit.
pub const ALIAS_FIRST: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const ALIAS_SECOND: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Valid `#ASM` argument type names.
pub const ASM_ARG_TYPES: &[&str] = &["BYTE", "WORD", "STRING"];

pub fn keyword_code(s: &str) -> Option<u16> {
    KEYWORD_MAP.with(|map| map.get(s).cloned())
}

pub fn raw_keyword_index(s: &str) -> Option<usize> {
    RAW_KEYWORDS.iter().position(|raw| *raw == s)
}

pub fn operator_code(c: char) -> Option<u16> {
    match c {
        '+' | '-' | '*' | '/' | '^' | '>' | '=' | '<' => {
            let mut buf = [0u8; 4];
            keyword_code(c.encode_utf8(&mut buf))
        }
        _ => None,
    }
}

pub fn is_operator(c: char) -> bool {
    match c {
        '+' | '-' | '*' | '/' | '^' | '>' | '=' | '<' => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_code() {
        assert_eq!(keyword_code("PRINT"), Some(153));
        assert_eq!(keyword_code("MID$"), Some(202));
        assert_eq!(keyword_code("VPOKE"), Some(0x84ce));
        assert_eq!(keyword_code("PICKLES"), None);
    }

    #[test]
    fn test_operator_code() {
        assert_eq!(operator_code('='), Some(178));
        assert_eq!(operator_code('^'), Some(174));
        assert_eq!(operator_code(','), None);
    }

    #[test]
    fn test_raw_keyword_index() {
        assert_eq!(raw_keyword_index("TIME"), Some(0));
        assert_eq!(raw_keyword_index("TIME$"), Some(1));
        assert_eq!(raw_keyword_index("TI"), None);
    }
}
