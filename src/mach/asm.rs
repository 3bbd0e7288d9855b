use crate::error;
use crate::lang::token::ASM_ARG_TYPES;
use crate::lang::{Error, Scanner, SourceLines, TokenKind};

/// Base of the fixed data area arguments are marshalled into.
pub const VAR_DATA_START: u16 = 0x7000;
/// Load address compiled machine code is copied to at run time.
pub const PROGRAM_START: u16 = 0x7050;

/// External assembler collaborator. Receives complete assembly source
/// and must return raw executable bytes.
pub trait Assembler {
    fn assemble(&mut self, source: &str) -> Result<Vec<u8>, Error>;
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum ArgType {
    Byte,
    Word,
    Str,
}

impl ArgType {
    fn helper(self) -> &'static str {
        match self {
            ArgType::Byte => "BYTE",
            ArgType::Word => "WORD",
            ArgType::Str => "STRING",
        }
    }
}

/// A declared `#ASM` argument and its slot in the data area.
struct AsmArgument {
    name: String,
    size: u16,
    offset: u16,
}

/// State for all `#ASM` blocks in one transpilation: which marshalling
/// helpers are needed, the compiled blobs, and the running load offset.
#[derive(Default)]
pub struct AsmBlocks {
    byte_helper: bool,
    word_helper: bool,
    string_helper: bool,
    compiled: Vec<Vec<u8>>,
    program_offset: usize,
}

impl AsmBlocks {
    pub fn new() -> AsmBlocks {
        AsmBlocks::default()
    }

    pub fn used(&self) -> bool {
        !self.compiled.is_empty()
    }

    /// Concatenation of all compiled blobs, in block order.
    pub fn blobs(&self) -> Vec<u8> {
        self.compiled.iter().flat_map(|b| b.iter().cloned()).collect()
    }

    /// Consumes one `#ASM(...) .. #ENDASM` block at the cursor. Leaves
    /// the generated initialization and `SYS` lines in its place, with
    /// the cursor just past them.
    pub fn parse(
        &mut self,
        lines: &mut SourceLines,
        assembler: &mut dyn Assembler,
    ) -> Result<(), Error> {
        let at = lines.line_number();
        let head = lines.remove().replacen("#ASM", "", 1);
        let mut scan = Scanner::new(&head);

        let mut args: Vec<AsmArgument> = vec![];
        let mut init_lines: Vec<String> = vec![];
        let mut offset = VAR_DATA_START;
        if scan.accept_val("(") {
            loop {
                let arg_type = match scan.val() {
                    Some(val) if ASM_ARG_TYPES.contains(&val) => match val {
                        "BYTE" => ArgType::Byte,
                        "WORD" => ArgType::Word,
                        _ => ArgType::Str,
                    },
                    _ => {
                        return Err(error!(SyntaxError, at; "EXPECTING TYPE (BYTE, WORD, STRING[N])"))
                    }
                };
                scan.next();
                let (size, set_var) = match arg_type {
                    ArgType::Byte => (1, "ASM_NUM"),
                    ArgType::Word => (2, "ASM_NUM"),
                    ArgType::Str => {
                        if !scan.accept_val("[") || !scan.is_kind(TokenKind::Number) {
                            return Err(
                                error!(SyntaxError, at; "EXPECTING STRING SIZE (E.G: STRING[40])"),
                            );
                        }
                        let size = match scan.take_val() {
                            Some(val) => val
                                .parse::<u16>()
                                .map_err(|_| error!(SyntaxError, at; "STRING SIZE TOO LARGE"))?,
                            None => {
                                return Err(
                                    error!(SyntaxError, at; "EXPECTING STRING SIZE (E.G: STRING[40])"),
                                )
                            }
                        };
                        if !scan.accept_val("]") {
                            return Err(error!(SyntaxError, at; "EXPECTING ] AFTER STRING SIZE"));
                        }
                        let size = size
                            .checked_add(1)
                            .ok_or_else(|| error!(SyntaxError, at; "STRING SIZE TOO LARGE"))?;
                        (size, "ASM_STR$")
                    }
                };
                if !scan.is_kind(TokenKind::Name) {
                    return Err(error!(SyntaxError, at; "EXPECTING ARGUMENT VAR NAME"));
                }
                let name = match scan.take_val() {
                    Some(name) => name,
                    None => return Err(error!(SyntaxError, at; "EXPECTING ARGUMENT VAR NAME")),
                };
                match arg_type {
                    ArgType::Byte => self.byte_helper = true,
                    ArgType::Word => self.word_helper = true,
                    ArgType::Str => self.string_helper = true,
                }
                init_lines.push(format!(
                    "{}= {} : GOSUB @ASM_SET_{}",
                    set_var,
                    name,
                    arg_type.helper()
                ));
                args.push(AsmArgument { name, size, offset });
                offset = offset
                    .checked_add(size)
                    .ok_or_else(|| error!(Overflow, at; "DATA AREA EXHAUSTED"))?;
                if scan.accept_val(",") {
                    continue;
                }
                if scan.is_val(")") {
                    break;
                }
                return Err(error!(SyntaxError, at; "EXPECTING , OR ) IN ARGUMENT LIST"));
            }
        }

        let mut body: Vec<String> = vec![];
        loop {
            let line = match lines.get() {
                Some(line) => line.to_string(),
                None => {
                    return Err(error!(SyntaxError, lines.line_number(); "EXPECTING #ENDASM"))
                }
            };
            if line.contains("#ENDASM") {
                if line != "#ENDASM" {
                    return Err(error!(SyntaxError, lines.line_number(); "EXPECTING #ENDASM"));
                }
                lines.remove();
                break;
            }
            lines.remove();
            let line = rewrite_args(&line, &args);
            if !line.is_empty() {
                body.push(line);
            }
        }

        if !args.is_empty() {
            init_lines.insert(0, format!("ASM_DATA_ADDR = {}", VAR_DATA_START));
        }
        lines.insert_many(init_lines.iter().map(|l| l.as_str()));

        let blob = assembler.assemble(&wrap_body(&body))?;
        let program_addr = PROGRAM_START as usize + self.program_offset;
        lines.insert(&format!("SYS ${:04X}", program_addr));
        self.program_offset += blob.len();
        self.compiled.push(blob);
        Ok(())
    }

    /// Splices the run-time plumbing around the program: the blob
    /// source-address placeholder, the bootstrap call, the bootstrap
    /// copy loop, and only the marshalling helpers actually used.
    pub fn inject(&self, lines: &mut SourceLines, header_present: bool) {
        lines.insert_at(0, "ASM_SRC=$1234");
        let index = if header_present { 2 } else { 1 };
        lines.insert_at(index, "GOSUB @ASM_BOOTSTRAP");

        lines.push("END");
        lines.push("@ASM_BOOTSTRAP:");
        lines.push(&format!("FOR ASM_I = 0 TO {} - 1", self.program_offset));
        lines.push(&format!(
            "POKE ${:04X} + ASM_I, PEEK(ASM_SRC + ASM_I)",
            PROGRAM_START
        ));
        lines.push("NEXT");
        lines.push("RETURN");

        if self.byte_helper {
            lines.push("@ASM_SET_BYTE:");
            lines.push("POKE ASM_DATA_ADDR, ASM_NUM AND $FF");
            lines.push("ASM_DATA_ADDR = ASM_DATA_ADDR + 1");
            lines.push("RETURN");
        }
        if self.word_helper {
            lines.push("@ASM_SET_WORD:");
            lines.push("POKE ASM_DATA_ADDR, ASM_NUM AND $FF");
            lines.push("POKE ASM_DATA_ADDR + 1, INT(ASM_NUM / 256)");
            lines.push("ASM_DATA_ADDR = ASM_DATA_ADDR + 2");
            lines.push("RETURN");
        }
        if self.string_helper {
            lines.push("@ASM_SET_STRING:");
            lines.push("ASM_STR_LEN = LEN(ASM_STR$)");
            lines.push("FOR ASM_I = 1 TO ASM_STR_LEN");
            lines.push("POKE ASM_DATA_ADDR + ASM_I - 1, ASC(MID$(ASM_STR$, ASM_I, 1))");
            lines.push("NEXT");
            lines.push("POKE ASM_DATA_ADDR + ASM_I - 1, 0");
            lines.push("ASM_DATA_ADDR = ASM_DATA_ADDR + ASM_STR_LEN + 1");
            lines.push("RETURN");
        }
    }
}

/// Wraps a rewritten block body in the cc65 origin/segment preamble
/// and a trailing return.
fn wrap_body(body: &[String]) -> String {
    format!(
        ".org ${:04X}\r\n.segment \"STARTUP\"\r\n.segment \"INIT\"\r\n.segment \"ONCE\"\r\n.segment \"CODE\"\r\n{}\r\nrts\r\n",
        PROGRAM_START,
        body.join("\r\n")
    )
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_'
}

/// Rewrites boundary-delimited argument references in an assembly line
/// into absolute data-area addresses. Matching is case-insensitive.
fn rewrite_args(line: &str, args: &[AsmArgument]) -> String {
    let mut line = line.to_string();
    for arg in args {
        loop {
            let upper = line.to_ascii_uppercase();
            let bytes = upper.as_bytes();
            let mut found = None;
            let mut from = 0;
            while let Some(rel) = upper[from..].find(&arg.name) {
                let start = from + rel;
                let end = start + arg.name.len();
                let prev_ok = start == 0 || !is_word_byte(bytes[start - 1]);
                let next_ok = end >= bytes.len() || !is_word_byte(bytes[end]);
                if prev_ok && next_ok {
                    found = Some((start, end));
                    break;
                }
                from = start + 1;
            }
            match found {
                Some((start, end)) => {
                    line = format!("{}${:04X}{}", &line[..start], arg.offset, &line[end..]);
                }
                None => break,
            }
        }
    }
    line
}
