use crate::error;
use crate::lang::token::RAW_KEYWORDS;
use crate::lang::{Error, Node, Symbols, Tag};

/// Memory address the tokenized program loads at. The first two bytes
/// of the image hold this value; program content follows.
pub const LOAD_ADDRESS: u16 = 0x0801;

/// Byte offset of the ASCII hex field patched with the program length
/// when assembly blobs are appended. It lands inside the `$1234`
/// placeholder of the `ASM_SRC=$1234` line, which is always emitted
/// first when inline assembly is in use.
pub const LENGTH_FIELD_OFFSET: usize = 10;

const REM_TOKEN: u8 = 0x8F;
const QUOTE: u8 = 0x22;

/// Serializes the packed lines into the interpreter's tokenized format.
pub fn emit(lines: &[Vec<Node>], symbols: &Symbols) -> Result<Vec<u8>, Error> {
    let mut buf: Vec<u8> = vec![];
    push_word(&mut buf, LOAD_ADDRESS);
    let mut line_number: u16 = 10;
    for nodes in lines {
        if nodes
            .iter()
            .any(|node| matches!(node, Node::Tag(Tag::LabelDef(_))))
        {
            // separator REM line ahead of a labeled line
            let record = begin_record(&mut buf, line_number - 1);
            buf.push(REM_TOKEN);
            end_record(&mut buf, record)?;
        }
        let record = begin_record(&mut buf, line_number);
        for node in nodes {
            emit_node(&mut buf, node, symbols)?;
        }
        end_record(&mut buf, record)?;
        line_number = line_number
            .checked_add(10)
            .ok_or_else(|| error!(Overflow; "TOO MANY LINES"))?;
    }
    buf.push(0);
    buf.push(0);
    Ok(buf)
}

fn emit_node(buf: &mut Vec<u8>, node: &Node, symbols: &Symbols) -> Result<(), Error> {
    match node {
        Node::Char(c) => buf.push(*c as u8),
        Node::Tag(tag) => match tag {
            Tag::Keyword(code) | Tag::Operator(code) => {
                if *code < 256 {
                    buf.push(*code as u8);
                } else {
                    push_word(buf, *code);
                }
            }
            Tag::Raw(index) => match RAW_KEYWORDS.get(*index) {
                Some(raw) => buf.extend_from_slice(raw.as_bytes()),
                None => return Err(error!(InternalError; "RAW KEYWORD POOL MISS")),
            },
            Tag::Str(index) => match symbols.strings.get(*index) {
                Some(text) => {
                    buf.push(QUOTE);
                    buf.extend_from_slice(text.as_bytes());
                    buf.push(QUOTE);
                }
                None => return Err(error!(InternalError; "STRING POOL MISS")),
            },
            Tag::Comment(index) => match symbols.comments.get(*index) {
                Some(text) => push_comment(buf, text),
                None => return Err(error!(InternalError; "COMMENT POOL MISS")),
            },
            Tag::Number(index) => match symbols.numbers.get(*index) {
                Some(text) => buf.extend_from_slice(text.as_bytes()),
                None => return Err(error!(InternalError; "NUMBER POOL MISS")),
            },
            Tag::LabelDef(index) => match symbols.labels.name(*index) {
                Some(name) => push_comment(buf, &format!("*** {} ***", name)),
                None => return Err(error!(InternalError; "LABEL TABLE MISS")),
            },
            Tag::LabelRef(index) => {
                let name = symbols
                    .labels
                    .name(*index)
                    .ok_or_else(|| error!(InternalError; "LABEL TABLE MISS"))?;
                let target = symbols.labels.line_for(name).ok_or_else(
                    || error!(SyntaxError; format!("UNDEFINED LABEL @{}", name)),
                )?;
                buf.extend_from_slice(target.to_string().as_bytes());
            }
            Tag::Var(index) => match symbols.vars.alias(*index) {
                Some(alias) => buf.extend_from_slice(alias.as_bytes()),
                None => return Err(error!(InternalError; "VARIABLE TABLE MISS")),
            },
        },
    }
    Ok(())
}

/// Appends the compiled assembly blobs and patches the length field so
/// the interpreter's variable-area pointer lands past the program.
pub fn append_blobs(buf: &mut Vec<u8>, blobs: &[u8]) -> Result<(), Error> {
    let end = buf.len() + LOAD_ADDRESS as usize - 2;
    if end > u16::max_value() as usize {
        return Err(error!(Overflow; "PROGRAM TOO LARGE"));
    }
    if buf.len() < LENGTH_FIELD_OFFSET + 4 {
        return Err(error!(InternalError; "LENGTH FIELD MISSING"));
    }
    let field = format!("{:04X}", end);
    buf[LENGTH_FIELD_OFFSET..LENGTH_FIELD_OFFSET + 4].copy_from_slice(field.as_bytes());
    buf.extend_from_slice(blobs);
    Ok(())
}

fn push_word(buf: &mut Vec<u8>, val: u16) {
    buf.push((val & 0xFF) as u8);
    buf.push((val >> 8) as u8);
}

fn push_comment(buf: &mut Vec<u8>, text: &str) {
    buf.push(REM_TOKEN);
    buf.push(0x20);
    buf.extend_from_slice(text.as_bytes());
}

/// Reserves the next-line pointer and writes the line number. Returns
/// the pointer's position for backpatching.
fn begin_record(buf: &mut Vec<u8>, line_number: u16) -> usize {
    let record = buf.len();
    push_word(buf, 0);
    push_word(buf, line_number);
    record
}

/// Backpatches the next-line pointer and terminates the record.
fn end_record(buf: &mut Vec<u8>, record: usize) -> Result<(), Error> {
    let next = LOAD_ADDRESS as usize + buf.len() - 1;
    if next > u16::max_value() as usize {
        return Err(error!(Overflow; "PROGRAM TOO LARGE"));
    }
    buf[record] = (next & 0xFF) as u8;
    buf[record + 1] = (next >> 8) as u8;
    buf.push(0);
    Ok(())
}
