use super::asm::{AsmBlocks, Assembler};
use super::emit;
use crate::lang::tagger::{self, Directive};
use crate::lang::{pack, Error, Node, SourceLines, Symbols};
use crate::error;
use log::debug;

/// Core behaviors selected by the CLI collaborator.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Use the PETSCII character set: skip the screen-code header
    /// statement normally emitted at the top of the program.
    pub petscii: bool,
}

/// Transpiles extended BASIC source text into a tokenized program
/// image. Nothing is produced on error, so callers can never clobber
/// a previous valid output file.
pub fn transpile(
    source: &str,
    options: &Options,
    assembler: &mut dyn Assembler,
) -> Result<Vec<u8>, Error> {
    Transpiler::new(options).run(source, assembler)
}

/// All mutable state for one transpilation run.
struct Transpiler {
    petscii: bool,
    symbols: Symbols,
    asm: AsmBlocks,
}

impl Transpiler {
    fn new(options: &Options) -> Transpiler {
        Transpiler {
            petscii: options.petscii,
            symbols: Symbols::new(),
            asm: AsmBlocks::new(),
        }
    }

    fn run(mut self, source: &str, assembler: &mut dyn Assembler) -> Result<Vec<u8>, Error> {
        let mut lines = SourceLines::from_str(source);
        if !self.petscii {
            lines.insert_at(0, "PRINT CHR$(15)");
        }
        self.strip(&mut lines, assembler)?;
        if self.asm.used() {
            self.asm.inject(&mut lines, !self.petscii);
        }
        self.resolve(&mut lines)?;
        lines.retain_nonempty();
        debug!("tagged {} lines, {} variables", lines.len(), self.symbols.vars.len());
        let packed = self.pack_lines(lines)?;
        let mut image = emit::emit(&packed, &self.symbols)?;
        let blobs = self.asm.blobs();
        if self.asm.used() {
            emit::append_blobs(&mut image, &blobs)?;
            debug!("appended {} bytes of compiled assembly", blobs.len());
        }
        debug!("emitted {} bytes", image.len());
        Ok(image)
    }

    /// Pass 1: pool strings and comments, register `#DEFINE` macros,
    /// and expand `#ASM` blocks. Each line is re-scanned until nothing
    /// of interest remains on it.
    fn strip(&mut self, lines: &mut SourceLines, assembler: &mut dyn Assembler) -> Result<(), Error> {
        lines.rewind();
        while let Some(line) = lines.get() {
            let line = line.to_string();
            let at = lines.line_number();
            match tagger::find_directive(&line) {
                Some(Directive::Asm) => {
                    self.asm.parse(lines, assembler)?;
                }
                Some(Directive::Define) => {
                    let (name, value) =
                        tagger::parse_define(&line).map_err(|e| e.in_line_number(at))?;
                    self.symbols.defines.insert(&name, &value);
                    lines.remove();
                }
                Some(Directive::Comment(index)) => {
                    lines.set(&tagger::strip_comment(&line, index, &mut self.symbols.comments));
                }
                Some(Directive::Str(index)) => {
                    let stripped = tagger::strip_string(&line, index, &mut self.symbols.strings)
                        .map_err(|e| e.in_line_number(at))?;
                    lines.set(&stripped);
                }
                None => {
                    lines.advance();
                }
            }
        }
        Ok(())
    }

    /// Pass 2: expand defines, then tag numbers, identifiers, and
    /// operators. Line numbers ascend by 10 over surviving lines.
    fn resolve(&mut self, lines: &mut SourceLines) -> Result<(), Error> {
        lines.rewind();
        let mut line_number: u16 = 10;
        while let Some(line) = lines.get() {
            let line = line.to_string();
            let at = lines.line_number();
            let line = tagger::apply_defines(&line, &self.symbols.defines)
                .map_err(|e| e.in_line_number(at))?;
            let line = tagger::tag_numbers(&line, &mut self.symbols.numbers);
            let line = tagger::tag_idents(&line, &mut self.symbols, line_number)
                .map_err(|e| e.in_line_number(at))?;
            let line = tagger::tag_operators(&line).map_err(|e| e.in_line_number(at))?;
            let line = tagger::collapse_whitespace(&line);
            if !line.is_empty() {
                line_number = line_number
                    .checked_add(10)
                    .ok_or_else(|| error!(Overflow; "TOO MANY LINES"))?;
            }
            lines.set(&line);
            lines.advance();
        }
        Ok(())
    }

    /// Pass 3: convert each surviving line's tagged text into its
    /// final node sequence.
    fn pack_lines(&self, lines: SourceLines) -> Result<Vec<Vec<Node>>, Error> {
        lines
            .into_lines()
            .iter()
            .map(|line| pack(line))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoAssembler;

    impl Assembler for NoAssembler {
        fn assemble(&mut self, _source: &str) -> Result<Vec<u8>, Error> {
            Err(error!(ToolchainError; "NO ASSEMBLER IN THIS TEST"))
        }
    }

    fn petscii() -> Options {
        Options { petscii: true }
    }

    #[test]
    fn test_screen_code_header_default() {
        let image = transpile("PRINT 1", &Options::default(), &mut NoAssembler).unwrap();
        // line 10 is PRINT CHR$(15)
        assert_eq!(&image[6..8], &[0x99, 0x20]);
        assert_eq!(&image[8..9], &[0xC7]); // CHR$
        assert_eq!(&image[9..13], b"(15)");
    }

    #[test]
    fn test_unterminated_string_names_line() {
        let error = transpile("PRINT 1\nPRINT \"OOPS", &petscii(), &mut NoAssembler).unwrap_err();
        assert_eq!(
            error.to_string(),
            "SYNTAX ERROR IN LINE 2; COULD NOT FIND END OF STRING"
        );
    }

    #[test]
    fn test_two_strings_on_one_line() {
        let image = transpile("PRINT \"A\";\"B\"", &petscii(), &mut NoAssembler).unwrap();
        assert_eq!(
            &image[6..],
            &[
                0x99, 0x20, 0x22, 0x41, 0x22, 0x3B, 0x22, 0x42, 0x22, 0x00, 0x00, 0x00
            ]
        );
    }

    #[test]
    fn test_define_not_substituted_in_string() {
        let image = transpile(
            "#DEFINE GREETING 99\nPRINT \"GREETING\"\nPRINT GREETING",
            &petscii(),
            &mut NoAssembler,
        )
        .unwrap();
        // line 10 keeps the literal text
        assert_eq!(&image[6..15], &[0x99, 0x20, 0x22, 0x47, 0x52, 0x45, 0x45, 0x54, 0x49]);
        // line 20 got the macro value
        let line2 = 2 + 4 + 2 + 10 + 1 + 4;
        assert_eq!(&image[line2..line2 + 4], &[0x99, 0x20, 0x39, 0x39]);
    }

    #[test]
    fn test_deterministic_output() {
        let source = "@TOP:\nA = A + 1\nB$ = \"X\"\nGOTO @TOP\n'DONE";
        let first = transpile(source, &Options::default(), &mut NoAssembler).unwrap();
        let second = transpile(source, &Options::default(), &mut NoAssembler).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_comment_kept_as_rem() {
        let image = transpile("A = 1 'NOTE", &petscii(), &mut NoAssembler).unwrap();
        assert_eq!(
            &image[6..],
            &[
                0x41, 0x41, 0x20, 0xB2, 0x20, 0x31, 0x20, 0x8F, 0x20, 0x4E, 0x4F, 0x54, 0x45,
                0x00, 0x00, 0x00
            ]
        );
    }

    #[test]
    fn test_label_resolution_counts_surviving_lines() {
        // the #DEFINE line is removed before numbering, so @SUB lands
        // on line 20
        let source = "#DEFINE TWO 2\nPRINT TWO\n@SUB:\nRETURN";
        let image = transpile(source, &petscii(), &mut NoAssembler).unwrap();
        let mut symbols_check = vec![];
        // separator line 19 precedes the labeled line 20
        for window in image.windows(2) {
            if window == [0x13, 0x00] || window == [0x14, 0x00] {
                symbols_check.push(window.to_vec());
            }
        }
        assert!(!symbols_check.is_empty());
    }
}
