mod common;

use common::{contains, line_numbers, prg, try_prg};

#[test]
fn single_print_image() {
    let image = prg("PRINT \"HI\"", true);
    assert_eq!(
        image,
        vec![
            0x01, 0x08, // load address $0801
            0x0C, 0x08, // next line pointer
            0x0A, 0x00, // line 10
            0x99, 0x20, 0x22, 0x48, 0x49, 0x22, // PRINT "HI"
            0x00, // end of line
            0x00, 0x00, // end of program
        ]
    );
}

#[test]
fn labels_resolve_to_line_numbers() {
    let image = prg("GOSUB @SUB\nEND\n@SUB:\nRETURN", true);
    assert_eq!(line_numbers(&image), vec![10, 20, 29, 30, 40]);
    // GOSUB @SUB becomes GOSUB 30
    assert!(contains(&image, &[0x8D, 0x20, b'3', b'0']));
    // the separator line before the label is a lone REM
    assert!(contains(&image, &[0x1D, 0x00, 0x8F, 0x00]));
}

#[test]
fn variables_get_short_aliases() {
    let source = "LONGNAME = 1\nTEXT$ = \"A\"\nCOUNT% = 2\nVALUE! = 3\nPRINT LONGNAME";
    let image = prg(source, true);
    assert!(contains(&image, &[b'A', b'A', 0x20, 0xB2]));
    assert!(contains(&image, &[b'A', b'B', b'$']));
    assert!(contains(&image, &[b'A', b'C', b'%']));
    assert!(contains(&image, &[b'A', b'D', 0x20, 0xB2]));
    // the long names never reach the image
    assert!(!contains(&image, b"LONGNAME"));
    assert!(!contains(&image, b"TEXT"));
}

#[test]
fn defines_substitute_outside_strings() {
    let source = "#DEFINE SPEED 42\nPRINT SPEED\nPRINT \"SPEED\"";
    let image = prg(source, true);
    assert!(contains(&image, &[0x99, 0x20, b'4', b'2']));
    assert!(contains(&image, &[0x22, b'S', b'P', b'E', b'E', b'D', 0x22]));
}

#[test]
fn screen_code_header_prepended() {
    let image = prg("PRINT 1", false);
    let numbers = line_numbers(&image);
    assert_eq!(numbers, vec![10, 20]);
    // PRINT CHR$(15)
    assert!(contains(&image, &[0x99, 0x20, 0xC7, 0x28, b'1', b'5', 0x29]));
}

#[test]
fn output_is_deterministic() {
    let source = "#DEFINE N 3\n@TOP:\nFOR I = 1 TO N\nPRINT I\nNEXT\nGOTO @TOP";
    assert_eq!(prg(source, true), prg(source, true));
}

#[test]
fn unterminated_asm_block_is_an_error() {
    let err = try_prg("PRINT 1\n#ASM\nLDA #$00", true).unwrap_err();
    assert_eq!(err.to_string(), "SYNTAX ERROR IN LINE 2; EXPECTING #ENDASM");
}

#[test]
fn undefined_label_is_an_error() {
    let err = try_prg("GOTO @NOWHERE", true).unwrap_err();
    assert_eq!(err.to_string(), "SYNTAX ERROR; UNDEFINED LABEL @NOWHERE");
}
