//! # XBT
//!
//! Transpiles an extended dialect of BASIC into the tokenized binary
//! program format loaded by the Commander X16.
//!
//! The dialect drops line numbers in favor of symbolic `@LABEL`
//! targets, adds `#DEFINE` text macros, and embeds 65C02 assembly in
//! `#ASM(...) .. #ENDASM` blocks compiled through the cc65 toolchain.
//! Output is a `.prg` image: a two byte load address followed by
//! tokenized line records, with any compiled machine code appended
//! and copied into place at run time by a generated bootstrap.

pub mod lang;
pub mod mach;
