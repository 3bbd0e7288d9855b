/*!
## Machine Module

This module serializes tagged programs into the interpreter's binary
format and handles the inline-assembly handshake with the external
toolchain.

*/

pub mod asm;
pub mod cl65;
pub mod emit;
mod transpile;

pub use asm::AsmBlocks;
pub use asm::Assembler;
pub use cl65::Cl65;
pub use emit::LOAD_ADDRESS;
pub use transpile::transpile;
pub use transpile::Options;
