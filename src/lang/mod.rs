/*!
# Language Module

Lexical analysis of extended BASIC source: the tagging passes, symbol
tables, and the argument-list scanner used by inline assembly.

*/

#[macro_use]
mod error;
mod scan;
mod source;
mod symbol;
mod tag;
pub mod tagger;
pub mod token;

pub use error::Error;
pub use error::ErrorCode;
pub use error::LineNumber;
pub use scan::Scanner;
pub use scan::TokenKind;
pub use source::SourceLines;
pub use symbol::Defines;
pub use symbol::Labels;
pub use symbol::Pool;
pub use symbol::Symbols;
pub use symbol::Variables;
pub use tag::pack;
pub use tag::Node;
pub use tag::Tag;
