// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error taxonomy for the compiler, plus the crate-wide `Error` the CLI
//! surfaces.

use std::io;
use thiserror::Error as ThisError;

/// Errors the compiler can raise while parsing a regex source string.
///
/// Every variant carries the byte offset into the source at which the
/// problem was detected, so a caller can point at the exact spot.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CompileError {
    #[error("unexpected end of pattern at byte {offset}")]
    UnexpectedEof { offset: usize },

    #[error("'{what}' is only meaningful at byte {offset}")]
    UnsupportedClass { what: char, offset: usize },

    #[error("'{op}' at byte {offset} has nothing to repeat")]
    MissingRepeatArgument { op: char, offset: usize },

    #[error("unterminated character class starting at byte {offset}")]
    MissingBracket { offset: usize },

    #[error("unterminated group starting at byte {offset}")]
    MissingParen { offset: usize },

    #[error("invalid character range at byte {offset}: '{from}' > '{to}'")]
    InvalidCharRange { from: char, to: char, offset: usize },

    #[error("backreference \\{group} at byte {offset} refers to a group not yet opened")]
    InvalidBackReference { group: usize, offset: usize },
}

/// Crate-wide error type. Compilation failures are the expected case;
/// `Io` exists so the `bgrep` front end can fold file-system errors
/// encountered while walking a path into the same `Result` plumbing.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
