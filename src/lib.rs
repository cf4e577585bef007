// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A small backtracking regular-expression engine: a recursive-descent
//! compiler ([`compile`]) feeding an explicit-stack virtual machine
//! ([`backtrack`]).
//!
//! ```
//! use rexbt::Regex;
//!
//! let re = Regex::new(r"(\w+)@(\w+)\.com").unwrap();
//! assert!(re.is_match("contact: jane@example.com"));
//! ```

pub mod capture;
pub mod cli;
pub mod compile;
pub mod error;
pub mod inst;
pub mod pattern;

mod backtrack;

pub use crate::error::CompileError;

use crate::backtrack::{anchored_to_start, Backtrack};
use crate::inst::Inst;
use crate::pattern::Pattern;

/// Knobs that change how a [`Regex`] matches, independent of its source
/// text.
#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    /// `^`/`$` also match right after/before an embedded `\n`, not only at
    /// the very start/end of the input.
    pub multiline: bool,
    /// Byte comparisons ignore ASCII case.
    pub ignore_case: bool,
}

/// The bounds of a successful match and its capture groups.
///
/// Slot `0` is always the whole match; slot `n` (`n >= 1`) is the `n`th
/// capture group, counting `(` from left to right, present only if that
/// group took part in the match.
#[derive(Clone, Debug)]
pub struct Captures {
    slots: Vec<Option<usize>>,
}

impl Captures {
    /// The byte range of the whole match.
    pub fn get(&self, n: usize) -> Option<(usize, usize)> {
        capture::bounds(&self.slots, n)
    }

    /// Number of groups tracked, including the implicit whole-match group.
    pub fn len(&self) -> usize {
        self.slots.len() / 2
    }
}

/// A compiled regular expression.
pub struct Regex {
    insts: Vec<Inst>,
    patterns: Vec<Pattern>,
    group_count: usize,
    options: Options,
    anchored: bool,
}

impl Regex {
    /// Compiles `source` with default options (no multiline, case-sensitive).
    pub fn new(source: &str) -> Result<Regex, CompileError> {
        Regex::with_options(source, Options::default())
    }

    /// Compiles `source` with the given [`Options`].
    pub fn with_options(source: &str, options: Options) -> Result<Regex, CompileError> {
        let (insts, patterns, group_count) = compile::compile(source.as_bytes())?;
        let anchored = anchored_to_start(&insts, options.multiline);
        Ok(Regex { insts, patterns, group_count, options, anchored })
    }

    /// Atomically replaces this regex's program with a fresh compile of
    /// `source`, keeping the current [`Options`].
    ///
    /// Compiles first and only swaps `self`'s instructions/patterns in on
    /// success, so a bad `source` leaves the previous program fully intact
    /// and matchable; the old `Vec`s are simply dropped once replaced.
    pub fn recompile(&mut self, source: &str) -> Result<(), CompileError> {
        let (insts, patterns, group_count) = compile::compile(source.as_bytes())?;
        let anchored = anchored_to_start(&insts, self.options.multiline);
        self.insts = insts;
        self.patterns = patterns;
        self.group_count = group_count;
        self.anchored = anchored;
        Ok(())
    }

    /// Returns a clone of this regex with new [`Options`] applied to the
    /// same instruction graph, without reparsing the source text (which
    /// `Regex` doesn't retain). Useful when only the flags, not the
    /// pattern, are changing.
    pub fn recompile_with(&self, options: Options) -> Regex {
        let anchored = anchored_to_start(&self.insts, options.multiline);
        Regex {
            insts: self.insts.clone(),
            patterns: self.patterns.clone(),
            group_count: self.group_count,
            options,
            anchored,
        }
    }

    /// Whether `input` contains a match anywhere.
    ///
    /// This never fails: allocation failure aborts the process rather than
    /// returning a catchable error, so unlike compilation there's nothing
    /// for a `Result` to carry.
    pub fn is_match(&self, input: &str) -> bool {
        self.find(input).is_some()
    }

    /// Finds the leftmost match in `input`, with its capture groups.
    pub fn find(&self, input: &str) -> Option<Captures> {
        let input = input.as_bytes();
        let mut vm = Backtrack::new(
            &self.insts,
            &self.patterns,
            input,
            self.group_count,
            self.options.multiline,
            self.options.ignore_case,
        );
        let last_start = if self.anchored { 0 } else { input.len() };
        for at in 0..=last_start {
            if let Some(slots) = vm.try_at(at) {
                return Some(Captures { slots });
            }
        }
        None
    }

    pub fn options(&self) -> Options {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_and_matches() {
        let re = Regex::new("a+b").unwrap();
        assert!(re.is_match("xxaaabxx"));
        assert!(!re.is_match("xxc"));
    }

    #[test]
    fn reports_compile_errors() {
        assert!(Regex::new("(unterminated").is_err());
    }

    #[test]
    fn captures_are_addressable_by_group_number() {
        let re = Regex::new(r"(\w+)@(\w+)\.com").unwrap();
        let caps = re.find("jane@example.com").unwrap();
        let (s, e) = caps.get(1).unwrap();
        assert_eq!(&"jane@example.com"[s..e], "jane");
        let (s, e) = caps.get(2).unwrap();
        assert_eq!(&"jane@example.com"[s..e], "example");
    }

    #[test]
    fn multiline_option_changes_anchor_behavior() {
        let re = Regex::new("^log").unwrap();
        assert!(!re.is_match("info: ok\nlog: trouble"));

        let re = Regex::with_options("^log", Options { multiline: true, ignore_case: false })
            .unwrap();
        assert!(re.is_match("info: ok\nlog: trouble"));
    }

    #[test]
    fn ignore_case_option_folds_ascii() {
        let re =
            Regex::with_options("hello", Options { multiline: false, ignore_case: true }).unwrap();
        assert!(re.is_match("HELLO world"));
    }

    #[test]
    fn empty_input_matches_only_when_regex_accepts_empty_string() {
        assert!(Regex::new("a*").unwrap().is_match(""));
        assert!(!Regex::new("a+").unwrap().is_match(""));
    }

    #[test]
    fn recompile_swaps_the_program_in_place() {
        let mut re = Regex::new("a+b").unwrap();
        assert!(re.is_match("xxaaabxx"));
        re.recompile("c+d").unwrap();
        assert!(re.is_match("xxcccdxx"));
        assert!(!re.is_match("xxaaabxx"));
    }

    #[test]
    fn recompile_leaves_old_program_intact_on_error() {
        let mut re = Regex::new("a+b").unwrap();
        assert!(re.recompile("(unterminated").is_err());
        assert!(re.is_match("xxaaabxx"));
    }
}
