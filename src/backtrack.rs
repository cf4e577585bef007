// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A backtracking virtual machine that walks the instruction graph with an
//! explicit job stack rather than the call stack, so a pathological regex
//! can't blow the native stack before it blows its own budget.
//!
//! `Split` and `GroupStart`/`GroupEnd` carry two live, unconditional
//! successors: both `next` and `alt` get pushed, `next` last so it runs
//! first (greedy). Every other instruction is if/else — `Match` accepts a
//! byte and goes to `next`, or doesn't and goes to `alt`, never both — so
//! `?`/`*` quantifiers on a bare atom never patch that atom's own `alt`;
//! the compiler wraps it in a real `Split` instead (see
//! `compile::Compiler::wrap_with_split`).
//!
//! There is deliberately no "visited" bitmap bounding this to `O(mn)` steps:
//! memoizing on `(pc, at)` alone is unsound once `Backref` instructions
//! exist, since whether a state can succeed depends on capture contents
//! the pair doesn't mention.

use crate::capture;
use crate::inst::{Anchor, Inst, InstIdx, Op};
use crate::pattern::{is_word, Pattern};

/// The first real instruction always lives here: index `0` is the `Nil`
/// sentinel a freshly compiled program starts with.
const START_PC: InstIdx = 1;

enum Job {
    Inst { pc: InstIdx, at: usize },
    Restore { slot: usize, old: Option<usize> },
}

/// Runs one compiled program against one input buffer.
pub struct Backtrack<'a> {
    insts: &'a [Inst],
    patterns: &'a [Pattern],
    input: &'a [u8],
    multiline: bool,
    ignore_case: bool,
    slots: Vec<Option<usize>>,
    stack: Vec<Job>,
}

impl<'a> Backtrack<'a> {
    pub fn new(
        insts: &'a [Inst],
        patterns: &'a [Pattern],
        input: &'a [u8],
        group_count: usize,
        multiline: bool,
        ignore_case: bool,
    ) -> Backtrack<'a> {
        Backtrack {
            insts,
            patterns,
            input,
            multiline,
            ignore_case,
            slots: capture::new_slots(group_count),
            stack: Vec::new(),
        }
    }

    /// Attempts a match beginning exactly at byte offset `at`. On success,
    /// returns the capture slots (slot 0/1 hold the whole match's bounds).
    pub fn try_at(&mut self, at: usize) -> Option<Vec<Option<usize>>> {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.slots[0] = Some(at);
        self.stack.clear();
        self.stack.push(Job::Inst { pc: START_PC, at });
        while let Some(job) = self.stack.pop() {
            match job {
                Job::Restore { slot, old } => self.slots[slot] = old,
                Job::Inst { pc, at } => {
                    if self.step(pc, at) {
                        return Some(self.slots.clone());
                    }
                }
            }
        }
        None
    }

    /// Executes one instruction, pushing whatever follow-up jobs it
    /// implies. Returns `true` exactly when `End` is reached, meaning the
    /// overall match has succeeded.
    fn step(&mut self, pc: InstIdx, at: usize) -> bool {
        let inst = &self.insts[pc];
        let alt = inst.alt;
        let next = inst.next;
        match inst.op {
            Op::Nil => false,
            Op::End => {
                self.slots[1] = Some(at);
                true
            }
            Op::Split => {
                if alt != 0 {
                    self.stack.push(Job::Inst { pc: alt, at });
                }
                self.stack.push(Job::Inst { pc: next, at });
                false
            }
            // `Match`/`Assert`/`Backref` are if/else instructions per the
            // matcher semantics: accept the byte (or assertion, or
            // backreference) and go to `next`, XOR reject and go to
            // `alt` — never both. Scheduling `alt` unconditionally here
            // would, for instance, let a negated character class's
            // trailing catch-all accept a byte one of the class's own
            // excluded items already matched.
            Op::Match(p_idx) => {
                if at < self.input.len()
                    && self.patterns[p_idx].matches(self.input[at], self.ignore_case)
                {
                    self.stack.push(Job::Inst { pc: next, at: at + 1 });
                } else if alt != 0 {
                    self.stack.push(Job::Inst { pc: alt, at });
                }
                false
            }
            Op::Assert(anchor) => {
                if self.check_anchor(anchor, at) {
                    self.stack.push(Job::Inst { pc: next, at });
                } else if alt != 0 {
                    self.stack.push(Job::Inst { pc: alt, at });
                }
                false
            }
            // `GroupStart`/`GroupEnd` are genuinely "OR" — see `save`.
            Op::GroupStart(n) => self.save(2 * n, next, alt, at),
            Op::GroupEnd(n) => self.save(2 * n + 1, next, alt, at),
            Op::Backref(n) => {
                let matched_end = capture::bounds(&self.slots, n).and_then(|(start, end)| {
                    let len = end - start;
                    if at + len > self.input.len() {
                        return None;
                    }
                    let wanted = &self.input[start..end];
                    let got = &self.input[at..at + len];
                    let matched = if self.ignore_case {
                        wanted.eq_ignore_ascii_case(got)
                    } else {
                        wanted == got
                    };
                    matched.then_some(at + len)
                });
                match matched_end {
                    Some(end) => self.stack.push(Job::Inst { pc: next, at: end }),
                    None if alt != 0 => self.stack.push(Job::Inst { pc: alt, at }),
                    None => {}
                }
                false
            }
        }
    }

    /// Shared body of `GroupStart`/`GroupEnd`: records the current
    /// position into `slot`, pushing a job that restores the slot's prior
    /// value once the `next` path is exhausted and backtracking falls
    /// through to `alt`.
    fn save(&mut self, slot: usize, next: InstIdx, alt: InstIdx, at: usize) -> bool {
        let old = self.slots[slot];
        if alt != 0 {
            self.stack.push(Job::Inst { pc: alt, at });
        }
        self.stack.push(Job::Restore { slot, old });
        self.slots[slot] = Some(at);
        self.stack.push(Job::Inst { pc: next, at });
        false
    }

    fn check_anchor(&self, anchor: Anchor, at: usize) -> bool {
        match anchor {
            Anchor::StartLineOrString => {
                at == 0 || (self.multiline && self.input[at - 1] == b'\n')
            }
            Anchor::EndLineOrString => {
                at == self.input.len() || (self.multiline && self.input[at] == b'\n')
            }
            Anchor::WordBoundary => self.is_word_boundary(at),
            Anchor::NonWordBoundary => !self.is_word_boundary(at),
        }
    }

    fn is_word_boundary(&self, at: usize) -> bool {
        let before = at > 0 && is_word(self.input[at - 1]);
        let after = at < self.input.len() && is_word(self.input[at]);
        before != after
    }
}

/// Whether a program can only ever match starting at offset `0`: it's
/// `^`-anchored and not running in multiline mode (where `^` also matches
/// right after any `\n`, so every position must still be tried).
pub fn anchored_to_start(insts: &[Inst], multiline: bool) -> bool {
    if multiline {
        return false;
    }
    matches!(insts.get(START_PC).map(|i| &i.op), Some(Op::Assert(Anchor::StartLineOrString)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;

    fn run(src: &str, input: &str, multiline: bool, ignore_case: bool) -> Option<Vec<Option<usize>>> {
        let (insts, patterns, group_count) = compile(src.as_bytes()).unwrap();
        let input = input.as_bytes();
        let anchored = anchored_to_start(&insts, multiline);
        let mut bt = Backtrack::new(&insts, &patterns, input, group_count, multiline, ignore_case);
        let last_start = if anchored { 0 } else { input.len() };
        for at in 0..=last_start {
            if let Some(slots) = bt.try_at(at) {
                return Some(slots);
            }
        }
        None
    }

    #[test]
    fn literal_concat() {
        assert!(run("abc", "xxabcxx", false, false).is_some());
        assert!(run("abc", "xxabxx", false, false).is_none());
    }

    #[test]
    fn empty_pattern_matches_empty_input() {
        assert!(run("", "", false, false).is_some());
    }

    #[test]
    fn star_is_greedy_but_backtracks() {
        // `a*a` against `"aaa"` needs the `a*` to give back one `a`.
        assert!(run("a*a", "aaa", false, false).is_some());
    }

    #[test]
    fn backreference_repeats_captured_text() {
        let slots = run(r"(a|b+) \1", "bbb bb", false, false);
        assert!(slots.is_none(), "\\1 must equal the full 'bbb', not a prefix");
        let slots = run(r"(a|b+) \1", "bbb bbb", false, false).unwrap();
        let (s, e) = capture::bounds(&slots, 1).unwrap();
        assert_eq!(&b"bbb bbb"[s..e], b"bbb");
    }

    #[test]
    fn negated_class_excludes_listed_bytes() {
        assert!(run("[^xyz] always me", "a always me", false, false).is_some());
        assert!(run("[^xyz] always me", "x always me", false, false).is_none());
        assert!(run("[^xyz] always me", "y always me", false, false).is_none());
        assert!(run("[^xyz] always me", "z always me", false, false).is_none());
    }

    #[test]
    fn optional_atom_falls_back_to_skipping_on_mismatch() {
        // `a?a` must be able to skip the optional `a` and still match via
        // the mandatory one, not double-consume or double-reject a byte
        // that the optional atom's own accept path already used.
        assert!(run("a?a", "a", false, false).is_some());
        assert!(run("a?a", "aa", false, false).is_some());
        assert!(run("a?a", "", false, false).is_none());
    }

    #[test]
    fn star_on_a_bare_literal_does_not_duplicate_acceptance() {
        assert!(run("a*b", "b", false, false).is_some());
        assert!(run("a*b", "aaab", false, false).is_some());
        assert!(run("a*b", "c", false, false).is_none());
    }

    #[test]
    fn multiline_caret_matches_after_embedded_newline() {
        assert!(run("^log", "info: ok\nlog: trouble", true, false).is_some());
        assert!(run("^log", "info: ok\nlog: trouble", false, false).is_none());
    }

    #[test]
    fn word_boundary_assertions() {
        assert!(run(r"\bcat\b", "a cat sat", false, false).is_some());
        assert!(run(r"\bcat\b", "concatenate", false, false).is_none());
    }

    #[test]
    fn ignore_case_option() {
        assert!(run("ABC", "xxabcxx", false, true).is_some());
        assert!(run("ABC", "xxabcxx", false, false).is_none());
    }
}
