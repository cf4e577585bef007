// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Argument parsing and the line-matching front end for `bgrep`.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use walkdir::WalkDir;

use crate::{Options, Regex};

/// A small grep built on the bundled backtracking regex engine.
#[derive(Parser, Debug)]
#[command(name = "bgrep", version, about)]
pub struct Cli {
    /// Pattern to search for.
    pub pattern: String,

    /// Files to search. Reads standard input when none are given.
    pub paths: Vec<PathBuf>,

    /// Treat PATTERN as extended syntax. This engine only has one dialect,
    /// so the flag exists for familiarity with other greps, but it must be
    /// given — its absence is a usage error.
    #[arg(short = 'E', long = "extended-regexp")]
    pub extended: bool,

    /// Recurse into directories.
    #[arg(short, long)]
    pub recursive: bool,

    /// Ignore case when matching.
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    /// `^`/`$` match at embedded newlines, not just the start/end of a
    /// line read from a file.
    #[arg(short = 'M', long)]
    pub multiline: bool,

    /// Only print the count of matching lines per file.
    #[arg(short = 'c', long)]
    pub count: bool,
}

impl Cli {
    fn options(&self) -> Options {
        Options { multiline: self.multiline, ignore_case: self.ignore_case }
    }
}

/// Runs the tool and returns the process exit code: `0` if some line
/// matched, `1` on a usage problem, a compile error, or simply no match,
/// `2` if a path couldn't be read.
pub fn run(cli: Cli) -> Result<i32> {
    if !cli.extended {
        eprintln!("bgrep: -E/--extended-regexp is required");
        return Ok(1);
    }
    if cli.recursive && cli.paths.is_empty() {
        eprintln!("bgrep: -r/--recursive requires at least one path");
        return Ok(1);
    }

    let re = match Regex::with_options(&cli.pattern, cli.options()) {
        Ok(re) => re,
        Err(err) => {
            eprintln!("bgrep: invalid pattern '{}': {}", cli.pattern, err);
            return Ok(1);
        }
    };
    log::debug!("compiled pattern {:?}", cli.pattern);

    if cli.paths.is_empty() {
        let stdin = io::stdin();
        let found = search_reader(&re, stdin.lock(), None, &cli)?;
        return Ok(if found { 0 } else { 1 });
    }

    let prefix_paths = cli.recursive || cli.paths.len() > 1;
    let mut found_any = false;
    let mut had_error = false;
    for path in &cli.paths {
        if cli.recursive && path.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() {
                    log::debug!("entering {}", entry.path().display());
                    match search_file(&re, entry.path(), true, &cli) {
                        Ok(found) => found_any |= found,
                        Err(err) => {
                            log::warn!("{}: {}", entry.path().display(), err);
                            had_error = true;
                        }
                    }
                }
            }
        } else {
            match search_file(&re, path, prefix_paths, &cli) {
                Ok(found) => found_any |= found,
                Err(err) => {
                    log::warn!("{}: {}", path.display(), err);
                    had_error = true;
                }
            }
        }
    }

    if had_error {
        Ok(2)
    } else if found_any {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn search_file(re: &Regex, path: &Path, prefix: bool, cli: &Cli) -> Result<bool> {
    let file = File::open(path).with_context(|| format!("{}: cannot open", path.display()))?;
    let label = if prefix { Some(path) } else { None };
    search_reader(re, BufReader::new(file), label, cli)
}

fn search_reader<R: BufRead>(
    re: &Regex,
    reader: R,
    path: Option<&Path>,
    cli: &Cli,
) -> Result<bool> {
    let mut found = false;
    let mut count = 0usize;
    for line in reader.lines() {
        let line = line.context("not valid text")?;
        if re.is_match(&line) {
            found = true;
            count += 1;
            if !cli.count {
                print_match(path, &line);
            }
        }
    }
    if cli.count {
        match path {
            Some(p) => println!("{}:{}", p.display(), count),
            None => println!("{}", count),
        }
    }
    Ok(found)
}

fn print_match(path: Option<&Path>, line: &str) {
    match path {
        Some(p) => println!("{}:{}", p.display(), line),
        None => println!("{}", line),
    }
}
