/**************************************************************************/
/*  This file is part of KCLAUSEFMT.                                      */
/*                                                                        */
/*  Copyright (C) 2025                                                    */
/*    CEA (Commissariat à l'énergie atomique et aux énergies              */
/*         alternatives)                                                  */
/*                                                                        */
/*  you can redistribute it and/or modify it under the terms of the GNU   */
/*  Lesser General Public License as published by the Free Software       */
/*  Foundation, version 2.1.                                              */
/*                                                                        */
/*  It is distributed in the hope that it will be useful,                 */
/*  but WITHOUT ANY WARRANTY; without even the implied warranty of        */
/*  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the         */
/*  GNU Lesser General Public License for more details.                   */
/*                                                                        */
/*  See the GNU Lesser General Public License version 2.1                 */
/*  for more details (enclosed in the file licenses/LGPLv2.1).            */
/*                                                                        */
/**************************************************************************/

#![warn(missing_docs)]

//! Translation of kclause constraint databases to kconfigreader, DIMACS and FeatureIDE formats

pub mod cnf;
pub mod database;
pub mod engine;
pub mod error;
pub mod expr;
pub mod featureide;
pub mod flatten;
pub mod kconfigreader;
pub mod lexer;
pub mod normalize;
pub mod sexp;
pub mod translate;

use anyhow::Context;
use database::{ConstraintDatabase, Layout};
use engine::Syntax;
use kconfigreader::KconfigReader;
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::DerefMut;
use std::path::PathBuf;
use structopt::clap::arg_enum;
use structopt::StructOpt;
use translate::Translation;

arg_enum! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum SyntaxName {
        Smt2,
        Pretty,
        Sexp,
        KconfigReader
    }
}

impl SyntaxName {
    fn syntax(self) -> Syntax {
        match self {
            SyntaxName::Smt2 => Syntax::Smt2,
            SyntaxName::Pretty => Syntax::Pretty,
            SyntaxName::Sexp => Syntax::Sexp,
            SyntaxName::KconfigReader => Syntax::KconfigReader,
        }
    }
}

arg_enum! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Format {
        KconfigReader,
        Dimacs,
        FeatureIDE
    }
}

#[derive(Debug)]
/// Writes the translation report in json to a file.
pub struct ResultWriter {
    file: RefCell<File>,
    path: PathBuf,
}

impl ResultWriter {
    fn write<R: serde::Serialize>(&self, result: &R) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(self.file.borrow_mut().deref_mut(), result)
            .with_context(|| format!("writing report to {}", self.path.display()))
    }
}

impl From<&std::ffi::OsStr> for ResultWriter {
    fn from(path: &std::ffi::OsStr) -> ResultWriter {
        let path: PathBuf = path.into();
        let file = match File::create(&path) {
            Ok(f) => RefCell::new(f),
            Err(e) => {
                tracing::error!(
                    "failed to open {} to write the report (--json option): {}",
                    path.display(),
                    e
                );
                std::process::exit(1);
            }
        };
        ResultWriter { path, file }
    }
}

/// Configuration options
#[derive(Debug, StructOpt)]
#[structopt(
    name = "kclausefmt",
    about = "Translates kclause constraints to kconfigreader, DIMACS or FeatureIDE formats"
)]
pub struct Opt {
    #[structopt(possible_values = &SyntaxName::variants(), case_insensitive = true, default_value="smt2", short, long)]
    /// Syntax of the formula fragments. Ignored for .smt2 input.
    syntax: SyntaxName,

    #[structopt(possible_values = &Format::variants(), case_insensitive = true, default_value="kconfigreader", short, long)]
    /// Output format
    format: Format,

    /// Input file: a .json constraint database mapping each variable to a list of fragments,
    /// a .smt2 script, or any other file with one fragment per line
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Output file, stdout by default
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Write the referenced configuration variables to this file, one per line
    #[structopt(long, parse(from_os_str))]
    features: Option<PathBuf>,

    /// JSON report to the specified file
    #[structopt(short, long, parse(from_os_str))]
    json: Option<ResultWriter>,

    /// Stop at the first formula which cannot be translated
    #[structopt(long)]
    fail_fast: bool,

    /// Enable debug output.
    #[structopt(short, long)]
    debug: bool,
}

/// Writes the translated formulas in the specified format.
fn emit<W: Write>(format: Format, translation: &Translation, mut out: W) -> anyhow::Result<()> {
    match format {
        Format::KconfigReader => {
            for e in translation.exprs() {
                writeln!(out, "{}", KconfigReader(e))?;
            }
        }
        Format::Dimacs => {
            let (formula, symbol_table) = cnf::to_cnf(translation.exprs());
            cnf::write(&mut out, &formula, &symbol_table).context("writing dimacs")?;
        }
        Format::FeatureIDE => {
            featureide::write(&mut out, translation.variables(), translation.exprs())
                .context("writing feature model")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn setup_tracing(opt: &Opt) -> anyhow::Result<()> {
    use tracing::Level;
    use tracing_subscriber::prelude::*;
    let min_level = if opt.debug { Level::TRACE } else { Level::INFO };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(tracing_subscriber::filter::filter_fn(move |metadata| {
            *metadata.level() <= min_level
        }));
    let subscriber = tracing_subscriber::Registry::default().with(fmt_layer);
    #[cfg(feature = "tracy")]
    let subscriber = subscriber.with(tracing_tracy::TracyLayer::new());
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default tracing collector")?;
    Ok(())
}

/// entrypoint of the binary
pub fn run() -> anyhow::Result<()> {
    let opt = Opt::from_args();
    setup_tracing(&opt)?;
    let layout = Layout::of_path(&opt.input);
    let syntax = if layout == Layout::Smt2 {
        if opt.syntax != SyntaxName::Smt2 {
            tracing::warn!("--syntax {} ignored for .smt2 input", opt.syntax);
        }
        Syntax::Smt2
    } else {
        opt.syntax.syntax()
    };
    let db = ConstraintDatabase::load(opt.input.as_path(), layout)?;
    let translation = translate::translate(&syntax, &db, opt.fail_fast)
        .with_context(|| format!("translating {}", opt.input.display()))?;
    let report = translation.report();
    tracing::info!(
        formulas = report.formulas,
        translated = report.translated,
        features = report.features,
        "translated {}",
        opt.input.display()
    );
    match &opt.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("opening {} for writing", path.display()))?;
            emit(opt.format, &translation, BufWriter::new(file))
                .with_context(|| format!("writing output to {}", path.display()))?;
        }
        None => {
            let stdout = std::io::stdout();
            emit(opt.format, &translation, BufWriter::new(stdout.lock()))
                .context("writing output to stdout")?;
        }
    }
    if let Some(path) = &opt.features {
        let mut file = BufWriter::new(
            File::create(path)
                .with_context(|| format!("opening {} for writing features", path.display()))?,
        );
        for feature in translation.variables() {
            writeln!(file, "{}", feature)?;
        }
        file.flush()
            .with_context(|| format!("writing features to {}", path.display()))?;
    }
    if let Some(writer) = &opt.json {
        writer.write(&report)?;
    }
    anyhow::ensure!(
        report.failures.is_empty(),
        "{} of {} formulas could not be translated",
        report.failures.len(),
        report.formulas
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn translation(lines: &str) -> Translation {
        let db = ConstraintDatabase::from_lines("test", lines);
        translate::translate(&Syntax::Sexp, &db, false).unwrap()
    }

    fn emitted(format: Format, t: &Translation) -> String {
        let mut out = Vec::new();
        emit(format, t, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn kconfigreader_lines() {
        let t = translation("(and a (or b c))\n(not a)\n(xor a b)\n");
        assert_eq!(
            emitted(Format::KconfigReader, &t),
            "(def(a)&(def(b)|def(c)))\n!def(a)\n"
        );
    }

    #[test]
    fn dimacs() {
        let t = translation("(and a (or b c))\n(not a)\n");
        let text = emitted(Format::Dimacs, &t);
        assert!(text.starts_with("c 1 a\nc 2 b\nc 3 c\n"), "{}", text);
        let formula = cnf::DimacsParser::parse(text.as_bytes()).unwrap();
        assert_eq!(formula.var_count(), 4);
    }

    #[test]
    fn featureide() {
        let t = translation("(or a b)\n");
        let text = emitted(Format::FeatureIDE, &t);
        assert!(text.contains("<feature name=\"b\"/>"));
        assert!(text.contains("<rule><disj><var>a</var><var>b</var></disj></rule>"));
    }

    #[test]
    fn cli_names() {
        assert_eq!("kconfigreader".parse::<SyntaxName>(), Ok(SyntaxName::KconfigReader));
        assert_eq!("featureide".parse::<Format>(), Ok(Format::FeatureIDE));
        assert_eq!(SyntaxName::Pretty.syntax(), Syntax::Pretty);
    }
}
