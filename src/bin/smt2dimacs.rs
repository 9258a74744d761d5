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

use anyhow::Context;
use kclausefmt::database::{ConstraintDatabase, Layout};
use kclausefmt::{cnf, engine, translate};
use std::io::Write;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "smt2dimacs",
    about = "Converts the assertions of an smt2 script to a CNF formula in dimacs format"
)]
struct Opt {
    /// Input file
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Output file
    #[structopt(parse(from_os_str))]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let opts = Opt::from_args();
    let db = ConstraintDatabase::load(opts.input.as_path(), Layout::Smt2)?;
    let translation = translate::translate(&engine::Smt2, &db, true).context("converting")?;
    let (formula, symbol_table) = cnf::to_cnf(translation.exprs());
    let out = std::fs::File::create(&opts.output).context("failed to open output for writing")?;
    let mut out = std::io::BufWriter::new(out);
    cnf::write(&mut out, &formula, &symbol_table).context("writing output")?;
    out.flush().context("writing output")?;
    Ok(())
}
