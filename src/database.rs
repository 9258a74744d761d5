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

//! Loading constraint databases: for each configuration variable, a list of formula fragments

use anyhow::Context;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Represents a stream of bytes that can be read one or several times.
pub trait Input: Copy {
    /// type for to_read
    type R: Read;
    /// how displayed
    type D: std::fmt::Display;
    /// Returns a readable object that reads the data, can be called several times.
    fn to_read(&self) -> anyhow::Result<Self::R>;
    /// A debug string to print
    fn display(&self) -> Self::D;

    /// Reads the whole data as utf8.
    fn read_to_string(&self) -> anyhow::Result<String> {
        let mut res = String::new();
        self.to_read()?
            .read_to_string(&mut res)
            .with_context(|| format!("reading {}", self.display()))?;
        Ok(res)
    }
}

impl<'a> Input for &'a [u8] {
    type R = &'a [u8];
    type D = &'static str;

    fn to_read(&self) -> anyhow::Result<&'a [u8]> {
        Ok(*self)
    }

    fn display(&self) -> &'static str {
        "<in memory>"
    }
}

impl<'a> Input for &'a Path {
    type R = File;
    type D = std::path::Display<'a>;

    fn to_read(&self) -> anyhow::Result<File> {
        File::open(self)
            .with_context(|| format!("opening input file {} for reading", self.display()))
    }

    fn display(&self) -> Self::D {
        Path::display(self)
    }
}

/// How a database is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// A json object mapping each variable name to an array of fragments
    Json,
    /// A SMT-LIB2 script, stored as a single fragment
    Smt2,
    /// One fragment per non empty line
    Lines,
}

impl Layout {
    /// Guesses the layout from the file extension: `.json`, `.smt2`, or anything else for lines.
    pub fn of_path(path: &Path) -> Layout {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Layout::Json,
            Some("smt2") => Layout::Smt2,
            _ => Layout::Lines,
        }
    }
}

/// The formula fragments attached to one configuration variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// name of the configuration variable
    pub variable: String,
    /// fragments, in order
    pub fragments: Vec<String>,
}

/// An ordered list of entries. Order is preserved from the input to the output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstraintDatabase {
    /// entries, in input order
    pub entries: Vec<Entry>,
}

impl ConstraintDatabase {
    /// Parses a json object `{"VAR": ["fragment", ...], ...}`, keeping the order of keys.
    /// # Example
    /// ```
    /// use kclausefmt::database::ConstraintDatabase;
    /// let db = ConstraintDatabase::from_json(r#"{"B": ["b"], "A": ["a", "(not b)"]}"#).unwrap();
    /// assert_eq!(db.entries[0].variable, "B");
    /// assert_eq!(db.entries[1].fragments.len(), 2);
    /// ```
    pub fn from_json(text: &str) -> anyhow::Result<ConstraintDatabase> {
        let map: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(text).context("parsing constraint database as a json object")?;
        let mut entries = Vec::with_capacity(map.len());
        for (variable, value) in map {
            let fragments: Vec<String> = serde_json::from_value(value).with_context(|| {
                format!("fragments of {} must be an array of strings", &variable)
            })?;
            entries.push(Entry {
                variable,
                fragments,
            });
        }
        Ok(ConstraintDatabase { entries })
    }

    /// One entry named `name` with one fragment per non empty line of `text`.
    pub fn from_lines(name: &str, text: &str) -> ConstraintDatabase {
        let fragments = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_owned)
            .collect();
        ConstraintDatabase {
            entries: vec![Entry {
                variable: name.to_owned(),
                fragments,
            }],
        }
    }

    /// One entry named `name` with `text` as only fragment.
    pub fn from_script(name: &str, text: &str) -> ConstraintDatabase {
        ConstraintDatabase {
            entries: vec![Entry {
                variable: name.to_owned(),
                fragments: vec![text.to_owned()],
            }],
        }
    }

    /// Loads a database stored with the specified layout.
    pub fn load(input: impl Input, layout: Layout) -> anyhow::Result<ConstraintDatabase> {
        let text = input.read_to_string()?;
        let name = input.display().to_string();
        let db = match layout {
            Layout::Json => ConstraintDatabase::from_json(&text)
                .with_context(|| format!("loading constraint database {}", &name))?,
            Layout::Smt2 => ConstraintDatabase::from_script(&name, &text),
            Layout::Lines => ConstraintDatabase::from_lines(&name, &text),
        };
        debug!(
            input = %name,
            ?layout,
            entries = db.entries.len(),
            fragments = db.fragment_count(),
            "loaded constraint database"
        );
        Ok(db)
    }

    /// Total number of fragments
    pub fn fragment_count(&self) -> usize {
        self.entries.iter().map(|e| e.fragments.len()).sum()
    }
}
