use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tenforty - tax-return data model and Form 1040 PDF filler
#[derive(Parser, Debug)]
#[command(name = "tenforty")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a saved return and list everything wrong with it
    Validate {
        /// Path to a saved return document (JSON)
        file: PathBuf,
    },

    /// Print the PDF field table a return maps to (template inspection aid)
    Fields {
        /// Path to a saved return document (JSON)
        file: PathBuf,

        /// Tax year for the standard-deduction tables
        #[arg(long)]
        tax_year: Option<u16>,
    },

    /// Fill the Form 1040 template from a saved return
    Export {
        /// Path to a saved return document (JSON)
        file: PathBuf,

        /// Path to the fillable 1040 template PDF
        #[arg(short, long)]
        template: PathBuf,

        /// Where to write the filled PDF (overwrites)
        #[arg(short, long)]
        output: PathBuf,

        /// Tax year for the standard-deduction tables
        #[arg(long)]
        tax_year: Option<u16>,

        /// Export even when validation reports findings
        #[arg(long)]
        force: bool,
    },
}
