//! Tenforty CLI
//!
//! Usage: tenforty <COMMAND>
//!
//! Commands:
//!   validate  Check a saved return and list findings
//!   fields    Print the PDF field table a return maps to
//!   export    Fill the Form 1040 template from a saved return

mod cli;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use cli::{Cli, Commands};
use tenforty::mapper::{FieldMapper, FieldValue};
use tenforty::{PdfExporter, TaxData, TaxYearTables};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file } => {
            let data = load_return(&file)?;
            let findings = data.validate();
            if findings.is_empty() {
                println!("ok: no findings");
                return Ok(ExitCode::SUCCESS);
            }
            for finding in &findings {
                println!("{finding}");
            }
            println!("{} finding(s)", findings.len());
            Ok(ExitCode::FAILURE)
        }

        Commands::Fields { file, tax_year } => {
            let data = load_return(&file)?;
            let tables = tables_for(tax_year)?;
            let table = FieldMapper::form_1040(&tables).map(&data)?;
            for (name, value) in &table {
                match value {
                    FieldValue::Text(text) => println!("{name} = {text}"),
                    FieldValue::Check(true) => println!("{name} = [x]"),
                    FieldValue::Check(false) => println!("{name} = [ ]"),
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Export {
            file,
            template,
            output,
            tax_year,
            force,
        } => {
            let data = load_return(&file)?;
            let findings = data.validate();
            if !findings.is_empty() && !force {
                for finding in &findings {
                    eprintln!("{finding}");
                }
                bail!(
                    "refusing to export with {} validation finding(s); use --force to override",
                    findings.len()
                );
            }

            let tables = tables_for(tax_year)?;
            let table = FieldMapper::form_1040(&tables).map(&data)?;
            PdfExporter::new(&template)
                .export(&table, &output)
                .with_context(|| format!("exporting to {}", output.display()))?;
            println!("wrote {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_return(file: &Path) -> Result<TaxData> {
    TaxData::load(file).with_context(|| format!("loading {}", file.display()))
}

fn tables_for(tax_year: Option<u16>) -> Result<TaxYearTables> {
    match tax_year {
        None | Some(2024) => Ok(TaxYearTables::year_2024()),
        Some(year) => bail!("no standard-deduction tables for tax year {year}"),
    }
}
