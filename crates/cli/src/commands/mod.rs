//! Subcommand implementations.
//!
//! Every command prints its result to stdout and reports failures on
//! stderr through [`report_error`], exiting with status 1.

pub(crate) mod compile;
pub(crate) mod explain;
pub(crate) mod knockout;
pub(crate) mod navigate;
pub(crate) mod section;
pub(crate) mod validate;
pub(crate) mod walk;

use std::path::Path;
use std::process;

use serde::Serialize;

use screenflow_core::{DeclError, ItemBinding, ItemId, ScreenIndex};
use screenflow_eval::{MemoryFactGraph, NavError, NavigatorConfig};

use crate::{report_error, OutputFormat};

/// Settings shared by the query commands.
pub(crate) struct Context {
    pub config: NavigatorConfig,
    pub output: OutputFormat,
    pub quiet: bool,
}

/// Compile a flow file, or exit reporting the declaration error.
pub(crate) fn load_index(flow: &Path, output: OutputFormat, quiet: bool) -> ScreenIndex {
    match screenflow_core::compile_file(flow) {
        Ok(index) => index,
        Err(e) => exit_with_decl_error(&e, output, quiet),
    }
}

pub(crate) fn exit_with_decl_error(e: &DeclError, output: OutputFormat, quiet: bool) -> ! {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&e.to_json_value())
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", e));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error: {}", e);
            }
        }
    }
    process::exit(1);
}

/// Load a fact snapshot, or exit reporting why it could not be read.
pub(crate) fn load_facts(path: &Path, output: OutputFormat, quiet: bool) -> MemoryFactGraph {
    match screenflow_eval::load_snapshot(path) {
        Ok(facts) => facts,
        Err(e) => {
            let msg = format!("error: facts '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn exit_with_nav_error(e: &NavError, output: OutputFormat, quiet: bool) -> ! {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&e.to_json_value())
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", e));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error: {}", e);
            }
        }
    }
    process::exit(1);
}

pub(crate) fn binding(items: &[String]) -> ItemBinding {
    ItemBinding::from_items(items.iter().map(|i| ItemId::new(i.as_str())).collect())
}

pub(crate) fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!("serialization error: {}", e))
    );
}
