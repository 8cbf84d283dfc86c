//! Flow compiler: declaration tree -> Screen Index.
//!
//! A thin orchestrator over the passes. Compilation is pure: the same
//! declaration always yields the same index.

use std::path::Path;

use crate::ast::FlowDeclaration;
use crate::error::DeclError;
use crate::index::ScreenIndex;
use crate::pass1_load;
use crate::pass2_index;
use crate::pass3_validate;

/// Compile a declaration tree.
pub fn compile(decl: &FlowDeclaration) -> Result<ScreenIndex, DeclError> {
    // Pass 2: entries, scopes, sections, layout
    let index = pass2_index::build_index(decl)?;

    // Pass 3: wildcard depths and loop references
    pass3_validate::validate(&index)?;

    tracing::debug!(
        screens = index.len(),
        scopes = index.scopes().len(),
        sections = index.sections().len(),
        "compiled flow"
    );
    Ok(index)
}

/// Load (pass 1) and compile a declaration file.
pub fn compile_file(path: &Path) -> Result<ScreenIndex, DeclError> {
    let decl = pass1_load::load_file(path)?;
    compile(&decl)
}

/// Load (pass 1) and compile declaration JSON text.
pub fn compile_str(text: &str, source_name: &str) -> Result<ScreenIndex, DeclError> {
    let decl = pass1_load::load_str(text, source_name)?;
    compile(&decl)
}
