//! screenflow-core: flow declarations and the flow compiler.
//!
//! Turns a declarative, hierarchical screen tree into a flat, document
//! ordered [`ScreenIndex`] that a navigator queries at runtime.
//!
//! # Public API
//!
//! - [`Path`], [`ConcretePath`], [`ItemId`], [`ItemBinding`] -- fact addressing
//! - [`Condition`], [`Operator`] -- the condition model
//! - [`FlowDeclaration`], [`FlowNode`] -- the declaration tree
//! - [`compile()`] -- run the pass pipeline
//! - [`ScreenIndex`] -- compiled output
//! - [`DeclError`], [`PathError`] -- error types

pub mod ast;
pub mod compile;
pub mod condition;
pub mod error;
pub mod index;
pub mod pass1_load;
pub mod pass2_index;
pub mod pass3_validate;
pub mod path;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{
    AssertionKind, AssertionNode, FlowDeclaration, FlowNode, GateNode, LoopNode, ScreenNode,
    SectionNode,
};
pub use condition::{Condition, OneOrMany, Operator};
pub use error::{DeclError, DeclSite, PathError};
pub use index::{
    AssertionEntry, ChainLink, LayoutNode, LoopScope, Scope, ScopeId, ScopeKind, ScreenEntry,
    ScreenId, ScreenIndex, Section, SectionId, SectionLevel,
};
pub use path::{ConcretePath, ItemBinding, ItemId, Path};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use compile::{compile, compile_file, compile_str};
pub use pass1_load::{load_file, load_str};
