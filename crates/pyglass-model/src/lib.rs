//! # Pyglass Model - API Object Tree
//!
//! Data model for statically extracted Python API surfaces.
//!
//! ## Overview
//!
//! This crate defines the object tree produced by the Pyglass analyzers:
//! modules, classes, functions, attributes, type aliases and aliases
//! (symbolic indirections created by imports and inheritance), plus the
//! expression model mirroring source-level annotations, decorators and
//! default values.
//!
//! ## Key Types
//!
//! - [`Object`] - a single API entity (identity + kind payload)
//! - [`ModuleCollection`] - the root container for loaded packages
//! - [`Expr`] - tagged expression tree with source-equivalent rendering
//! - [`JsonEncoder`] / [`decode_object`] - stable JSON (de)serialization

pub mod docstring;
pub mod error;
pub mod expr;
pub mod json;
pub mod object;

pub use docstring::{Docstring, DocstringParser, DocstringSection, DocstringStyle};
pub use error::{AliasError, DecodeError};
pub use expr::{Expr, Parameter, ParameterKind, Parameters, TypeParameter, TypeParameterKind};
pub use json::{decode_object, JsonEncoder};
pub use object::{
    AliasData, Analysis, AttributeData, ClassData, Decorator, ExportItem, FunctionData, Kind,
    LinesCollection, ModuleCollection, ModuleData, Object, ObjectKind, TypeAliasData,
};
