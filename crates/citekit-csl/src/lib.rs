//! CSL (Citation Style Language) semantics layer for citekit.
//!
//! This crate defines the compiled form of a CSL 1.0.1 style together with
//! the locale data model the renderer consumes. It contains no XML parser:
//! styles and locale bundles are produced by an external compiler (or
//! constructed directly, or deserialized from JSON) and handed to
//! `citekit-proc` for rendering.
//!
//! # Overview
//!
//! The main types are:
//! - [`Style`]: a complete compiled style, with citation and bibliography
//!   layouts, macros, and style-level options
//! - [`Element`]: a rendering element (text, names, date, number, label,
//!   group, choose)
//! - [`Formatting`]: the formatting attributes attached to an element,
//!   with the inheritance rules for font attributes
//! - [`NameOptions`]: inheritable name-formatting settings with the CSL
//!   inheritance model (more specific levels override general levels)
//! - [`Locale`]: locale data (terms, date formats, locale options)
//!
//! All types are plain data with serde derives, so a compiled style can be
//! serialized and reloaded without going through CSL XML again.

pub mod types;

pub use types::*;
