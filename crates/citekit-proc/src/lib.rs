//! Citation rendering engine for CSL (Citation Style Language) styles.
//!
//! This crate is the rendering core: given a compiled
//! [`Style`](citekit_csl::Style) from citekit-csl, a locale bundle, and
//! bibliographic items, it produces formatted citations and bibliography
//! entries as a tree of styled text runs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           citekit-proc                              │
//! │                      (rendering tree-walker)                        │
//! │        Items + Style + Locales → ComposedRun trees                  │
//! └───────────────────────────┬─────────────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           citekit-csl                               │
//! │                      (CSL semantics layer)                          │
//! │        Style, Element, Macro, Locale, Formatting, ...               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is a pure tree-walker: each top-level call builds its own
//! evaluation context, reads immutable item and locale data, and returns a
//! new [`ComposedRun`] tree. A separate serializer (not part of this
//! crate) turns run trees into HTML, RTF, or plain text.
//!
//! # Example
//!
//! ```rust,ignore
//! use citekit_proc::{Item, Processor};
//!
//! let processor = Processor::new(style);
//! let items: Vec<Item> = serde_json::from_str(csl_json)?;
//! let refs: Vec<&dyn citekit_proc::ItemData> =
//!     items.iter().map(|i| i as _).collect();
//!
//! let entries =
//!     processor.generate_bibliography(&refs, "en-US", false, &|a, b| a.cmp(b))?;
//! for entry in entries {
//!     println!("{}", entry.plain_text());
//! }
//! ```

pub mod error;
pub mod item;
pub mod locale;
pub mod number;
pub mod output;
pub mod sort;
pub mod types;

mod eval;

// Re-export main types
pub use error::{Error, Result};
pub use item::{
    DateValue, DateVar, Item, ItemData, NameOrLiteral, NumberSeparator, NumberValue, NumberVar,
    PersonName, Season, Value,
};
pub use locale::{LocaleProvider, LocaleRegistry, INVARIANT_LOCALE};
pub use output::{ComposedRun, Run, TextRun};
pub use sort::Comparator;
pub use types::{Entry, Processor};
