//! Query translation domain
//!
//! Turns free-text requests ("accounts in California", "open cases") into
//! SOQL. The translator is a fixed-order table of [`QueryRule`]s:
//!
//! ```text
//! input ──▶ already SOQL?  ──yes──▶ passthrough (1.0)
//!              │ no
//!              ▼
//!           rule 1..N     ──match─▶ template      (0.9)
//!              │ none
//!              ▼
//!           entity word?  ──yes──▶ basic listing (0.5, suggestion)
//!              │ no
//!              ▼
//!           error + example inputs
//! ```
//!
//! Interpolated text is always escaped through [`soql::quote_literal`].

pub mod entity;
pub mod result;
pub mod rule;
pub mod soql;
pub mod translator;

pub use entity::EntityType;
pub use result::TranslationResult;
pub use rule::{QueryRule, QueryTemplate};
pub use translator::QueryTranslator;
