//! Logix Core Library
//!
//! This crate evaluates logic embedded in configuration trees:
//! - Boolean operators (`and`, `or`, `xor`, `not`)
//! - `if` / `elif` / `else` chains inside lists
//! - Promotion keys (`<<`, `<<|`, `<<-`) that splice content into the
//!   enclosing mapping
//! - The deep-merge engine behind promotion, also usable on its own
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Node     │────▶│  Evaluator  │────▶│    Node     │
//! │   (YAML)    │     │ logic/cond/ │     │  (resolved) │
//! └─────────────┘     │   promote   │     └─────────────┘
//!                     └──────┬──────┘
//!                            ▼
//!                     ┌─────────────┐
//!                     │ Deep merge  │
//!                     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use logix_core::{EvalOptions, evaluate_yaml_str};
//!
//! let text = "packages:\n  - base\n  - if: [true, docker]\n  - else: [podman]\n";
//! let result = evaluate_yaml_str(text, &EvalOptions::default())?;
//! assert_eq!(result.to_string(), r#"{packages: ["base", "docker"]}"#);
//! # Ok::<(), logix_core::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod conditional;
pub mod config;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod keys;
pub mod logic;
pub mod merge;
pub mod node;
mod promote;

pub use config::{EvalOptions, LogixConfig};
pub use context::{EvalContext, KeyPath, PathSegment};
pub use error::{Error, ErrorKind, Result};
pub use evaluator::{evaluate, evaluate_with, evaluate_yaml_str};
pub use merge::{FULL_DEPTH, MergeOptions, MergeRequest, dedup, deep_merge, flatten};
pub use node::{Mapping, Node, Scalar, Shape};
