//! Per-call evaluation context
//!
//! An [`EvalContext`] is created for every top-level evaluation and threaded
//! by `&mut` through each recursive step. It owns the trace toggle, the
//! recursion depth used for trace indentation and the depth guard, and the
//! key path reported in errors. Nothing here is process-global, so
//! independent trees can be evaluated concurrently.

use std::fmt;

use crate::config::EvalOptions;
use crate::error::{Error, Result};

/// One step in a key path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

impl PathSegment {
    /// Key segment from anything string-like
    pub fn key(key: impl Into<String>) -> Self {
        PathSegment::Key(key.into())
    }
}

/// Location of a node inside the document, rendered like `servers[2].tags`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath(Vec<PathSegment>);

impl KeyPath {
    /// The document root
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Append a segment
    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    /// Drop the last segment
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// Segments from the root down
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Whether this is the root path
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// State for one evaluation call
#[derive(Debug)]
pub struct EvalContext {
    trace: bool,
    max_depth: usize,
    depth: usize,
    path: KeyPath,
}

impl EvalContext {
    /// Fresh context at the document root
    pub fn new(options: &EvalOptions) -> Self {
        Self {
            trace: options.trace,
            max_depth: options.max_depth,
            depth: 0,
            path: KeyPath::root(),
        }
    }

    /// Current recursion depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Current key path
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// Current key path, rendered for error messages
    pub fn path_string(&self) -> String {
        self.path.to_string()
    }

    /// Whether trace events are emitted
    pub fn trace_enabled(&self) -> bool {
        self.trace
    }

    /// Run `f` one level deeper, with `segment` appended to the key path.
    ///
    /// Fails with [`Error::NestingTooDeep`] once `max_depth` is reached.
    pub fn descend<T>(
        &mut self,
        segment: PathSegment,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.depth >= self.max_depth {
            return Err(Error::NestingTooDeep {
                path: self.path_string(),
                max_depth: self.max_depth,
            });
        }
        self.depth += 1;
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        self.depth -= 1;
        result
    }

    /// Emit a trace event, indented by the current depth
    pub fn trace(&self, args: fmt::Arguments<'_>) {
        if self.trace {
            tracing::debug!(
                target: "logix::trace",
                depth = self.depth,
                path = %self.path,
                "{:indent$}{}",
                "",
                args,
                indent = self.depth
            );
        }
    }
}
