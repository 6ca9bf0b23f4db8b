//! Named template definitions and their execution context.
//!
//! # Design
//! A template is a plain function that writes markup into a [`Scope`]. The
//! scope gives it three things and nothing else: the submitted form fields,
//! the fixed set of storage operations in [`Ops`], and the other definitions
//! of the same [`TemplateSet`] through [`Scope::include`].
//!
//! Definitions are grouped into [`Source`]s, the unit a page is assembled
//! from (a shared layout plus the page itself). [`TemplateSet::parse`] folds
//! an ordered list of sources into one immutable map, once, at startup.
//! A later source may redefine a name from an earlier one; the later
//! definition wins.
//!
//! Route identifiers are always lowercase, so a definition whose name
//! contains an uppercase letter can only be reached through `include`.
//! Layout fragments use that to stay private.

use std::collections::{HashMap, HashSet};
use std::fmt;

use thiserror::Error;
use todo_core::{Counter, Store, StoreError, TodoError, Todos};

use crate::form::FormData;

/// Maximum nesting of [`Scope::include`] calls.
pub const MAX_DEPTH: usize = 64;

/// Body of a template definition.
pub type Render = fn(&mut Scope<'_>) -> Result<(), RenderError>;

/// One named template.
#[derive(Clone, Copy)]
pub struct Definition {
    pub name: &'static str,
    pub render: Render,
}

impl Definition {
    pub const fn new(name: &'static str, render: Render) -> Self {
        Self { name, render }
    }
}

/// An ordered group of definitions, loaded together.
#[derive(Clone, Copy)]
pub struct Source {
    pub name: &'static str,
    pub definitions: &'static [Definition],
}

/// Problems found while assembling a [`TemplateSet`].
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("no template sources given")]
    NoSources,

    #[error("{file}: definition with an empty name")]
    EmptyName { file: &'static str },

    #[error("{file}: invalid definition name {name:?}")]
    InvalidName {
        file: &'static str,
        name: &'static str,
    },

    #[error("{file}: {name:?} is defined more than once")]
    Duplicate {
        file: &'static str,
        name: &'static str,
    },
}

/// Failures while executing a definition. Output written before the
/// failure is kept.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Todo(#[from] TodoError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no template named {0:?}")]
    Undefined(String),

    #[error("exceeded maximum include depth of {0}")]
    DepthExceeded(usize),

    #[error("formatting failed")]
    Format(#[from] fmt::Error),
}

/// The storage operations every template may call.
#[derive(Clone)]
pub struct Ops {
    pub todos: Todos,
    pub counter: Counter,
}

impl Ops {
    pub fn new(store: Store) -> Self {
        Self {
            todos: Todos::new(store.clone()),
            counter: Counter::new(store),
        }
    }
}

/// Immutable name → definition map.
pub struct TemplateSet {
    definitions: HashMap<&'static str, Render>,
}

impl TemplateSet {
    pub fn parse(sources: &[Source]) -> Result<Self, TemplateError> {
        if sources.is_empty() {
            return Err(TemplateError::NoSources);
        }

        let mut definitions = HashMap::new();
        for source in sources {
            let mut seen = HashSet::new();
            for definition in source.definitions {
                validate_name(source.name, definition.name)?;
                if !seen.insert(definition.name) {
                    return Err(TemplateError::Duplicate {
                        file: source.name,
                        name: definition.name,
                    });
                }
                definitions.insert(definition.name, definition.render);
            }
        }
        Ok(Self { definitions })
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<Render> {
        self.definitions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Run the definition `name`, appending its output to `out`.
    pub fn execute(
        &self,
        name: &str,
        out: &mut String,
        form: &FormData,
        ops: &Ops,
    ) -> Result<(), RenderError> {
        let mut scope = Scope {
            out,
            form,
            ops,
            set: self,
            depth: 0,
        };
        scope.include(name)
    }
}

fn validate_name(file: &'static str, name: &'static str) -> Result<(), TemplateError> {
    if name.is_empty() {
        return Err(TemplateError::EmptyName { file });
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(TemplateError::InvalidName { file, name });
    }
    Ok(())
}

/// Execution context handed to a [`Render`] function.
pub struct Scope<'a> {
    out: &'a mut String,
    form: &'a FormData,
    ops: &'a Ops,
    set: &'a TemplateSet,
    depth: usize,
}

impl<'a> Scope<'a> {
    /// Append trusted markup.
    pub fn write(&mut self, markup: &str) {
        self.out.push_str(markup);
    }

    /// Append untrusted text, HTML-escaped.
    pub fn text(&mut self, text: &str) {
        escape_into(text, self.out);
    }

    /// Render another definition of the same set in place.
    pub fn include(&mut self, name: &str) -> Result<(), RenderError> {
        let render = self
            .set
            .lookup(name)
            .ok_or_else(|| RenderError::Undefined(name.to_string()))?;
        if self.depth >= MAX_DEPTH {
            return Err(RenderError::DepthExceeded(MAX_DEPTH));
        }
        self.depth += 1;
        let result = render(self);
        self.depth -= 1;
        result
    }

    pub fn form(&self) -> &'a FormData {
        self.form
    }

    pub fn todos(&self) -> &'a Todos {
        &self.ops.todos
    }

    pub fn counter(&self) -> &'a Counter {
        &self.ops.counter
    }
}

impl fmt::Write for Scope<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.push_str(s);
        Ok(())
    }
}

/// HTML-escape `text` for use in element content or a quoted attribute.
fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
