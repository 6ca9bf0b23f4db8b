//! Landing page with a persistent visit counter.

use std::fmt::Write as _;

use crate::templates::{Definition, RenderError, Scope, Source};

pub const SOURCE: Source = Source {
    name: "index",
    definitions: &[
        Definition::new("get", page),
        Definition::new("hx-get", current),
        Definition::new("hx-post", bump),
    ],
};

/// Full page load; counts as a visit.
fn page(s: &mut Scope<'_>) -> Result<(), RenderError> {
    s.include("Head")?;
    let visits = s.counter().increment()?;
    s.write("<main>\n<h1>Hello</h1>\n");
    visits_fragment(s, visits)?;
    s.write(concat!(
        "<button hx-post=\"/\" hx-target=\"#visits\" hx-swap=\"outerHTML\">+1</button>\n",
        "<button hx-get=\"/\" hx-target=\"#visits\" hx-swap=\"outerHTML\">refresh</button>\n",
        "</main>\n",
    ));
    s.include("Foot")
}

fn current(s: &mut Scope<'_>) -> Result<(), RenderError> {
    let visits = s.counter().read()?;
    visits_fragment(s, visits)
}

fn bump(s: &mut Scope<'_>) -> Result<(), RenderError> {
    let visits = s.counter().increment()?;
    visits_fragment(s, visits)
}

fn visits_fragment(s: &mut Scope<'_>, visits: u64) -> Result<(), RenderError> {
    let plural = if visits == 1 { "" } else { "s" };
    writeln!(s, "<p id=\"visits\">{visits} visit{plural}</p>")?;
    Ok(())
}
