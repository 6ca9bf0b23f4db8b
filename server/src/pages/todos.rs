//! The todo list page and its htmx fragments.
//!
//! | Route | Effect | Output |
//! |---|---|---|
//! | `get` | none | full page |
//! | `post` | create from `newtodo` (plain form fallback) | full page |
//! | `hx-post` | create from `newtodo` | new item, count out-of-band |
//! | `hx-get-id` | none | one item |
//! | `hx-patch-id` | toggle `id` | updated item, count out-of-band |
//! | `hx-delete-id` | delete `id` | empty, count out-of-band |
//! | `hx-patch-all` | toggle every todo | all items, count out-of-band |
//! | `hx-get-count` | none | count footer |

use std::fmt::Write as _;

use todo_core::Todo;

use crate::templates::{Definition, RenderError, Scope, Source};

pub const SOURCE: Source = Source {
    name: "todos",
    definitions: &[
        Definition::new("List", list),
        Definition::new("Count", count),
        Definition::new("get", page),
        Definition::new("post", create_page),
        Definition::new("hx-post", create),
        Definition::new("hx-get-id", show),
        Definition::new("hx-patch-id", toggle),
        Definition::new("hx-delete-id", delete),
        Definition::new("hx-patch-all", toggle_all),
        Definition::new("hx-get-count", count),
    ],
};

fn page(s: &mut Scope<'_>) -> Result<(), RenderError> {
    s.include("Head")?;
    s.write(concat!(
        "<main>\n",
        "<h1>todos</h1>\n",
        "<form method=\"post\" action=\"/todos\" hx-post=\"/todos\" hx-target=\"#todo-list\" ",
        "hx-swap=\"beforeend\" hx-on::after-request=\"this.reset()\">\n",
        "<input name=\"newtodo\" placeholder=\"What needs to be done?\" autocomplete=\"off\" autofocus>\n",
        "</form>\n",
        "<button hx-patch=\"/todos?all\" hx-target=\"#todo-list\">toggle all</button>\n",
        "<ul id=\"todo-list\">\n",
    ));
    s.include("List")?;
    s.write("</ul>\n");
    s.include("Count")?;
    s.write("</main>\n");
    s.include("Foot")
}

/// Without htmx the browser posts the form and expects a page back. An empty
/// label just re-renders the list.
fn create_page(s: &mut Scope<'_>) -> Result<(), RenderError> {
    let label = s.form().get("newtodo").unwrap_or_default();
    match s.todos().create(label) {
        Ok(_) => {}
        Err(err) if err.is_validation() => {}
        Err(err) => return Err(err.into()),
    }
    s.include("get")
}

fn create(s: &mut Scope<'_>) -> Result<(), RenderError> {
    let label = s.form().get("newtodo").unwrap_or_default();
    let todo = s.todos().create(label)?;
    item(s, &todo)?;
    count_fragment(s, true)
}

fn show(s: &mut Scope<'_>) -> Result<(), RenderError> {
    let todo = s.todos().get(id(s))?;
    item(s, &todo)
}

fn toggle(s: &mut Scope<'_>) -> Result<(), RenderError> {
    let todo = s.todos().toggle(id(s))?;
    item(s, &todo)?;
    count_fragment(s, true)
}

fn delete(s: &mut Scope<'_>) -> Result<(), RenderError> {
    s.todos().delete(id(s))?;
    count_fragment(s, true)
}

fn toggle_all(s: &mut Scope<'_>) -> Result<(), RenderError> {
    s.todos().toggle_all()?;
    s.include("List")?;
    count_fragment(s, true)
}

fn list(s: &mut Scope<'_>) -> Result<(), RenderError> {
    for todo in s.todos().list()? {
        item(s, &todo)?;
    }
    Ok(())
}

fn count(s: &mut Scope<'_>) -> Result<(), RenderError> {
    count_fragment(s, false)
}

fn id<'a>(s: &Scope<'a>) -> &'a str {
    s.form().get("id").unwrap_or_default()
}

fn item(s: &mut Scope<'_>, todo: &Todo) -> Result<(), RenderError> {
    let id = todo.id;
    let (class, checked) = if todo.done {
        (" class=\"done\"", " checked")
    } else {
        ("", "")
    };
    writeln!(s, "<li id=\"todo-{id}\"{class}>")?;
    writeln!(
        s,
        "<input type=\"checkbox\" hx-patch=\"/todos?id={id}\" hx-target=\"#todo-{id}\" hx-swap=\"outerHTML\"{checked}>"
    )?;
    s.write("<span class=\"label\">");
    s.text(&todo.label);
    s.write("</span>\n");
    writeln!(
        s,
        "<button hx-delete=\"/todos?id={id}\" hx-target=\"#todo-{id}\" hx-swap=\"outerHTML\" aria-label=\"delete\">&times;</button>"
    )?;
    s.write("</li>\n");
    Ok(())
}

/// Footer with the number of open todos, read once so the count and the
/// "all done" state always agree. When `oob` is set htmx swaps it
/// into the page alongside whatever the request targeted.
fn count_fragment(s: &mut Scope<'_>, oob: bool) -> Result<(), RenderError> {
    let remaining = s.todos().count_incomplete()?;
    let all_done = remaining == 0;
    let swap = if oob { " hx-swap-oob=\"true\"" } else { "" };
    write!(s, "<footer id=\"todo-count\"{swap} hx-get=\"/todos?count\" hx-trigger=\"refresh\">")?;
    if all_done {
        s.write("all done!");
    } else {
        let plural = if remaining == 1 { "" } else { "s" };
        write!(s, "{remaining} item{plural} left")?;
    }
    s.write("</footer>\n");
    Ok(())
}
