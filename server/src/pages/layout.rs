//! Shared page shell. Both fragments are private (uppercase names).

use crate::templates::{Definition, RenderError, Scope, Source};

pub const SOURCE: Source = Source {
    name: "layout",
    definitions: &[Definition::new("Head", head), Definition::new("Foot", foot)],
};

fn head(s: &mut Scope<'_>) -> Result<(), RenderError> {
    s.write(concat!(
        "<!DOCTYPE html>\n",
        "<html lang=\"en\">\n",
        "<head>\n",
        "<meta charset=\"utf-8\">\n",
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
        "<title>todos</title>\n",
        "<link rel=\"stylesheet\" href=\"/static/style.css\">\n",
        "<script src=\"https://unpkg.com/htmx.org@2.0.4\"></script>\n",
        "</head>\n",
        "<body>\n",
        "<nav><a href=\"/\">home</a> <a href=\"/todos\">todos</a></nav>\n",
    ));
    Ok(())
}

fn foot(s: &mut Scope<'_>) -> Result<(), RenderError> {
    s.write("</body>\n</html>\n");
    Ok(())
}
