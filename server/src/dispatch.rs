//! Request → route identifier → template definition.
//!
//! # Design
//! A [`Dispatcher`] owns one page: its immutable [`TemplateSet`] and the
//! [`Ops`] handle the definitions call into. It is built once and shared as
//! `Arc<Dispatcher>` by every request on that page.
//!
//! Per request:
//! 1. classify the request ([`crate::route::classify`]);
//! 2. no definition with that exact name ⇒ `404`, empty body;
//! 3. otherwise parse form fields (a parse failure is logged and an empty
//!    form is used) and run the definition on a blocking thread, since
//!    storage calls block.
//!
//! A definition that fails part way keeps what it already wrote. That
//! output is sent with `200 OK` and the failure only shows up in the log.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::{error, info, warn};

use crate::form::{parse_form, FormData};
use crate::route::classify;
use crate::templates::{Ops, RenderError, Source, TemplateError, TemplateSet};

/// Output of one definition run.
#[derive(Debug)]
pub struct Rendered {
    pub body: String,
    /// Set when the definition stopped early; `body` holds the output up to
    /// that point.
    pub error: Option<RenderError>,
}

pub struct Dispatcher {
    page: &'static str,
    templates: TemplateSet,
    ops: Ops,
}

impl Dispatcher {
    pub fn new(page: &'static str, templates: TemplateSet, ops: Ops) -> Self {
        Self {
            page,
            templates,
            ops,
        }
    }

    /// Parse `sources` and build a dispatcher over them.
    pub fn from_sources(
        page: &'static str,
        sources: &[Source],
        ops: Ops,
    ) -> Result<Self, TemplateError> {
        let templates = TemplateSet::parse(sources)?;
        Ok(Self::new(page, templates, ops))
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Run the definition named `route`, or `None` when there is none.
    pub fn render(&self, route: &str, form: &FormData) -> Option<Rendered> {
        if !self.templates.contains(route) {
            return None;
        }
        let mut body = String::new();
        let error = self
            .templates
            .execute(route, &mut body, form, &self.ops)
            .err();
        Some(Rendered { body, error })
    }

    pub async fn handle(self: Arc<Self>, request: Request) -> Response {
        let route = classify(&request);
        info!(
            page = self.page,
            path = %request.uri().path(),
            route = %route,
            "handling route"
        );

        if !self.templates.contains(&route) {
            return StatusCode::NOT_FOUND.into_response();
        }

        let form = match parse_form(request).await {
            Ok(form) => form,
            Err(err) => {
                warn!(route = %route, error = %err, "failed to parse form");
                FormData::new()
            }
        };

        let dispatcher = Arc::clone(&self);
        let task_route = route.clone();
        let rendered =
            tokio::task::spawn_blocking(move || dispatcher.render(&task_route, &form)).await;

        match rendered {
            Ok(Some(Rendered { body, error })) => {
                if let Some(err) = error {
                    error!(route = %route, error = %err, "template execution failed");
                }
                Html(body).into_response()
            }
            Ok(None) => StatusCode::NOT_FOUND.into_response(),
            Err(err) => {
                error!(route = %route, error = %err, "render task failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
