//! Library programs route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::programs::Program;
use crate::state::AppState;

/// Programs list template.
#[derive(Template, WebTemplate)]
#[template(path = "programs/index.html")]
pub struct ProgramsTemplate {
    pub programs: Vec<Program>,
}

/// Program detail template.
#[derive(Template, WebTemplate)]
#[template(path = "programs/show.html")]
pub struct ProgramTemplate {
    pub program: Program,
}

/// Display all programs.
///
/// A missing or malformed programs file renders an empty list.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> ProgramsTemplate {
    let programs = match state.programs().load().await {
        Ok(programs) => programs,
        Err(e) => {
            tracing::warn!(
                path = %state.programs().path().display(),
                error = %e,
                "Failed to load programs"
            );
            Vec::new()
        }
    };

    ProgramsTemplate { programs }
}

/// Display one program by slug.
///
/// # Errors
///
/// Returns 404 if no program has this slug, or 500 if the programs file
/// cannot be read.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ProgramTemplate> {
    let program = state
        .programs()
        .find(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("program {slug}")))?;

    Ok(ProgramTemplate { program })
}
