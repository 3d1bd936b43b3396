//! Calculator page
//!
//! `GET /` shows the form with defaults. `POST /` either resets the form or
//! predicts and explains the submitted subject.

use axum::{
    extract::{Form, State},
    response::Html,
    routing::get,
    Router,
};
use prism_model::plot::force_plot_svg;
use prism_model::{Attribution, ModelArtifact, Prediction, Predictor, Subject, TreeExplainer};
use tracing::debug;

use crate::error::{PageError, PageResult};
use crate::AppState;

pub mod form;
pub mod page;

use form::{FormAction, FormSubmission, FormValues};

/// Everything shown in the result section for one subject
#[derive(Debug, Clone)]
pub struct Outcome {
    pub prediction: Prediction,
    pub attribution: Attribution,
    /// Force plot as an inline `<svg>` element
    pub plot_svg: String,
}

/// Predict and explain one subject against the shared model.
///
/// Both steps are recomputed on every call; nothing is cached.
pub fn evaluate(model: &ModelArtifact, subject: &Subject) -> prism_model::Result<Outcome> {
    let prediction = Predictor::new(model).predict(subject)?;
    let attribution = TreeExplainer::new(model).explain(subject)?;
    let plot_svg = force_plot_svg(&attribution);

    Ok(Outcome {
        prediction,
        attribution,
        plot_svg,
    })
}

/// GET /
pub async fn index() -> Html<String> {
    Html(page::render(&FormValues::default(), None, None))
}

/// POST /
pub async fn submit(
    State(state): State<AppState>,
    Form(submission): Form<FormSubmission>,
) -> PageResult<Html<String>> {
    if submission.action() == FormAction::Reset {
        debug!("Form reset to defaults");
        return Ok(Html(page::render(&FormValues::default(), None, None)));
    }

    let values = submission.values();
    let subject = values.parse()?;
    let outcome = evaluate(&state.model, &subject).map_err(|source| PageError::Model {
        source,
        form: values.clone(),
    })?;
    debug!("Prediction rendered");

    Ok(Html(page::render(&values, Some(&outcome), None)))
}

/// Build page routes
pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(index).post(submit))
}
