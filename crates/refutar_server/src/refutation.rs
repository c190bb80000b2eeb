use actix_web::{error, web, HttpResponse, Responder, Result};
use refutar::{
    parse::parse_problem,
    resolution::{self, FORefutation, Params, Proof, ResolutionStep},
    session, Calculus,
};
use serde::Serialize;

use crate::{MoveForm, ParseForm, StateForm};

#[derive(Serialize)]
struct ProveReport {
    #[serde(flatten)]
    proof: Proof,
    trace: Vec<ResolutionStep>,
}

fn params(params: Option<String>) -> Result<Option<Params>> {
    match params {
        Some(p) => Ok(Some(
            serde_json::from_str(&p).map_err(error::ErrorBadRequest)?,
        )),
        None => Ok(None),
    }
}

fn state(state: &str) -> Result<resolution::State> {
    serde_json::from_str(state).map_err(error::ErrorBadRequest)
}

pub(crate) async fn fo() -> impl Responder {
    HttpResponse::Ok().body(
        "Calculus fo-refutation loaded.
Interact via the /parse /move /close /validate and /prove endpoints"
            .to_string(),
    )
}

pub(crate) async fn parse(form: web::Form<ParseForm>) -> Result<HttpResponse> {
    session(|| {
        let ParseForm { formula, params: p } = form.0;
        let state =
            FORefutation::parse_formula(&formula, params(p)?).map_err(error::ErrorBadRequest)?;

        Ok(HttpResponse::Ok().json(state))
    })
}

pub(crate) async fn validate(form: web::Form<StateForm>) -> Result<HttpResponse> {
    session(|| {
        let state = state(&form.state)?;
        let res = FORefutation::validate(&state);

        Ok(HttpResponse::Ok().json(res))
    })
}

pub(crate) async fn r#move(form: web::Form<MoveForm>) -> Result<HttpResponse> {
    session(|| {
        let MoveForm { state: s, r#move } = form.0;

        let s = state(&s)?;
        let r#move: resolution::Move =
            serde_json::from_str(&r#move).map_err(error::ErrorBadRequest)?;

        let s = FORefutation::apply_move(s, r#move).map_err(error::ErrorBadRequest)?;

        Ok(HttpResponse::Ok().json(s))
    })
}

pub(crate) async fn close(form: web::Form<StateForm>) -> Result<HttpResponse> {
    session(|| {
        let state = state(&form.state)?;
        let res = FORefutation::check_close(&state);

        Ok(HttpResponse::Ok().json(res))
    })
}

/// Runs a whole refutation in one request.
pub(crate) async fn prove(form: web::Form<ParseForm>) -> Result<HttpResponse> {
    session(|| {
        let ParseForm { formula, params: p } = form.0;
        let params = params(p)?.unwrap_or_default();

        let problem = parse_problem(&formula)
            .map_err(resolution::Err::from)
            .map_err(error::ErrorBadRequest)?;
        let mut trace = Vec::new();
        let proof = resolution::prove(problem.base, problem.goal, &params, &mut trace)
            .map_err(error::ErrorBadRequest)?;

        Ok(HttpResponse::Ok().json(ProveReport { proof, trace }))
    })
}
