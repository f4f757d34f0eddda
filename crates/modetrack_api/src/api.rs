use actix_web::{Error, HttpResponse, Responder, web};
use modetrack::{FilterMethod, parse_samples};

use crate::models::{BackgroundResponse, Bounds, BoundsCheckQuery, BoundsCheckResponse, FrequencyResponse};
use crate::state::AppState;

#[derive(Debug)]
struct BoundsError {
	message: String,
}

impl BoundsError {
	fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}

impl std::fmt::Display for BoundsError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.message)
	}
}

pub fn configure(cfg: &mut web::ServiceConfig) {
	cfg.route("/background", web::post().to(set_background))
		.route("/peaks/gauss/{mode}", web::post().to(peak_gauss))
		.route("/peaks/bilateral/{mode}", web::post().to(peak_bilateral))
		.route("/maximum", web::post().to(max_peak))
		.route("/bounds", web::put().to(set_bounds))
		.route("/bounds/check", web::get().to(check_bounds))
		.route("/status", web::get().to(get_status));
}

pub async fn set_background(state: web::Data<AppState>, body: String) -> Result<impl Responder, Error> {
	let samples = web::block(move || parse_samples(&body))
		.await
		.map_err(|err| actix_web::error::ErrorInternalServerError(err.to_string()))?;

	state.replace_background(&samples).await;

	Ok(HttpResponse::Ok().json(BackgroundResponse { samples: samples.len() }))
}

pub async fn peak_gauss(
	state: web::Data<AppState>,
	mode: web::Path<usize>,
	body: String,
) -> Result<impl Responder, Error> {
	track_peak(&state, mode.into_inner(), body, FilterMethod::Gauss).await
}

pub async fn peak_bilateral(
	state: web::Data<AppState>,
	mode: web::Path<usize>,
	body: String,
) -> Result<impl Responder, Error> {
	track_peak(&state, mode.into_inner(), body, FilterMethod::Bilateral).await
}

async fn track_peak(state: &AppState, mode: usize, body: String, method: FilterMethod) -> Result<HttpResponse, Error> {
	let tracker = state.snapshot().await;

	let frequency = web::block(move || match method {
		FilterMethod::Gauss => tracker.peak_gauss(&body, mode),
		FilterMethod::Bilateral => tracker.peak_bilateral(&body, mode),
	})
	.await
	.map_err(|err| actix_web::error::ErrorInternalServerError(err.to_string()))?;

	Ok(HttpResponse::Ok().json(FrequencyResponse { frequency }))
}

pub async fn max_peak(state: web::Data<AppState>, body: String) -> Result<impl Responder, Error> {
	let tracker = state.snapshot().await;

	let frequency = web::block(move || tracker.max_peak(&body))
		.await
		.map_err(|err| actix_web::error::ErrorInternalServerError(err.to_string()))?;

	Ok(HttpResponse::Ok().json(FrequencyResponse { frequency }))
}

pub async fn set_bounds(state: web::Data<AppState>, payload: web::Json<Bounds>) -> Result<impl Responder, Error> {
	let bounds = payload.into_inner();
	validate_bounds(bounds).map_err(|err| actix_web::error::ErrorBadRequest(err.to_string()))?;

	let updated = state.set_bounds(bounds).await;

	Ok(HttpResponse::Ok().json(updated))
}

pub async fn check_bounds(
	state: web::Data<AppState>,
	query: web::Query<BoundsCheckQuery>,
) -> Result<impl Responder, Error> {
	let within = state.snapshot().await.within_bounds(query.frequency);

	Ok(HttpResponse::Ok().json(BoundsCheckResponse { frequency: query.frequency, within }))
}

pub async fn get_status(state: web::Data<AppState>) -> Result<impl Responder, Error> {
	Ok(HttpResponse::Ok().json(state.status().await))
}

fn validate_bounds(bounds: Bounds) -> Result<(), BoundsError> {
	if !bounds.lower.is_finite() || !bounds.upper.is_finite() {
		return Err(BoundsError::new("Bounds must be finite numbers"));
	}

	if bounds.lower < 0.0 || bounds.upper < 0.0 {
		return Err(BoundsError::new("Bounds must be non-negative; use 0.0 to leave a bound unset"));
	}

	if bounds.lower > 0.0 && bounds.upper > 0.0 && bounds.lower >= bounds.upper {
		return Err(BoundsError::new(format!("Lower bound {} must be below upper bound {}", bounds.lower, bounds.upper)));
	}

	Ok(())
}
