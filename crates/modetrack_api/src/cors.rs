use actix_cors::Cors;
use actix_web::http::header;

/// Lets the listed browser origins (status dashboards) call the service.
pub fn build_cors(origins: &[String]) -> Cors {
	origins
		.iter()
		.fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
		.allowed_methods(vec!["GET", "POST", "PUT"])
		.allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
		.max_age(3600)
}
