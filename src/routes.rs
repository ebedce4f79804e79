use crate::{
    api::{activity, calendar, calendar_approval, holidays, leave_request},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

/// Per-client limiter allowing `requests_per_min` with a burst of the same size.
pub fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_else(|| {
            tracing::warn!(requests_per_min, "Invalid rate limit, using governor defaults");
            GovernorConfig::default()
        });
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Everything sits behind the bearer token
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .configure(api_routes),
    );
}

pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(handlers::me)
        .service(
            web::scope("/leave")
                // /leave
                .service(
                    web::resource("")
                        .route(web::get().to(leave_request::leave_list))
                        .route(web::post().to(leave_request::create_leave)),
                )
                .service(web::resource("/mine").route(web::get().to(leave_request::my_leaves)))
                .service(
                    web::resource("/conflicts")
                        .route(web::get().to(leave_request::leave_conflicts)),
                )
                // /leave/{id}
                .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                .service(
                    web::resource("/{id}/approve")
                        .route(web::put().to(leave_request::approve_leave)),
                )
                .service(
                    web::resource("/{id}/reject")
                        .route(web::put().to(leave_request::reject_leave)),
                )
                .service(
                    web::resource("/{id}/cancel")
                        .route(web::put().to(leave_request::cancel_leave)),
                ),
        )
        .service(
            web::scope("/calendar")
                .service(
                    web::resource("/entry-types").route(web::get().to(calendar::entry_types)),
                )
                .service(web::resource("/month").route(web::get().to(calendar::month)))
                // /calendar/approvals
                .service(
                    web::resource("/approvals")
                        .route(web::get().to(calendar_approval::pending_entries)),
                )
                .service(
                    web::resource("/approvals/stream")
                        .route(web::get().to(calendar_approval::pending_stream)),
                )
                .service(
                    web::resource("/approvals/verify")
                        .route(web::get().to(calendar_approval::verify_pending)),
                )
                .service(
                    web::resource("/approvals/{entry_id}/approve")
                        .route(web::put().to(calendar_approval::approve_entry)),
                )
                .service(
                    web::resource("/approvals/{entry_id}/reject")
                        .route(web::put().to(calendar_approval::reject_entry)),
                )
                // /calendar/branches/{branch_id}
                .service(
                    web::resource("/branches/{branch_id}/entries")
                        .route(web::get().to(calendar::list_entries))
                        .route(web::post().to(calendar::create_entry)),
                )
                .service(
                    web::resource("/branches/{branch_id}/entries/{entry_id}")
                        .route(web::put().to(calendar::update_entry))
                        .route(web::delete().to(calendar::delete_entry)),
                )
                .service(
                    web::resource("/branches/{branch_id}/approved")
                        .route(web::get().to(calendar::approved_entries)),
                )
                .service(
                    web::resource("/branches/{branch_id}/upcoming")
                        .route(web::get().to(calendar::upcoming_entries)),
                ),
        )
        .service(
            web::scope("/holidays")
                .service(web::resource("/range").route(web::get().to(holidays::range_holidays)))
                .service(web::resource("/{year}").route(web::get().to(holidays::year_holidays))),
        )
        .service(web::resource("/activity").route(web::get().to(activity::list_activity)));
}
