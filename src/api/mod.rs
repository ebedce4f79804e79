pub mod activity;
pub mod calendar;
pub mod calendar_approval;
pub mod holidays;
pub mod leave_request;

#[cfg(test)]
pub mod testing {
    use actix_web::dev::ServiceResponse;
    use actix_web::middleware::from_fn;
    use actix_web::test::{self, TestRequest};
    use actix_web::web::{self, Data};
    use actix_web::App;

    use crate::auth::jwt::testing::{TEST_SECRET, token_for};
    use crate::auth::middleware::auth_middleware;
    use crate::config::Config;
    use crate::model::role::Role;
    use crate::routes;
    use crate::state::AppState;

    pub fn test_config() -> Config {
        Config::from_lookup(|name| match name {
            "SERVER_ADDR" => Some("127.0.0.1:0".into()),
            "DATABASE_URL" => Some("mysql://salon@localhost/salon_test".into()),
            "JWT_SECRET" => Some(TEST_SECRET.into()),
            _ => None,
        })
        .unwrap()
    }

    pub fn bearer(id: &str, role: Role, branch_id: Option<&str>) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", token_for(id, role, branch_id)))
    }

    /// Runs one request through the authenticated API scope.
    pub async fn call(state: &AppState, req: TestRequest) -> ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(test_config()))
                .app_data(Data::new(state.clone()))
                .service(
                    web::scope("/api")
                        .wrap(from_fn(auth_middleware))
                        .configure(routes::api_routes),
                ),
        )
        .await;
        test::call_service(&app, req.to_request()).await
    }
}
