use std::sync::Arc;

use crate::{
    api::{SeoController, SettingController, TodoController},
    auth,
    config::Config,
    cors,
    frontend::FrontendController,
    logging,
    routing::{action, MiddlewareRegistry, RouterBuilder},
};

pub const CORS: &str = "cors";
pub const LOGGING: &str = "logging";
pub const AUTH: &str = "auth";

pub struct Controllers {
    pub todos: Arc<TodoController>,
    pub settings: Arc<SettingController>,
    pub seo: Arc<SeoController>,
    pub frontend: Arc<FrontendController>,
}

pub fn middleware(config: &Config) -> MiddlewareRegistry {
    MiddlewareRegistry::new()
        .register(CORS, cors::Middleware::new(Arc::new(config.cors.clone())))
        .register(LOGGING, logging::Middleware::new())
        .register(AUTH, auth::Middleware::new(Arc::new(config.auth.clone())))
}

/// `/api/v1` endpoints. Settings and SEO entries additionally require the API key.
pub fn api(router: RouterBuilder, controllers: &Controllers) -> RouterBuilder {
    router.group("/api", &[CORS, LOGGING], |api| {
        api.group("/v1", &[], |v1| {
            v1.get("/todos", action(&controllers.todos, TodoController::index))
                .post("/todos", action(&controllers.todos, TodoController::store))
                .get("/todos/{id}", action(&controllers.todos, TodoController::show))
                .put("/todos/{id}", action(&controllers.todos, TodoController::update))
                .delete("/todos/{id}", action(&controllers.todos, TodoController::destroy))
                .group("", &[AUTH], |secured| {
                    secured
                        .get("/seo", action(&controllers.seo, SeoController::index))
                        .post("/seo", action(&controllers.seo, SeoController::upsert))
                        .get(
                            "/settings/seo-toggle",
                            action(&controllers.settings, SettingController::get_seo_toggle),
                        )
                        .post(
                            "/settings/seo-toggle",
                            action(&controllers.settings, SettingController::update_seo_toggle),
                        )
                })
        })
    })
}

pub fn web(router: RouterBuilder, controllers: &Controllers) -> RouterBuilder {
    router.fallback(action(&controllers.frontend, FrontendController::fallback))
}
