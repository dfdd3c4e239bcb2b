use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use essentials::{debug, error};
use http::{header, StatusCode};
use serde_json::json;
use tokio::net::TcpListener;

use super::{
    handler::AppHandler,
    routes::{self, Controllers},
};
use crate::{
    api::{SeoController, SettingController, TodoController},
    config::{Config, Database},
    cors,
    frontend::FrontendController,
    http::{server::Server as HttpServer, Request, Response},
    routing::{allow_header, Dispatcher, RouterBuilder},
    store::{SqliteStore, Stores},
    Error, HttpError, RoutingError,
};

const UNEXPECTED: &str = "An unexpected error occurred.";

/// The request boundary: dispatches a request and turns every outcome into a response.
pub struct App {
    dispatcher: Dispatcher,
    config: Arc<Config>,
}

impl App {
    pub fn new(dispatcher: Dispatcher, config: Arc<Config>) -> Self {
        Self { dispatcher, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn handle(&self, request: &Request) -> Response {
        let response = match self.dispatcher.dispatch(request) {
            Ok(response) => response,
            Err(err) => self.render_error(request, err),
        };
        if request.is_api_request() {
            cors::apply(&self.config.cors, response)
        } else {
            response
        }
    }

    fn render_error(&self, request: &Request, err: Error) -> Response {
        match err {
            Error::Routing(err) => {
                let allowed = match &err {
                    RoutingError::MethodNotAllowed(methods) => allow_header(methods).ok(),
                    RoutingError::NotFound => None,
                };
                let response = render_http(request, &HttpError::from(err));
                match allowed {
                    Some(allowed) => response.with_header(header::ALLOW, allowed),
                    None => response,
                }
            }
            Error::Http(err) => render_http(request, &err),
            err => {
                error!("[TaskFlow Error] {} {}: {}", request.method(), request.path(), err);
                let message = if self.config.shows_error_details() {
                    err.to_string()
                } else {
                    UNEXPECTED.to_string()
                };
                let response = if request.is_api_request() {
                    Response::json(&json!({ "error": "Internal Server Error", "message": message }))
                        .unwrap_or_else(|_| Response::error())
                } else {
                    Response::text(message)
                };
                response.with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

fn render_http(request: &Request, err: &HttpError) -> Response {
    debug!(status = err.status().as_u16(), message = err.message(), "Rendering error");
    let response = if request.is_api_request() {
        Response::json(&err.body()).unwrap_or_else(|_| Response::error())
    } else {
        Response::text(err.message())
    };
    response.with_status(err.status())
}

/// A builder for the application server.
pub struct ServerBuilder {
    config: Config,
    stores: Stores,
}

impl ServerBuilder {
    fn new(config: Config) -> Self {
        Self {
            config,
            stores: Stores::in_memory(),
        }
    }

    /// Opens the database named by [Config::database] and uses it for every store.
    pub async fn connect(self) -> Result<Self> {
        let store = match &self.config.database {
            Database::Memory => None,
            Database::Sqlite(path) => Some(SqliteStore::connect(path).await?),
        };
        Ok(match store {
            Some(store) => self.with_stores(Stores::shared(Arc::new(store))),
            None => self,
        })
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn with_stores(mut self, stores: Stores) -> Self {
        self.stores = stores;
        self
    }

    /// Builds the request boundary without binding a socket.
    pub fn build_app(self) -> Result<App> {
        let Stores {
            todos,
            settings,
            seo,
        } = self.stores;
        let controllers = Controllers {
            todos: Arc::new(TodoController::new(todos)),
            settings: Arc::new(SettingController::new(settings.clone())),
            seo: Arc::new(SeoController::new(seo.clone())),
            frontend: Arc::new(FrontendController::new(
                self.config.dist_path.clone(),
                settings,
                seo,
            )),
        };
        let router = routes::web(routes::api(RouterBuilder::new(), &controllers), &controllers);
        let table = router.build().context("Failed to build routes")?;
        debug!(routes = table.routes().len(), "Routes registered");
        let dispatcher = Dispatcher::new(table, &routes::middleware(&self.config))
            .context("Failed to resolve route middleware")?;
        Ok(App::new(dispatcher, Arc::new(self.config)))
    }

    pub fn build(self) -> Result<Server> {
        let addr = SocketAddr::new(self.config.host, self.config.port);
        let app = self.build_app()?;
        Ok(Server {
            app: HttpServer::new(addr, AppHandler::new(app)),
        })
    }
}

pub struct Server {
    pub app: HttpServer<AppHandler>,
}

impl Server {
    pub fn addr(&self) -> SocketAddr {
        self.app.addr()
    }

    /// Start the server.
    pub async fn run(self) {
        debug!("Starting server");
        if let Err(err) = self.app.run().await {
            error!("App error: {:?}", err);
        }
        debug!("Server stopped");
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        self.app.serve(listener).await
    }
}

/// Create a new server builder backed by in-memory stores until [ServerBuilder::connect].
pub fn builder(config: Config) -> ServerBuilder {
    ServerBuilder::new(config)
}
