use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use essentials::{error, info, warn};
use http::{header, HeaderValue, StatusCode};
use tokio::{io::BufReader, net::TcpStream};

use super::App;
use crate::http::{server::ConnectionHandler, ReadRequest, Response, WriteResponse};

/// Serves one request per connection through the [App].
pub struct AppHandler {
    app: Arc<App>,
}

impl AppHandler {
    pub fn new(app: App) -> Self {
        Self { app: Arc::new(app) }
    }
}

#[async_trait]
impl ConnectionHandler for AppHandler {
    async fn handle(&self, stream: TcpStream, peer: SocketAddr) {
        info!(ip = ?peer, "Connection received");
        let (rx, mut tx) = stream.into_split();
        let mut rx = BufReader::new(rx);
        let response = match rx.read_request().await {
            Ok(request) => {
                let app = self.app.clone();
                match tokio::task::spawn_blocking(move || app.handle(&request)).await {
                    Ok(response) => response,
                    Err(err) => {
                        error!(ip = ?peer, "Request handler failed: {}", err);
                        Response::error()
                    }
                }
            }
            Err(err) => {
                warn!(ip = ?peer, "Failed to read request: {}", err);
                Response::text("Bad Request").with_status(StatusCode::BAD_REQUEST)
            }
        };
        let response = response.with_header(header::CONNECTION, HeaderValue::from_static("close"));
        if let Err(err) = tx.write_response(&response).await {
            warn!(ip = ?peer, "Failed to write response: {}", err);
        }
        info!(ip = ?peer, "Connection closed");
    }
}
