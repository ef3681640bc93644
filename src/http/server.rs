//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all proxy handler
//! - Wire up request/response tracing when debug is on
//! - Forward requests to the upstream chosen by the director
//! - Hand upstream responses to the transformer before replying

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::request::{build_outbound_request, strip_hop_by_hop};
use crate::http::response::ResponseTransformer;
use crate::routing::{Director, UpstreamKind};

pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub director: Arc<Director>,
    pub transformer: Arc<ResponseTransformer>,
    pub client: UpstreamClient,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Resolve upstreams and build the router. Fails on malformed upstream URLs.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let director = Director::from_config(&config.upstreams)?;
        let transformer = ResponseTransformer::new(
            &config.rewrite,
            director.upstream(UpstreamKind::Cdn).authority(),
        );

        if !transformer.is_enabled() {
            tracing::warn!(
                "Custom host was not set, if it is not configured on Segment your requests won't go to the proxy"
            );
        }

        let state = AppState {
            director: Arc::new(director),
            transformer: Arc::new(transformer),
            client: Client::builder(TokioExecutor::new()).build(https_connector()),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state);

        if !config.debug {
            return router;
        }

        router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ProxyError> {
        let addr = listener.local_addr().map_err(ProxyError::Serve)?;
        tracing::info!(
            address = %addr,
            rewrite_enabled = self.config.rewrite.is_enabled(),
            debug = self.config.debug,
            "Serving proxy"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await
            .map_err(ProxyError::Serve)?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router without a listener, for driving requests directly.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

fn https_connector() -> HttpsConnector<HttpConnector> {
    HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build()
}

/// Main proxy handler.
/// Picks the upstream, forwards the request, and rewrites qualifying responses.
async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let target = state
        .director
        .direct(request.uri().path(), request.uri().query());

    tracing::debug!(
        method = %request.method(),
        path = %request.uri().path(),
        upstream = %target.kind,
        target = %target.path_and_query(),
        "Proxying request"
    );

    let restrict_encoding = state.transformer.is_enabled() && target.kind == UpstreamKind::Cdn;
    let outbound = build_outbound_request(request, &target, client_ip, restrict_encoding)?;

    let (mut parts, body) = state.client.request(outbound).await?.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    let response = Response::from_parts(parts, Body::new(body));

    Ok(state
        .transformer
        .maybe_transform(target.host_header(), response)
        .await?)
}
