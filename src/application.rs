//! The orchestrator tying router, pipeline, settings and exception handlers
//! into the `(scope, receive, send)` surface a host server drives
//! (SPEC_FULL §4.5). Built once via [`ApplicationBuilder`]; nothing on
//! [`Application`] itself lets middleware or routes be added afterwards —
//! the pipeline is already folded into a single `Handler` by the time it
//! exists (invariant 4).

use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::exception::{Error, Result};
use corvid_core::{Handler, Request, Response, Scope, Settings};
use corvid_middleware::{CategorizedMiddleware, Middleware, MiddlewareCategory, Pipeline};
use corvid_router::Router;
use corvid_websocket::Transport;
use tracing::Instrument;

use crate::exception_handlers::{ExceptionHandler, ExceptionHandlerRegistry};
use crate::websocket::{WebSocketHandler, WebSocketRouter};

/// A start/stop event hook, mirroring the `lifespan.startup`/`.shutdown`
/// ASGI messages. Blanket-implemented over async closures the same way
/// [`Handler`] and [`Middleware`] are.
#[async_trait]
pub trait LifespanHook: Send + Sync {
	async fn call(&self) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> LifespanHook for F
where
	F: Fn() -> Fut + Send + Sync,
	Fut: std::future::Future<Output = anyhow::Result<()>> + Send,
{
	async fn call(&self) -> anyhow::Result<()> {
		(self)().await
	}
}

/// Adapts `corvid_router::Router::route` to the `Handler` shape `Pipeline`
/// needs as its terminal. `DefaultRouter` implements `route` directly rather
/// than `Handler` because it also needs `&mut self` registration methods
/// `Handler` has no business exposing.
struct RouterHandler(Arc<dyn Router>);

#[async_trait]
impl Handler for RouterHandler {
	async fn handle(&self, request: Request) -> Result<Response> {
		self.0.route(request).await
	}
}

pub struct Application {
	pipeline: Pipeline,
	websocket_router: WebSocketRouter,
	settings: Arc<Settings>,
	exception_handlers: ExceptionHandlerRegistry,
	startup_hooks: Vec<Arc<dyn LifespanHook>>,
	shutdown_hooks: Vec<Arc<dyn LifespanHook>>,
}

impl Application {
	pub fn builder(router: Arc<dyn Router>) -> ApplicationBuilder {
		ApplicationBuilder::new(router)
	}

	pub fn settings(&self) -> &Arc<Settings> {
		&self.settings
	}

	/// Runs registered startup hooks in registration order. A failing hook
	/// aborts the remaining ones and the lifespan with `.failed`
	/// (surfaced to the caller as `Err`; SPEC_FULL §7 "Surfaced" errors).
	pub async fn start(&self) -> Result<()> {
		for hook in &self.startup_hooks {
			hook.call().await.map_err(Error::internal)?;
		}
		tracing::info!("application startup complete");
		Ok(())
	}

	pub async fn stop(&self) -> Result<()> {
		for hook in &self.shutdown_hooks {
			hook.call().await.map_err(Error::internal)?;
		}
		tracing::info!("application shutdown complete");
		Ok(())
	}

	/// Runs one request through the full pipeline, translating any
	/// propagated error into a response via the exception handler registry.
	/// Never returns `Err`: by the time this returns, a response has always
	/// been produced (SPEC_FULL §4.5's http scope dispatch never leaves the
	/// exchange unanswered).
	pub async fn handle_http(&self, request: Request) -> Response {
		let method = request.method.clone();
		let path = request.path().to_string();
		let span = tracing::info_span!("http_request", %method, %path, status = tracing::field::Empty);

		let handler = self.pipeline.handler();
		let outcome = async move { handler.handle(request).await }.instrument(span.clone()).await;

		let response = match outcome {
			Ok(response) => response,
			Err(error) => {
				if error.is_expected() {
					tracing::debug!(%error, "request failed");
				} else {
					tracing::error!(error = ?error, "unexpected error handling request");
				}
				self.exception_handlers.resolve(&error)
			}
		};
		span.record("status", response.status.as_u16());
		response
	}

	/// Resolves `path` against the WebSocket routes and drives the
	/// handshake; emits a bare close when nothing matches (SPEC_FULL §4.5
	/// "resolve a route or emit close").
	pub async fn handle_websocket(&self, scope: Scope, path: &str, transport: Box<dyn Transport>) -> Result<()> {
		tracing::debug!(%path, "websocket connect");
		self.websocket_router.dispatch(scope, path, transport).await
	}
}

pub struct ApplicationBuilder {
	router: Arc<dyn Router>,
	middlewares: Vec<CategorizedMiddleware>,
	websocket_router: WebSocketRouter,
	settings: Arc<Settings>,
	exception_handlers: ExceptionHandlerRegistry,
	startup_hooks: Vec<Arc<dyn LifespanHook>>,
	shutdown_hooks: Vec<Arc<dyn LifespanHook>>,
}

impl ApplicationBuilder {
	pub fn new(router: Arc<dyn Router>) -> Self {
		Self {
			router,
			middlewares: Vec::new(),
			websocket_router: WebSocketRouter::new(),
			settings: Arc::new(Settings::default()),
			exception_handlers: ExceptionHandlerRegistry::default(),
			startup_hooks: Vec::new(),
			shutdown_hooks: Vec::new(),
		}
	}

	pub fn settings(mut self, settings: Settings) -> Self {
		tracing::debug!("application settings registered");
		self.exception_handlers = ExceptionHandlerRegistry::new(settings.show_error_details);
		self.settings = Arc::new(settings);
		self
	}

	pub fn middleware(mut self, category: MiddlewareCategory, priority: i32, middleware: impl Middleware + 'static) -> Self {
		tracing::debug!(?category, priority, "middleware registered");
		self.middlewares
			.push(CategorizedMiddleware::new(category, priority, Arc::new(middleware)));
		self
	}

	pub fn websocket_route(mut self, pattern: &str, handler: impl WebSocketHandler + 'static) -> Result<Self> {
		tracing::debug!(pattern, "websocket route registered");
		self.websocket_router.add(pattern, Arc::new(handler))?;
		Ok(self)
	}

	pub fn exception_handler(mut self, handler: ExceptionHandler) -> Self {
		self.exception_handlers.register(handler);
		self
	}

	pub fn on_startup(mut self, hook: impl LifespanHook + 'static) -> Self {
		self.startup_hooks.push(Arc::new(hook));
		self
	}

	pub fn on_shutdown(mut self, hook: impl LifespanHook + 'static) -> Self {
		self.shutdown_hooks.push(Arc::new(hook));
		self
	}

	pub fn build(self) -> Application {
		let route_count = self.router.get_routes().len();
		let pipeline = Pipeline::build(self.middlewares, Arc::new(RouterHandler(self.router)));
		tracing::info!(route_count, "application pipeline locked");
		Application {
			pipeline,
			websocket_router: self.websocket_router,
			settings: self.settings,
			exception_handlers: self.exception_handlers,
			startup_hooks: self.startup_hooks,
			shutdown_hooks: self.shutdown_hooks,
		}
	}
}
