//! The `Handler` trait every route and middleware-wrapped pipeline reduces
//! to. Grounded on `reinhardt-urls/crates/routers/tests/*.rs`, which call
//! `router.route(request).await` against handlers implementing exactly this
//! shape.

use async_trait::async_trait;

use crate::exception::Result;
use crate::request::Request;
use crate::response::Response;

#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<F, Fut> Handler for F
where
	F: Fn(Request) -> Fut + Send + Sync,
	Fut: std::future::Future<Output = Result<Response>> + Send,
{
	async fn handle(&self, request: Request) -> Result<Response> {
		(self)(request).await
	}
}
