//! HTTP/1.1 server built on hyper
//!
//! Requests are buffered, converted into [`Request`]s and passed to a
//! [`Handler`]. Handler errors become 500 responses.

use crate::error::ServerResult;
use crate::handler::{Handler, Request, Response, text_response};
use crate::shutdown::ShutdownCoordinator;
use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

/// HTTP server dispatching every request to one handler
pub struct HttpServer {
	handler: Arc<dyn Handler>,
}

impl HttpServer {
	/// Create a new server with the given handler
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self { handler }
	}

	/// Returns a clone of the server's handler
	pub fn handler(&self) -> Arc<dyn Handler> {
		Arc::clone(&self.handler)
	}

	/// Listens on `addr` until the process exits.
	pub async fn listen(self, addr: SocketAddr) -> ServerResult<()> {
		let listener = TcpListener::bind(addr).await?;
		// Never triggered
		let coordinator = ShutdownCoordinator::new(Duration::ZERO);
		self.serve(listener, coordinator).await
	}

	/// Listens on `addr` until `coordinator` triggers shutdown.
	///
	/// # Example
	///
	/// ```rust,no_run
	/// use reinhardt_asset_server::{AssetRouter, HttpServer, ShutdownCoordinator, shutdown_signal};
	/// use std::sync::Arc;
	/// use std::time::Duration;
	///
	/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
	/// let server = HttpServer::new(Arc::new(AssetRouter::new()));
	/// let coordinator = ShutdownCoordinator::new(Duration::from_secs(30));
	///
	/// let trigger = coordinator.clone();
	/// tokio::spawn(async move {
	///     shutdown_signal().await;
	///     trigger.shutdown();
	/// });
	///
	/// server
	///     .listen_with_shutdown("127.0.0.1:8000".parse()?, coordinator)
	///     .await?;
	/// # Ok(())
	/// # }
	/// ```
	pub async fn listen_with_shutdown(
		self,
		addr: SocketAddr,
		coordinator: ShutdownCoordinator,
	) -> ServerResult<()> {
		let listener = TcpListener::bind(addr).await?;
		self.serve(listener, coordinator).await
	}

	/// Accepts connections from `listener` until shutdown.
	///
	/// After shutdown no new connections are accepted. Open connections are
	/// asked to finish their current request and are aborted once the
	/// coordinator's timeout elapses.
	pub async fn serve(
		self,
		listener: TcpListener,
		coordinator: ShutdownCoordinator,
	) -> ServerResult<()> {
		tracing::info!("Asset server listening on http://{}", listener.local_addr()?);

		let mut connections = JoinSet::new();

		loop {
			tokio::select! {
				result = listener.accept() => {
					let (stream, remote_addr) = match result {
						Ok(accepted) => accepted,
						Err(e) => {
							tracing::warn!("Failed to accept connection: {}", e);
							continue;
						}
					};
					let handler = self.handler();
					let coordinator = coordinator.clone();

					connections.spawn(async move {
						if let Err(e) =
							Self::handle_connection(stream, remote_addr, handler, coordinator).await
						{
							tracing::warn!(remote = %remote_addr, "Error handling connection: {}", e);
						}
					});
				}
				Some(_) = connections.join_next(), if !connections.is_empty() => {}
				_ = coordinator.cancelled() => {
					tracing::info!("Shutdown signal received, stopping server...");
					break;
				}
			}
		}

		drop(listener);

		let drained = tokio::time::timeout(coordinator.timeout(), async {
			while connections.join_next().await.is_some() {}
		})
		.await;
		if drained.is_err() {
			tracing::warn!(
				remaining = connections.len(),
				"Shutdown timeout elapsed, aborting open connections"
			);
			connections.abort_all();
		}

		Ok(())
	}

	/// Serves HTTP/1.1 on a single TCP connection.
	pub async fn handle_connection(
		stream: TcpStream,
		remote_addr: SocketAddr,
		handler: Arc<dyn Handler>,
		coordinator: ShutdownCoordinator,
	) -> ServerResult<()> {
		let io = TokioIo::new(stream);
		let service = RequestService {
			handler,
			remote_addr,
		};

		let connection = http1::Builder::new().serve_connection(io, service);
		tokio::pin!(connection);

		tokio::select! {
			result = connection.as_mut() => result?,
			_ = coordinator.cancelled() => {
				connection.as_mut().graceful_shutdown();
				connection.await?;
			}
		}

		Ok(())
	}
}

/// Service implementation for hyper
struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = crate::error::ServerError;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = Arc::clone(&self.handler);
		let remote_addr = self.remote_addr;

		Box::pin(async move {
			let (parts, body) = req.into_parts();
			let body = body.collect().await?.to_bytes();
			let request: Request = http::Request::from_parts(parts, body);

			let method = request.method().clone();
			let path = request.uri().path().to_string();
			let started = Instant::now();

			let response: Response = match handler.handle(request).await {
				Ok(response) => response,
				Err(e) => {
					tracing::error!(method = %method, path = %path, "Handler failed: {}", e);
					text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
				}
			};

			tracing::debug!(
				method = %method,
				path = %path,
				status = response.status().as_u16(),
				remote = %remote_addr,
				elapsed_us = started.elapsed().as_micros() as u64,
				"Handled request"
			);

			let (parts, body) = response.into_parts();
			Ok(hyper::Response::from_parts(parts, Full::new(body)))
		})
	}
}

/// Creates a server for `handler` and listens on `addr`.
pub async fn serve(addr: SocketAddr, handler: Arc<dyn Handler>) -> ServerResult<()> {
	HttpServer::new(handler).listen(addr).await
}

/// Creates a server for `handler` and listens on `addr` until shutdown.
pub async fn serve_with_shutdown(
	addr: SocketAddr,
	handler: Arc<dyn Handler>,
	coordinator: ShutdownCoordinator,
) -> ServerResult<()> {
	HttpServer::new(handler)
		.listen_with_shutdown(addr, coordinator)
		.await
}
