//! Graceful shutdown coordination

use std::time::Duration;
use tokio::sync::watch;

/// Broadcasts a one-shot shutdown to the accept loop and open connections.
///
/// Clones share the same state. A shutdown triggered before a task starts
/// waiting is still observed by that task.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
	sender: watch::Sender<bool>,
	timeout: Duration,
}

impl ShutdownCoordinator {
	/// Creates a coordinator that gives open connections `timeout` to finish.
	///
	/// # Examples
	///
	/// ```rust
	/// use reinhardt_asset_server::ShutdownCoordinator;
	/// use std::time::Duration;
	///
	/// let coordinator = ShutdownCoordinator::new(Duration::from_secs(30));
	/// assert!(!coordinator.is_shutdown());
	/// coordinator.shutdown();
	/// assert!(coordinator.is_shutdown());
	/// ```
	pub fn new(timeout: Duration) -> Self {
		let (sender, _) = watch::channel(false);
		Self { sender, timeout }
	}

	/// Triggers shutdown. Idempotent.
	pub fn shutdown(&self) {
		self.sender.send_replace(true);
	}

	/// Returns true once [`shutdown`](Self::shutdown) has been called.
	pub fn is_shutdown(&self) -> bool {
		*self.sender.borrow()
	}

	/// Grace period for open connections.
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Completes once shutdown has been triggered.
	pub async fn cancelled(&self) {
		let mut receiver = self.sender.subscribe();
		// The sender lives as long as `self`, so this cannot fail
		let _ = receiver.wait_for(|stopped| *stopped).await;
	}
}

/// Completes on Ctrl+C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!("Failed to listen for Ctrl+C: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(e) => {
				tracing::error!("Failed to listen for SIGTERM: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
