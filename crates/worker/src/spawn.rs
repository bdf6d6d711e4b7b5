use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

use crate::{TaskClass, join_error_panic_message};

/// Returns the ambient runtime handle, or a lazily built global runtime when
/// called from outside tokio (e.g. a synchronous host loop).
pub(crate) fn runtime_handle() -> Handle {
	if let Ok(handle) = Handle::try_current() {
		return handle;
	}

	static GLOBAL_RT: OnceLock<Runtime> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(2)
			.thread_name("kestrel-worker")
			.build()
			.expect("failed to build kestrel-worker global tokio runtime")
	});
	runtime.handle().clone()
}

/// Spawns an async task tagged with `class`.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn");
	runtime_handle().spawn(fut)
}

/// Spawns blocking work tagged with `class`.
pub fn spawn_blocking<F, R>(class: TaskClass, f: F) -> JoinHandle<R>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn_blocking");
	runtime_handle().spawn_blocking(f)
}

/// Spawns a task whose panic is contained and logged under `label`.
///
/// The returned handle belongs to the watcher and resolves once the task has
/// finished, panicked, or been aborted; it never yields a panic itself.
pub fn spawn_isolated<F>(class: TaskClass, label: impl Into<String>, fut: F) -> JoinHandle<()>
where
	F: Future<Output = ()> + Send + 'static,
{
	let label = label.into();
	let task = spawn(class, fut);
	spawn(class, async move {
		let Err(err) = task.await else {
			return;
		};
		match join_error_panic_message(err) {
			Some(message) => tracing::warn!(worker_class = class.as_str(), task = %label, %message, "worker task panicked"),
			None => tracing::trace!(worker_class = class.as_str(), task = %label, "worker task aborted"),
		}
	})
}
