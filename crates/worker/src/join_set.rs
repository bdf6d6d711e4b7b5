use std::collections::HashMap;
use std::future::Future;

use tokio::task::{Id, JoinSet};

use crate::{TaskClass, TaskFailure};

/// Join set that remembers a label per task.
///
/// Tasks are spawned on the worker runtime handle. Completions come back with
/// the label they were spawned under, including panics, so a caller fanning
/// out to several providers can tell which one failed.
#[derive(Debug)]
pub struct LabelledJoinSet<T> {
	class: TaskClass,
	inner: JoinSet<T>,
	labels: HashMap<Id, String>,
}

impl<T> LabelledJoinSet<T>
where
	T: Send + 'static,
{
	pub fn new(class: TaskClass) -> Self {
		Self {
			class,
			inner: JoinSet::new(),
			labels: HashMap::new(),
		}
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Spawns `fut` under `label`.
	pub fn spawn<F>(&mut self, label: impl Into<String>, fut: F)
	where
		F: Future<Output = T> + Send + 'static,
	{
		let label = label.into();
		tracing::trace!(worker_class = self.class.as_str(), task = %label, pending = self.inner.len(), "worker.join_set.spawn");
		let handle = crate::spawn::runtime_handle();
		let abort = self.inner.spawn_on(fut, &handle);
		self.labels.insert(abort.id(), label);
	}

	/// Waits for the next task to finish and returns its label and outcome.
	pub async fn join_next(&mut self) -> Option<(String, Result<T, TaskFailure>)> {
		let joined = self.inner.join_next_with_id().await?;
		let (id, outcome) = match joined {
			Ok((id, value)) => (id, Ok(value)),
			Err(err) => (err.id(), Err(TaskFailure::from(err))),
		};
		let label = self.labels.remove(&id).unwrap_or_default();
		Some((label, outcome))
	}

	/// Aborts every task still running.
	pub fn abort_all(&mut self) {
		self.inner.abort_all();
	}
}
