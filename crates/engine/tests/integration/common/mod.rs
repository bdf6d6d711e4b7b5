//! Shared fixtures for engine integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use kestrel_engine::{
	ArgsHint, Candidate, Category, EngineConfig, EngineEvent, IconRef, MatchMode, Orchestrator, Provider, ProviderError,
	ProviderRegistry, StoreSnapshot, SuggestRequest, SuggestionSink,
};
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;

/// How a [`MockProvider`] answers `suggest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
	/// Sleeps before each batch and stops once the session is superseded.
	Cooperative,
	/// Delivers from a plain thread that never looks at cancellation.
	Detached,
	Panic,
	/// Never returns.
	Hang,
}

#[derive(Debug, Clone)]
struct Batch {
	query: Option<String>,
	delay: Duration,
	items: Vec<Candidate>,
	mode: MatchMode,
}

/// One recorded `suggest` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
	pub query: String,
	pub chain: Vec<String>,
}

impl Call {
	pub fn new(query: &str, chain: &[&str]) -> Self {
		Self {
			query: query.to_owned(),
			chain: chain.iter().map(|label| (*label).to_owned()).collect(),
		}
	}
}

/// Scriptable provider that records everything the engine asks of it.
#[derive(Debug)]
pub struct MockProvider {
	name: &'static str,
	behaviour: Behaviour,
	icon: Option<IconRef>,
	static_items: Mutex<Option<Vec<Candidate>>>,
	refreshed_items: Option<Vec<Candidate>>,
	refresh_fails: bool,
	batches: Vec<Batch>,
	calls: Mutex<Vec<Call>>,
	executed: Mutex<Vec<String>>,
	configured: Mutex<Vec<String>>,
	refreshes: AtomicUsize,
	dropped_calls: Arc<AtomicUsize>,
	cancelled_calls: AtomicUsize,
}

impl MockProvider {
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			behaviour: Behaviour::Cooperative,
			icon: None,
			static_items: Mutex::new(Some(Vec::new())),
			refreshed_items: None,
			refresh_fails: false,
			batches: Vec::new(),
			calls: Mutex::default(),
			executed: Mutex::default(),
			configured: Mutex::default(),
			refreshes: AtomicUsize::new(0),
			dropped_calls: Arc::default(),
			cancelled_calls: AtomicUsize::new(0),
		}
	}

	pub fn behaviour(mut self, behaviour: Behaviour) -> Self {
		self.behaviour = behaviour;
		self
	}

	pub fn with_icon(mut self, icon: &str) -> Self {
		self.icon = Some(IconRef::new(icon));
		self
	}

	pub fn with_static(self, items: Vec<Candidate>) -> Self {
		*self.static_items.lock() = Some(items);
		self
	}

	/// Makes `static_items` fail.
	pub fn without_static(self) -> Self {
		*self.static_items.lock() = None;
		self
	}

	/// Static items to switch to on the next `refresh`.
	pub fn refreshing_to(mut self, items: Vec<Candidate>) -> Self {
		self.refreshed_items = Some(items);
		self
	}

	pub fn failing_refresh(mut self) -> Self {
		self.refresh_fails = true;
		self
	}

	/// Adds a batch delivered for every query.
	pub fn answering(self, delay_ms: u64, items: Vec<Candidate>, mode: MatchMode) -> Self {
		self.push_batch(None, delay_ms, items, mode)
	}

	/// Adds a batch delivered only for `query`.
	pub fn answering_to(self, query: &str, delay_ms: u64, items: Vec<Candidate>, mode: MatchMode) -> Self {
		self.push_batch(Some(query.to_owned()), delay_ms, items, mode)
	}

	fn push_batch(mut self, query: Option<String>, delay_ms: u64, items: Vec<Candidate>, mode: MatchMode) -> Self {
		self.batches.push(Batch {
			query,
			delay: Duration::from_millis(delay_ms),
			items,
			mode,
		});
		self
	}

	pub fn build(self) -> Arc<Self> {
		Arc::new(self)
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	pub fn executed(&self) -> Vec<String> {
		self.executed.lock().clone()
	}

	pub fn configured(&self) -> Vec<String> {
		self.configured.lock().clone()
	}

	pub fn refreshes(&self) -> usize {
		self.refreshes.load(Ordering::SeqCst)
	}

	/// Number of hanging `suggest` calls whose futures were dropped.
	pub fn dropped_calls(&self) -> usize {
		self.dropped_calls.load(Ordering::SeqCst)
	}

	/// Number of cooperative calls that stopped because their session was
	/// superseded.
	pub fn cancelled_calls(&self) -> usize {
		self.cancelled_calls.load(Ordering::SeqCst)
	}

	fn batches_for(&self, query: &str) -> Vec<Batch> {
		self.batches
			.iter()
			.filter(|batch| batch.query.as_deref().is_none_or(|wanted| wanted == query))
			.cloned()
			.collect()
	}
}

struct DropCounter(Arc<AtomicUsize>);

impl Drop for DropCounter {
	fn drop(&mut self) {
		self.0.fetch_add(1, Ordering::SeqCst);
	}
}

#[async_trait]
impl Provider for MockProvider {
	fn name(&self) -> &str {
		self.name
	}

	fn icon(&self) -> Option<IconRef> {
		self.icon.clone()
	}

	fn configure(&self, section: &toml::Table) -> Result<(), ProviderError> {
		if section.get("reject").and_then(toml::Value::as_bool) == Some(true) {
			return Err(format!("{} refuses this configuration", self.name).into());
		}
		self.configured.lock().extend(section.keys().cloned());
		Ok(())
	}

	async fn refresh(&self) -> Result<(), ProviderError> {
		self.refreshes.fetch_add(1, Ordering::SeqCst);
		if self.refresh_fails {
			return Err("index backend unavailable".into());
		}
		if let Some(items) = &self.refreshed_items {
			*self.static_items.lock() = Some(items.clone());
		}
		Ok(())
	}

	fn static_items(&self) -> Result<Vec<Candidate>, ProviderError> {
		self.static_items.lock().clone().ok_or_else(|| "static items unavailable".into())
	}

	async fn suggest(&self, request: SuggestRequest, sink: SuggestionSink) {
		self.calls.lock().push(Call {
			query: request.query.clone(),
			chain: request.chain.iter().map(|candidate| candidate.label.clone()).collect(),
		});
		let batches = self.batches_for(&request.query);

		match self.behaviour {
			Behaviour::Cooperative => {
				for batch in batches {
					tokio::select! {
						() = sink.cancelled() => {
							self.cancelled_calls.fetch_add(1, Ordering::SeqCst);
							return;
						}
						() = tokio::time::sleep(batch.delay) => {}
					}
					if !sink.deliver(batch.items, batch.mode) {
						return;
					}
				}
			}
			Behaviour::Detached => {
				std::thread::spawn(move || {
					for batch in batches {
						std::thread::sleep(batch.delay);
						sink.deliver(batch.items, batch.mode);
					}
				});
			}
			Behaviour::Panic => panic!("{} blew up while answering {:?}", self.name, request.query),
			Behaviour::Hang => {
				let _counter = DropCounter(Arc::clone(&self.dropped_calls));
				std::future::pending::<()>().await;
			}
		}
	}

	fn execute(&self, candidate: &Candidate) {
		self.executed.lock().push(candidate.label.clone());
	}
}

pub fn keyword(label: &str) -> Candidate {
	Candidate::new(label)
}

pub fn drillable(label: &str, args: ArgsHint) -> Candidate {
	Candidate::new(label).with_args(args)
}

pub fn targeted(label: &str, category: Category, target: &str) -> Candidate {
	Candidate::new(label).with_category(category).with_target(target)
}

/// Builds an orchestrator over `providers` with `config` applied.
pub fn engine(providers: &[Arc<MockProvider>], config: &str) -> (Orchestrator, UnboundedReceiver<EngineEvent>) {
	let _ = tracing_subscriber::fmt::try_init();
	let config = EngineConfig::from_toml_str(config).expect("valid config");
	let mut registry = ProviderRegistry::new();
	for provider in providers {
		registry.register(Arc::clone(provider) as Arc<dyn Provider>).expect("unique provider names");
	}
	registry.apply_config(&config).expect("config accepted");
	Orchestrator::new(registry, &config)
}

/// Waits on change notifications until `until` holds for the store.
pub async fn settle<F>(engine: &Orchestrator, events: &mut UnboundedReceiver<EngineEvent>, until: F) -> StoreSnapshot
where
	F: Fn(&StoreSnapshot) -> bool,
{
	let deadline = Instant::now() + Duration::from_secs(5);
	loop {
		let snapshot = engine.snapshot();
		if until(&snapshot) {
			return snapshot;
		}
		let remaining = deadline.saturating_duration_since(Instant::now());
		match tokio::time::timeout(remaining, events.recv()).await {
			Ok(Some(_)) => {}
			_ => panic!("store never settled, last contents: {:?}", snapshot.labels()),
		}
	}
}

/// Polls `f` until it returns true or `timeout` elapses.
pub async fn wait_until<F>(timeout: Duration, mut f: F) -> bool
where
	F: FnMut() -> bool,
{
	let start = Instant::now();
	while start.elapsed() < timeout {
		if f() {
			return true;
		}
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
	f()
}

/// Drains notifications that are already queued.
pub fn drain(events: &mut UnboundedReceiver<EngineEvent>) -> usize {
	let mut count = 0;
	while events.try_recv().is_ok() {
		count += 1;
	}
	count
}
