//! Line-oriented driver: one command per line, ranked list after each.

use std::fmt::Write as _;
use std::time::Duration;

use kestrel_engine::{CancelOutcome, CommitOutcome, EngineEvent, Launch, Orchestrator};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

/// Quiet period after which the list is considered settled.
const QUIET: Duration = Duration::from_millis(40);
/// Upper bound on waiting for providers before printing anyway.
const SETTLE_LIMIT: Duration = Duration::from_millis(500);

const LIST_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	Input(String),
	Up,
	Down,
	Tab,
	Enter,
	Esc,
	Quit,
	Unknown(String),
}

impl Command {
	pub fn parse(line: &str) -> Self {
		match line.trim_end_matches(['\r', '\n']) {
			":up" => Self::Up,
			":down" => Self::Down,
			":tab" => Self::Tab,
			":enter" => Self::Enter,
			":esc" => Self::Esc,
			":quit" | ":q" => Self::Quit,
			other if other.starts_with(':') && !other.starts_with("::") => Self::Unknown(other.to_owned()),
			// A leading "::" escapes a literal colon.
			other => Self::Input(other.strip_prefix(':').unwrap_or(other).to_owned()),
		}
	}
}

/// Reads commands until end of input or `:quit`.
pub async fn run<R, W>(
	engine: &mut Orchestrator,
	mut events: UnboundedReceiver<EngineEvent>,
	input: R,
	mut out: W,
) -> anyhow::Result<()>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
{
	let mut lines = BufReader::new(input).lines();
	while let Some(line) = lines.next_line().await? {
		let command = Command::parse(&line);
		tracing::debug!(?command, "command");
		if command == Command::Quit {
			break;
		}

		let mut report = apply(engine, command);
		settle(&mut events).await;
		report.push_str(&render(engine));
		out.write_all(report.as_bytes()).await?;
		out.flush().await?;
	}
	Ok(())
}

/// Applies one command and returns any message it produced.
fn apply(engine: &mut Orchestrator, command: Command) -> String {
	let mut report = String::new();
	match command {
		Command::Input(text) => engine.set_input(text),
		Command::Up => engine.move_selection(-1),
		Command::Down => engine.move_selection(1),
		Command::Tab => {
			if let Err(err) = engine.drill() {
				let _ = writeln!(report, "! {err}");
			}
		}
		Command::Enter => match engine.commit() {
			Ok(CommitOutcome::Open(Launch::File(path))) => {
				let _ = writeln!(report, "open file {path}");
			}
			Ok(CommitOutcome::Open(Launch::Url(url))) => {
				let _ = writeln!(report, "open url {url}");
			}
			Ok(CommitOutcome::Unsupported) => report.push_str("! nothing to run for this item\n"),
			Ok(CommitOutcome::Nothing | CommitOutcome::DrilledDown | CommitOutcome::Executed) => {}
			Err(err) => {
				let _ = writeln!(report, "! {err}");
			}
		},
		Command::Esc => {
			if engine.cancel() == CancelOutcome::Dismissed {
				report.push_str("(dismissed)\n");
			}
		}
		Command::Quit => {}
		Command::Unknown(name) => {
			let _ = writeln!(report, "! unknown command {name}");
		}
	}
	report
}

/// Waits until no change notification has arrived for [`QUIET`], or
/// [`SETTLE_LIMIT`] has passed.
async fn settle(events: &mut UnboundedReceiver<EngineEvent>) {
	let deadline = Instant::now() + SETTLE_LIMIT;
	loop {
		let wait = QUIET.min(deadline.saturating_duration_since(Instant::now()));
		match tokio::time::timeout(wait, events.recv()).await {
			Ok(Some(_)) if Instant::now() < deadline => {}
			_ => return,
		}
	}
}

fn render(engine: &Orchestrator) -> String {
	let mut text = String::new();
	let breadcrumb: Vec<_> = engine.stack().frames().iter().map(|frame| frame.candidate.label()).collect();
	if breadcrumb.is_empty() {
		let _ = writeln!(text, "> {}", engine.input());
	} else {
		let _ = writeln!(text, "{} > {}", breadcrumb.join(" > "), engine.input());
	}

	let snapshot = engine.snapshot();
	for (idx, item) in snapshot.items.iter().take(LIST_LIMIT).enumerate() {
		let marker = if snapshot.selection == Some(idx) { '*' } else { ' ' };
		let _ = write!(text, "{marker} {:.2}  {}", item.score, item.label());
		if !item.candidate.description.is_empty() {
			let _ = write!(text, "  ({})", item.candidate.description);
		}
		text.push('\n');
	}
	if snapshot.items.len() > LIST_LIMIT {
		let _ = writeln!(text, "  ... {} more", snapshot.items.len() - LIST_LIMIT);
	}
	text
}
