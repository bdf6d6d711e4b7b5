use std::time::Duration;

use kestrel_engine::MatchMode;
use pretty_assertions::assert_eq;

use crate::common::{Call, MockProvider, drain, engine, keyword, settle, wait_until};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn provider_batches_merge_into_one_ranking() {
	let fruit = MockProvider::new("fruit")
		.answering(0, vec![keyword("apple"), keyword("apricot")], MatchMode::Fuzzy)
		.build();
	let more = MockProvider::new("more")
		.answering(0, vec![keyword("banana"), keyword("ape")], MatchMode::Fuzzy)
		.build();
	let (mut engine, mut events) = engine(&[fruit, more], "");

	engine.set_input("ap");
	let snapshot = settle(&engine, &mut events, |s| s.items.len() == 3).await;

	assert_eq!(snapshot.labels(), ["ape", "apple", "apricot"]);
	assert_eq!(snapshot.items[1].score, 0.4);
	assert_eq!(snapshot.selection, Some(0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn non_matching_fuzzy_candidates_never_appear() {
	let fruit = MockProvider::new("fruit").answering(0, vec![keyword("apple")], MatchMode::Fuzzy).build();
	let more = MockProvider::new("more").answering(0, vec![keyword("banana")], MatchMode::Fuzzy).build();
	let (mut engine, mut events) = engine(&[fruit, more.clone()], "");

	engine.set_input("ap");
	settle(&engine, &mut events, |s| s.items.len() == 1).await;
	assert!(wait_until(Duration::from_secs(2), || more.calls().len() == 1).await);
	tokio::time::sleep(Duration::from_millis(50)).await;

	assert_eq!(engine.snapshot().labels(), ["apple"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn any_mode_batches_score_full_regardless_of_query() {
	let web = MockProvider::new("web")
		.answering(0, vec![keyword("Search the web")], MatchMode::Any)
		.build();
	let fruit = MockProvider::new("fruit").answering(0, vec![keyword("xylophone")], MatchMode::Fuzzy).build();
	let (mut engine, mut events) = engine(&[web, fruit], "");

	engine.set_input("xyl");
	let snapshot = settle(&engine, &mut events, |s| s.items.len() == 2).await;

	assert_eq!(snapshot.labels(), ["Search the web", "xylophone"]);
	assert_eq!(snapshot.items[0].score, 1.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn catalog_matches_are_visible_before_any_provider_answers() {
	let apps = MockProvider::new("apps")
		.with_static(vec![keyword("Firefox"), keyword("Files"), keyword("Terminal")])
		.answering(200, vec![keyword("firefox --private-window")], MatchMode::Any)
		.build();
	let (mut engine, _events) = engine(&[apps], "");

	engine.set_input("fire");

	let snapshot = engine.snapshot();
	assert_eq!(snapshot.labels(), ["Firefox"]);
	assert_eq!(snapshot.selected().map(|item| item.label()), Some("Firefox"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn providers_receive_the_literal_input() {
	let apps = MockProvider::new("apps").with_static(vec![keyword("Firefox")]).build();
	let (mut engine, _events) = engine(&[apps.clone()], "");

	engine.set_input("  Fire ");

	assert_eq!(engine.snapshot().labels(), ["Firefox"]);
	assert!(wait_until(Duration::from_secs(2), || apps.calls() == [Call::new("  Fire ", &[])]).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_query_clears_the_store_but_still_broadcasts() {
	let apps = MockProvider::new("apps").with_static(vec![keyword("Firefox")]).build();
	let recent = MockProvider::new("recent")
		.answering_to("", 0, vec![keyword("Recently used")], MatchMode::Any)
		.build();
	let (mut engine, mut events) = engine(&[apps.clone(), recent.clone()], "");

	engine.set_input("fire");
	assert_eq!(engine.snapshot().labels(), ["Firefox"]);

	engine.set_input("");
	let cleared = engine.snapshot();
	assert!(!cleared.labels().contains(&"Firefox"));

	let snapshot = settle(&engine, &mut events, |s| s.labels() == ["Recently used"]).await;
	assert_eq!(snapshot.selection, Some(0));
	assert!(apps.calls().contains(&Call::new("", &[])));
	assert!(recent.calls().contains(&Call::new("", &[])));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn one_notification_per_merged_batch() {
	let fruit = MockProvider::new("fruit")
		.answering(0, vec![keyword("a"), keyword("b"), keyword("c")], MatchMode::Any)
		.build();
	let (mut engine, mut events) = engine(&[fruit], "");

	engine.set_input("x");
	assert!(wait_until(Duration::from_secs(2), || engine.snapshot().items.len() == 3).await);
	tokio::time::sleep(Duration::from_millis(20)).await;

	// One for the session start, one for the batch.
	assert_eq!(drain(&mut events), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn selection_moves_within_bounds() {
	let fruit = MockProvider::new("fruit")
		.answering(0, vec![keyword("a"), keyword("b"), keyword("c")], MatchMode::Any)
		.build();
	let (mut engine, mut events) = engine(&[fruit], "");
	assert_eq!(engine.selection().map(|item| item.label().to_owned()), None);

	engine.set_input("x");
	settle(&engine, &mut events, |s| s.items.len() == 3).await;

	engine.move_selection(1);
	engine.move_selection(1);
	assert_eq!(engine.snapshot().selection, Some(2));
	engine.move_selection(5);
	assert_eq!(engine.snapshot().selection, Some(2));
	engine.move_selection(-10);
	assert_eq!(engine.snapshot().selection, Some(0));
	assert_eq!(engine.selection().map(|item| item.label().to_owned()).as_deref(), Some("a"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_merges_keep_the_store_sorted() {
	let labels = ["alpha", "alpine", "also", "atlas", "algebra", "all", "alp", "a-l-p-s"];
	let providers: Vec<_> = ["one", "two", "three", "four", "five"]
		.into_iter()
		.enumerate()
		.map(|(idx, name)| {
			let mut provider = MockProvider::new(name);
			for (batch, label) in labels.iter().enumerate() {
				let delay = ((idx * 7 + batch * 3) % 11) as u64;
				provider = provider.answering(delay, vec![keyword(&format!("{label}-{name}"))], MatchMode::Fuzzy);
			}
			provider.build()
		})
		.collect();
	let (mut engine, mut events) = engine(&providers, "");

	engine.set_input("alp");
	loop {
		let snapshot = engine.snapshot();
		assert!(snapshot.items.windows(2).all(|pair| pair[0].score >= pair[1].score));
		match snapshot.selection {
			Some(idx) => assert!(idx < snapshot.items.len()),
			None => assert!(snapshot.items.is_empty()),
		}
		if providers.iter().all(|provider| provider.calls().len() == 1) && snapshot.items.len() == 20 {
			break;
		}
		tokio::time::timeout(Duration::from_secs(5), events.recv())
			.await
			.expect("merges keep arriving");
	}
}
