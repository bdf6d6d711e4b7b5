//! Subsequence fuzzy matching for suggestion labels.
//!
//! A search string matches a label when every search character appears in the
//! label in order, not necessarily contiguously. Matching is greedy and
//! left-to-right, and compares codepoints exactly: callers normalize case
//! before calling (the engine lower-cases both sides).
//!
//! [`match_score`] ranks a match in `[0, 1]`:
//!
//! - the base score is the matched share of the label (`|search| / |label|`);
//! - a match split into several runs of adjacent characters loses part of the
//!   unmatched share, proportionally to `1 - 1 / runs`.
//!
//! Both functions are pure and allocation-free.

/// Outcome of one greedy scan that matched every search character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FullMatch {
	matched: usize,
	input_len: usize,
	runs: usize,
}

/// Greedy left-to-right subsequence scan.
///
/// Returns `None` as soon as the remaining input is shorter than the remaining
/// unmatched search characters, or when the input is exhausted first. An empty
/// search never produces a full match.
fn scan(search: &str, input: &str) -> Option<FullMatch> {
	let search_len = search.chars().count();
	let input_len = input.chars().count();
	if search_len == 0 {
		return None;
	}

	let mut wanted = search.chars();
	let mut next = wanted.next();
	let mut matched = 0usize;
	let mut runs = 0usize;
	let mut last: Option<usize> = None;

	for (idx, ch) in input.chars().enumerate() {
		if search_len - matched > input_len - idx {
			return None;
		}
		if next != Some(ch) {
			continue;
		}

		if last.is_none_or(|prev| prev + 1 != idx) {
			runs += 1;
		}
		last = Some(idx);
		matched += 1;

		if matched == search_len {
			return Some(FullMatch { matched, input_len, runs });
		}
		next = wanted.next();
	}

	None
}

/// Returns true when `search` is a subsequence of `input`.
///
/// The empty search matches everything.
pub fn matches(search: &str, input: &str) -> bool {
	search.is_empty() || scan(search, input).is_some()
}

/// Scores how well `search` matches `input`, in `[0, 1]`.
///
/// Returns `0.0` whenever [`matches`] would fail, and also for the empty
/// search, which has no matched characters to rank.
pub fn match_score(search: &str, input: &str) -> f64 {
	let Some(hit) = scan(search, input) else {
		return 0.0;
	};

	let match_percentage = hit.matched as f64 / hit.input_len as f64;
	if hit.runs <= 1 {
		return match_percentage;
	}

	let unmatched_percentage = 1.0 - match_percentage;
	let correction = (1.0 - (1.0 / hit.runs as f64)) * unmatched_percentage * match_percentage;

	match_percentage - correction
}
