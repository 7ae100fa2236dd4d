use std::ops::Range;

use logos::Logos;

/// Raw tokens for the line-oriented annotation scan inside a script region.
/// Anything the patterns below don't cover lexes as an error chunk, which the
/// walker treats as plain line content.
#[derive(Debug, Logos, PartialEq)]
enum RawToken {
	#[token("@")]
	At,
	#[token("/")]
	Slash,
	#[token("\n")]
	Newline,
	#[regex(r"[ \t\r]+")]
	Whitespace,
	#[regex(r"[A-Za-z0-9_:.-]+")]
	Word,
}

type SpannedToken = (Result<RawToken, ()>, Range<usize>);

/// One annotation marker found in a script region.
///
/// A marker line is optional leading whitespace, `@`, an optional `/`, an
/// optional tag name, and nothing else. Lines with trailing content after the
/// name are segment text, not markers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ScriptMarker {
	/// Byte offset where the marker match begins (the start of its leading
	/// whitespace).
	pub(crate) start: usize,
	/// Byte offset just past the marker, including the line terminator when
	/// present. The segment that belongs to this marker begins here.
	pub(crate) end: usize,
	/// Whether the marker closes a structural tag (`@/name`).
	pub(crate) is_closing: bool,
	/// Resolved tag name. A marker that omits its name inherits the most
	/// recently seen marker's name; `None` when there is none to inherit,
	/// in which case the marker can never match an ancestor.
	pub(crate) tag_name: Option<String>,
}

/// Scan a script region's text for annotation markers, resolving omitted tag
/// names by carry-forward. The final segment is bounded by end of text, so no
/// terminal marker is materialized here.
pub(crate) fn scan_markers(script: &str) -> Vec<ScriptMarker> {
	let tokens: Vec<SpannedToken> = RawToken::lexer(script).spanned().collect();

	let mut markers = vec![];
	let mut last_tag_name: Option<String> = None;
	let mut line_start = 0;

	while line_start < tokens.len() {
		let line_end = tokens[line_start..]
			.iter()
			.position(|(token, _)| matches!(token, Ok(RawToken::Newline)))
			.map_or(tokens.len(), |found| line_start + found);

		if let Some((is_closing, explicit)) = match_marker_line(&tokens[line_start..line_end], script)
		{
			let tag_name = explicit.or_else(|| last_tag_name.clone());
			last_tag_name.clone_from(&tag_name);
			markers.push(ScriptMarker {
				start: tokens[line_start].1.start,
				end: tokens
					.get(line_end)
					.map_or(script.len(), |(_, span)| span.end),
				is_closing,
				tag_name,
			});
		}

		line_start = line_end + 1;
	}

	markers
}

/// Match one line's tokens against the marker shape. Returns the closing flag
/// and the explicit tag name, or `None` when the line is not a marker.
fn match_marker_line(line: &[SpannedToken], script: &str) -> Option<(bool, Option<String>)> {
	let mut index = 0;
	if matches!(line.get(index), Some((Ok(RawToken::Whitespace), _))) {
		index += 1;
	}
	match line.get(index) {
		Some((Ok(RawToken::At), _)) => index += 1,
		_ => return None,
	}
	let is_closing = matches!(line.get(index), Some((Ok(RawToken::Slash), _)));
	if is_closing {
		index += 1;
	}
	let tag_name = if let Some((Ok(RawToken::Word), span)) = line.get(index) {
		index += 1;
		Some(script[span.clone()].to_string())
	} else {
		None
	};
	if matches!(line.get(index), Some((Ok(RawToken::Whitespace), _))) {
		index += 1;
	}
	if index != line.len() {
		return None;
	}
	Some((is_closing, tag_name))
}
