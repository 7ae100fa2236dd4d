use tracing::debug;
use tracing::trace;

use crate::DocumentProfile;
use crate::OdrResult;
use crate::scanner::scan_markers;
use crate::xml_tree::NodeId;
use crate::xml_tree::XmlDocument;

/// Rewrite a document body so its author annotations become template
/// directives positioned in the XML tree.
///
/// Two annotation conventions are expanded:
///
/// 1. Inline input fields labeled with the reserved marker are replaced by
///    their own displayed text, turning the field into literal template
///    source (typically an output expression).
/// 2. Script regions declared in the reserved language are scanned for
///    `@tag` / `@/tag` marker lines. The text following an opening marker is
///    inserted immediately before every ancestor element named `tag`; the
///    text following a closing marker immediately after. This lets one
///    annotation wrap whole structures — a table row, a paragraph — and all
///    nesting levels sharing a tag name at once. The script region itself is
///    removed.
///
/// Author mistakes are not fatal here: a marker whose tag matches no ancestor
/// simply contributes nothing.
pub fn rewrite_body(xml: &str, profile: &DocumentProfile) -> OdrResult<String> {
	let mut doc = XmlDocument::parse(xml)?;
	expand_input_fields(&mut doc, profile);
	expand_script_regions(&mut doc, profile);
	doc.serialize()
}

/// Replace every input field labeled with the marker by a text node holding
/// the field's displayed text. A plain element-for-text swap; no ancestor
/// search.
fn expand_input_fields(doc: &mut XmlDocument, profile: &DocumentProfile) {
	let fields: Vec<NodeId> = doc
		.elements()
		.into_iter()
		.filter(|&id| {
			doc.element_name(id) == Some(profile.input_field_element.as_str())
				&& doc
					.attribute(id, &profile.input_field_label_attribute)
					.is_some_and(|label| profile.is_marker(label))
		})
		.collect();

	for field in fields {
		let text = doc.text_content(field);
		trace!(text = %text, "expanding input field");
		doc.replace_with_text(field, text);
	}
}

/// Expand every script region declared in the marker language, then remove
/// it from the tree.
fn expand_script_regions(doc: &mut XmlDocument, profile: &DocumentProfile) {
	let scripts: Vec<NodeId> = doc
		.elements()
		.into_iter()
		.filter(|&id| {
			doc.element_name(id) == Some(profile.script_element.as_str())
				&& doc
					.attribute(id, &profile.script_language_attribute)
					.is_some_and(|language| profile.is_marker(language))
		})
		.collect();

	for script_element in scripts {
		let script = doc.text_content(script_element);
		let markers = scan_markers(&script);
		debug!(markers = markers.len(), "expanding script region");

		for (index, marker) in markers.iter().enumerate() {
			let segment_end = markers
				.get(index + 1)
				.map_or(script.len(), |next| next.start);
			let segment = &script[marker.end..segment_end];
			let Some(tag_name) = marker.tag_name.as_deref() else {
				continue;
			};

			// Inject at every matching ancestor level, not only the nearest:
			// nested structures sharing a tag name are all wrapped.
			let mut ancestor = doc.parent(script_element);
			while let Some(current) = ancestor {
				if doc.element_name(current) == Some(tag_name) && doc.parent(current).is_some() {
					if marker.is_closing {
						doc.insert_text_after(current, segment);
					} else {
						doc.insert_text_before(current, segment);
					}
				}
				ancestor = doc.parent(current);
			}
		}

		doc.detach(script_element);
	}
}
