use serde::Deserialize;
use serde::Serialize;

/// Archive entry holding the primary XML body of an OpenDocument text file.
pub const ODF_BODY_ENTRY: &str = "content.xml";

/// Reserved marker that flags a script region or input field as template
/// source. Matched case-insensitively.
pub const SCRIPT_MARKER: &str = "nodscript";

/// Names the archive entry and the XML vocabulary a document format uses for
/// template annotations.
///
/// The default profile targets OpenDocument text (`.odt`): script regions are
/// `<text:script script:language="nodscript">` elements and inline fields are
/// `<text:text-input text:description="nodscript">` elements inside
/// `content.xml`. Other zip-plus-XML formats can supply their own vocabulary.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DocumentProfile {
	/// Name of the archive entry compiled as the template body. Every other
	/// entry is passed through unmodified.
	pub body_entry: String,
	/// Element name of block script regions.
	pub script_element: String,
	/// Attribute declaring a script region's language.
	pub script_language_attribute: String,
	/// Element name of inline text input fields.
	pub input_field_element: String,
	/// Attribute holding an input field's descriptive label.
	pub input_field_label_attribute: String,
	/// Marker value matched (case-insensitively) against the two attributes
	/// above.
	pub marker: String,
}

impl Default for DocumentProfile {
	fn default() -> Self {
		Self::opendocument()
	}
}

impl DocumentProfile {
	/// The profile for OpenDocument text archives.
	pub fn opendocument() -> Self {
		Self {
			body_entry: ODF_BODY_ENTRY.into(),
			script_element: "text:script".into(),
			script_language_attribute: "script:language".into(),
			input_field_element: "text:text-input".into(),
			input_field_label_attribute: "text:description".into(),
			marker: SCRIPT_MARKER.into(),
		}
	}

	/// Whether an attribute value names the reserved template marker.
	pub(crate) fn is_marker(&self, value: &str) -> bool {
		value.eq_ignore_ascii_case(&self.marker)
	}
}
