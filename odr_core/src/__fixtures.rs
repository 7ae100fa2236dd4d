use std::io::Cursor;
use std::io::Write;

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::DocumentProfile;

/// Profile used by most rewrite tests: the same annotation semantics as the
/// OpenDocument profile, over short generic element names.
pub fn generic_profile() -> DocumentProfile {
	DocumentProfile {
		body_entry: "content.xml".into(),
		script_element: "script".into(),
		script_language_attribute: "lang".into(),
		input_field_element: "field".into(),
		input_field_label_attribute: "label".into(),
		marker: "nodscript".into(),
	}
}

/// Build an in-memory archive. The body entry (`content.xml`) is deflated
/// and every other entry stored, mirroring how office suites write their
/// containers.
pub fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
	let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
	for (name, bytes) in entries {
		let method = if *name == "content.xml" {
			CompressionMethod::Deflated
		} else {
			CompressionMethod::Stored
		};
		let options = SimpleFileOptions::default().compression_method(method);
		zip.start_file(*name, options).expect("start entry");
		zip.write_all(bytes).expect("write entry");
	}
	zip.finish().expect("finish archive").into_inner()
}

/// A body whose script region wraps its `row` ancestor in a loop directive.
pub fn looped_row_body() -> &'static str {
	"<doc><row><script lang=\"nodscript\">@row\n{% for item in items %}\n@/row\n{% endfor \
	 %}</script><cell>{{ item }}</cell></row></doc>"
}
