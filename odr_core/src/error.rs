use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum OdrError {
	#[error(transparent)]
	#[diagnostic(code(odr::io_error))]
	Io(#[from] std::io::Error),

	#[error("not a readable document archive: {0}")]
	#[diagnostic(
		code(odr::archive_format),
		help("the template must be a zip-based office document, e.g. an .odt file")
	)]
	ArchiveFormat(String),

	#[error("archive has no body entry named `{0}`")]
	#[diagnostic(
		code(odr::missing_body),
		help("OpenDocument text archives keep their body in `content.xml`")
	)]
	MissingBody(String),

	#[error("body entry `{0}` is not valid UTF-8")]
	#[diagnostic(code(odr::body_decode))]
	BodyDecode(String),

	#[error("body entry is not well-formed XML: {0}")]
	#[diagnostic(code(odr::xml))]
	Xml(String),

	#[error("rewritten body failed to compile: {message}")]
	#[diagnostic(
		code(odr::compile),
		help("check the directive syntax inside script regions and input fields")
	)]
	Compile {
		message: String,
		line: Option<usize>,
	},

	#[error("template render failed: {0}")]
	#[diagnostic(code(odr::render))]
	Render(String),
}

impl From<zip::result::ZipError> for OdrError {
	fn from(err: zip::result::ZipError) -> Self {
		match err {
			zip::result::ZipError::Io(io) => Self::Io(io),
			other => Self::ArchiveFormat(other.to_string()),
		}
	}
}

impl From<quick_xml::Error> for OdrError {
	fn from(err: quick_xml::Error) -> Self {
		Self::Xml(err.to_string())
	}
}

pub type OdrResult<T> = Result<T, OdrError>;
