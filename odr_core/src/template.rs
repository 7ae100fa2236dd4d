use serde_json::Value;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use zip::CompressionMethod;

use crate::ArchiveReader;
use crate::DocumentProfile;
use crate::MiniJinjaEngine;
use crate::OdrError;
use crate::OdrResult;
use crate::RawEntry;
use crate::SaveOptions;
use crate::TemplateEngine;
use crate::archive::write_archive;
use crate::rewrite::rewrite_body;

/// One archive member after loading: either the compiled body or an opaque
/// entry carried through every render untouched.
enum TemplateEntry<B> {
	Body {
		name: String,
		compression: CompressionMethod,
		body: B,
	},
	Opaque {
		name: String,
		compression: CompressionMethod,
		bytes: Vec<u8>,
	},
}

/// A document archive loaded once and renderable many times.
///
/// Loading decodes the body entry, rewrites its annotations into directives,
/// and compiles the result; every other entry is stored raw in archive order.
/// A value of this type is always fully loaded and immutable, so
/// [`render`](Self::render) borrows `&self` and is safe to call concurrently.
pub struct ReportTemplate<E: TemplateEngine = MiniJinjaEngine> {
	entries: Vec<TemplateEntry<E::Body>>,
	engine: E,
	profile: DocumentProfile,
}

impl ReportTemplate<MiniJinjaEngine> {
	/// Load a template archive from an async byte stream with the default
	/// engine and the OpenDocument profile.
	pub async fn load<R>(reader: R) -> OdrResult<Self>
	where
		R: AsyncRead + Unpin,
	{
		Self::load_with(reader, MiniJinjaEngine::new(), DocumentProfile::default()).await
	}
}

impl<E: TemplateEngine> ReportTemplate<E> {
	/// Load a template archive from an async byte stream. The engine carries
	/// the helper set available to the body, so register helpers before
	/// calling this.
	pub async fn load_with<R>(mut reader: R, engine: E, profile: DocumentProfile) -> OdrResult<Self>
	where
		R: AsyncRead + Unpin,
	{
		let mut bytes = Vec::new();
		reader.read_to_end(&mut bytes).await?;
		Self::from_bytes(bytes, engine, profile)
	}

	/// Load a template archive already held in memory. Entries are processed
	/// sequentially in stored order; the first entry matching the profile's
	/// body name becomes the compiled body.
	pub fn from_bytes(bytes: Vec<u8>, engine: E, profile: DocumentProfile) -> OdrResult<Self> {
		let mut entries = Vec::new();
		let mut body_seen = false;

		for raw in ArchiveReader::new(bytes)? {
			let RawEntry {
				name,
				bytes,
				compression,
			} = raw?;
			if !body_seen && name == profile.body_entry {
				let source = String::from_utf8(bytes).map_err(|_| OdrError::BodyDecode(name.clone()))?;
				let rewritten = rewrite_body(&source, &profile)?;
				let body = engine.compile(&rewritten)?;
				entries.push(TemplateEntry::Body {
					name,
					compression,
					body,
				});
				body_seen = true;
			} else {
				entries.push(TemplateEntry::Opaque {
					name,
					compression,
					bytes,
				});
			}
		}

		if !body_seen {
			return Err(OdrError::MissingBody(profile.body_entry));
		}
		debug!(entries = entries.len(), body = %profile.body_entry, "template loaded");

		Ok(Self {
			entries,
			engine,
			profile,
		})
	}

	/// Render the template against a context and serialize the resulting
	/// archive. A pure projection of `(template, context, options)`: repeated
	/// calls with the same context yield byte-identical archives, and opaque
	/// entries pass through byte-for-byte in their original order.
	pub fn render(&self, context: &Value, options: &SaveOptions) -> OdrResult<Vec<u8>> {
		let compiled = self.entries.iter().find_map(|entry| {
			match entry {
				TemplateEntry::Body { body, .. } => Some(body),
				TemplateEntry::Opaque { .. } => None,
			}
		});
		// Load refuses archives without a body entry.
		let Some(compiled) = compiled else {
			return Err(OdrError::MissingBody(self.profile.body_entry.clone()));
		};
		let rendered = self.engine.render(compiled, context)?;
		debug!(body_bytes = rendered.len(), "body rendered");

		write_archive(self.entries.iter().map(|entry| {
			match entry {
				TemplateEntry::Body { name, .. } => {
					(name.as_str(), rendered.as_bytes(), options.body_compression)
				}
				TemplateEntry::Opaque {
					name,
					compression,
					bytes,
				} => (name.as_str(), bytes.as_slice(), *compression),
			}
		}))
	}

	/// Render and write the archive to an async writer.
	pub async fn render_to<W>(
		&self,
		context: &Value,
		options: &SaveOptions,
		writer: &mut W,
	) -> OdrResult<()>
	where
		W: AsyncWrite + Unpin,
	{
		let bytes = self.render(context, options)?;
		writer.write_all(&bytes).await?;
		writer.flush().await?;
		Ok(())
	}

	/// The engine this template was loaded with.
	pub fn engine(&self) -> &E {
		&self.engine
	}

	/// The document profile this template was loaded with.
	pub fn profile(&self) -> &DocumentProfile {
		&self.profile
	}

	/// Entry names in archive order.
	pub fn entry_names(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|entry| {
			match entry {
				TemplateEntry::Body { name, .. } | TemplateEntry::Opaque { name, .. } => name.as_str(),
			}
		})
	}
}
