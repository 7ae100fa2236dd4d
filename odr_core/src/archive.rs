use std::io::Cursor;
use std::io::Read;
use std::io::Write;

use tracing::trace;
use zip::CompressionMethod;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::OdrResult;

/// One archive member as stored: raw bytes plus the storage characteristics
/// needed to write it back faithfully.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawEntry {
	pub name: String,
	pub bytes: Vec<u8>,
	pub compression: CompressionMethod,
}

/// Controls output archive serialization. The render pipeline passes this
/// through to the archive adapter untouched.
#[derive(Clone, Copy, Debug)]
pub struct SaveOptions {
	/// Compression applied to the rendered body entry. Opaque entries always
	/// keep the method they were stored with.
	pub body_compression: CompressionMethod,
}

impl Default for SaveOptions {
	fn default() -> Self {
		Self {
			body_compression: CompressionMethod::Deflated,
		}
	}
}

/// Lazy reader over the members of a zip-based document archive, yielding
/// entries in stored order. Finite and non-restartable; construct a new
/// reader to iterate again.
pub struct ArchiveReader {
	archive: ZipArchive<Cursor<Vec<u8>>>,
	index: usize,
}

impl ArchiveReader {
	/// Open an archive held in memory. Fails with
	/// [`OdrError::ArchiveFormat`](crate::OdrError::ArchiveFormat) when the
	/// bytes are not a valid container.
	pub fn new(bytes: Vec<u8>) -> OdrResult<Self> {
		let archive = ZipArchive::new(Cursor::new(bytes))?;
		Ok(Self { archive, index: 0 })
	}

	pub fn len(&self) -> usize {
		self.archive.len()
	}

	pub fn is_empty(&self) -> bool {
		self.archive.len() == 0
	}
}

impl Iterator for ArchiveReader {
	type Item = OdrResult<RawEntry>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.index >= self.archive.len() {
			return None;
		}
		let entry = read_entry(&mut self.archive, self.index);
		self.index += 1;
		Some(entry)
	}
}

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, index: usize) -> OdrResult<RawEntry> {
	let mut file = archive.by_index(index)?;
	let mut bytes = Vec::with_capacity(file.size() as usize);
	file.read_to_end(&mut bytes)?;
	trace!(name = %file.name(), size = bytes.len(), "read archive entry");
	Ok(RawEntry {
		name: file.name().to_string(),
		bytes,
		compression: file.compression(),
	})
}

/// Serialize entries into a new archive, preserving each entry's compression
/// method. Timestamps are pinned to the zip epoch so identical inputs produce
/// byte-identical archives.
pub(crate) fn write_archive<'a, I>(entries: I) -> OdrResult<Vec<u8>>
where
	I: IntoIterator<Item = (&'a str, &'a [u8], CompressionMethod)>,
{
	let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
	for (name, bytes, compression) in entries {
		let options = SimpleFileOptions::default()
			.compression_method(compression)
			.last_modified_time(zip::DateTime::default());
		if name.ends_with('/') {
			writer.add_directory(name, options)?;
		} else {
			writer.start_file(name, options)?;
			writer.write_all(bytes)?;
		}
	}
	Ok(writer.finish()?.into_inner())
}
