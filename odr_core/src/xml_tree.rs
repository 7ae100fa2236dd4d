use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::BytesCData;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesPI;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;

use crate::OdrError;
use crate::OdrResult;

/// Index of a node inside [`XmlDocument::nodes`]. Nodes are never deallocated
/// while the document lives, so ids stay valid across mutations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct NodeId(usize);

#[derive(Debug)]
pub(crate) enum NodeKind {
	/// Synthetic root owning the document element and any top-level comments
	/// or processing instructions. Never serialized itself.
	Document,
	Element {
		name: String,
		attributes: Vec<(String, String)>,
		/// Parsed from an empty-element tag; serialized back as one while it
		/// has no children.
		self_closing: bool,
	},
	/// Character data, stored unescaped.
	Text(String),
	CData(String),
	/// Raw comment payload, written back verbatim.
	Comment(String),
	/// Raw target-plus-data payload of a processing instruction.
	ProcessingInstruction(String),
	DocType(String),
}

#[derive(Debug)]
pub(crate) struct Node {
	pub(crate) parent: Option<NodeId>,
	pub(crate) kind: NodeKind,
	pub(crate) children: Vec<NodeId>,
}

/// A mutable XML tree backed by an index arena with parent links. Mutation is
/// restricted to sibling insertion, in-place replacement, and detachment, so
/// walking ancestors while inserting never invalidates an id.
#[derive(Debug)]
pub(crate) struct XmlDocument {
	nodes: Vec<Node>,
	/// Raw content of the XML declaration, re-emitted ahead of everything
	/// else when present.
	declaration: Option<String>,
}

impl XmlDocument {
	/// Parse a serialized XML body into an arena tree.
	pub(crate) fn parse(xml: &str) -> OdrResult<Self> {
		let mut doc = Self {
			nodes: vec![Node {
				parent: None,
				kind: NodeKind::Document,
				children: vec![],
			}],
			declaration: None,
		};

		let mut reader = Reader::from_str(xml);
		let mut stack = vec![NodeId(0)];

		loop {
			let event = reader.read_event()?;
			let parent = *stack.last().unwrap_or(&NodeId(0));
			match event {
				Event::Start(start) => {
					let id = doc.append_child(parent, element_from_start(&start, false)?);
					stack.push(id);
				}
				Event::Empty(start) => {
					doc.append_child(parent, element_from_start(&start, true)?);
				}
				Event::End(_) => {
					if stack.len() > 1 {
						stack.pop();
					}
				}
				Event::Text(text) => {
					let value = text
						.unescape()
						.map_err(|err| OdrError::Xml(err.to_string()))?;
					doc.append_child(parent, NodeKind::Text(value.into_owned()));
				}
				Event::CData(cdata) => {
					let value = String::from_utf8_lossy(&cdata).into_owned();
					doc.append_child(parent, NodeKind::CData(value));
				}
				Event::Comment(comment) => {
					let value = String::from_utf8_lossy(&comment).into_owned();
					doc.append_child(parent, NodeKind::Comment(value));
				}
				Event::PI(pi) => {
					let value = String::from_utf8_lossy(&pi).into_owned();
					doc.append_child(parent, NodeKind::ProcessingInstruction(value));
				}
				Event::DocType(doctype) => {
					let value = String::from_utf8_lossy(&doctype).into_owned();
					doc.append_child(parent, NodeKind::DocType(value));
				}
				Event::Decl(decl) => {
					doc.declaration = Some(String::from_utf8_lossy(&decl).into_owned());
				}
				Event::Eof => break,
			}
		}

		Ok(doc)
	}

	/// Serialize the tree back to XML text. Text nodes are written with
	/// partial escaping (`&`, `<`, `>`) so quotes inside template directives
	/// survive the round trip.
	pub(crate) fn serialize(&self) -> OdrResult<String> {
		let mut writer = Writer::new(Vec::new());

		if let Some(declaration) = &self.declaration {
			let start = BytesStart::from_content(declaration.clone(), 3);
			writer.write_event(Event::Decl(BytesDecl::from_start(start)))?;
		}
		for &child in &self.node(self.root()).children {
			self.write_node(&mut writer, child)?;
		}

		let bytes = writer.into_inner();
		String::from_utf8(bytes).map_err(|err| OdrError::Xml(err.to_string()))
	}

	fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> OdrResult<()> {
		let node = self.node(id);
		match &node.kind {
			NodeKind::Document => {}
			NodeKind::Element {
				name,
				attributes,
				self_closing,
			} => {
				let mut start = BytesStart::new(name.as_str());
				for (key, value) in attributes {
					start.push_attribute((key.as_str(), value.as_str()));
				}
				if *self_closing && node.children.is_empty() {
					writer.write_event(Event::Empty(start))?;
				} else {
					writer.write_event(Event::Start(start))?;
					for &child in &node.children {
						self.write_node(writer, child)?;
					}
					writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
				}
			}
			NodeKind::Text(value) => {
				let escaped = partial_escape(value.as_str());
				writer.write_event(Event::Text(BytesText::from_escaped(escaped)))?;
			}
			NodeKind::CData(value) => {
				writer.write_event(Event::CData(BytesCData::new(value.as_str())))?;
			}
			NodeKind::Comment(value) => {
				writer.write_event(Event::Comment(BytesText::from_escaped(value.as_str())))?;
			}
			NodeKind::ProcessingInstruction(value) => {
				writer.write_event(Event::PI(BytesPI::new(value.as_str())))?;
			}
			NodeKind::DocType(value) => {
				writer.write_event(Event::DocType(BytesText::from_escaped(value.as_str())))?;
			}
		}
		Ok(())
	}

	pub(crate) fn root(&self) -> NodeId {
		NodeId(0)
	}

	pub(crate) fn node(&self, id: NodeId) -> &Node {
		&self.nodes[id.0]
	}

	pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.node(id).parent
	}

	/// Name of an element node, `None` for every other kind.
	pub(crate) fn element_name(&self, id: NodeId) -> Option<&str> {
		match &self.node(id).kind {
			NodeKind::Element { name, .. } => Some(name.as_str()),
			_ => None,
		}
	}

	/// Value of an element's attribute, if both exist.
	pub(crate) fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
		match &self.node(id).kind {
			NodeKind::Element { attributes, .. } => {
				attributes
					.iter()
					.find(|(key, _)| key == name)
					.map(|(_, value)| value.as_str())
			}
			_ => None,
		}
	}

	/// All element nodes in document order.
	pub(crate) fn elements(&self) -> Vec<NodeId> {
		let mut found = vec![];
		let mut stack = vec![self.root()];
		while let Some(id) = stack.pop() {
			if matches!(self.node(id).kind, NodeKind::Element { .. }) {
				found.push(id);
			}
			for &child in self.node(id).children.iter().rev() {
				stack.push(child);
			}
		}
		found
	}

	/// Concatenated text of all descendant text and CDATA nodes, in document
	/// order.
	pub(crate) fn text_content(&self, id: NodeId) -> String {
		let mut content = String::new();
		let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
		while let Some(current) = stack.pop() {
			match &self.node(current).kind {
				NodeKind::Text(value) | NodeKind::CData(value) => content.push_str(value),
				_ => {}
			}
			for &child in self.node(current).children.iter().rev() {
				stack.push(child);
			}
		}
		content
	}

	/// Insert a text node immediately before `anchor`. A node without a
	/// parent is not a valid anchor; the call is then a no-op.
	pub(crate) fn insert_text_before(&mut self, anchor: NodeId, text: &str) {
		self.insert_text(anchor, text, 0);
	}

	/// Insert a text node immediately after `anchor` (as its next sibling).
	pub(crate) fn insert_text_after(&mut self, anchor: NodeId, text: &str) {
		self.insert_text(anchor, text, 1);
	}

	fn insert_text(&mut self, anchor: NodeId, text: &str, offset: usize) {
		let Some(parent) = self.node(anchor).parent else {
			return;
		};
		let Some(index) = self.sibling_index(parent, anchor) else {
			return;
		};
		let id = self.push_node(Some(parent), NodeKind::Text(text.to_string()));
		self.nodes[parent.0].children.insert(index + offset, id);
	}

	/// Replace an element with a text node at the same position under the
	/// same parent.
	pub(crate) fn replace_with_text(&mut self, id: NodeId, text: String) {
		let Some(parent) = self.node(id).parent else {
			return;
		};
		let Some(index) = self.sibling_index(parent, id) else {
			return;
		};
		let replacement = self.push_node(Some(parent), NodeKind::Text(text));
		self.nodes[parent.0].children[index] = replacement;
		self.nodes[id.0].parent = None;
	}

	/// Detach a node from its parent. The node stays in the arena but is no
	/// longer reachable from the root.
	pub(crate) fn detach(&mut self, id: NodeId) {
		let Some(parent) = self.node(id).parent else {
			return;
		};
		self.nodes[parent.0].children.retain(|&child| child != id);
		self.nodes[id.0].parent = None;
	}

	fn sibling_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
		self.node(parent)
			.children
			.iter()
			.position(|&candidate| candidate == child)
	}

	fn append_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
		let id = self.push_node(Some(parent), kind);
		self.nodes[parent.0].children.push(id);
		id
	}

	fn push_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(Node {
			parent,
			kind,
			children: vec![],
		});
		id
	}
}

fn element_from_start(start: &BytesStart<'_>, self_closing: bool) -> OdrResult<NodeKind> {
	let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
	let mut attributes = vec![];
	for attribute in start.attributes() {
		let attribute = attribute.map_err(|err| OdrError::Xml(err.to_string()))?;
		let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
		let value = attribute
			.unescape_value()
			.map_err(|err| OdrError::Xml(err.to_string()))?
			.into_owned();
		attributes.push((key, value));
	}
	Ok(NodeKind::Element {
		name,
		attributes,
		self_closing,
	})
}
