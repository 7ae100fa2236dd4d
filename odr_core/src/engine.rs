use minijinja::AutoEscape;
use minijinja::Environment;
use minijinja::UndefinedBehavior;
use serde_json::Value;

use crate::OdrError;
use crate::OdrResult;

/// Name the compiled body is registered under. Deliberately extension-free so
/// minijinja's name-based auto-escape detection stays out of the way; the
/// engine sets XML-appropriate escaping itself.
const BODY_TEMPLATE_NAME: &str = "body";

/// Compiles a rewritten body once and renders it many times. Implementations
/// are injected when a template is constructed, so the pipeline stays
/// agnostic of the directive syntax.
pub trait TemplateEngine {
	/// Compiled form of one body entry.
	type Body;

	/// Compile body text into a reusable handle. Fails with
	/// [`OdrError::Compile`] on malformed directive syntax.
	fn compile(&self, source: &str) -> OdrResult<Self::Body>;

	/// Render a compiled body against a context. A pure function of
	/// `(body, context)`; the context is never mutated.
	fn render(&self, body: &Self::Body, context: &Value) -> OdrResult<String>;
}

/// The default engine, backed by [`minijinja`].
///
/// Undefined references render as empty output rather than failing
/// (`UndefinedBehavior::Chainable`), and interpolated values are escaped for
/// XML. Register filters, functions, and globals through
/// [`environment_mut`](Self::environment_mut) before loading a template; a
/// compiled body snapshots the helper set it was compiled against.
#[derive(Debug)]
pub struct MiniJinjaEngine {
	env: Environment<'static>,
}

impl MiniJinjaEngine {
	pub fn new() -> Self {
		let mut env = Environment::new();
		env.set_keep_trailing_newline(true);
		env.set_undefined_behavior(UndefinedBehavior::Chainable);
		env.set_auto_escape_callback(|_| AutoEscape::Html);
		Self { env }
	}

	/// Mutable access to the base environment, for registering helpers
	/// callable from directives in the body.
	pub fn environment_mut(&mut self) -> &mut Environment<'static> {
		&mut self.env
	}
}

impl Default for MiniJinjaEngine {
	fn default() -> Self {
		Self::new()
	}
}

/// A body compiled by [`MiniJinjaEngine`]: the environment snapshot holding
/// the parsed template together with the helpers registered at compile time.
#[derive(Debug)]
pub struct CompiledBody {
	env: Environment<'static>,
}

impl TemplateEngine for MiniJinjaEngine {
	type Body = CompiledBody;

	fn compile(&self, source: &str) -> OdrResult<CompiledBody> {
		let mut env = self.env.clone();
		env.add_template_owned(BODY_TEMPLATE_NAME.to_string(), source.to_string())
			.map_err(|err| {
				OdrError::Compile {
					message: err.to_string(),
					line: err.line(),
				}
			})?;
		Ok(CompiledBody { env })
	}

	fn render(&self, body: &CompiledBody, context: &Value) -> OdrResult<String> {
		let template = body
			.env
			.get_template(BODY_TEMPLATE_NAME)
			.map_err(|err| OdrError::Render(err.to_string()))?;
		template
			.render(context)
			.map_err(|err| OdrError::Render(err.to_string()))
	}
}
