//! Per-content-type minification.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Transforms are looked up
//! by content type once per file; unregistered types pass through unchanged.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use rustc_hash::FxHashMap;

use super::MinifyError;
use crate::utils::mime::types;

/// A pure `bytes → bytes` rewrite applied to an asset before registration.
pub trait Transform: Send + Sync {
    fn apply(&self, source: &[u8], content_type: &str) -> Result<Vec<u8>, MinifyError>;
}

impl<F> Transform for F
where
    F: Fn(&[u8], &str) -> Result<Vec<u8>, MinifyError> + Send + Sync,
{
    fn apply(&self, source: &[u8], content_type: &str) -> Result<Vec<u8>, MinifyError> {
        self(source, content_type)
    }
}

/// Content type → transform table.
pub struct MinifierRegistry {
    transforms: FxHashMap<String, Box<dyn Transform>>,
}

impl MinifierRegistry {
    /// Registry without any transform: every asset passes through verbatim.
    pub fn empty() -> Self {
        Self {
            transforms: FxHashMap::default(),
        }
    }

    /// Registry with the JavaScript and CSS minifiers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry
            .register(
                types::JAVASCRIPT,
                |source: &[u8], _: &str| -> Result<Vec<u8>, MinifyError> {
                    minify_js(utf8(source)?).map(String::into_bytes)
                },
            )
            .register(
                types::CSS,
                |source: &[u8], _: &str| -> Result<Vec<u8>, MinifyError> {
                    minify_css(utf8(source)?).map(String::into_bytes)
                },
            );
        registry
    }

    /// Register (or replace) the transform for `content_type`.
    pub fn register(
        &mut self,
        content_type: impl Into<String>,
        transform: impl Transform + 'static,
    ) -> &mut Self {
        self.transforms
            .insert(content_type.into(), Box::new(transform));
        self
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.transforms.contains_key(content_type)
    }

    /// Run the transform registered for `content_type`, if any.
    pub fn apply(&self, content_type: &str, source: Vec<u8>) -> Result<Vec<u8>, MinifyError> {
        match self.transforms.get(content_type) {
            Some(transform) => transform.apply(&source, content_type),
            None => Ok(source),
        }
    }
}

impl Default for MinifierRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn utf8(source: &[u8]) -> Result<&str, MinifyError> {
    std::str::from_utf8(source).map_err(|e| MinifyError::new(format!("not valid UTF-8: {e}")))
}

/// Minify JavaScript source code.
///
/// Parsed as a classic script first; sources using module syntax are retried
/// as ES modules.
pub fn minify_js(source: &str) -> Result<String, MinifyError> {
    match minify_js_as(source, SourceType::cjs()) {
        Ok(code) => Ok(code),
        Err(script_err) => minify_js_as(source, SourceType::mjs()).map_err(|_| script_err),
    }
}

fn minify_js_as(source: &str, source_type: SourceType) -> Result<String, MinifyError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if let Some(err) = ret.errors.first() {
        return Err(MinifyError::new(err.to_string()));
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Result<String, MinifyError> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| MinifyError::new(e.to_string()))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| MinifyError::new(e.to_string()))?;
    Ok(result.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_css() {
        let out = minify_css("body {\n  color: red;\n}\n").unwrap();
        assert_eq!(out, "body{color:red}");
    }

    #[test]
    fn test_minify_js_shrinks() {
        let source = "function add(first, second) {\n  // sum\n  return first + second;\n}\n";
        let out = minify_js(source).unwrap();
        assert!(out.len() < source.len());
        assert!(!out.contains("// sum"));
    }

    #[test]
    fn test_minify_js_module_syntax() {
        let out = minify_js("export const answer = 40 + 2;\n").unwrap();
        assert!(out.contains("export"));
    }

    #[test]
    fn test_minify_js_syntax_error() {
        assert!(minify_js("function (").is_err());
    }

    #[test]
    fn test_registry_passes_unregistered_types() {
        let registry = MinifierRegistry::with_defaults();
        let raw = b"\x89PNG\r\n".to_vec();
        assert_eq!(registry.apply(types::PNG, raw.clone()).unwrap(), raw);
    }

    #[test]
    fn test_registry_rejects_invalid_utf8_script() {
        let registry = MinifierRegistry::with_defaults();
        let err = registry.apply(types::JAVASCRIPT, vec![0xff, 0xfe]).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_registry_custom_transform() {
        let mut registry = MinifierRegistry::empty();
        registry.register(
            "text/plain",
            |source: &[u8], _: &str| -> Result<Vec<u8>, MinifyError> {
                Ok(source.to_ascii_uppercase())
            },
        );
        assert!(registry.contains("text/plain"));
        assert!(!registry.contains(types::CSS));
        assert_eq!(registry.apply("text/plain", b"abc".to_vec()).unwrap(), b"ABC");
    }
}
