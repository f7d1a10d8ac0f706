//! Bundle minification.
//!
//! Uses oxc for JavaScript and lightningcss for CSS.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::config::JsMinifyConfig;

/// Minify (and optionally mangle) JavaScript source code.
///
/// Parse errors are reported with their first diagnostic.
pub fn minify_js(source: &str, config: &JsMinifyConfig) -> Result<String, String> {
    let allocator = Allocator::default();
    let source_type = if config.module {
        SourceType::mjs()
    } else {
        SourceType::cjs()
    };

    let ret = Parser::new(&allocator, source, source_type).parse();
    if let Some(error) = ret.errors.first() {
        let more = ret.errors.len() - 1;
        return Err(match more {
            0 => error.to_string(),
            n => format!("{error} (and {n} more)"),
        });
    }

    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: config.mangle.then(MangleOptions::default),
        compress: config.compress.then(CompressOptions::smallest),
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
pub fn minify_css(source: &str) -> Result<String, String> {
    let mut stylesheet =
        StyleSheet::parse(source, ParserOptions::default()).map_err(|e| e.to_string())?;
    stylesheet
        .minify(MinifyOptions::default())
        .map_err(|e| e.to_string())?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;
    Ok(result.code)
}
