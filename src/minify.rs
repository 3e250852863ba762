//! Text minifiers for the three source kinds.
//!
//! CSS and HTML are minified with a fixed sequence of regular-expression
//! substitutions. There is no tokenizer behind them, so content that relies on
//! the exact characters being rewritten can be damaged:
//!
//! - a CSS string such as `content: "a ; b"` loses the spaces around `;`
//! - an HTML `<pre>` or `<textarea>` loses its significant whitespace
//! - a `/* ... */` sequence inside a CSS string is treated as a comment
//!
//! JavaScript is handed to [`oxc`]: the source is parsed as a classic script
//! and printed back with the code generator's minify options. No compression
//! passes or name mangling run, so the output is the same program with
//! comments and layout whitespace removed.

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinifyError {
    #[error("JavaScript minifier failed: {0}")]
    Js(String),
}

static CSS_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static CSS_LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n\t]").unwrap());
static CSS_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([:;{}])\s*").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static HTML_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static HTML_BETWEEN_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s+<").unwrap());

/// Minify a stylesheet into a single line.
///
/// Steps, in order:
/// 1. drop `/* ... */` comments (non-greedy, across lines)
/// 2. drop every `\r`, `\n` and `\t`
/// 3. drop whitespace on either side of `:`, `;`, `{` and `}`
/// 4. collapse remaining whitespace runs to one space and trim
///
/// ```
/// assert_eq!(gz_bundle::minify::minify_css("a { color: red; }"), "a{color:red;}");
/// ```
pub fn minify_css(source: &str) -> String {
    let css = CSS_COMMENT.replace_all(source, "");
    let css = CSS_LINE_BREAKS.replace_all(&css, "");
    let css = CSS_PUNCTUATION.replace_all(&css, "$1");
    let css = WHITESPACE_RUN.replace_all(&css, " ");
    css.trim().to_string()
}

/// Minify a document that already carries its styles and scripts inline.
///
/// Steps, in order:
/// 1. drop `<!-- ... -->` comments (non-greedy, across lines)
/// 2. drop whitespace sitting directly between two tags
/// 3. collapse remaining whitespace runs to one space and trim
pub fn minify_html(source: &str) -> String {
    let html = HTML_COMMENT.replace_all(source, "");
    let html = HTML_BETWEEN_TAGS.replace_all(&html, "><");
    let html = WHITESPACE_RUN.replace_all(&html, " ");
    html.trim().to_string()
}

/// Minify a classic (non-module) script.
///
/// Fails with [`MinifyError::Js`] when the source does not parse; the error
/// carries every diagnostic the parser produced.
pub fn minify_js(source: &str) -> Result<String, MinifyError> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();

    if parsed.panicked || !parsed.errors.is_empty() {
        let diagnostics: Vec<String> = parsed.errors.iter().map(|e| e.to_string()).collect();
        let message = if diagnostics.is_empty() {
            "parser gave up on the input".to_string()
        } else {
            diagnostics.join("; ")
        };
        return Err(MinifyError::Js(message));
    }

    let code = Codegen::new()
        .with_options(CodegenOptions::minify())
        .build(&parsed.program)
        .code;
    Ok(code.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // CSS
    // =========================================================================

    #[test]
    fn css_collapses_punctuation_spacing() {
        assert_eq!(minify_css("a { color: red; }"), "a{color:red;}");
    }

    #[test]
    fn css_strips_block_comments() {
        let css = "/* header */\nbody { margin: 0; } /* trailing */";
        let out = minify_css(css);
        assert!(!out.contains("/*"));
        assert_eq!(out, "body{margin:0;}");
    }

    #[test]
    fn css_strips_multiline_comments() {
        let css = "/*\n * Theme\n * v2\n */\nh1 {\n\tfont-weight: bold;\n}\n";
        assert_eq!(minify_css(css), "h1{font-weight:bold;}");
    }

    #[test]
    fn css_comments_are_non_greedy() {
        let css = "/* a */ p { x: 1; } /* b */ q { y: 2; }";
        assert_eq!(minify_css(css), "p{x:1;}q{y:2;}");
    }

    #[test]
    fn css_has_no_line_breaks_or_tabs() {
        let css = "a,\r\nb {\r\n\tcolor:\tblue;\r\n}\r\n\r\n.c\t.d { top: 0 }";
        let out = minify_css(css);
        assert!(!out.contains('\n'));
        assert!(!out.contains('\r'));
        assert!(!out.contains('\t'));
    }

    #[test]
    fn css_keeps_single_space_between_selectors() {
        assert_eq!(
            minify_css(".nav    ul   li { margin : 0 auto ; }"),
            ".nav ul li{margin:0 auto;}"
        );
    }

    #[test]
    fn css_line_break_joins_tokens() {
        // Line breaks are removed outright, not replaced with a space.
        assert_eq!(minify_css("a\nb{top:0}"), "ab{top:0}");
    }

    #[test]
    fn css_mangles_punctuation_inside_strings() {
        assert_eq!(
            minify_css(r#"p::after { content: "a ; b"; }"#),
            r#"p::after{content:"a;b";}"#
        );
    }

    #[test]
    fn css_empty_input() {
        assert_eq!(minify_css(""), "");
        assert_eq!(minify_css("  \n\t  "), "");
    }

    // =========================================================================
    // HTML
    // =========================================================================

    #[test]
    fn html_collapses_whitespace_between_tags() {
        assert_eq!(minify_html("<div>  \n\t <p>Hi</p>  </div>"), "<div><p>Hi</p></div>");
    }

    #[test]
    fn html_strips_comments_across_lines() {
        let html = "<body>\n<!-- nav\n  goes here -->\n<nav></nav>\n</body>";
        assert_eq!(minify_html(html), "<body><nav></nav></body>");
    }

    #[test]
    fn html_comments_are_non_greedy() {
        let html = "<!-- a --><b>keep</b><!-- c -->";
        assert_eq!(minify_html(html), "<b>keep</b>");
    }

    #[test]
    fn html_collapses_text_whitespace_to_one_space() {
        assert_eq!(
            minify_html("<p>Hello    \n   world</p>"),
            "<p>Hello world</p>"
        );
    }

    #[test]
    fn html_trims_document() {
        assert_eq!(minify_html("\n\n  <html></html>  \n"), "<html></html>");
    }

    #[test]
    fn html_flattens_pre_blocks() {
        assert_eq!(
            minify_html("<pre>a\n    b</pre>"),
            "<pre>a b</pre>"
        );
    }

    // =========================================================================
    // JavaScript
    // =========================================================================

    #[test]
    fn js_strips_comments() {
        let js = "// setup\nvar x = 1; /* block */\nvar y = 2;\n";
        let out = minify_js(js).unwrap();
        assert!(!out.contains("setup"));
        assert!(!out.contains("block"));
        assert!(out.contains("x=1"));
        assert!(out.contains("y=2"));
    }

    #[test]
    fn js_removes_layout_whitespace() {
        let js = "function add(a, b) {\n    return a + b;\n}\n";
        let out = minify_js(js).unwrap();
        assert!(!out.contains('\n'));
        assert!(out.contains("function add(a,b)"));
    }

    #[test]
    fn js_keeps_string_contents() {
        let out = minify_js("var s = \"a  // not a comment\";").unwrap();
        assert!(out.contains("a  // not a comment"));
    }

    #[test]
    fn js_syntax_error_is_reported() {
        let err = minify_js("var = ;").unwrap_err();
        assert!(matches!(err, MinifyError::Js(_)));
        assert!(err.to_string().starts_with("JavaScript minifier failed"));
    }

    #[test]
    fn js_empty_input() {
        assert_eq!(minify_js("").unwrap(), "");
    }
}
