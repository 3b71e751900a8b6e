//! Options shared by the parsing pipeline.

/// Knobs for tokenization and tree construction.
///
/// Built with [`Default`] and the `with_*` methods:
///
/// ```
/// use wombat_common::ParseOptions;
///
/// let options = ParseOptions::default().with_parse_error_reporting(true);
/// assert!(options.report_parse_errors);
/// assert_eq!(options.fragment_context, "body");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Print parse errors through [`crate::warning::warn_once`].
    pub report_parse_errors: bool,
    /// [§ 13.2.6.4.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    /// "A start tag whose tag name is "noscript", if the scripting flag is enabled"
    ///
    /// When set, `noscript` content is raw text.
    pub scripting: bool,
    /// Local name of the context element used for fragment parsing when
    /// markup is set on a node that is not an element, such as a fragment.
    pub fragment_context: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            report_parse_errors: false,
            scripting: true,
            fragment_context: "body".to_string(),
        }
    }
}

impl ParseOptions {
    /// Enable or disable parse-error reporting.
    #[must_use]
    pub const fn with_parse_error_reporting(mut self, enabled: bool) -> Self {
        self.report_parse_errors = enabled;
        self
    }

    /// Set the scripting flag.
    #[must_use]
    pub const fn with_scripting(mut self, enabled: bool) -> Self {
        self.scripting = enabled;
        self
    }

    /// Set the fragment parsing context element. The name is lower-cased.
    #[must_use]
    pub fn with_fragment_context(mut self, local_name: &str) -> Self {
        self.fragment_context = local_name.to_ascii_lowercase();
        self
    }
}
