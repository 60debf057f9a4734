/// Comment template used when a language id is unknown (including "plain text").
pub const DEFAULT_COMMENT_TEMPLATE: &str = "# %s";

/// Language id reported when the host has no syntax configured.
pub const PLAIN_TEXT: &str = "plain text";

/// Comment templates and the language ids that use them.
///
/// Each template carries exactly one `%s` placeholder. Ids are lower-case and
/// matched exactly (after lower-casing the lookup key).
pub static COMMENT_STYLES: &[(&str, &[&str])] = &[
    (
        "// %s",
        &[
            "actionscript",
            "c#",
            "c++",
            "c",
            "d",
            "go",
            "java",
            "json",
            "javascript",
            "objective-c++",
            "objective-c",
            "pascal",
            "scala",
        ],
    ),
    (
        "# %s",
        &[
            "makefile",
            "php",
            "perl",
            "python",
            "r",
            "ruby on rails",
            "ruby",
            "shell-unix-generic",
            "tcl",
            "yaml",
        ],
    ),
    (
        "-- %s",
        &["applescript", "haskell", "literate haskell", "lua", "sql"],
    ),
    (
        "%% %s",
        &[
            "erlang",
            "bibtex",
            "latex beamer",
            "latex log",
            "latex memoir",
            "latex",
            "tex math",
            "tex",
            "matlab",
        ],
    ),
    ("; %s", &["clojure", "lisp"]),
    ("<!-- %s -->", &["html", "xml", "xsl"]),
    ("REM %s", &["batch file"]),
    ("/* %s */", &["css", "less", "sass"]),
    ("(* %s *)", &["ocaml", "ocamllex", "ocamlyacc", "camlp4"]),
];

/// Look up the comment template for a language id, case-insensitively.
///
/// Unknown ids fall back to [`DEFAULT_COMMENT_TEMPLATE`].
pub fn resolve_comment_template(language: &str) -> &'static str {
    let language = language.trim().to_lowercase();

    COMMENT_STYLES
        .iter()
        .find(|(_, languages)| languages.contains(&language.as_str()))
        .map(|(template, _)| *template)
        .unwrap_or(DEFAULT_COMMENT_TEMPLATE)
}

/// Render a comment template printf-style: `%s` takes `text`, `%%` is a literal `%`.
///
/// Any other `%` sequence is copied through untouched.
pub fn format_comment(template: &str, text: &str) -> String {
    let mut out = String::with_capacity(template.len() + text.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.peek() {
            Some('s') => {
                chars.next();
                out.push_str(text);
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }

    out
}

/// Derive a language id from an editor syntax setting such as
/// `Packages/Python/Python.tmLanguage`.
///
/// Takes the basename, drops the syntax-definition suffix and lower-cases the
/// rest. No syntax means [`PLAIN_TEXT`].
pub fn language_from_syntax(syntax: Option<&str>) -> String {
    let Some(syntax) = syntax else {
        return PLAIN_TEXT.to_string();
    };

    // Editor syntax paths always use '/', but accept '\' from hand-typed values.
    let base = syntax.rsplit(&['/', '\\'][..]).next().unwrap_or(syntax);
    let base = base
        .replace(".tmLanguage", "")
        .replace(".sublime-syntax", "");

    base.to_lowercase()
}

/// Map a file extension onto a language id from [`COMMENT_STYLES`].
///
/// Only extensions whose language has a table entry are known; everything else
/// returns `None` and ends up with the default template.
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();

    let language = match ext.as_str() {
        // Slash comments
        "as" => "actionscript",
        "cs" => "c#",
        "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => "c++",
        "c" | "h" => "c",
        "d" => "d",
        "go" => "go",
        "java" => "java",
        "json" => "json",
        "js" | "mjs" | "cjs" => "javascript",
        "mm" => "objective-c++",
        "m" => "objective-c",
        "pas" | "pp" => "pascal",
        "scala" | "sc" => "scala",
        // Hash comments
        "mk" | "mak" => "makefile",
        "php" => "php",
        "pl" | "pm" => "perl",
        "py" | "pyw" => "python",
        "r" => "r",
        "rb" | "rake" => "ruby",
        "sh" | "bash" | "zsh" => "shell-unix-generic",
        "tcl" => "tcl",
        "yaml" | "yml" => "yaml",
        // Double dash
        "applescript" => "applescript",
        "hs" => "haskell",
        "lhs" => "literate haskell",
        "lua" => "lua",
        "sql" => "sql",
        // Percent
        "erl" | "hrl" => "erlang",
        "bib" => "bibtex",
        "tex" | "sty" | "cls" => "latex",
        // Semicolon
        "clj" | "cljs" | "edn" => "clojure",
        "lisp" | "lsp" | "el" => "lisp",
        // Markup
        "html" | "htm" => "html",
        "xml" => "xml",
        "xsl" | "xslt" => "xsl",
        "bat" | "cmd" => "batch file",
        // Block comments
        "css" => "css",
        "less" => "less",
        "sass" | "scss" => "sass",
        "ml" | "mli" => "ocaml",
        "mll" => "ocamllex",
        "mly" => "ocamlyacc",
        _ => return None,
    };

    Some(language)
}
