use crate::comments::format_comment;
use crate::error::SnippetError;
use crate::indent::{IndentChar, leading_runs, normalize_indent, rewrite_leading_runs};

/// Text placed inside the comment template between two regions.
pub const OMITTED_MARKER: &str = "code omitted";

/// The text inserted between two consecutive regions.
pub fn separator(comment_template: &str) -> String {
    format!(
        "\n\n{}\n\n",
        format_comment(comment_template, OMITTED_MARKER)
    )
}

/// Shortest leading run across every non-blank line of every block.
///
/// `None` when no block has a single non-blank line.
pub fn min_indent<S: AsRef<str>>(blocks: &[S]) -> Option<usize> {
    blocks
        .iter()
        .flat_map(|block| leading_runs(block.as_ref()))
        .map(str::len)
        .min()
}

/// Strip the indentation shared by all blocks from each of them.
///
/// Blank lines neither count towards the shared indentation nor get trimmed.
pub fn trim_indent<S: AsRef<str>>(blocks: &[S]) -> Vec<String> {
    let Some(min) = min_indent(blocks) else {
        return blocks.iter().map(|b| b.as_ref().to_string()).collect();
    };

    blocks
        .iter()
        .map(|block| {
            rewrite_leading_runs(block.as_ref(), |run| {
                // Runs are tab/space only, so byte slicing stays on char boundaries.
                if run.len() >= min {
                    run[min..].to_string()
                } else {
                    run.to_string()
                }
            })
            .into_owned()
        })
        .collect()
}

/// Build one snippet out of the selected regions.
///
/// Each region is normalized to `indent`, the indentation common to all of
/// them is removed, and consecutive regions are joined with
/// `comment_template` filled with "code omitted". A single region is returned
/// without any separator.
pub fn extract_snippet<S: AsRef<str>>(
    blocks: &[S],
    indent: IndentChar,
    tab_size: usize,
    comment_template: &str,
) -> Result<String, SnippetError> {
    let normalized = blocks
        .iter()
        .map(|block| normalize_indent(block.as_ref(), indent, tab_size))
        .collect::<Result<Vec<_>, _>>()?;

    let trimmed = trim_indent(&normalized);
    let separator = separator(comment_template);

    Ok(trimmed.join(separator.as_str()))
}
