use crate::chunking::Chunk;

/// Review checklist appended to every chunk prompt
pub const CHUNK_ANALYSIS_INSTRUCTIONS: &str = r#"For these specific files, please provide:

1. File Structure Analysis
- Purpose of each file
- Dependencies and relationships
- Key functionality

2. Code Review
- Main components
- Code patterns used
- Potential issues

3. Optimization Opportunities
- Performance improvements
- Code structure enhancements
- Security considerations

4. If you find a good candidate for optimization, provide:
- Original code snippet
- Optimized version with comments
- Explanation of improvements

Focus on practical, actionable improvements.
Use markdown for formatting."#;

/// Report outline appended to the consolidation prompt
pub const CONSOLIDATION_INSTRUCTIONS: &str = r#"Provide a consolidated summary including:
1. Overall repository structure and purpose
2. Key findings across all files
3. Most important optimization opportunities
4. Best example of optimized code
5. Priority recommendations
6. Show one piece of code that can be optimized

Format using markdown for readability."#;

/// Returns at most the first `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Builds the review prompt for one chunk of files
pub fn chunk_analysis_prompt(repo_url: &str, chunk: &Chunk, preview_chars: usize) -> String {
    let file_list = chunk
        .keys()
        .map(|path| format!("- {}", path))
        .collect::<Vec<_>>()
        .join("\n");

    let file_contents = chunk
        .iter()
        .map(|(path, content)| {
            format!(
                "### {}\n```\n{}...\n```",
                path,
                truncate_chars(content.as_str(), preview_chars)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Analyzing part of GitHub Repository: {}\n\n\
         Analyzing the following files:\n{}\n\n\
         File Contents:\n{}\n\n{}",
        repo_url, file_list, file_contents, CHUNK_ANALYSIS_INSTRUCTIONS
    )
}

/// Builds the prompt that merges every chunk review into one report
pub fn consolidation_prompt(repo_url: &str, summaries: &[String]) -> String {
    format!(
        "Combine and summarize the following analyses of the GitHub repository {}:\n\n{}\n\n{}",
        repo_url,
        summaries.join("\n\n"),
        CONSOLIDATION_INSTRUCTIONS
    )
}
