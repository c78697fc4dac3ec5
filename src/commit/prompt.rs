//! Prompt construction for AI-generated commit messages.

/// Build the instruction sent to the model.
///
/// The diff is embedded verbatim after the instruction.
pub fn build_commit_prompt(language: &str, diff: &str) -> String {
    format!(
        "Write in {language}. Generate a detailed commit message based on the \
         following differences between the files. The first line of your \
         response must be the title:\n{diff}"
    )
}
