// src/prompt.rs

/// Wraps the document text in the fixed analysis instruction.
///
/// The text is interpolated as-is: no trimming, escaping or truncation.
pub fn build_prompt(document_text: &str) -> String {
    format!(
        "Professionally analyze the following legal document.\n\
         Identify key clauses, potential risks, and summarize the main obligations for each party involved.\n\
         \n\
         Document:\n\
         ---\n\
         {document_text}\n\
         ---\n\
         \n\
         Professional Analysis:\n"
    )
}
