//! Plain-text stand-in served when the PDF pipeline is unavailable.
//!
//! Never fails and never touches the browser.

use chrono::{DateTime, Utc};

use crate::document::{DocumentId, TextArtifact};

/// Attachment name for the text export of `id`.
pub fn fallback_file_name(id: &DocumentId) -> String {
    format!("invoice-{id}-text.txt")
}

/// Builds the text export for `id`, stamped with `exported_at`.
pub fn render_text_fallback(id: &DocumentId, exported_at: DateTime<Utc>) -> TextArtifact {
    let title = "INVOICE EXPORT (TEXT FALLBACK)";
    let stamp = exported_at.format("%Y-%m-%d at %H:%M:%S UTC");

    let body = format!(
        "{title}\n\
         {rule}\n\
         \n\
         Invoice ID: {id}\n\
         Exported on: {stamp}\n\
         \n\
         PDF rendering is temporarily unavailable, so this is a plain-text\n\
         placeholder for your invoice. Please try the PDF download again later.\n\
         \n\
         To print or save this invoice from your browser instead:\n\
         1. Open your Invoices list\n\
         2. Click the Print icon next to this invoice\n\
         3. Press Ctrl+P (Windows/Linux) or Cmd+P (macOS)\n\
         4. Choose \"Save as PDF\" as the destination\n\
         \n\
         Thank you for your patience.\n",
        rule = "=".repeat(title.len()),
    );

    TextArtifact {
        file_name: fallback_file_name(id),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn id(raw: &str) -> DocumentId {
        DocumentId::parse(Some(raw)).unwrap()
    }

    #[test]
    fn test_file_name() {
        assert_eq!(fallback_file_name(&id("inv-42")), "invoice-inv-42-text.txt");
    }

    #[test]
    fn test_body_mentions_id_and_instructions() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        let text = render_text_fallback(&id("inv-42"), at);

        assert_eq!(text.file_name, "invoice-inv-42-text.txt");
        assert!(text.body.starts_with("INVOICE EXPORT (TEXT FALLBACK)\n======"));
        assert!(text.body.contains("Invoice ID: inv-42"));
        assert!(text.body.contains("Exported on: 2024-03-05 at 14:30:00 UTC"));
        assert!(text.body.contains("Ctrl+P"));
        assert!(text.body.contains("Save as PDF"));
    }
}
