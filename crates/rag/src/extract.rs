//! Text extraction from uploaded documents.
//!
//! The format is chosen from the file extension (case-insensitive):
//! `.txt` / `.md` are read as UTF-8 (invalid bytes replaced), `.html` /
//! `.htm` are converted to text with scripts and styles skipped, `.pdf`
//! goes through `pdf-extract`, and `.docx` is read from `word/document.xml`
//! inside the ZIP container. PDF and DOCX parsing is CPU-bound and runs on
//! the blocking pool.

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use ragdock_core::error::{Error, Result};
use tracing::debug;

use crate::text::split_paragraphs;

/// A document format the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Markdown,
    Html,
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Pick the format from a file name's extension.
    pub fn from_filename(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "txt" => Ok(Self::PlainText),
            "md" => Ok(Self::Markdown),
            "html" | "htm" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(Error::UnsupportedInputFormat(name.to_string())),
        }
    }

    fn is_blocking(self) -> bool {
        matches!(self, Self::Pdf | Self::Docx)
    }
}

/// Extract plain text from the bytes of the file called `name`.
pub async fn extract_text(name: &str, bytes: Vec<u8>) -> Result<String> {
    let format = DocumentFormat::from_filename(name)?;
    debug!(file = %name, ?format, bytes = bytes.len(), "Extracting text");

    if !format.is_blocking() {
        return extract_sync(format, name, &bytes);
    }

    let owned_name = name.to_string();
    tokio::task::spawn_blocking(move || extract_sync(format, &owned_name, &bytes))
        .await
        .map_err(|e| Error::Extraction {
            file: name.to_string(),
            reason: format!("extractor crashed: {e}"),
        })?
}

fn extract_sync(format: DocumentFormat, name: &str, bytes: &[u8]) -> Result<String> {
    let failed = |reason: String| Error::Extraction {
        file: name.to_string(),
        reason,
    };

    match format {
        DocumentFormat::PlainText | DocumentFormat::Markdown => {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
        DocumentFormat::Html => html_to_text(bytes).map_err(failed),
        DocumentFormat::Pdf => pdf_to_text(bytes).map_err(failed),
        DocumentFormat::Docx => docx_to_text(bytes).map_err(failed),
    }
}

fn html_to_text(bytes: &[u8]) -> std::result::Result<String, String> {
    let html = String::from_utf8_lossy(bytes);
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "head"])
        .build();
    converter
        .convert(&html)
        .map_err(|e| format!("HTML conversion failed: {e}"))
}

fn pdf_to_text(bytes: &[u8]) -> std::result::Result<String, String> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| format!("Failed to extract PDF text: {e}"))?;

    // pdf-extract separates pages with form feeds
    let pages: Vec<String> = text
        .split('\x0c')
        .map(|page| split_paragraphs(page).join("\n\n"))
        .filter(|page| !page.is_empty())
        .collect();
    Ok(pages.join("\n\n"))
}

fn docx_to_text(bytes: &[u8]) -> std::result::Result<String, String> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| format!("Failed to read DOCX as ZIP: {e}"))?;

    let mut doc_xml = String::new();
    {
        let mut doc_entry = archive
            .by_name("word/document.xml")
            .map_err(|_| "Invalid DOCX: missing word/document.xml".to_string())?;
        doc_entry
            .read_to_string(&mut doc_xml)
            .map_err(|e| format!("Failed to read document.xml: {e}"))?;
    }

    // Text lives in <w:t> runs inside <w:p> paragraphs
    let mut reader = quick_xml::Reader::from_str(&doc_xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut paragraph_text = String::new();
    let mut in_text_element = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"p" => paragraph_text.clear(),
                b"t" => in_text_element = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                // <w:p/> is an empty paragraph
                if e.local_name().as_ref() == b"p" {
                    paragraphs.push(String::new());
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(std::mem::take(&mut paragraph_text)),
                b"t" => in_text_element = false,
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if in_text_element {
                    if let Ok(text) = e.unescape() {
                        paragraph_text.push_str(&text);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error: {e}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("word/document.xml", options).unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn format_from_extension_is_case_insensitive() {
        assert_eq!(
            DocumentFormat::from_filename("NOTES.TXT").unwrap(),
            DocumentFormat::PlainText
        );
        assert_eq!(
            DocumentFormat::from_filename("readme.md").unwrap(),
            DocumentFormat::Markdown
        );
        assert_eq!(
            DocumentFormat::from_filename("page.HTM").unwrap(),
            DocumentFormat::Html
        );
        assert_eq!(
            DocumentFormat::from_filename("paper.Pdf").unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_filename("report.docx").unwrap(),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn unknown_or_missing_extension_rejected() {
        for name in ["setup.exe", "archive.tar.gz", "Makefile", "upload"] {
            assert!(matches!(
                DocumentFormat::from_filename(name),
                Err(Error::UnsupportedInputFormat(_))
            ));
        }
    }

    #[tokio::test]
    async fn plain_text_is_lossy_utf8() {
        let text = extract_text("a.txt", b"caf\xc3\xa9 \xff ok".to_vec())
            .await
            .unwrap();
        assert!(text.starts_with("café"));
        assert!(text.ends_with("ok"));
    }

    #[tokio::test]
    async fn html_skips_scripts_and_styles() {
        let html = br#"<html><head><style>body{color:red}</style></head>
            <body><h1>Title</h1><p>Visible paragraph.</p>
            <script>alert('hidden')</script></body></html>"#;
        let text = extract_text("page.html", html.to_vec()).await.unwrap();
        assert!(text.contains("Title"));
        assert!(text.contains("Visible paragraph."));
        assert!(!text.contains("alert"));
        assert!(!text.contains("color:red"));
    }

    #[tokio::test]
    async fn docx_paragraphs_are_line_separated() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p>
    <w:p><w:r><w:t>Second &amp; last</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
        let text = extract_text("doc.docx", docx_bytes(xml)).await.unwrap();
        assert_eq!(text, "Hello world\nSecond & last");
    }

    #[tokio::test]
    async fn corrupt_docx_is_extraction_error() {
        let err = extract_text("broken.docx", b"not a zip".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[tokio::test]
    async fn corrupt_pdf_is_extraction_error() {
        let err = extract_text("broken.pdf", b"%PDF-nonsense".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }
}
