//! Loaded document handle

use bytes::Bytes;
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::PdfFetchError;
use crate::source::SourceUrl;

/// US Letter, used when a page tree carries no MediaBox
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// A parsed PDF together with the bytes and URL it came from
#[derive(Debug)]
pub struct PdfDocument {
    doc: Document,
    bytes: Bytes,
    source: SourceUrl,
}

impl PdfDocument {
    /// Parse fetched bytes
    ///
    /// Bytes that don't open with the `%PDF-` header are rejected without
    /// handing them to lopdf (an HTML error page served with a 200 is the
    /// usual culprit).
    pub fn from_bytes(bytes: Bytes, source: SourceUrl) -> Result<Self, PdfFetchError> {
        if !has_pdf_header(&bytes) {
            return Err(PdfFetchError::Parse(format!(
                "Invalid file header: response from {} is not a PDF",
                source
            )));
        }

        let doc = Document::load_mem(&bytes)?;
        Ok(Self { doc, bytes, source })
    }

    /// Get the raw bytes the document was parsed from
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// URL the document was fetched from
    pub fn source(&self) -> &SourceUrl {
        &self.source
    }

    /// PDF version from the header, e.g. "1.7"
    pub fn version(&self) -> &str {
        &self.doc.version
    }

    /// Get the number of pages
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Borrow the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.doc
    }

    /// Take ownership of the underlying lopdf document
    pub fn into_inner(self) -> Document {
        self.doc
    }

    /// `/Title` from the trailer's `/Info` dictionary, if present
    pub fn title(&self) -> Option<String> {
        self.info_string(b"Title")
    }

    /// `/Author` from the trailer's `/Info` dictionary, if present
    pub fn author(&self) -> Option<String> {
        self.info_string(b"Author")
    }

    /// Page dimensions (MediaBox) as [x, y, width, height], 1-indexed
    pub fn page_dimensions(&self, page_num: u32) -> Result<[f64; 4], PdfFetchError> {
        let page_id = self
            .page_id(page_num)
            .ok_or_else(|| PdfFetchError::Parse(format!("Page {} not found", page_num)))?;

        let page = self.doc.get_object(page_id)?;
        let page_dict = page
            .as_dict()
            .map_err(|_| PdfFetchError::Parse("Page is not a dictionary".into()))?;

        self.media_box(page_dict)
    }

    /// Get page object ID for a given page number (1-indexed)
    fn page_id(&self, page_num: u32) -> Option<ObjectId> {
        self.doc.get_pages().get(&page_num).copied()
    }

    /// MediaBox is inheritable, so walk up the page tree until one is found
    fn media_box(&self, page_dict: &Dictionary) -> Result<[f64; 4], PdfFetchError> {
        let mut current = page_dict;
        // Bound the walk in case of a cyclic /Parent chain
        for _ in 0..32 {
            if let Ok(media_box) = current.get(b"MediaBox") {
                return self.parse_rect(media_box);
            }

            let parent = current
                .get(b"Parent")
                .and_then(Object::as_reference)
                .and_then(|id| self.doc.get_object(id))
                .and_then(Object::as_dict);

            match parent {
                Ok(dict) => current = dict,
                Err(_) => break,
            }
        }

        Ok(DEFAULT_MEDIA_BOX)
    }

    /// Parse a PDF rectangle array into [x, y, width, height]
    fn parse_rect(&self, obj: &Object) -> Result<[f64; 4], PdfFetchError> {
        let arr = self
            .resolve(obj)?
            .as_array()
            .map_err(|_| PdfFetchError::Parse("MediaBox is not an array".into()))?;

        if arr.len() != 4 {
            return Err(PdfFetchError::Parse(format!(
                "MediaBox has {} elements, expected 4",
                arr.len()
            )));
        }

        let mut values = [0.0f64; 4];
        for (i, obj) in arr.iter().enumerate() {
            values[i] = self.extract_number(obj)?;
        }

        Ok([
            values[0],
            values[1],
            values[2] - values[0],
            values[3] - values[1],
        ])
    }

    /// Extract a number from a PDF object, following one reference
    fn extract_number(&self, obj: &Object) -> Result<f64, PdfFetchError> {
        match self.resolve(obj)? {
            Object::Integer(i) => Ok(*i as f64),
            Object::Real(r) => Ok(*r as f64),
            _ => Err(PdfFetchError::Parse("Expected number in rectangle".into())),
        }
    }

    /// Follow an indirect reference; direct objects are returned as-is
    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object, PdfFetchError> {
        match obj {
            Object::Reference(id) => Ok(self.doc.get_object(*id)?),
            other => Ok(other),
        }
    }

    /// Look up a text entry in the `/Info` dictionary
    fn info_string(&self, key: &[u8]) -> Option<String> {
        let info = self.resolve(self.doc.trailer.get(b"Info").ok()?).ok()?;
        let value = self.resolve(info.as_dict().ok()?.get(key).ok()?).ok()?;
        match value {
            Object::String(raw, _) => Some(decode_text(raw)),
            _ => None,
        }
    }
}

/// Whether the bytes open with `%PDF-`, ignoring leading whitespace
fn has_pdf_header(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(b"%PDF-")
}

/// Decode a PDF text string
///
/// Strings starting with the UTF-16BE byte order mark are decoded as
/// UTF-16. Everything else is PDFDocEncoding, which matches Latin-1 except
/// for 0x18-0x1F, 0x80-0x9F and 0xA0 (mapped by [`pdf_doc_char`]).
fn decode_text(raw: &[u8]) -> String {
    if let Some(utf16) = raw.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    raw.iter().map(|&b| pdf_doc_char(b)).collect()
}

/// Map one PDFDocEncoding byte to its Unicode character
fn pdf_doc_char(byte: u8) -> char {
    let code = match byte {
        0x18 => 0x02D8, // breve
        0x19 => 0x02C7, // caron
        0x1A => 0x02C6, // circumflex
        0x1B => 0x02D9, // dot above
        0x1C => 0x02DD, // double acute
        0x1D => 0x02DB, // ogonek
        0x1E => 0x02DA, // ring
        0x1F => 0x02DC, // small tilde
        0x80 => 0x2022, // bullet
        0x81 => 0x2020, // dagger
        0x82 => 0x2021, // double dagger
        0x83 => 0x2026, // ellipsis
        0x84 => 0x2014, // em dash
        0x85 => 0x2013, // en dash
        0x86 => 0x0192, // florin
        0x87 => 0x2044, // fraction slash
        0x88 => 0x2039, // single left angle quote
        0x89 => 0x203A, // single right angle quote
        0x8A => 0x2212, // minus
        0x8B => 0x2030, // per mille
        0x8C => 0x201E, // low double quote
        0x8D => 0x201C, // left double quote
        0x8E => 0x201D, // right double quote
        0x8F => 0x2018, // left single quote
        0x90 => 0x2019, // right single quote
        0x91 => 0x201A, // low single quote
        0x92 => 0x2122, // trademark
        0x93 => 0xFB01, // fi ligature
        0x94 => 0xFB02, // fl ligature
        0x95 => 0x0141, // L stroke
        0x96 => 0x0152, // OE
        0x97 => 0x0160, // S caron
        0x98 => 0x0178, // Y diaeresis
        0x99 => 0x017D, // Z caron
        0x9A => 0x0131, // dotless i
        0x9B => 0x0142, // l stroke
        0x9C => 0x0153, // oe
        0x9D => 0x0161, // s caron
        0x9E => 0x017E, // z caron
        0x9F => 0xFFFD, // undefined
        0xA0 => 0x20AC, // euro
        other => other as u32,
    };
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}


#[cfg(test)]
mod tests {
    use super::test_support::create_test_pdf;
    use super::*;
    use pretty_assertions::assert_eq;

    fn source() -> SourceUrl {
        SourceUrl::parse("https://example.com/test.pdf").unwrap()
    }

    #[test]
    fn test_from_bytes_valid_pdf() {
        let pdf = PdfDocument::from_bytes(create_test_pdf(3, Some("Lease")).into(), source())
            .unwrap();
        assert_eq!(pdf.page_count(), 3);
        assert_eq!(pdf.version(), "1.7");
        assert_eq!(pdf.title().as_deref(), Some("Lease"));
        assert_eq!(pdf.author().as_deref(), Some("Records Office"));
        assert_eq!(pdf.source(), &source());
        assert!(pdf.bytes().starts_with(b"%PDF-1.7"));
    }

    #[test]
    fn test_missing_info_yields_none() {
        let pdf = PdfDocument::from_bytes(create_test_pdf(1, None).into(), source()).unwrap();
        assert_eq!(pdf.title(), None);
        assert_eq!(pdf.author(), None);
    }

    #[test]
    fn test_page_dimensions_inherited_from_parent() {
        let pdf = PdfDocument::from_bytes(create_test_pdf(2, None).into(), source()).unwrap();
        assert_eq!(pdf.page_dimensions(1).unwrap(), [0.0, 0.0, 595.0, 842.0]);
        assert!(pdf.page_dimensions(9).unwrap_err().is_parse());
    }

    #[test]
    fn test_from_bytes_html_fails_with_invalid_header() {
        // Servers that fall back to an HTML page must not be treated as PDFs
        let html = b"<!DOCTYPE html><html><body>Not a PDF</body></html>";
        let err = PdfDocument::from_bytes(Bytes::from_static(html), source()).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("Invalid file header"));
    }

    #[test]
    fn test_from_bytes_empty_fails() {
        let err = PdfDocument::from_bytes(Bytes::new(), source()).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_truncated_pdf_fails_in_library() {
        let err = PdfDocument::from_bytes(Bytes::from_static(b"%PDF-1.7\n%garbage"), source())
            .unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_header_after_whitespace() {
        assert!(has_pdf_header(b"\r\n  %PDF-1.4"));
        assert!(!has_pdf_header(b"   "));
        assert!(!has_pdf_header(b"PK\x03\x04"));
    }

    #[test]
    fn test_decode_text_utf16() {
        let raw = [0xFE, 0xFF, 0x00, b'H', 0x00, b'i'];
        assert_eq!(decode_text(&raw), "Hi");
        assert_eq!(decode_text(b"Plain"), "Plain");
    }

    #[test]
    fn test_decode_text_pdf_doc_encoding() {
        // 0x84 em dash, 0x92 trademark, 0xA0 euro, 0xE9 e-acute (Latin-1 range)
        let raw = [b'A', 0x84, b'B', 0x92, 0xA0, 0xE9];
        assert_eq!(decode_text(&raw), "A\u{2014}B\u{2122}\u{20AC}\u{E9}");
    }

    #[test]
    fn test_extract_number() {
        let pdf = PdfDocument::from_bytes(create_test_pdf(1, None).into(), source()).unwrap();
        assert_eq!(pdf.extract_number(&Object::Integer(42)).unwrap(), 42.0);
        assert!((pdf.extract_number(&Object::Real(1.25)).unwrap() - 1.25).abs() < 0.001);
        assert!(pdf.extract_number(&Object::Null).is_err());
    }
}
