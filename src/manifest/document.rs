//! Parsed view of an OAI-PMH `GetRecord` response wrapping a DIDL manifest.

use roxmltree::{Document, Node};

use super::ManifestError;
use super::parser::{IssueAssets, IssueIdentity, issue_assets, issue_identity};
use crate::xml::{NS_DIDL, NS_OAI, descendant, standalone_fragment, text_of};

/// A parsed manifest borrowing the raw response text.
///
/// Holds either an embedded OAI-PMH error or a header plus DIDL tree. Only
/// the raw text is ever persisted.
#[derive(Debug)]
pub struct Manifest<'input> {
    doc: Document<'input>,
}

impl<'input> Manifest<'input> {
    /// Parses a raw response body.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Malformed`] when the body is not well-formed XML.
    pub fn parse(raw: &'input str) -> Result<Self, ManifestError> {
        let doc = Document::parse(raw).map_err(|e| ManifestError::Malformed {
            reason: e.to_string(),
        })?;
        Ok(Self { doc })
    }

    /// Returns the embedded OAI-PMH error code, if the response carries one.
    ///
    /// Falls back to the element text, then to `unknown`, when the `code`
    /// attribute is absent.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        let error = descendant(self.doc.root_element(), NS_OAI, "error")?;
        Some(
            error
                .attribute("code")
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .or_else(|| text_of(error))
                .unwrap_or("unknown"),
        )
    }

    /// Returns the `oai:header` element.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Incomplete`] when the header is absent.
    pub fn header(&self) -> Result<Node<'_, 'input>, ManifestError> {
        descendant(self.doc.root_element(), NS_OAI, "header")
            .ok_or_else(|| ManifestError::incomplete("OAI header"))
    }

    /// Returns the `didl:DIDL` element.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Incomplete`] when the DIDL tree is absent.
    pub fn didl(&self) -> Result<Node<'_, 'input>, ManifestError> {
        descendant(self.doc.root_element(), NS_DIDL, "DIDL")
            .ok_or_else(|| ManifestError::incomplete("DIDL metadata"))
    }

    /// Returns the OAI header as a standalone XML document.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Incomplete`] when the header is absent.
    pub fn header_xml(&self) -> Result<String, ManifestError> {
        self.header().map(standalone_fragment)
    }

    /// Returns the DIDL tree as a standalone XML document.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Incomplete`] when the DIDL tree is absent.
    pub fn didl_xml(&self) -> Result<String, ManifestError> {
        self.didl().map(standalone_fragment)
    }

    /// Derives the issue identity.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Incomplete`] when the header, the DIDL tree or
    /// an identifier is missing.
    pub fn identity(&self) -> Result<IssueIdentity, ManifestError> {
        self.header()?;
        issue_identity(self.didl()?)
    }

    /// Classifies the declared assets.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Incomplete`] when the DIDL tree is absent.
    pub fn assets(&self) -> Result<IssueAssets, ManifestError> {
        Ok(issue_assets(self.didl()?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const RECORD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2014-01-01T00:00:00Z</responseDate>
  <GetRecord>
    <record>
      <header>
        <identifier>DDD:ddd:010097934:mpeg21</identifier>
        <datestamp>2011-05-01</datestamp>
      </header>
      <metadata>
        <didl:DIDL xmlns:didl="urn:mpeg:mpeg21:2002:02-DIDL-NS"
            xmlns:dc="http://purl.org/dc/elements/1.1/"
            xmlns:dcx="http://krait.kb.nl/coop/tel/handbook/telterms.html"
            xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
          <didl:Item>
            <didl:Descriptor><didl:Statement>
              <dcx:recordIdentifier>ddd:010097934:mpeg21</dcx:recordIdentifier>
              <dc:identifier xsi:type="dcx:PPN">832675288</dc:identifier>
            </didl:Statement></didl:Descriptor>
          </didl:Item>
        </didl:DIDL>
      </metadata>
    </record>
  </GetRecord>
</OAI-PMH>"#;

    const ERROR: &str = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2014-01-01T00:00:00Z</responseDate>
  <error code="idDoesNotExist">No matching identifier</error>
</OAI-PMH>"#;

    #[test]
    fn test_manifest_exposes_identity_and_no_error() {
        let manifest = Manifest::parse(RECORD).unwrap();
        assert_eq!(manifest.error_code(), None);
        let identity = manifest.identity().unwrap();
        assert_eq!(identity.issue_id, "010097934");
        assert_eq!(identity.newspaper_ppn, "832675288");
    }

    #[test]
    fn test_manifest_error_code() {
        let manifest = Manifest::parse(ERROR).unwrap();
        assert_eq!(manifest.error_code(), Some("idDoesNotExist"));
    }

    #[test]
    fn test_manifest_error_without_code_attribute_uses_text() {
        let source = ERROR.replace(r#" code="idDoesNotExist""#, "");
        let manifest = Manifest::parse(&source).unwrap();
        assert_eq!(manifest.error_code(), Some("No matching identifier"));
    }

    #[test]
    fn test_header_xml_is_standalone_and_in_oai_namespace() {
        let manifest = Manifest::parse(RECORD).unwrap();
        let header = manifest.header_xml().unwrap();
        let reparsed = Document::parse(&header).unwrap();
        assert!(reparsed.root_element().has_tag_name((NS_OAI, "header")));
        assert!(header.contains("DDD:ddd:010097934:mpeg21"));
    }

    #[test]
    fn test_didl_xml_is_standalone() {
        let manifest = Manifest::parse(RECORD).unwrap();
        let didl = manifest.didl_xml().unwrap();
        let reparsed = Document::parse(&didl).unwrap();
        assert!(reparsed.root_element().has_tag_name((NS_DIDL, "DIDL")));
        let identity = issue_identity(reparsed.root_element()).unwrap();
        assert_eq!(identity.issue_id, "010097934");
    }

    #[test]
    fn test_missing_header_is_incomplete() {
        let start = RECORD.find("<header>").unwrap();
        let end = RECORD.find("</header>").unwrap() + "</header>".len();
        let truncated = format!("{}{}", &RECORD[..start], &RECORD[end..]);
        let manifest = Manifest::parse(&truncated).unwrap();

        let err = manifest.identity().unwrap_err();
        assert!(matches!(err, ManifestError::Incomplete { ref missing } if missing == "OAI header"));
        assert!(manifest.header_xml().is_err());
    }

    #[test]
    fn test_truncated_document_is_malformed() {
        let err = Manifest::parse(&RECORD[..RECORD.len() / 2]).unwrap_err();
        assert!(err.is_completeness());
        assert!(matches!(err, ManifestError::Malformed { .. }));
    }
}
