//! Shared fixtures for integration tests: SRU pages, OAI-PMH manifests and
//! wiremock mounts for a complete issue.

#![allow(dead_code)]

use std::path::Path;

use kb_harvester::download::md5_hex;
use kb_harvester::harvester::{HarvestConfig, Politeness};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PPN: &str = "832675288";

/// Harvest configuration against a mock server, without any pauses.
pub fn test_config(root: &Path, server: &MockServer) -> HarvestConfig {
    HarvestConfig::new(root)
        .with_politeness(Politeness::none())
        .with_sru_endpoint(format!("{}/sru/sru", server.uri()))
}

/// Manifest URL for an issue as the search service would list it.
pub fn manifest_url(server: &MockServer, issue_id: &str) -> String {
    format!("{}/mdo/oai?identifier=ddd:{issue_id}:mpeg21", server.uri())
}

/// An SRU response page with `total` hits listing `urls` from position `start`.
pub fn sru_page(total: u64, start: u64, urls: &[String]) -> String {
    let records: String = urls
        .iter()
        .zip(start..)
        .map(|(url, position)| {
            format!(
                "<srw:record><srw:recordSchema>ddd</srw:recordSchema><srw:recordPacking>xml</srw:recordPacking>\
                 <srw:recordData><ddd:metadataKey>{url}</ddd:metadataKey></srw:recordData>\
                 <srw:recordPosition>{position}</srw:recordPosition></srw:record>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<srw:searchRetrieveResponse xmlns:srw="http://www.loc.gov/zing/srw/" xmlns:ddd="http://www.kb.nl/ddd">
  <srw:version>1.2</srw:version>
  <srw:numberOfRecords>{total}</srw:numberOfRecords>
  <srw:records>{records}</srw:records>
</srw:searchRetrieveResponse>"#
    )
}

/// An OAI-PMH response carrying an embedded error.
pub fn oai_error(code: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2014-01-01T00:00:00Z</responseDate>
  <request verb="GetRecord">http://services.kb.nl/mdo/oai</request>
  <error code="{code}">Identifier not found</error>
</OAI-PMH>"#
    )
}

/// One binary declared by a fixture manifest.
#[derive(Debug, Clone)]
pub struct FixtureFile {
    pub filename: String,
    pub content: Vec<u8>,
}

impl FixtureFile {
    pub fn new(filename: impl Into<String>, content: &[u8]) -> Self {
        Self {
            filename: filename.into(),
            content: content.to_vec(),
        }
    }

    pub fn md5(&self) -> String {
        md5_hex(&self.content)
    }
}

/// Binaries of a one-page, one-article issue.
#[derive(Debug, Clone)]
pub struct IssueFixture {
    pub issue_id: String,
    pub image: FixtureFile,
    pub alto: FixtureFile,
    pub ocr: FixtureFile,
    pub pdf: Option<FixtureFile>,
}

impl IssueFixture {
    pub fn new(issue_id: &str) -> Self {
        Self {
            issue_id: issue_id.to_string(),
            image: FixtureFile::new(format!("{issue_id}_001.jp2"), b"JP2 page scan bytes"),
            alto: FixtureFile::new(format!("{issue_id}_001_alto.xml"), b"<alto>page text</alto>"),
            ocr: FixtureFile::new(format!("{issue_id}_a0001_ocr.xml"), b"<text>article</text>"),
            pdf: Some(FixtureFile::new(format!("{issue_id}.pdf"), b"%PDF-1.4 issue")),
        }
    }

    pub fn without_pdf(mut self) -> Self {
        self.pdf = None;
        self
    }

    pub fn files(&self) -> Vec<&FixtureFile> {
        let mut files = vec![&self.image, &self.alto, &self.ocr];
        files.extend(self.pdf.as_ref());
        files
    }

    fn file_url(&self, server: &MockServer, file: &FixtureFile) -> String {
        format!("{}/files/{}/{}", server.uri(), self.issue_id, file.filename)
    }

    fn resource(&self, server: &MockServer, file: &FixtureFile) -> String {
        format!(
            r#"<didl:Resource mimeType="application/octet-stream" ref="{}" dcx:md5_checksum="{}" dcx:filename="{}"/>"#,
            self.file_url(server, file),
            file.md5(),
            file.filename
        )
    }

    /// The full `GetRecord` response for this issue.
    pub fn record_xml(&self, server: &MockServer) -> String {
        self.record_xml_with_header(server, true)
    }

    /// Like [`IssueFixture::record_xml`], optionally without the OAI header.
    pub fn record_xml_with_header(&self, server: &MockServer, with_header: bool) -> String {
        let id = &self.issue_id;
        let header = if with_header {
            format!(
                "<header><identifier>DDD:ddd:{id}:mpeg21</identifier><datestamp>2011-05-01</datestamp><setSpec>DDD</setSpec></header>"
            )
        } else {
            String::new()
        };
        let pdf = self
            .pdf
            .as_ref()
            .map(|pdf| {
                format!(
                    r#"<didl:Component><didl:Descriptor><didl:Statement dc:type="role">pdf</didl:Statement></didl:Descriptor>{}</didl:Component>"#,
                    self.resource(server, pdf)
                )
            })
            .unwrap_or_default();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2014-01-01T00:00:00Z</responseDate>
  <GetRecord>
    <record>
      {header}
      <metadata>
        <didl:DIDL xmlns:didl="urn:mpeg:mpeg21:2002:02-DIDL-NS"
            xmlns:dc="http://purl.org/dc/elements/1.1/"
            xmlns:dcx="http://krait.kb.nl/coop/tel/handbook/telterms.html"
            xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
          <didl:Item>
            <didl:Descriptor><didl:Statement mimeType="text/xml">
              <dcx:recordIdentifier>ddd:{id}:mpeg21</dcx:recordIdentifier>
              <dc:identifier xsi:type="dcx:PPN">{ppn}</dc:identifier>
            </didl:Statement></didl:Descriptor>
            {pdf}
            <didl:Item>
              <didl:Descriptor><didl:Statement dc:type="role">page</didl:Statement></didl:Descriptor>
              <didl:Component>
                <didl:Descriptor><didl:Statement dc:type="role">image</didl:Statement></didl:Descriptor>
                {image}
              </didl:Component>
              <didl:Component>
                <didl:Descriptor><didl:Statement dc:type="role">alto</didl:Statement></didl:Descriptor>
                {alto}
              </didl:Component>
            </didl:Item>
            <didl:Item>
              <didl:Descriptor><didl:Statement dc:type="role">article</didl:Statement></didl:Descriptor>
              <didl:Component>
                <didl:Descriptor><didl:Statement dc:type="role">ocr</didl:Statement></didl:Descriptor>
                {ocr}
              </didl:Component>
            </didl:Item>
          </didl:Item>
        </didl:DIDL>
      </metadata>
    </record>
  </GetRecord>
</OAI-PMH>"#,
            ppn = PPN,
            image = self.resource(server, &self.image),
            alto = self.resource(server, &self.alto),
            ocr = self.resource(server, &self.ocr),
        )
    }

    /// Mounts the binaries of this issue.
    pub async fn mount_files(&self, server: &MockServer) {
        for file in self.files() {
            Mock::given(method("GET"))
                .and(path(format!("/files/{}/{}", self.issue_id, file.filename)))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(file.content.clone()))
                .mount(server)
                .await;
        }
    }
}

/// Mounts a manifest response for `issue_id` under the un-keyed OAI path.
pub async fn mount_manifest(server: &MockServer, issue_id: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/mdo/oai"))
        .and(query_param("identifier", format!("ddd:{issue_id}:mpeg21")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}
