//! Typed accessors over a DIDL metadata tree.
//!
//! Every function here is pure: it takes the `didl:DIDL` element and returns
//! owned values, so a missing part of the tree fails only the accessor that
//! needs it.

use roxmltree::Node;
use tracing::warn;

use super::ManifestError;
use crate::xml::{NS_DC, NS_DCX, NS_DIDL, NS_XSI, child, children, descendant, text_of};

const PPN_IDENTIFIER_TYPE: &str = "dcx:PPN";

/// Identifiers needed to store an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueIdentity {
    /// The full colon-delimited record identifier (`ddd:010097934:mpeg21`).
    pub record_identifier: String,
    /// Issue identifier: second segment of the record identifier.
    pub issue_id: String,
    /// PPN of the newspaper title this issue belongs to.
    pub newspaper_ppn: String,
}

/// What an asset is within an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetRole {
    /// Page scan.
    PageImage,
    /// ALTO text layer of a page.
    PageAlto,
    /// OCR text of an article.
    ArticleOcr,
    /// Whole-issue PDF.
    Pdf,
}

impl AssetRole {
    /// Returns a stable label for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PageImage => "page-image",
            Self::PageAlto => "page-alto",
            Self::ArticleOcr => "article-ocr",
            Self::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for AssetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One downloadable binary declared by a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// What the asset is.
    pub role: AssetRole,
    /// Resource URL.
    pub url: String,
    /// Expected MD5 digest (hex).
    pub md5: String,
    /// Filename to store the asset under.
    pub filename: String,
}

/// All assets of an issue, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueAssets {
    /// Page images and ALTO files; per page, images precede ALTO.
    pub pages: Vec<AssetDescriptor>,
    /// Article OCR texts.
    pub articles: Vec<AssetDescriptor>,
    /// The issue PDF, when the manifest has one.
    pub pdf: Option<AssetDescriptor>,
}

impl IssueAssets {
    /// Iterates over every asset: pages, then articles, then the PDF.
    pub fn iter(&self) -> impl Iterator<Item = &AssetDescriptor> {
        self.pages
            .iter()
            .chain(self.articles.iter())
            .chain(self.pdf.iter())
    }

    /// Returns the total number of assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len() + self.articles.len() + usize::from(self.pdf.is_some())
    }

    /// Returns true when the manifest declared no assets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts assets with the given role.
    #[must_use]
    pub fn count(&self, role: AssetRole) -> usize {
        self.iter().filter(|a| a.role == role).count()
    }
}

/// Derives the issue identity from the DIDL tree.
///
/// # Errors
///
/// Returns [`ManifestError::Incomplete`] when the record identifier or the
/// newspaper PPN is missing, or the record identifier has no second segment
/// usable as a directory name.
pub fn issue_identity(didl: Node<'_, '_>) -> Result<IssueIdentity, ManifestError> {
    let record_identifier = descendant(didl, NS_DCX, "recordIdentifier")
        .and_then(text_of)
        .ok_or_else(|| ManifestError::incomplete("dcx:recordIdentifier"))?;

    // The issue id names a directory under the data root.
    let issue_id = record_identifier
        .split(':')
        .nth(1)
        .map(str::trim)
        .filter(|segment| is_path_segment(segment))
        .ok_or_else(|| {
            ManifestError::incomplete(format!(
                "issue segment in record identifier '{record_identifier}'"
            ))
        })?;

    let newspaper_ppn = didl
        .descendants()
        .find(|n| {
            n.is_element()
                && n.has_tag_name((NS_DC, "identifier"))
                && n.attribute((NS_XSI, "type")) == Some(PPN_IDENTIFIER_TYPE)
        })
        .and_then(text_of)
        .ok_or_else(|| ManifestError::incomplete("dc:identifier of type dcx:PPN"))?;

    Ok(IssueIdentity {
        record_identifier: record_identifier.to_string(),
        issue_id: issue_id.to_string(),
        newspaper_ppn: newspaper_ppn.to_string(),
    })
}

fn is_path_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
}

/// Classifies the assets declared in the DIDL tree.
///
/// Asset nodes lacking a URL, digest or filename are logged and left out.
#[must_use]
pub fn issue_assets(didl: Node<'_, '_>) -> IssueAssets {
    let mut assets = IssueAssets::default();

    for item in nested_items(didl) {
        let Some(role) = role_statement(item) else {
            continue;
        };
        if role.starts_with("page") {
            let components: Vec<Node<'_, '_>> = children(item, NS_DIDL, "Component").collect();
            for (wanted, asset_role) in [("image", AssetRole::PageImage), ("alto", AssetRole::PageAlto)] {
                assets.pages.extend(
                    components
                        .iter()
                        .filter(|c| role_statement(**c) == Some(wanted))
                        .filter_map(|c| component_asset(*c, asset_role)),
                );
            }
        } else if role.starts_with("article") {
            assets.articles.extend(
                children(item, NS_DIDL, "Component")
                    .filter(|c| role_statement(*c) == Some("ocr"))
                    .filter_map(|c| component_asset(c, AssetRole::ArticleOcr)),
            );
        }
    }

    assets.pdf = pdf_resource(didl).and_then(|r| resource_asset(r, AssetRole::Pdf));
    assets
}

/// `DIDL/Item/Item`: the pages and articles of an issue.
fn nested_items<'a, 'input>(didl: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    children(didl, NS_DIDL, "Item").flat_map(|item| children(item, NS_DIDL, "Item"))
}

/// Text of the first `didl:Statement dc:type="role"` at or below `node`.
fn role_statement<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.descendants()
        .find(|n| {
            n.is_element()
                && n.has_tag_name((NS_DIDL, "Statement"))
                && n.attribute((NS_DC, "type")) == Some("role")
        })
        .and_then(text_of)
}

/// The `didl:Resource` beside the first descriptor stating `pdf`.
fn pdf_resource<'a, 'input>(didl: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    let descriptor = didl.descendants().find(|n| {
        n.is_element()
            && n.has_tag_name((NS_DIDL, "Descriptor"))
            && children(*n, NS_DIDL, "Statement").any(|s| text_of(s) == Some("pdf"))
    })?;
    child(descriptor.parent_element()?, NS_DIDL, "Resource")
}

fn component_asset(component: Node<'_, '_>, role: AssetRole) -> Option<AssetDescriptor> {
    let Some(resource) = child(component, NS_DIDL, "Resource") else {
        warn!(%role, "component has no didl:Resource; skipping");
        return None;
    };
    resource_asset(resource, role)
}

fn resource_asset(resource: Node<'_, '_>, role: AssetRole) -> Option<AssetDescriptor> {
    let url = resource.attribute("ref").map(str::trim).filter(|v| !v.is_empty());
    let md5 = resource
        .attribute((NS_DCX, "md5_checksum"))
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let filename = resource
        .attribute((NS_DCX, "filename"))
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (url, md5, filename) {
        (Some(url), Some(md5), Some(filename)) => Some(AssetDescriptor {
            role,
            url: url.to_string(),
            md5: md5.to_string(),
            filename: filename.to_string(),
        }),
        _ => {
            warn!(
                %role,
                has_url = url.is_some(),
                has_md5 = md5.is_some(),
                has_filename = filename.is_some(),
                "resource lacks ref, md5_checksum or filename; skipping"
            );
            None
        }
    }
}
