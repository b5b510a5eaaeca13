// src/graph/types.rs
//! Slices of the Microsoft Graph resources we read. Only the fields the
//! sweeps need are modelled; everything else in the payload is ignored.

use serde::{Deserialize, Deserializer};

/// `null` and a missing field both mean "empty".
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// One page of a Graph collection response.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Collection<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Site {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: Some(display_name.into()),
            name: None,
        }
    }

    /// Display name, else the URL name, else the id.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePage {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Only present when fetched with `$expand=canvasLayout`.
    #[serde(default)]
    pub canvas_layout: Option<CanvasLayout>,
}

impl SitePage {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            canvas_layout: None,
        }
    }

    pub fn with_layout(mut self, layout: CanvasLayout) -> Self {
        self.canvas_layout = Some(layout);
        self
    }

    /// Web parts in reading order: horizontal sections, their columns,
    /// then the vertical section.
    pub fn web_parts(&self) -> impl Iterator<Item = &WebPart> {
        let layout = self.canvas_layout.as_ref();
        let horizontal = layout
            .into_iter()
            .flat_map(|l| l.horizontal_sections.iter())
            .flat_map(|s| s.columns.iter())
            .flat_map(|c| c.webparts.iter());
        let vertical = layout
            .and_then(|l| l.vertical_section.as_ref())
            .into_iter()
            .flat_map(|v| v.webparts.iter());
        horizontal.chain(vertical)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasLayout {
    #[serde(default, deserialize_with = "null_as_default")]
    pub horizontal_sections: Vec<HorizontalSection>,
    #[serde(default)]
    pub vertical_section: Option<VerticalSection>,
}

impl CanvasLayout {
    /// One section with one column holding `parts`.
    pub fn single_column(parts: Vec<WebPart>) -> Self {
        Self {
            horizontal_sections: vec![HorizontalSection {
                columns: vec![SectionColumn { webparts: parts }],
            }],
            vertical_section: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HorizontalSection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub columns: Vec<SectionColumn>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SectionColumn {
    #[serde(default, deserialize_with = "null_as_default")]
    pub webparts: Vec<WebPart>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VerticalSection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub webparts: Vec<WebPart>,
}

const TEXT_WEB_PART: &str = "#microsoft.graph.textWebPart";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawWebPart")]
pub enum WebPart {
    Text { inner_html: String },
    Other { odata_type: Option<String> },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWebPart {
    #[serde(rename = "@odata.type", default)]
    odata_type: Option<String>,
    #[serde(default)]
    inner_html: Option<String>,
}

impl From<RawWebPart> for WebPart {
    fn from(raw: RawWebPart) -> Self {
        match raw.odata_type.as_deref() {
            Some(TEXT_WEB_PART) => WebPart::Text {
                inner_html: raw.inner_html.unwrap_or_default(),
            },
            _ => WebPart::Other {
                odata_type: raw.odata_type,
            },
        }
    }
}

impl WebPart {
    pub fn text(inner_html: impl Into<String>) -> Self {
        WebPart::Text {
            inner_html: inner_html.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drive {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Drive {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderFacet {
    #[serde(default)]
    pub child_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFacet {
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriveItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub folder: Option<FolderFacet>,
    #[serde(default)]
    pub file: Option<FileFacet>,
    /// Short-lived pre-authenticated URL; files only.
    #[serde(rename = "@microsoft.graph.downloadUrl", default)]
    pub download_url: Option<String>,
}

impl DriveItem {
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            folder: Some(FolderFacet::default()),
            file: None,
            download_url: None,
        }
    }

    pub fn file(id: impl Into<String>, name: impl Into<String>, download_url: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            folder: None,
            file: Some(FileFacet::default()),
            download_url: download_url.map(str::to_string),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_layout_flattens_in_reading_order() {
        let json = r##"{
            "id": "p1",
            "title": "Home",
            "canvasLayout": {
                "horizontalSections": [
                    {"columns": [
                        {"webparts": [
                            {"@odata.type": "#microsoft.graph.textWebPart", "innerHtml": "<p>a</p>"},
                            {"@odata.type": "#microsoft.graph.standardWebPart", "webPartType": "x"}
                        ]},
                        {"webparts": null}
                    ]},
                    {"columns": [
                        {"webparts": [{"@odata.type": "#microsoft.graph.textWebPart", "innerHtml": "<p>b</p>"}]}
                    ]}
                ],
                "verticalSection": {"webparts": [
                    {"@odata.type": "#microsoft.graph.textWebPart"}
                ]}
            }
        }"##;
        let page: SitePage = serde_json::from_str(json).unwrap();
        let parts: Vec<&WebPart> = page.web_parts().collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], &WebPart::text("<p>a</p>"));
        assert!(matches!(parts[1], WebPart::Other { .. }));
        assert_eq!(parts[2], &WebPart::text("<p>b</p>"));
        assert_eq!(parts[3], &WebPart::text(""));
    }

    #[test]
    fn drive_item_reads_download_url_annotation() {
        let json = r#"{
            "id": "i1",
            "name": "report.pdf",
            "file": {"mimeType": "application/pdf"},
            "@microsoft.graph.downloadUrl": "https://dl.test/i1"
        }"#;
        let item: DriveItem = serde_json::from_str(json).unwrap();
        assert!(!item.is_folder());
        assert_eq!(item.download_url.as_deref(), Some("https://dl.test/i1"));
    }

    #[test]
    fn collection_tolerates_missing_value() {
        let c: Collection<Drive> = serde_json::from_str(r#"{"@odata.nextLink": "n"}"#).unwrap();
        assert!(c.value.is_empty());
        assert_eq!(c.next_link.as_deref(), Some("n"));
    }
}
