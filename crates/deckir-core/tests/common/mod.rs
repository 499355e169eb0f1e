//! In-memory `.pptx` fixtures: one theme, one master, one layout, any number of slides.
#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const NS_DECL: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_BASE: &str = "application/vnd.openxmlformats-officedocument.presentationml";

pub struct PptxBuilder {
    slides: Vec<String>,
    title: Option<String>,
    strict_namespace: bool,
    self_referencing_layout: bool,
}

impl PptxBuilder {
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            title: None,
            strict_namespace: false,
            self_referencing_layout: false,
        }
    }

    /// Adds a slide whose `p:spTree` holds `shapes` after the group header.
    pub fn slide(mut self, shapes: &str) -> Self {
        self.slides.push(shapes.to_string());
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Writes the presentation part in the Strict namespace.
    pub fn strict_namespace(mut self) -> Self {
        self.strict_namespace = true;
        self
    }

    /// Points the first slide's layout relationship back at the slide itself.
    pub fn self_referencing_layout(mut self) -> Self {
        self.self_referencing_layout = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let mut put = |name: &str, content: &str| {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };

        put("[Content_Types].xml", &self.content_types());
        put(
            "_rels/.rels",
            &rels(&[
                ("rId1", "officeDocument", "ppt/presentation.xml"),
                ("rId2", "metadata/core-properties", "docProps/core.xml"),
            ]),
        );
        put("docProps/core.xml", &self.core_properties());
        put("ppt/presentation.xml", &self.presentation());

        let mut presentation_rels = vec![("rId1".to_string(), "slideMaster", "slideMasters/slideMaster1.xml".to_string())];
        for i in 0..self.slides.len() {
            presentation_rels.push((format!("rId{}", i + 2), "slide", format!("slides/slide{}.xml", i + 1)));
        }
        let presentation_rels: Vec<(&str, &str, &str)> = presentation_rels
            .iter()
            .map(|(id, ty, target)| (id.as_str(), *ty, target.as_str()))
            .collect();
        put("ppt/_rels/presentation.xml.rels", &rels(&presentation_rels));

        put("ppt/theme/theme1.xml", THEME);
        put("ppt/slideMasters/slideMaster1.xml", &master());
        put(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            &rels(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "theme", "../theme/theme1.xml"),
            ]),
        );
        put("ppt/slideLayouts/slideLayout1.xml", &layout());
        put(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            &rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        );

        for (i, shapes) in self.slides.iter().enumerate() {
            put(&format!("ppt/slides/slide{}.xml", i + 1), &slide(shapes));
            let layout_target = if i == 0 && self.self_referencing_layout {
                "slide1.xml"
            } else {
                "../slideLayouts/slideLayout1.xml"
            };
            put(
                &format!("ppt/slides/_rels/slide{}.xml.rels", i + 1),
                &rels(&[("rId1", "slideLayout", layout_target)]),
            );
        }

        zip.finish().unwrap().into_inner()
    }

    fn content_types(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#,
        );
        let mut over = |part: &str, ty: &str| {
            xml.push_str(&format!(r#"<Override PartName="/{}" ContentType="{}"/>"#, part, ty));
        };
        over("ppt/presentation.xml", &format!("{}.presentation.main+xml", CT_BASE));
        over("ppt/slideMasters/slideMaster1.xml", &format!("{}.slideMaster+xml", CT_BASE));
        over("ppt/slideLayouts/slideLayout1.xml", &format!("{}.slideLayout+xml", CT_BASE));
        over("ppt/theme/theme1.xml", "application/vnd.openxmlformats-officedocument.theme+xml");
        over("docProps/core.xml", "application/vnd.openxmlformats-package.core-properties+xml");
        for i in 0..self.slides.len() {
            over(&format!("ppt/slides/slide{}.xml", i + 1), &format!("{}.slide+xml", CT_BASE));
        }
        xml.push_str("</Types>");
        xml
    }

    fn core_properties(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{}</dc:title><dc:creator>Finance Team</dc:creator></cp:coreProperties>"#,
            self.title.as_deref().unwrap_or("Quarterly Review")
        )
    }

    fn presentation(&self) -> String {
        let ns = if self.strict_namespace {
            "http://purl.oclc.org/ooxml/presentationml/main"
        } else {
            "http://schemas.openxmlformats.org/presentationml/2006/main"
        };
        let slide_ids: String = (0..self.slides.len())
            .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 2))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="{}"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
            ns, slide_ids
        )
    }
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}">"#,
        REL_NS
    );
    for (id, ty, target) in entries {
        let ty = if ty.starts_with("metadata/") {
            format!("http://schemas.openxmlformats.org/package/2006/relationships/{}", ty)
        } else {
            format!("{}/{}", REL_BASE, ty)
        };
        xml.push_str(&format!(r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#, id, ty, target));
    }
    xml.push_str("</Relationships>");
    xml
}

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:srgbClr val="000000"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst></a:fmtScheme></a:themeElements></a:theme>"#;

fn master() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title Placeholder 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="838200" y="365125"/><a:ext cx="10515600" cy="1325563"/></a:xfrm></p:spPr></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Text Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="838200" y="1825625"/><a:ext cx="10515600" cy="4351338"/></a:xfrm></p:spPr></p:sp></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst><p:txStyles><p:titleStyle><a:lvl1pPr><a:defRPr sz="4400"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle><p:bodyStyle><a:lvl1pPr><a:defRPr sz="3200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:bodyStyle><p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"/></a:lvl1pPr></p:otherStyle></p:txStyles></p:sldMaster>"#,
        NS_DECL
    )
}

/// The body placeholder sets 28pt; the master's body style says 32pt.
fn layout() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {} type="obj"><p:cSld name="Title and Content"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Content Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle><a:lvl1pPr><a:defRPr sz="2800"/></a:lvl1pPr></a:lstStyle><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sldLayout>"#,
        NS_DECL
    )
}

fn slide(shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        NS_DECL, shapes
    )
}

/// A `p:sp` with one paragraph of text. `ph` is the inner `p:ph` attributes, if any.
pub fn text_shape(id: u32, name: &str, ph: Option<&str>, xfrm: Option<(i64, i64, i64, i64)>, text: &str) -> String {
    let nv_pr = match ph {
        Some(attrs) => format!("<p:nvPr><p:ph {}/></p:nvPr>", attrs),
        None => "<p:nvPr/>".to_string(),
    };
    let sp_pr = match xfrm {
        Some((x, y, cx, cy)) => format!(
            r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#,
            x, y, cx, cy
        ),
        None => "<p:spPr/>".to_string(),
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr/>{}</p:nvSpPr>{}<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        id, name, nv_pr, sp_pr, text
    )
}

/// A group at (`x`,`y`) whose child space is scaled 2:1 onto its frame.
pub fn group(id: u32, x: i64, y: i64, children: &str) -> String {
    format!(
        r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="{}" name="Group {}"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="2000000" cy="1000000"/><a:chOff x="0" y="0"/><a:chExt cx="4000000" cy="2000000"/></a:xfrm></p:grpSpPr>{}</p:grpSp>"#,
        id, id, x, y, children
    )
}

/// The scenario deck: a title, a body inheriting its size from the layout,
/// and a group holding two text boxes.
pub fn quarterly_deck() -> Vec<u8> {
    let shapes = [
        text_shape(2, "Title 1", Some(r#"type="title""#), None, "Q3 Results"),
        text_shape(3, "Content Placeholder 2", Some(r#"idx="1""#), None, "Revenue grew 12%"),
        group(
            4,
            1000000,
            2000000,
            &[
                text_shape(5, "TextBox 5", None, Some((0, 0, 2000000, 1000000)), "North"),
                text_shape(6, "TextBox 6", None, Some((2000000, 1000000, 2000000, 1000000)), "South"),
            ]
            .concat(),
        ),
    ]
    .concat();
    PptxBuilder::new().slide(&shapes).build()
}

/// Reads one part out of a container.
pub fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut content = String::new();
    std::io::Read::read_to_string(&mut file, &mut content).unwrap();
    content
}

pub fn part_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive.file_names().map(str::to_string).collect()
}
