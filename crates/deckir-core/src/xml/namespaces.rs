#![allow(non_snake_case)]

use super::xname::XName;

pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

/// PresentationML, transitional conformance.
pub mod P {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
    /// Strict conformance namespace; recognized only to reject it.
    pub const STRICT_NS: &str = "http://purl.oclc.org/ooxml/presentationml/main";

    pub fn presentation() -> XName { XName::new(NS, "presentation") }
    pub fn sldIdLst() -> XName { XName::new(NS, "sldIdLst") }
    pub fn sldId() -> XName { XName::new(NS, "sldId") }
    pub fn sldMasterIdLst() -> XName { XName::new(NS, "sldMasterIdLst") }
    pub fn sldSz() -> XName { XName::new(NS, "sldSz") }
    pub fn defaultTextStyle() -> XName { XName::new(NS, "defaultTextStyle") }
    pub fn sld() -> XName { XName::new(NS, "sld") }
    pub fn sldLayout() -> XName { XName::new(NS, "sldLayout") }
    pub fn sldMaster() -> XName { XName::new(NS, "sldMaster") }
    pub fn cSld() -> XName { XName::new(NS, "cSld") }
    pub fn bg() -> XName { XName::new(NS, "bg") }
    pub fn bgPr() -> XName { XName::new(NS, "bgPr") }
    pub fn bgRef() -> XName { XName::new(NS, "bgRef") }
    pub fn spTree() -> XName { XName::new(NS, "spTree") }
    pub fn sp() -> XName { XName::new(NS, "sp") }
    pub fn pic() -> XName { XName::new(NS, "pic") }
    pub fn graphicFrame() -> XName { XName::new(NS, "graphicFrame") }
    pub fn grpSp() -> XName { XName::new(NS, "grpSp") }
    pub fn cxnSp() -> XName { XName::new(NS, "cxnSp") }
    pub fn contentPart() -> XName { XName::new(NS, "contentPart") }
    pub fn nvSpPr() -> XName { XName::new(NS, "nvSpPr") }
    pub fn nvPicPr() -> XName { XName::new(NS, "nvPicPr") }
    pub fn nvGraphicFramePr() -> XName { XName::new(NS, "nvGraphicFramePr") }
    pub fn nvGrpSpPr() -> XName { XName::new(NS, "nvGrpSpPr") }
    pub fn nvCxnSpPr() -> XName { XName::new(NS, "nvCxnSpPr") }
    pub fn cNvPr() -> XName { XName::new(NS, "cNvPr") }
    pub fn nvPr() -> XName { XName::new(NS, "nvPr") }
    pub fn ph() -> XName { XName::new(NS, "ph") }
    pub fn spPr() -> XName { XName::new(NS, "spPr") }
    pub fn grpSpPr() -> XName { XName::new(NS, "grpSpPr") }
    pub fn xfrm() -> XName { XName::new(NS, "xfrm") }
    pub fn txBody() -> XName { XName::new(NS, "txBody") }
    pub fn blipFill() -> XName { XName::new(NS, "blipFill") }
    pub fn clrMap() -> XName { XName::new(NS, "clrMap") }
    pub fn clrMapOvr() -> XName { XName::new(NS, "clrMapOvr") }
    pub fn txStyles() -> XName { XName::new(NS, "txStyles") }
    pub fn titleStyle() -> XName { XName::new(NS, "titleStyle") }
    pub fn bodyStyle() -> XName { XName::new(NS, "bodyStyle") }
    pub fn otherStyle() -> XName { XName::new(NS, "otherStyle") }
    pub fn transition() -> XName { XName::new(NS, "transition") }
}

/// DrawingML main.
pub mod A {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    pub fn theme() -> XName { XName::new(NS, "theme") }
    pub fn themeElements() -> XName { XName::new(NS, "themeElements") }
    pub fn clrScheme() -> XName { XName::new(NS, "clrScheme") }
    pub fn fontScheme() -> XName { XName::new(NS, "fontScheme") }
    pub fn majorFont() -> XName { XName::new(NS, "majorFont") }
    pub fn minorFont() -> XName { XName::new(NS, "minorFont") }
    pub fn latin() -> XName { XName::new(NS, "latin") }
    pub fn ea() -> XName { XName::new(NS, "ea") }
    pub fn cs() -> XName { XName::new(NS, "cs") }
    pub fn xfrm() -> XName { XName::new(NS, "xfrm") }
    pub fn off() -> XName { XName::new(NS, "off") }
    pub fn ext() -> XName { XName::new(NS, "ext") }
    pub fn chOff() -> XName { XName::new(NS, "chOff") }
    pub fn chExt() -> XName { XName::new(NS, "chExt") }
    pub fn prstGeom() -> XName { XName::new(NS, "prstGeom") }
    pub fn custGeom() -> XName { XName::new(NS, "custGeom") }
    pub fn ln() -> XName { XName::new(NS, "ln") }
    pub fn noFill() -> XName { XName::new(NS, "noFill") }
    pub fn solidFill() -> XName { XName::new(NS, "solidFill") }
    pub fn gradFill() -> XName { XName::new(NS, "gradFill") }
    pub fn blipFill() -> XName { XName::new(NS, "blipFill") }
    pub fn pattFill() -> XName { XName::new(NS, "pattFill") }
    pub fn grpFill() -> XName { XName::new(NS, "grpFill") }
    pub fn gs() -> XName { XName::new(NS, "gs") }
    pub fn srgbClr() -> XName { XName::new(NS, "srgbClr") }
    pub fn schemeClr() -> XName { XName::new(NS, "schemeClr") }
    pub fn sysClr() -> XName { XName::new(NS, "sysClr") }
    pub fn prstClr() -> XName { XName::new(NS, "prstClr") }
    pub fn scrgbClr() -> XName { XName::new(NS, "scrgbClr") }
    pub fn hslClr() -> XName { XName::new(NS, "hslClr") }
    pub fn lumMod() -> XName { XName::new(NS, "lumMod") }
    pub fn lumOff() -> XName { XName::new(NS, "lumOff") }
    pub fn tint() -> XName { XName::new(NS, "tint") }
    pub fn shade() -> XName { XName::new(NS, "shade") }
    pub fn alpha() -> XName { XName::new(NS, "alpha") }
    pub fn bodyPr() -> XName { XName::new(NS, "bodyPr") }
    pub fn lstStyle() -> XName { XName::new(NS, "lstStyle") }
    pub fn defPPr() -> XName { XName::new(NS, "defPPr") }
    pub fn defRPr() -> XName { XName::new(NS, "defRPr") }
    pub fn p() -> XName { XName::new(NS, "p") }
    pub fn pPr() -> XName { XName::new(NS, "pPr") }
    pub fn r() -> XName { XName::new(NS, "r") }
    pub fn rPr() -> XName { XName::new(NS, "rPr") }
    pub fn t() -> XName { XName::new(NS, "t") }
    pub fn br() -> XName { XName::new(NS, "br") }
    pub fn fld() -> XName { XName::new(NS, "fld") }
    pub fn endParaRPr() -> XName { XName::new(NS, "endParaRPr") }
    pub fn lnSpc() -> XName { XName::new(NS, "lnSpc") }
    pub fn spcBef() -> XName { XName::new(NS, "spcBef") }
    pub fn spcAft() -> XName { XName::new(NS, "spcAft") }
    pub fn spcPct() -> XName { XName::new(NS, "spcPct") }
    pub fn spcPts() -> XName { XName::new(NS, "spcPts") }
    pub fn buNone() -> XName { XName::new(NS, "buNone") }
    pub fn buChar() -> XName { XName::new(NS, "buChar") }
    pub fn buAutoNum() -> XName { XName::new(NS, "buAutoNum") }
    pub fn graphic() -> XName { XName::new(NS, "graphic") }
    pub fn graphicData() -> XName { XName::new(NS, "graphicData") }
    pub fn blip() -> XName { XName::new(NS, "blip") }
    pub fn tbl() -> XName { XName::new(NS, "tbl") }
    pub fn tr() -> XName { XName::new(NS, "tr") }
    pub fn tc() -> XName { XName::new(NS, "tc") }
    pub fn txBody() -> XName { XName::new(NS, "txBody") }
    pub fn tblGrid() -> XName { XName::new(NS, "tblGrid") }
    pub fn gridCol() -> XName { XName::new(NS, "gridCol") }
    pub fn prstDash() -> XName { XName::new(NS, "prstDash") }
    pub fn fmtScheme() -> XName { XName::new(NS, "fmtScheme") }
    pub fn effectStyleLst() -> XName { XName::new(NS, "effectStyleLst") }
    pub fn overrideClrMapping() -> XName { XName::new(NS, "overrideClrMapping") }
    pub fn masterClrMapping() -> XName { XName::new(NS, "masterClrMapping") }

    /// `lvl1pPr` .. `lvl9pPr` inside a list style.
    pub fn lvlPPr(level: u8) -> XName {
        XName::new(NS, &format!("lvl{}pPr", level.clamp(1, 9)))
    }
}

pub mod R {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    pub fn id() -> XName { XName::new(NS, "id") }
    pub fn embed() -> XName { XName::new(NS, "embed") }
}

/// DrawingML charts.
pub mod C {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

    pub fn chart() -> XName { XName::new(NS, "chart") }
    pub fn title() -> XName { XName::new(NS, "title") }
    pub fn plotArea() -> XName { XName::new(NS, "plotArea") }
    pub fn ser() -> XName { XName::new(NS, "ser") }
    pub fn tx() -> XName { XName::new(NS, "tx") }
    pub fn v() -> XName { XName::new(NS, "v") }
    pub fn legend() -> XName { XName::new(NS, "legend") }
    pub fn legendPos() -> XName { XName::new(NS, "legendPos") }
}

pub mod PIC {
    pub const NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
}

pub mod DGM {
    pub const NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/diagram";
}

pub mod MC {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";

    pub fn AlternateContent() -> XName { XName::new(NS, "AlternateContent") }
    pub fn Choice() -> XName { XName::new(NS, "Choice") }
    pub fn Fallback() -> XName { XName::new(NS, "Fallback") }
}

pub mod P14 {
    pub const NS: &str = "http://schemas.microsoft.com/office/powerpoint/2010/main";
}

pub mod A14 {
    pub const NS: &str = "http://schemas.microsoft.com/office/drawing/2010/main";
}

/// Package relationships (`_rels/*.rels`).
pub mod PR {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

    pub fn Relationships() -> XName { XName::new(NS, "Relationships") }
    pub fn Relationship() -> XName { XName::new(NS, "Relationship") }
}

/// `[Content_Types].xml`.
pub mod CT {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

    pub fn Types() -> XName { XName::new(NS, "Types") }
    pub fn Default() -> XName { XName::new(NS, "Default") }
    pub fn Override() -> XName { XName::new(NS, "Override") }
}

pub mod CP {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";

    pub fn coreProperties() -> XName { XName::new(NS, "coreProperties") }
    pub fn revision() -> XName { XName::new(NS, "revision") }
    pub fn lastModifiedBy() -> XName { XName::new(NS, "lastModifiedBy") }
    pub fn keywords() -> XName { XName::new(NS, "keywords") }
}

pub mod DC {
    use super::XName;
    pub const NS: &str = "http://purl.org/dc/elements/1.1/";

    pub fn title() -> XName { XName::new(NS, "title") }
    pub fn subject() -> XName { XName::new(NS, "subject") }
    pub fn creator() -> XName { XName::new(NS, "creator") }
    pub fn language() -> XName { XName::new(NS, "language") }
}

pub mod DCTERMS {
    use super::XName;
    pub const NS: &str = "http://purl.org/dc/terms/";

    pub fn created() -> XName { XName::new(NS, "created") }
    pub fn modified() -> XName { XName::new(NS, "modified") }
}

/// Extended (app.xml) properties.
pub mod EP {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";

    pub fn Company() -> XName { XName::new(NS, "Company") }
    pub fn Application() -> XName { XName::new(NS, "Application") }
}

/// Custom (custom.xml) properties.
pub mod CUSTOM {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/custom-properties";

    pub fn property() -> XName { XName::new(NS, "property") }
}

pub mod VT {
    pub const NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_level_names_are_clamped() {
        assert_eq!(A::lvlPPr(1).local_name, "lvl1pPr");
        assert_eq!(A::lvlPPr(0).local_name, "lvl1pPr");
        assert_eq!(A::lvlPPr(12).local_name, "lvl9pPr");
    }

    #[test]
    fn presentation_and_drawing_names_use_distinct_namespaces() {
        assert_ne!(P::xfrm(), A::xfrm());
        assert_eq!(P::sp().namespace.as_deref(), Some(P::NS));
    }
}
