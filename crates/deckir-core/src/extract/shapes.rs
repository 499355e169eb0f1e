//! Conversion of one visited shape element into its IR form.

use crate::ir::{
    ChartShape, Fill, GeometrySource, GroupShape, ImageShape, Paragraph, Placeholder,
    PlaceholderKind, Run, RunKind, Shape, ShapeKind, ShapeRole, Stroke, TableShape, TextFrame,
    TextShape,
};
use crate::normalize::color::read_color_child;
use crate::normalize::{normalize, Bounds, ColorValue};
use crate::package::{PresentationPackage, SlideSize};
use crate::shape_tree::{placeholder_of, ShapeElement, VisitedShape};
use crate::style::{ListStyle, ParaProps, RunProps, ShapeStyle, SlideStyle};
use crate::xml::{XmlDocument, A, C, P, R};
use indextree::NodeId;

const EMU_PER_POINT: f64 = 12_700.0;

/// Everything a shape conversion needs besides the shape itself.
pub(crate) struct ShapeContext<'c, 'a> {
    pub pkg: &'a PresentationPackage,
    pub doc: &'c XmlDocument,
    pub part_name: &'c str,
    pub style: &'c SlideStyle<'a>,
    pub slide_size: SlideSize,
    pub include_table_cells: bool,
}

impl<'c, 'a> ShapeContext<'c, 'a> {
    /// Builds the shape without its group children.
    pub fn build(&self, visited: &VisitedShape, z_order: usize) -> Shape {
        let doc = self.doc;
        let placeholder_ref = placeholder_of(doc, visited);
        let (bounds, geometry_source) = self.bounds(visited, placeholder_ref);

        let kind = match visited.element {
            ShapeElement::Shape => ShapeKind::Text(self.text_shape(visited, placeholder_ref, false)),
            ShapeElement::Connector => ShapeKind::Text(self.text_shape(visited, placeholder_ref, true)),
            ShapeElement::Picture => ShapeKind::Image(self.picture(visited)),
            ShapeElement::GraphicFrame => self.graphic_frame(visited),
            ShapeElement::Group => ShapeKind::Group(GroupShape::default()),
        };

        let alt_text = doc
            .attr(visited.c_nv_pr, "descr")
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Shape {
            id: visited.id.clone(),
            name: visited.name.clone(),
            bounds,
            geometry_source,
            role: shape_role(placeholder_ref.map(|(k, _)| k), &kind),
            placeholder: placeholder_ref.map(|(kind, index)| Placeholder {
                kind,
                index,
                shape_id: visited.id.clone(),
                bounds,
            }),
            alt_text,
            z_order,
            kind,
        }
    }

    /// Own transform first; placeholders without one inherit from the layout,
    /// then the master.
    fn bounds(
        &self,
        visited: &VisitedShape,
        placeholder_ref: Option<(PlaceholderKind, Option<u32>)>,
    ) -> (Option<Bounds>, GeometrySource) {
        if let Some(raw) = &visited.transform {
            return (
                Some(normalize(raw, &visited.space, self.slide_size)),
                GeometrySource::Own,
            );
        }
        let Some((kind, index)) = placeholder_ref else {
            return (None, GeometrySource::None);
        };

        let layout_ph = self.style.layout_placeholder(kind, index);
        if let Some(ph) = layout_ph {
            if let Some(raw) = &ph.transform {
                return (
                    Some(normalize(raw, &ph.space, self.slide_size)),
                    GeometrySource::LayoutPlaceholder,
                );
            }
        }

        let (m_kind, m_index) = layout_ph.map(|p| (p.kind, p.index)).unwrap_or((kind, index));
        if let Some(ph) = self.style.master_placeholder(m_kind, m_index) {
            if let Some(raw) = &ph.transform {
                return (
                    Some(normalize(raw, &ph.space, self.slide_size)),
                    GeometrySource::MasterPlaceholder,
                );
            }
        }
        (None, GeometrySource::None)
    }

    fn text_shape(
        &self,
        visited: &VisitedShape,
        placeholder_ref: Option<(PlaceholderKind, Option<u32>)>,
        connector: bool,
    ) -> TextShape {
        let doc = self.doc;
        let sp_pr = doc.first_child(visited.node, &P::spPr());
        let text_frame = doc.first_child(visited.node, &P::txBody()).map(|body| {
            let own_list = ListStyle::from_optional(doc, doc.first_child(body, &A::lstStyle()));
            let shape_style = self.style.shape(placeholder_ref, own_list);
            read_text_frame(doc, body, &shape_style)
        });

        TextShape {
            text_frame,
            fill: sp_pr.map(|sp_pr| self.fill(sp_pr)).unwrap_or_default(),
            stroke: sp_pr.and_then(|sp_pr| self.stroke(sp_pr)),
            connector,
        }
    }

    fn fill(&self, sp_pr: NodeId) -> Fill {
        let doc = self.doc;
        for child in doc.child_elements(sp_pr) {
            let Some(name) = doc.name(child) else { continue };
            if !name.in_namespace(A::NS) {
                continue;
            }
            match name.local_name.as_str() {
                "noFill" => return Fill::None,
                "solidFill" => {
                    return match read_color_child(doc, child) {
                        Some(spec) => Fill::Solid {
                            color: self.style.resolve_color(&spec),
                        },
                        None => Fill::Default,
                    }
                }
                "gradFill" => {
                    let stops = doc
                        .descendants_by_name(child, &A::gs())
                        .filter_map(|gs| read_color_child(doc, gs))
                        .map(|spec| self.style.resolve_color(&spec))
                        .collect();
                    return Fill::Gradient { stops };
                }
                "blipFill" => return Fill::Image,
                "pattFill" => return Fill::Pattern,
                "grpFill" => return Fill::Default,
                _ => {}
            }
        }
        Fill::Default
    }

    fn stroke(&self, sp_pr: NodeId) -> Option<Stroke> {
        let doc = self.doc;
        let ln = doc.first_child(sp_pr, &A::ln())?;
        let width = doc
            .attr(ln, "w")
            .and_then(|w| w.trim().parse::<f64>().ok())
            .map(|emu| emu / EMU_PER_POINT);
        let color = doc
            .first_child(ln, &A::solidFill())
            .and_then(|fill| read_color_child(doc, fill))
            .map(|spec| self.style.resolve_color(&spec));
        let dash = doc
            .first_child(ln, &A::prstDash())
            .and_then(|d| doc.attr(d, "val"))
            .map(str::to_string);
        Some(Stroke { width, color, dash })
    }

    fn picture(&self, visited: &VisitedShape) -> ImageShape {
        let doc = self.doc;
        let embed = doc
            .first_child(visited.node, &P::blipFill())
            .and_then(|fill| doc.first_child(fill, &A::blip()))
            .and_then(|blip| doc.attr_ns(blip, &R::embed()));

        let media_part = embed.and_then(|rid| match self.pkg.relationship_target(self.part_name, rid) {
            Ok(Some(rel)) => Some(rel.target),
            Ok(None) => {
                log::warn!("{}: picture {} references missing relationship {}", self.part_name, visited.id, rid);
                None
            }
            Err(err) => {
                log::warn!("{}: cannot read relationships: {}", self.part_name, err);
                None
            }
        });
        let media_type = media_part
            .as_deref()
            .and_then(|part| self.pkg.package().content_type(part))
            .map(str::to_string);

        ImageShape::Picture {
            media_part,
            media_type,
        }
    }

    fn graphic_frame(&self, visited: &VisitedShape) -> ShapeKind {
        let doc = self.doc;
        let graphic_data = doc
            .first_child(visited.node, &A::graphic())
            .and_then(|g| doc.first_child(g, &A::graphicData()));
        let Some(graphic_data) = graphic_data else {
            return ShapeKind::Image(ImageShape::Graphic { uri: String::new() });
        };

        if let Some(chart) = doc.first_child(graphic_data, &C::chart()) {
            return ShapeKind::Chart(self.chart(chart));
        }
        if let Some(table) = doc.first_child(graphic_data, &A::tbl()) {
            return ShapeKind::Table(read_table(doc, table, self.include_table_cells));
        }
        ShapeKind::Image(ImageShape::Graphic {
            uri: doc.attr(graphic_data, "uri").unwrap_or_default().to_string(),
        })
    }

    fn chart(&self, chart_ref: NodeId) -> ChartShape {
        let chart_part = self
            .doc
            .attr_ns(chart_ref, &R::id())
            .and_then(|rid| self.pkg.relationship_target(self.part_name, rid).ok().flatten())
            .map(|rel| rel.target);

        let Some(part) = chart_part.as_deref() else {
            return ChartShape::default();
        };
        match self.pkg.package().get_xml_part(part) {
            Ok(chart_doc) => read_chart(&chart_doc, part),
            Err(err) => {
                log::warn!("ignoring unreadable chart part {}: {}", part, err);
                ChartShape {
                    chart_part: Some(part.to_string()),
                    ..ChartShape::default()
                }
            }
        }
    }
}

fn shape_role(placeholder: Option<PlaceholderKind>, kind: &ShapeKind) -> ShapeRole {
    match placeholder {
        Some(k) if k.is_title() => return ShapeRole::Title,
        Some(PlaceholderKind::Body | PlaceholderKind::Subtitle | PlaceholderKind::Object) => {
            if matches!(kind, ShapeKind::Text(_)) {
                return ShapeRole::Body;
            }
        }
        Some(PlaceholderKind::Chart | PlaceholderKind::Table) => return ShapeRole::DataVisualization,
        _ => {}
    }
    match kind {
        ShapeKind::Chart(_) | ShapeKind::Table(_) => ShapeRole::DataVisualization,
        _ => ShapeRole::Unspecified,
    }
}

/// Reads every `a:p` of a text body, resolving formatting through `style`.
pub(crate) fn read_text_frame(doc: &XmlDocument, body: NodeId, style: &ShapeStyle<'_, '_>) -> TextFrame {
    let paragraphs = doc
        .elements_by_name(body, &A::p())
        .map(|p| read_paragraph(doc, p, style))
        .collect();
    TextFrame { paragraphs }
}

fn read_paragraph(doc: &XmlDocument, p: NodeId, style: &ShapeStyle<'_, '_>) -> Paragraph {
    let ppr = doc.first_child(p, &A::pPr());
    let level = ppr
        .and_then(|ppr| doc.attr(ppr, "lvl"))
        .and_then(|lvl| lvl.trim().parse::<u8>().ok())
        .unwrap_or(0)
        .min(8);
    let para_props = ParaProps::from_optional(doc, ppr);
    let para_default = RunProps::from_optional(doc, ppr.and_then(|ppr| doc.first_child(ppr, &A::defRPr())));
    let resolved = style.resolve_paragraph(&para_props, level);

    let runs = doc
        .child_elements(p)
        .filter_map(|child| {
            let name = doc.name(child)?;
            if !name.in_namespace(A::NS) {
                return None;
            }
            let (kind, text) = match name.local_name.as_str() {
                "r" => (RunKind::Text, run_text(doc, child)),
                "br" => (RunKind::Break, "\n".to_string()),
                "fld" => (RunKind::Field, run_text(doc, child)),
                _ => return None,
            };
            let rpr = RunProps::from_optional(doc, doc.first_child(child, &A::rPr()));
            let (formatting, provenance) = style.resolve_run(&rpr, &para_default, level);
            Some(Run {
                text,
                kind,
                formatting,
                provenance,
            })
        })
        .collect();

    Paragraph {
        runs,
        alignment: resolved.alignment,
        level,
        bullet: resolved.bullet,
        line_spacing: resolved.line_spacing,
        space_before: resolved.space_before,
        space_after: resolved.space_after,
    }
}

fn run_text(doc: &XmlDocument, run: NodeId) -> String {
    doc.first_child(run, &A::t())
        .map(|t| doc.text_content(t))
        .unwrap_or_default()
}

fn read_table(doc: &XmlDocument, table: NodeId, include_cells: bool) -> TableShape {
    let rows: Vec<NodeId> = doc.elements_by_name(table, &A::tr()).collect();
    let grid_columns = doc
        .first_child(table, &A::tblGrid())
        .map(|grid| doc.elements_by_name(grid, &A::gridCol()).count())
        .unwrap_or(0);
    let columns = if grid_columns > 0 {
        grid_columns
    } else {
        rows.first()
            .map(|row| doc.elements_by_name(*row, &A::tc()).count())
            .unwrap_or(0)
    };

    let cells = if include_cells {
        rows.iter()
            .map(|row| {
                doc.elements_by_name(*row, &A::tc())
                    .map(|tc| cell_text(doc, tc))
                    .collect()
            })
            .collect()
    } else {
        Vec::new()
    };

    TableShape {
        rows: rows.len(),
        columns,
        cells,
    }
}

fn cell_text(doc: &XmlDocument, tc: NodeId) -> String {
    let Some(body) = doc.first_child(tc, &A::txBody()) else {
        return String::new();
    };
    doc.elements_by_name(body, &A::p())
        .map(|p| {
            doc.descendants_by_name(p, &A::t())
                .map(|t| doc.text_content(t))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summarizes a chart part (`c:chartSpace`).
pub(crate) fn read_chart(doc: &XmlDocument, part_name: &str) -> ChartShape {
    let mut chart = ChartShape {
        chart_part: Some(part_name.to_string()),
        ..ChartShape::default()
    };
    let Some(root) = doc.root() else {
        return chart;
    };
    let Some(body) = doc.first_child(root, &C::chart()) else {
        return chart;
    };

    if let Some(plot_area) = doc.first_child(body, &C::plotArea()) {
        chart.chart_type = doc
            .child_elements(plot_area)
            .filter_map(|child| doc.name(child))
            .find(|name| name.local_name.ends_with("Chart"))
            .map(|name| name.local_name.clone());
        chart.series_names = doc
            .descendants_by_name(plot_area, &C::ser())
            .filter_map(|ser| doc.first_child(ser, &C::tx()))
            .map(|tx| chart_text(doc, tx))
            .filter(|name| !name.is_empty())
            .collect();
    }

    chart.title = doc
        .first_child(body, &C::title())
        .map(|title| chart_text(doc, title))
        .filter(|t| !t.is_empty());

    chart.legend_position = doc.first_child(body, &C::legend()).map(|legend| {
        doc.first_child(legend, &C::legendPos())
            .and_then(|pos| doc.attr(pos, "val"))
            .unwrap_or("r")
            .to_string()
    });

    chart
}

/// Rich text runs or cached string values under a chart element.
fn chart_text(doc: &XmlDocument, node: NodeId) -> String {
    let rich: String = doc
        .descendants_by_name(node, &A::t())
        .map(|t| doc.text_content(t))
        .collect();
    if !rich.is_empty() {
        return rich;
    }
    doc.descendants_by_name(node, &C::v())
        .map(|v| doc.text_content(v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every resolved color a shape displays: run colors, fills and strokes.
pub(crate) fn shape_colors(shape: &Shape) -> Vec<&ColorValue> {
    let mut colors = Vec::new();
    if let ShapeKind::Text(text) = &shape.kind {
        if let Some(frame) = &text.text_frame {
            colors.extend(
                frame
                    .runs()
                    .filter(|r| r.kind != RunKind::Break)
                    .map(|r| &r.formatting.color),
            );
        }
        match &text.fill {
            Fill::Solid { color } => colors.push(color),
            Fill::Gradient { stops } => colors.extend(stops.iter()),
            _ => {}
        }
        if let Some(color) = text.stroke.as_ref().and_then(|s| s.color.as_ref()) {
            colors.push(color);
        }
    }
    colors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser;

    #[test]
    fn chart_summary() {
        let doc = parser::parse(
            r#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
                <c:chart>
                  <c:title><c:tx><c:rich><a:p><a:r><a:t>Revenue</a:t></a:r></a:p></c:rich></c:tx></c:title>
                  <c:plotArea><c:layout/><c:barChart><c:ser><c:tx><c:strRef><c:strCache><c:pt idx="0"><c:v>2024</c:v></c:pt></c:strCache></c:strRef></c:tx></c:ser></c:barChart></c:plotArea>
                  <c:legend><c:legendPos val="b"/></c:legend>
                </c:chart>
              </c:chartSpace>"#,
        )
        .unwrap();
        let chart = read_chart(&doc, "ppt/charts/chart1.xml");
        assert_eq!(chart.chart_type.as_deref(), Some("barChart"));
        assert_eq!(chart.title.as_deref(), Some("Revenue"));
        assert_eq!(chart.series_names, vec!["2024".to_string()]);
        assert_eq!(chart.legend_position.as_deref(), Some("b"));
    }

    #[test]
    fn table_dimensions_and_cells() {
        let doc = parser::parse(
            r#"<a:tbl xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
                 <a:tblGrid><a:gridCol w="100"/><a:gridCol w="100"/></a:tblGrid>
                 <a:tr><a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>Q1</a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>10</a:t></a:r></a:p></a:txBody></a:tc></a:tr>
               </a:tbl>"#,
        )
        .unwrap();
        let table = read_table(&doc, doc.root().unwrap(), true);
        assert_eq!((table.rows, table.columns), (1, 2));
        assert_eq!(table.cells, vec![vec!["Q1".to_string(), "10".to_string()]]);

        let bare = read_table(&doc, doc.root().unwrap(), false);
        assert!(bare.cells.is_empty());
    }

    #[test]
    fn roles_follow_placeholders_then_content() {
        let text = ShapeKind::Text(TextShape {
            text_frame: None,
            fill: Fill::Default,
            stroke: None,
            connector: false,
        });
        assert_eq!(shape_role(Some(PlaceholderKind::CenteredTitle), &text), ShapeRole::Title);
        assert_eq!(shape_role(Some(PlaceholderKind::Object), &text), ShapeRole::Body);
        assert_eq!(shape_role(None, &ShapeKind::Table(TableShape::default())), ShapeRole::DataVisualization);
        assert_eq!(shape_role(None, &text), ShapeRole::Unspecified);
    }
}
