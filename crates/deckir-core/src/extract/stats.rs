//! Derived slide and document measures. Everything here is a pure function
//! of already-extracted IR.

use super::shapes::shape_colors;
use crate::ir::{
    ColorUsage, DocumentStatistics, ElementCounts, LayoutUsage, PlaceholderKind, RoleCount, Shape,
    ShapeKind, Slide, SlideRole, SlideStatistics,
};
use crate::normalize::ColorValue;
use std::collections::HashMap;

const TOP_COLORS: usize = 10;
const DIVERSITY_SATURATION: f64 = 10.0;

/// Greedy ΔE clustering: a color joins the first representative closer than
/// `threshold`, otherwise it becomes a representative itself.
pub(crate) fn cluster_colors<'c>(colors: impl IntoIterator<Item = &'c ColorValue>, threshold: f64) -> Vec<&'c ColorValue> {
    let mut representatives: Vec<&ColorValue> = Vec::new();
    for color in colors {
        if !representatives.iter().any(|r| r.delta_e(color) < threshold) {
            representatives.push(color);
        }
    }
    representatives
}

fn mean_pairwise_delta_e(colors: &[&ColorValue]) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in colors.iter().enumerate() {
        for b in &colors[i + 1..] {
            total += a.delta_e(b);
            pairs += 1;
        }
    }
    if pairs == 0 {
        0.0
    } else {
        total / pairs as f64
    }
}

fn diversity(clusters: usize) -> f64 {
    (clusters as f64 / DIVERSITY_SATURATION).min(1.0)
}

/// `1 - |a - b| / (a + b)`, or 1 when nothing has weight.
fn balance(a: f64, b: f64) -> f64 {
    let total = a + b;
    if total > 0.0 {
        1.0 - (a - b).abs() / total
    } else {
        1.0
    }
}

pub fn slide_statistics(shapes: &[Shape], color_merge_delta_e: f64) -> SlideStatistics {
    let mut stats = SlideStatistics::default();
    let mut counts = ElementCounts::default();
    let mut covered_area = 0.0;
    let mut text_area = 0.0;
    let (mut left, mut right, mut top, mut bottom) = (0.0, 0.0, 0.0, 0.0);
    let mut has_title = false;
    let mut colors: Vec<&ColorValue> = Vec::new();

    let mut stack: Vec<&Shape> = shapes.iter().rev().collect();
    while let Some(shape) = stack.pop() {
        stack.extend(shape.children().iter().rev());

        match &shape.kind {
            ShapeKind::Text(_) => counts.text += 1,
            ShapeKind::Image(_) => counts.image += 1,
            ShapeKind::Chart(_) => counts.chart += 1,
            ShapeKind::Table(_) => counts.table += 1,
            ShapeKind::Group(_) => {
                counts.group += 1;
                continue;
            }
        }

        if matches!(
            shape.placeholder.as_ref().map(|p| p.kind),
            Some(PlaceholderKind::Title | PlaceholderKind::CenteredTitle)
        ) {
            has_title = true;
        }

        if let Some(frame) = shape.text_frame() {
            let text = frame.plain_text();
            stats.character_count += text.chars().filter(|c| *c != '\n').count();
            stats.word_count += text.split_whitespace().count();
        }

        if let Some(bounds) = &shape.bounds {
            let area = bounds.area();
            covered_area += area;
            if matches!(shape.kind, ShapeKind::Text(_)) {
                text_area += area;
            }
            let (cx, cy) = bounds.center();
            if cx < 0.5 {
                left += area;
            } else {
                right += area;
            }
            if cy < 0.5 {
                top += area;
            } else {
                bottom += area;
            }
        }

        colors.extend(shape_colors(shape));
    }

    stats.counts = counts;
    stats.element_count = counts.total();
    stats.text_density = if text_area > 0.0 {
        stats.word_count as f64 / text_area
    } else {
        0.0
    };
    stats.text_to_visual_ratio =
        (counts.visuals() > 0).then(|| counts.text as f64 / counts.visuals() as f64);
    stats.whitespace_ratio = (1.0 - covered_area.min(1.0)).max(0.0);
    stats.readability = (100.0 - stats.character_count as f64 / 10.0).clamp(0.0, 100.0);
    stats.visual_hierarchy = if has_title { 0.9 } else { 0.5 };

    let clusters = cluster_colors(colors, color_merge_delta_e);
    stats.distinct_colors = clusters.len();
    stats.color_diversity = diversity(clusters.len());
    stats.mean_delta_e = mean_pairwise_delta_e(&clusters);

    stats.horizontal_balance = balance(left, right);
    stats.vertical_balance = balance(top, bottom);
    stats
}

/// Counts keyed in first-appearance order.
fn ordered_counts<K: Clone + Eq + std::hash::Hash>(keys: impl IntoIterator<Item = K>) -> Vec<(K, usize)> {
    let mut order: Vec<(K, usize)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();
    for key in keys {
        match index.get(&key) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, 1));
            }
        }
    }
    order
}

pub fn document_statistics(slides: &[Slide], color_merge_delta_e: f64) -> DocumentStatistics {
    let slide_count = slides.len();
    let total_elements: usize = slides.iter().map(|s| s.statistics.element_count).sum();

    let layout_usage = ordered_counts(slides.iter().map(|s| s.layout_id.clone()))
        .into_iter()
        .map(|(layout_id, slides)| LayoutUsage { layout_id, slides })
        .collect();
    let role_distribution = ordered_counts(slides.iter().map(|s| s.role))
        .into_iter()
        .map(|(role, slides): (SlideRole, usize)| RoleCount { role, slides })
        .collect();

    let all_colors: Vec<&ColorValue> = slides
        .iter()
        .flat_map(|s| s.shapes_preorder())
        .flat_map(shape_colors)
        .collect();

    let mut by_hex = ordered_counts(all_colors.iter().map(|c| c.hex()));
    by_hex.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let total_colors = all_colors.len();
    let top_colors = by_hex
        .into_iter()
        .take(TOP_COLORS)
        .map(|(hex, count)| ColorUsage {
            hex,
            count,
            percentage: count as f64 * 100.0 / total_colors as f64,
        })
        .collect();

    let palette = cluster_colors(all_colors.iter().copied(), color_merge_delta_e);

    DocumentStatistics {
        slide_count,
        average_elements_per_slide: if slide_count > 0 {
            total_elements as f64 / slide_count as f64
        } else {
            0.0
        },
        layout_usage,
        role_distribution,
        top_colors,
        palette_diversity: diversity(palette.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Fill, GeometrySource, ImageShape, ShapeRole, TextShape};
    use crate::normalize::Bounds;

    fn shape(id: &str, bounds: Bounds, kind: ShapeKind) -> Shape {
        Shape {
            id: id.to_string(),
            name: id.to_string(),
            bounds: Some(bounds),
            geometry_source: GeometrySource::Own,
            role: ShapeRole::Unspecified,
            placeholder: None,
            alt_text: None,
            z_order: 0,
            kind,
        }
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Bounds {
        Bounds {
            x,
            y,
            width: w,
            height: h,
            rotation: 0.0,
            flip_h: false,
            flip_v: false,
        }
    }

    fn filled(color: &str) -> ShapeKind {
        ShapeKind::Text(TextShape {
            text_frame: None,
            fill: Fill::Solid {
                color: ColorValue::from_hex(color).unwrap(),
            },
            stroke: None,
            connector: false,
        })
    }

    fn picture() -> ShapeKind {
        ShapeKind::Image(ImageShape::Picture {
            media_part: None,
            media_type: None,
        })
    }

    #[test]
    fn close_colors_merge_into_one_cluster() {
        let red = ColorValue::from_hex("FF0000").unwrap();
        let near_red = ColorValue::from_hex("FE0101").unwrap();
        let blue = ColorValue::from_hex("0000FF").unwrap();
        let clusters = cluster_colors([&red, &near_red, &blue], 10.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(cluster_colors([&red, &near_red], 0.0).len(), 2);
    }

    #[test]
    fn slide_measures() {
        let shapes = vec![
            shape("2", rect(0.0, 0.0, 0.5, 0.5), filled("FF0000")),
            shape("3", rect(0.5, 0.5, 0.5, 0.5), picture()),
        ];
        let stats = slide_statistics(&shapes, 10.0);
        assert_eq!(stats.element_count, 2);
        assert_eq!(stats.counts.text, 1);
        assert_eq!(stats.text_to_visual_ratio, Some(1.0));
        assert!((stats.whitespace_ratio - 0.5).abs() < 1e-9);
        assert!((stats.horizontal_balance - 1.0).abs() < 1e-9);
        assert_eq!(stats.distinct_colors, 1);
        assert_eq!(stats.visual_hierarchy, 0.5);
        assert_eq!(stats.readability, 100.0);
    }

    #[test]
    fn lopsided_layout_is_unbalanced() {
        let shapes = vec![shape("2", rect(0.0, 0.0, 0.2, 0.2), filled("000000"))];
        let stats = slide_statistics(&shapes, 10.0);
        assert_eq!(stats.horizontal_balance, 0.0);
        assert_eq!(stats.text_to_visual_ratio, None);
    }

    #[test]
    fn empty_slide_is_all_whitespace() {
        let stats = slide_statistics(&[], 10.0);
        assert_eq!(stats.whitespace_ratio, 1.0);
        assert_eq!(stats.mean_delta_e, 0.0);
        assert_eq!(stats.horizontal_balance, 1.0);
    }

    #[test]
    fn counts_keep_first_appearance_order() {
        let counts = ordered_counts(["b", "a", "b", "c"]);
        assert_eq!(counts, vec![("b", 2), ("a", 1), ("c", 1)]);
    }
}
