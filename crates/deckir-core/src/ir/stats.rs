use super::slide::SlideRole;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ElementCounts {
    pub text: usize,
    pub image: usize,
    pub chart: usize,
    pub table: usize,
    pub group: usize,
}

impl ElementCounts {
    /// Every shape except group containers.
    pub fn total(&self) -> usize {
        self.text + self.image + self.chart + self.table
    }

    pub fn visuals(&self) -> usize {
        self.image + self.chart
    }
}

/// Derived per-slide measures, computed once at extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SlideStatistics {
    pub element_count: usize,
    pub counts: ElementCounts,
    pub character_count: usize,
    pub word_count: usize,
    /// Words per unit of normalized text-shape area.
    pub text_density: f64,
    /// Text shapes per visual (image or chart); `None` when text has no visual to compare with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_to_visual_ratio: Option<f64>,
    pub whitespace_ratio: f64,
    /// 0..=100, higher reads easier.
    pub readability: f64,
    pub visual_hierarchy: f64,
    /// Colors remaining after merging those closer than the configured ΔE.
    pub distinct_colors: usize,
    pub color_diversity: f64,
    pub mean_delta_e: f64,
    pub horizontal_balance: f64,
    pub vertical_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorUsage {
    pub hex: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutUsage {
    pub layout_id: String,
    pub slides: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCount {
    pub role: SlideRole,
    pub slides: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatistics {
    pub slide_count: usize,
    pub average_elements_per_slide: f64,
    pub layout_usage: Vec<LayoutUsage>,
    pub role_distribution: Vec<RoleCount>,
    /// Ten most used colors, most frequent first.
    pub top_colors: Vec<ColorUsage>,
    pub palette_diversity: f64,
}
