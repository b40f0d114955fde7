use eframe::egui::Color32;

use crate::data::chart::PlotSize;
use crate::data::filter::OptionScope;

/// Width the content is capped at in the centred layout.
pub const CENTERED_MAX_WIDTH: f32 = 730.0;

/// How the central panel uses the window width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLayout {
    Wide,
    Centered,
}

impl PageLayout {
    pub fn from_wide(wide: bool) -> Self {
        if wide {
            PageLayout::Wide
        } else {
            PageLayout::Centered
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageIcon {
    BarChart,
}

/// Static presentation settings plus the chart constants the dashboard
/// renders with.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub page_title: String,
    pub page_icon: PageIcon,
    pub layout: PageLayout,
    pub histogram_bins: usize,
    pub scatter_size: PlotSize,
    pub scatter_color: Color32,
    pub option_scope: OptionScope,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_title: "Dashboard".to_string(),
            page_icon: PageIcon::BarChart,
            layout: PageLayout::Wide,
            histogram_bins: 10,
            scatter_size: PlotSize::default(),
            scatter_color: Color32::from_rgb(128, 0, 128),
            option_scope: OptionScope::Progressive,
        }
    }
}

impl DashboardConfig {
    /// Initial window size for the configured layout.
    pub fn window_size(&self) -> [f32; 2] {
        match self.layout {
            PageLayout::Wide => [1200.0, 800.0],
            PageLayout::Centered => [CENTERED_MAX_WIDTH + 320.0, 800.0],
        }
    }

    /// Maximum width of the central content, if capped.
    pub fn content_width(&self) -> Option<f32> {
        match self.layout {
            PageLayout::Wide => None,
            PageLayout::Centered => Some(CENTERED_MAX_WIDTH),
        }
    }

    pub fn icon(&self) -> eframe::egui::IconData {
        match self.page_icon {
            PageIcon::BarChart => crate::color::bar_chart_icon(32, 4),
        }
    }
}
