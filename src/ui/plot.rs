use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Legend, Line, LineStyle, MarkerShape as PlotMarker, Plot, PlotPoints, PlotUi, Points, Polygon};

use crate::pipeline::chart::{BandLayer, ChartSpec, Dash, Layer, MarkerShape};
use crate::pipeline::SeriesPoint;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Date axis
// ---------------------------------------------------------------------------

fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

fn plot_points(points: &[SeriesPoint]) -> Vec<[f64; 2]> {
    points.iter().map(|p| [date_to_x(p.date), p.value]).collect()
}

/// Unified tooltip text: the hovered date, then every layer's value there.
fn hover_text(chart: &ChartSpec, x: f64) -> String {
    let Some(date) = x_to_date(x) else {
        return String::new();
    };
    let mut text = date.to_string();
    for (name, value) in chart.tooltip_rows(date) {
        text.push_str(&format!("\n{name}: {value:.2}"));
    }
    text
}

// ---------------------------------------------------------------------------
// Failure-rate plot (central panel)
// ---------------------------------------------------------------------------

/// Render the chart description in the central panel.
pub fn failure_plot(ui: &mut Ui, state: &AppState) {
    let Some(output) = &state.output else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a data folder to view failures  (File → Open data folder…)");
        });
        return;
    };
    let chart = &output.chart;
    let tooltip_chart = chart.clone();

    ui.heading(&chart.title);

    Plot::new("failure_plot")
        .legend(Legend::default())
        .x_axis_label(chart.x_axis_title.clone())
        .y_axis_label(chart.y_axis_title.clone())
        .x_axis_formatter(|mark, _range| {
            x_to_date(mark.value)
                .map(|d| d.format("%b %-d").to_string())
                .unwrap_or_default()
        })
        .label_formatter(move |_name, point| hover_text(&tooltip_chart, point.x))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            if let Some(band) = &chart.band {
                draw_band(plot_ui, band);
            }
            for layer in &chart.layers {
                draw_layer(plot_ui, layer);
            }
        });
}

/// One convex quad per day-to-day segment; quads sharing a name share one
/// legend entry.
fn draw_band(plot_ui: &mut PlotUi, band: &BandLayer) {
    let fill: Color32 = band.fill.into();
    let segments = band.upper.windows(2).zip(band.lower.windows(2));
    for (up, low) in segments {
        let quad: PlotPoints = plot_points(&[up[0], up[1], low[1], low[0]]).into();
        plot_ui.polygon(
            Polygon::new(quad)
                .name(&band.name)
                .fill_color(fill)
                .stroke(Stroke::NONE),
        );
    }
}

fn draw_layer(plot_ui: &mut PlotUi, layer: &Layer) {
    let color: Color32 = layer.style.color.into();

    if layer.style.line_width > 0.0 {
        let style = match layer.style.dash {
            Dash::Solid => LineStyle::Solid,
            Dash::Dashed => LineStyle::dashed_dense(),
        };
        plot_ui.line(
            Line::new(plot_points(&layer.points))
                .name(&layer.name)
                .color(color)
                .width(layer.style.line_width)
                .style(style),
        );
    }

    if let Some(marker) = layer.style.marker {
        let shape = match marker.shape {
            MarkerShape::Circle => PlotMarker::Circle,
            MarkerShape::Cross => PlotMarker::Cross,
        };
        plot_ui.points(
            Points::new(plot_points(&layer.points))
                .name(&layer.name)
                .color(color)
                .shape(shape)
                .filled(true)
                .radius(marker.size / 2.0),
        );
    }
}
