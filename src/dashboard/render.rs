//! SVG scatter plots

use std::ops::Range;

use anyhow::Result;
use plotters::prelude::*;

use super::Scatter;

pub const PLOT_SIZE: (u32, u32) = (900, 560);
pub const PLACEHOLDER_TITLE: &str = "No Data Available";

const TITLE_FONT: (&str, u32) = ("sans-serif", 24);

fn outcome_color(outcome: &str) -> RGBColor {
    match outcome {
        "W" => RGBColor(44, 160, 44),   // Green
        "L" => RGBColor(214, 39, 40),   // Red
        _ => RGBColor(127, 127, 127),   // Gray
    }
}

/// Axis ranges padded so points never sit on the frame.
pub fn padded_bounds(scatter: &Scatter) -> (Range<f64>, Range<f64>) {
    let points = scatter.series.iter().flat_map(|s| s.points.iter());
    let (xs, ys): (Vec<f64>, Vec<f64>) = points.cloned().unzip();
    (pad(&xs), pad(&ys))
}

fn pad(values: &[f64]) -> Range<f64> {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if min == max {
        return (min - 1.0)..(max + 1.0);
    }
    let margin = (max - min) * 0.05;
    (min - margin)..(max + margin)
}

/// Renders `scatter`, or the empty placeholder when there is nothing to plot.
pub fn render_svg(scatter: Option<&Scatter>) -> Result<String> {
    match scatter {
        Some(scatter) => render_scatter(scatter),
        None => render_placeholder(),
    }
}

fn render_scatter(scatter: &Scatter) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, PLOT_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_range, y_range) = padded_bounds(scatter);
        let mut chart = ChartBuilder::on(&root)
            .caption(&scatter.title, TITLE_FONT)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc(scatter.x_label.as_str())
            .y_desc(scatter.y_label.as_str())
            .draw()?;

        for series in &scatter.series {
            let color = outcome_color(&series.outcome);
            chart
                .draw_series(
                    series
                        .points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 6, color.filled())),
                )?
                .label(series.outcome.as_str())
                .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
        }

        if !scatter.series.is_empty() {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
        root.present()?;
    }
    Ok(svg)
}

fn render_placeholder() -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, PLOT_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(PLACEHOLDER_TITLE, TITLE_FONT)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..1.0, 0.0..1.0)?;
        chart.configure_mesh().draw()?;
        root.present()?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::OutcomeSeries;

    fn scatter(points: Vec<(f64, f64)>) -> Scatter {
        Scatter {
            title: "A: PTS vs REB".into(),
            x_label: "PTS".into(),
            y_label: "REB".into(),
            series: vec![OutcomeSeries { outcome: "W".into(), points }],
        }
    }

    #[test]
    fn bounds_pad_the_data() {
        let (x, y) = padded_bounds(&scatter(vec![(10.0, 2.0), (30.0, 12.0)]));
        assert_eq!(x, 9.0..31.0);
        assert_eq!(y, 1.5..12.5);
    }

    #[test]
    fn single_value_axis_still_has_width() {
        let (x, y) = padded_bounds(&scatter(vec![(20.0, 5.0)]));
        assert_eq!(x, 19.0..21.0);
        assert_eq!(y, 4.0..6.0);
    }

    #[test]
    fn no_points_fall_back_to_unit_range() {
        let (x, y) = padded_bounds(&scatter(Vec::new()));
        assert_eq!(x, 0.0..1.0);
        assert_eq!(y, 0.0..1.0);
    }
}
