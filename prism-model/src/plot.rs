//! Force plot rendering as inline SVG.
//!
//! Layout follows the familiar SHAP force plot: an axis in log-odds units,
//! red segments pushing the output higher stacked leftwards from f(x), blue
//! segments pushing it lower stacked rightwards, and a legend row per
//! feature underneath.

use std::fmt::Write;

use crate::explain::{Attribution, Contribution};

const WIDTH: f64 = 960.0;
const MARGIN: f64 = 40.0;
const AXIS_Y: f64 = 70.0;
const BAR_Y: f64 = 90.0;
const BAR_HEIGHT: f64 = 26.0;
const LEGEND_Y: f64 = 160.0;
const LEGEND_ROW: f64 = 20.0;
const TICKS: usize = 6;

const POSITIVE_COLOR: &str = "#ff0d57";
const NEGATIVE_COLOR: &str = "#1e88e5";
const NEUTRAL_COLOR: &str = "#999999";

/// Horizontal mapping from score to pixels
struct Scale {
    lo: f64,
    hi: f64,
}

impl Scale {
    fn for_attribution(attribution: &Attribution) -> Self {
        let pushed_up: f64 = attribution.positive().iter().map(|c| c.shap).sum();
        let pushed_down: f64 = attribution.negative().iter().map(|c| -c.shap).sum();

        let lo = (attribution.output_value - pushed_up).min(attribution.base_value);
        let hi = (attribution.output_value + pushed_down).max(attribution.base_value);
        let span = hi - lo;
        let pad = if span > 0.0 { span * 0.1 } else { 0.5 };

        Self {
            lo: lo - pad,
            hi: hi + pad,
        }
    }

    fn x(&self, value: f64) -> f64 {
        MARGIN + (value - self.lo) / (self.hi - self.lo) * (WIDTH - 2.0 * MARGIN)
    }
}

/// Render the attribution as a standalone `<svg>` element.
pub fn force_plot_svg(attribution: &Attribution) -> String {
    let scale = Scale::for_attribution(attribution);
    let height = LEGEND_Y + LEGEND_ROW * attribution.contributions.len() as f64 + 10.0;
    let mut svg = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="force-plot" viewBox="0 0 {w} {h}" width="{w}" height="{h}" font-family="Arial, Helvetica, sans-serif" font-size="12">"#,
        w = WIDTH,
        h = height
    );

    write_axis(&mut svg, &scale);

    // Red segments end at f(x); blue segments start there
    let output_x = scale.x(attribution.output_value);
    let mut right_edge = attribution.output_value;
    for contribution in attribution.positive() {
        let left_edge = right_edge - contribution.shap;
        write_segment(&mut svg, &scale, left_edge, right_edge, POSITIVE_COLOR, contribution);
        right_edge = left_edge;
    }
    let mut left_edge = attribution.output_value;
    for contribution in attribution.negative() {
        let next = left_edge - contribution.shap;
        write_segment(&mut svg, &scale, left_edge, next, NEGATIVE_COLOR, contribution);
        left_edge = next;
    }

    write_marker(&mut svg, scale.x(attribution.base_value), "base value", attribution.base_value, false);
    write_marker(&mut svg, output_x, "f(x)", attribution.output_value, true);

    for (row, contribution) in attribution.contributions.iter().enumerate() {
        write_legend_row(&mut svg, row, contribution);
    }

    svg.push_str("</svg>\n");
    svg
}

fn write_axis(svg: &mut String, scale: &Scale) {
    let _ = writeln!(
        svg,
        r##"<line x1="{:.1}" y1="{y}" x2="{:.1}" y2="{y}" stroke="#cccccc" />"##,
        MARGIN,
        WIDTH - MARGIN,
        y = AXIS_Y
    );

    let step = (scale.hi - scale.lo) / (TICKS - 1) as f64;
    for i in 0..TICKS {
        let value = scale.lo + step * i as f64;
        let x = scale.x(value);
        let _ = writeln!(
            svg,
            r##"<line x1="{x:.1}" y1="{}" x2="{x:.1}" y2="{}" stroke="#cccccc" /><text x="{x:.1}" y="{}" text-anchor="middle" fill="#888888">{:.2}</text>"##,
            AXIS_Y - 4.0,
            AXIS_Y + 4.0,
            AXIS_Y - 8.0,
            value,
            x = x
        );
    }
}

fn write_segment(
    svg: &mut String,
    scale: &Scale,
    from: f64,
    to: f64,
    color: &str,
    contribution: &Contribution,
) {
    let x1 = scale.x(from.min(to));
    let x2 = scale.x(from.max(to));
    let width = (x2 - x1).max(1.0);
    let _ = writeln!(
        svg,
        r#"<rect x="{:.1}" y="{}" width="{:.1}" height="{}" fill="{}" stroke="white" stroke-width="1"><title>{} ({:+.3})</title></rect>"#,
        x1,
        BAR_Y,
        width,
        BAR_HEIGHT,
        color,
        escape(&contribution.label()),
        contribution.shap
    );

    // Inline label only where the segment has room for it
    if width > 60.0 {
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{}" text-anchor="middle" fill="{}">{}</text>"#,
            x1 + width / 2.0,
            BAR_Y + BAR_HEIGHT + 16.0,
            color,
            escape(&contribution.label())
        );
    }
}

fn write_marker(svg: &mut String, x: f64, caption: &str, value: f64, bold: bool) {
    let weight = if bold { "bold" } else { "normal" };
    let _ = writeln!(
        svg,
        r##"<line x1="{x:.1}" y1="{}" x2="{x:.1}" y2="{}" stroke="#333333" stroke-dasharray="{}" /><text x="{x:.1}" y="{}" text-anchor="middle" font-weight="{}" fill="#333333">{} = {:.2}</text>"##,
        AXIS_Y + 6.0,
        BAR_Y + BAR_HEIGHT,
        if bold { "none" } else { "3,3" },
        if bold { AXIS_Y - 26.0 } else { AXIS_Y - 42.0 },
        weight,
        escape(caption),
        value,
        x = x
    );
}

fn write_legend_row(svg: &mut String, row: usize, contribution: &Contribution) {
    let color = if contribution.shap > 0.0 {
        POSITIVE_COLOR
    } else if contribution.shap < 0.0 {
        NEGATIVE_COLOR
    } else {
        NEUTRAL_COLOR
    };
    let y = LEGEND_Y + LEGEND_ROW * row as f64;
    let _ = writeln!(
        svg,
        r##"<rect x="{}" y="{:.1}" width="12" height="12" fill="{}" /><text x="{}" y="{:.1}" fill="#333333">{} ({:+.3})</text>"##,
        MARGIN,
        y,
        color,
        MARGIN + 18.0,
        y + 10.0,
        escape(&contribution.label()),
        contribution.shap
    );
}

/// Escape text for XML/HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
