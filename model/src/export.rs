use std::fmt::Write;
use std::path::Path;

use crate::{Error, Scene, TextPosition, Trace};

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 800.0;
// Room for the axis titles and tick labels
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_BOTTOM: f64 = 60.0;
const MARGIN_TOP: f64 = 50.0;
// Room for the legend
const MARGIN_RIGHT: f64 = 220.0;
const NUM_TICKS: usize = 5;

/// Overwrites `path` with a standalone HTML page drawing the scene. The scene itself is embedded
/// as JSON, so nothing else needs to be shipped alongside it.
pub fn write_html<P: AsRef<Path>>(scene: &Scene, path: P) -> Result<(), Error> {
    let path = path.as_ref();
    let export_err = |source: std::io::Error| Error::Export {
        path: path.to_path_buf(),
        source,
    };
    let html = render_html(scene).map_err(|err| export_err(err.into()))?;
    fs_err::write(path, html).map_err(export_err)?;
    info!("Wrote {}", path.display());
    Ok(())
}

pub fn render_html(scene: &Scene) -> Result<String, serde_json::Error> {
    // "</" would end the script block early
    let json = serde_json::to_string(scene)?.replace("</", "<\\/");

    let mut html = String::new();
    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html>");
    let _ = writeln!(html, "<head>");
    let _ = writeln!(html, "  <meta charset=\"utf-8\">");
    let _ = writeln!(html, "  <title>{}</title>", escape(&scene.title));
    let _ = writeln!(
        html,
        "  <style>body {{ font-family: sans-serif; background: white; }}</style>"
    );
    let _ = writeln!(html, "</head>");
    let _ = writeln!(html, "<body>");
    html.push_str(&render_svg(scene));
    let _ = writeln!(
        html,
        "<script type=\"application/json\" id=\"scene\">{json}</script>"
    );
    let _ = writeln!(html, "</body>");
    let _ = writeln!(html, "</html>");
    Ok(html)
}

/// Maps scene coordinates into the plot area, with y pointing up
struct Frame {
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Frame {
    fn new(scene: &Scene) -> Self {
        Self {
            x_range: non_empty(scene.x_axis.range),
            y_range: non_empty(scene.y_axis.range),
        }
    }

    fn plot_width() -> f64 {
        WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height() -> f64 {
        HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn to_screen(&self, (x, y): (f64, f64)) -> (f64, f64) {
        let pct_x = (x - self.x_range.0) / (self.x_range.1 - self.x_range.0);
        let pct_y = (y - self.y_range.0) / (self.y_range.1 - self.y_range.0);
        (
            MARGIN_LEFT + pct_x * Self::plot_width(),
            MARGIN_TOP + (1.0 - pct_y) * Self::plot_height(),
        )
    }
}

// A zero-width range would divide by zero
fn non_empty((min, max): (f64, f64)) -> (f64, f64) {
    if max > min {
        (min, max)
    } else {
        (min, min + 1.0)
    }
}

fn render_svg(scene: &Scene) -> String {
    let frame = Frame::new(scene);
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH:.0}\" height=\"{HEIGHT:.0}\" viewBox=\"0 0 {WIDTH:.0} {HEIGHT:.0}\">"
    );
    let _ = writeln!(
        svg,
        "  <clipPath id=\"plot-area\"><rect x=\"{MARGIN_LEFT}\" y=\"{MARGIN_TOP}\" width=\"{}\" height=\"{}\"/></clipPath>",
        Frame::plot_width(),
        Frame::plot_height()
    );
    let _ = writeln!(
        svg,
        "  <text x=\"{}\" y=\"30\" text-anchor=\"middle\" font-size=\"20\">{}</text>",
        MARGIN_LEFT + Frame::plot_width() / 2.0,
        escape(&scene.title)
    );
    draw_axes(&mut svg, scene, &frame);

    let _ = writeln!(svg, "  <g clip-path=\"url(#plot-area)\">");
    for trace in &scene.traces {
        match trace {
            Trace::Centerline(line) => {
                let _ = writeln!(
                    svg,
                    "    <polyline fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" points=\"{}\"><title>{}</title></polyline>",
                    line.color,
                    line.width,
                    svg_points(&frame, &line.points),
                    escape(&line.name)
                );
            }
            Trace::Label(label) => {
                let (x, y) = frame.to_screen(label.pos);
                // Multi-line labels stack upwards from the point
                let lines: Vec<&str> = label.text.split('\n').collect();
                let first_line_y = match label.text_position {
                    TextPosition::TopCenter => y - 6.0 - 14.0 * (lines.len() - 1) as f64,
                };
                let _ = write!(
                    svg,
                    "    <text x=\"{x:.2}\" y=\"{first_line_y:.2}\" text-anchor=\"middle\" font-size=\"12\">"
                );
                for (idx, line) in lines.iter().enumerate() {
                    let dy = if idx == 0 { 0 } else { 14 };
                    let _ = write!(
                        svg,
                        "<tspan x=\"{x:.2}\" dy=\"{dy}\">{}</tspan>",
                        escape(line)
                    );
                }
                let _ = writeln!(svg, "</text>");
            }
            Trace::Vehicle(vehicle) => {
                let _ = writeln!(
                    svg,
                    "    <g fill=\"{}\" stroke=\"none\"><title>{}</title>",
                    vehicle.color,
                    escape(&vehicle.name)
                );
                for (pt, hover) in vehicle.points.iter().zip(&vehicle.hover) {
                    let (x, y) = frame.to_screen(*pt);
                    let _ = writeln!(
                        svg,
                        "      <circle cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{}\"><title>{}\nx: {}\ny: {}</title></circle>",
                        vehicle.marker_size / 2.0,
                        escape(hover),
                        pt.0,
                        pt.1
                    );
                }
                let _ = writeln!(svg, "    </g>");
            }
        }
    }
    let _ = writeln!(svg, "  </g>");

    draw_legend(&mut svg, scene);
    let _ = writeln!(svg, "</svg>");
    svg
}

fn draw_axes(svg: &mut String, scene: &Scene, frame: &Frame) {
    let left = MARGIN_LEFT;
    let right = MARGIN_LEFT + Frame::plot_width();
    let top = MARGIN_TOP;
    let bottom = MARGIN_TOP + Frame::plot_height();
    let _ = writeln!(
        svg,
        "  <rect x=\"{left}\" y=\"{top}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"#444444\"/>",
        right - left,
        bottom - top
    );

    for i in 0..=NUM_TICKS {
        let pct = i as f64 / NUM_TICKS as f64;

        let value = frame.x_range.0 + pct * (frame.x_range.1 - frame.x_range.0);
        let (x, _) = frame.to_screen((value, frame.y_range.0));
        let _ = writeln!(
            svg,
            "  <line x1=\"{x:.2}\" y1=\"{top}\" x2=\"{x:.2}\" y2=\"{bottom}\" stroke=\"#EEEEEE\"/>"
        );
        let _ = writeln!(
            svg,
            "  <text x=\"{x:.2}\" y=\"{}\" text-anchor=\"middle\" font-size=\"11\">{value:.0}</text>",
            bottom + 16.0
        );

        let value = frame.y_range.0 + pct * (frame.y_range.1 - frame.y_range.0);
        let (_, y) = frame.to_screen((frame.x_range.0, value));
        let _ = writeln!(
            svg,
            "  <line x1=\"{left}\" y1=\"{y:.2}\" x2=\"{right}\" y2=\"{y:.2}\" stroke=\"#EEEEEE\"/>"
        );
        let _ = writeln!(
            svg,
            "  <text x=\"{}\" y=\"{:.2}\" text-anchor=\"end\" font-size=\"11\">{value:.0}</text>",
            left - 6.0,
            y + 4.0
        );
    }

    let _ = writeln!(
        svg,
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"14\">{}</text>",
        (left + right) / 2.0,
        bottom + 40.0,
        escape(&scene.x_axis.title)
    );
    let mid_y = (top + bottom) / 2.0;
    let _ = writeln!(
        svg,
        "  <text x=\"20\" y=\"{mid_y}\" text-anchor=\"middle\" font-size=\"14\" transform=\"rotate(-90 20 {mid_y})\">{}</text>",
        escape(&scene.y_axis.title)
    );
}

fn draw_legend(svg: &mut String, scene: &Scene) {
    let x = WIDTH - MARGIN_RIGHT + 20.0;
    let mut y = MARGIN_TOP + 10.0;
    let _ = writeln!(
        svg,
        "  <text x=\"{x}\" y=\"{y}\" font-size=\"13\" font-weight=\"bold\">{}</text>",
        escape(&scene.legend_title)
    );
    for trace in &scene.traces {
        let (name, color, is_line) = match trace {
            Trace::Centerline(line) => (&line.name, &line.color, true),
            Trace::Vehicle(vehicle) => (&vehicle.name, &vehicle.color, false),
            Trace::Label(_) => continue,
        };
        y += 18.0;
        if is_line {
            let _ = writeln!(
                svg,
                "  <line x1=\"{x}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{color}\" stroke-width=\"2\"/>",
                y - 4.0,
                x + 16.0,
                y - 4.0
            );
        } else {
            let _ = writeln!(
                svg,
                "  <circle cx=\"{}\" cy=\"{}\" r=\"4\" fill=\"{color}\"/>",
                x + 8.0,
                y - 4.0
            );
        }
        // The legend only has room for one line
        let _ = writeln!(
            svg,
            "  <text x=\"{}\" y=\"{y}\" font-size=\"12\">{}</text>",
            x + 24.0,
            escape(&name.replace('\n', " "))
        );
    }
}

fn svg_points(frame: &Frame, points: &[(f64, f64)]) -> String {
    let mut out = String::new();
    for pt in points {
        let (x, y) = frame.to_screen(*pt);
        let _ = write!(out, "{x:.2},{y:.2} ");
    }
    out.trim_end().to_string()
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
