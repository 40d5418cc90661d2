use anyhow::{bail, Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::f64::consts::PI;
use std::ops::Range;

use crate::chart::{Chart, HierarchyChart, HierarchyShape, RankedBarChart, ScatterChart};
use crate::palette::{category, diverging, lighten};
use crate::{OutputFormat, RenderOptions};

/// Render a chart table to image bytes in the configured format
pub fn render_chart(chart: &Chart, title: Option<&str>, options: &RenderOptions) -> Result<Vec<u8>> {
    match options.format {
        OutputFormat::Png => render_png(chart, title, options.width, options.height),
        OutputFormat::Svg => render_svg(chart, title, options.width, options.height),
        OutputFormat::Json => bail!("JSON is a data format, not an image format"),
    }
}

fn render_png(chart: &Chart, title: Option<&str>, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; rgb_buffer_len(width, height)];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_chart(&root, chart, title)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

/// Bytes of an RGB8 frame. Widened before multiplying so large sizes don't wrap.
fn rgb_buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

fn render_svg(chart: &Chart, title: Option<&str>, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw_chart(&root, chart, title)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg.into_bytes())
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &Chart,
    title: Option<&str>,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    if chart.is_empty() {
        return draw_placeholder(root, title);
    }

    match chart {
        Chart::Scatter(c) => draw_scatter(root, c, title),
        Chart::RankedBar(c) => draw_ranked_bar(root, c, title),
        Chart::Hierarchy(c) => {
            let area = match title {
                Some(t) => root
                    .titled(t, ("sans-serif", 20).into_font())
                    .context("Failed to draw title")?,
                None => root.clone(),
            };
            match c.shape {
                HierarchyShape::Treemap => draw_treemap(&area, c),
                HierarchyShape::Sunburst => draw_sunburst(&area, c),
            }
        }
    }
}

/// Empty selections render an empty frame with a notice instead of failing
fn draw_placeholder<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: Option<&str>,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (width, height) = root.dim_in_pixel();
    let style = TextStyle::from(("sans-serif", 20).into_font()).color(&BLACK);
    if let Some(t) = title {
        root.draw_text(t, &style, (10, 10))
            .context("Failed to draw title")?;
    }
    root.draw_text("Sem dados", &style, (width as i32 / 2 - 45, height as i32 / 2))
        .context("Failed to draw placeholder")?;
    Ok(())
}

fn draw_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &ScatterChart,
    title: Option<&str>,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let xs: Vec<f64> = chart.points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = chart.points.iter().map(|p| p.y).collect();
    let (y_min, y_max) = min_max(&ys);

    let mut plot = ChartBuilder::on(root)
        .margin(10)
        .caption(title.unwrap_or(""), ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(padded_range(&xs), padded_range(&ys))
        .context("Failed to build chart")?;

    plot.configure_mesh()
        .x_desc(chart.x.label.as_str())
        .y_desc(chart.y.label.as_str())
        .draw()
        .context("Failed to draw mesh")?;

    plot.draw_series(chart.points.iter().map(|p| {
        Circle::new((p.x, p.y), 3, diverging(p.y, y_min, y_max).filled())
    }))
    .context("Failed to draw point series")?;

    Ok(())
}

fn draw_ranked_bar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &RankedBarChart,
    title: Option<&str>,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let categories: Vec<String> = chart.bars.iter().map(|b| b.key.clone()).collect();
    let values: Vec<f64> = chart.bars.iter().map(|b| b.total).collect();
    let (v_min, v_max) = min_max(&values);
    let y_range = v_min.min(0.0)..(v_max.max(0.0) * 1.05 + f64::EPSILON);
    let x_range = 0.0..(categories.len() as f64);

    let mut plot = ChartBuilder::on(root)
        .margin(10)
        .caption(title.unwrap_or(""), ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    plot.configure_mesh()
        .x_labels(categories.len())
        .x_label_formatter(&|x| {
            let idx = *x as usize;
            if idx < categories.len() {
                categories[idx].clone()
            } else {
                String::new()
            }
        })
        .x_desc(chart.group.label.as_str())
        .y_desc(chart.value.label.as_str())
        .draw()
        .context("Failed to draw mesh")?;

    let bar_width = 0.8;
    plot.draw_series(values.iter().enumerate().map(|(idx, &value)| {
        let x_center = idx as f64 + 0.5;
        Rectangle::new(
            [
                (x_center - bar_width / 2.0, 0.0),
                (x_center + bar_width / 2.0, value),
            ],
            diverging(value, v_min, v_max).filled(),
        )
    }))
    .context("Failed to draw bars")?;

    Ok(())
}

/// A pixel rectangle: top-left and bottom-right corners
pub type PixelRect = ((i32, i32), (i32, i32));

/// Slice-and-dice layout: outer groups split the width, children split
/// their group's height. Returns one rectangle per group, and per group one
/// rectangle per child.
pub fn treemap_layout(chart: &HierarchyChart, width: u32, height: u32) -> Vec<(PixelRect, Vec<PixelRect>)> {
    let total: f64 = chart.groups.iter().map(|g| g.value.max(0.0)).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut layout = Vec::with_capacity(chart.groups.len());
    let mut x = 0.0_f64;
    for group in &chart.groups {
        let group_width = width as f64 * group.value.max(0.0) / total;
        let (x0, x1) = (x.round() as i32, (x + group_width).round() as i32);
        x += group_width;

        let child_total: f64 = group.children.iter().map(|c| c.value.max(0.0)).sum();
        let mut children = Vec::with_capacity(group.children.len());
        let mut y = 0.0_f64;
        for child in &group.children {
            let child_height = if child_total > 0.0 {
                height as f64 * child.value.max(0.0) / child_total
            } else {
                0.0
            };
            children.push(((x0, y.round() as i32), (x1, (y + child_height).round() as i32)));
            y += child_height;
        }
        layout.push((((x0, 0), (x1, height as i32)), children));
    }
    layout
}

fn draw_treemap<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, chart: &HierarchyChart) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (width, height) = area.dim_in_pixel();
    let label_style = TextStyle::from(("sans-serif", 12).into_font()).color(&BLACK);

    for (idx, (group_rect, child_rects)) in treemap_layout(chart, width, height).into_iter().enumerate() {
        let group = &chart.groups[idx];
        let color = category(idx);

        for (j, (rect, child)) in child_rects.iter().zip(&group.children).enumerate() {
            let fill = lighten(color, 0.12 * (j % 4) as f64);
            area.draw(&Rectangle::new([rect.0, rect.1], fill.filled()))
                .context("Failed to draw treemap cell")?;
            area.draw(&Rectangle::new([rect.0, rect.1], WHITE.stroke_width(1)))
                .context("Failed to draw treemap border")?;
            if rect.1 .0 - rect.0 .0 > 60 && rect.1 .1 - rect.0 .1 > 16 {
                area.draw_text(&child.label, &label_style, (rect.0 .0 + 4, rect.0 .1 + 4))
                    .context("Failed to draw treemap label")?;
            }
        }

        area.draw(&Rectangle::new([group_rect.0, group_rect.1], WHITE.stroke_width(3)))
            .context("Failed to draw treemap group")?;
    }

    Ok(())
}

/// Polygon approximating an annular sector between radii `r0..r1` and
/// angles `a0..a1` (radians, clockwise from 12 o'clock).
pub fn sector_points(center: (i32, i32), r0: f64, r1: f64, a0: f64, a1: f64) -> Vec<(i32, i32)> {
    let steps = (((a1 - a0).to_degrees() / 2.0).ceil() as usize).max(2);
    let point = |r: f64, a: f64| {
        (
            center.0 + (r * a.sin()).round() as i32,
            center.1 - (r * a.cos()).round() as i32,
        )
    };

    let mut points = Vec::with_capacity(2 * steps + 2);
    for i in 0..=steps {
        points.push(point(r1, a0 + (a1 - a0) * i as f64 / steps as f64));
    }
    if r0 <= 0.0 {
        points.push(center);
    } else {
        for i in (0..=steps).rev() {
            points.push(point(r0, a0 + (a1 - a0) * i as f64 / steps as f64));
        }
    }
    points
}

fn draw_sunburst<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, chart: &HierarchyChart) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = (width.min(height) as f64 / 2.0 - 10.0).max(10.0);
    let inner = radius / 2.0;
    let label_style = TextStyle::from(("sans-serif", 12).into_font()).color(&BLACK);

    let total: f64 = chart.groups.iter().map(|g| g.value.max(0.0)).sum();
    if total <= 0.0 {
        return Ok(());
    }

    let mut angle = 0.0_f64;
    for (idx, group) in chart.groups.iter().enumerate() {
        let sweep = 2.0 * PI * group.value.max(0.0) / total;
        let color = category(idx);

        area.draw(&Polygon::new(
            sector_points(center, 0.0, inner, angle, angle + sweep),
            color.filled(),
        ))
        .context("Failed to draw sunburst sector")?;

        let child_total: f64 = group.children.iter().map(|c| c.value.max(0.0)).sum();
        let mut child_angle = angle;
        for (j, child) in group.children.iter().enumerate() {
            if child_total <= 0.0 {
                break;
            }
            let child_sweep = sweep * child.value.max(0.0) / child_total;
            area.draw(&Polygon::new(
                sector_points(center, inner + 2.0, radius, child_angle, child_angle + child_sweep),
                lighten(color, 0.25 + 0.1 * (j % 3) as f64).filled(),
            ))
            .context("Failed to draw sunburst sector")?;
            child_angle += child_sweep;
        }

        if sweep > 0.25 {
            let mid = angle + sweep / 2.0;
            let pos = (
                center.0 + (inner / 2.0 * mid.sin()) as i32 - 20,
                center.1 - (inner / 2.0 * mid.cos()) as i32,
            );
            area.draw_text(&group.label, &label_style, pos)
                .context("Failed to draw sunburst label")?;
        }

        angle += sweep;
    }

    Ok(())
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

/// Data range with 5% padding; a single value gets ±1
fn padded_range(values: &[f64]) -> Range<f64> {
    let (min, max) = min_max(values);
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Axis, HierarchyGroup, HierarchyLeaf};
    use crate::field::Field;

    fn hierarchy() -> HierarchyChart {
        HierarchyChart {
            shape: HierarchyShape::Treemap,
            outer: Field::Artist,
            inner: Field::Song,
            value: Axis::new(Field::Popularity),
            groups: vec![
                HierarchyGroup {
                    label: "A".to_string(),
                    value: 30.0,
                    children: vec![
                        HierarchyLeaf { label: "S1".to_string(), value: 20.0 },
                        HierarchyLeaf { label: "S2".to_string(), value: 10.0 },
                    ],
                },
                HierarchyGroup {
                    label: "B".to_string(),
                    value: 10.0,
                    children: vec![HierarchyLeaf { label: "S3".to_string(), value: 10.0 }],
                },
            ],
        }
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(&[0.0, 100.0]), -5.0..105.0);
        assert_eq!(padded_range(&[3.0]), 2.0..4.0);
    }

    #[test]
    fn test_treemap_layout_is_proportional() {
        let layout = treemap_layout(&hierarchy(), 400, 300);
        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].0, ((0, 0), (300, 300)));
        assert_eq!(layout[1].0, ((300, 0), (400, 300)));
        assert_eq!(layout[0].1, vec![((0, 0), (300, 200)), ((0, 200), (300, 300))]);
    }

    #[test]
    fn test_treemap_layout_of_zero_total() {
        let mut chart = hierarchy();
        for group in &mut chart.groups {
            group.value = 0.0;
        }
        assert!(treemap_layout(&chart, 400, 300).is_empty());
    }

    #[test]
    fn test_sector_points() {
        // Quarter pie from 12 o'clock to 3 o'clock
        let points = sector_points((100, 100), 0.0, 50.0, 0.0, PI / 2.0);
        assert_eq!(points.first(), Some(&(100, 50)));
        assert_eq!(points[points.len() - 2], (150, 100));
        assert_eq!(points.last(), Some(&(100, 100)));

        let ring = sector_points((0, 0), 10.0, 20.0, 0.0, PI);
        assert_eq!(ring.last(), Some(&(0, -10)));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_rgb_buffer_len_does_not_wrap() {
        assert_eq!(rgb_buffer_len(800, 600), 1_440_000);
        // 40000 * 40000 * 3 exceeds u32::MAX
        assert_eq!(rgb_buffer_len(40_000, 40_000), 4_800_000_000usize);
    }

    #[test]
    fn test_json_is_not_an_image() {
        let options = RenderOptions { format: OutputFormat::Json, ..RenderOptions::default() };
        let chart = Chart::Hierarchy(hierarchy());
        assert!(render_chart(&chart, None, &options).is_err());
    }
}
