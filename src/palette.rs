use plotters::style::RGBColor;

/// Tableau category10, used for outer hierarchy groups
pub const CATEGORY10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

pub fn category(index: usize) -> RGBColor {
    CATEGORY10[index % CATEGORY10.len()]
}

// Stops of the red-white-blue diverging scale
const RDBU: [RGBColor; 5] = [
    RGBColor(103, 0, 31),
    RGBColor(214, 96, 77),
    RGBColor(247, 247, 247),
    RGBColor(67, 147, 195),
    RGBColor(5, 48, 97),
];

/// Map `value` within `min..=max` onto the red-blue scale (low = red).
pub fn diverging(value: f64, min: f64, max: f64) -> RGBColor {
    let t = if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        0.5
    };
    let scaled = t * (RDBU.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(RDBU.len() - 2);
    let frac = scaled - lower as f64;
    blend(RDBU[lower], RDBU[lower + 1], frac)
}

/// Mix `color` towards white by `amount` (0 = unchanged, 1 = white).
pub fn lighten(color: RGBColor, amount: f64) -> RGBColor {
    blend(color, RGBColor(255, 255, 255), amount)
}

fn blend(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
