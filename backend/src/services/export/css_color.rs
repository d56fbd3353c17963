//! Resolution of CSS Color 4 functions (`oklch()`, `oklab()`, `lab()`, `lch()`)
//! into sRGB literals the SVG rasterizer understands.

use std::f64::consts::PI;

/// Color functions the rasterizer cannot parse
pub const MODERN_COLOR_FUNCTIONS: [&str; 4] = ["oklch", "oklab", "lab", "lch"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorParseError {
    #[error("unterminated color function starting at byte {0}")]
    Unterminated(usize),

    #[error("invalid {function}() arguments: {args}")]
    InvalidArguments { function: String, args: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    /// `#rrggbb` when opaque, `rgba(r, g, b, a)` otherwise
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let alpha = (self.a * 1000.0).round() / 1000.0;
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
        }
    }
}

/// Position and function name of the next modern color function at or after `from`.
///
/// `haystack` must already be ASCII-lowercased; byte offsets are shared with
/// the original markup.
fn find_function(haystack: &str, from: usize) -> Option<(usize, &'static str)> {
    let bytes = haystack.as_bytes();
    let mut best: Option<(usize, &'static str)> = None;

    for name in MODERN_COLOR_FUNCTIONS {
        let pattern = format!("{}(", name);
        let mut search = from;
        while let Some(offset) = haystack[search..].find(&pattern) {
            let start = search + offset;
            // "lab(" inside "oklab(" is not a match of its own
            let preceded_by_ident = start > 0 && {
                let prev = bytes[start - 1];
                prev.is_ascii_alphanumeric() || prev == b'-' || prev == b'_'
            };
            if !preceded_by_ident {
                if best.map_or(true, |(pos, _)| start < pos) {
                    best = Some((start, name));
                }
                break;
            }
            search = start + pattern.len();
        }
    }

    best
}

/// CSS function names are ASCII case-insensitive
pub fn contains_modern_color_function(input: &str) -> bool {
    find_function(&input.to_ascii_lowercase(), 0).is_some()
}

/// Replace every modern color function in `input` with a plain sRGB literal
pub fn rewrite_modern_colors(input: &str) -> Result<String, ColorParseError> {
    let lowered = input.to_ascii_lowercase();
    let mut output = String::with_capacity(input.len());
    let mut cursor = 0;

    while let Some((start, name)) = find_function(&lowered, cursor) {
        let args_start = start + name.len() + 1;
        let close = lowered[args_start..]
            .find(')')
            .map(|offset| args_start + offset)
            .ok_or(ColorParseError::Unterminated(start))?;

        let color = parse_function(name, &lowered[args_start..close])?;

        output.push_str(&input[cursor..start]);
        output.push_str(&color.to_css());
        cursor = close + 1;
    }

    output.push_str(&input[cursor..]);
    Ok(output)
}

/// Parse the body of one color function, e.g. `name = "oklch"`, `args = "0.7 0.1 145 / 50%"`
pub fn parse_function(name: &str, args: &str) -> Result<Rgba, ColorParseError> {
    let invalid = || ColorParseError::InvalidArguments {
        function: name.to_string(),
        args: args.trim().to_string(),
    };

    let (channels, alpha) = match args.split_once('/') {
        Some((channels, alpha)) => (channels, Some(alpha.trim())),
        None => (args, None),
    };

    let parts: Vec<&str> = channels
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 {
        return Err(invalid());
    }

    let alpha = match alpha {
        Some(raw) => number_or_percent(raw, 1.0).ok_or_else(invalid)?.clamp(0.0, 1.0),
        None => 1.0,
    };

    let (r, g, b) = match name {
        "oklab" => {
            let l = number_or_percent(parts[0], 1.0).ok_or_else(invalid)?;
            let a = number_or_percent(parts[1], 0.4).ok_or_else(invalid)?;
            let b = number_or_percent(parts[2], 0.4).ok_or_else(invalid)?;
            oklab_to_linear_srgb(l, a, b)
        }
        "oklch" => {
            let l = number_or_percent(parts[0], 1.0).ok_or_else(invalid)?;
            let c = number_or_percent(parts[1], 0.4).ok_or_else(invalid)?;
            let h = hue_radians(parts[2]).ok_or_else(invalid)?;
            oklab_to_linear_srgb(l, c * h.cos(), c * h.sin())
        }
        "lab" => {
            let l = number_or_percent(parts[0], 100.0).ok_or_else(invalid)?;
            let a = number_or_percent(parts[1], 125.0).ok_or_else(invalid)?;
            let b = number_or_percent(parts[2], 125.0).ok_or_else(invalid)?;
            lab_to_linear_srgb(l, a, b)
        }
        "lch" => {
            let l = number_or_percent(parts[0], 100.0).ok_or_else(invalid)?;
            let c = number_or_percent(parts[1], 150.0).ok_or_else(invalid)?;
            let h = hue_radians(parts[2]).ok_or_else(invalid)?;
            lab_to_linear_srgb(l, c * h.cos(), c * h.sin())
        }
        _ => return Err(invalid()),
    };

    Ok(Rgba {
        r: encode_channel(r),
        g: encode_channel(g),
        b: encode_channel(b),
        a: alpha,
    })
}

/// Plain number, or a percentage of `percent_reference`; `none` reads as zero
fn number_or_percent(raw: &str, percent_reference: f64) -> Option<f64> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") {
        return Some(0.0);
    }
    match raw.strip_suffix('%') {
        Some(pct) => pct.parse::<f64>().ok().map(|v| v / 100.0 * percent_reference),
        None => raw.parse::<f64>().ok(),
    }
    .filter(|v| v.is_finite())
}

fn hue_radians(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") {
        return Some(0.0);
    }

    let degrees = if let Some(v) = raw.strip_suffix("deg") {
        v.parse::<f64>().ok()?
    } else if let Some(v) = raw.strip_suffix("grad") {
        v.parse::<f64>().ok()? * 0.9
    } else if let Some(v) = raw.strip_suffix("rad") {
        v.parse::<f64>().ok()? * 180.0 / PI
    } else if let Some(v) = raw.strip_suffix("turn") {
        v.parse::<f64>().ok()? * 360.0
    } else {
        raw.parse::<f64>().ok()?
    };

    degrees.is_finite().then(|| degrees.to_radians())
}

fn oklab_to_linear_srgb(l: f64, a: f64, b: f64) -> (f64, f64, f64) {
    let l_ = l + 0.396_337_777_4 * a + 0.215_803_757_3 * b;
    let m_ = l - 0.105_561_345_8 * a - 0.063_854_172_8 * b;
    let s_ = l - 0.089_484_177_5 * a - 1.291_485_548_0 * b;

    let (l3, m3, s3) = (l_.powi(3), m_.powi(3), s_.powi(3));

    (
        4.076_741_662_1 * l3 - 3.307_711_591_3 * m3 + 0.230_969_929_2 * s3,
        -1.268_438_004_6 * l3 + 2.609_757_401_1 * m3 - 0.341_319_396_5 * s3,
        -0.004_196_086_3 * l3 - 0.703_418_614_7 * m3 + 1.707_614_701_0 * s3,
    )
}

/// CIE Lab (D50) to linear sRGB (D65) through Bradford-adapted XYZ
fn lab_to_linear_srgb(l: f64, a: f64, b: f64) -> (f64, f64, f64) {
    const EPSILON: f64 = 216.0 / 24389.0;
    const KAPPA: f64 = 24389.0 / 27.0;
    const WHITE_D50: [f64; 3] = [0.3457 / 0.3585, 1.0, (1.0 - 0.3457 - 0.3585) / 0.3585];

    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let xr = if fx.powi(3) > EPSILON {
        fx.powi(3)
    } else {
        (116.0 * fx - 16.0) / KAPPA
    };
    let yr = if l > KAPPA * EPSILON {
        fy.powi(3)
    } else {
        l / KAPPA
    };
    let zr = if fz.powi(3) > EPSILON {
        fz.powi(3)
    } else {
        (116.0 * fz - 16.0) / KAPPA
    };

    let (x50, y50, z50) = (xr * WHITE_D50[0], yr * WHITE_D50[1], zr * WHITE_D50[2]);

    let x = 0.955_473_452_704_218_2 * x50 - 0.023_098_536_874_261_423 * y50
        + 0.063_259_308_661_021_7 * z50;
    let y = -0.028_369_706_963_208_136 * x50 + 1.009_995_458_005_822_6 * y50
        + 0.021_041_398_966_943_008 * z50;
    let z = 0.012_314_001_688_319_899 * x50 - 0.020_507_696_433_477_912 * y50
        + 1.330_365_936_608_075_3 * z50;

    (
        3.240_969_941_904_522_6 * x - 1.537_383_177_570_094 * y - 0.498_610_760_293_003_4 * z,
        -0.969_243_636_280_879_6 * x + 1.875_967_501_507_720_2 * y + 0.041_555_057_407_175_59 * z,
        0.055_630_079_696_993_66 * x - 0.203_976_958_888_976_52 * y + 1.056_971_514_242_878_6 * z,
    )
}

/// Gamma-encode a linear channel, clipping out-of-gamut values
fn encode_channel(linear: f64) -> u8 {
    let linear = linear.clamp(0.0, 1.0);
    let encoded = if linear <= 0.003_130_8 {
        12.92 * linear
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    };
    (encoded * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(color: Rgba, expected: (u8, u8, u8)) -> bool {
        let diff = |a: u8, b: u8| (a as i16 - b as i16).abs() <= 1;
        diff(color.r, expected.0) && diff(color.g, expected.1) && diff(color.b, expected.2)
    }

    #[test]
    fn test_oklch_extremes() {
        assert_eq!(parse_function("oklch", "1 0 0").unwrap().to_css(), "#ffffff");
        assert_eq!(parse_function("oklch", "0 0 0").unwrap().to_css(), "#000000");
        assert_eq!(parse_function("oklch", "100% 0 0").unwrap().to_css(), "#ffffff");
    }

    #[test]
    fn test_oklab_red() {
        let red = parse_function("oklab", "0.62796 0.22486 0.12585").unwrap();
        assert!(close(red, (255, 0, 0)), "{:?}", red);
    }

    #[test]
    fn test_oklch_blue_with_units() {
        // sRGB blue is oklch(0.45201 0.31321 264.052)
        let blue = parse_function("oklch", "45.201% 0.31321 264.052deg").unwrap();
        assert!(close(blue, (0, 0, 255)), "{:?}", blue);

        let turns = parse_function("oklch", "0.45201 0.31321 0.733478turn").unwrap();
        assert!(close(turns, (0, 0, 255)), "{:?}", turns);
    }

    #[test]
    fn test_lab_white_and_gray() {
        let white = parse_function("lab", "100 0 0").unwrap();
        assert!(close(white, (255, 255, 255)), "{:?}", white);

        let gray = parse_function("lch", "50% 0 0").unwrap();
        assert!(close(gray, (119, 119, 119)), "{:?}", gray);
    }

    #[test]
    fn test_alpha_channel() {
        let color = parse_function("oklch", "1 0 0 / 50%").unwrap();
        assert_eq!(color.a, 0.5);
        assert_eq!(color.to_css(), "rgba(255, 255, 255, 0.5)");
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(parse_function("oklch", "0.5 0.1").is_err());
        assert!(parse_function("oklch", "bright 0.1 10").is_err());
        assert!(parse_function("lab", "50 10 10 10").is_err());
    }

    #[test]
    fn test_rewrite_replaces_every_function() {
        let svg = r#"<rect fill="oklch(1 0 0)"/><rect style="fill: oklab(0 0 0); stroke: #123456"/>"#;
        let rewritten = rewrite_modern_colors(svg).unwrap();

        assert_eq!(
            rewritten,
            r##"<rect fill="#ffffff"/><rect style="fill: #000000; stroke: #123456"/>"##
        );
        assert!(!contains_modern_color_function(&rewritten));
    }

    #[test]
    fn test_rewrite_leaves_plain_markup_alone() {
        let svg = r#"<rect fill="rgb(1, 2, 3)" class="collab(x)"/>"#;
        assert!(!contains_modern_color_function(svg));
        assert_eq!(rewrite_modern_colors(svg).unwrap(), svg);
    }

    #[test]
    fn test_function_names_ignore_case() {
        let svg = r#"<rect fill="OKLCH(1 0 0DEG)"/><rect fill="Lab(0 0 0)"/>"#;
        assert!(contains_modern_color_function(svg));
        assert_eq!(
            rewrite_modern_colors(svg).unwrap(),
            r##"<rect fill="#ffffff"/><rect fill="#000000"/>"##
        );
    }

    #[test]
    fn test_rewrite_reports_unterminated_function() {
        assert_eq!(
            rewrite_modern_colors("fill: lch(50 10 10"),
            Err(ColorParseError::Unterminated(6))
        );
    }
}
