// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use std::str::FromStr;

use serde::Deserialize;

use crate::display::DisplaySlot;

/// A 24-bit RGB color.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    const fn hex(v: u32) -> Self {
        Self::rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    pub const WHITE: Color = Color::hex(0xffffff);
    pub const BLACK: Color = Color::hex(0x000000);
    pub const GRAY: Color = Color::hex(0x808080);
    pub const LIGHT_GRAY: Color = Color::hex(0xd3d3d3);
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Error from parsing a color string.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorParseError(String);

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognized color {:?}", self.0)
    }
}

impl std::error::Error for ColorParseError {}

/// CSS4 named colors.
const CSS4_COLORS: &[(&str, u32)] = &[
    ("aliceblue", 0xf0f8ff),
    ("antiquewhite", 0xfaebd7),
    ("aqua", 0x00ffff),
    ("aquamarine", 0x7fffd4),
    ("azure", 0xf0ffff),
    ("beige", 0xf5f5dc),
    ("bisque", 0xffe4c4),
    ("black", 0x000000),
    ("blanchedalmond", 0xffebcd),
    ("blue", 0x0000ff),
    ("blueviolet", 0x8a2be2),
    ("brown", 0xa52a2a),
    ("burlywood", 0xdeb887),
    ("cadetblue", 0x5f9ea0),
    ("chartreuse", 0x7fff00),
    ("chocolate", 0xd2691e),
    ("coral", 0xff7f50),
    ("cornflowerblue", 0x6495ed),
    ("cornsilk", 0xfff8dc),
    ("crimson", 0xdc143c),
    ("cyan", 0x00ffff),
    ("darkblue", 0x00008b),
    ("darkcyan", 0x008b8b),
    ("darkgoldenrod", 0xb8860b),
    ("darkgray", 0xa9a9a9),
    ("darkgreen", 0x006400),
    ("darkgrey", 0xa9a9a9),
    ("darkkhaki", 0xbdb76b),
    ("darkmagenta", 0x8b008b),
    ("darkolivegreen", 0x556b2f),
    ("darkorange", 0xff8c00),
    ("darkorchid", 0x9932cc),
    ("darkred", 0x8b0000),
    ("darksalmon", 0xe9967a),
    ("darkseagreen", 0x8fbc8f),
    ("darkslateblue", 0x483d8b),
    ("darkslategray", 0x2f4f4f),
    ("darkslategrey", 0x2f4f4f),
    ("darkturquoise", 0x00ced1),
    ("darkviolet", 0x9400d3),
    ("deeppink", 0xff1493),
    ("deepskyblue", 0x00bfff),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1e90ff),
    ("firebrick", 0xb22222),
    ("floralwhite", 0xfffaf0),
    ("forestgreen", 0x228b22),
    ("fuchsia", 0xff00ff),
    ("gainsboro", 0xdcdcdc),
    ("ghostwhite", 0xf8f8ff),
    ("gold", 0xffd700),
    ("goldenrod", 0xdaa520),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xadff2f),
    ("grey", 0x808080),
    ("honeydew", 0xf0fff0),
    ("hotpink", 0xff69b4),
    ("indianred", 0xcd5c5c),
    ("indigo", 0x4b0082),
    ("ivory", 0xfffff0),
    ("khaki", 0xf0e68c),
    ("lavender", 0xe6e6fa),
    ("lavenderblush", 0xfff0f5),
    ("lawngreen", 0x7cfc00),
    ("lemonchiffon", 0xfffacd),
    ("lightblue", 0xadd8e6),
    ("lightcoral", 0xf08080),
    ("lightcyan", 0xe0ffff),
    ("lightgoldenrodyellow", 0xfafad2),
    ("lightgray", 0xd3d3d3),
    ("lightgreen", 0x90ee90),
    ("lightgrey", 0xd3d3d3),
    ("lightpink", 0xffb6c1),
    ("lightsalmon", 0xffa07a),
    ("lightseagreen", 0x20b2aa),
    ("lightskyblue", 0x87cefa),
    ("lightslategray", 0x778899),
    ("lightslategrey", 0x778899),
    ("lightsteelblue", 0xb0c4de),
    ("lightyellow", 0xffffe0),
    ("lime", 0x00ff00),
    ("limegreen", 0x32cd32),
    ("linen", 0xfaf0e6),
    ("magenta", 0xff00ff),
    ("maroon", 0x800000),
    ("mediumaquamarine", 0x66cdaa),
    ("mediumblue", 0x0000cd),
    ("mediumorchid", 0xba55d3),
    ("mediumpurple", 0x9370db),
    ("mediumseagreen", 0x3cb371),
    ("mediumslateblue", 0x7b68ee),
    ("mediumspringgreen", 0x00fa9a),
    ("mediumturquoise", 0x48d1cc),
    ("mediumvioletred", 0xc71585),
    ("midnightblue", 0x191970),
    ("mintcream", 0xf5fffa),
    ("mistyrose", 0xffe4e1),
    ("moccasin", 0xffe4b5),
    ("navajowhite", 0xffdead),
    ("navy", 0x000080),
    ("oldlace", 0xfdf5e6),
    ("olive", 0x808000),
    ("olivedrab", 0x6b8e23),
    ("orange", 0xffa500),
    ("orangered", 0xff4500),
    ("orchid", 0xda70d6),
    ("palegoldenrod", 0xeee8aa),
    ("palegreen", 0x98fb98),
    ("paleturquoise", 0xafeeee),
    ("palevioletred", 0xdb7093),
    ("papayawhip", 0xffefd5),
    ("peachpuff", 0xffdab9),
    ("peru", 0xcd853f),
    ("pink", 0xffc0cb),
    ("plum", 0xdda0dd),
    ("powderblue", 0xb0e0e6),
    ("purple", 0x800080),
    ("rebeccapurple", 0x663399),
    ("red", 0xff0000),
    ("rosybrown", 0xbc8f8f),
    ("royalblue", 0x4169e1),
    ("saddlebrown", 0x8b4513),
    ("salmon", 0xfa8072),
    ("sandybrown", 0xf4a460),
    ("seagreen", 0x2e8b57),
    ("seashell", 0xfff5ee),
    ("sienna", 0xa0522d),
    ("silver", 0xc0c0c0),
    ("skyblue", 0x87ceeb),
    ("slateblue", 0x6a5acd),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("snow", 0xfffafa),
    ("springgreen", 0x00ff7f),
    ("steelblue", 0x4682b4),
    ("tan", 0xd2b48c),
    ("teal", 0x008080),
    ("thistle", 0xd8bfd8),
    ("tomato", 0xff6347),
    ("turquoise", 0x40e0d0),
    ("violet", 0xee82ee),
    ("wheat", 0xf5deb3),
    ("white", 0xffffff),
    ("whitesmoke", 0xf5f5f5),
    ("yellow", 0xffff00),
    ("yellowgreen", 0x9acd32),
];

/// Single-letter base colors.
const BASE_COLORS: &[(&str, u32)] = &[
    ("b", 0x0000ff),
    ("g", 0x008000),
    ("r", 0xff0000),
    ("c", 0x00bfbf),
    ("m", 0xbf00bf),
    ("y", 0xbfbf00),
    ("k", 0x000000),
    ("w", 0xffffff),
];

/// `tab:` colors, in the order of the default `C0`..`C9` property cycle.
const TAB_COLORS: &[(&str, u32)] = &[
    ("blue", 0x1f77b4),
    ("orange", 0xff7f0e),
    ("green", 0x2ca02c),
    ("red", 0xd62728),
    ("purple", 0x9467bd),
    ("brown", 0x8c564b),
    ("pink", 0xe377c2),
    ("gray", 0x7f7f7f),
    ("olive", 0xbcbd22),
    ("cyan", 0x17becf),
];

fn lookup(table: &[(&str, u32)], name: &str) -> Option<Color> {
    table
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| Color::hex(*v))
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 | 4 => {
            let v = u32::from_str_radix(&hex[..3], 16).ok()?;
            let expand = |n: u32| ((n & 0xf) * 0x11) as u8;
            Some(Color::rgb(expand(v >> 8), expand(v >> 4), expand(v)))
        }
        6 | 8 => Some(Color::hex(u32::from_str_radix(&hex[..6], 16).ok()?)),
        _ => None,
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts `#RGB[A]` and `#RRGGBB[AA]` (alpha dropped), CSS4 names,
    /// single-letter base colors, `tab:<name>`, `C0`..`C9` and grayscale
    /// levels written as a number in `[0, 1]` such as `"0.5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();

        let color = if let Some(hex) = s.strip_prefix('#') {
            parse_hex(hex)
        } else if let Some(name) = lower.strip_prefix("tab:") {
            let name = if name == "grey" { "gray" } else { name };
            lookup(TAB_COLORS, name)
        } else if let Some(idx) = s.strip_prefix('C').and_then(|n| n.parse::<usize>().ok()) {
            // The cycle wraps like the default property cycle.
            Some(Color::hex(TAB_COLORS[idx % TAB_COLORS.len()].1))
        } else if let Ok(level) = s.parse::<f64>() {
            (0.0..=1.0)
                .contains(&level)
                .then(|| {
                    let v = (level * 255.0).round() as u8;
                    Color::rgb(v, v, v)
                })
        } else if s.len() == 1 {
            lookup(BASE_COLORS, s)
        } else {
            lookup(CSS4_COLORS, &lower)
        };

        color.ok_or_else(|| ColorParseError(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Tableau 10 qualitative palette.
pub const TABLEAU_10: [Color; 10] = [
    Color::hex(0x4e79a7),
    Color::hex(0xf28e2b),
    Color::hex(0xe15759),
    Color::hex(0x76b7b2),
    Color::hex(0x59a14f),
    Color::hex(0xedc948),
    Color::hex(0xb07aa1),
    Color::hex(0xff9da7),
    Color::hex(0x9c755f),
    Color::hex(0xbab0ac),
];

/// The 20-color categorical ramp used once the slots outnumber `TABLEAU_10`.
pub const TAB_20: [Color; 20] = [
    Color::hex(0x1f77b4),
    Color::hex(0xaec7e8),
    Color::hex(0xff7f0e),
    Color::hex(0xffbb78),
    Color::hex(0x2ca02c),
    Color::hex(0x98df8a),
    Color::hex(0xd62728),
    Color::hex(0xff9896),
    Color::hex(0x9467bd),
    Color::hex(0xc5b0d5),
    Color::hex(0x8c564b),
    Color::hex(0xc49c94),
    Color::hex(0xe377c2),
    Color::hex(0xf7b6d2),
    Color::hex(0x7f7f7f),
    Color::hex(0xc7c7c7),
    Color::hex(0xbcbd22),
    Color::hex(0xdbdb8d),
    Color::hex(0x17becf),
    Color::hex(0x9edae5),
];

/// Returns `n` base colors, one per slot position.
pub fn palette(n: usize) -> Vec<Color> {
    if n <= TABLEAU_10.len() {
        return TABLEAU_10[..n].to_vec();
    }
    (0..n)
        .map(|i| {
            let x = i as f64 / n as f64;
            let idx = ((x * TAB_20.len() as f64) as usize).min(TAB_20.len() - 1);
            TAB_20[idx]
        })
        .collect()
}

/// A display slot whose color has been resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSlot {
    pub label: String,
    pub value: f64,
    pub color: Color,
}

/// Fills absent slot colors from the palette. A slot without a color takes
/// the palette entry at its own position, so explicit colors never shift the
/// palette index of later slots.
pub fn resolve_colors(slots: Vec<DisplaySlot>) -> Vec<ChartSlot> {
    let base = palette(slots.len());
    slots
        .into_iter()
        .zip(base)
        .map(|(slot, fallback)| ChartSlot {
            label: slot.label,
            value: slot.value,
            color: slot.color.unwrap_or(fallback),
        })
        .collect()
}
