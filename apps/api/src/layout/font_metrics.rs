//! Static font-metric tables for the PDF standard-14 text fonts.
//!
//! Widths come from the Adobe core-font AFM files, divided by 1000 so they are
//! in em units (relative to the font size). Because exported PDFs reference the
//! same standard fonts, the wrap widths computed here match what the viewer
//! draws.
//!
//! Each table covers the WinAnsi character set: ASCII 0x20..=0x7E plus the
//! upper half 0x80..=0xFF. Characters WinAnsi cannot encode fall back to
//! `average_char_width`; the exporter reports them as lost.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Default export font.
    Helvetica,
    TimesRoman,
    /// Monospaced; every glyph is 0.6em.
    Courier,
}

impl FontFamily {
    /// `BaseFont` name written into the PDF font dictionary.
    pub fn base_font_name(self) -> &'static str {
        match self {
            FontFamily::Helvetica => "Helvetica",
            FontFamily::TimesRoman => "Times-Roman",
            FontFamily::Courier => "Courier",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a font family.
///
/// `widths[i]` = width of ASCII character `(i + 32)` in em.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub font: FontFamily,
    widths: [f32; 95],
    /// Widths of WinAnsi codes 0x80..=0xFF, indexed by `code - 0x80`.
    upper: [f32; 128],
    /// Fallback width for characters outside the table.
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    pub fn char_width(&self, c: char) -> f32 {
        match win_ansi_byte(c) {
            Some(b @ 0x20..=0x7E) => self.widths[(b - 0x20) as usize],
            Some(b @ 0x80..=0xFF) => self.upper[(b - 0x80) as usize],
            _ => self.average_char_width,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WinAnsi encoding
// ────────────────────────────────────────────────────────────────────────────

/// WinAnsi (CP1252) code for `c`, or `None` if the standard fonts cannot draw it.
///
/// Control characters are `None`; the five codes CP1252 leaves undefined
/// (0x81, 0x8D, 0x8F, 0x90, 0x9D) are never produced.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' => c as u8,
        '\u{00A0}'..='\u{00FF}' => c as u32 as u8,
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable + 128 upper-half codes each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Helvetica,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    #[rustfmt::skip]
    upper: [
        // 0x80: €      -      ‚      ƒ      „      …      †      ‡      ˆ      ‰      Š      ‹      Œ      -      Ž      -
        0.556, 0.350, 0.222, 0.556, 0.333, 1.000, 0.556, 0.556, 0.333, 1.000, 0.667, 0.333, 1.000, 0.350, 0.611, 0.350,
        // 0x90: -      '      '      "      "      •      ndash  mdash  ˜      ™      š      ›      œ      -      ž      Ÿ
        0.350, 0.222, 0.222, 0.333, 0.333, 0.350, 0.556, 1.000, 0.333, 1.000, 0.500, 0.333, 0.944, 0.350, 0.500, 0.667,
        // 0xA0: nbsp   ¡      ¢      £      ¤      ¥      ¦      §      ¨      ©      ª      «      ¬      shy    ®      ¯
        0.278, 0.333, 0.556, 0.556, 0.556, 0.556, 0.260, 0.556, 0.333, 0.737, 0.370, 0.556, 0.584, 0.333, 0.737, 0.333,
        // 0xB0: °      ±      ²      ³      ´      µ      ¶      ·      ¸      ¹      º      »      ¼      ½      ¾      ¿
        0.400, 0.584, 0.333, 0.333, 0.333, 0.556, 0.537, 0.278, 0.333, 0.333, 0.365, 0.556, 0.834, 0.834, 0.834, 0.611,
        // 0xC0: À      Á      Â      Ã      Ä      Å      Æ      Ç      È      É      Ê      Ë      Ì      Í      Î      Ï
        0.667, 0.667, 0.667, 0.667, 0.667, 0.667, 1.000, 0.722, 0.667, 0.667, 0.667, 0.667, 0.278, 0.278, 0.278, 0.278,
        // 0xD0: Ð      Ñ      Ò      Ó      Ô      Õ      Ö      ×      Ø      Ù      Ú      Û      Ü      Ý      Þ      ß
        0.722, 0.722, 0.778, 0.778, 0.778, 0.778, 0.778, 0.584, 0.778, 0.722, 0.722, 0.722, 0.722, 0.667, 0.667, 0.611,
        // 0xE0: à      á      â      ã      ä      å      æ      ç      è      é      ê      ë      ì      í      î      ï
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.889, 0.500, 0.556, 0.556, 0.556, 0.556, 0.278, 0.278, 0.278, 0.278,
        // 0xF0: ð      ñ      ò      ó      ô      õ      ö      ÷      ø      ù      ú      û      ü      ý      þ      ÿ
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.584, 0.611, 0.556, 0.556, 0.556, 0.556, 0.500, 0.556, 0.500,
    ],
    average_char_width: 0.53,
    space_width: 0.278,
};

static TIMES_ROMAN_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::TimesRoman,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.250, 0.333, 0.408, 0.500, 0.500, 0.833, 0.778, 0.180, 0.333, 0.333, 0.500, 0.564, 0.250, 0.333, 0.250, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.564, 0.564, 0.564, 0.444, 0.921,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.667, 0.667, 0.722, 0.611, 0.556, 0.722, 0.722, 0.333, 0.389, 0.722, 0.611, 0.889,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.722, 0.556, 0.722, 0.667, 0.556, 0.611, 0.722, 0.722, 0.944, 0.722, 0.722, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.469, 0.500, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.444, 0.500, 0.444, 0.500, 0.444, 0.333, 0.500, 0.500, 0.278, 0.278, 0.500, 0.278, 0.778,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.500, 0.500, 0.500, 0.500, 0.333, 0.389, 0.278, 0.500, 0.500, 0.722, 0.500, 0.500, 0.444,
        // {      |      }      ~
        0.480, 0.200, 0.480, 0.541,
    ],
    #[rustfmt::skip]
    upper: [
        // 0x80: €      -      ‚      ƒ      „      …      †      ‡      ˆ      ‰      Š      ‹      Œ      -      Ž      -
        0.500, 0.778, 0.333, 0.500, 0.444, 1.000, 0.500, 0.500, 0.333, 1.000, 0.556, 0.333, 0.889, 0.778, 0.611, 0.778,
        // 0x90: -      '      '      "      "      •      ndash  mdash  ˜      ™      š      ›      œ      -      ž      Ÿ
        0.778, 0.333, 0.333, 0.444, 0.444, 0.350, 0.500, 1.000, 0.333, 0.980, 0.389, 0.333, 0.722, 0.778, 0.444, 0.722,
        // 0xA0: nbsp   ¡      ¢      £      ¤      ¥      ¦      §      ¨      ©      ª      «      ¬      shy    ®      ¯
        0.250, 0.333, 0.500, 0.500, 0.500, 0.500, 0.200, 0.500, 0.333, 0.760, 0.276, 0.500, 0.564, 0.333, 0.760, 0.333,
        // 0xB0: °      ±      ²      ³      ´      µ      ¶      ·      ¸      ¹      º      »      ¼      ½      ¾      ¿
        0.400, 0.564, 0.300, 0.300, 0.333, 0.500, 0.453, 0.250, 0.333, 0.300, 0.310, 0.500, 0.750, 0.750, 0.750, 0.444,
        // 0xC0: À      Á      Â      Ã      Ä      Å      Æ      Ç      È      É      Ê      Ë      Ì      Í      Î      Ï
        0.722, 0.722, 0.722, 0.722, 0.722, 0.722, 0.889, 0.667, 0.611, 0.611, 0.611, 0.611, 0.333, 0.333, 0.333, 0.333,
        // 0xD0: Ð      Ñ      Ò      Ó      Ô      Õ      Ö      ×      Ø      Ù      Ú      Û      Ü      Ý      Þ      ß
        0.722, 0.722, 0.722, 0.722, 0.722, 0.722, 0.722, 0.564, 0.722, 0.722, 0.722, 0.722, 0.722, 0.722, 0.556, 0.500,
        // 0xE0: à      á      â      ã      ä      å      æ      ç      è      é      ê      ë      ì      í      î      ï
        0.444, 0.444, 0.444, 0.444, 0.444, 0.444, 0.667, 0.444, 0.444, 0.444, 0.444, 0.444, 0.278, 0.278, 0.278, 0.278,
        // 0xF0: ð      ñ      ò      ó      ô      õ      ö      ÷      ø      ù      ú      û      ü      ý      þ      ÿ
        0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.564, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500,
    ],
    average_char_width: 0.48,
    space_width: 0.250,
};

static COURIER_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Courier,
    widths: [0.600; 95],
    upper: [0.600; 128],
    average_char_width: 0.600,
    space_width: 0.600,
};

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: &FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Helvetica => &HELVETICA_TABLE,
        FontFamily::TimesRoman => &TIMES_ROMAN_TABLE,
        FontFamily::Courier => &COURIER_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        let metrics = get_metrics(&FontFamily::Helvetica);
        assert_eq!(metrics.measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_single_space_matches_space_width() {
        for font in [FontFamily::Helvetica, FontFamily::TimesRoman, FontFamily::Courier] {
            let metrics = get_metrics(&font);
            assert!(
                (metrics.measure_str(" ") - metrics.space_width).abs() < 1e-6,
                "{font:?}: table space slot disagrees with space_width"
            );
        }
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        let metrics = get_metrics(&FontFamily::Helvetica);
        // "Rust" = R(0.722) + u(0.556) + s(0.500) + t(0.278) = 2.056
        let width = metrics.measure_str("Rust");
        assert!(
            (width - 2.056).abs() < 1e-3,
            "Rust width should be ~2.056, got {width}"
        );
    }

    #[test]
    fn test_measure_str_unencodable_falls_back() {
        let metrics = get_metrics(&FontFamily::Helvetica);
        let width = metrics.measure_str("日");
        assert!((width - metrics.average_char_width).abs() < 1e-6);
    }

    #[test]
    fn test_win_ansi_upper_half_uses_afm_widths() {
        let metrics = get_metrics(&FontFamily::Helvetica);
        let cases = [
            ('\u{2014}', 1.000), // em dash
            ('Æ', 1.000),
            ('é', 0.556),
            ('Œ', 1.000),
            ('š', 0.500),
            ('\u{2022}', 0.350),
            ('\u{00A0}', 0.278),
        ];
        for (c, expected) in cases {
            let width = metrics.char_width(c);
            assert!((width - expected).abs() < 1e-6, "{c:?}: expected {expected}, got {width}");
        }
        assert!((get_metrics(&FontFamily::TimesRoman).char_width('\u{2122}') - 0.980).abs() < 1e-6);
        assert_eq!(get_metrics(&FontFamily::Courier).char_width('\u{2014}'), 0.600);
    }

    #[test]
    fn test_win_ansi_byte_covers_cp1252_upper_half() {
        let text = "\u{20AC}\u{201A}\u{0192}\u{201E}\u{2026}\u{2020}\u{2021}\u{02C6}\u{2030}\u{0160}\u{2039}\u{0152}\u{017D}\
                    \u{2018}\u{2019}\u{201C}\u{201D}\u{2022}\u{2013}\u{2014}\u{02DC}\u{2122}\u{0161}\u{203A}\u{0153}\u{017E}\u{0178}";
        let bytes: Vec<u8> = text.chars().map(|c| win_ansi_byte(c).unwrap()).collect();
        let expected: Vec<u8> = (0x80..=0x9F)
            .filter(|b| ![0x81, 0x8D, 0x8F, 0x90, 0x9D].contains(b))
            .collect();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_win_ansi_byte_rejects_outside_characters() {
        assert_eq!(win_ansi_byte('日'), None);
        assert_eq!(win_ansi_byte('\u{1F680}'), None);
        assert_eq!(win_ansi_byte('\n'), None);
        assert_eq!(win_ansi_byte('é'), Some(0xE9));
    }

    #[test]
    fn test_courier_is_monospaced() {
        let metrics = get_metrics(&FontFamily::Courier);
        assert_eq!(metrics.measure_str("iiii"), metrics.measure_str("MMMM"));
    }

    #[test]
    fn test_times_narrower_than_helvetica_for_prose() {
        let text = "Designed and shipped a distributed build cache";
        let helvetica = get_metrics(&FontFamily::Helvetica).measure_str(text);
        let times = get_metrics(&FontFamily::TimesRoman).measure_str(text);
        assert!(times < helvetica, "Times {times} should be narrower than Helvetica {helvetica}");
    }

    #[test]
    fn test_base_font_names() {
        assert_eq!(FontFamily::Helvetica.base_font_name(), "Helvetica");
        assert_eq!(FontFamily::TimesRoman.base_font_name(), "Times-Roman");
        assert_eq!(get_metrics(&FontFamily::Courier).font, FontFamily::Courier);
    }
}
