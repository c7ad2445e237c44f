//! Static font-metric tables for the card typeface (DejaVu Sans).
//!
//! Character widths are the face's horizontal advances in em units. The
//! rasterizer embeds the same face, and the paginator and the SVG composer
//! both read these tables, so page breaks and word positions match the
//! exported glyphs.
//!
//! The 0.928II tables cover 0x20..=0x7E (95 printable characters), index =
//! `(char as usize) - 32`. CJK ideographs, kana, hangul and full-width forms
//! occupy a full em; everything else falls back to the average lowercase
//! advance of the weight.

/// Family name of the embedded card face.
pub const CARD_FONT_FAMILY: &str = "DejaVu Sans";

/// Weight used for highlighted (`**bold**`) spans and headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

/// Width table for one weight of the face.
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
pub struct WeightWidths {
    widths: [f32; 95],
    /// Fallback width for non-0.928II, non-wide characters.
    pub average_char_width: f32,
}

pub struct FontMetricTable {
    regular: WeightWidths,
    bold: WeightWidths,
    /// Width of CJK and other full-width characters.
    pub wide_char_width: f32,
    /// Baseline offset from the top of the content area.
    pub ascent: f32,
    /// Depth below the baseline.
    pub descent: f32,
}

impl FontMetricTable {
    fn weight(&self, weight: Weight) -> &WeightWidths {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        }
    }

    /// Width of a single character in em units.
    pub fn char_width(&self, c: char, weight: Weight) -> f32 {
        let table = self.weight(weight);
        let code = c as usize;
        if (32..=126).contains(&code) {
            table.widths[code - 32]
        } else if is_wide(c) {
            self.wide_char_width
        } else {
            table.average_char_width
        }
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str, weight: Weight) -> f32 {
        s.chars().map(|c| self.char_width(c, weight)).sum()
    }

    /// Measures a string in pixels at the given font size and weight.
    pub fn measure_px(&self, s: &str, font_size_px: f32, weight: Weight) -> f32 {
        self.measure_str(s, weight) * font_size_px
    }

    /// Height of the glyph content area in em units.
    pub fn content_height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// True for characters that take a full em and allow a line break on either side.
pub fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F       // Hangul Jamo
        | 0x2E80..=0x303E     // CJK radicals, punctuation
        | 0x3041..=0x33FF     // Kana, CJK compatibility
        | 0x3400..=0x4DBF     // CJK Extension A
        | 0x4E00..=0x9FFF     // CJK Unified Ideographs
        | 0xA960..=0xA97F
        | 0xAC00..=0xD7A3     // Hangul syllables
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF01..=0xFF60     // Full-width forms
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x2FFFD
        | 0x30000..=0x3FFFD)
}

static DEJAVU_SANS: FontMetricTable = FontMetricTable {
    regular: WeightWidths {
        #[rustfmt::skip]
        widths: [
            // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
            0.318, 0.401, 0.460, 0.838, 0.636, 0.950, 0.780, 0.275, 0.390, 0.390, 0.500, 0.838, 0.318, 0.361, 0.318, 0.337,
            // 0     1     2     3     4     5     6     7     8     9
            0.636, 0.636, 0.636, 0.636, 0.636, 0.636, 0.636, 0.636, 0.636, 0.636,
            // :     ;     <     =     >     ?     @
            0.337, 0.337, 0.838, 0.838, 0.838, 0.531, 1.000,
            // A     B     C     D     E     F     G     H     I     J     K     L     M
            0.684, 0.686, 0.698, 0.770, 0.632, 0.575, 0.775, 0.752, 0.295, 0.295, 0.656, 0.557, 0.863,
            // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
            0.748, 0.787, 0.603, 0.787, 0.695, 0.635, 0.611, 0.732, 0.684, 0.989, 0.685, 0.611, 0.685,
            // [     \     ]     ^     _     `
            0.390, 0.337, 0.390, 0.838, 0.500, 0.500,
            // a     b     c     d     e     f     g     h     i     j     k     l     m
            0.613, 0.635, 0.550, 0.635, 0.615, 0.352, 0.635, 0.634, 0.278, 0.278, 0.579, 0.278, 0.974,
            // n     o     p     q     r     s     t     u     v     w     x     y     z
            0.634, 0.612, 0.635, 0.635, 0.411, 0.521, 0.392, 0.634, 0.592, 0.818, 0.592, 0.592, 0.525,
            // {     |     }     ~
            0.636, 0.337, 0.636, 0.838,
        ],
        average_char_width: 0.563,
    },
    bold: WeightWidths {
        #[rustfmt::skip]
        widths: [
            // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
            0.348, 0.456, 0.521, 0.838, 0.696, 1.002, 0.872, 0.306, 0.457, 0.457, 0.523, 0.838, 0.380, 0.415, 0.380, 0.365,
            // 0     1     2     3     4     5     6     7     8     9
            0.696, 0.696, 0.696, 0.696, 0.696, 0.696, 0.696, 0.696, 0.696, 0.696,
            // :     ;     <     =     >     ?     @
            0.400, 0.400, 0.838, 0.838, 0.838, 0.580, 1.000,
            // A     B     C     D     E     F     G     H     I     J     K     L     M
            0.774, 0.762, 0.734, 0.830, 0.683, 0.683, 0.821, 0.837, 0.372, 0.372, 0.775, 0.637, 0.995,
            // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
            0.837, 0.850, 0.733, 0.850, 0.770, 0.720, 0.682, 0.812, 0.774, 1.103, 0.771, 0.724, 0.725,
            // [     \     ]     ^     _     `
            0.457, 0.365, 0.457, 0.838, 0.500, 0.500,
            // a     b     c     d     e     f     g     h     i     j     k     l     m
            0.675, 0.716, 0.593, 0.716, 0.678, 0.435, 0.716, 0.712, 0.343, 0.343, 0.665, 0.343, 1.042,
            // n     o     p     q     r     s     t     u     v     w     x     y     z
            0.712, 0.687, 0.716, 0.716, 0.493, 0.595, 0.478, 0.712, 0.652, 0.924, 0.645, 0.652, 0.582,
            // {     |     }     ~
            0.712, 0.365, 0.712, 0.838,
        ],
        average_char_width: 0.636,
    },
    wide_char_width: 1.0,
    ascent: 0.928,
    descent: 0.236,
};

/// Returns the metric table of the card face.
pub fn card_metrics() -> &'static FontMetricTable {
    &DEJAVU_SANS
}
