use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 11.0,
            font_weight: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Font-independent measurer: every display column is `char_width_factor * font_size` wide.
///
/// Wide (CJK) characters count as two columns, so labels with non-Latin identifiers still reserve
/// enough room.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl DeterministicTextMeasurer {
    fn factors(&self) -> (f64, f64) {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };
        (char_width_factor, line_height_factor)
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let (char_width_factor, line_height_factor) = self.factors();
        let font_size = style.font_size.max(1.0);
        let bold = style
            .font_weight
            .as_deref()
            .is_some_and(|w| w == "bold" || w.parse::<u16>().is_ok_and(|n| n >= 600));
        let columns = UnicodeWidthStr::width(text) as f64;
        let mut width = columns * font_size * char_width_factor;
        if bold {
            width *= 1.08;
        }
        TextMetrics {
            width,
            height: font_size * line_height_factor,
        }
    }
}

/// Shortens `text` with a trailing ellipsis until it fits `max_width`. Returns the input when it
/// already fits, and an empty string when not even the ellipsis fits.
pub fn truncate_to_width(
    measurer: &dyn TextMeasurer,
    text: &str,
    style: &TextStyle,
    max_width: f64,
) -> String {
    if measurer.measure(text, style).width <= max_width {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    for keep in (0..chars.len()).rev() {
        let mut candidate: String = chars[..keep].iter().collect();
        candidate.push('…');
        if measurer.measure(&candidate, style).width <= max_width {
            return candidate;
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_width_scales_with_font_size() {
        let m = DeterministicTextMeasurer::default();
        let style = TextStyle {
            font_size: 10.0,
            ..Default::default()
        };
        let metrics = m.measure("Compute-1", &style);
        assert_eq!(metrics.width, 54.0);
        assert_eq!(metrics.height, 12.0);
    }

    #[test]
    fn truncate_keeps_short_text_and_shortens_long_text() {
        let m = DeterministicTextMeasurer::default();
        let style = TextStyle {
            font_size: 10.0,
            ..Default::default()
        };
        assert_eq!(truncate_to_width(&m, "abc", &style, 100.0), "abc");
        // 6px per column: "abcd…" is 30px.
        assert_eq!(truncate_to_width(&m, "abcdefghij", &style, 30.0), "abcd…");
        assert_eq!(truncate_to_width(&m, "abcdefghij", &style, 1.0), "");
    }
}
