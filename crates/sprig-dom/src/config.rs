use sprig_core::geometry::Size;

/// Configuration for a [`Document`](crate::Document).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentConfig {
    /// Viewport the root element is laid out into.
    pub viewport: Size<f32>,
    pub text: TextMetrics,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(800.0, 600.0),
            text: TextMetrics::default(),
        }
    }
}

impl DocumentConfig {
    pub fn viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Size::new(width, height);
        self
    }

    pub fn text_metrics(mut self, text: TextMetrics) -> Self {
        self.text = text;
        self
    }
}

/// Fixed-advance text metrics used to measure text nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 16.0,
        }
    }
}

impl TextMetrics {
    /// Measure `chars` characters laid out into `available_width`.
    ///
    /// Returns `(width, height)`; text wraps onto as many lines as needed.
    pub fn measure(&self, chars: usize, available_width: Option<f32>) -> (f32, f32) {
        if chars == 0 {
            return (0.0, 0.0);
        }
        let total = chars as f32 * self.char_width;
        match available_width {
            Some(available) if available > 0.0 && total > available => {
                let per_line = (available / self.char_width).floor().max(1.0);
                let lines = (chars as f32 / per_line).ceil();
                (per_line * self.char_width, lines * self.line_height)
            }
            _ => (total, self.line_height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_single_line() {
        let metrics = TextMetrics::default();
        assert_eq!(metrics.measure(5, Some(800.0)), (40.0, 16.0));
        assert_eq!(metrics.measure(5, None), (40.0, 16.0));
    }

    #[test]
    fn test_measure_wraps() {
        let metrics = TextMetrics::default();
        // 10 chars per line at 80px
        assert_eq!(metrics.measure(25, Some(80.0)), (80.0, 48.0));
    }

    #[test]
    fn test_measure_empty() {
        assert_eq!(TextMetrics::default().measure(0, Some(10.0)), (0.0, 0.0));
    }
}
