use crate::{BORDER, MUTED, PRIMARY, SURFACE};
use cryptowave_core::display::format_short;
use iced::widget::canvas;
use iced::{mouse, Pixels, Point, Theme};

const DAYS: u32 = 30;

// -- Earnings projection (canvas) --

/// Cumulative simple interest over the next 30 days.
pub(crate) struct EarningsChart {
    pub(crate) data: Vec<(u32, f64)>,
    cache: canvas::Cache,
}

impl EarningsChart {
    pub(crate) fn new() -> Self {
        Self {
            data: Vec::new(),
            cache: canvas::Cache::default(),
        }
    }

    /// Rebuild from the current daily earnings. Zero earnings clear the chart.
    pub(crate) fn update(&mut self, daily: f64) {
        self.data = projection_points(daily);
        self.cache.clear();
    }
}

fn projection_points(daily: f64) -> Vec<(u32, f64)> {
    if !daily.is_finite() || daily <= 0.0 {
        return Vec::new();
    }
    (0..=DAYS).map(|day| (day, daily * f64::from(day))).collect()
}

impl<Message> canvas::Program<Message> for EarningsChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: iced::Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let geometry = self.cache.draw(renderer, bounds.size(), |frame| {
            let size = frame.size();
            frame.fill_rectangle(Point::ORIGIN, size, SURFACE);

            let Some(&(_, max)) = self.data.last() else {
                return;
            };

            let pad_left = 50.0_f32;
            let pad_right = 10.0_f32;
            let pad_top = 10.0_f32;
            let pad_bottom = 20.0_f32;
            let w = size.width - pad_left - pad_right;
            let h = size.height - pad_top - pad_bottom;
            let range = max.max(0.001);
            let point = |day: u32, value: f64| {
                Point::new(
                    pad_left + (day as f32 / DAYS as f32) * w,
                    pad_top + h - ((value / range) as f32 * h),
                )
            };

            for i in 0..=4 {
                let frac = i as f64 / 4.0;
                let y = pad_top + h - (frac as f32 * h);
                let grid = canvas::Path::line(Point::new(pad_left, y), Point::new(pad_left + w, y));
                frame.stroke(
                    &grid,
                    canvas::Stroke::default().with_color(BORDER).with_width(0.5),
                );
                frame.fill_text(canvas::Text {
                    content: format_short(frac * range, 2),
                    position: Point::new(2.0, y - 6.0),
                    color: MUTED,
                    size: Pixels(10.0),
                    ..canvas::Text::default()
                });
            }

            let line = canvas::Path::new(|b| {
                for (i, &(day, value)) in self.data.iter().enumerate() {
                    if i == 0 {
                        b.move_to(point(day, value));
                    } else {
                        b.line_to(point(day, value));
                    }
                }
            });
            frame.stroke(
                &line,
                canvas::Stroke::default().with_color(PRIMARY).with_width(2.0),
            );

            for (day, label) in [(0, "Today"), (DAYS, "30 days")] {
                let x = pad_left + (day as f32 / DAYS as f32) * w;
                let x = if day == DAYS { x - 36.0 } else { x };
                frame.fill_text(canvas::Text {
                    content: label.to_string(),
                    position: Point::new(x, pad_top + h + 4.0),
                    color: MUTED,
                    size: Pixels(10.0),
                    ..canvas::Text::default()
                });
            }
        });

        vec![geometry]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_is_linear_over_thirty_days() {
        let points = projection_points(2.5);
        assert_eq!(points.len(), 31);
        assert_eq!(points[0], (0, 0.0));
        assert_eq!(points[30], (30, 75.0));
    }

    #[test]
    fn no_earnings_means_no_chart() {
        assert!(projection_points(0.0).is_empty());
        assert!(projection_points(f64::NAN).is_empty());
    }

    #[test]
    fn update_replaces_data() {
        let mut chart = EarningsChart::new();
        chart.update(1.0);
        assert_eq!(chart.data.len(), 31);
        chart.update(0.0);
        assert!(chart.data.is_empty());
    }
}
