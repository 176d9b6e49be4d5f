/// One live-WPM sample, taken at a whole elapsed second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WpmPoint {
    pub t: f64,
    pub wpm: f64,
}

/// Per-second WPM samples collected while a session runs, charted on the
/// results screen. At most one point is kept per elapsed second; a late
/// tick inside the same second overwrites the previous sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WpmSeries {
    points: Vec<WpmPoint>,
}

impl WpmSeries {
    pub fn record(&mut self, seconds_elapsed: u64, wpm: f64) {
        let t = seconds_elapsed as f64;
        match self.points.last_mut() {
            Some(last) if last.t == t => last.wpm = wpm,
            _ => self.points.push(WpmPoint { t, wpm }),
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[WpmPoint] {
        &self.points
    }

    /// Highest sampled WPM, used to scale the chart's y axis.
    pub fn max_wpm(&self) -> f64 {
        self.points.iter().map(|p| p.wpm).fold(0.0, f64::max)
    }

    /// Last sampled second, used to scale the chart's x axis.
    pub fn last_second(&self) -> f64 {
        self.points.last().map(|p| p.t).unwrap_or(0.0)
    }
}
