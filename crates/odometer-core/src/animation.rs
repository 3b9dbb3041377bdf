//! Timed frame sequences: startup sweep, scrolling text, and distance counters.
//!
//! Every sequence is a pure function of its inputs and the [`AnimationConfig`];
//! frames are shown strictly in order and each wait goes through the injected
//! [`DelayNs`], so tests can run the sequences without real time passing.

use embedded_hal_async::delay::DelayNs;
use log::debug;

use crate::{
    font::Font,
    format::{
        DistanceKm, format_counter, format_delta, format_distance, is_numeric_text, strip_unit,
        whole_km,
    },
    render::{FrameSink, MatrixRenderer, text_width},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationConfig {
    /// Intermediate frames in a counting animation.
    pub steps: u32,
    pub step_delay_ms: u32,
    /// Increases at or below this many km skip the update animation.
    pub update_threshold_km: f64,
    /// How long the `+N` banner stays up.
    pub delta_hold_ms: u32,
    pub scroll_delay_ms: u32,
    pub sweep_step_ms: u32,
    pub sweep_pause_ms: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            steps: 100,
            step_delay_ms: 20,
            update_threshold_km: 0.1,
            delta_hold_ms: 2_000,
            scroll_delay_ms: 50,
            sweep_step_ms: 20,
            sweep_pause_ms: 200,
        }
    }
}

/// One intermediate counter frame: the integer shown and how long it stays.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnimationStep {
    pub value: u32,
    pub delay_ms: u32,
}

/// Lazily yields `steps` counter frames interpolating from `start` toward `end`.
///
/// Frame `i` shows `floor(start + (end - start) * i / steps)`; the end value
/// itself is left to the caller's final frame.
#[derive(Clone, Debug)]
pub struct CountSteps {
    start: f64,
    span: f64,
    index: u32,
    steps: u32,
    delay_ms: u32,
}

impl CountSteps {
    pub fn new(start: DistanceKm, end: DistanceKm, steps: u32, delay_ms: u32) -> Self {
        Self {
            start: start.get(),
            span: end.get() - start.get(),
            index: 0,
            steps,
            delay_ms,
        }
    }
}

impl Iterator for CountSteps {
    type Item = AnimationStep;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.steps {
            return None;
        }

        let value = self.start + self.span * self.index as f64 / self.steps as f64;
        self.index += 1;
        Some(AnimationStep {
            value: whole_km(value),
            delay_ms: self.delay_ms,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.steps.saturating_sub(self.index) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CountSteps {}

/// Whether going from `old` to `new` earns the `+N` banner and counter.
pub fn is_notable_increase(old: DistanceKm, new: DistanceKm, threshold_km: f64) -> bool {
    new.get() - old.get() > threshold_km
}

/// Frames in one scroll pass of `text` across a `width`-pixel display.
pub fn scroll_frame_count(width: usize, text: &str) -> usize {
    width + text_width(text)
}

/// What [`AnimationEngine::animate_update`] ended up rendering.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UpdateOutcome {
    Animated { whole_delta: u32 },
    Direct,
}

/// Drives a [`MatrixRenderer`] through timed sequences.
#[derive(Debug)]
pub struct AnimationEngine<S, D> {
    renderer: MatrixRenderer<S>,
    delay: D,
    config: AnimationConfig,
}

impl<S, D> AnimationEngine<S, D>
where
    S: FrameSink,
    D: DelayNs,
{
    pub fn new(renderer: MatrixRenderer<S>, delay: D, config: AnimationConfig) -> Self {
        Self {
            renderer,
            delay,
            config,
        }
    }

    pub fn release(self) -> (MatrixRenderer<S>, D) {
        (self.renderer, self.delay)
    }

    /// Clears and shows `text` at the origin.
    ///
    /// Numeric text (digits, `.`, `km`) uses the large font without the unit;
    /// anything else, such as error messages, uses the small font verbatim.
    pub fn display_text(&mut self, text: &str) -> Result<(), S::Error> {
        self.renderer.clear();
        if is_numeric_text(text) {
            self.renderer
                .draw_text(strip_unit(text).as_str(), 0, 0, Font::Large);
        } else {
            self.renderer.draw_text(text, 0, 0, Font::Small);
        }
        self.renderer.show()
    }

    /// Shows `distance` as a final frame, e.g. `87.3km`.
    pub fn display_value(&mut self, distance: DistanceKm) -> Result<(), S::Error> {
        self.display_text(format_distance(distance).as_str())
    }

    pub async fn pause(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }

    /// Counts from zero up to `target`, then shows the exact value.
    pub async fn count_up(&mut self, target: DistanceKm) -> Result<(), S::Error> {
        debug!("anim: count_up target={}", target.get());
        self.run_counter(DistanceKm::ZERO, target).await
    }

    /// Transition from a previously shown distance to a fresh one.
    ///
    /// Increases above the threshold get a `+N` banner followed by a counter
    /// starting at `old`; anything else jumps straight to the final frame.
    pub async fn animate_update(
        &mut self,
        old: DistanceKm,
        new: DistanceKm,
    ) -> Result<UpdateOutcome, S::Error> {
        if !is_notable_increase(old, new, self.config.update_threshold_km) {
            debug!("anim: update below threshold old={} new={}", old.get(), new.get());
            self.display_value(new)?;
            return Ok(UpdateOutcome::Direct);
        }

        let whole_delta = whole_km(new.get() - old.get());
        debug!(
            "anim: update old={} new={} delta={}",
            old.get(),
            new.get(),
            whole_delta
        );
        self.display_text(format_delta(whole_delta).as_str())?;
        self.delay.delay_ms(self.config.delta_hold_ms).await;

        self.run_counter(old, new).await?;
        Ok(UpdateOutcome::Animated { whole_delta })
    }

    /// One right-to-left pass of `text` at the configured scroll speed.
    pub async fn scroll_text(&mut self, text: &str) -> Result<(), S::Error> {
        self.scroll_text_with_delay(text, self.config.scroll_delay_ms)
            .await
    }

    /// One right-to-left pass of `text`; starts just off the right edge and
    /// ends once the last column has left the display.
    pub async fn scroll_text_with_delay(
        &mut self,
        text: &str,
        delay_ms: u32,
    ) -> Result<(), S::Error> {
        self.renderer.clear();
        self.renderer.show()?;

        let width = self.renderer.width();
        let frames = scroll_frame_count(width, text);
        debug!("anim: scroll frames={} text={}", frames, text);

        for i in 0..frames {
            self.renderer.clear();
            let x = width as i32 - i as i32;
            self.renderer.draw_text(text, x, 0, Font::Small);
            self.renderer.show()?;
            self.delay.delay_ms(delay_ms).await;
        }

        Ok(())
    }

    /// Column sweep that fills the matrix left to right, holds, then empties
    /// it left to right.
    pub async fn startup_sweep(&mut self) -> Result<(), S::Error> {
        self.renderer.clear();
        self.renderer.show()?;

        self.sweep(true).await?;
        self.delay.delay_ms(self.config.sweep_pause_ms).await;
        self.sweep(false).await
    }

    async fn sweep(&mut self, on: bool) -> Result<(), S::Error> {
        for x in 0..self.renderer.width() {
            self.renderer.set_column(x, on);
            self.renderer.show()?;
            self.delay.delay_ms(self.config.sweep_step_ms).await;
        }
        Ok(())
    }

    async fn run_counter(&mut self, start: DistanceKm, end: DistanceKm) -> Result<(), S::Error> {
        let steps = CountSteps::new(
            start,
            end,
            self.config.steps,
            self.config.step_delay_ms,
        );
        for step in steps {
            self.display_text(format_counter(step.value).as_str())?;
            self.delay.delay_ms(step.delay_ms).await;
        }
        self.display_value(end)
    }
}
