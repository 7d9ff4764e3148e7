// SPDX-License-Identifier: MIT
use std::time::Duration;

use ratatui::text::Span;
use ratatui::widgets::Paragraph;

use super::gradient::GradientColorCache;
use super::input::Action;
use super::layout::build_layout;
use super::panels::{cpu, gpu, header, memory, net, picker, procs};
use super::theme::{THEMES, Theme, index_of};
use crate::sampler::FrameSnapshot;
use crate::sampler::history::{HISTORY_CAPACITY, HistoryBuffer};

pub struct PickerState {
    pub selected: usize,
}

/// The one application context: every piece of cross-frame display state
/// lives here, owned by the render/input loop. No ambient globals.
pub struct App {
    pub theme: &'static Theme,
    pub refresh_interval: Duration,
    pub gradient_cache: GradientColorCache,
    pub cpu_history: HistoryBuffer<f64>,
    pub mem_history: HistoryBuffer<f64>,
    pub recv_history: HistoryBuffer<f64>,
    pub sent_history: HistoryBuffer<f64>,
    pub gpu_util_history: Vec<HistoryBuffer<f64>>,
    pub gpu_mem_history: Vec<HistoryBuffer<f64>>,
    pub latest: Option<FrameSnapshot>,
    pub picker: Option<PickerState>,
    pub should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(theme: &'static Theme, refresh_interval: Duration, gpu_count: usize) -> Self {
        Self {
            theme,
            refresh_interval,
            gradient_cache: GradientColorCache::new(),
            cpu_history: HistoryBuffer::new(HISTORY_CAPACITY),
            mem_history: HistoryBuffer::new(HISTORY_CAPACITY),
            recv_history: HistoryBuffer::new(HISTORY_CAPACITY),
            sent_history: HistoryBuffer::new(HISTORY_CAPACITY),
            gpu_util_history: (0..gpu_count)
                .map(|_| HistoryBuffer::new(HISTORY_CAPACITY))
                .collect(),
            gpu_mem_history: (0..gpu_count)
                .map(|_| HistoryBuffer::new(HISTORY_CAPACITY))
                .collect(),
            latest: None,
            picker: None,
            should_quit: false,
        }
    }

    /// Folds one finished sample into the rolling histories.
    pub fn update_frame(&mut self, snapshot: FrameSnapshot) {
        self.cpu_history.push(snapshot.cpu_pct);
        self.mem_history.push(snapshot.memory.used_pct());
        self.recv_history.push(snapshot.net.recv_rate);
        self.sent_history.push(snapshot.net.sent_rate);

        while self.gpu_util_history.len() < snapshot.gpus.len() {
            self.gpu_util_history.push(HistoryBuffer::new(HISTORY_CAPACITY));
            self.gpu_mem_history.push(HistoryBuffer::new(HISTORY_CAPACITY));
        }
        for gpu in &snapshot.gpus {
            self.gpu_util_history[gpu.index].push(gpu.util_pct);
            self.gpu_mem_history[gpu.index].push(gpu.mem_pct());
        }

        self.latest = Some(snapshot);
    }

    /// Applies one input action. Returns the theme name to persist when the
    /// user applied a new theme.
    pub fn handle_action(&mut self, action: Action) -> Option<&'static str> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::OpenPicker => {
                self.picker = Some(PickerState {
                    selected: index_of(self.theme.name),
                });
            }
            Action::PickerUp => {
                if let Some(picker) = &mut self.picker {
                    picker.selected = picker.selected.saturating_sub(1);
                }
            }
            Action::PickerDown => {
                if let Some(picker) = &mut self.picker {
                    picker.selected = (picker.selected + 1).min(THEMES.len() - 1);
                }
            }
            Action::PickerApply => {
                if let Some(picker) = self.picker.take() {
                    self.theme = &THEMES[picker.selected];
                    return Some(self.theme.name);
                }
            }
            Action::PickerCancel => self.picker = None,
            Action::None => {}
        }
        None
    }

    pub fn render(&mut self, frame: &mut ratatui::Frame) {
        let outer = frame.area();
        if outer.height < 10 || outer.width < 40 {
            return;
        }

        let Some(snapshot) = self.latest.as_ref() else {
            frame.render_widget(
                Paragraph::new(Span::styled("Collecting...", self.theme.dim_style())),
                outer,
            );
            return;
        };

        let areas = build_layout(outer, snapshot.gpus.len());
        header::render(frame, areas.header, snapshot, self.theme, self.refresh_interval);
        gpu::render(
            frame,
            areas.gpu,
            &snapshot.gpus,
            &self.gpu_util_history,
            &self.gpu_mem_history,
            self.theme,
            &mut self.gradient_cache,
        );
        cpu::render(
            frame,
            areas.cpu,
            snapshot,
            &self.cpu_history,
            self.theme,
            &mut self.gradient_cache,
        );
        memory::render(
            frame,
            areas.memory,
            snapshot,
            self.theme,
            &mut self.gradient_cache,
        );
        net::render(
            frame,
            areas.net,
            snapshot,
            &self.recv_history,
            &self.sent_history,
            self.theme,
        );
        procs::render_cpu_table(frame, areas.procs_cpu, &snapshot.top_cpu, self.theme);
        procs::render_mem_table(frame, areas.procs_mem, &snapshot.top_mem, self.theme);

        if let Some(picker) = &self.picker {
            picker::render(frame, outer, picker.selected, self.theme);
        }
    }
}
