// SPDX-License-Identifier: MIT
use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct FrameAreas {
    pub header: Rect,
    pub gpu: Rect,
    pub cpu: Rect,
    pub memory: Rect,
    pub net: Rect,
    pub procs_cpu: Rect,
    pub procs_mem: Rect,
}

/// Splits the screen: status line, GPU panel, CPU/memory row, network
/// panel, and the two process tables.
#[must_use]
pub fn build_layout(area: Rect, gpu_count: usize) -> FrameAreas {
    // Three lines per device plus the border; one placeholder row when no
    // GPU is present.
    let gpu_height = u16::try_from(gpu_count.max(1) * 3 + 2).unwrap_or(5);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(gpu_height),
            Constraint::Length(9),
            Constraint::Length(5),
            Constraint::Min(8),
        ])
        .split(area);

    let mid = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(vertical[2]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(vertical[4]);

    FrameAreas {
        header: vertical[0],
        gpu: vertical[1],
        cpu: mid[0],
        memory: mid[1],
        net: vertical[3],
        procs_cpu: bottom[0],
        procs_mem: bottom[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panels_tile_the_full_height() {
        let area = Rect::new(0, 0, 120, 50);
        let areas = build_layout(area, 1);

        assert_eq!(areas.header.height, 1);
        assert_eq!(areas.gpu.height, 5);
        assert_eq!(areas.cpu.height, 9);
        assert_eq!(areas.net.height, 5);
        let used = areas.header.height + areas.gpu.height + areas.cpu.height + areas.net.height;
        assert_eq!(areas.procs_cpu.height, area.height - used);
    }

    #[test]
    fn gpu_panel_grows_with_device_count() {
        let area = Rect::new(0, 0, 120, 60);
        assert_eq!(build_layout(area, 0).gpu.height, 5);
        assert_eq!(build_layout(area, 2).gpu.height, 8);
    }

    #[test]
    fn side_by_side_tables_split_the_width() {
        let area = Rect::new(0, 0, 100, 50);
        let areas = build_layout(area, 0);
        assert_eq!(areas.procs_cpu.width + areas.procs_mem.width, 100);
        assert_eq!(areas.cpu.y, areas.memory.y);
    }
}
