use super::format::{
    bar, format_gb, format_local, format_rate, format_uptime, percent_color, temp_color, truncate,
};
use crate::sparkline::{encode_auto, encode_percent};
use crate::state::Dashboard;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table};

const SPARK_WIDTH: usize = 20;
const MAX_TEMPS: usize = 10;

pub fn draw(frame: &mut Frame, dash: &Dashboard) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Min(6),
        ])
        .split(frame.area());

    render_header(frame, rows[0], dash);

    let top = thirds(rows[1]);
    render_cpu(frame, top[0], dash);
    render_memory(frame, top[1], dash);
    render_processes(frame, top[2], dash);

    let middle = thirds(rows[2]);
    render_network(frame, middle[0], dash);
    render_temperatures(frame, middle[1], dash);
    render_disk(frame, middle[2], dash);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[3]);
    render_recent_files(frame, bottom[0], dash);
    render_directories(frame, bottom[1], dash);
}

fn thirds(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area)
}

fn panel(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().add_modifier(Modifier::BOLD),
        ))
}

fn render_header(frame: &mut Frame, area: Rect, dash: &Dashboard) {
    let host = &dash.host;
    let host_name = host.host_name.as_deref().unwrap_or("unknown");
    let os = format!(
        "{} {}",
        host.os_name.as_deref().unwrap_or(""),
        host.kernel_version.as_deref().unwrap_or("")
    );
    let load = match host.load_average {
        Some(l) => format!("{:.2}  {:.2}  {:.2}", l.one_min, l.five_min, l.fifteen_min),
        None => "n/a".to_string(),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {host_name} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(os, Style::default().add_modifier(Modifier::DIM)),
        Span::raw("  │  "),
        Span::styled(
            format_local(dash.collected_at_unix),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  │  load "),
        Span::styled(load, Style::default().fg(Color::Yellow)),
        Span::raw("  │  up "),
        Span::styled(format_uptime(host.uptime_seconds), Style::default().fg(Color::Green)),
    ]);

    let block = panel("FOID - Fast Output Info Display", Color::LightBlue)
        .border_type(BorderType::Thick);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_cpu(frame: &mut Frame, area: Rect, dash: &Dashboard) {
    let block = panel("CPU", Color::Cyan);
    let inner = block.inner(area);
    let core_rows = inner.height.saturating_sub(1) as usize;
    let bar_width = (inner.width as usize).saturating_sub(18).max(4);

    let mut lines: Vec<Line> = dash
        .cpu_per_core
        .iter()
        .enumerate()
        .take(core_rows)
        .map(|(i, pct)| {
            let pct = f64::from(*pct);
            Line::from(vec![
                Span::styled(format!("Core {i:>2} "), Style::default().fg(Color::Cyan)),
                Span::styled(bar(pct, bar_width), Style::default().fg(percent_color(pct))),
                Span::raw(format!(" {pct:>5.1}%")),
            ])
        })
        .collect();

    lines.push(Line::from(vec![
        Span::raw(format!("Total {:>5.1}%  ", dash.cpu_total)),
        Span::styled(
            encode_percent(&dash.cpu_history, SPARK_WIDTH),
            Style::default().fg(percent_color(dash.cpu_total)),
        ),
    ]));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_memory(frame: &mut Frame, area: Rect, dash: &Dashboard) {
    let block = panel("Memory", Color::Magenta);
    let bar_width = (block.inner(area).width as usize).saturating_sub(16).max(4);

    let gauge = |label: &str, pct: f64| {
        Line::from(vec![
            Span::styled(format!("{label:<5} "), Style::default().fg(Color::Cyan)),
            Span::styled(bar(pct, bar_width), Style::default().fg(Color::Magenta)),
            Span::raw(format!(" {pct:>5.1}%")),
        ])
    };

    let lines = vec![
        gauge("RAM", dash.ram.percent),
        gauge("Swap", dash.swap.percent),
        Line::raw(""),
        Line::styled(
            format!(
                "Used {} / {}   Swap {} / {}",
                format_gb(dash.ram.used_bytes),
                format_gb(dash.ram.total_bytes),
                format_gb(dash.swap.used_bytes),
                format_gb(dash.swap.total_bytes)
            ),
            Style::default().add_modifier(Modifier::DIM),
        ),
        Line::from(vec![
            Span::raw("History "),
            Span::styled(
                encode_percent(&dash.ram_history, SPARK_WIDTH),
                Style::default().fg(percent_color(dash.ram.percent)),
            ),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_processes(frame: &mut Frame, area: Rect, dash: &Dashboard) {
    let header = Row::new(["PID", "Name", "CPU %", "MEM %", "Status"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows = dash.top_processes.iter().map(|p| {
        let status_style = if p.status == "running" {
            Style::default().fg(Color::Green)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        Row::new(vec![
            Cell::from(p.pid.to_string()).style(Style::default().add_modifier(Modifier::DIM)),
            Cell::from(truncate(&p.name, 20)),
            Cell::from(format!("{:.1}", p.cpu_percent))
                .style(Style::default().fg(percent_color(f64::from(p.cpu_percent)))),
            Cell::from(format!("{:.1}", p.mem_percent))
                .style(Style::default().fg(percent_color(f64::from(p.mem_percent)))),
            Cell::from(p.status.clone()).style(status_style),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Min(14),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(panel("Heaviest processes", Color::Yellow));
    frame.render_widget(table, area);
}

fn render_network(frame: &mut Frame, area: Rect, dash: &Dashboard) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("▼ Down ", Style::default().fg(Color::Green)),
            Span::styled(
                format!("{:>12}  ", format_rate(dash.net_recv_rate)),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                encode_auto(&dash.net_recv_history, SPARK_WIDTH),
                Style::default().fg(Color::Green).add_modifier(Modifier::DIM),
            ),
        ]),
        Line::from(vec![
            Span::styled("▲ Up   ", Style::default().fg(Color::Cyan)),
            Span::styled(
                format!("{:>12}  ", format_rate(dash.net_sent_rate)),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                encode_auto(&dash.net_sent_history, SPARK_WIDTH),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::DIM),
            ),
        ]),
    ];

    if !dash.connections.is_empty() {
        let dim = Style::default().add_modifier(Modifier::DIM);
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            format!("Active connections: {}", dash.connections.len()),
            dim,
        ));
        for conn in dash.connections.iter().take(4) {
            lines.push(Line::styled(
                format!("  {} → {}", conn.local, conn.remote),
                dim,
            ));
        }
    }

    frame.render_widget(
        Paragraph::new(lines).block(panel("Network", Color::Green)),
        area,
    );
}

fn render_temperatures(frame: &mut Frame, area: Rect, dash: &Dashboard) {
    let block = panel("Temperature", Color::Red);
    if dash.temperatures.is_empty() {
        let text = Paragraph::new("Not available on this system")
            .style(Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let rows = dash.temperatures.iter().take(MAX_TEMPS).map(|(name, celsius)| {
        Row::new(vec![
            Cell::from(truncate(name, 26)).style(Style::default().add_modifier(Modifier::DIM)),
            Cell::from(format!("{celsius:.0}°C")).style(Style::default().fg(temp_color(*celsius))),
        ])
    });
    let table = Table::new(rows, [Constraint::Min(10), Constraint::Length(7)]).block(block);
    frame.render_widget(table, area);
}

fn render_disk(frame: &mut Frame, area: Rect, dash: &Dashboard) {
    let block = panel("Disk", Color::Blue);
    let bar_width = (block.inner(area).width as usize).saturating_sub(18).max(4);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut lines = Vec::new();
    match &dash.disk_usage {
        Some(usage) => {
            lines.push(Line::from(vec![
                Span::styled(format!("Disk {:<3}", usage.mount), Style::default().fg(Color::Cyan)),
                Span::raw(" "),
                Span::styled(bar(usage.percent, bar_width), Style::default().fg(Color::Blue)),
                Span::raw(format!(" {:>5.1}%", usage.percent)),
            ]));
            lines.push(Line::styled(
                format!(
                    "Used {} / {}",
                    format_gb(usage.used_bytes),
                    format_gb(usage.total_bytes)
                ),
                dim,
            ));
        }
        None => lines.push(Line::styled("No disks reported", dim)),
    }
    if let Some(io) = dash.disk_io {
        lines.push(Line::from(vec![
            Span::styled("Reads ", dim),
            Span::styled(format_gb(io.read_bytes), Style::default().fg(Color::Green)),
            Span::styled("   Writes ", dim),
            Span::styled(format_gb(io.write_bytes), Style::default().fg(Color::Yellow)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_recent_files(frame: &mut Frame, area: Rect, dash: &Dashboard) {
    let header = Row::new(["File", "Modified"]).style(Style::default().add_modifier(Modifier::BOLD));
    let rows = dash
        .recent_files
        .iter()
        .map(|f| Row::new(vec![f.name.clone(), format_local(f.modified_unix)]));
    let table = Table::new(rows, [Constraint::Min(16), Constraint::Length(21)])
        .header(header)
        .block(panel("Recent files", Color::White));
    frame.render_widget(table, area);
}

fn render_directories(frame: &mut Frame, area: Rect, dash: &Dashboard) {
    let header = Row::new(["Directory", "CPU %", "MEM %"])
        .style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD));
    let rows = dash.heavy_directories.iter().map(|d| {
        Row::new(vec![
            Cell::from(truncate(&d.path, 40)),
            Cell::from(format!("{:.1}", d.cpu_percent))
                .style(Style::default().fg(percent_color(d.cpu_percent))),
            Cell::from(format!("{:.1}", d.mem_percent))
                .style(Style::default().fg(percent_color(d.mem_percent))),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(7),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(panel("Directories using the most CPU", Color::Magenta));
    frame.render_widget(table, area);
}
