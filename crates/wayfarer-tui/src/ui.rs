use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use wayfarer_core::{profile, AppMode, ChatRole, Facing, LocationId, Point};

use crate::app::{App, InputMode};

/// Colors for the current time of day.
struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    marker: Color,
    path: Color,
}

fn palette(is_night: bool) -> Palette {
    if is_night {
        Palette {
            bg: Color::Rgb(15, 23, 42),
            fg: Color::White,
            muted: Color::DarkGray,
            accent: Color::Magenta,
            marker: Color::Gray,
            path: Color::Rgb(51, 65, 85),
        }
    } else {
        Palette {
            bg: Color::Rgb(125, 211, 252),
            fg: Color::Rgb(15, 23, 42),
            muted: Color::Rgb(71, 85, 105),
            accent: Color::Rgb(5, 150, 105),
            marker: Color::Rgb(6, 95, 70),
            path: Color::Rgb(56, 189, 248),
        }
    }
}

/// Terminal cell for a map point given in viewport percent.
pub fn location_cell(area: Rect, point: Point) -> (u16, u16) {
    let w = area.width.saturating_sub(1) as f32;
    let h = area.height.saturating_sub(1) as f32;
    let x = area.x + (point.x / 100.0 * w).round() as u16;
    let y = area.y + (point.y / 100.0 * h).round() as u16;
    (x, y)
}

/// Route bar slot under column `x`, for mouse hits in Standard mode.
pub fn route_slot_at(area: Rect, x: u16) -> Option<LocationId> {
    let routes = LocationId::routes();
    let slot = (area.width / routes.len() as u16).max(1);
    let idx = (x.checked_sub(area.x)? / slot) as usize;
    routes.get(idx).copied()
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        match after.find("**") {
            Some(end) if end > 0 => {
                if start > 0 {
                    spans.push(Span::raw(rest[..start].to_string()));
                }
                spans.push(Span::styled(
                    after[..end].to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                rest = &after[end + 2..];
            }
            // No closing **, treat as literal
            _ => break,
        }
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let pal = palette(app.state().is_night);

    frame.render_widget(Block::default().style(Style::default().bg(pal.bg).fg(pal.fg)), area);

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.mode() {
        None => render_mode_select(app, frame, body_area, &pal),
        Some(AppMode::Adventure) => render_map(app, frame, body_area, &pal),
        Some(AppMode::Standard) => render_standard(app, frame, body_area, &pal),
    }

    if app.mode().is_some() && app.panel_open() {
        render_panel(app, frame, body_area, &pal);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let state = app.state();
    let sky = if state.is_night { "☾ night" } else { "☀ day" };
    let key_indicator = match app.key_source {
        Some(source) => format!(" [oracle key: {}]", source),
        None => " [oracle offline]".to_string(),
    };

    let title = Line::from(vec![
        Span::styled(" WAYFARER ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            state.mode.map(|m| m.display_name()).unwrap_or("Choose your destiny"),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(sky, Style::default().fg(Color::Yellow)),
        Span::styled(key_indicator, Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match (app.mode(), app.input_mode) {
        (_, InputMode::Editing) => " INPUT ",
        (None, _) => " SELECT ",
        (Some(AppMode::Adventure), _) => " ADVENTURE ",
        (Some(AppMode::Standard), _) => " STANDARD ",
    };

    let hints = if app.input_mode == InputMode::Editing {
        "Enter send  Esc stop typing  ←/→ move cursor"
    } else if app.mode().is_none() {
        "←/→ choose  Enter confirm  1/2 quick pick  t day/night  q quit"
    } else if app.panel_open() {
        match app.current_location() {
            LocationId::Function => "j/k select skill  Enter scan  x close scan  Esc close",
            LocationId::Oracle => "i type  j/k scroll  G latest  Esc close",
            _ => "Esc close  t day/night",
        }
    } else if app.mode() == Some(AppMode::Adventure) {
        "Tab/←/→ pick location  Enter walk  1-5 walk  click marker  m modes  t day/night  q quit"
    } else {
        "Tab/←/→ pick route  Enter open  1-4 open  m modes  t day/night  q quit"
    };

    let line = Line::from(vec![
        Span::styled(mode_text, mode_style.bold()),
        Span::raw(" "),
        Span::styled(hints, Style::default().fg(Color::Gray)),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(Color::Black)), area);
}

fn render_mode_select(app: &App, frame: &mut Frame, area: Rect, pal: &Palette) {
    let width = 64.min(area.width.saturating_sub(2));
    let height = 14.min(area.height);
    let popup = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(Color::DarkGray))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    let inner = block.inner(popup);
    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    let [title_area, _, options_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    let pulse = if (app.animation_frame / 10) % 2 == 0 {
        Color::Red
    } else {
        Color::Magenta
    };
    let title = Text::from(vec![
        Line::from(Span::styled("GREETINGS, STRUGGLER.", Style::default().fg(pulse).bold())),
        Line::from(Span::styled(
            "The path ahead is bifurcated. Choose your destiny.",
            Style::default().fg(Color::Gray),
        )),
    ]);
    frame.render_widget(Paragraph::new(title).alignment(Alignment::Center), title_area);

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(options_area);

    let options = [
        (left, AppMode::Adventure, "⌖", "Explore the realm. Walk the path.", Color::Green),
        (right, AppMode::Standard, "▦", "Efficient access. No wandering.", Color::Blue),
    ];
    for (idx, (rect, mode, icon, blurb, color)) in options.into_iter().enumerate() {
        let selected = app.mode_cursor == idx;
        let border = if selected { color } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if selected { BorderType::Double } else { BorderType::Rounded })
            .border_style(Style::default().fg(border));
        let body = Text::from(vec![
            Line::from(Span::styled(icon, Style::default().fg(color).bold())),
            Line::from(Span::styled(
                format!("{} {}", idx + 1, mode.display_name()),
                Style::default().fg(color).bold(),
            )),
            Line::from(Span::styled(blurb, Style::default().fg(pal.muted))),
        ]);
        frame.render_widget(
            Paragraph::new(body)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block),
            rect,
        );
    }
}

fn render_map(app: &mut App, frame: &mut Frame, area: Rect, pal: &Palette) {
    let state = app.state().clone();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(pal.muted))
        .title(" The Realm ");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    app.map_area = Some(inner);

    if inner.width < 10 || inner.height < 6 {
        return;
    }

    render_sky(app, frame, inner, pal, state.is_night);

    let buf = frame.buffer_mut();

    // Trails from the start marker to every other location
    let home = LocationId::Home.position();
    for id in LocationId::routes() {
        let target = id.position();
        let steps = 24;
        for s in 2..steps - 1 {
            let (x, y) = location_cell(inner, home.lerp(target, s as f32 / steps as f32));
            buf.set_string(x, y, "·", Style::default().fg(pal.path));
        }
    }

    let focused = app.focused_location();
    for id in LocationId::all() {
        let loc = id.location();
        let (cx, cy) = location_cell(inner, loc.position);

        let mut marker_style = Style::default().fg(pal.marker).bold();
        if id == state.nav.current {
            marker_style = marker_style.fg(Color::Yellow);
        }
        if id == focused {
            marker_style = marker_style.add_modifier(Modifier::REVERSED);
        }
        let marker = format!("[{}]", loc.icon);
        let mx = cx.saturating_sub(1).max(inner.x);
        buf.set_string(mx, cy, &marker, marker_style);

        let label = loc.label.to_uppercase();
        let label_len = label.chars().count() as u16;
        let lx = cx
            .saturating_sub(label_len / 2)
            .max(inner.x)
            .min((inner.x + inner.width).saturating_sub(label_len));
        let ly = (cy + 1).min(inner.y + inner.height - 1);
        buf.set_string(lx, ly, &label, Style::default().fg(pal.fg).add_modifier(Modifier::DIM));
    }

    // Avatar stands just above its point
    let nav = &state.nav;
    let (ax, ay) = location_cell(inner, app.controller.avatar_draw_position());
    let bounce = nav.avatar.is_walking && (app.animation_frame / 3) % 2 == 0;
    let ay = ay.saturating_sub(if bounce { 2 } else { 1 }).max(inner.y);
    let glyph = match nav.avatar.facing {
        Facing::Left => "◄☻",
        Facing::Right => "☻►",
        Facing::Front => "☻",
        Facing::Back => "◘",
    };
    let gx = match nav.avatar.facing {
        Facing::Left => ax.saturating_sub(1),
        _ => ax,
    };
    buf.set_string(gx, ay, glyph, Style::default().fg(Color::LightBlue).bold());

    if !nav.avatar.is_walking && !nav.panel_open && nav.current == LocationId::Home {
        let hint = " Tab to pick a location, Enter to walk! ";
        let len = hint.chars().count() as u16;
        let hx = ax.saturating_sub(len / 2).max(inner.x);
        let hy = ay.saturating_sub(2).max(inner.y);
        let style = if state.is_night {
            Style::default().bg(Color::White).fg(Color::Black)
        } else {
            Style::default().bg(Color::Rgb(30, 41, 59)).fg(Color::White)
        };
        buf.set_string(hx, hy, hint, style);
    }
}

fn render_sky(app: &App, frame: &mut Frame, area: Rect, pal: &Palette, is_night: bool) {
    let buf = frame.buffer_mut();
    let sky_rows = (area.height * 3 / 10).max(1);

    if is_night {
        for i in 0..(area.width as u32 / 3) {
            let x = area.x + ((i * 37 + 11) % area.width as u32) as u16;
            let y = area.y + ((i * 17 + 3) % sky_rows as u32) as u16;
            let twinkle = (app.animation_frame as u32 / 6 + i) % 4 == 0;
            let (ch, color) = if twinkle { ("✦", Color::White) } else { ("·", Color::Gray) };
            buf.set_string(x, y, ch, Style::default().fg(color));
        }
        buf.set_string(
            area.x + area.width.saturating_sub(6),
            area.y,
            "☾",
            Style::default().fg(Color::LightYellow).bold(),
        );
    } else {
        for i in 0..(area.width as u32 / 20).max(1) {
            let x = area.x + ((i * 29 + 5) % area.width.saturating_sub(6).max(1) as u32) as u16;
            let y = area.y + ((i * 7 + 1) % sky_rows as u32) as u16;
            buf.set_string(x, y, "☁☁", Style::default().fg(Color::White));
        }
        buf.set_string(
            area.x + area.width.saturating_sub(6),
            area.y,
            "☀",
            Style::default().fg(Color::Yellow).bold(),
        );
    }

    // Ground line
    let ground = area.y + area.height - 1;
    buf.set_string(
        area.x,
        ground,
        "▁".repeat(area.width as usize),
        Style::default().fg(pal.accent),
    );
}

fn render_standard(app: &mut App, frame: &mut Frame, area: Rect, pal: &Palette) {
    let [bar_area, decor_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(pal.muted));
    let inner = block.inner(bar_area);
    frame.render_widget(block, bar_area);
    app.route_area = Some(inner);

    let routes = LocationId::routes();
    let slot = (inner.width / routes.len() as u16).max(1) as usize;
    let focused = app.focused_location();
    let current = app.current_location();

    let spans: Vec<Span> = routes
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let loc = id.location();
            let text = format!("{} {} {}", i + 1, loc.icon, loc.route_label);
            let mut style = Style::default().fg(pal.fg);
            if *id == current && app.panel_open() {
                style = style.fg(pal.accent).bold();
            }
            if *id == focused {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Span::styled(format!("{:^width$}", text, width = slot), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);

    let art = Text::from(vec![
        Line::from(""),
        Line::from("    |>>>            "),
        Line::from("    |               "),
        Line::from("   _|_   _   _      "),
        Line::from("  |   |_| |_| |     "),
        Line::from("  |  ___      |     "),
        Line::from("  | |   |     |  /\\  "),
        Line::from("  |_|___|_____| /  \\ "),
        Line::from(""),
        Line::from(Span::styled(
            "Efficient access. No wandering.",
            Style::default().fg(pal.muted).add_modifier(Modifier::ITALIC),
        )),
    ]);
    frame.render_widget(
        Paragraph::new(art)
            .alignment(Alignment::Center)
            .style(Style::default().fg(pal.path)),
        decor_area,
    );
}

fn render_panel(app: &mut App, frame: &mut Frame, area: Rect, pal: &Palette) {
    let width = (area.width * 4 / 5).clamp(20.min(area.width), 90.min(area.width));
    let height = (area.height * 4 / 5).max(8.min(area.height));
    let popup = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    // Clear the area behind the popup
    frame.render_widget(Clear, popup);

    let location = app.current_location().location();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(pal.accent))
        .style(Style::default().bg(pal.bg).fg(pal.fg))
        .title(format!(" {} {} ", location.icon, location.label))
        .title_bottom(Line::from(" Esc to close ").right_aligned());
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    match location.id {
        LocationId::Bio => render_bio(frame, inner, pal),
        LocationId::Function => render_skills(app, frame, inner, pal),
        LocationId::Oracle => render_oracle(app, frame, inner, pal),
        LocationId::Contact => render_contact(frame, inner, pal),
        LocationId::Home => {
            frame.render_widget(Paragraph::new("Nothing here but the road."), inner);
        }
    }
}

fn render_bio(frame: &mut Frame, area: Rect, pal: &Palette) {
    let mut lines = vec![
        Line::from(Span::styled("About Me", Style::default().fg(pal.accent).bold())),
        Line::from(""),
        parse_markdown_line(profile::BIO),
        Line::from(""),
        Line::from(Span::styled("Character Stats", Style::default().bold())),
    ];
    for stat in profile::STATS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}: {:>2} ", stat.name, stat.value), Style::default().fg(Color::Yellow)),
            Span::styled(format!("({})", stat.flavor), Style::default().fg(pal.muted)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Hobbies", Style::default().bold())));
    for hobby in profile::HOBBIES {
        lines.push(Line::from(format!("  • {}", hobby)));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_skills(app: &App, frame: &mut Frame, area: Rect, pal: &Palette) {
    let scan = app.state().scan.as_ref();
    let scan_height = if scan.is_some() { 5 } else { 0 };

    let [title_area, scan_area, cards_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(scan_height),
        Constraint::Min(0),
    ])
    .areas(area);

    let title = Text::from(vec![
        Line::from(Span::styled("Functions & Skills", Style::default().fg(pal.accent).bold())),
        Line::from(Span::styled(
            "My Technical Arsenal - Select a skill and press Enter to scan it! ✨",
            Style::default().fg(pal.muted),
        )),
    ]);
    frame.render_widget(Paragraph::new(title), title_area);

    if let Some(scan) = scan {
        let body = if scan.loading {
            let dots = ".".repeat((app.animation_frame as usize / 6) % 3 + 1);
            Line::from(Span::styled(
                format!("Decrypting ancient scrolls{}", dots),
                Style::default().fg(pal.muted).add_modifier(Modifier::ITALIC),
            ))
        } else {
            Line::from(Span::styled(
                format!("\"{}\"", scan.description),
                Style::default().add_modifier(Modifier::ITALIC),
            ))
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(format!(" ✦ Scanning {}... ", scan.skill))
            .title_bottom(Line::from(" x close scan ").right_aligned());
        frame.render_widget(
            Paragraph::new(body).wrap(Wrap { trim: true }).block(block),
            scan_area,
        );
    }

    let mut lines = Vec::new();
    let mut index = 0;
    for category in profile::SKILL_CATEGORIES {
        lines.push(Line::from(Span::styled(
            format!("{} {}", category.icon, category.title),
            Style::default().bold(),
        )));
        let mut spans = vec![Span::raw("  ")];
        for skill in category.skills {
            let style = if index == app.skill_cursor {
                Style::default().bg(Color::Magenta).fg(Color::White).bold()
            } else {
                Style::default().fg(pal.fg)
            };
            spans.push(Span::styled(format!(" {} ", skill), style));
            spans.push(Span::raw(" "));
            index += 1;
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), cards_area);
}

fn render_oracle(app: &mut App, frame: &mut Frame, area: Rect, pal: &Palette) {
    let [title_area, chat_area, input_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(3),
        Constraint::Length(3),
    ])
    .areas(area);

    let mut title = vec![Line::from(vec![
        Span::styled("AI Nexus ", Style::default().fg(pal.accent).bold()),
        Span::styled("Consult the Digital Construct ✨", Style::default().fg(pal.muted)),
    ])];
    for greeting in app.state().chat.iter().filter(|m| m.role == ChatRole::System) {
        title.push(Line::from(Span::styled(
            greeting.text.clone(),
            Style::default().fg(pal.muted).add_modifier(Modifier::ITALIC),
        )));
    }
    frame.render_widget(Paragraph::new(title).wrap(Wrap { trim: true }), title_area);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(pal.muted));
    let chat_inner = chat_block.inner(chat_area);
    app.chat_height = chat_inner.height;
    app.chat_width = chat_inner.width;

    let state = app.state();
    let mut lines: Vec<Line> = Vec::new();
    for msg in state.visible_chat() {
        let (label, color, alignment) = match msg.role {
            ChatRole::User => ("You", Color::Cyan, Alignment::Right),
            _ => ("Oracle", Color::Magenta, Alignment::Left),
        };
        lines.push(Line::from(Span::styled(label, Style::default().fg(color).bold())).alignment(alignment));
        for text_line in msg.text.lines() {
            lines.push(Line::from(text_line.to_string()).alignment(alignment));
        }
        lines.push(Line::from(""));
    }
    if state.chat_loading {
        let dots = ".".repeat((app.animation_frame as usize / 6) % 3 + 1);
        lines.push(Line::from(Span::styled("Oracle", Style::default().fg(Color::Magenta).bold())));
        lines.push(Line::from(Span::styled(
            format!("Computing{}", dots),
            Style::default().fg(pal.muted).add_modifier(Modifier::ITALIC),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((app.chat_scroll, 0))
            .block(chat_block),
        chat_area,
    );

    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { pal.muted }))
        .title(if state.chat_loading { " waiting for the construct " } else { " ask " });
    let input_inner = input_block.inner(input_area);

    let input_text = if app.chat_input.is_empty() && !editing {
        Span::styled("Ask the construct a question... (i to type)", Style::default().fg(pal.muted))
    } else {
        Span::raw(app.chat_input.clone())
    };
    frame.render_widget(Paragraph::new(Line::from(input_text)).block(input_block), input_area);

    if editing {
        let cursor_x = input_inner.x + (app.chat_cursor as u16).min(input_inner.width.saturating_sub(1));
        frame.set_cursor_position((cursor_x, input_inner.y));
    }
}

fn render_contact(frame: &mut Frame, area: Rect, pal: &Palette) {
    let mut lines = vec![
        Line::from(Span::styled("Contact Cave", Style::default().fg(pal.accent).bold())),
        Line::from(""),
    ];
    for link in profile::CONTACT_LINKS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<8}", link.label), Style::default().bold()),
            Span::styled(link.target, Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Quest givers welcome. Send word by any of the paths above.",
        Style::default().fg(pal.muted),
    )));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}
