//! Rendering. Pure function of the app state: the renderer never mutates
//! anything, it only compares resolved slots against the cursor to decide
//! what is focused.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Tabs, Wrap};

use crate::app::{App, Feedback};
use crate::constants::ENDPOINT_PRESETS;
use crate::draft::TransactionKind;
use crate::focus::{Section, Slot, TEXT_AREA_COUNT};

pub fn render(frame: &mut Frame, app: &App) {
    let [tabs_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_tabs(frame, app, tabs_area);
    match app.section {
        Section::Main => render_main(frame, app, body_area),
        Section::UcoTransfers => render_uco(frame, app, body_area),
        Section::TokenTransfers => render_tokens(frame, app, body_area),
        Section::Recipients => render_recipients(frame, app, body_area),
        Section::Ownerships => render_ownerships(frame, app, body_area),
        Section::Content => render_content(frame, app, body_area),
    }
    render_status(frame, app, status_area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles = Section::ALL.iter().map(|s| s.title());
    let tabs = Tabs::new(titles)
        .select(app.section.index())
        .style(app.theme.muted)
        .highlight_style(app.theme.focused)
        .divider("|");
    frame.render_widget(tabs, area);
}

/// Style of the control occupying `slot`.
fn slot_style(app: &App, slot: Slot) -> Style {
    if app.current_slot() == slot {
        app.theme.focused
    } else {
        app.theme.blurred
    }
}

fn radio(selected: bool) -> &'static str {
    if selected { "(•)" } else { "( )" }
}

fn field_line<'a>(app: &'a App, slot: Slot, label: &'a str, value: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label}: "), app.theme.muted),
        Span::styled(value, slot_style(app, slot)),
    ])
}

fn button<'a>(app: &'a App, slot: Slot, label: &'a str) -> Line<'a> {
    Line::styled(format!("[ {label} ]"), slot_style(app, slot))
}

fn render_main(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    if app.service_mode {
        lines.push(Line::styled(
            format!("Composing transaction for service \"{}\"", app.service_name),
            app.theme.muted,
        ));
        lines.push(Line::default());
    } else {
        lines.push(Line::styled("Node endpoint", app.theme.muted));
        for (i, (name, url)) in ENDPOINT_PRESETS.iter().enumerate() {
            let selected = app.selected_preset == Some(i);
            lines.push(Line::styled(
                format!("  {} {name:<8} {url}", radio(selected)),
                slot_style(app, Slot::EndpointPreset(i)),
            ));
        }
        lines.push(field_line(
            app,
            Slot::EndpointField,
            "Endpoint",
            &app.endpoint_input,
        ));
        let masked = "*".repeat(app.seed_input.chars().count());
        lines.push(Line::from(vec![
            Span::styled("Seed: ", app.theme.muted),
            Span::styled(masked, slot_style(app, Slot::SeedField)),
        ]));
        lines.push(Line::default());
    }

    lines.push(Line::styled("Transaction type", app.theme.muted));
    for (i, kind) in TransactionKind::ALL.iter().enumerate() {
        let selected = app.draft.kind == *kind;
        lines.push(Line::styled(
            format!("  {} {}", radio(selected), kind.as_str()),
            slot_style(app, Slot::Kind(i)),
        ));
    }
    lines.push(Line::default());
    lines.push(button(app, Slot::Submit, "Submit transaction"));

    let block = Block::bordered()
        .border_style(app.theme.border)
        .title(Section::Main.title());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_uco(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        field_line(app, Slot::Field(0), "To", &app.uco_inputs[0]),
        field_line(app, Slot::Field(1), "Amount", &app.uco_inputs[1]),
        button(app, Slot::Add, "Add"),
    ];
    push_entry_lines(
        app,
        &mut lines,
        app.draft.uco_transfers.len(),
        |i| {
            let t = &app.draft.uco_transfers[i];
            format!("{} uco -> {}", t.amount, t.to.to_hex())
        },
    );
    render_list_body(frame, app, area, Section::UcoTransfers, lines);
}

fn render_tokens(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        field_line(app, Slot::Field(0), "To", &app.token_inputs[0]),
        field_line(app, Slot::Field(1), "Amount", &app.token_inputs[1]),
        field_line(app, Slot::Field(2), "Token address", &app.token_inputs[2]),
        field_line(app, Slot::Field(3), "Token id", &app.token_inputs[3]),
        button(app, Slot::Add, "Add"),
    ];
    push_entry_lines(
        app,
        &mut lines,
        app.draft.token_transfers.len(),
        |i| {
            let t = &app.draft.token_transfers[i];
            format!(
                "{} of {} (id {}) -> {}",
                t.amount,
                t.token_address.to_hex(),
                t.token_id,
                t.to.to_hex()
            )
        },
    );
    render_list_body(frame, app, area, Section::TokenTransfers, lines);
}

fn render_recipients(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        field_line(app, Slot::Field(0), "Contract address", &app.recipient_input),
        button(app, Slot::Add, "Add"),
    ];
    push_entry_lines(app, &mut lines, app.draft.recipients.len(), |i| {
        app.draft.recipients[i].address.to_hex()
    });
    render_list_body(frame, app, area, Section::Recipients, lines);
}

fn render_ownerships(frame: &mut Frame, app: &App, area: Rect) {
    let masked = "*".repeat(app.secret_input.chars().count());
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Secret: ", app.theme.muted),
            Span::styled(masked, slot_style(app, Slot::Field(0))),
        ]),
        field_line(
            app,
            Slot::Field(1),
            "Authorization key",
            &app.pending_key_input,
        ),
    ];
    for (i, key) in app.pending_keys.iter().enumerate() {
        lines.push(Line::styled(
            format!("  • {key}"),
            slot_style(app, Slot::PendingKey(i)),
        ));
    }
    lines.push(button(app, Slot::AddAuthorizedKey, "Add authorization key"));
    lines.push(button(app, Slot::LoadNetworkKey, "Load storage nonce public key"));
    lines.push(button(app, Slot::CommitOwnership, "Add ownership"));
    push_entry_lines(app, &mut lines, app.draft.ownerships.len(), |i| {
        let o = &app.draft.ownerships[i];
        format!("secret ({} authorized keys)", o.authorized_keys.len())
    });
    render_list_body(frame, app, area, Section::Ownerships, lines);
}

fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    let [content_area, code_area] =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);
    let titles = ["Content", "Smart contract code"];
    for (i, sub_area) in [content_area, code_area].into_iter().enumerate() {
        debug_assert!(i < TEXT_AREA_COUNT);
        let focused = app.current_slot() == Slot::TextArea(i);
        let block = Block::bordered()
            .border_style(if focused {
                app.theme.focused
            } else {
                app.theme.border
            })
            .title(titles[i]);
        frame.render_widget(
            Paragraph::new(app.content_inputs[i].as_str())
                .wrap(Wrap { trim: false })
                .block(block),
            sub_area,
        );
    }
}

fn push_entry_lines<'a>(
    app: &'a App,
    lines: &mut Vec<Line<'a>>,
    count: usize,
    describe: impl Fn(usize) -> String,
) {
    if count == 0 {
        return;
    }
    lines.push(Line::default());
    lines.push(Line::styled("Added (press d to delete)", app.theme.muted));
    for i in 0..count {
        lines.push(Line::styled(
            format!("  {}. {}", i + 1, describe(i)),
            slot_style(app, Slot::Entry(i)),
        ));
    }
}

fn render_list_body(frame: &mut Frame, app: &App, area: Rect, section: Section, lines: Vec<Line>) {
    let block = Block::bordered()
        .border_style(app.theme.border)
        .title(section.title());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    // An inline field error outranks general feedback.
    let line = if let Some(err) = &app.field_error {
        Line::styled(err.to_string(), app.theme.error)
    } else {
        match &app.feedback {
            Some(Feedback::Info(text)) => Line::styled(text.as_str(), app.theme.muted),
            Some(Feedback::Success(text)) => Line::styled(text.as_str(), app.theme.success),
            Some(Feedback::Error(text)) => Line::styled(text.as_str(), app.theme.error),
            None => Line::styled(
                "tab: next section | arrows: move | enter: select | esc: quit",
                app.theme.muted,
            ),
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}
