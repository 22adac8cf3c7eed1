use crate::dashboard::Dashboard;
use crate::formatter::Clock;
use crate::market::{Direction, IndexKey, Period, TagCategory};
use crate::surface::{ElementId, Node};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Tabs, Wrap},
    Frame, Terminal,
};
use std::collections::HashSet;
use std::io::{self, Stdout};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    TabBar,
    Indices,
    Summary,
    Sectors,
    News,
    Help,
}

impl Component {
    /// Returns all available components
    pub fn all() -> Vec<Component> {
        vec![
            Component::TabBar,
            Component::Indices,
            Component::Summary,
            Component::Sectors,
            Component::News,
            Component::Help,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::TabBar => "tab_bar",
            Component::Indices => "indices",
            Component::Summary => "summary",
            Component::Sectors => "sectors",
            Component::News => "news",
            Component::Help => "help",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Component::TabBar => "Period tabs and date label",
            Component::Indices => "Index cards",
            Component::Summary => "Market summary",
            Component::Sectors => "Sector performance",
            Component::News => "News headlines",
            Component::Help => "Last update and keyboard shortcuts",
        }
    }
}

impl FromStr for Component {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Component::all()
            .into_iter()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown component: '{s}'"))
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisabledComponents {
    disabled: HashSet<Component>,
}

impl DisabledComponents {
    pub fn new(disabled_list: &[String]) -> Self {
        let mut disabled = HashSet::new();

        for component_str in disabled_list {
            match Component::from_str(component_str) {
                Ok(component) => {
                    disabled.insert(component);
                }
                Err(err) => log::warn!("{err}"),
            }
        }

        DisabledComponents { disabled }
    }

    pub fn is_disabled(&self, component: Component) -> bool {
        self.disabled.contains(&component)
    }
}

/// Korean market convention: rising prices red, falling prices blue.
pub fn direction_color(direction: Option<Direction>) -> Color {
    match direction {
        Some(Direction::Up) => Color::Red,
        Some(Direction::Down) => Color::LightBlue,
        None => Color::White,
    }
}

pub fn tag_color(category: TagCategory) -> Color {
    match category {
        TagCategory::Stock => Color::Magenta,
        TagCategory::Forex => Color::Green,
        TagCategory::Economy => Color::Yellow,
        TagCategory::Crypto => Color::Cyan,
        TagCategory::Bond => Color::LightRed,
    }
}

pub struct App<C: Clock> {
    pub dashboard: Dashboard<C>,
    pub should_quit: bool,
    pub error_message: Option<String>,
    pub disabled_components: DisabledComponents,
}

impl<C: Clock> App<C> {
    pub fn new(dashboard: Dashboard<C>, disabled_components: DisabledComponents) -> App<C> {
        App {
            dashboard,
            should_quit: false,
            error_message: None,
            disabled_components,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        if self.error_message.is_some() {
            // any key dismisses the popup
            self.error_message = None;
            return;
        }

        let result = match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                Ok(())
            }
            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => self.dashboard.previous(),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => self.dashboard.next(),
            KeyCode::Char('1') | KeyCode::Char('d') => self.dashboard.select(Period::Daily),
            KeyCode::Char('2') | KeyCode::Char('w') => self.dashboard.select(Period::Weekly),
            KeyCode::Char('3') | KeyCode::Char('m') => self.dashboard.select(Period::Monthly),
            KeyCode::Char('r') => self.dashboard.refresh(),
            _ => Ok(()),
        };

        if let Err(e) = result {
            log::debug!("{e}");
            self.error_message = Some(e.to_string());
        }
    }
}

pub fn run_tui<C: Clock>(
    dashboard: Dashboard<C>,
    disabled_components: DisabledComponents,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(dashboard, disabled_components);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<C: Clock>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<C>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

pub fn ui<C: Clock>(f: &mut Frame, app: &App<C>) {
    let disabled = &app.disabled_components;
    let mut sections = Vec::new();

    if !disabled.is_disabled(Component::TabBar) {
        sections.push((Component::TabBar, Constraint::Length(3)));
    }
    if !disabled.is_disabled(Component::Indices) {
        sections.push((Component::Indices, Constraint::Length(5)));
    }
    if !disabled.is_disabled(Component::Summary) || !disabled.is_disabled(Component::Sectors) {
        sections.push((Component::Summary, Constraint::Min(8)));
    }
    if !disabled.is_disabled(Component::News) {
        sections.push((Component::News, Constraint::Length(7)));
    }
    if !disabled.is_disabled(Component::Help) {
        sections.push((Component::Help, Constraint::Length(3)));
    }

    if sections.is_empty() {
        let placeholder = Paragraph::new("All dashboard components are disabled")
            .block(Block::default().borders(Borders::ALL).title("Market Snapshot"))
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        f.render_widget(placeholder, f.area());
        return;
    }

    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints(sections.iter().map(|(_, c)| *c).collect::<Vec<_>>())
        .split(f.area());

    for ((component, _), area) in sections.iter().zip(chunks.iter()) {
        match component {
            Component::TabBar => render_tab_bar(f, *area, app),
            Component::Indices => render_index_cards(f, *area, app),
            Component::Summary => render_middle(f, *area, app),
            Component::News => render_news(f, *area, app),
            Component::Help => render_help(f, *area, app),
            Component::Sectors => {}
        }
    }

    if let Some(error) = &app.error_message {
        render_error_popup(f, error);
    }
}

fn surface_text<C: Clock>(app: &App<C>, id: ElementId) -> (String, Option<Direction>) {
    app.dashboard
        .surface()
        .text(id)
        .map(|t| (t.text.clone(), t.class))
        .unwrap_or_default()
}

fn render_tab_bar<C: Clock>(f: &mut Frame, area: Rect, app: &App<C>) {
    let tabs_bar = app.dashboard.tabs();
    let tab_titles: Vec<Line> = tabs_bar
        .controls()
        .iter()
        .map(|control| {
            let style = if control.active {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(Span::styled(control.period.title(), style))
        })
        .collect();

    let (date_label, _) = surface_text(app, ElementId::DateLabel);

    let tabs = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("금융 시황 대시보드 - {date_label}")),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Yellow))
        .select(tabs_bar.active_index().unwrap_or(0));

    f.render_widget(tabs, area);
}

fn render_index_cards<C: Clock>(f: &mut Frame, area: Rect, app: &App<C>) {
    let keys = IndexKey::all();
    let card_areas = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints(vec![Constraint::Ratio(1, keys.len() as u32); keys.len()])
        .split(area);

    for (key, card_area) in keys.iter().zip(card_areas.iter()) {
        let (value, _) = surface_text(app, ElementId::CardValue(*key));
        let (change, direction) = surface_text(app, ElementId::CardChange(*key));

        let card = Paragraph::new(vec![
            Line::from(Span::styled(
                value,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                change,
                Style::default().fg(direction_color(direction)),
            )),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(key.display_name()),
        )
        .alignment(Alignment::Center);

        f.render_widget(card, *card_area);
    }
}

fn render_middle<C: Clock>(f: &mut Frame, area: Rect, app: &App<C>) {
    let disabled = &app.disabled_components;
    let show_summary = !disabled.is_disabled(Component::Summary);
    let show_sectors = !disabled.is_disabled(Component::Sectors);

    if show_summary && show_sectors {
        let halves = Layout::default()
            .direction(LayoutDirection::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        render_summary(f, halves[0], app);
        render_sectors(f, halves[1], app);
    } else if show_summary {
        render_summary(f, area, app);
    } else {
        render_sectors(f, area, app);
    }
}

fn render_summary<C: Clock>(f: &mut Frame, area: Rect, app: &App<C>) {
    let items: Vec<ListItem> = app
        .dashboard
        .surface()
        .children(ElementId::SummaryContent)
        .iter()
        .filter_map(|node| match node {
            Node::Summary { icon, text } => Some(ListItem::new(Line::from(vec![
                Span::raw(format!("{icon} ")),
                Span::styled(text.clone(), Style::default().fg(Color::White)),
            ]))),
            _ => None,
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("시황 요약"));
    f.render_widget(list, area);
}

fn render_sectors<C: Clock>(f: &mut Frame, area: Rect, app: &App<C>) {
    let rows: Vec<Row> = app
        .dashboard
        .surface()
        .children(ElementId::SectorGrid)
        .iter()
        .filter_map(|node| match node {
            Node::Sector {
                name,
                change,
                direction,
            } => Some(Row::new(vec![
                Cell::from(name.clone()),
                Cell::from(change.clone())
                    .style(Style::default().fg(direction_color(Some(*direction)))),
            ])),
            _ => None,
        })
        .collect();

    let table = Table::new(rows, [Constraint::Percentage(60), Constraint::Percentage(40)])
        .block(Block::default().borders(Borders::ALL).title("섹터별 등락"))
        .style(Style::default().fg(Color::White));
    f.render_widget(table, area);
}

fn render_news<C: Clock>(f: &mut Frame, area: Rect, app: &App<C>) {
    let items: Vec<ListItem> = app
        .dashboard
        .surface()
        .children(ElementId::NewsList)
        .iter()
        .filter_map(|node| match node {
            Node::News {
                title,
                tag,
                category,
            } => Some(ListItem::new(Line::from(vec![
                Span::styled(
                    format!("[{tag}] "),
                    Style::default()
                        .fg(tag_color(*category))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(title.clone()),
            ]))),
            _ => None,
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("주요 뉴스"));
    f.render_widget(list, area);
}

fn render_help<C: Clock>(f: &mut Frame, area: Rect, app: &App<C>) {
    let (last_update, _) = surface_text(app, ElementId::LastUpdate);
    let help_text = Paragraph::new(format!(
        "Last update: {last_update} | 1-3/d/w/m (period) | h/l (tabs) | r (refresh) | q (quit)"
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Help ({})", app.dashboard.current())),
    )
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center);

    f.render_widget(help_text, area);
}

fn render_error_popup(f: &mut Frame, error: &str) {
    let popup_area = centered_rect(60, 20, f.area());
    f.render_widget(Clear, popup_area);

    let error_paragraph = Paragraph::new(error)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(error_paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::FixedClock;
    use crate::market::MarketData;
    use crate::surface::{DisplaySurface, TabBar};
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use std::collections::BTreeMap;

    fn clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2025, 2, 7)
                .unwrap()
                .and_hms_opt(9, 5, 3)
                .unwrap(),
        )
    }

    fn app_with(data: MarketData, disabled: &[String]) -> App<FixedClock> {
        let dashboard = Dashboard::bootstrap(
            data,
            DisplaySurface::dashboard(),
            TabBar::new(),
            clock(),
            Period::Daily,
        )
        .unwrap();
        App::new(dashboard, DisabledComponents::new(disabled))
    }

    fn app() -> App<FixedClock> {
        app_with(MarketData::embedded().unwrap(), &[])
    }

    fn draw(app: &App<FixedClock>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(200, 40)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_component_from_str() {
        assert_eq!(Component::from_str("tab_bar"), Ok(Component::TabBar));
        assert_eq!(Component::from_str(" NEWS "), Ok(Component::News));
        assert!(Component::from_str("chart").is_err());
    }

    #[test]
    fn test_disabled_components_ignores_unknown() {
        let disabled =
            DisabledComponents::new(&["news".to_string(), "not_a_component".to_string()]);
        assert!(disabled.is_disabled(Component::News));
        assert!(!disabled.is_disabled(Component::Summary));
    }

    #[test]
    fn test_direction_colors() {
        assert_eq!(direction_color(Some(Direction::Up)), Color::Red);
        assert_eq!(direction_color(Some(Direction::Down)), Color::LightBlue);
        assert_eq!(direction_color(None), Color::White);
    }

    #[test]
    fn test_keys_select_periods() {
        let mut app = app();
        app.handle_key(KeyCode::Char('3'));
        assert_eq!(app.dashboard.current(), Period::Monthly);
        app.handle_key(KeyCode::Char('w'));
        assert_eq!(app.dashboard.current(), Period::Weekly);
        app.handle_key(KeyCode::Left);
        assert_eq!(app.dashboard.current(), Period::Daily);
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.dashboard.current(), Period::Weekly);
        app.handle_key(KeyCode::Char('r'));
        assert_eq!(app.dashboard.current(), Period::Weekly);
        assert!(!app.should_quit);

        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_lookup_error_shows_popup() {
        let embedded = MarketData::embedded().unwrap();
        let mut records = BTreeMap::new();
        records.insert(Period::Daily, embedded.record(Period::Daily).unwrap().clone());
        let mut app = app_with(MarketData::new(records), &[]);

        app.handle_key(KeyCode::Char('2'));
        assert!(app.error_message.is_some());
        assert!(draw(&app).contains("No market data for period 'weekly'"));

        app.handle_key(KeyCode::Char('x'));
        assert!(app.error_message.is_none());
    }

    #[test]
    fn test_draw_shows_rendered_surface() {
        let mut app = app();
        let screen = draw(&app);
        assert!(screen.contains("2,521.92"));
        assert!(screen.contains("+18.35 (+0.73%)"));
        assert!(screen.contains("-0.03%p"));
        assert!(screen.contains("09:05:03"));

        app.handle_key(KeyCode::Char('m'));
        let screen = draw(&app);
        assert!(screen.contains("-79.63 (-3.11%)"));
        assert!(!screen.contains("+18.35 (+0.73%)"));
    }

    #[test]
    fn test_help_title_follows_selected_period() {
        let mut app = app();
        assert!(draw(&app).contains("Help (daily)"));

        app.handle_key(KeyCode::Char('w'));
        let screen = draw(&app);
        assert!(screen.contains("Help (weekly)"));
        assert!(!screen.contains("Help (daily)"));
    }

    #[test]
    fn test_draw_respects_disabled_components() {
        let app = app_with(
            MarketData::embedded().unwrap(),
            &["indices".to_string(), "help".to_string()],
        );
        let screen = draw(&app);
        assert!(!screen.contains("2,521.92"));
        assert!(!screen.contains("Last update"));
    }
}
