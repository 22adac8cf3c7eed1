use crate::error::Result;
use crate::market::{Direction, IndexKey, MarketData, Period, TagCategory};
use crate::surface::{DisplaySurface, ElementId, Node};
use colored::Colorize;
use comfy_table::{
    presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color as TColor, ContentArrangement, Table,
};

fn direction_color(direction: Option<Direction>) -> TColor {
    match direction {
        Some(Direction::Up) => TColor::Red,
        Some(Direction::Down) => TColor::Blue,
        None => TColor::White,
    }
}

fn tag_color(category: TagCategory) -> TColor {
    match category {
        TagCategory::Stock => TColor::Magenta,
        TagCategory::Forex => TColor::Green,
        TagCategory::Economy => TColor::Yellow,
        TagCategory::Crypto => TColor::Cyan,
        TagCategory::Bond => TColor::DarkRed,
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    table
}

pub fn index_table(surface: &DisplaySurface) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("지수").add_attribute(Attribute::Bold),
        Cell::new("현재가").add_attribute(Attribute::Bold),
        Cell::new("등락").add_attribute(Attribute::Bold),
    ]);

    for key in IndexKey::all() {
        let value = surface
            .text(ElementId::CardValue(*key))
            .map(|t| t.text.as_str())
            .unwrap_or("-");
        let change = surface.text(ElementId::CardChange(*key));
        let (change_text, direction) = change
            .map(|t| (t.text.as_str(), t.class))
            .unwrap_or(("-", None));

        table.add_row(vec![
            Cell::new(key.display_name()),
            Cell::new(value).set_alignment(CellAlignment::Right),
            Cell::new(change_text)
                .set_alignment(CellAlignment::Right)
                .fg(direction_color(direction)),
        ]);
    }
    table
}

pub fn sector_table(surface: &DisplaySurface) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("섹터").add_attribute(Attribute::Bold),
        Cell::new("등락률").add_attribute(Attribute::Bold),
    ]);

    for node in surface.children(ElementId::SectorGrid) {
        if let Node::Sector {
            name,
            change,
            direction,
        } = node
        {
            table.add_row(vec![
                Cell::new(name),
                Cell::new(change)
                    .set_alignment(CellAlignment::Right)
                    .fg(direction_color(Some(*direction))),
            ]);
        }
    }
    table
}

pub fn news_table(surface: &DisplaySurface) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("분류").add_attribute(Attribute::Bold),
        Cell::new("주요 뉴스").add_attribute(Attribute::Bold),
    ]);

    for node in surface.children(ElementId::NewsList) {
        if let Node::News {
            title,
            tag,
            category,
        } = node
        {
            table.add_row(vec![Cell::new(tag).fg(tag_color(*category)), Cell::new(title)]);
        }
    }
    table
}

pub fn summary_lines(surface: &DisplaySurface) -> Vec<String> {
    surface
        .children(ElementId::SummaryContent)
        .iter()
        .filter_map(|node| match node {
            Node::Summary { icon, text } => Some(format!("{icon} {text}")),
            _ => None,
        })
        .collect()
}

/// Prints a rendered surface to stdout.
pub fn print_snapshot(surface: &DisplaySurface) {
    let date = surface
        .text(ElementId::DateLabel)
        .map(|t| t.text.as_str())
        .unwrap_or_default();
    let last_update = surface
        .text(ElementId::LastUpdate)
        .map(|t| t.text.as_str())
        .unwrap_or_default();

    println!("{} {}", "금융 시황".bold(), date.bold().yellow());
    println!("{}", index_table(surface));

    println!("{}", "시황 요약".bold());
    for line in summary_lines(surface) {
        println!("  {line}");
    }

    println!("{}", sector_table(surface));
    println!("{}", news_table(surface));
    println!("{} {}", "마지막 업데이트:".dimmed(), last_update.dimmed());
}

pub fn export_json(data: &MarketData, period: Period) -> Result<String> {
    let record = data.record(period)?;
    Ok(serde_json::to_string_pretty(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Renderer;
    use crate::error::DashboardError;
    use crate::formatter::FixedClock;
    use crate::market::PeriodRecord;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn rendered(period: Period) -> DisplaySurface {
        let clock = FixedClock(
            NaiveDate::from_ymd_opt(2025, 2, 7)
                .unwrap()
                .and_hms_opt(15, 30, 0)
                .unwrap(),
        );
        let renderer = Renderer::new(MarketData::embedded().unwrap(), clock);
        let mut surface = DisplaySurface::dashboard();
        renderer.render(period, &mut surface).unwrap();
        surface
    }

    #[test]
    fn test_index_table_has_six_rows() {
        let table = index_table(&rendered(Period::Daily));
        assert_eq!(table.row_iter().count(), 6);
        let output = table.to_string();
        assert!(output.contains("+18.35 (+0.73%)"));
        assert!(output.contains("-0.03%p"));
    }

    #[test]
    fn test_sector_and_news_tables() {
        let surface = rendered(Period::Weekly);
        assert_eq!(sector_table(&surface).row_iter().count(), 8);
        assert_eq!(news_table(&surface).row_iter().count(), 5);
    }

    #[test]
    fn test_summary_lines_keep_order() {
        let lines = summary_lines(&rendered(Period::Monthly));
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("📉 코스피 월간"));
        assert!(lines[4].starts_with("📊 글로벌 시장"));
    }

    #[test]
    fn test_export_json() {
        let data = MarketData::embedded().unwrap();
        let json = export_json(&data, Period::Daily).unwrap();
        let parsed: PeriodRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, data.record(Period::Daily).unwrap());

        let empty = MarketData::new(BTreeMap::new());
        assert!(matches!(
            export_json(&empty, Period::Daily),
            Err(DashboardError::Lookup(Period::Daily))
        ));
    }
}
