use crate::error::Result;
use crate::formatter::{Clock, Formatter};
use crate::market::{IndexQuote, IndexKey, MarketData, Period, PeriodRecord};
use crate::surface::{DisplaySurface, ElementId, Node, TabBar};

/// Text shown under an index value, e.g. "+18.35 (+0.73%)" or "-0.03%p".
pub fn change_text(quote: &IndexQuote) -> String {
    if quote.percent.is_empty() {
        quote.change.clone()
    } else {
        format!("{} ({})", quote.change, quote.percent)
    }
}

fn summary_nodes(record: &PeriodRecord) -> Vec<Node> {
    record
        .summary_items
        .iter()
        .map(|item| Node::Summary {
            icon: item.icon.clone(),
            text: item.text.clone(),
        })
        .collect()
}

fn sector_nodes(record: &PeriodRecord) -> Vec<Node> {
    record
        .sectors
        .iter()
        .map(|sector| Node::Sector {
            name: sector.name.clone(),
            change: sector.change.clone(),
            direction: sector.direction,
        })
        .collect()
}

fn news_nodes(record: &PeriodRecord) -> Vec<Node> {
    record
        .news_items
        .iter()
        .map(|news| Node::News {
            title: news.title.clone(),
            tag: news.tag.clone(),
            category: news.tag_category,
        })
        .collect()
}

/// Writes one period's record onto a display surface.
pub struct Renderer<C: Clock> {
    data: MarketData,
    formatter: Formatter<C>,
}

impl<C: Clock> Renderer<C> {
    pub fn new(data: MarketData, clock: C) -> Self {
        Renderer {
            data,
            formatter: Formatter::new(clock),
        }
    }

    pub fn data(&self) -> &MarketData {
        &self.data
    }

    /// Renders `period` onto `surface`, replacing whatever was there.
    ///
    /// The record lookup and the surface check both happen before the first
    /// write, so a failed render leaves the surface untouched.
    pub fn render(&self, period: Period, surface: &mut DisplaySurface) -> Result<()> {
        let record = self.data.record(period)?;
        surface.check_required()?;

        surface.set_text(ElementId::DateLabel, &record.date_label)?;

        for key in IndexKey::all() {
            let quote = record.indices.get(*key);
            surface.set_text(ElementId::CardValue(*key), &quote.value)?;
            surface.set_text(ElementId::CardChange(*key), &change_text(quote))?;
            surface.set_class(ElementId::CardChange(*key), quote.direction)?;
        }

        surface.replace_children(ElementId::SummaryContent, summary_nodes(record))?;
        surface.replace_children(ElementId::SectorGrid, sector_nodes(record))?;
        surface.replace_children(ElementId::NewsList, news_nodes(record))?;

        surface.set_text(ElementId::LastUpdate, &self.formatter.now())?;

        log::debug!("Rendered {period} snapshot ({})", record.date_label);
        Ok(())
    }
}

/// Owns the currently selected period.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSelector {
    current: Period,
}

impl Default for PeriodSelector {
    fn default() -> Self {
        PeriodSelector {
            current: Period::Daily,
        }
    }
}

impl PeriodSelector {
    pub fn current(&self) -> Period {
        self.current
    }

    /// Activates the control, stores the selection and re-renders, even when
    /// `period` is already selected.
    pub fn select<C: Clock>(
        &mut self,
        period: Period,
        tabs: &mut TabBar,
        renderer: &Renderer<C>,
        surface: &mut DisplaySurface,
    ) -> Result<()> {
        tabs.activate(period);
        self.current = period;
        log::info!("Selected {period} period");
        renderer.render(self.current, surface)
    }
}

/// A wired dashboard: surfaces, selection state and renderer.
pub struct Dashboard<C: Clock> {
    renderer: Renderer<C>,
    selector: PeriodSelector,
    surface: DisplaySurface,
    tabs: TabBar,
}

impl<C: Clock> Dashboard<C> {
    /// Validates both surfaces, wires the period controls and renders
    /// `default_period` once.
    ///
    /// The surfaces are moved into the dashboard, so the same controls can't
    /// be wired twice.
    pub fn bootstrap(
        data: MarketData,
        surface: DisplaySurface,
        mut tabs: TabBar,
        clock: C,
        default_period: Period,
    ) -> Result<Self> {
        surface.check_required()?;
        tabs.check_controls()?;

        let renderer = Renderer::new(data, clock);
        let selector = PeriodSelector {
            current: default_period,
        };
        tabs.activate(default_period);

        let mut dashboard = Dashboard {
            renderer,
            selector,
            surface,
            tabs,
        };
        dashboard
            .renderer
            .render(default_period, &mut dashboard.surface)?;

        log::info!("Dashboard ready, showing {default_period}");
        Ok(dashboard)
    }

    pub fn select(&mut self, period: Period) -> Result<()> {
        self.selector
            .select(period, &mut self.tabs, &self.renderer, &mut self.surface)
    }

    /// Re-selects the current period, refreshing the last-updated label.
    pub fn refresh(&mut self) -> Result<()> {
        self.select(self.selector.current())
    }

    pub fn next(&mut self) -> Result<()> {
        let periods = Period::all();
        let index = periods
            .iter()
            .position(|&p| p == self.selector.current())
            .unwrap_or(0);
        self.select(periods[(index + 1) % periods.len()])
    }

    pub fn previous(&mut self) -> Result<()> {
        let periods = Period::all();
        let index = periods
            .iter()
            .position(|&p| p == self.selector.current())
            .unwrap_or(0);
        self.select(periods[(index + periods.len() - 1) % periods.len()])
    }

    pub fn current(&self) -> Period {
        self.selector.current()
    }

    pub fn surface(&self) -> &DisplaySurface {
        &self.surface
    }

    pub fn tabs(&self) -> &TabBar {
        &self.tabs
    }

    pub fn data(&self) -> &MarketData {
        self.renderer.data()
    }
}
