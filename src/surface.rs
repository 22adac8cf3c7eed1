//! Display and input surfaces the dashboard writes into and reads from.
//!
//! A `DisplaySurface` is a registry of addressable elements, much like the
//! elements of a page. The renderer only ever writes structured nodes into
//! it, and the terminal view only ever reads from it.

use crate::error::{DashboardError, Result};
use crate::market::{Direction, IndexKey, Period, TagCategory};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    DateLabel,
    LastUpdate,
    CardValue(IndexKey),
    CardChange(IndexKey),
    SummaryContent,
    SectorGrid,
    NewsList,
}

impl ElementId {
    /// Every element the renderer needs to find before the first render
    pub fn required() -> Vec<ElementId> {
        let mut ids = vec![ElementId::DateLabel, ElementId::LastUpdate];
        for key in IndexKey::all() {
            ids.push(ElementId::CardValue(*key));
            ids.push(ElementId::CardChange(*key));
        }
        ids.extend([
            ElementId::SummaryContent,
            ElementId::SectorGrid,
            ElementId::NewsList,
        ]);
        ids
    }

    fn is_container(self) -> bool {
        matches!(
            self,
            ElementId::SummaryContent | ElementId::SectorGrid | ElementId::NewsList
        )
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::DateLabel => write!(f, "currentDate"),
            ElementId::LastUpdate => write!(f, "lastUpdate"),
            ElementId::CardValue(key) => write!(f, "{key}-value"),
            ElementId::CardChange(key) => write!(f, "{key}-change"),
            ElementId::SummaryContent => write!(f, "summaryContent"),
            ElementId::SectorGrid => write!(f, "sectorGrid"),
            ElementId::NewsList => write!(f, "newsList"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextElement {
    pub text: String,
    pub class: Option<Direction>,
}

/// One display node inside a container element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Summary {
        icon: String,
        text: String,
    },
    Sector {
        name: String,
        change: String,
        direction: Direction,
    },
    News {
        title: String,
        tag: String,
        category: TagCategory,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(TextElement),
    Container(Vec<Node>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplaySurface {
    elements: HashMap<ElementId, Element>,
}

impl DisplaySurface {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A surface carrying every required element, all blank.
    pub fn dashboard() -> Self {
        let mut surface = Self::empty();
        for id in ElementId::required() {
            let element = if id.is_container() {
                Element::Container(Vec::new())
            } else {
                Element::Text(TextElement::default())
            };
            surface.insert(id, element);
        }
        surface
    }

    pub fn insert(&mut self, id: ElementId, element: Element) {
        self.elements.insert(id, element);
    }

    #[cfg(test)]
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        self.elements.remove(&id)
    }

    pub fn check_required(&self) -> Result<()> {
        for id in ElementId::required() {
            match (self.elements.get(&id), id.is_container()) {
                (None, _) => {
                    return Err(DashboardError::Setup(format!(
                        "missing display element '{id}'"
                    )))
                }
                (Some(Element::Text(_)), true) | (Some(Element::Container(_)), false) => {
                    return Err(DashboardError::Setup(format!(
                        "display element '{id}' has the wrong kind"
                    )))
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn text(&self, id: ElementId) -> Option<&TextElement> {
        match self.elements.get(&id) {
            Some(Element::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn children(&self, id: ElementId) -> &[Node] {
        match self.elements.get(&id) {
            Some(Element::Container(nodes)) => nodes,
            _ => &[],
        }
    }

    fn text_mut(&mut self, id: ElementId) -> Result<&mut TextElement> {
        match self.elements.get_mut(&id) {
            Some(Element::Text(text)) => Ok(text),
            _ => Err(DashboardError::Setup(format!(
                "missing display element '{id}'"
            ))),
        }
    }

    pub fn set_text(&mut self, id: ElementId, text: &str) -> Result<()> {
        let element = self.text_mut(id)?;
        element.text = text.to_string();
        Ok(())
    }

    pub fn set_class(&mut self, id: ElementId, class: Direction) -> Result<()> {
        self.text_mut(id)?.class = Some(class);
        Ok(())
    }

    /// Replaces the whole content of a container, never appends.
    pub fn replace_children(&mut self, id: ElementId, nodes: Vec<Node>) -> Result<()> {
        match self.elements.get_mut(&id) {
            Some(Element::Container(children)) => {
                *children = nodes;
                Ok(())
            }
            _ => Err(DashboardError::Setup(format!(
                "missing display element '{id}'"
            ))),
        }
    }
}

/// A selectable period control.
#[derive(Debug, Clone, PartialEq)]
pub struct TabControl {
    pub period: Period,
    pub active: bool,
}

/// The input surface: one control per period.
#[derive(Debug, Clone, PartialEq)]
pub struct TabBar {
    controls: Vec<TabControl>,
}

impl Default for TabBar {
    fn default() -> Self {
        Self::new()
    }
}

impl TabBar {
    /// One control per period, in display order, none active yet.
    pub fn new() -> Self {
        Self::with_controls(Period::all())
    }

    pub fn with_controls(periods: &[Period]) -> Self {
        TabBar {
            controls: periods
                .iter()
                .map(|&period| TabControl {
                    period,
                    active: false,
                })
                .collect(),
        }
    }

    pub fn controls(&self) -> &[TabControl] {
        &self.controls
    }

    pub fn check_controls(&self) -> Result<()> {
        if self.controls.len() != Period::all().len() {
            return Err(DashboardError::Setup(format!(
                "expected {} period controls, found {}",
                Period::all().len(),
                self.controls.len()
            )));
        }
        for period in Period::all() {
            if !self.controls.iter().any(|c| c.period == *period) {
                return Err(DashboardError::Setup(format!(
                    "missing period control '{period}'"
                )));
            }
        }
        Ok(())
    }

    /// Marks the control for `period` active and every other one inactive.
    pub fn activate(&mut self, period: Period) {
        for control in &mut self.controls {
            control.active = control.period == period;
        }
    }

    #[cfg(test)]
    pub fn active(&self) -> Option<Period> {
        self.controls.iter().find(|c| c.active).map(|c| c.period)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.controls.iter().position(|c| c.active)
    }
}
