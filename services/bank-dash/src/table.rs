// services/bank-dash/src/table.rs
//
// Row models produced by the list renderers and drawn by the UI
//

use svckit::types::BloodGroup;

use crate::format::Badge;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Plain(String),
    Strong(String),
    Group(BloodGroup),
    Badge(Badge),
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Cell::Plain(text.into())
    }

    pub fn strong(text: impl Into<String>) -> Self {
        Cell::Strong(text.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Cell::Plain(s) | Cell::Strong(s) => s,
            Cell::Group(g) => g.as_str(),
            Cell::Badge(b) => &b.label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableRow {
    Record(Vec<Cell>),
    Placeholder { icon: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl TableView {
    /// One row per record in input order, or exactly one placeholder row
    /// when there is nothing to show.
    pub fn from_records<T>(
        headers: &[&str],
        records: &[T],
        empty: (&'static str, &str),
        render: impl Fn(&T) -> Vec<Cell>,
    ) -> Self {
        let rows = if records.is_empty() {
            vec![TableRow::Placeholder {
                icon: empty.0,
                message: empty.1.to_string(),
            }]
        } else {
            records.iter().map(|r| TableRow::Record(render(r))).collect()
        };

        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    pub fn placeholder(headers: &[&str], icon: &'static str, message: &str) -> Self {
        Self::from_records::<()>(headers, &[], (icon, message), |_| Vec::new())
    }

    pub fn record_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r, TableRow::Record(_)))
            .count()
    }

    pub fn placeholder_message(&self) -> Option<&str> {
        self.rows.iter().find_map(|r| match r {
            TableRow::Placeholder { message, .. } => Some(message.as_str()),
            TableRow::Record(_) => None,
        })
    }

    /// Text of one column across all record rows.
    pub fn column(&self, index: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|r| match r {
                TableRow::Record(cells) => cells.get(index).map(Cell::text),
                TableRow::Placeholder { .. } => None,
            })
            .collect()
    }
}
