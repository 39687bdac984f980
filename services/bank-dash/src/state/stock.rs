// services/bank-dash/src/state/stock.rs
//
// Stock view: per-group aggregate cards plus a sortable, filterable
// detail table over the last fetched snapshot.
//

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use svckit::types::{BloodBank, BloodGroup, StockItem};
use svckit::{BankError, BankResult, StockQuery};
use tracing::warn;

use crate::format::{or_na, record_id, stock_status_badge, units};
use crate::table::{Cell, TableView};
use crate::toast::Toasts;

/// Sortable columns of the stock table, in header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockColumn {
    StockId,
    BankName,
    Location,
    BloodGroup,
    QuantityUnits,
    Status,
    BankId,
}

impl StockColumn {
    /// Columns shown as table headers, left to right.
    pub const HEADERS: [StockColumn; 6] = [
        StockColumn::StockId,
        StockColumn::BankName,
        StockColumn::Location,
        StockColumn::BloodGroup,
        StockColumn::QuantityUnits,
        StockColumn::Status,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StockColumn::StockId => "stock_id",
            StockColumn::BankName => "bank_name",
            StockColumn::Location => "location",
            StockColumn::BloodGroup => "blood_group",
            StockColumn::QuantityUnits => "quantity_units",
            StockColumn::Status => "status",
            StockColumn::BankId => "bank_id",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StockColumn::StockId => "Stock ID",
            StockColumn::BankName => "Blood Bank",
            StockColumn::Location => "Location",
            StockColumn::BloodGroup => "Blood Group",
            StockColumn::QuantityUnits => "Quantity",
            StockColumn::Status => "Status",
            StockColumn::BankId => "Bank ID",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            StockColumn::QuantityUnits | StockColumn::StockId | StockColumn::BankId
        )
    }

    fn sort_key(&self, item: &StockItem) -> SortKey {
        match self {
            StockColumn::StockId => SortKey::Number(item.stock_id as f64),
            StockColumn::BankId => SortKey::Number(item.bank_id as f64),
            StockColumn::QuantityUnits => SortKey::Number(item.quantity_units as f64),
            StockColumn::BankName => SortKey::text(Some(&item.bank_name)),
            StockColumn::Location => SortKey::text(item.location.as_deref()),
            StockColumn::BloodGroup => SortKey::text(Some(item.blood_group.as_str())),
            StockColumn::Status => SortKey::text(item.status.map(|s| s.as_str())),
        }
    }
}

impl FromStr for StockColumn {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StockColumn::HEADERS
            .iter()
            .chain(std::iter::once(&StockColumn::BankId))
            .copied()
            .find(|c| c.key() == s)
            .ok_or_else(|| BankError::validation(format!("Unknown stock column '{}'", s)))
    }
}

impl fmt::Display for StockColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    fn text(value: Option<&str>) -> Self {
        SortKey::Text(value.unwrap_or_default().to_lowercase())
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // a column never mixes key kinds
            _ => Ordering::Equal,
        }
    }
}

/// Returns a sorted copy; `items` is left untouched. The sort is stable, so
/// equal keys keep their relative order in both directions.
pub fn sort_table(items: &[StockItem], column: StockColumn, order: SortOrder) -> Vec<StockItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| {
        let ord = column.sort_key(a).compare(&column.sort_key(b));
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    sorted
}

/// Health of a blood group's summed inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    OutOfStock,
    Critical,
    Low,
    Good,
}

impl StockLevel {
    pub fn classify(units: u64) -> Self {
        match units {
            0 => StockLevel::OutOfStock,
            1..=9 => StockLevel::Critical,
            10..=29 => StockLevel::Low,
            _ => StockLevel::Good,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockLevel::OutOfStock => "Out of Stock",
            StockLevel::Critical => "Critical",
            StockLevel::Low => "Low",
            StockLevel::Good => "Good Stock",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            StockLevel::OutOfStock => "❌",
            StockLevel::Critical => "⚠",
            StockLevel::Low => "⚡",
            StockLevel::Good => "✓",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupCard {
    pub blood_group: BloodGroup,
    pub units: u64,
    pub level: StockLevel,
}

impl GroupCard {
    pub fn units_label(&self) -> String {
        format!("{} Units", self.units)
    }
}

/// Sums every entry of each canonical group regardless of its status.
pub fn aggregate(items: &[StockItem]) -> Vec<GroupCard> {
    BloodGroup::ALL
        .iter()
        .map(|group| {
            let units = items
                .iter()
                .filter(|s| s.blood_group == *group)
                .map(|s| s.quantity_units as u64)
                .sum();
            GroupCard {
                blood_group: *group,
                units,
                level: StockLevel::classify(units),
            }
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct StockView {
    stock: Vec<StockItem>,
    sort: Option<(StockColumn, SortOrder)>,
    filter: StockQuery,
    error: Option<String>,
    loaded: bool,
    /// Header the cursor rests on; clicking applies to it.
    cursor: usize,
}

impl StockView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stock(&self) -> &[StockItem] {
        &self.stock
    }

    pub fn filter(&self) -> StockQuery {
        self.filter
    }

    pub fn sort(&self) -> Option<(StockColumn, SortOrder)> {
        self.sort
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replaces the snapshot with a fetch response. A failed fetch keeps the
    /// previous snapshot and flags the view instead.
    pub fn apply_stock(&mut self, result: BankResult<Vec<StockItem>>, toasts: &mut Toasts) {
        match result {
            Ok(items) => {
                self.stock = items;
                self.error = None;
                self.loaded = true;
            }
            Err(e) => {
                warn!("Error loading stock: {}", e);
                self.error = Some("Error loading stock data".to_string());
                toasts.error("Error loading stock data");
            }
        }
    }

    /// Header click: the same column twice flips the order, a new column
    /// starts ascending.
    pub fn click_header(&mut self, column: StockColumn) {
        self.sort = match self.sort {
            Some((current, order)) if current == column => Some((column, order.toggled())),
            _ => Some((column, SortOrder::Asc)),
        };
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    pub fn indicator(&self, column: StockColumn) -> &'static str {
        match self.sort {
            Some((active, SortOrder::Asc)) if active == column => "↑",
            Some((active, SortOrder::Desc)) if active == column => "↓",
            _ => "↕",
        }
    }

    pub fn cursor(&self) -> StockColumn {
        StockColumn::HEADERS[self.cursor]
    }

    pub fn move_cursor(&mut self, forward: bool) {
        let len = StockColumn::HEADERS.len();
        self.cursor = if forward {
            (self.cursor + 1) % len
        } else {
            (self.cursor + len - 1) % len
        };
    }

    pub fn click_cursor(&mut self) {
        self.click_header(self.cursor());
    }

    /// The rows in display order: the snapshot, sorted by the active column if any.
    pub fn displayed(&self) -> Vec<StockItem> {
        match self.sort {
            Some((column, order)) => sort_table(&self.stock, column, order),
            None => self.stock.clone(),
        }
    }

    pub fn aggregate(&self) -> Vec<GroupCard> {
        aggregate(&self.stock)
    }

    /// Sets the blood-group predicate and returns the query to send.
    pub fn set_blood_group(&mut self, group: Option<BloodGroup>) -> StockQuery {
        self.filter.blood_group = group;
        self.filter
    }

    pub fn set_bank(&mut self, bank_id: Option<u64>) -> StockQuery {
        self.filter.bank_id = bank_id;
        self.filter
    }

    pub fn cycle_blood_group(&mut self) -> StockQuery {
        let next = super::cycle_option(&BloodGroup::ALL, self.filter.blood_group);
        self.set_blood_group(next)
    }

    pub fn cycle_bank(&mut self, banks: &[BloodBank]) -> StockQuery {
        let ids: Vec<u64> = banks.iter().map(|b| b.bank_id).collect();
        let next = super::cycle_option(&ids, self.filter.bank_id);
        self.set_bank(next)
    }

    pub fn clear_filter(&mut self) -> StockQuery {
        self.filter = StockQuery::default();
        self.filter
    }

    pub fn headers(&self) -> Vec<String> {
        StockColumn::HEADERS
            .iter()
            .map(|c| format!("{} {}", c.title(), self.indicator(*c)))
            .collect()
    }

    pub fn table(&self) -> TableView {
        let mut view = render_stock(&self.displayed());
        view.headers = self.headers();
        view
    }
}

pub fn render_stock(items: &[StockItem]) -> TableView {
    let headers: Vec<&str> = StockColumn::HEADERS.iter().map(|c| c.title()).collect();
    TableView::from_records(&headers, items, ("📦", "No stock records found"), |item| {
        vec![
            Cell::plain(record_id(item.stock_id)),
            Cell::strong(item.bank_name.clone()),
            Cell::plain(or_na(item.location.as_deref())),
            Cell::Group(item.blood_group),
            Cell::strong(units(item.quantity_units)),
            Cell::Badge(stock_status_badge(item.status)),
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Badge, Tone};
    use serde_json::json;
    use svckit::types::StockStatus;

    fn item(id: u64, bank: &str, group: BloodGroup, units: u32, status: Option<StockStatus>) -> StockItem {
        StockItem {
            stock_id: id,
            bank_id: id % 3,
            bank_name: bank.to_string(),
            location: None,
            blood_group: group,
            quantity_units: units,
            status,
        }
    }

    fn sample() -> Vec<StockItem> {
        vec![
            item(1, "city", BloodGroup::OPos, 12, None),
            item(2, "North", BloodGroup::ANeg, 3, Some(StockStatus::Low)),
            item(3, "City", BloodGroup::OPos, 20, Some(StockStatus::Available)),
            item(4, "east", BloodGroup::AbPos, 0, Some(StockStatus::OutOfStock)),
            item(5, "North", BloodGroup::BNeg, 12, None),
        ]
    }

    fn ids(items: &[StockItem]) -> Vec<u64> {
        items.iter().map(|s| s.stock_id).collect()
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(StockLevel::classify(0), StockLevel::OutOfStock);
        assert_eq!(StockLevel::classify(1), StockLevel::Critical);
        assert_eq!(StockLevel::classify(9), StockLevel::Critical);
        assert_eq!(StockLevel::classify(10), StockLevel::Low);
        assert_eq!(StockLevel::classify(29), StockLevel::Low);
        assert_eq!(StockLevel::classify(30), StockLevel::Good);
        assert_eq!(StockLevel::classify(10_000).label(), "Good Stock");
    }

    #[test]
    fn test_aggregate_covers_all_groups_and_conserves_units() {
        let items = sample();
        let cards = aggregate(&items);

        let groups: Vec<_> = cards.iter().map(|c| c.blood_group).collect();
        assert_eq!(groups, BloodGroup::ALL.to_vec());

        let total: u64 = cards.iter().map(|c| c.units).sum();
        let expected: u64 = items.iter().map(|s| s.quantity_units as u64).sum();
        assert_eq!(total, expected);

        let o_pos = cards.iter().find(|c| c.blood_group == BloodGroup::OPos).unwrap();
        assert_eq!(o_pos.units, 32);
        assert_eq!(o_pos.level, StockLevel::Good);

        let ab_pos = cards.iter().find(|c| c.blood_group == BloodGroup::AbPos).unwrap();
        assert_eq!(ab_pos.level, StockLevel::OutOfStock);
    }

    #[test]
    fn test_numeric_sort_treats_missing_as_zero() {
        let items: Vec<StockItem> = serde_json::from_value(json!([
            {"stock_id": 1, "blood_group": "A+", "quantity_units": "5"},
            {"stock_id": 2, "blood_group": "A+", "quantity_units": null},
            {"stock_id": 3, "blood_group": "A+", "quantity_units": 10},
        ]))
        .unwrap();

        let sorted = sort_table(&items, StockColumn::QuantityUnits, SortOrder::Asc);
        assert_eq!(ids(&sorted), vec![2, 1, 3]);
        // the cache order is untouched
        assert_eq!(ids(&items), vec![1, 2, 3]);
    }

    #[test]
    fn test_text_sort_is_case_insensitive_and_stable() {
        let items = sample();
        let asc = sort_table(&items, StockColumn::BankName, SortOrder::Asc);
        assert_eq!(ids(&asc), vec![1, 3, 4, 2, 5]);

        let desc = sort_table(&items, StockColumn::BankName, SortOrder::Desc);
        assert_eq!(ids(&desc), vec![2, 5, 4, 1, 3]);

        // same column, same order twice gives the same sequence
        assert_eq!(ids(&sort_table(&asc, StockColumn::BankName, SortOrder::Asc)), ids(&asc));
    }

    #[test]
    fn test_toggle_reverses_strict_order() {
        let items = sample();
        let asc = sort_table(&items, StockColumn::StockId, SortOrder::Asc);
        let mut desc = sort_table(&items, StockColumn::StockId, SortOrder::Desc);
        desc.reverse();
        assert_eq!(ids(&asc), ids(&desc));
    }

    #[test]
    fn test_missing_location_sorts_first() {
        let mut items = sample();
        items[2].location = Some("Andheri".to_string());
        let sorted = sort_table(&items, StockColumn::Location, SortOrder::Asc);
        assert_eq!(sorted.last().unwrap().stock_id, 3);
    }

    #[test]
    fn test_header_clicks_toggle_and_reset() {
        let mut view = StockView::new();
        view.click_header(StockColumn::QuantityUnits);
        assert_eq!(view.sort(), Some((StockColumn::QuantityUnits, SortOrder::Asc)));
        view.click_header(StockColumn::QuantityUnits);
        assert_eq!(view.sort(), Some((StockColumn::QuantityUnits, SortOrder::Desc)));
        view.click_header(StockColumn::BankName);
        assert_eq!(view.sort(), Some((StockColumn::BankName, SortOrder::Asc)));

        assert_eq!(view.indicator(StockColumn::BankName), "↑");
        assert_eq!(view.indicator(StockColumn::QuantityUnits), "↕");
    }

    #[test]
    fn test_column_keys_round_trip() {
        assert_eq!("quantity_units".parse::<StockColumn>().unwrap(), StockColumn::QuantityUnits);
        assert_eq!("bank_id".parse::<StockColumn>().unwrap(), StockColumn::BankId);
        assert!("colour".parse::<StockColumn>().is_err());
    }

    #[test]
    fn test_failed_reload_keeps_snapshot() {
        let mut view = StockView::new();
        let mut toasts = Toasts::default();
        view.apply_stock(Ok(sample()), &mut toasts);
        assert!(toasts.is_empty());

        view.apply_stock(Err(BankError::Network("refused".to_string())), &mut toasts);
        assert_eq!(view.stock().len(), 5);
        assert_eq!(view.error(), Some("Error loading stock data"));
        assert_eq!(toasts.latest().unwrap().message, "Error loading stock data");

        view.apply_stock(Ok(vec![]), &mut toasts);
        assert_eq!(view.error(), None);
        assert_eq!(view.table().rows.len(), 1);
    }

    #[test]
    fn test_filter_result_replaces_snapshot_and_keeps_sort() {
        let mut view = StockView::new();
        let mut toasts = Toasts::default();
        view.apply_stock(Ok(sample()), &mut toasts);
        view.click_header(StockColumn::QuantityUnits);
        view.click_header(StockColumn::QuantityUnits);

        let query = view.set_blood_group(Some(BloodGroup::OPos));
        assert_eq!(query.blood_group, Some(BloodGroup::OPos));
        let filtered: Vec<_> = sample()
            .into_iter()
            .filter(|s| s.blood_group == BloodGroup::OPos)
            .collect();
        view.apply_stock(Ok(filtered), &mut toasts);

        assert_eq!(ids(&view.displayed()), vec![3, 1]);
        let cards = view.aggregate();
        assert_eq!(cards.iter().map(|c| c.units).sum::<u64>(), 32);
    }

    #[test]
    fn test_single_record_end_to_end() {
        let items: Vec<StockItem> = serde_json::from_value(json!([
            {"stock_id": 1, "bank_id": 2, "bank_name": "City", "location": "X",
             "blood_group": "O+", "quantity_units": 5, "status": null}
        ]))
        .unwrap();
        let mut view = StockView::new();
        view.apply_stock(Ok(items), &mut Toasts::default());

        for card in view.aggregate() {
            if card.blood_group == BloodGroup::OPos {
                assert_eq!(card.units_label(), "5 Units");
                assert_eq!(card.level.label(), "Critical");
            } else {
                assert_eq!(card.units_label(), "0 Units");
                assert_eq!(card.level.label(), "Out of Stock");
            }
        }

        let table = view.table();
        assert_eq!(table.record_count(), 1);
        assert_eq!(table.column(0), vec!["#1"]);
        assert_eq!(table.column(2), vec!["X"]);
        assert_eq!(table.column(4), vec!["5 units"]);
        match &table.rows[0] {
            crate::table::TableRow::Record(cells) => {
                assert_eq!(cells[5], Cell::Badge(Badge::new("Available", Tone::Info)));
            }
            other => panic!("unexpected row {:?}", other),
        }
    }

    #[test]
    fn test_cycle_filters() {
        let mut view = StockView::new();
        assert_eq!(view.cycle_blood_group().blood_group, Some(BloodGroup::APos));
        assert_eq!(view.cycle_blood_group().blood_group, Some(BloodGroup::ANeg));

        let banks = vec![
            BloodBank { bank_id: 4, bank_name: "City".to_string(), location: None },
            BloodBank { bank_id: 9, bank_name: "North".to_string(), location: None },
        ];
        assert_eq!(view.cycle_bank(&banks).bank_id, Some(4));
        assert_eq!(view.cycle_bank(&banks).bank_id, Some(9));
        assert_eq!(view.cycle_bank(&banks).bank_id, None);

        assert!(view.clear_filter().is_empty());
    }
}
