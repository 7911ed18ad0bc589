//! Pure dashboard aggregation: per-shape statistics and category breakdowns.

use serde::Serialize;

use crate::domain::shape::{Category, Shape};

/// Aggregate statistics for one shape, as read from the primary store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStat {
    pub shape: Shape,
    pub category: Category,
    pub count: u64,
    pub avg_result: f64,
    pub min_result: f64,
    pub max_result: f64,
}

/// One shape's share of its category group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShapeShare {
    pub shape: Shape,
    pub count: u64,
    /// Percentage of the category total, rounded to one decimal place.
    pub percent: f64,
}

/// Per-category shares for all six shapes. Shapes with no submissions are
/// present with a zero count so the dashboard always renders a full table.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub area: Vec<ShapeShare>,
    pub volume: Vec<ShapeShare>,
}

/// Sort column for the recent-records table. Anything outside this
/// allow-list falls back to the timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecentSort {
    Name,
    School,
    Age,
    #[default]
    Timestamp,
}

impl RecentSort {
    /// Parse a query-string value, defaulting to timestamp.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("name") => RecentSort::Name,
            Some("school") => RecentSort::School,
            Some("age") => RecentSort::Age,
            _ => RecentSort::Timestamp,
        }
    }

    /// The backing column name. Values are fixed strings, never user input.
    pub fn column(self) -> &'static str {
        match self {
            RecentSort::Name => "name",
            RecentSort::School => "school",
            RecentSort::Age => "age",
            RecentSort::Timestamp => "timestamp",
        }
    }
}

/// Sort direction for the recent-records table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse a query-string value; anything other than `asc` sorts descending.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

fn shares_for(category: Category, stats: &[ShapeStat]) -> Vec<ShapeShare> {
    let shapes: Vec<Shape> = Shape::ALL
        .into_iter()
        .filter(|shape| shape.category() == category)
        .collect();
    let count_of = |shape: Shape| -> u64 {
        stats
            .iter()
            .filter(|stat| stat.shape == shape)
            .map(|stat| stat.count)
            .sum()
    };
    let group_total: u64 = shapes.iter().map(|&shape| count_of(shape)).sum();

    shapes
        .into_iter()
        .map(|shape| {
            let count = count_of(shape);
            let percent = if group_total == 0 {
                0.0
            } else {
                let raw = count as f64 / group_total as f64 * 100.0;
                (raw * 10.0).round() / 10.0
            };
            ShapeShare {
                shape,
                count,
                percent,
            }
        })
        .collect()
}

/// Group per-shape counts into the area and volume categories with each
/// shape's percentage of its group total.
pub fn category_breakdown(stats: &[ShapeStat]) -> CategoryBreakdown {
    CategoryBreakdown {
        area: shares_for(Category::Area, stats),
        volume: shares_for(Category::Volume, stats),
    }
}
