//! Document collection names and query ordering.

use serde::{Deserialize, Serialize};

/// A named, owner-scoped document collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Workouts,
    /// Children of workouts; written through the workout repository only
    Exercises,
    Routines,
    BodyMetrics,
    PersonalRecords,
    Photos,
    CustomExercises,
}

impl Collection {
    /// Collections mirrored live by the data store, in subscription order.
    pub const TRACKED: [Collection; 6] = [
        Collection::Workouts,
        Collection::Routines,
        Collection::BodyMetrics,
        Collection::PersonalRecords,
        Collection::Photos,
        Collection::CustomExercises,
    ];

    pub const ALL: [Collection; 7] = [
        Collection::Workouts,
        Collection::Exercises,
        Collection::Routines,
        Collection::BodyMetrics,
        Collection::PersonalRecords,
        Collection::Photos,
        Collection::CustomExercises,
    ];

    /// Name used in storage and exports.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Workouts => "workouts",
            Collection::Exercises => "exercises",
            Collection::Routines => "routines",
            Collection::BodyMetrics => "bodyMetrics",
            Collection::PersonalRecords => "personalRecords",
            Collection::Photos => "photos",
            Collection::CustomExercises => "customExercises",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Ordering applied to the live query for this collection.
    ///
    /// Workouts sort by date only: a secondary sort on time would need a
    /// composite index on a remote store.
    pub fn live_order(&self) -> Option<OrderSpec> {
        match self {
            Collection::Workouts | Collection::BodyMetrics | Collection::Photos => {
                Some(OrderSpec::desc("date"))
            }
            Collection::Routines => Some(OrderSpec::asc("name")),
            Collection::Exercises | Collection::PersonalRecords | Collection::CustomExercises => {
                None
            }
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Single-field ordering of a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderSpec {
    pub field: String,
    pub direction: Direction,
}

impl OrderSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(Collection::from_name(collection.name()), Some(collection));
        }
        assert_eq!(Collection::from_name("settings"), None);
    }

    #[test]
    fn test_live_orders() {
        assert_eq!(Collection::Workouts.live_order(), Some(OrderSpec::desc("date")));
        assert_eq!(Collection::Routines.live_order(), Some(OrderSpec::asc("name")));
        assert_eq!(Collection::PersonalRecords.live_order(), None);
        assert!(!Collection::TRACKED.contains(&Collection::Exercises));
    }
}
