//! Translation of [`MemberSearchCondition`] into a [`Filter`].

use crate::model::dto::MemberSearchCondition;
use crate::search::predicate::{Column, Filter, Predicate};

impl MemberSearchCondition {
    /// Builds the AND-filter for the set fields of this condition.
    ///
    /// Text fields count as set only when they contain a non-whitespace
    /// character; the text itself is matched as given.
    pub fn to_filter(&self) -> Filter {
        Filter::new()
            .and(username_contains(self.username.as_deref()))
            .and(team_name_contains(self.team_name.as_deref()))
            .and(age_goe(self.age_goe))
            .and(age_loe(self.age_loe))
    }
}

fn username_contains(value: Option<&str>) -> Option<Predicate> {
    value
        .filter(|text| has_text(text))
        .map(|text| Column::MemberUsername.contains_ignore_case(text))
}

fn team_name_contains(value: Option<&str>) -> Option<Predicate> {
    value
        .filter(|text| has_text(text))
        .map(|text| Column::TeamName.contains_ignore_case(text))
}

fn age_goe(value: Option<i32>) -> Option<Predicate> {
    value.map(|age| Column::MemberAge.goe(age))
}

fn age_loe(value: Option<i32>) -> Option<Predicate> {
    value.map(|age| Column::MemberAge.loe(age))
}

fn has_text(value: &str) -> bool {
    value.chars().any(|ch| !ch.is_whitespace())
}
