//! Typed predicates over the member/team join and their SQL rendering.
//!
//! # Responsibility
//! - Let callers build boolean filters against known columns only.
//! - Render filters to parameterised SQL; values always travel as binds.
//!
//! # Invariants
//! - A `Filter` never contains an "absent" predicate: `Filter::and(None)`
//!   is a no-op, so unset conditions mean "no constraint".
//! - Substring matching escapes `%`, `_` and `\` so user text matches
//!   literally.

use crate::db::FOLD_CASE_FN;
use rusqlite::types::Value;
use serde::Serialize;

const LIKE_ESCAPE: char = '\\';

/// Column of the `member m LEFT JOIN team t` query shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    MemberId,
    MemberUsername,
    MemberAge,
    MemberTeamId,
    TeamId,
    TeamName,
}

impl Column {
    /// Qualified SQL expression for this column.
    pub fn sql(self) -> &'static str {
        match self {
            Self::MemberId => "m.member_id",
            Self::MemberUsername => "m.username",
            Self::MemberAge => "m.age",
            Self::MemberTeamId => "m.team_id",
            Self::TeamId => "t.team_id",
            Self::TeamName => "t.name",
        }
    }

    /// Whether evaluating this column needs the `team` join.
    pub fn is_team_column(self) -> bool {
        matches!(self, Self::TeamId | Self::TeamName)
    }

    pub fn equals(self, value: impl Into<Operand>) -> Predicate {
        Predicate::Eq(self, value.into())
    }

    pub fn contains_ignore_case(self, text: impl Into<String>) -> Predicate {
        Predicate::ContainsIgnoreCase(self, text.into())
    }

    /// `column >= bound`
    pub fn goe(self, bound: impl Into<i64>) -> Predicate {
        Predicate::Goe(self, bound.into())
    }

    /// `column <= bound`
    pub fn loe(self, bound: impl Into<i64>) -> Predicate {
        Predicate::Loe(self, bound.into())
    }

    /// Inclusive on both ends.
    pub fn between(self, low: impl Into<i64>, high: impl Into<i64>) -> Predicate {
        Predicate::Between(self, low.into(), high.into())
    }
}

/// Literal compared against a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Integer(i64),
    Text(String),
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Operand> for Value {
    fn from(value: Operand) -> Self {
        match value {
            Operand::Integer(v) => Value::Integer(v),
            Operand::Text(v) => Value::Text(v),
        }
    }
}

/// Boolean filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq(Column, Operand),
    ContainsIgnoreCase(Column, String),
    Goe(Column, i64),
    Loe(Column, i64),
    Between(Column, i64, i64),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Predicate {
        match self {
            Self::And(mut items) => {
                items.push(other);
                Self::And(items)
            }
            first => Self::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Predicate) -> Predicate {
        match self {
            Self::Or(mut items) => {
                items.push(other);
                Self::Or(items)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    pub fn references_team(&self) -> bool {
        match self {
            Self::Eq(column, _)
            | Self::ContainsIgnoreCase(column, _)
            | Self::Goe(column, _)
            | Self::Loe(column, _)
            | Self::Between(column, _, _) => column.is_team_column(),
            Self::And(items) | Self::Or(items) => items.iter().any(Predicate::references_team),
        }
    }

    fn render(&self, sql: &mut String, binds: &mut Vec<Value>) {
        match self {
            Self::Eq(column, operand) => {
                sql.push_str(column.sql());
                sql.push_str(" = ?");
                binds.push(operand.clone().into());
            }
            Self::ContainsIgnoreCase(column, text) => {
                sql.push_str(FOLD_CASE_FN);
                sql.push('(');
                sql.push_str(column.sql());
                sql.push_str(") LIKE ? ESCAPE '\\'");
                binds.push(Value::Text(format!(
                    "%{}%",
                    escape_like(&text.to_lowercase())
                )));
            }
            Self::Goe(column, bound) => {
                sql.push_str(column.sql());
                sql.push_str(" >= ?");
                binds.push(Value::Integer(*bound));
            }
            Self::Loe(column, bound) => {
                sql.push_str(column.sql());
                sql.push_str(" <= ?");
                binds.push(Value::Integer(*bound));
            }
            Self::Between(column, low, high) => {
                sql.push_str(column.sql());
                sql.push_str(" BETWEEN ? AND ?");
                binds.push(Value::Integer(*low));
                binds.push(Value::Integer(*high));
            }
            Self::And(items) => render_group(items, " AND ", "1 = 1", sql, binds),
            Self::Or(items) => render_group(items, " OR ", "1 = 0", sql, binds),
        }
    }
}

fn render_group(
    items: &[Predicate],
    separator: &str,
    identity: &str,
    sql: &mut String,
    binds: &mut Vec<Value>,
) {
    if items.is_empty() {
        sql.push_str(identity);
        return;
    }

    sql.push('(');
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            sql.push_str(separator);
        }
        item.render(sql, binds);
    }
    sql.push(')');
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch == LIKE_ESCAPE || ch == '%' || ch == '_' {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

/// AND-combination of optional predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `predicate` when present; `None` leaves the filter unchanged.
    pub fn and(mut self, predicate: Option<Predicate>) -> Self {
        if let Some(predicate) = predicate {
            self.predicates.push(predicate);
        }
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn references_team(&self) -> bool {
        self.predicates.iter().any(Predicate::references_team)
    }

    /// Renders ` WHERE ...` (with a leading space) or an empty string.
    pub fn where_clause(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut binds = Vec::new();
        if self.predicates.is_empty() {
            return (sql, binds);
        }

        sql.push_str(" WHERE ");
        for (index, predicate) in self.predicates.iter().enumerate() {
            if index > 0 {
                sql.push_str(" AND ");
            }
            predicate.render(&mut sql, &mut binds);
        }
        (sql, binds)
    }
}

impl From<Predicate> for Filter {
    fn from(value: Predicate) -> Self {
        Self::new().and(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_like, Column, Filter};
    use rusqlite::types::Value;

    #[test]
    fn empty_filter_renders_no_where_clause() {
        let (sql, binds) = Filter::new().and(None).and(None).where_clause();
        assert!(sql.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn absent_predicates_are_skipped() {
        let filter = Filter::new()
            .and(None)
            .and(Some(Column::MemberAge.goe(20)))
            .and(None)
            .and(Some(Column::MemberAge.loe(30)));

        let (sql, binds) = filter.where_clause();
        assert_eq!(sql, " WHERE m.age >= ? AND m.age <= ?");
        assert_eq!(binds, vec![Value::Integer(20), Value::Integer(30)]);
    }

    #[test]
    fn contains_ignore_case_lowercases_and_escapes() {
        let (sql, binds) = Filter::from(Column::TeamName.contains_ignore_case("Team_A%"))
            .where_clause();
        assert_eq!(sql, " WHERE fold_case(t.name) LIKE ? ESCAPE '\\'");
        assert_eq!(binds, vec![Value::Text("%team\\_a\\%%".to_string())]);
    }

    #[test]
    fn contains_ignore_case_folds_non_ascii_input() {
        let (_, binds) = Filter::from(Column::MemberUsername.contains_ignore_case("ÉLISE"))
            .where_clause();
        assert_eq!(binds, vec![Value::Text("%élise%".to_string())]);
    }

    #[test]
    fn nested_groups_render_with_parentheses() {
        let predicate = Column::MemberAge
            .between(10, 40)
            .and(Column::MemberUsername.equals("member1").or(Column::MemberId.equals(3)));

        let (sql, binds) = Filter::from(predicate).where_clause();
        assert_eq!(
            sql,
            " WHERE (m.age BETWEEN ? AND ? AND (m.username = ? OR m.member_id = ?))"
        );
        assert_eq!(binds.len(), 4);
    }

    #[test]
    fn team_reference_is_detected_through_groups() {
        let member_only = Filter::from(Column::MemberAge.goe(1));
        assert!(!member_only.references_team());

        let nested = Filter::from(
            Column::MemberAge
                .goe(1)
                .or(Column::TeamName.contains_ignore_case("a")),
        );
        assert!(nested.references_team());
    }

    #[test]
    fn escape_like_leaves_plain_text_untouched() {
        assert_eq!(escape_like("member"), "member");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
