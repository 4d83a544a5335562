//! Filters as data: each listing filter turns into an ordered list of
//! [`Predicate`]s plus optional [`Pagination`]. The PostgreSQL store renders
//! them through `sqlx::QueryBuilder` (one bound placeholder per value) and the
//! in-memory store evaluates them directly against rows.

use sqlx::{Postgres, QueryBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Name,
    Surname,
    Age,
    GenderId,
    NationalityId,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Surname => "surname",
            Column::Age => "age",
            Column::GenderId => "gender_id",
            Column::NationalityId => "nationality_id",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq(Column, i64),
    /// Case-insensitive substring match.
    ILike(Column, String),
    Gte(Column, i64),
    Lte(Column, i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    /// `LIMIT`/`OFFSET` only apply when both page and limit are positive.
    pub fn from_page(page: Option<i64>, limit: Option<i64>) -> Option<Self> {
        match (page, limit) {
            (Some(page), Some(limit)) if page > 0 && limit > 0 => Some(Self {
                limit,
                offset: (page - 1).saturating_mul(limit),
            }),
            _ => None,
        }
    }

    pub fn apply<T>(&self, rows: Vec<T>) -> Vec<T> {
        rows.into_iter()
            .skip(usize::try_from(self.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .collect()
    }
}

/// Wraps user input in `%…%`, escaping LIKE metacharacters.
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Appends ` AND <predicate>` for each predicate. `qualifier` prefixes column
/// names (`p.` in joined queries).
pub fn push_predicates(builder: &mut QueryBuilder<'_, Postgres>, predicates: &[Predicate], qualifier: &str) {
    for predicate in predicates {
        builder.push(" AND ");
        match predicate {
            Predicate::Eq(column, value) => {
                builder.push(format!("{}{} = ", qualifier, column.as_str()));
                builder.push_bind(*value);
            }
            Predicate::ILike(column, needle) => {
                builder.push(format!("{}{} ILIKE ", qualifier, column.as_str()));
                builder.push_bind(like_pattern(needle));
            }
            Predicate::Gte(column, value) => {
                builder.push(format!("{}{} >= ", qualifier, column.as_str()));
                builder.push_bind(*value);
            }
            Predicate::Lte(column, value) => {
                builder.push(format!("{}{} <= ", qualifier, column.as_str()));
                builder.push_bind(*value);
            }
        }
    }
}

pub fn push_pagination(builder: &mut QueryBuilder<'_, Postgres>, pagination: Option<Pagination>) {
    if let Some(pagination) = pagination {
        builder.push(" LIMIT ");
        builder.push_bind(pagination.limit);
        builder.push(" OFFSET ");
        builder.push_bind(pagination.offset);
    }
}

/// Column access for rows evaluated in memory.
pub trait Filterable {
    fn int(&self, column: Column) -> Option<i64>;
    fn text(&self, column: Column) -> Option<&str>;
}

impl Predicate {
    pub fn matches<R: Filterable>(&self, row: &R) -> bool {
        match self {
            Predicate::Eq(column, value) => row.int(*column) == Some(*value),
            Predicate::ILike(column, needle) => row
                .text(*column)
                .map(|text| text.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            Predicate::Gte(column, value) => row.int(*column).is_some_and(|v| v >= *value),
            Predicate::Lte(column, value) => row.int(*column).is_some_and(|v| v <= *value),
        }
    }
}

pub fn matches_all<R: Filterable>(predicates: &[Predicate], row: &R) -> bool {
    predicates.iter().all(|predicate| predicate.matches(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_offset_is_page_minus_one_times_limit() {
        assert_eq!(
            Pagination::from_page(Some(2), Some(10)),
            Some(Pagination { limit: 10, offset: 10 })
        );
        assert_eq!(
            Pagination::from_page(Some(1), Some(5)),
            Some(Pagination { limit: 5, offset: 0 })
        );
    }

    #[test]
    fn pagination_requires_both_page_and_limit() {
        assert_eq!(Pagination::from_page(Some(0), Some(10)), None);
        assert_eq!(Pagination::from_page(Some(3), Some(0)), None);
        assert_eq!(Pagination::from_page(None, Some(10)), None);
        assert_eq!(Pagination::from_page(Some(-1), Some(10)), None);
    }

    #[test]
    fn pagination_slices_rows() {
        let rows: Vec<i32> = (1..=25).collect();
        let page = Pagination::from_page(Some(3), Some(10)).unwrap();
        assert_eq!(page.apply(rows), vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("jo"), "%jo%");
        assert_eq!(like_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
    }

    #[test]
    fn rendered_sql_numbers_placeholders_in_clause_order() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id, name FROM genders WHERE 1=1");
        push_predicates(
            &mut builder,
            &[
                Predicate::Eq(Column::Id, 4),
                Predicate::ILike(Column::Name, "ma".to_string()),
            ],
            "",
        );
        builder.push(" ORDER BY id");
        push_pagination(&mut builder, Pagination::from_page(Some(2), Some(10)));
        assert_eq!(
            builder.sql(),
            "SELECT id, name FROM genders WHERE 1=1 AND id = $1 AND name ILIKE $2 ORDER BY id LIMIT $3 OFFSET $4"
        );
    }

    #[test]
    fn no_limit_clause_without_pagination() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM persons p WHERE 1=1");
        push_predicates(&mut builder, &[Predicate::Gte(Column::Age, 18)], "p.");
        push_pagination(&mut builder, Pagination::from_page(Some(0), Some(10)));
        assert_eq!(builder.sql(), "SELECT id FROM persons p WHERE 1=1 AND p.age >= $1");
    }

    struct Row {
        id: i64,
        name: &'static str,
        age: Option<i64>,
    }

    impl Filterable for Row {
        fn int(&self, column: Column) -> Option<i64> {
            match column {
                Column::Id => Some(self.id),
                Column::Age => self.age,
                _ => None,
            }
        }

        fn text(&self, column: Column) -> Option<&str> {
            match column {
                Column::Name => Some(self.name),
                _ => None,
            }
        }
    }

    #[test]
    fn in_memory_evaluation_is_case_insensitive_substring() {
        let row = Row {
            id: 1,
            name: "Female",
            age: None,
        };
        assert!(Predicate::ILike(Column::Name, "MALE".to_string()).matches(&row));
        assert!(!Predicate::ILike(Column::Name, "x".to_string()).matches(&row));
        assert!(!Predicate::Gte(Column::Age, 1).matches(&row));
        assert!(matches_all(&[Predicate::Eq(Column::Id, 1)], &row));
        assert!(matches_all(&[], &row));
    }
}
