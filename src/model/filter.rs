use crate::model::Id;
use crate::store::query::{Column, Pagination, Predicate};

/// Filter for gender and nationality listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionaryFilter {
    pub id: Option<Id>,
    pub name: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl DictionaryFilter {
    pub fn by_id(id: Id) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Predicates in clause order: id, name.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(id) = self.id.filter(|id| *id > 0) {
            predicates.push(Predicate::Eq(Column::Id, id));
        }
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            predicates.push(Predicate::ILike(Column::Name, name.to_string()));
        }
        predicates
    }

    pub fn pagination(&self) -> Option<Pagination> {
        Pagination::from_page(self.page, self.limit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonFilter {
    pub id: Option<Id>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub age_from: Option<i64>,
    pub age_to: Option<i64>,
    pub gender_id: Option<Id>,
    pub nationality_id: Option<Id>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PersonFilter {
    pub fn by_id(id: Id) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Predicates in clause order: id, name, surname, age range, gender, nationality.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(id) = self.id.filter(|id| *id > 0) {
            predicates.push(Predicate::Eq(Column::Id, id));
        }
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            predicates.push(Predicate::ILike(Column::Name, name.to_string()));
        }
        if let Some(surname) = self.surname.as_deref().filter(|s| !s.is_empty()) {
            predicates.push(Predicate::ILike(Column::Surname, surname.to_string()));
        }
        if let Some(age_from) = self.age_from.filter(|a| *a > 0) {
            predicates.push(Predicate::Gte(Column::Age, age_from));
        }
        if let Some(age_to) = self.age_to.filter(|a| *a > 0) {
            predicates.push(Predicate::Lte(Column::Age, age_to));
        }
        if let Some(gender_id) = self.gender_id.filter(|id| *id > 0) {
            predicates.push(Predicate::Eq(Column::GenderId, gender_id));
        }
        if let Some(nationality_id) = self.nationality_id.filter(|id| *id > 0) {
            predicates.push(Predicate::Eq(Column::NationalityId, nationality_id));
        }
        predicates
    }

    pub fn pagination(&self) -> Option<Pagination> {
        Pagination::from_page(self.page, self.limit)
    }
}
