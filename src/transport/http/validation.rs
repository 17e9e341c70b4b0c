//! Per-endpoint request rules, checked before any storage call.
//!
//! Rules run in a fixed order and the first violation wins.

use crate::domain::{Owner, Patch, SearchRequest};
use crate::transport::http::types::{
    DeleteCarRequest, DeleteOwnerRequest, SaveCarRequest, UpdateCarRequest, UpdateOwnerRequest,
};
use std::fmt;

/// Earliest year accepted when a car's year is updated.
pub const MIN_CAR_YEAR: i32 = 1900;
/// Registration numbers are stored in a `VARCHAR(255)` column.
pub const MAX_REG_NUM_LEN: usize = 255;

/// A rejected request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn invalid(field: &'static str) -> Self {
        Self {
            field,
            message: format!("field {field} is not valid"),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FieldError {}

pub trait Validate {
    fn validate(&self) -> Result<(), FieldError>;
}

fn check(ok: bool, field: &'static str) -> Result<(), FieldError> {
    if ok {
        Ok(())
    } else {
        Err(FieldError::invalid(field))
    }
}

/// Postgres text columns cannot hold NUL.
fn storable(value: &str) -> bool {
    !value.contains('\0')
}

fn check_text(value: &str, field: &'static str) -> Result<(), FieldError> {
    check(!value.is_empty() && storable(value), field)
}

fn check_present_text(value: &Patch<String>, field: &'static str) -> Result<(), FieldError> {
    match value {
        Patch::Present(v) => check_text(v, field),
        Patch::Absent => Ok(()),
    }
}

impl Validate for SaveCarRequest {
    fn validate(&self) -> Result<(), FieldError> {
        for reg_num in &self.reg_nums {
            let len = reg_num.chars().count();
            check((1..=MAX_REG_NUM_LEN).contains(&len) && storable(reg_num), "regNums")?;
        }
        Ok(())
    }
}

impl Validate for SearchRequest {
    fn validate(&self) -> Result<(), FieldError> {
        check(storable(&self.query), "query")?;
        check(self.page_size >= 1, "pageSize")?;
        check(self.page_num >= 1, "pageNum")
    }
}

impl Validate for DeleteCarRequest {
    fn validate(&self) -> Result<(), FieldError> {
        check(self.car_id >= 1, "car_id")
    }
}

impl Validate for UpdateCarRequest {
    fn validate(&self) -> Result<(), FieldError> {
        check(self.car_id >= 1, "car_id")?;
        check_present_text(&self.reg_num, "regNum")?;
        check_present_text(&self.mark, "mark")?;
        check_present_text(&self.model, "model")?;
        if let Patch::Present(year) = self.year {
            check(year >= MIN_CAR_YEAR, "year")?;
        }
        if let Patch::Present(owner) = &self.owner {
            check_text(&owner.name, "owner.name")?;
            check_text(&owner.surname, "owner.surname")?;
            check_text(&owner.patronymic, "owner.patronymic")?;
        }
        Ok(())
    }
}

/// Body of `/owner/save`.
impl Validate for Owner {
    fn validate(&self) -> Result<(), FieldError> {
        check_text(&self.name, "name")?;
        check_text(&self.surname, "surname")?;
        check_text(&self.patronymic, "patronymic")
    }
}

impl Validate for DeleteOwnerRequest {
    fn validate(&self) -> Result<(), FieldError> {
        check(self.owner_id >= 1, "owner_id")
    }
}

impl Validate for UpdateOwnerRequest {
    fn validate(&self) -> Result<(), FieldError> {
        check(self.owner_id >= 1, "owner_id")?;
        check_present_text(&self.name, "name")?;
        check_present_text(&self.surname, "surname")?;
        check_present_text(&self.patronymic, "patronymic")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of<V: Validate>(v: &V) -> Option<&'static str> {
        v.validate().err().map(|e| e.field)
    }

    fn update_car(car_id: i32) -> UpdateCarRequest {
        UpdateCarRequest {
            car_id,
            ..Default::default()
        }
    }

    #[test]
    fn car_id_must_be_positive() {
        assert_eq!(field_of(&DeleteCarRequest { car_id: 0 }), Some("car_id"));
        assert_eq!(field_of(&DeleteCarRequest { car_id: -5 }), Some("car_id"));
        assert_eq!(field_of(&DeleteCarRequest { car_id: 1 }), None);
        assert_eq!(field_of(&update_car(0)), Some("car_id"));
        assert_eq!(field_of(&update_car(1)), None);
    }

    #[test]
    fn nul_bytes_are_rejected() {
        let owner = Owner::new("Iv\0an", "Petrov", "Sergeevich");
        assert_eq!(field_of(&owner), Some("name"));

        let save = SaveCarRequest {
            reg_nums: vec!["X1\023".to_string()],
        };
        assert_eq!(field_of(&save), Some("regNums"));

        let mut update = update_car(1);
        update.owner = Patch::Present(Owner::new("Anna", "Sido\0rova", "Ivanovna"));
        assert_eq!(field_of(&update), Some("owner.surname"));

        let search = SearchRequest {
            query: "\0".to_string(),
            page_num: 1,
            page_size: 10,
        };
        assert_eq!(field_of(&search), Some("query"));
    }

    #[test]
    fn message_names_the_field() {
        let err = DeleteCarRequest { car_id: 0 }.validate().unwrap_err();
        assert_eq!(err.message, "field car_id is not valid");
    }

    #[test]
    fn search_pagination_starts_at_one() {
        let mut req = SearchRequest {
            query: "Petrov".to_string(),
            page_num: 1,
            page_size: 0,
        };
        assert_eq!(field_of(&req), Some("pageSize"));
        req.page_size = 10;
        req.page_num = 0;
        assert_eq!(field_of(&req), Some("pageNum"));
        req.page_num = 1;
        assert_eq!(field_of(&req), None);
    }

    #[test]
    fn reg_num_length_bounds() {
        let ok = SaveCarRequest {
            reg_nums: vec!["X123XX150".to_string(), "a".repeat(255)],
        };
        assert_eq!(field_of(&ok), None);

        let too_long = SaveCarRequest {
            reg_nums: vec!["X123XX150".to_string(), "a".repeat(256)],
        };
        assert_eq!(field_of(&too_long), Some("regNums"));

        let empty = SaveCarRequest {
            reg_nums: vec![String::new()],
        };
        assert_eq!(field_of(&empty), Some("regNums"));

        assert_eq!(field_of(&SaveCarRequest { reg_nums: vec![] }), None);
    }

    #[test]
    fn reg_num_length_counts_characters() {
        let cyrillic = SaveCarRequest {
            reg_nums: vec!["А".repeat(255)],
        };
        assert_eq!(field_of(&cyrillic), None);
    }

    #[test]
    fn year_lower_bound_on_update() {
        let mut req = update_car(3);
        req.year = Patch::Present(1899);
        assert_eq!(field_of(&req), Some("year"));
        req.year = Patch::Present(1900);
        assert_eq!(field_of(&req), None);
    }

    #[test]
    fn present_strings_must_not_be_empty() {
        let mut req = update_car(3);
        req.mark = Patch::Present(String::new());
        assert_eq!(field_of(&req), Some("mark"));

        let mut req = update_car(3);
        req.model = Patch::Present("Vesta".to_string());
        req.reg_num = Patch::Present(String::new());
        assert_eq!(field_of(&req), Some("regNum"));
    }

    #[test]
    fn owner_on_car_update_needs_every_name_part() {
        let mut req = update_car(3);
        req.owner = Patch::Present(Owner::new("Ivan", "", "Sergeevich"));
        assert_eq!(field_of(&req), Some("owner.surname"));
        req.owner = Patch::Present(Owner::new("Ivan", "Petrov", "Sergeevich"));
        assert_eq!(field_of(&req), None);
    }

    #[test]
    fn owner_save_requires_all_fields() {
        assert_eq!(field_of(&Owner::new("", "Petrov", "S")), Some("name"));
        assert_eq!(field_of(&Owner::new("Ivan", "Petrov", "")), Some("patronymic"));
        assert_eq!(field_of(&Owner::new("Ivan", "Petrov", "Sergeevich")), None);
    }

    #[test]
    fn owner_update_rules() {
        let req = UpdateOwnerRequest::default();
        assert_eq!(field_of(&req), Some("owner_id"));
        assert_eq!(field_of(&DeleteOwnerRequest { owner_id: 0 }), Some("owner_id"));

        let req = UpdateOwnerRequest {
            owner_id: 2,
            surname: Patch::Present(String::new()),
            ..Default::default()
        };
        assert_eq!(field_of(&req), Some("surname"));

        let req = UpdateOwnerRequest {
            owner_id: 2,
            name: Patch::Present("Petr".to_string()),
            ..Default::default()
        };
        assert_eq!(field_of(&req), None);
    }
}
