use super::{SeaOrmStorage, db_err, now_ts, write_err};
use crate::entity::academic_years::{
    ActiveModel as YearActiveModel, Column as YearColumn, Entity as AcademicYears,
};
use crate::entity::system_settings::{ActiveModel, Column, Entity as SystemSettings};
use crate::errors::{BusyBeeError, Result};
use crate::models::system::{
    entities::{AcademicYear, SettingValueType, SystemSetting},
    requests::CreateAcademicYearRequest,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::Expr,
};

impl SeaOrmStorage {
    pub async fn list_all_settings_impl(&self) -> Result<Vec<SystemSetting>> {
        let rows = SystemSettings::find()
            .order_by_asc(Column::Key)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list settings"))?;

        Ok(rows.into_iter().map(|m| m.into_setting()).collect())
    }

    pub async fn get_setting_by_key_impl(&self, key: &str) -> Result<Option<SystemSetting>> {
        let row = SystemSettings::find_by_id(key.to_string())
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query setting"))?;

        Ok(row.map(|m| m.into_setting()))
    }

    pub async fn update_setting_impl(
        &self,
        key: &str,
        value: &str,
        user_id: i64,
    ) -> Result<SystemSetting> {
        let existing = SystemSettings::find_by_id(key.to_string())
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query setting"))?
            .ok_or_else(|| BusyBeeError::not_found(format!("Setting not found: {key}")))?;

        let mut model: ActiveModel = existing.into();
        model.value = Set(value.to_string());
        model.updated_at = Set(now_ts());
        model.updated_by = Set(Some(user_id));

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("Failed to update setting"))?;

        Ok(updated.into_setting())
    }

    pub async fn ensure_setting_impl(
        &self,
        key: &str,
        value: &str,
        value_type: SettingValueType,
        description: &str,
    ) -> Result<bool> {
        if self.get_setting_by_key_impl(key).await?.is_some() {
            return Ok(false);
        }

        ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            value_type: Set(value_type.to_string()),
            description: Set(Some(description.to_string())),
            updated_at: Set(now_ts()),
            updated_by: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(write_err("Failed to seed setting"))?;

        Ok(true)
    }

    pub async fn list_academic_years_impl(&self) -> Result<Vec<AcademicYear>> {
        let rows = AcademicYears::find()
            .order_by_desc(YearColumn::StartDate)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list academic years"))?;

        Ok(rows.into_iter().map(|m| m.into_academic_year()).collect())
    }

    pub async fn get_academic_year_impl(&self, id: i64) -> Result<Option<AcademicYear>> {
        let row = AcademicYears::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query academic year"))?;

        Ok(row.map(|m| m.into_academic_year()))
    }

    pub async fn get_academic_year_by_name_impl(&self, name: &str) -> Result<Option<AcademicYear>> {
        let row = AcademicYears::find()
            .filter(YearColumn::Name.eq(name.trim()))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query academic year"))?;

        Ok(row.map(|m| m.into_academic_year()))
    }

    pub async fn get_current_academic_year_impl(&self) -> Result<Option<AcademicYear>> {
        let row = AcademicYears::find()
            .filter(YearColumn::IsCurrent.eq(true))
            .order_by_desc(YearColumn::StartDate)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query current academic year"))?;

        Ok(row.map(|m| m.into_academic_year()))
    }

    pub async fn create_academic_year_impl(
        &self,
        req: CreateAcademicYearRequest,
    ) -> Result<AcademicYear> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        if req.is_current {
            AcademicYears::update_many()
                .col_expr(YearColumn::IsCurrent, Expr::value(false))
                .exec(&txn)
                .await
                .map_err(db_err("Failed to clear current academic year"))?;
        }

        let created = YearActiveModel {
            name: Set(req.name.trim().to_string()),
            start_date: Set(req.start_date),
            end_date: Set(req.end_date),
            is_current: Set(req.is_current),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(write_err("Failed to create academic year"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit academic year"))?;

        Ok(created.into_academic_year())
    }

    pub async fn set_current_academic_year_impl(&self, id: i64) -> Result<Option<AcademicYear>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let Some(year) = AcademicYears::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to query academic year"))?
        else {
            return Ok(None);
        };

        AcademicYears::update_many()
            .col_expr(YearColumn::IsCurrent, Expr::value(false))
            .filter(YearColumn::Id.ne(id))
            .exec(&txn)
            .await
            .map_err(db_err("Failed to clear current academic year"))?;

        let mut model: YearActiveModel = year.into();
        model.is_current = Set(true);
        let updated = model
            .update(&txn)
            .await
            .map_err(db_err("Failed to set current academic year"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit academic year"))?;

        Ok(Some(updated.into_academic_year()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use chrono::NaiveDate;

    fn year(name: &str, start: i32, current: bool) -> CreateAcademicYearRequest {
        CreateAcademicYearRequest {
            name: name.to_string(),
            start_date: NaiveDate::from_ymd_opt(start, 1, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(start, 12, 5).unwrap(),
            is_current: current,
        }
    }

    #[tokio::test]
    async fn test_only_one_current_year() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let y2024 = storage.create_academic_year(year("2024", 2024, true)).await.unwrap();
        let y2025 = storage.create_academic_year(year("2025", 2025, true)).await.unwrap();

        let current = storage.get_current_academic_year().await.unwrap().unwrap();
        assert_eq!(current.id, y2025.id);
        let old = storage.get_academic_year(y2024.id).await.unwrap().unwrap();
        assert!(!old.is_current);

        storage.set_current_academic_year(y2024.id).await.unwrap();
        let years = storage.list_academic_years().await.unwrap();
        assert_eq!(years.iter().filter(|y| y.is_current).count(), 1);
        assert_eq!(
            storage.get_current_academic_year().await.unwrap().unwrap().id,
            y2024.id
        );
        assert!(storage.set_current_academic_year(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_year_name_conflicts() {
        let storage = SeaOrmStorage::new_in_memory().await;
        storage.create_academic_year(year("2025", 2025, false)).await.unwrap();
        let dup = storage.create_academic_year(year("2025", 2025, false)).await;
        assert!(matches!(dup, Err(BusyBeeError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_settings_seed_and_update() {
        let storage = SeaOrmStorage::new_in_memory().await;
        // Migrations seed the defaults.
        let name = storage.get_setting_by_key("school.name").await.unwrap().unwrap();
        assert_eq!(name.value, "BusyBee School");
        let again = storage
            .ensure_setting("school.name", "Other", SettingValueType::String, "Name")
            .await
            .unwrap();
        assert!(!again);
        let inserted = storage
            .ensure_setting("school.motto", "Work hard", SettingValueType::String, "Motto")
            .await
            .unwrap();
        assert!(inserted);

        let updated = storage
            .update_setting("school.name", "Hillside Primary", 7)
            .await
            .unwrap();
        assert_eq!(updated.value, "Hillside Primary");
        assert_eq!(updated.updated_by, Some(7));

        let missing = storage.update_setting("nope", "x", 7).await;
        assert!(matches!(missing, Err(BusyBeeError::NotFound(_))));
    }
}
